//! Substitution, subtyping and structural equality of native types.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::ids::{ClassId, TypeParamId};
use crate::store::DescriptorStore;
use crate::types::{NativeType, TypeConstructor, TypeProjection, Variance};

/// Maps type parameters to the projections standing in for them.
#[derive(Debug, Clone, Default)]
pub struct Substitution {
    map: HashMap<TypeParamId, TypeProjection>,
    /// Replacement used when a star-projected parameter occurs at top level.
    star_bounds: HashMap<TypeParamId, NativeType>,
}

impl Substitution {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Binds the type parameters of `ty`'s class to its arguments.
    pub fn for_type(store: &DescriptorStore, ty: &NativeType) -> Self {
        let mut substitution = Self::default();
        let Some(class) = ty.class_id() else {
            return substitution;
        };
        let params = &store.class(class).type_params;
        for (param, argument) in params.iter().zip(&ty.arguments) {
            if matches!(argument, TypeProjection::Star) {
                let bound = store
                    .type_param(*param)
                    .upper_bounds()
                    .first()
                    .cloned()
                    .unwrap_or_else(|| store.builtins().any_type())
                    .make_nullable();
                substitution.star_bounds.insert(*param, bound);
            }
            substitution.map.insert(*param, argument.clone());
        }
        substitution
    }

    pub fn insert(&mut self, param: TypeParamId, projection: TypeProjection) {
        self.map.insert(param, projection);
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn substitute(&self, ty: &NativeType) -> NativeType {
        if self.is_empty() {
            return ty.clone();
        }
        match &ty.constructor {
            TypeConstructor::TypeParameter(param) => match self.map.get(param) {
                Some(TypeProjection::Projected(_, replacement)) => replacement
                    .clone()
                    .with_nullability(replacement.nullable || ty.nullable),
                Some(TypeProjection::Star) => match self.star_bounds.get(param) {
                    Some(bound) => bound.clone(),
                    None => ty.clone(),
                },
                None => ty.clone(),
            },
            _ => NativeType {
                constructor: ty.constructor.clone(),
                arguments: ty
                    .arguments
                    .iter()
                    .map(|argument| self.substitute_projection(argument))
                    .collect(),
                nullable: ty.nullable,
            },
        }
    }

    fn substitute_projection(&self, projection: &TypeProjection) -> TypeProjection {
        let TypeProjection::Projected(variance, inner) = projection else {
            return TypeProjection::Star;
        };
        if let Some(param) = inner.type_parameter_id() {
            match self.map.get(&param) {
                Some(TypeProjection::Star) => return TypeProjection::Star,
                Some(TypeProjection::Projected(replacement_variance, replacement)) => {
                    let variance = if *variance == Variance::Invariant {
                        *replacement_variance
                    } else {
                        *variance
                    };
                    let ty = replacement
                        .clone()
                        .with_nullability(replacement.nullable || inner.nullable);
                    return TypeProjection::Projected(variance, ty);
                }
                None => {}
            }
        }
        TypeProjection::Projected(*variance, self.substitute(inner))
    }
}

/// Finds `target` among the supertypes of `ty`, with arguments substituted
/// along the path.
pub fn supertype_of_class(
    store: &DescriptorStore,
    ty: &NativeType,
    target: ClassId,
) -> Option<NativeType> {
    let mut queue = VecDeque::from([ty.clone()]);
    let mut seen = HashSet::new();
    while let Some(current) = queue.pop_front() {
        let Some(class) = current.class_id() else {
            continue;
        };
        if class == target {
            return Some(current);
        }
        if !seen.insert(class) {
            continue;
        }
        let substitution = Substitution::for_type(store, &current);
        for supertype in &store.class(class).supertypes {
            queue.push_back(substitution.substitute(supertype));
        }
    }
    None
}

pub fn is_subtype(store: &DescriptorStore, sub: &NativeType, sup: &NativeType) -> bool {
    if sub.is_error() || sup.is_error() {
        return true;
    }
    if sub.nullable && !sup.nullable {
        return false;
    }
    let builtins = store.builtins();
    if builtins.is_nothing(sub) {
        return true;
    }

    if let Some(param) = sub.type_parameter_id() {
        if sup.type_parameter_id() == Some(param) {
            return true;
        }
        return store.type_param(param).upper_bounds().iter().any(|bound| {
            let bound = bound.clone().with_nullability(bound.nullable || sub.nullable);
            is_subtype(store, &bound, sup)
        });
    }

    let Some(target) = sup.class_id() else {
        return false;
    };
    if target == builtins.any {
        return true;
    }
    let Some(found) = supertype_of_class(store, &sub.clone().make_not_null(), target) else {
        return false;
    };

    let params = &store.class(target).type_params;
    for (idx, expected) in sup.arguments.iter().enumerate() {
        let TypeProjection::Projected(expected_variance, expected_ty) = expected else {
            continue;
        };
        let Some(TypeProjection::Projected(_, actual_ty)) = found.arguments.get(idx) else {
            return false;
        };
        let declared = params
            .get(idx)
            .map(|param| store.type_param(*param).variance)
            .unwrap_or(Variance::Invariant);
        let variance = if *expected_variance == Variance::Invariant {
            declared
        } else {
            *expected_variance
        };
        let compatible = match variance {
            Variance::Out => is_subtype(store, actual_ty, expected_ty),
            Variance::In => is_subtype(store, expected_ty, actual_ty),
            Variance::Invariant => TypeParamAxioms::default().equal(actual_ty, expected_ty),
        };
        if !compatible {
            return false;
        }
    }
    true
}

/// Pairs of type parameters assumed equal, such as the parameters of two
/// functions compared position by position.
#[derive(Debug, Clone, Default)]
pub struct TypeParamAxioms {
    pairs: HashSet<(TypeParamId, TypeParamId)>,
}

impl TypeParamAxioms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assume(&mut self, a: TypeParamId, b: TypeParamId) {
        self.pairs.insert((a, b));
    }

    fn holds(&self, a: TypeParamId, b: TypeParamId) -> bool {
        a == b || self.pairs.contains(&(a, b)) || self.pairs.contains(&(b, a))
    }

    /// Structural equality, treating assumed pairs as the same parameter.
    pub fn equal(&self, a: &NativeType, b: &NativeType) -> bool {
        if a.nullable != b.nullable || a.arguments.len() != b.arguments.len() {
            return false;
        }
        let constructors_match = match (&a.constructor, &b.constructor) {
            (TypeConstructor::TypeParameter(x), TypeConstructor::TypeParameter(y)) => {
                self.holds(*x, *y)
            }
            (x, y) => x == y,
        };
        constructors_match
            && a.arguments
                .iter()
                .zip(&b.arguments)
                .all(|(x, y)| match (x, y) {
                    (TypeProjection::Star, TypeProjection::Star) => true,
                    (TypeProjection::Projected(vx, tx), TypeProjection::Projected(vy, ty)) => {
                        vx == vy && self.equal(tx, ty)
                    }
                    _ => false,
                })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::PrimitiveType;
    use nova_interop_model::FqName;

    fn class(store: &DescriptorStore, name: &str) -> ClassId {
        store
            .builtins()
            .class_by_name(&FqName::new(name))
            .unwrap()
    }

    #[test]
    fn mutable_list_is_a_list_and_collection() {
        let store = DescriptorStore::new();
        let string = store.builtins().string_type();
        let mutable_list = NativeType::class(
            class(&store, "jet.MutableList"),
            vec![TypeProjection::invariant(string.clone())],
        );
        let collection = NativeType::class(
            class(&store, "jet.Collection"),
            vec![TypeProjection::invariant(string.clone())],
        );
        assert!(is_subtype(&store, &mutable_list, &collection));
        assert!(!is_subtype(&store, &collection, &mutable_list));

        let list_of_any = NativeType::class(
            class(&store, "jet.List"),
            vec![TypeProjection::invariant(store.builtins().nullable_any_type())],
        );
        assert!(is_subtype(&store, &mutable_list, &list_of_any));
    }

    #[test]
    fn nullability_and_any() {
        let store = DescriptorStore::new();
        let builtins = store.builtins();
        let int = builtins.primitive_type(PrimitiveType::Int);
        assert!(is_subtype(&store, &int, &builtins.any_type()));
        assert!(!is_subtype(
            &store,
            &int.clone().make_nullable(),
            &builtins.any_type()
        ));
        assert!(is_subtype(&store, &int, &builtins.nullable_any_type()));
        assert!(is_subtype(&store, &builtins.nothing_type(), &int));
        let comparable_int = NativeType::class(
            builtins.comparable,
            vec![TypeProjection::invariant(int.clone())],
        );
        assert!(is_subtype(&store, &int, &comparable_int));
    }

    #[test]
    fn substitution_keeps_outer_nullability() {
        let store = DescriptorStore::new();
        let list = class(&store, "jet.List");
        let element = store.class(list).type_params[0];
        let string = store.builtins().string_type();
        let list_of_string =
            NativeType::class(list, vec![TypeProjection::invariant(string.clone())]);

        let substitution = Substitution::for_type(&store, &list_of_string);
        let nullable_element = NativeType::type_parameter(element).make_nullable();
        assert_eq!(
            substitution.substitute(&nullable_element),
            string.make_nullable()
        );
    }

    #[test]
    fn axioms_identify_parameters() {
        let store = DescriptorStore::new();
        let list = class(&store, "jet.List");
        let set = class(&store, "jet.Set");
        let e1 = store.class(list).type_params[0];
        let e2 = store.class(set).type_params[0];

        let mut axioms = TypeParamAxioms::new();
        assert!(!axioms.equal(&NativeType::type_parameter(e1), &NativeType::type_parameter(e2)));
        axioms.assume(e1, e2);
        assert!(axioms.equal(&NativeType::type_parameter(e2), &NativeType::type_parameter(e1)));
    }
}
