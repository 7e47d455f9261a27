//! Checks an alternative signature against the derived descriptor and builds
//! the more specific types it describes.

use nova_interop_descriptors::{
    builtin_class_map, ClassId, DescriptorStore, NativeType, TypeConstructor, TypeParamId,
    TypeProjection, ValueParameter, Variance,
};
use nova_interop_model::FqName;

use super::parser::{
    parse_alt_declaration, AltArgument, AltDeclaration, AltType, AltTypeKind, AltTypeParam,
};
use super::AltSignatureError;

type Result<T> = std::result::Result<T, AltSignatureError>;

/// Derived shape of a function before any overlay. Type parameter bounds are
/// passed separately because they are not written to the store yet.
#[derive(Debug, Clone, Copy)]
pub struct AutoFunction<'a> {
    pub type_params: &'a [TypeParamId],
    pub type_param_bounds: &'a [Vec<NativeType>],
    pub value_params: &'a [ValueParameter],
    pub return_type: &'a NativeType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionOverlay {
    pub type_param_bounds: Vec<Vec<NativeType>>,
    pub value_params: Vec<ValueParameter>,
    pub return_type: NativeType,
}

/// `Ok(None)` when there is no alternative signature.
pub fn reconcile_function(
    store: &DescriptorStore,
    name: &str,
    alt: Option<&str>,
    auto: AutoFunction<'_>,
) -> Result<Option<FunctionOverlay>> {
    let Some(alt) = alt else {
        return Ok(None);
    };
    let AltDeclaration::Function(function) = parse_alt_declaration(alt)? else {
        return Err(mismatch(format!(
            "function `{name}` has a property alternative signature"
        )));
    };

    if function.name != name {
        return Err(mismatch(format!(
            "function names mismatch, original: {name}, alternative: {}",
            function.name
        )));
    }
    if function.params.len() != auto.value_params.len() {
        return Err(mismatch(format!(
            "method signature has {} value parameters, but alternative signature has {}",
            auto.value_params.len(),
            function.params.len()
        )));
    }
    if function.type_params.len() != auto.type_params.len() {
        return Err(mismatch(format!(
            "method signature has {} type parameters, but alternative signature has {}",
            auto.type_params.len(),
            function.type_params.len()
        )));
    }

    let reconciler = Reconciler {
        store,
        type_params: function
            .type_params
            .iter()
            .map(|param| param.name.clone())
            .zip(auto.type_params.iter().copied())
            .collect(),
    };

    let mut type_param_bounds = Vec::with_capacity(auto.type_params.len());
    for (alt_param, auto_bounds) in function.type_params.iter().zip(auto.type_param_bounds) {
        type_param_bounds.push(reconciler.bounds(alt_param, auto_bounds)?);
    }

    let mut value_params = Vec::with_capacity(auto.value_params.len());
    for (alt_param, auto_param) in function.params.iter().zip(auto.value_params) {
        let mut param = auto_param.clone();
        param.name = alt_param.name.clone();
        match (&auto_param.vararg_element, alt_param.vararg) {
            (Some(element), true) => {
                let element = reconciler.reconcile(&alt_param.ty, element)?;
                param.ty = with_element(&auto_param.ty, &element);
                param.vararg_element = Some(element);
            }
            (None, false) => param.ty = reconciler.reconcile(&alt_param.ty, &auto_param.ty)?,
            (Some(_), false) => {
                return Err(mismatch(format!(
                    "parameter `{}` is vararg in the method but not in the alternative signature",
                    auto_param.name
                )))
            }
            (None, true) => {
                return Err(mismatch(format!(
                    "parameter `{}` is vararg in the alternative signature but not in the method",
                    alt_param.name
                )))
            }
        }
        value_params.push(param);
    }

    let return_type = match &function.return_type {
        Some(alt_return) => reconciler.reconcile(alt_return, auto.return_type)?,
        None if store.builtins().is_unit(auto.return_type) => auto.return_type.clone(),
        None => {
            return Err(mismatch(format!(
                "return type is omitted in the alternative signature, but method returns `{}`",
                store.render_type(auto.return_type)
            )))
        }
    };

    Ok(Some(FunctionOverlay {
        type_param_bounds,
        value_params,
        return_type,
    }))
}

/// Checks a `val`/`var` alternative signature of a field.
pub fn reconcile_property_type(
    store: &DescriptorStore,
    name: &str,
    is_var: bool,
    alt: Option<&str>,
    auto: &NativeType,
) -> Result<Option<NativeType>> {
    let Some(alt) = alt else {
        return Ok(None);
    };
    let AltDeclaration::Property(property) = parse_alt_declaration(alt)? else {
        return Err(mismatch(format!(
            "field `{name}` has a function alternative signature"
        )));
    };
    if property.name != name {
        return Err(mismatch(format!(
            "field names mismatch, original: {name}, alternative: {}",
            property.name
        )));
    }
    if property.is_var != is_var {
        let (declared, expected) = if is_var { ("val", "var") } else { ("var", "val") };
        return Err(mismatch(format!(
            "alternative signature of field `{name}` uses `{declared}`, expected `{expected}`"
        )));
    }
    let reconciler = Reconciler {
        store,
        type_params: Vec::new(),
    };
    reconciler.reconcile(&property.ty, auto).map(Some)
}

fn mismatch(message: String) -> AltSignatureError {
    AltSignatureError::Mismatch(message)
}

/// Replaces the element of `Array<out E>`; primitive arrays stay as they are.
fn with_element(array: &NativeType, element: &NativeType) -> NativeType {
    let mut array = array.clone();
    if let Some(TypeProjection::Projected(_, ty)) = array.arguments.first_mut() {
        *ty = element.clone();
    }
    array
}

struct Reconciler<'s> {
    store: &'s DescriptorStore,
    /// Alternative names of the function's own type parameters.
    type_params: Vec<(String, TypeParamId)>,
}

impl Reconciler<'_> {
    /// A lone `Any?` bound counts as no bound at all.
    fn bounds(&self, alt: &AltTypeParam, auto: &[NativeType]) -> Result<Vec<NativeType>> {
        let nullable_any = self.store.builtins().nullable_any_type();
        let explicit: &[NativeType] = if auto.len() == 1 && auto[0] == nullable_any {
            &[]
        } else {
            auto
        };
        if alt.bounds.len() > explicit.len() {
            return Err(mismatch(format!(
                "extra upper bound #{} for type parameter {}",
                explicit.len() + 1,
                alt.name
            )));
        }
        if alt.bounds.len() < explicit.len() {
            return Err(mismatch(format!(
                "missing upper bound #{} for type parameter {}",
                alt.bounds.len() + 1,
                alt.name
            )));
        }
        if explicit.is_empty() {
            return Ok(auto.to_vec());
        }
        alt.bounds
            .iter()
            .zip(explicit)
            .map(|(alt_bound, auto_bound)| self.reconcile(alt_bound, auto_bound))
            .collect()
    }

    fn reconcile(&self, alt: &AltType, auto: &NativeType) -> Result<NativeType> {
        if alt.nullable && !auto.nullable {
            return Err(mismatch(format!(
                "auto type `{}` is not-null, while type in alternative signature is nullable: `{alt}`",
                self.store.render_type(auto)
            )));
        }
        if auto.is_error() {
            return Ok(auto.clone().with_nullability(alt.nullable));
        }

        match &alt.kind {
            AltTypeKind::Named { name, arguments } => {
                if let TypeConstructor::TypeParameter(param) = auto.constructor {
                    return self.type_parameter(alt, name, arguments, param, auto);
                }
                let class = self.matching_class(name, auto)?;
                let params = self.store.class(class).type_params.len();
                if arguments.len() != params || auto.arguments.len() != params {
                    return Err(mismatch(format!(
                        "`{alt}` has {} type arguments, `{}` has {}",
                        arguments.len(),
                        self.store.render_type(auto),
                        auto.arguments.len()
                    )));
                }
                let mut projections = Vec::with_capacity(params);
                for (alt_argument, auto_argument) in arguments.iter().zip(&auto.arguments) {
                    projections.push(self.argument(alt_argument, auto_argument)?);
                }
                Ok(NativeType::class(class, projections).with_nullability(alt.nullable))
            }
            AltTypeKind::Function { params, ret } => {
                let mut items: Vec<&AltType> = params.iter().collect();
                items.push(ret);
                let expected = FqName::new(format!("jet.Function{}", params.len()));
                self.synthetic(alt, &expected, &items, auto)
            }
            AltTypeKind::Tuple(types) => {
                let items: Vec<&AltType> = types.iter().collect();
                let expected = FqName::new(format!("jet.Tuple{}", types.len()));
                self.synthetic(alt, &expected, &items, auto)
            }
        }
    }

    fn type_parameter(
        &self,
        alt: &AltType,
        name: &str,
        arguments: &[AltArgument],
        param: TypeParamId,
        auto: &NativeType,
    ) -> Result<NativeType> {
        let own = self
            .type_params
            .iter()
            .find(|(alt_name, _)| alt_name == name)
            .map(|(_, id)| *id);
        let matches = match own {
            Some(id) => id == param,
            None => self.store.type_param(param).name == name,
        };
        if !matches || !arguments.is_empty() {
            return Err(mismatch(format!(
                "type parameter `{}` expected, found `{alt}`",
                self.store.type_param(param).name
            )));
        }
        Ok(auto.clone().with_nullability(alt.nullable))
    }

    /// The alternative may name the class itself or swap a collection for its
    /// read-only or mutable counterpart.
    fn matching_class(&self, name: &str, auto: &NativeType) -> Result<ClassId> {
        let not_matching = || {
            mismatch(format!(
                "class `{name}` does not match `{}`",
                self.store.render_type(auto)
            ))
        };
        let class = auto.class_id().ok_or_else(not_matching)?;
        let descriptor = self.store.class(class);
        if descriptor.fq_name.as_str() == name
            || descriptor.name() == name
            || self.store.render_class_name(class) == name
        {
            return Ok(class);
        }

        let builtins = self.store.builtins();
        let candidate = builtins
            .class_by_name(&FqName::new(name))
            .or_else(|| builtins.class_by_name(&FqName::new("jet").child(name)))
            .ok_or_else(not_matching)?;
        let candidate_name = &self.store.class(candidate).fq_name;
        let class_map = builtin_class_map();
        let counterparts = class_map.read_only_counterpart(&descriptor.fq_name)
            == Some(candidate_name)
            || class_map.read_only_counterpart(candidate_name) == Some(&descriptor.fq_name);
        if counterparts {
            Ok(candidate)
        } else {
            Err(not_matching())
        }
    }

    fn argument(&self, alt: &AltArgument, auto: &TypeProjection) -> Result<TypeProjection> {
        match (alt, auto) {
            (AltArgument::Star, TypeProjection::Star) => Ok(TypeProjection::Star),
            (
                AltArgument::Projected(alt_variance, alt_ty),
                TypeProjection::Projected(auto_variance, auto_ty),
            ) => {
                if alt_variance != auto_variance && *auto_variance != Variance::Invariant {
                    return Err(mismatch(format!(
                        "variance mismatch: `{}` in alternative signature, `{}` in code",
                        variance_text(*alt_variance),
                        variance_text(*auto_variance)
                    )));
                }
                Ok(TypeProjection::Projected(
                    *alt_variance,
                    self.reconcile(alt_ty, auto_ty)?,
                ))
            }
            (AltArgument::Star, TypeProjection::Projected(_, ty)) => Err(mismatch(format!(
                "star projection in alternative signature, `{}` in code",
                self.store.render_type(ty)
            ))),
            (AltArgument::Projected(_, ty), TypeProjection::Star) => Err(mismatch(format!(
                "`{ty}` in alternative signature, star projection in code"
            ))),
        }
    }

    /// Function and tuple types: arity must match the auto class.
    fn synthetic(
        &self,
        alt: &AltType,
        expected: &FqName,
        items: &[&AltType],
        auto: &NativeType,
    ) -> Result<NativeType> {
        let class = auto
            .class_id()
            .filter(|class| self.store.class(*class).fq_name == *expected)
            .ok_or_else(|| {
                mismatch(format!(
                    "`{alt}` does not match `{}`",
                    self.store.render_type(auto)
                ))
            })?;
        let mut projections = Vec::with_capacity(items.len());
        for (item, auto_argument) in items.iter().zip(&auto.arguments) {
            let TypeProjection::Projected(variance, auto_ty) = auto_argument else {
                return Err(mismatch(format!(
                    "`{alt}` does not match `{}`",
                    self.store.render_type(auto)
                )));
            };
            projections.push(TypeProjection::Projected(
                *variance,
                self.reconcile(item, auto_ty)?,
            ));
        }
        Ok(NativeType::class(class, projections).with_nullability(alt.nullable))
    }
}

fn variance_text(variance: Variance) -> &'static str {
    match variance {
        Variance::Invariant => "invariant",
        other => other.label(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_interop_descriptors::PrimitiveType;
    use pretty_assertions::assert_eq;

    fn class(store: &DescriptorStore, name: &str) -> ClassId {
        store
            .builtins()
            .class_by_name(&FqName::new(name))
            .unwrap()
    }

    fn list_of(store: &DescriptorStore, name: &str, element: NativeType) -> NativeType {
        NativeType::class(class(store, name), vec![TypeProjection::invariant(element)])
    }

    #[test]
    fn overlay_narrows_mutable_collection_and_nullability() {
        let store = DescriptorStore::new();
        let string = store.builtins().string_type();
        let auto_return = list_of(&store, "jet.MutableList", string.clone().make_nullable())
            .make_nullable();
        let auto_params = vec![ValueParameter::new(0, "p0", string.clone().make_nullable())];

        let overlay = reconcile_function(
            &store,
            "names",
            Some("fun names(prefix: String): List<String>"),
            AutoFunction {
                type_params: &[],
                type_param_bounds: &[],
                value_params: &auto_params,
                return_type: &auto_return,
            },
        )
        .unwrap()
        .unwrap();

        assert_eq!(store.render_type(&overlay.return_type), "List<String>");
        assert_eq!(overlay.value_params[0].name, "prefix");
        assert_eq!(store.render_type(&overlay.value_params[0].ty), "String");
    }

    #[test]
    fn nullable_alternative_for_not_null_type_is_rejected() {
        let store = DescriptorStore::new();
        let int = store.builtins().primitive_type(PrimitiveType::Int);
        let err = reconcile_function(
            &store,
            "size",
            Some("fun size(): Int?"),
            AutoFunction {
                type_params: &[],
                type_param_bounds: &[],
                value_params: &[],
                return_type: &int,
            },
        )
        .unwrap_err();
        let AltSignatureError::Mismatch(message) = err else {
            panic!("expected a mismatch, got {err:?}");
        };
        assert!(message.contains("not-null"), "{message}");
    }

    #[test]
    fn omitted_return_type_requires_unit() {
        let store = DescriptorStore::new();
        let unit = store.builtins().unit_type();
        let auto = AutoFunction {
            type_params: &[],
            type_param_bounds: &[],
            value_params: &[],
            return_type: &unit,
        };
        assert!(reconcile_function(&store, "run", Some("fun run()"), auto).is_ok());

        let string = store.builtins().string_type();
        let auto = AutoFunction {
            return_type: &string,
            ..auto
        };
        assert!(reconcile_function(&store, "run", Some("fun run()"), auto).is_err());
        assert_eq!(reconcile_function(&store, "run", None, auto), Ok(None));
    }

    #[test]
    fn field_overlay_checks_mutability() {
        let store = DescriptorStore::new();
        let string = store.builtins().string_type().make_nullable();
        let overlay =
            reconcile_property_type(&store, "name", true, Some("var name: String"), &string)
                .unwrap();
        assert_eq!(overlay, Some(store.builtins().string_type()));
        assert!(
            reconcile_property_type(&store, "name", true, Some("val name: String"), &string)
                .is_err()
        );
    }
}
