//! Foreign types to native types.

use nova_interop_descriptors::{
    builtin_class_map, MappingPosition, NativeType, TypeParamId, TypeProjection, Variance,
};
use nova_interop_model::{FqName, ForeignType, PrimitiveKind, WildcardBound};
use nova_interop_signature::decode_type;

use crate::error::{ResolveError, Result};
use crate::resolver::JavaDescriptorResolver;
use crate::signature_sink::NativeTypeSink;
use crate::type_variables::TypeVariableResolver;

/// Where a foreign type occurs; decides nullability, collection mutability and
/// how raw uses and arrays are projected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeUsage {
    TypeArgument,
    UpperBound,
    /// Return types.
    MemberSignatureCovariant,
    /// Parameter types.
    MemberSignatureContravariant,
    /// Field types.
    MemberSignatureInvariant,
    Supertype,
    SupertypeArgument,
}

impl TypeUsage {
    pub(crate) fn mapping_position(self) -> MappingPosition {
        match self {
            TypeUsage::Supertype | TypeUsage::MemberSignatureCovariant => {
                MappingPosition::Covariant
            }
            _ => MappingPosition::Ordinary,
        }
    }

    fn class_is_nullable(self) -> bool {
        !matches!(
            self,
            TypeUsage::TypeArgument | TypeUsage::SupertypeArgument | TypeUsage::Supertype
        )
    }

    fn variable_is_nullable(self) -> bool {
        !matches!(
            self,
            TypeUsage::TypeArgument | TypeUsage::UpperBound | TypeUsage::SupertypeArgument
        )
    }

    fn argument_usage(self) -> TypeUsage {
        if self == TypeUsage::Supertype {
            TypeUsage::SupertypeArgument
        } else {
            TypeUsage::TypeArgument
        }
    }
}

/// `out T` against a parameter declared `out` is just `T`.
pub(crate) fn normalize_projection(
    declared: Variance,
    projection: TypeProjection,
) -> TypeProjection {
    match projection {
        TypeProjection::Projected(variance, ty)
            if variance == declared && variance != Variance::Invariant =>
        {
            TypeProjection::invariant(ty)
        }
        other => other,
    }
}

impl<'m> JavaDescriptorResolver<'m> {
    pub fn transform(
        &mut self,
        ty: &ForeignType,
        usage: TypeUsage,
        vars: &dyn TypeVariableResolver,
    ) -> Result<NativeType> {
        match ty {
            ForeignType::Primitive(PrimitiveKind::Void) => Ok(self.store.builtins().unit_type()),
            ForeignType::Primitive(kind) => {
                let primitive = builtin_class_map()
                    .map_primitive(*kind)
                    .ok_or_else(|| ResolveError::UnsupportedType(kind.keyword().to_string()))?;
                Ok(self.store.builtins().primitive_type(primitive))
            }
            ForeignType::Class { name, arguments } => {
                self.transform_class(name, arguments, usage, vars)
            }
            ForeignType::Array(component) => self.transform_array(component, usage, vars),
            ForeignType::TypeVariable(name) => {
                let param = vars.get_type_variable(name)?;
                Ok(NativeType::type_parameter(param).with_nullability(usage.variable_is_nullable()))
            }
            ForeignType::Wildcard(_) | ForeignType::Intersection(_) => {
                Err(ResolveError::UnsupportedType(ty.to_string()))
            }
        }
    }

    /// Type of the trailing parameter of a varargs method: the array type (not
    /// null) and its element type.
    pub fn transform_vararg(
        &mut self,
        component: &ForeignType,
        vars: &dyn TypeVariableResolver,
    ) -> Result<(NativeType, NativeType)> {
        if let ForeignType::Primitive(kind) = component {
            if let Some(primitive) = builtin_class_map().map_primitive(*kind) {
                let builtins = self.store.builtins();
                return Ok((
                    NativeType::simple(builtins.primitive_array(primitive)),
                    builtins.primitive_type(primitive),
                ));
            }
        }
        let element = self.transform(component, TypeUsage::MemberSignatureContravariant, vars)?;
        let array = NativeType::class(
            self.store.builtins().array,
            vec![TypeProjection::Projected(Variance::Out, element.clone())],
        );
        Ok((array, element))
    }

    /// Decodes a native type signature; nullability comes from the string.
    pub fn transform_signature(
        &mut self,
        signature: &str,
        vars: &dyn TypeVariableResolver,
    ) -> Result<NativeType> {
        self.decode_signature(signature, vars, MappingPosition::Ordinary)
    }

    pub(crate) fn decode_signature(
        &mut self,
        signature: &str,
        vars: &dyn TypeVariableResolver,
        position: MappingPosition,
    ) -> Result<NativeType> {
        let mut sink = NativeTypeSink::new(self, vars, position);
        decode_type(signature, &mut sink)
    }

    fn transform_class(
        &mut self,
        name: &FqName,
        arguments: &[ForeignType],
        usage: TypeUsage,
        vars: &dyn TypeVariableResolver,
    ) -> Result<NativeType> {
        let nullable = usage.class_is_nullable();
        let class_map = builtin_class_map();
        if let Some(primitive) = class_map.map_boxed(name) {
            return Ok(self
                .store
                .builtins()
                .primitive_type(primitive)
                .with_nullability(nullable));
        }

        let class = match class_map.map_class(name, usage.mapping_position()) {
            Some(native) => self.store.builtin_class(native),
            None => self.resolve_class(name)?,
        };
        let Some(class) = class else {
            return Ok(NativeType::unresolved(name.clone()).with_nullability(nullable));
        };

        let params = self.store.class(class).type_params.clone();
        let projections = if arguments.is_empty() {
            params
                .iter()
                .map(|param| self.raw_projection(*param, usage))
                .collect()
        } else {
            if arguments.len() != params.len() {
                return Err(ResolveError::ArityMismatch {
                    class: self.store.class(class).fq_name.clone(),
                    expected: params.len(),
                    found: arguments.len(),
                });
            }
            let mut projections = Vec::with_capacity(arguments.len());
            for (param, argument) in params.iter().zip(arguments) {
                projections.push(self.transform_argument(
                    *param,
                    argument,
                    usage.argument_usage(),
                    vars,
                )?);
            }
            projections
        };
        Ok(NativeType::class(class, projections).with_nullability(nullable))
    }

    /// Supertype arguments cannot be projections, so a raw supertype uses the
    /// parameter's bound instead of a star.
    fn raw_projection(&self, param: TypeParamId, usage: TypeUsage) -> TypeProjection {
        if usage != TypeUsage::Supertype {
            return TypeProjection::Star;
        }
        let bound = self
            .store
            .type_param(param)
            .upper_bounds()
            .first()
            .cloned()
            .unwrap_or_else(|| self.store.builtins().nullable_any_type());
        TypeProjection::invariant(bound)
    }

    fn transform_argument(
        &mut self,
        param: TypeParamId,
        argument: &ForeignType,
        usage: TypeUsage,
        vars: &dyn TypeVariableResolver,
    ) -> Result<TypeProjection> {
        let projection = match argument {
            ForeignType::Wildcard(WildcardBound::Unbounded) => return Ok(TypeProjection::Star),
            ForeignType::Wildcard(WildcardBound::Extends(bound)) => TypeProjection::Projected(
                Variance::Out,
                self.transform(bound, TypeUsage::UpperBound, vars)?,
            ),
            ForeignType::Wildcard(WildcardBound::Super(bound)) => TypeProjection::Projected(
                Variance::In,
                self.transform(bound, TypeUsage::UpperBound, vars)?,
            ),
            other => TypeProjection::invariant(self.transform(other, usage, vars)?),
        };
        Ok(normalize_projection(
            self.store.type_param(param).variance,
            projection,
        ))
    }

    fn transform_array(
        &mut self,
        component: &ForeignType,
        usage: TypeUsage,
        vars: &dyn TypeVariableResolver,
    ) -> Result<NativeType> {
        if let ForeignType::Primitive(kind) = component {
            if let Some(primitive) = builtin_class_map().map_primitive(*kind) {
                let array = self.store.builtins().primitive_array(primitive);
                return Ok(NativeType::simple(array).make_nullable());
            }
        }
        let element = self.transform(component, TypeUsage::TypeArgument, vars)?;
        let variance = if usage == TypeUsage::MemberSignatureContravariant {
            Variance::Out
        } else {
            Variance::Invariant
        };
        let array = self.store.builtins().array;
        let projection = TypeProjection::Projected(variance, element);
        Ok(NativeType::class(array, vec![projection]).make_nullable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_variables::NoTypeVariables;
    use nova_interop_config::ResolverConfig;
    use nova_interop_model::{ForeignClass, ForeignClassKind, InMemoryClassModel};

    #[test]
    fn boxed_primitives_keep_usage_nullability() {
        let model = InMemoryClassModel::new();
        let mut resolver = JavaDescriptorResolver::new(&model, ResolverConfig::default());
        let vars = NoTypeVariables::new("test");
        let integer = ForeignType::class("java.lang.Integer");

        let ty = resolver
            .transform(&integer, TypeUsage::MemberSignatureInvariant, &vars)
            .unwrap();
        assert_eq!(resolver.store().render_type(&ty), "Int?");
        let ty = resolver
            .transform(&integer, TypeUsage::TypeArgument, &vars)
            .unwrap();
        assert_eq!(resolver.store().render_type(&ty), "Int");
    }

    #[test]
    fn wildcards_outside_arguments_are_unsupported() {
        let model = InMemoryClassModel::new();
        let mut resolver = JavaDescriptorResolver::new(&model, ResolverConfig::default());
        let vars = NoTypeVariables::new("test");
        let err = resolver
            .transform(
                &ForeignType::extends(ForeignType::class("java.lang.Number")),
                TypeUsage::MemberSignatureInvariant,
                &vars,
            )
            .unwrap_err();
        assert_eq!(err.code(), "unsupported-type");
    }

    #[test]
    fn declared_variance_is_normalized_away() {
        let mut model = InMemoryClassModel::new();
        model
            .add_class(
                ForeignClass::builder("a.Holder", ForeignClassKind::Class)
                    .signature("<out T:?Ljava/lang/Object;>Ljava/lang/Object;")
                    .build(),
            )
            .unwrap();
        let mut resolver = JavaDescriptorResolver::new(&model, ResolverConfig::default());
        let vars = NoTypeVariables::new("test");
        let ty = resolver
            .transform(
                &ForeignType::generic(
                    "a.Holder",
                    vec![ForeignType::extends(ForeignType::class("java.lang.String"))],
                ),
                TypeUsage::MemberSignatureInvariant,
                &vars,
            )
            .unwrap();
        assert_eq!(resolver.store().render_type(&ty), "Holder<String?>?");
    }

    #[test]
    fn raw_use_projects_every_parameter_as_star() {
        let mut model = InMemoryClassModel::new();
        model
            .add_class(
                ForeignClass::builder("a.Pair", ForeignClassKind::Class)
                    .type_param("A", Vec::new())
                    .type_param("B", Vec::new())
                    .build(),
            )
            .unwrap();
        let mut resolver = JavaDescriptorResolver::new(&model, ResolverConfig::default());
        let vars = NoTypeVariables::new("test");
        let ty = resolver
            .transform(
                &ForeignType::class("a.Pair"),
                TypeUsage::MemberSignatureInvariant,
                &vars,
            )
            .unwrap();
        assert_eq!(ty.arguments.len(), 2);
        assert!(ty.arguments.iter().all(|arg| *arg == TypeProjection::Star));
        assert_eq!(resolver.store().render_type(&ty), "Pair<*, *>?");
    }

    #[test]
    fn collections_are_mutable_only_in_covariant_positions() {
        let model = InMemoryClassModel::new();
        let mut resolver = JavaDescriptorResolver::new(&model, ResolverConfig::default());
        let vars = NoTypeVariables::new("test");
        let iterable = ForeignType::generic(
            "java.lang.Iterable",
            vec![ForeignType::class("java.lang.String")],
        );
        let mut rendered = Vec::new();
        for usage in [TypeUsage::MemberSignatureInvariant, TypeUsage::Supertype] {
            let ty = resolver.transform(&iterable, usage, &vars).unwrap();
            rendered.push(resolver.store().render_type(&ty));
        }
        assert_eq!(rendered, vec!["Iterable<String>?", "MutableIterable<String>"]);
    }
}
