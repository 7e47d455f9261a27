use nova_interop_descriptors::{
    builtin_class_map, ClassId, MappingPosition, NativeType, PrimitiveType, SyntheticFamily,
    TypeProjection, Variance,
};
use nova_interop_model::FqName;
use nova_interop_signature::{
    BaseType, ClassName, TypeArgument, TypeSink, Variance as SignatureVariance,
};

use crate::error::{ResolveError, Result};
use crate::resolver::JavaDescriptorResolver;
use crate::transform::normalize_projection;
use crate::type_variables::TypeVariableResolver;

/// Builds native types straight from the decoder's callbacks.
pub(crate) struct NativeTypeSink<'r, 'm> {
    resolver: &'r mut JavaDescriptorResolver<'m>,
    vars: &'r dyn TypeVariableResolver,
    position: MappingPosition,
}

impl<'r, 'm> NativeTypeSink<'r, 'm> {
    pub fn new(
        resolver: &'r mut JavaDescriptorResolver<'m>,
        vars: &'r dyn TypeVariableResolver,
        position: MappingPosition,
    ) -> Self {
        Self {
            resolver,
            vars,
            position,
        }
    }

    fn named_class(&mut self, fq_name: &FqName) -> Result<Option<ClassId>> {
        match builtin_class_map().map_class(fq_name, self.position) {
            Some(native) => Ok(self.resolver.store.builtin_class(native)),
            None => self.resolver.resolve_class(fq_name),
        }
    }
}

fn synthetic_family(class: &ClassName) -> Option<(SyntheticFamily, usize)> {
    match class {
        ClassName::Function(arity) => Some((SyntheticFamily::Function, *arity)),
        ClassName::ExtensionFunction(arity) => Some((SyntheticFamily::ExtensionFunction, *arity)),
        ClassName::Tuple(arity) => Some((SyntheticFamily::Tuple, *arity)),
        ClassName::Named(_) => None,
    }
}

pub(crate) fn primitive_of(base: BaseType) -> PrimitiveType {
    match base {
        BaseType::Boolean => PrimitiveType::Boolean,
        BaseType::Byte => PrimitiveType::Byte,
        BaseType::Char => PrimitiveType::Char,
        BaseType::Short => PrimitiveType::Short,
        BaseType::Int => PrimitiveType::Int,
        BaseType::Float => PrimitiveType::Float,
        BaseType::Long => PrimitiveType::Long,
        BaseType::Double => PrimitiveType::Double,
    }
}

pub(crate) fn variance_of(variance: SignatureVariance) -> Variance {
    match variance {
        SignatureVariance::Invariant => Variance::Invariant,
        SignatureVariance::In => Variance::In,
        SignatureVariance::Out => Variance::Out,
    }
}

impl TypeSink for NativeTypeSink<'_, '_> {
    type Output = NativeType;
    type Error = ResolveError;

    fn base_type(&mut self, base: BaseType, nullable: bool) -> Result<NativeType> {
        Ok(self
            .resolver
            .store
            .builtins()
            .primitive_type(primitive_of(base))
            .with_nullability(nullable))
    }

    fn array_type(&mut self, component: NativeType, nullable: bool) -> Result<NativeType> {
        let builtins = self.resolver.store.builtins();
        let primitive = component
            .class_id()
            .and_then(|class| builtins.primitive_of(class));
        let array = match primitive {
            Some(primitive) if !component.nullable => {
                NativeType::simple(builtins.primitive_array(primitive))
            }
            _ => builtins.array_type(component),
        };
        Ok(array.with_nullability(nullable))
    }

    fn type_variable(&mut self, name: &str, nullable: bool) -> Result<NativeType> {
        let param = self.vars.get_type_variable(name)?;
        Ok(NativeType::type_parameter(param).with_nullability(nullable))
    }

    fn class_type(
        &mut self,
        class: ClassName,
        arguments: Vec<TypeArgument<NativeType>>,
        nullable: bool,
    ) -> Result<NativeType> {
        let internal = class.internal_name();
        let fq_name = FqName::from_internal(&internal);
        let class = match synthetic_family(&class) {
            Some((family, arity)) => {
                let expected = family.type_param_count(arity);
                if !arguments.is_empty() && arguments.len() != expected {
                    return Err(ResolveError::ArityMismatch {
                        class: fq_name,
                        expected,
                        found: arguments.len(),
                    });
                }
                self.resolver.store.synthetic_class(family, arity)
            }
            None => {
                if arguments.is_empty() {
                    if let Some(primitive) = builtin_class_map().map_boxed(&fq_name) {
                        return Ok(self
                            .resolver
                            .store
                            .builtins()
                            .primitive_type(primitive)
                            .with_nullability(nullable));
                    }
                }
                match self.named_class(&fq_name)? {
                    Some(class) => Some(class),
                    // A top-level class whose own name contains `$`.
                    None if internal.contains('$') => self
                        .resolver
                        .resolve_class(&FqName::from_internal_verbatim(&internal))?,
                    None => None,
                }
            }
        };
        let Some(class) = class else {
            return Ok(NativeType::unresolved(fq_name).with_nullability(nullable));
        };

        let store = &self.resolver.store;
        let params = &store.class(class).type_params;
        let projections = if arguments.is_empty() {
            params.iter().map(|_| TypeProjection::Star).collect()
        } else if arguments.len() != params.len() {
            return Err(ResolveError::ArityMismatch {
                class: store.class(class).fq_name.clone(),
                expected: params.len(),
                found: arguments.len(),
            });
        } else {
            params
                .iter()
                .zip(arguments)
                .map(|(param, argument)| {
                    let projection = match argument {
                        TypeArgument::Star => TypeProjection::Star,
                        TypeArgument::Projected(variance, ty) => {
                            TypeProjection::Projected(variance_of(variance), ty)
                        }
                    };
                    normalize_projection(store.type_param(*param).variance, projection)
                })
                .collect()
        };
        Ok(NativeType::class(class, projections).with_nullability(nullable))
    }
}
