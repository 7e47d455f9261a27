//! Session state of the resolver: caches keyed by qualified name, the
//! descriptor arena and everything reported along the way.

use std::collections::{HashMap, HashSet};

use nova_interop_config::ResolverConfig;
use nova_interop_descriptors::{
    BindingTable, ClassId, Container, DescriptorStore, Diagnostic, MappingPosition, NativeType,
    PackageId, PrimitiveType, TypeParamId, TypeParamOwner, TypeParameterDescriptor,
    TypeProjection, Variance, Visibility,
};
use nova_interop_model::metadata::flags;
use nova_interop_model::{
    Annotated, ClassModel, DeclarationSite, FqName, ForeignClass, ForeignTypeParameter, Modifiers,
};
use nova_interop_signature::FormalTypeParameter;

use crate::abi::AbiGate;
use crate::error::{ResolveError, Result};
use crate::signature_sink::{variance_of, NativeTypeSink};
use crate::transform::TypeUsage;
use crate::type_variables::{DescriptorScope, TypeVariableResolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClassEntry {
    Resolved(ClassId),
    /// Not in the model, or excluded by the ABI gate.
    Missing,
    Failed,
}

/// Where the members of a class scope come from.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ScopeSource<'m> {
    Instance(&'m ForeignClass),
    /// Static members of an enum, exposed through its class object.
    EnumStatics(&'m ForeignClass),
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum PackageSource<'m> {
    Proper { facade: Option<&'m ForeignClass> },
    ClassStatics(&'m ForeignClass),
}

/// Type parameters as declared, either in a native signature or in the
/// foreign declaration.
pub(crate) enum TypeParamSource<'a, 's> {
    Signature(&'a [FormalTypeParameter<'s>]),
    Foreign(&'a [ForeignTypeParameter]),
}

impl TypeParamSource<'_, '_> {
    pub fn names(&self) -> Vec<String> {
        match self {
            TypeParamSource::Signature(params) => {
                params.iter().map(|param| param.name.to_string()).collect()
            }
            TypeParamSource::Foreign(params) => {
                params.iter().map(|param| param.name.clone()).collect()
            }
        }
    }
}

/// Translates foreign declarations into native descriptors on demand.
///
/// Every class is built at most once per resolver; asking for it again yields
/// the same [`ClassId`]. Member scopes are computed lazily on first access.
pub struct JavaDescriptorResolver<'m> {
    pub(crate) model: &'m dyn ClassModel,
    pub(crate) config: ResolverConfig,
    pub(crate) store: DescriptorStore,
    pub(crate) classes: HashMap<FqName, ClassEntry>,
    pub(crate) packages: HashMap<FqName, Option<PackageId>>,
    pub(crate) class_sources: HashMap<ClassId, ScopeSource<'m>>,
    pub(crate) package_sources: HashMap<PackageId, PackageSource<'m>>,
    pub(crate) scopes_in_progress: HashSet<ClassId>,
    /// Classes whose initialization is running, innermost last.
    pub(crate) initializing: Vec<ClassId>,
    /// Classes that finished while an outer class was still initializing.
    /// They stay provisional until the outermost class commits.
    pub(crate) provisional: Vec<ClassId>,
    pub(crate) bindings: BindingTable,
    diagnostics: Vec<Diagnostic>,
    pub(crate) abi: AbiGate,
}

impl<'m> JavaDescriptorResolver<'m> {
    pub fn new(model: &'m dyn ClassModel, config: ResolverConfig) -> Self {
        let abi = AbiGate::new(config.abi_version);
        Self {
            model,
            config,
            store: DescriptorStore::new(),
            classes: HashMap::new(),
            packages: HashMap::new(),
            class_sources: HashMap::new(),
            package_sources: HashMap::new(),
            scopes_in_progress: HashSet::new(),
            initializing: Vec::new(),
            provisional: Vec::new(),
            bindings: BindingTable::new(),
            diagnostics: Vec::new(),
            abi,
        }
    }

    pub fn store(&self) -> &DescriptorStore {
        &self.store
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Records a failure that only drops one declaration.
    pub(crate) fn report_error(&mut self, err: &ResolveError, site: DeclarationSite) {
        tracing::debug!(
            target: "nova.interop.resolve",
            %site,
            code = err.code(),
            error = %err,
            "declaration skipped"
        );
        self.report(Diagnostic::error(err.code(), err.to_string(), Some(site)));
    }

    pub(crate) fn has_not_null_annotation(&self, item: &impl Annotated) -> bool {
        item.annotations()
            .iter()
            .any(|annotation| self.config.is_not_null_annotation(annotation.fq_name.as_str()))
    }

    /// Type parameters of `class`, chained to the outer class for inner classes.
    pub(crate) fn class_scope(&self, class: ClassId) -> DescriptorScope<'static> {
        let descriptor = self.store.class(class);
        let scope = DescriptorScope::new(
            &self.store,
            &descriptor.type_params,
            format!("class {}", descriptor.fq_name),
        );
        match descriptor.container {
            Container::Class(outer) if descriptor.is_inner => {
                scope.with_parent(self.class_scope(outer))
            }
            _ => scope,
        }
    }

    /// Allocates uninitialized type parameters; bounds are written later.
    pub(crate) fn create_type_params(
        &mut self,
        owner: TypeParamOwner,
        source: &TypeParamSource<'_, '_>,
    ) -> Vec<TypeParamId> {
        let declared: Vec<(String, Variance, bool)> = match source {
            TypeParamSource::Signature(params) => params
                .iter()
                .map(|param| (param.name.to_string(), variance_of(param.variance), param.reified))
                .collect(),
            TypeParamSource::Foreign(params) => params
                .iter()
                .map(|param| (param.name.clone(), Variance::Invariant, false))
                .collect(),
        };
        declared
            .into_iter()
            .enumerate()
            .map(|(index, (name, variance, reified))| {
                let mut param = TypeParameterDescriptor::new(owner, index, &name, variance);
                param.reified = reified;
                self.store.add_type_param(param)
            })
            .collect()
    }

    /// Upper bounds per type parameter; an unbounded parameter gets `Any?`.
    pub(crate) fn type_param_bounds(
        &mut self,
        source: &TypeParamSource<'_, '_>,
        vars: &dyn TypeVariableResolver,
    ) -> Result<Vec<Vec<NativeType>>> {
        let mut all = Vec::new();
        match source {
            TypeParamSource::Signature(params) => {
                for param in params.iter() {
                    let mut sink = NativeTypeSink::new(self, vars, MappingPosition::Ordinary);
                    all.push(param.decode_bounds(&mut sink)?);
                }
            }
            TypeParamSource::Foreign(params) => {
                for param in params.iter() {
                    let mut bounds = Vec::with_capacity(param.bounds.len());
                    for bound in &param.bounds {
                        bounds.push(self.transform(bound, TypeUsage::UpperBound, vars)?);
                    }
                    all.push(bounds);
                }
            }
        }
        for bounds in &mut all {
            if bounds.is_empty() {
                bounds.push(self.store.builtins().nullable_any_type());
            }
        }
        Ok(all)
    }

    pub(crate) fn initialize_type_params(
        &mut self,
        params: &[TypeParamId],
        bounds: Vec<Vec<NativeType>>,
    ) -> Result<()> {
        for (param, bounds) in params.iter().zip(bounds) {
            self.store.initialize_type_param(*param, bounds)?;
        }
        Ok(())
    }

    /// Element type of an array type, including primitive arrays.
    pub(crate) fn array_element(&self, ty: &NativeType) -> Option<NativeType> {
        let class = ty.class_id()?;
        let builtins = self.store.builtins();
        if class == builtins.array {
            return ty.arguments.first().and_then(TypeProjection::ty).cloned();
        }
        PrimitiveType::ALL
            .into_iter()
            .find(|primitive| builtins.primitive_array(*primitive) == class)
            .map(|primitive| builtins.primitive_type(primitive))
    }
}

/// Metadata flags win over foreign modifiers; no modifier means package-private.
pub(crate) fn visibility_from(metadata_flags: i32, modifiers: Modifiers) -> Visibility {
    if metadata_flags & flags::PRIVATE != 0 {
        Visibility::Private
    } else if metadata_flags & flags::INTERNAL != 0 {
        Visibility::Internal
    } else if modifiers.is_public() {
        Visibility::Public
    } else if modifiers.is_protected() {
        Visibility::Protected
    } else if modifiers.is_private() {
        Visibility::Private
    } else {
        Visibility::Package
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_interop_model::{ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC};

    #[test]
    fn metadata_visibility_overrides_modifiers() {
        let public = Modifiers::from_flags(ACC_PUBLIC);
        assert_eq!(visibility_from(0, public), Visibility::Public);
        assert_eq!(visibility_from(flags::INTERNAL, public), Visibility::Internal);
        assert_eq!(visibility_from(flags::PRIVATE, public), Visibility::Private);
        assert_eq!(
            visibility_from(0, Modifiers::from_flags(ACC_PROTECTED)),
            Visibility::Protected
        );
        assert_eq!(
            visibility_from(0, Modifiers::from_flags(ACC_PRIVATE)),
            Visibility::Private
        );
        assert_eq!(visibility_from(0, Modifiers::from_flags(0)), Visibility::Package);
    }
}
