//! Lookup of type variables by name through nested declaration scopes.
//!
//! Chains are built per call and never cached: a method scope points at its
//! class scope, which points at the outer class scope for inner classes.

use nova_interop_descriptors::{DescriptorStore, TypeParamId};

use crate::error::{ResolveError, Result};

pub trait TypeVariableResolver {
    fn lookup(&self, name: &str) -> Option<TypeParamId>;

    /// Human readable description of the declaration being resolved.
    fn context(&self) -> &str;

    fn get_type_variable(&self, name: &str) -> Result<TypeParamId> {
        self.lookup(name)
            .ok_or_else(|| ResolveError::UnresolvedTypeVariable {
                name: name.to_string(),
                context: self.context().to_string(),
            })
    }
}

impl<T: TypeVariableResolver + ?Sized> TypeVariableResolver for &T {
    fn lookup(&self, name: &str) -> Option<TypeParamId> {
        (**self).lookup(name)
    }

    fn context(&self) -> &str {
        (**self).context()
    }
}

/// End of every chain.
#[derive(Debug, Clone)]
pub struct NoTypeVariables {
    context: String,
}

impl NoTypeVariables {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
        }
    }
}

impl TypeVariableResolver for NoTypeVariables {
    fn lookup(&self, _name: &str) -> Option<TypeParamId> {
        None
    }

    fn context(&self) -> &str {
        &self.context
    }
}

/// Type parameters of an already built declaration.
pub struct DescriptorScope<'p> {
    params: Vec<(String, TypeParamId)>,
    parent: Option<Box<dyn TypeVariableResolver + 'p>>,
    context: String,
}

impl<'p> DescriptorScope<'p> {
    pub fn new(
        store: &DescriptorStore,
        params: &[TypeParamId],
        context: impl Into<String>,
    ) -> Self {
        Self {
            params: params
                .iter()
                .map(|id| (store.type_param(*id).name.clone(), *id))
                .collect(),
            parent: None,
            context: context.into(),
        }
    }

    pub fn with_parent(mut self, parent: impl TypeVariableResolver + 'p) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }
}

impl TypeVariableResolver for DescriptorScope<'_> {
    fn lookup(&self, name: &str) -> Option<TypeParamId> {
        lookup_in(&self.params, name).or_else(|| self.parent.as_ref()?.lookup(name))
    }

    fn context(&self) -> &str {
        &self.context
    }
}

/// Foreign type-parameter names paired with placeholders whose bounds are not
/// written yet, so bounds may mention any parameter of the same list.
pub struct InitializationScope<'p> {
    params: Vec<(String, TypeParamId)>,
    parent: Option<Box<dyn TypeVariableResolver + 'p>>,
    context: String,
}

impl<'p> InitializationScope<'p> {
    pub fn new(
        names: impl IntoIterator<Item = String>,
        placeholders: &[TypeParamId],
        context: impl Into<String>,
    ) -> Self {
        Self {
            params: names.into_iter().zip(placeholders.iter().copied()).collect(),
            parent: None,
            context: context.into(),
        }
    }

    pub fn with_parent(mut self, parent: impl TypeVariableResolver + 'p) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }
}

impl TypeVariableResolver for InitializationScope<'_> {
    fn lookup(&self, name: &str) -> Option<TypeParamId> {
        lookup_in(&self.params, name).or_else(|| self.parent.as_ref()?.lookup(name))
    }

    fn context(&self) -> &str {
        &self.context
    }
}

fn lookup_in(params: &[(String, TypeParamId)], name: &str) -> Option<TypeParamId> {
    params
        .iter()
        .find(|(param, _)| param == name)
        .map(|(_, id)| *id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_interop_descriptors::{TypeParamOwner, TypeParameterDescriptor, Variance};

    fn param(store: &mut DescriptorStore, name: &str) -> TypeParamId {
        store.add_type_param(TypeParameterDescriptor::new(
            TypeParamOwner::Pending,
            0,
            name,
            Variance::Invariant,
        ))
    }

    #[test]
    fn inner_scopes_shadow_outer_ones() {
        let mut store = DescriptorStore::new();
        let class_t = param(&mut store, "T");
        let class_u = param(&mut store, "U");
        let method_t = param(&mut store, "T");

        let class_scope = DescriptorScope::new(&store, &[class_t, class_u], "class a.Box");
        let method_scope =
            InitializationScope::new(["T".to_string()], &[method_t], "method get in class a.Box")
                .with_parent(&class_scope);

        assert_eq!(method_scope.lookup("T"), Some(method_t));
        assert_eq!(method_scope.lookup("U"), Some(class_u));
        assert_eq!(class_scope.lookup("T"), Some(class_t));
    }

    #[test]
    fn missing_variables_report_the_innermost_context() {
        let scope = DescriptorScope::new(&DescriptorStore::new(), &[], "method m in class a.B")
            .with_parent(NoTypeVariables::new("class a.B"));
        assert_eq!(
            scope.get_type_variable("X"),
            Err(ResolveError::UnresolvedTypeVariable {
                name: "X".to_string(),
                context: "method m in class a.B".to_string(),
            })
        );
    }
}
