//! Lazy resolution of foreign (Java) declarations into native descriptors.
//!
//! [`JavaDescriptorResolver`] looks classes and packages up in a
//! [`ClassModel`](nova_interop_model::ClassModel) on demand and records the
//! results in a [`DescriptorStore`](nova_interop_descriptors::DescriptorStore).
//! Member scopes are computed on first access, including inherited members and
//! fake overrides. Problems with individual declarations become diagnostics;
//! only failures that make a whole class unusable surface as errors.

#![forbid(unsafe_code)]

pub mod alt_signature;
pub mod overrides;

mod abi;
mod annotations;
mod classes;
mod error;
mod members;
mod metadata;
mod namespaces;
mod properties;
mod resolver;
mod signature_sink;
mod transform;
mod type_variables;

pub use crate::error::{ResolveError, Result};
pub use crate::overrides::{
    is_overridable_by, resolve_overrides, resolve_unknown_visibility, Overridability, OverrideSink,
};
pub use crate::resolver::JavaDescriptorResolver;
pub use crate::transform::TypeUsage;
pub use crate::type_variables::{
    DescriptorScope, InitializationScope, NoTypeVariables, TypeVariableResolver,
};
