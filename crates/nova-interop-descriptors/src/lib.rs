//! Native descriptors: the resolved, typed view of foreign declarations.
//!
//! Every descriptor lives in a [`DescriptorStore`] arena and is addressed by a
//! small copyable id. Types ([`NativeType`]) are plain values compared
//! structurally.

#![forbid(unsafe_code)]

mod bindings;
mod builtins;
mod class_map;
mod descriptors;
mod diagnostics;
mod error;
mod ids;
mod render;
mod store;
mod types;
mod typing;

pub use crate::bindings::{BindingTable, DescriptorRef};
pub use crate::builtins::{
    Builtins, PrimitiveType, SyntheticFamily, BUILTINS_PACKAGE, MAX_SYNTHETIC_ARITY,
};
pub use crate::class_map::{builtin_class_map, BuiltinClassMap, MappingPosition};
pub use crate::descriptors::{
    AnnotationDescriptor, CallableHeader, ClassDescriptor, ClassKind, CompileTimeConstant,
    ConstructorDescriptor, Container, FunctionDescriptor, InitState, MemberKind, MemberScope,
    Modality, PackageDescriptor, PackageKind, PropertyAccessor, PropertyDescriptor,
    TypeParamOwner, TypeParameterDescriptor, ValueParameter, Visibility,
};
pub use crate::diagnostics::{Diagnostic, DiagnosticSink, Severity};
pub use crate::error::DescriptorError;
pub use crate::ids::{
    CallableId, ClassId, ConstructorId, FunctionId, PackageId, PropertyId, TypeParamId,
};
pub use crate::store::DescriptorStore;
pub use crate::types::{NativeType, TypeConstructor, TypeProjection, Variance};
pub use crate::typing::{is_subtype, supertype_of_class, Substitution, TypeParamAxioms};
