//! Foreign class model: the declarations the interop resolver reads.

#![forbid(unsafe_code)]

mod annotation;
mod class;
mod descriptor;
mod error;
pub mod metadata;
mod model;
mod name;
mod site;
mod types;

pub use crate::annotation::{Annotated, Annotation, ConstValue, ElementValue};
pub use crate::class::{
    ClassBuilder, ForeignClass, ForeignClassKind, ForeignConstructor, ForeignField, ForeignMethod,
    ForeignParameter, ForeignTypeParameter, Modifiers, ACC_ABSTRACT, ACC_FINAL, ACC_PRIVATE,
    ACC_PROTECTED, ACC_PUBLIC, ACC_STATIC, ACC_VARARGS,
};
pub use crate::descriptor::{
    descriptor_to_fq_name, parse_field_descriptor, parse_method_descriptor, MethodDescriptor,
};
pub use crate::error::{Error, Result};
pub use crate::model::{ChainClassModel, ClassModel, ForeignPackage, InMemoryClassModel};
pub use crate::name::FqName;
pub use crate::site::DeclarationSite;
pub use crate::types::{ForeignType, PrimitiveKind, WildcardBound};
