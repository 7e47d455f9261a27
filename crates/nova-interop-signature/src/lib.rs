//! Decoder for generic signatures.
//!
//! The grammar is the JVM `Signature` attribute syntax plus the native compiler's
//! markers: `?` before any type makes that occurrence nullable, formal type
//! parameters may carry `reified ` and `in `/`out ` prefixes, and method signatures
//! list thrown types after `^`.

#![forbid(unsafe_code)]

mod decoder;
mod error;
mod names;
mod sink;
mod tree;

pub use crate::decoder::{
    decode_type, parse_class_signature, parse_formal_type_parameters, parse_method_signature,
    validate_type, ClassSignature, FormalTypeParameter, MethodSignature,
};
pub use crate::error::{Error, Result};
pub use crate::names::{ClassName, MAX_BUILTIN_ARITY};
pub use crate::sink::{BaseType, TypeArgument, TypeSink, Variance};
pub use crate::tree::{parse_type, SignatureType, TreeBuilder};
