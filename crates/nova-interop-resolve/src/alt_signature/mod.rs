//! Hand-written native signatures attached to foreign members.
//!
//! The text is parsed into a small syntax tree and then checked against the
//! automatically derived descriptor. A signature that does not fit yields an
//! error; callers report it and drop the member.

mod parser;
mod reconcile;

use thiserror::Error;

pub use self::parser::{
    parse_alt_declaration, AltArgument, AltDeclaration, AltFunction, AltParam, AltProperty,
    AltType, AltTypeKind, AltTypeParam,
};
pub use self::reconcile::{
    reconcile_function, reconcile_property_type, AutoFunction, FunctionOverlay,
};

pub(crate) const ALT_SIGNATURE_MISMATCH: &str = "alt-signature-mismatch";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AltSignatureError {
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("{0}")]
    Mismatch(String),
}
