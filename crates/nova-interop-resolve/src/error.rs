use nova_interop_descriptors::DescriptorError;
use nova_interop_model::FqName;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolveError>;

/// Failure to resolve one declaration.
///
/// Absence is never an error: lookups of unknown names return `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("class {class} expects {expected} type argument(s), found {found}")]
    ArityMismatch {
        class: FqName,
        expected: usize,
        found: usize,
    },

    #[error("type variable {name} is not in scope ({context})")]
    UnresolvedTypeVariable { name: String, context: String },

    #[error("unsupported type shape: {0}")]
    UnsupportedType(String),

    #[error("ambiguous property {name} in {owner}: {reason}")]
    AmbiguousProperty {
        owner: FqName,
        name: String,
        reason: String,
    },

    #[error("invalid generic signature: {0}")]
    InvalidSignature(#[from] nova_interop_signature::Error),

    #[error("cyclic inheritance involving {0}")]
    CyclicInheritance(FqName),

    #[error("class {0} failed to resolve earlier in this session")]
    PreviouslyFailed(FqName),

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

impl ResolveError {
    /// Short stable code used for diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            ResolveError::ArityMismatch { .. } => "arity-mismatch",
            ResolveError::UnresolvedTypeVariable { .. } => "unresolved-type-variable",
            ResolveError::UnsupportedType(_) => "unsupported-type",
            ResolveError::AmbiguousProperty { .. } => "ambiguous-property",
            ResolveError::InvalidSignature(_) => "invalid-signature",
            ResolveError::CyclicInheritance(_) => "cyclic-inheritance",
            ResolveError::PreviouslyFailed(_) => "previously-failed",
            ResolveError::Descriptor(_) => "descriptor-state",
        }
    }
}
