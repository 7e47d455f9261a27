use nova_interop_model::FqName;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("type parameter `{0}` is already initialized")]
    AlreadyInitialized(String),
    #[error("type parameter `{0}` needs at least one upper bound")]
    NoUpperBounds(String),
    #[error("member scope of `{0}` is already populated")]
    ScopeAlreadyPopulated(FqName),
}
