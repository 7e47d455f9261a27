use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    UnexpectedEnd {
        signature: String,
        expected: &'static str,
    },
    UnexpectedChar {
        signature: String,
        offset: usize,
        found: char,
        expected: &'static str,
    },
    EmptyIdentifier {
        signature: String,
        offset: usize,
    },
    TrailingInput {
        signature: String,
        offset: usize,
    },
}

impl Error {
    /// Byte offset into the signature where decoding stopped.
    pub fn offset(&self) -> usize {
        match self {
            Error::UnexpectedEnd { signature, .. } => signature.len(),
            Error::UnexpectedChar { offset, .. }
            | Error::EmptyIdentifier { offset, .. }
            | Error::TrailingInput { offset, .. } => *offset,
        }
    }

    pub fn signature(&self) -> &str {
        match self {
            Error::UnexpectedEnd { signature, .. }
            | Error::UnexpectedChar { signature, .. }
            | Error::EmptyIdentifier { signature, .. }
            | Error::TrailingInput { signature, .. } => signature,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnexpectedEnd {
                signature,
                expected,
            } => write!(f, "unexpected end of signature `{signature}`: expected {expected}"),
            Error::UnexpectedChar {
                signature,
                offset,
                found,
                expected,
            } => write!(
                f,
                "unexpected `{found}` at offset {offset} in signature `{signature}`: expected {expected}"
            ),
            Error::EmptyIdentifier { signature, offset } => {
                write!(f, "empty identifier at offset {offset} in signature `{signature}`")
            }
            Error::TrailingInput { signature, offset } => {
                write!(f, "trailing input at offset {offset} in signature `{signature}`")
            }
        }
    }
}

impl std::error::Error for Error {}
