use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InvalidDescriptor(String),
    DuplicateClass(String),
    OuterClassMissing { class: String, outer: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidDescriptor(desc) => write!(f, "invalid descriptor: {desc}"),
            Error::DuplicateClass(name) => write!(f, "class {name} is already defined"),
            Error::OuterClassMissing { class, outer } => {
                write!(f, "outer class {outer} of {class} is not defined")
            }
        }
    }
}

impl std::error::Error for Error {}
