use std::fmt;

use crate::name::FqName;

/// Points at one declaration of the foreign model.
///
/// Methods and constructors are addressed by their position in the owner's
/// declaration list, which is stable for the lifetime of a model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeclarationSite {
    Package(FqName),
    Class(FqName),
    Method {
        owner: FqName,
        name: String,
        index: usize,
    },
    Field {
        owner: FqName,
        name: String,
    },
    Constructor {
        owner: FqName,
        index: usize,
    },
}

impl DeclarationSite {
    pub fn owner(&self) -> &FqName {
        match self {
            DeclarationSite::Package(name) | DeclarationSite::Class(name) => name,
            DeclarationSite::Method { owner, .. }
            | DeclarationSite::Field { owner, .. }
            | DeclarationSite::Constructor { owner, .. } => owner,
        }
    }
}

impl fmt::Display for DeclarationSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationSite::Package(name) => write!(f, "package {name}"),
            DeclarationSite::Class(name) => write!(f, "class {name}"),
            DeclarationSite::Method { owner, name, .. } => {
                write!(f, "method {name} in class {owner}")
            }
            DeclarationSite::Field { owner, name } => write!(f, "field {name} in class {owner}"),
            DeclarationSite::Constructor { owner, index } => {
                write!(f, "constructor #{index} of class {owner}")
            }
        }
    }
}
