use std::fmt;

use crate::name::FqName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl PrimitiveKind {
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Void => "void",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WildcardBound {
    Unbounded,
    Extends(Box<ForeignType>),
    Super(Box<ForeignType>),
}

/// A type as the foreign model spells it.
///
/// A class type with no arguments whose class declares type parameters is a raw use.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ForeignType {
    Primitive(PrimitiveKind),
    Class {
        name: FqName,
        arguments: Vec<ForeignType>,
    },
    Array(Box<ForeignType>),
    Wildcard(WildcardBound),
    TypeVariable(String),
    Intersection(Vec<ForeignType>),
}

impl ForeignType {
    pub fn class(name: impl Into<FqName>) -> Self {
        ForeignType::Class {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<FqName>, arguments: Vec<ForeignType>) -> Self {
        ForeignType::Class {
            name: name.into(),
            arguments,
        }
    }

    pub fn array(component: ForeignType) -> Self {
        ForeignType::Array(Box::new(component))
    }

    pub fn type_variable(name: &str) -> Self {
        ForeignType::TypeVariable(name.to_string())
    }

    pub fn extends(bound: ForeignType) -> Self {
        ForeignType::Wildcard(WildcardBound::Extends(Box::new(bound)))
    }

    pub fn super_of(bound: ForeignType) -> Self {
        ForeignType::Wildcard(WildcardBound::Super(Box::new(bound)))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, ForeignType::Primitive(PrimitiveKind::Void))
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, ForeignType::Primitive(PrimitiveKind::Boolean))
    }

    pub fn class_name(&self) -> Option<&FqName> {
        match self {
            ForeignType::Class { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Erasure rendered as text; generic arguments and wildcard bounds are dropped.
    pub fn erased(&self) -> String {
        match self {
            ForeignType::Primitive(kind) => kind.keyword().to_string(),
            ForeignType::Class { name, .. } => name.as_str().to_string(),
            ForeignType::Array(component) => format!("{}[]", component.erased()),
            ForeignType::Wildcard(_) => "?".to_string(),
            ForeignType::TypeVariable(name) => name.clone(),
            ForeignType::Intersection(parts) => parts
                .iter()
                .map(ForeignType::erased)
                .collect::<Vec<_>>()
                .join("&"),
        }
    }
}

impl fmt::Display for ForeignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForeignType::Primitive(kind) => f.write_str(kind.keyword()),
            ForeignType::Class { name, arguments } => {
                write!(f, "{name}")?;
                if !arguments.is_empty() {
                    f.write_str("<")?;
                    for (idx, arg) in arguments.iter().enumerate() {
                        if idx > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            ForeignType::Array(component) => write!(f, "{component}[]"),
            ForeignType::Wildcard(WildcardBound::Unbounded) => f.write_str("?"),
            ForeignType::Wildcard(WildcardBound::Extends(bound)) => write!(f, "? extends {bound}"),
            ForeignType::Wildcard(WildcardBound::Super(bound)) => write!(f, "? super {bound}"),
            ForeignType::TypeVariable(name) => f.write_str(name),
            ForeignType::Intersection(parts) => {
                for (idx, part) in parts.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" & ")?;
                    }
                    write!(f, "{part}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erasure_drops_arguments() {
        let ty = ForeignType::generic(
            "java.util.List",
            vec![ForeignType::extends(ForeignType::class("java.lang.Number"))],
        );
        assert_eq!(ty.erased(), "java.util.List");
        assert_eq!(ty.to_string(), "java.util.List<? extends java.lang.Number>");
        assert_eq!(
            ForeignType::array(ForeignType::Primitive(PrimitiveKind::Int)).erased(),
            "int[]"
        );
    }
}
