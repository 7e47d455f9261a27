use crate::decoder::decode_type;
use crate::error::{Error, Result};
use crate::names::ClassName;
use crate::sink::{BaseType, TypeArgument, TypeSink};

/// Owned type tree for callers that want one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SignatureType {
    Base {
        base: BaseType,
        nullable: bool,
    },
    Array {
        component: Box<SignatureType>,
        nullable: bool,
    },
    TypeVariable {
        name: String,
        nullable: bool,
    },
    Class {
        class: ClassName,
        arguments: Vec<TypeArgument<SignatureType>>,
        nullable: bool,
    },
}

impl SignatureType {
    pub fn is_nullable(&self) -> bool {
        match self {
            SignatureType::Base { nullable, .. }
            | SignatureType::Array { nullable, .. }
            | SignatureType::TypeVariable { nullable, .. }
            | SignatureType::Class { nullable, .. } => *nullable,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TreeBuilder;

impl TypeSink for TreeBuilder {
    type Output = SignatureType;
    type Error = Error;

    fn base_type(&mut self, base: BaseType, nullable: bool) -> Result<SignatureType> {
        Ok(SignatureType::Base { base, nullable })
    }

    fn array_type(&mut self, component: SignatureType, nullable: bool) -> Result<SignatureType> {
        Ok(SignatureType::Array {
            component: Box::new(component),
            nullable,
        })
    }

    fn type_variable(&mut self, name: &str, nullable: bool) -> Result<SignatureType> {
        Ok(SignatureType::TypeVariable {
            name: name.to_string(),
            nullable,
        })
    }

    fn class_type(
        &mut self,
        class: ClassName,
        arguments: Vec<TypeArgument<SignatureType>>,
        nullable: bool,
    ) -> Result<SignatureType> {
        Ok(SignatureType::Class {
            class,
            arguments,
            nullable,
        })
    }
}

pub fn parse_type(sig: &str) -> Result<SignatureType> {
    decode_type(sig, &mut TreeBuilder)
}
