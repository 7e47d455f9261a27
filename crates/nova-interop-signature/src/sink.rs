use crate::error::Error;
use crate::names::ClassName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Float,
    Long,
    Double,
}

impl BaseType {
    pub(crate) fn from_tag(tag: u8) -> Option<BaseType> {
        Some(match tag {
            b'Z' => BaseType::Boolean,
            b'B' => BaseType::Byte,
            b'C' => BaseType::Char,
            b'S' => BaseType::Short,
            b'I' => BaseType::Int,
            b'F' => BaseType::Float,
            b'J' => BaseType::Long,
            b'D' => BaseType::Double,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variance {
    Invariant,
    In,
    Out,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeArgument<T> {
    Star,
    Projected(Variance, T),
}

/// Receives decoded types, innermost first.
///
/// Every call returns the value for one syntactic type site; the decoder hands that
/// value to the enclosing site (array component, type argument, list entry), so the
/// sink decides what a "type" is and no intermediate tree is required.
pub trait TypeSink {
    type Output;
    type Error: From<Error>;

    fn base_type(&mut self, base: BaseType, nullable: bool) -> Result<Self::Output, Self::Error>;

    fn array_type(
        &mut self,
        component: Self::Output,
        nullable: bool,
    ) -> Result<Self::Output, Self::Error>;

    fn type_variable(&mut self, name: &str, nullable: bool) -> Result<Self::Output, Self::Error>;

    fn class_type(
        &mut self,
        class: ClassName,
        arguments: Vec<TypeArgument<Self::Output>>,
        nullable: bool,
    ) -> Result<Self::Output, Self::Error>;
}
