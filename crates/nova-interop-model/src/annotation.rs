use crate::name::FqName;
use crate::types::ForeignType;

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub fq_name: FqName,
    pub elements: Vec<(String, ElementValue)>,
}

impl Annotation {
    pub fn new(fq_name: impl Into<FqName>) -> Self {
        Self {
            fq_name: fq_name.into(),
            elements: Vec::new(),
        }
    }

    pub fn with(mut self, name: &str, value: ElementValue) -> Self {
        self.elements.push((name.to_string(), value));
        self
    }

    pub fn element(&self, name: &str) -> Option<&ElementValue> {
        self.elements
            .iter()
            .find(|(element, _)| element == name)
            .map(|(_, value)| value)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.element(name)? {
            ElementValue::Const(ConstValue::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i32> {
        match self.element(name)? {
            ElementValue::Const(ConstValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.element(name)? {
            ElementValue::Const(ConstValue::Boolean(value)) => Some(*value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Const(ConstValue),
    Enum {
        type_name: FqName,
        const_name: String,
    },
    Class(ForeignType),
    Annotation(Box<Annotation>),
    Array(Vec<ElementValue>),
}

impl ElementValue {
    pub fn string(value: &str) -> Self {
        ElementValue::Const(ConstValue::String(value.to_string()))
    }

    pub fn int(value: i32) -> Self {
        ElementValue::Const(ConstValue::Int(value))
    }

    pub fn boolean(value: bool) -> Self {
        ElementValue::Const(ConstValue::Boolean(value))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    String(String),
    Null,
}

/// Anything that can carry annotations in the foreign model.
pub trait Annotated {
    fn annotations(&self) -> &[Annotation];

    fn annotation(&self, fq_name: &str) -> Option<&Annotation> {
        self.annotations()
            .iter()
            .find(|annotation| annotation.fq_name.as_str() == fq_name)
    }

    fn has_annotation(&self, fq_name: &str) -> bool {
        self.annotation(fq_name).is_some()
    }
}
