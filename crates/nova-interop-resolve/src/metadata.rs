//! Typed views over the metadata annotations the native compiler writes.

use nova_interop_model::metadata::{self, element, flags};
use nova_interop_model::{
    Annotated, Annotation, ForeignClass, ForeignConstructor, ForeignMethod, ForeignParameter,
};

/// `JetClass`. Absent on classes written in the foreign language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ClassMetadata {
    /// Missing versions read as `0`, which no compiler ever wrote.
    pub abi_version: i32,
    pub flags: i32,
}

impl ClassMetadata {
    pub fn read(class: &ForeignClass) -> Option<Self> {
        let annotation = class.annotation(metadata::JET_CLASS)?;
        Some(Self {
            abi_version: annotation.int(element::ABI_VERSION).unwrap_or(0),
            flags: annotation.int(element::FLAGS).unwrap_or(0),
        })
    }
}

/// `JetMethod`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MethodMetadata<'a> {
    pub abi_version: i32,
    pub flags: i32,
    /// Return type (or property type for accessors) as a type signature.
    pub type_signature: Option<&'a str>,
}

impl<'a> MethodMetadata<'a> {
    pub fn read(method: &'a ForeignMethod) -> Option<Self> {
        let annotation = method.annotation(metadata::JET_METHOD)?;
        Some(Self {
            abi_version: annotation.int(element::ABI_VERSION).unwrap_or(0),
            flags: annotation.int(element::FLAGS).unwrap_or(0),
            type_signature: non_empty(annotation.string(element::TYPE)),
        })
    }

    pub fn is_property_accessor(&self) -> bool {
        self.flags & flags::PROPERTY != 0
    }

    pub fn has_nullable_return(&self) -> bool {
        self.flags & flags::NULLABLE_RETURN != 0
    }
}

/// `JetValueParameter`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ParameterMetadata<'a> {
    pub name: Option<&'a str>,
    pub type_signature: Option<&'a str>,
    pub receiver: bool,
    pub nullable: bool,
    pub has_default: bool,
}

impl<'a> ParameterMetadata<'a> {
    pub fn read(parameter: &'a ForeignParameter) -> Self {
        let Some(annotation) = parameter.annotation(metadata::JET_VALUE_PARAMETER) else {
            return Self::default();
        };
        Self {
            name: non_empty(annotation.string(element::NAME)),
            type_signature: non_empty(annotation.string(element::TYPE)),
            receiver: annotation.boolean(element::RECEIVER).unwrap_or(false),
            nullable: annotation.boolean(element::NULLABLE).unwrap_or(false),
            has_default: annotation
                .boolean(element::HAS_DEFAULT_VALUE)
                .unwrap_or(false),
        }
    }
}

/// Flags of a metadata annotation, `0` when the member has none.
pub(crate) fn member_flags(annotation: Option<&Annotation>) -> i32 {
    annotation
        .and_then(|annotation| annotation.int(element::FLAGS))
        .unwrap_or(0)
}

pub(crate) fn is_hidden_constructor(constructor: &ForeignConstructor) -> bool {
    constructor
        .annotation(metadata::JET_CONSTRUCTOR)
        .and_then(|annotation| annotation.boolean(element::HIDDEN))
        .unwrap_or(false)
}

/// Hand-written native signature attached to a foreign member.
pub(crate) fn alternative_signature(item: &impl Annotated) -> Option<&str> {
    non_empty(item.annotation(metadata::KOTLIN_SIGNATURE)?.string(element::VALUE))
}

/// Annotations that only carry metadata and never become descriptors.
pub(crate) fn is_metadata_annotation(annotation: &Annotation) -> bool {
    annotation
        .fq_name
        .as_str()
        .starts_with("jet.runtime.typeinfo.")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}
