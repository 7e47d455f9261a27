use crate::annotation::{Annotated, Annotation, ElementValue};
use crate::descriptor::{parse_field_descriptor, parse_method_descriptor};
use crate::error::Result;
use crate::name::FqName;
use crate::types::ForeignType;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_VARARGS: u16 = 0x0080;
pub const ACC_ABSTRACT: u16 = 0x0400;

/// Access flags, JVM encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u16);

impl Modifiers {
    pub const fn from_flags(flags: u16) -> Self {
        Modifiers(flags)
    }

    pub fn flags(self) -> u16 {
        self.0
    }

    pub fn is_public(self) -> bool {
        self.0 & ACC_PUBLIC != 0
    }

    pub fn is_private(self) -> bool {
        self.0 & ACC_PRIVATE != 0
    }

    pub fn is_protected(self) -> bool {
        self.0 & ACC_PROTECTED != 0
    }

    pub fn is_static(self) -> bool {
        self.0 & ACC_STATIC != 0
    }

    pub fn is_final(self) -> bool {
        self.0 & ACC_FINAL != 0
    }

    pub fn is_abstract(self) -> bool {
        self.0 & ACC_ABSTRACT != 0
    }

    pub fn is_varargs(self) -> bool {
        self.0 & ACC_VARARGS != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForeignClassKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignTypeParameter {
    pub name: String,
    pub bounds: Vec<ForeignType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignField {
    pub name: String,
    pub modifiers: Modifiers,
    pub ty: ForeignType,
    pub annotations: Vec<Annotation>,
}

impl ForeignField {
    pub fn new(name: &str, ty: ForeignType) -> Self {
        Self {
            name: name.to_string(),
            modifiers: Modifiers::from_flags(ACC_PUBLIC),
            ty,
            annotations: Vec::new(),
        }
    }

    /// Field typed from an erased JVM descriptor such as `[Ljava/lang/String;`.
    pub fn from_descriptor(name: &str, descriptor: &str) -> Result<Self> {
        Ok(Self::new(name, parse_field_descriptor(descriptor)?))
    }

    pub fn with_modifiers(mut self, flags: u16) -> Self {
        self.modifiers = Modifiers::from_flags(flags);
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignParameter {
    pub name: Option<String>,
    pub ty: ForeignType,
    pub annotations: Vec<Annotation>,
}

impl ForeignParameter {
    pub fn new(name: Option<&str>, ty: ForeignType) -> Self {
        Self {
            name: name.map(str::to_string),
            ty,
            annotations: Vec::new(),
        }
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignMethod {
    pub name: String,
    pub modifiers: Modifiers,
    pub type_parameters: Vec<ForeignTypeParameter>,
    pub parameters: Vec<ForeignParameter>,
    pub return_type: ForeignType,
    pub annotations: Vec<Annotation>,
    /// Native generic signature; when present it supersedes the foreign types.
    pub generic_signature: Option<String>,
    /// Default value of an annotation type element.
    pub default_value: Option<ElementValue>,
}

impl ForeignMethod {
    pub fn new(name: &str, return_type: ForeignType) -> Self {
        Self {
            name: name.to_string(),
            modifiers: Modifiers::from_flags(ACC_PUBLIC),
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            return_type,
            annotations: Vec::new(),
            generic_signature: None,
            default_value: None,
        }
    }

    /// Method with unnamed parameters typed from an erased JVM descriptor.
    pub fn from_descriptor(name: &str, descriptor: &str) -> Result<Self> {
        let desc = parse_method_descriptor(descriptor)?;
        let mut method = Self::new(name, desc.return_type);
        method.parameters = desc
            .params
            .into_iter()
            .map(|ty| ForeignParameter::new(None, ty))
            .collect();
        Ok(method)
    }

    pub fn with_modifiers(mut self, flags: u16) -> Self {
        self.modifiers = Modifiers::from_flags(flags);
        self
    }

    pub fn type_param(mut self, name: &str, bounds: Vec<ForeignType>) -> Self {
        self.type_parameters.push(ForeignTypeParameter {
            name: name.to_string(),
            bounds,
        });
        self
    }

    pub fn param(mut self, name: &str, ty: ForeignType) -> Self {
        self.parameters.push(ForeignParameter::new(Some(name), ty));
        self
    }

    pub fn param_with(mut self, parameter: ForeignParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn signature(mut self, signature: &str) -> Self {
        self.generic_signature = Some(signature.to_string());
        self
    }

    pub fn default_value(mut self, value: ElementValue) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.is_static()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignConstructor {
    pub modifiers: Modifiers,
    pub parameters: Vec<ForeignParameter>,
    pub annotations: Vec<Annotation>,
}

impl ForeignConstructor {
    pub fn new() -> Self {
        Self {
            modifiers: Modifiers::from_flags(ACC_PUBLIC),
            parameters: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn with_modifiers(mut self, flags: u16) -> Self {
        self.modifiers = Modifiers::from_flags(flags);
        self
    }

    pub fn param(mut self, name: &str, ty: ForeignType) -> Self {
        self.parameters.push(ForeignParameter::new(Some(name), ty));
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

impl Default for ForeignConstructor {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignClass {
    pub fq_name: FqName,
    pub kind: ForeignClassKind,
    pub modifiers: Modifiers,
    pub type_parameters: Vec<ForeignTypeParameter>,
    pub superclass: Option<ForeignType>,
    pub interfaces: Vec<ForeignType>,
    pub fields: Vec<ForeignField>,
    pub methods: Vec<ForeignMethod>,
    pub constructors: Vec<ForeignConstructor>,
    pub inner_classes: Vec<FqName>,
    pub outer: Option<FqName>,
    pub annotations: Vec<Annotation>,
    /// Native generic signature; when present it supersedes the foreign type
    /// parameters and supertypes.
    pub generic_signature: Option<String>,
}

impl ForeignClass {
    pub fn builder(fq_name: impl Into<FqName>, kind: ForeignClassKind) -> ClassBuilder {
        ClassBuilder {
            class: ForeignClass {
                fq_name: fq_name.into(),
                kind,
                modifiers: Modifiers::from_flags(ACC_PUBLIC),
                type_parameters: Vec::new(),
                superclass: None,
                interfaces: Vec::new(),
                fields: Vec::new(),
                methods: Vec::new(),
                constructors: Vec::new(),
                inner_classes: Vec::new(),
                outer: None,
                annotations: Vec::new(),
                generic_signature: None,
            },
        }
    }

    pub fn short_name(&self) -> &str {
        self.fq_name.short_name()
    }

    /// Nested classes that capture an instance of the outer class.
    pub fn is_inner(&self) -> bool {
        self.outer.is_some() && !self.modifiers.is_static()
    }

    pub fn is_interface(&self) -> bool {
        matches!(
            self.kind,
            ForeignClassKind::Interface | ForeignClassKind::Annotation
        )
    }
}

pub struct ClassBuilder {
    class: ForeignClass,
}

impl ClassBuilder {
    pub fn modifiers(mut self, flags: u16) -> Self {
        self.class.modifiers = Modifiers::from_flags(flags);
        self
    }

    pub fn type_param(mut self, name: &str, bounds: Vec<ForeignType>) -> Self {
        self.class.type_parameters.push(ForeignTypeParameter {
            name: name.to_string(),
            bounds,
        });
        self
    }

    pub fn superclass(mut self, ty: ForeignType) -> Self {
        self.class.superclass = Some(ty);
        self
    }

    pub fn interface(mut self, ty: ForeignType) -> Self {
        self.class.interfaces.push(ty);
        self
    }

    pub fn field(mut self, field: ForeignField) -> Self {
        self.class.fields.push(field);
        self
    }

    pub fn method(mut self, method: ForeignMethod) -> Self {
        self.class.methods.push(method);
        self
    }

    pub fn constructor(mut self, constructor: ForeignConstructor) -> Self {
        self.class.constructors.push(constructor);
        self
    }

    pub fn inner(mut self, fq_name: impl Into<FqName>) -> Self {
        self.class.inner_classes.push(fq_name.into());
        self
    }

    pub fn outer(mut self, fq_name: impl Into<FqName>) -> Self {
        self.class.outer = Some(fq_name.into());
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.class.annotations.push(annotation);
        self
    }

    pub fn signature(mut self, signature: &str) -> Self {
        self.class.generic_signature = Some(signature.to_string());
        self
    }

    pub fn build(self) -> ForeignClass {
        self.class
    }
}

impl Annotated for ForeignClass {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

impl Annotated for ForeignMethod {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

impl Annotated for ForeignField {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

impl Annotated for ForeignParameter {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

impl Annotated for ForeignConstructor {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}
