use std::cmp::Ordering;
use std::collections::BTreeMap;

use nova_interop_model::FqName;

use crate::error::DescriptorError;
use crate::ids::{
    CallableId, ClassId, ConstructorId, FunctionId, PackageId, PropertyId, TypeParamId,
};
use crate::types::{NativeType, Variance};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    /// Foreign package-private.
    Package,
    Internal,
    Private,
    /// Placeholder for fake overrides until override resolution decides.
    Inherited,
    /// Fake override of an invisible member; never matched by anything.
    InvisibleFake,
}

impl Visibility {
    /// Partial order: `Private < Package < Protected < Public` and
    /// `Private < Internal < Public`; other pairs are incomparable.
    pub fn compare(self, other: Visibility) -> Option<Ordering> {
        use Visibility::*;
        if self == other {
            return Some(Ordering::Equal);
        }
        let rank = |v: Visibility| match v {
            Private => Some(0),
            Package | Internal => Some(1),
            Protected => Some(2),
            Public => Some(3),
            Inherited | InvisibleFake => None,
        };
        match (self, other) {
            (Internal, Package | Protected) | (Package | Protected, Internal) => None,
            _ => Some(rank(self)?.cmp(&rank(other)?)),
        }
    }

    pub fn is_visible_to_subclasses(self) -> bool {
        !matches!(self, Visibility::Private | Visibility::InvisibleFake)
    }
}

/// Ordered so that `min` picks the most restrictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modality {
    Final,
    Open,
    Abstract,
}

impl Modality {
    pub fn from_flags(is_abstract: bool, is_open: bool) -> Self {
        if is_abstract {
            Modality::Abstract
        } else if is_open {
            Modality::Open
        } else {
            Modality::Final
        }
    }

    pub fn is_overridable(self) -> bool {
        self != Modality::Final
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    EnumClass,
    AnnotationClass,
    Object,
    /// Companion holding the static members of a native class.
    ClassObject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitState {
    /// Registered in the cache, header not yet filled.
    Shell,
    Initialized,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    Package(PackageId),
    Class(ClassId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Declaration,
    FakeOverride,
    Synthesized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageKind {
    Proper,
    /// Static members of a foreign class, viewed as a package.
    ClassStatics,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompileTimeConstant {
    String(String),
    Byte(i8),
    Short(i16),
    Char(char),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    Null,
    EnumEntry {
        class: FqName,
        entry: String,
    },
    Array {
        element_type: Option<NativeType>,
        values: Vec<CompileTimeConstant>,
    },
    Annotation(Box<AnnotationDescriptor>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationDescriptor {
    pub fq_name: FqName,
    pub class: Option<ClassId>,
    pub arguments: Vec<(String, CompileTimeConstant)>,
}

impl AnnotationDescriptor {
    pub fn argument(&self, name: &str) -> Option<&CompileTimeConstant> {
        self.arguments
            .iter()
            .find(|(arg, _)| arg == name)
            .map(|(_, value)| value)
    }
}

/// Named members of a class or package, in declaration order per name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberScope {
    functions: BTreeMap<String, Vec<FunctionId>>,
    properties: BTreeMap<String, Vec<PropertyId>>,
    classes: Vec<ClassId>,
}

impl MemberScope {
    pub const fn new() -> Self {
        Self {
            functions: BTreeMap::new(),
            properties: BTreeMap::new(),
            classes: Vec::new(),
        }
    }

    pub fn add_function(&mut self, name: &str, id: FunctionId) {
        self.functions.entry(name.to_string()).or_default().push(id);
    }

    pub fn add_property(&mut self, name: &str, id: PropertyId) {
        self.properties.entry(name.to_string()).or_default().push(id);
    }

    pub fn add_class(&mut self, id: ClassId) {
        if !self.classes.contains(&id) {
            self.classes.push(id);
        }
    }

    pub fn functions(&self, name: &str) -> &[FunctionId] {
        self.functions.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn properties(&self, name: &str) -> &[PropertyId] {
        self.properties.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn classes(&self) -> &[ClassId] {
        &self.classes
    }

    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn all_functions(&self) -> impl Iterator<Item = FunctionId> + '_ {
        self.functions.values().flatten().copied()
    }

    pub fn all_properties(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.properties.values().flatten().copied()
    }

    pub fn all_callables(&self) -> impl Iterator<Item = CallableId> + '_ {
        self.all_functions()
            .map(CallableId::Function)
            .chain(self.all_properties().map(CallableId::Property))
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.properties.is_empty() && self.classes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDescriptor {
    pub fq_name: FqName,
    pub container: Container,
    pub kind: ClassKind,
    pub modality: Modality,
    pub visibility: Visibility,
    pub type_params: Vec<TypeParamId>,
    pub supertypes: Vec<NativeType>,
    pub constructors: Vec<ConstructorId>,
    pub class_object: Option<ClassId>,
    pub annotations: Vec<AnnotationDescriptor>,
    /// Some supertype could not be resolved.
    pub incomplete_hierarchy: bool,
    /// Compiled by the native compiler (metadata present) or built in.
    pub is_native: bool,
    pub is_inner: bool,
    pub state: InitState,
    /// Members declared directly on a built-in class.
    pub builtin_members: Vec<CallableId>,
    members: Option<MemberScope>,
}

impl ClassDescriptor {
    pub fn shell(fq_name: FqName, container: Container, kind: ClassKind) -> Self {
        Self {
            fq_name,
            container,
            kind,
            modality: Modality::Final,
            visibility: Visibility::Public,
            type_params: Vec::new(),
            supertypes: Vec::new(),
            constructors: Vec::new(),
            class_object: None,
            annotations: Vec::new(),
            incomplete_hierarchy: false,
            is_native: false,
            is_inner: false,
            state: InitState::Shell,
            builtin_members: Vec::new(),
            members: None,
        }
    }

    pub fn name(&self) -> &str {
        self.fq_name.short_name()
    }

    pub fn member_scope(&self) -> Option<&MemberScope> {
        self.members.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.state == InitState::Initialized
    }

    pub fn is_interface_like(&self) -> bool {
        matches!(self.kind, ClassKind::Interface | ClassKind::AnnotationClass)
    }

    pub(crate) fn set_member_scope(&mut self, scope: MemberScope) -> Result<(), DescriptorError> {
        if self.members.is_some() {
            return Err(DescriptorError::ScopeAlreadyPopulated(self.fq_name.clone()));
        }
        self.members = Some(scope);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageDescriptor {
    pub fq_name: FqName,
    pub parent: Option<PackageId>,
    pub kind: PackageKind,
    members: Option<MemberScope>,
}

impl PackageDescriptor {
    pub fn new(fq_name: FqName, parent: Option<PackageId>, kind: PackageKind) -> Self {
        Self {
            fq_name,
            parent,
            kind,
            members: None,
        }
    }

    pub fn member_scope(&self) -> Option<&MemberScope> {
        self.members.as_ref()
    }

    pub(crate) fn set_member_scope(&mut self, scope: MemberScope) -> Result<(), DescriptorError> {
        if self.members.is_some() {
            return Err(DescriptorError::ScopeAlreadyPopulated(self.fq_name.clone()));
        }
        self.members = Some(scope);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeParamOwner {
    Class(ClassId),
    Callable(CallableId),
    /// Placeholder while the owning declaration is still being built.
    Pending,
}

/// Upper bounds are written once through
/// [`DescriptorStore::initialize_type_param`](crate::DescriptorStore::initialize_type_param)
/// and frozen afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameterDescriptor {
    pub owner: TypeParamOwner,
    pub index: usize,
    pub name: String,
    pub variance: Variance,
    pub reified: bool,
    upper_bounds: Vec<NativeType>,
    initialized: bool,
}

impl TypeParameterDescriptor {
    pub fn new(owner: TypeParamOwner, index: usize, name: &str, variance: Variance) -> Self {
        Self {
            owner,
            index,
            name: name.to_string(),
            variance,
            reified: false,
            upper_bounds: Vec::new(),
            initialized: false,
        }
    }

    pub fn upper_bounds(&self) -> &[NativeType] {
        &self.upper_bounds
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub(crate) fn initialize(&mut self, bounds: Vec<NativeType>) -> Result<(), DescriptorError> {
        if self.initialized {
            return Err(DescriptorError::AlreadyInitialized(self.name.clone()));
        }
        if bounds.is_empty() {
            return Err(DescriptorError::NoUpperBounds(self.name.clone()));
        }
        self.set_bounds(bounds);
        Ok(())
    }

    pub(crate) fn set_bounds(&mut self, bounds: Vec<NativeType>) {
        self.upper_bounds = bounds;
        self.initialized = true;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueParameter {
    pub name: String,
    pub index: usize,
    pub ty: NativeType,
    /// Element type when the parameter is a vararg; `ty` is then the array type.
    pub vararg_element: Option<NativeType>,
    pub has_default: bool,
}

impl ValueParameter {
    pub fn new(index: usize, name: &str, ty: NativeType) -> Self {
        Self {
            name: name.to_string(),
            index,
            ty,
            vararg_element: None,
            has_default: false,
        }
    }
}

/// Parts shared by functions and properties.
#[derive(Debug, Clone, PartialEq)]
pub struct CallableHeader {
    pub name: String,
    pub owner: Container,
    pub kind: MemberKind,
    pub type_params: Vec<TypeParamId>,
    pub receiver: Option<NativeType>,
    pub modality: Modality,
    pub visibility: Visibility,
    pub overridden: Vec<CallableId>,
    /// Declaration this one was copied or substituted from.
    pub original: Option<CallableId>,
}

impl CallableHeader {
    pub fn new(name: &str, owner: Container) -> Self {
        Self {
            name: name.to_string(),
            owner,
            kind: MemberKind::Declaration,
            type_params: Vec::new(),
            receiver: None,
            modality: Modality::Final,
            visibility: Visibility::Public,
            overridden: Vec::new(),
            original: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDescriptor {
    pub header: CallableHeader,
    pub value_params: Vec<ValueParameter>,
    pub return_type: NativeType,
    pub annotations: Vec<AnnotationDescriptor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAccessor {
    pub visibility: Visibility,
    pub modality: Modality,
    /// Setter parameter name; `None` for getters.
    pub parameter_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    pub header: CallableHeader,
    pub ty: NativeType,
    pub is_var: bool,
    pub getter: Option<PropertyAccessor>,
    pub setter: Option<PropertyAccessor>,
    pub is_enum_entry: bool,
    pub annotations: Vec<AnnotationDescriptor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDescriptor {
    pub owner: ClassId,
    pub value_params: Vec<ValueParameter>,
    pub visibility: Visibility,
    pub is_primary: bool,
    pub annotations: Vec<AnnotationDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_is_partially_ordered() {
        use Visibility::*;
        assert_eq!(Private.compare(Public), Some(Ordering::Less));
        assert_eq!(Protected.compare(Package), Some(Ordering::Greater));
        assert_eq!(Internal.compare(Protected), None);
        assert_eq!(Internal.compare(Private), Some(Ordering::Greater));
        assert_eq!(Inherited.compare(Public), None);
    }

    #[test]
    fn modality_minimum_is_most_restrictive() {
        assert_eq!(Modality::Abstract.min(Modality::Final), Modality::Final);
        assert_eq!(Modality::from_flags(false, true), Modality::Open);
        assert_eq!(Modality::from_flags(true, true), Modality::Abstract);
    }
}
