use crate::builtins::{self, Builtins};
use crate::descriptors::{
    CallableHeader, ClassDescriptor, ConstructorDescriptor, Container, FunctionDescriptor,
    MemberKind, MemberScope, PackageDescriptor, PropertyDescriptor, TypeParameterDescriptor,
};
use crate::error::DescriptorError;
use crate::ids::{
    CallableId, ClassId, ConstructorId, FunctionId, PackageId, PropertyId, TypeParamId,
};
use crate::typing::Substitution;
use crate::types::{NativeType, TypeProjection};

/// Arena owning every descriptor. Ids are indices and stay valid for the
/// lifetime of the store.
#[derive(Debug)]
pub struct DescriptorStore {
    classes: Vec<ClassDescriptor>,
    packages: Vec<PackageDescriptor>,
    type_params: Vec<TypeParameterDescriptor>,
    functions: Vec<FunctionDescriptor>,
    properties: Vec<PropertyDescriptor>,
    constructors: Vec<ConstructorDescriptor>,
    pub(crate) builtins: Builtins,
}

impl Default for DescriptorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorStore {
    pub fn new() -> Self {
        let mut store = DescriptorStore {
            classes: Vec::new(),
            packages: Vec::new(),
            type_params: Vec::new(),
            functions: Vec::new(),
            properties: Vec::new(),
            constructors: Vec::new(),
            builtins: Builtins::default(),
        };
        store.builtins = builtins::install(&mut store);
        store
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    pub fn add_class(&mut self, class: ClassDescriptor) -> ClassId {
        let id = ClassId::from_raw(self.classes.len());
        self.classes.push(class);
        id
    }

    pub fn class(&self, id: ClassId) -> &ClassDescriptor {
        &self.classes[id.idx()]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut ClassDescriptor {
        &mut self.classes[id.idx()]
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn add_package(&mut self, package: PackageDescriptor) -> PackageId {
        let id = PackageId::from_raw(self.packages.len());
        self.packages.push(package);
        id
    }

    pub fn package(&self, id: PackageId) -> &PackageDescriptor {
        &self.packages[id.idx()]
    }

    pub fn add_type_param(&mut self, param: TypeParameterDescriptor) -> TypeParamId {
        let id = TypeParamId::from_raw(self.type_params.len());
        self.type_params.push(param);
        id
    }

    pub fn type_param(&self, id: TypeParamId) -> &TypeParameterDescriptor {
        &self.type_params[id.idx()]
    }

    pub fn type_param_mut(&mut self, id: TypeParamId) -> &mut TypeParameterDescriptor {
        &mut self.type_params[id.idx()]
    }

    /// Writes the upper bounds of a type parameter. Fails when called twice.
    pub fn initialize_type_param(
        &mut self,
        id: TypeParamId,
        bounds: Vec<NativeType>,
    ) -> Result<(), DescriptorError> {
        self.type_params[id.idx()].initialize(bounds)
    }

    pub fn add_function(&mut self, function: FunctionDescriptor) -> FunctionId {
        let id = FunctionId::from_raw(self.functions.len());
        self.functions.push(function);
        id
    }

    pub fn function(&self, id: FunctionId) -> &FunctionDescriptor {
        &self.functions[id.idx()]
    }

    pub fn function_mut(&mut self, id: FunctionId) -> &mut FunctionDescriptor {
        &mut self.functions[id.idx()]
    }

    pub fn add_property(&mut self, property: PropertyDescriptor) -> PropertyId {
        let id = PropertyId::from_raw(self.properties.len());
        self.properties.push(property);
        id
    }

    pub fn property(&self, id: PropertyId) -> &PropertyDescriptor {
        &self.properties[id.idx()]
    }

    pub fn property_mut(&mut self, id: PropertyId) -> &mut PropertyDescriptor {
        &mut self.properties[id.idx()]
    }

    pub fn add_constructor(&mut self, constructor: ConstructorDescriptor) -> ConstructorId {
        let id = ConstructorId::from_raw(self.constructors.len());
        self.constructors.push(constructor);
        id
    }

    pub fn constructor(&self, id: ConstructorId) -> &ConstructorDescriptor {
        &self.constructors[id.idx()]
    }

    pub fn set_class_member_scope(
        &mut self,
        id: ClassId,
        scope: MemberScope,
    ) -> Result<(), DescriptorError> {
        self.classes[id.idx()].set_member_scope(scope)
    }

    pub fn set_package_member_scope(
        &mut self,
        id: PackageId,
        scope: MemberScope,
    ) -> Result<(), DescriptorError> {
        self.packages[id.idx()].set_member_scope(scope)
    }

    pub fn header(&self, id: CallableId) -> &CallableHeader {
        match id {
            CallableId::Function(id) => &self.function(id).header,
            CallableId::Property(id) => &self.property(id).header,
        }
    }

    pub fn header_mut(&mut self, id: CallableId) -> &mut CallableHeader {
        match id {
            CallableId::Function(id) => &mut self.function_mut(id).header,
            CallableId::Property(id) => &mut self.property_mut(id).header,
        }
    }

    /// Parameter types in declaration order; empty for properties.
    pub fn value_parameter_types(&self, id: CallableId) -> Vec<&NativeType> {
        match id {
            CallableId::Function(id) => self
                .function(id)
                .value_params
                .iter()
                .map(|param| &param.ty)
                .collect(),
            CallableId::Property(_) => Vec::new(),
        }
    }

    /// Return type of a function, type of a property.
    pub fn result_type(&self, id: CallableId) -> &NativeType {
        match id {
            CallableId::Function(id) => &self.function(id).return_type,
            CallableId::Property(id) => &self.property(id).ty,
        }
    }

    /// The declaration a copy ultimately derives from.
    pub fn original(&self, id: CallableId) -> CallableId {
        self.header(id).original.unwrap_or(id)
    }

    /// `Foo<T1, .., Tn>` for a class with type parameters `T1..Tn`.
    pub fn default_type(&self, class: ClassId) -> NativeType {
        let arguments = self
            .class(class)
            .type_params
            .iter()
            .map(|param| TypeProjection::invariant(NativeType::type_parameter(*param)))
            .collect();
        NativeType::class(class, arguments)
    }

    /// Copies a callable into `owner`, substituting its signature. The copy
    /// remembers the declaration it came from and starts without overrides.
    pub fn copy_callable(
        &mut self,
        id: CallableId,
        owner: Container,
        kind: MemberKind,
        substitution: &Substitution,
    ) -> CallableId {
        let original = self.original(id);
        let rewrite_header = |header: &mut CallableHeader| {
            header.owner = owner;
            header.kind = kind;
            header.original = Some(original);
            header.overridden.clear();
            header.receiver = header.receiver.as_ref().map(|ty| substitution.substitute(ty));
        };
        match id {
            CallableId::Function(id) => {
                let mut copy = self.function(id).clone();
                rewrite_header(&mut copy.header);
                for param in &mut copy.value_params {
                    param.ty = substitution.substitute(&param.ty);
                    param.vararg_element = param
                        .vararg_element
                        .as_ref()
                        .map(|ty| substitution.substitute(ty));
                }
                copy.return_type = substitution.substitute(&copy.return_type);
                CallableId::Function(self.add_function(copy))
            }
            CallableId::Property(id) => {
                let mut copy = self.property(id).clone();
                rewrite_header(&mut copy.header);
                copy.ty = substitution.substitute(&copy.ty);
                CallableId::Property(self.add_property(copy))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::{ClassKind, InitState, TypeParamOwner};
    use crate::types::Variance;
    use nova_interop_model::FqName;

    #[test]
    fn type_parameter_bounds_are_written_once() {
        let mut store = DescriptorStore::new();
        let param = store.add_type_param(TypeParameterDescriptor::new(
            TypeParamOwner::Pending,
            0,
            "T",
            Variance::Invariant,
        ));
        let bound = store.builtins().nullable_any_type();
        store.initialize_type_param(param, vec![bound.clone()]).unwrap();
        assert_eq!(store.type_param(param).upper_bounds(), &[bound.clone()]);
        assert_eq!(
            store.initialize_type_param(param, vec![bound]),
            Err(DescriptorError::AlreadyInitialized("T".to_string()))
        );
    }

    #[test]
    fn member_scope_is_populated_once() {
        let mut store = DescriptorStore::new();
        let package = store.builtins().package;
        let mut class = ClassDescriptor::shell(
            FqName::new("a.B"),
            Container::Package(package),
            ClassKind::Class,
        );
        class.state = InitState::Initialized;
        let id = store.add_class(class);
        store.set_class_member_scope(id, MemberScope::new()).unwrap();
        assert!(store.set_class_member_scope(id, MemberScope::new()).is_err());
        assert!(store.class(id).member_scope().is_some());
    }
}
