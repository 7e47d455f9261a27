//! The native built-in library living in package `jet`.
//!
//! Built-ins are created eagerly when a [`DescriptorStore`] is made, except
//! for the function and tuple families which exist for every arity and are
//! created on first use.

use std::collections::{BTreeMap, HashMap};

use nova_interop_model::FqName;

use crate::descriptors::{
    CallableHeader, ClassDescriptor, ClassKind, Container, FunctionDescriptor, InitState,
    Modality, PackageDescriptor, PackageKind, TypeParamOwner, TypeParameterDescriptor,
    ValueParameter,
};
use crate::ids::{CallableId, ClassId, PackageId};
use crate::store::DescriptorStore;
use crate::types::{NativeType, TypeProjection, Variance};

pub const BUILTINS_PACKAGE: &str = "jet";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Char,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "Boolean",
            PrimitiveType::Char => "Char",
            PrimitiveType::Byte => "Byte",
            PrimitiveType::Short => "Short",
            PrimitiveType::Int => "Int",
            PrimitiveType::Long => "Long",
            PrimitiveType::Float => "Float",
            PrimitiveType::Double => "Double",
        }
    }

    pub fn array_name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "BooleanArray",
            PrimitiveType::Char => "CharArray",
            PrimitiveType::Byte => "ByteArray",
            PrimitiveType::Short => "ShortArray",
            PrimitiveType::Int => "IntArray",
            PrimitiveType::Long => "LongArray",
            PrimitiveType::Float => "FloatArray",
            PrimitiveType::Double => "DoubleArray",
        }
    }

    pub fn fq_name(self) -> FqName {
        FqName::new(BUILTINS_PACKAGE).child(self.name())
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, PrimitiveType::Boolean | PrimitiveType::Char)
    }
}

/// Families of built-in classes that exist for every arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntheticFamily {
    Function,
    ExtensionFunction,
    Tuple,
}

/// Largest arity of the synthesized function and tuple classes.
pub const MAX_SYNTHETIC_ARITY: usize = 22;

impl SyntheticFamily {
    /// Value parameters plus the receiver and return type where the family
    /// has them.
    pub fn type_param_count(self, arity: usize) -> usize {
        match self {
            SyntheticFamily::Function => arity + 1,
            SyntheticFamily::ExtensionFunction => arity + 2,
            SyntheticFamily::Tuple => arity,
        }
    }

    fn class_name(self, arity: usize) -> String {
        match self {
            SyntheticFamily::Function => format!("Function{arity}"),
            SyntheticFamily::ExtensionFunction => format!("ExtensionFunction{arity}"),
            SyntheticFamily::Tuple => format!("Tuple{arity}"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Builtins {
    pub root_package: PackageId,
    pub package: PackageId,
    pub any: ClassId,
    pub nothing: ClassId,
    pub unit: ClassId,
    pub string: ClassId,
    pub char_sequence: ClassId,
    pub number: ClassId,
    pub comparable: ClassId,
    pub enum_class: ClassId,
    pub throwable: ClassId,
    pub annotation: ClassId,
    pub array: ClassId,
    primitives: Vec<ClassId>,
    primitive_arrays: Vec<ClassId>,
    by_name: HashMap<FqName, ClassId>,
    synthetic: BTreeMap<(u8, usize), ClassId>,
}

impl Builtins {
    pub fn class_by_name(&self, fq_name: &FqName) -> Option<ClassId> {
        self.by_name.get(fq_name).copied()
    }

    pub fn primitive(&self, primitive: PrimitiveType) -> ClassId {
        self.primitives[primitive as usize]
    }

    pub fn primitive_array(&self, primitive: PrimitiveType) -> ClassId {
        self.primitive_arrays[primitive as usize]
    }

    pub fn primitive_of(&self, class: ClassId) -> Option<PrimitiveType> {
        let idx = self.primitives.iter().position(|id| *id == class)?;
        Some(PrimitiveType::ALL[idx])
    }

    pub fn any_type(&self) -> NativeType {
        NativeType::simple(self.any)
    }

    pub fn nullable_any_type(&self) -> NativeType {
        self.any_type().make_nullable()
    }

    pub fn nothing_type(&self) -> NativeType {
        NativeType::simple(self.nothing)
    }

    pub fn unit_type(&self) -> NativeType {
        NativeType::simple(self.unit)
    }

    pub fn string_type(&self) -> NativeType {
        NativeType::simple(self.string)
    }

    pub fn primitive_type(&self, primitive: PrimitiveType) -> NativeType {
        NativeType::simple(self.primitive(primitive))
    }

    pub fn array_type(&self, element: NativeType) -> NativeType {
        NativeType::class(self.array, vec![TypeProjection::invariant(element)])
    }

    pub fn is_any(&self, ty: &NativeType) -> bool {
        ty.class_id() == Some(self.any)
    }

    pub fn is_nothing(&self, ty: &NativeType) -> bool {
        ty.class_id() == Some(self.nothing)
    }

    pub fn is_unit(&self, ty: &NativeType) -> bool {
        ty.class_id() == Some(self.unit)
    }

    /// Every built-in class created so far.
    pub fn classes(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.by_name.values().copied()
    }
}

struct Bootstrap<'s> {
    store: &'s mut DescriptorStore,
    package: PackageId,
    by_name: HashMap<FqName, ClassId>,
}

impl Bootstrap<'_> {
    fn class(
        &mut self,
        name: &str,
        kind: ClassKind,
        modality: Modality,
        params: &[(&str, Variance)],
    ) -> ClassId {
        let fq_name = FqName::new(BUILTINS_PACKAGE).child(name);
        self.declare(fq_name, Container::Package(self.package), kind, modality, params)
    }

    fn nested(
        &mut self,
        outer: ClassId,
        name: &str,
        kind: ClassKind,
        params: &[(&str, Variance)],
    ) -> ClassId {
        let fq_name = self.store.class(outer).fq_name.child(name);
        self.declare(fq_name, Container::Class(outer), kind, Modality::Abstract, params)
    }

    fn declare(
        &mut self,
        fq_name: FqName,
        container: Container,
        kind: ClassKind,
        modality: Modality,
        params: &[(&str, Variance)],
    ) -> ClassId {
        let mut class = ClassDescriptor::shell(fq_name.clone(), container, kind);
        class.modality = modality;
        class.is_native = true;
        class.state = InitState::Initialized;
        let id = self.store.add_class(class);
        let type_params = params
            .iter()
            .enumerate()
            .map(|(index, (name, variance))| {
                self.store.add_type_param(TypeParameterDescriptor::new(
                    TypeParamOwner::Class(id),
                    index,
                    name,
                    *variance,
                ))
            })
            .collect();
        self.store.class_mut(id).type_params = type_params;
        self.by_name.insert(fq_name, id);
        id
    }

    fn param(&self, class: ClassId, index: usize) -> NativeType {
        NativeType::type_parameter(self.store.class(class).type_params[index])
    }

    fn ty(&self, class: ClassId, arguments: Vec<NativeType>) -> NativeType {
        NativeType::class(
            class,
            arguments.into_iter().map(TypeProjection::invariant).collect(),
        )
    }

    fn extends(&mut self, class: ClassId, supertypes: Vec<NativeType>) {
        self.store.class_mut(class).supertypes = supertypes;
    }

    fn function(
        &mut self,
        class: ClassId,
        name: &str,
        modality: Modality,
        params: Vec<(&str, NativeType)>,
        return_type: NativeType,
    ) -> CallableId {
        let mut header = CallableHeader::new(name, Container::Class(class));
        header.modality = modality;
        let value_params = params
            .into_iter()
            .enumerate()
            .map(|(index, (name, ty))| ValueParameter::new(index, name, ty))
            .collect();
        let id = CallableId::Function(self.store.add_function(FunctionDescriptor {
            header,
            value_params,
            return_type,
            annotations: Vec::new(),
        }));
        self.store.class_mut(class).builtin_members.push(id);
        id
    }

    /// Gives every class without supertypes `Any`, and every unbounded type
    /// parameter the bound `Any?`.
    fn finish(self, any: ClassId) -> HashMap<FqName, ClassId> {
        let nullable_any = NativeType::simple(any).make_nullable();
        for class in self.by_name.values().copied() {
            let descriptor = self.store.class(class);
            let params = descriptor.type_params.clone();
            if class != any && descriptor.supertypes.is_empty() && descriptor.name() != "Nothing" {
                self.store.class_mut(class).supertypes = vec![NativeType::simple(any)];
            }
            for param in params {
                let param = self.store.type_param_mut(param);
                if !param.is_initialized() {
                    param.set_bounds(vec![nullable_any.clone()]);
                }
            }
        }
        self.by_name
    }
}

pub(crate) fn install(store: &mut DescriptorStore) -> Builtins {
    use ClassKind::{Class, Interface};
    use Modality::{Abstract, Final, Open};
    use Variance::{In, Invariant, Out};

    let root_package =
        store.add_package(PackageDescriptor::new(FqName::root(), None, PackageKind::Proper));
    let package = store.add_package(PackageDescriptor::new(
        FqName::new(BUILTINS_PACKAGE),
        Some(root_package),
        PackageKind::Proper,
    ));
    let mut b = Bootstrap {
        store,
        package,
        by_name: HashMap::new(),
    };

    let any = b.class("Any", Class, Open, &[]);
    let nothing = b.class("Nothing", Class, Final, &[]);
    let unit = b.class("Unit", ClassKind::Object, Final, &[]);
    let comparable = b.class("Comparable", Interface, Abstract, &[("T", In)]);
    let char_sequence = b.class("CharSequence", Interface, Abstract, &[]);
    let number = b.class("Number", Class, Abstract, &[]);
    let string = b.class("String", Class, Final, &[]);
    let throwable = b.class("Throwable", Class, Open, &[]);
    let annotation = b.class("Annotation", Interface, Abstract, &[]);
    let enum_class = b.class("Enum", Class, Abstract, &[("E", Invariant)]);
    let array = b.class("Array", Class, Final, &[("T", Invariant)]);

    let mut primitives = Vec::with_capacity(PrimitiveType::ALL.len());
    let mut primitive_arrays = Vec::with_capacity(PrimitiveType::ALL.len());
    for primitive in PrimitiveType::ALL {
        let class = b.class(primitive.name(), Class, Final, &[]);
        let self_type = NativeType::simple(class);
        let comparable_self = b.ty(comparable, vec![self_type]);
        let supertypes = if primitive.is_numeric() {
            vec![NativeType::simple(number), comparable_self]
        } else {
            vec![comparable_self]
        };
        b.extends(class, supertypes);
        primitives.push(class);
        primitive_arrays.push(b.class(primitive.array_name(), Class, Final, &[]));
    }

    let iterable = b.class("Iterable", Interface, Abstract, &[("T", Out)]);
    let mutable_iterable = b.class("MutableIterable", Interface, Abstract, &[("T", Out)]);
    let iterator = b.class("Iterator", Interface, Abstract, &[("T", Out)]);
    let mutable_iterator = b.class("MutableIterator", Interface, Abstract, &[("T", Out)]);
    let list_iterator = b.class("ListIterator", Interface, Abstract, &[("T", Out)]);
    let mutable_list_iterator =
        b.class("MutableListIterator", Interface, Abstract, &[("T", Invariant)]);
    let collection = b.class("Collection", Interface, Abstract, &[("E", Out)]);
    let mutable_collection =
        b.class("MutableCollection", Interface, Abstract, &[("E", Invariant)]);
    let list = b.class("List", Interface, Abstract, &[("E", Out)]);
    let mutable_list = b.class("MutableList", Interface, Abstract, &[("E", Invariant)]);
    let set = b.class("Set", Interface, Abstract, &[("E", Out)]);
    let mutable_set = b.class("MutableSet", Interface, Abstract, &[("E", Invariant)]);
    let map = b.class("Map", Interface, Abstract, &[("K", Invariant), ("V", Out)]);
    let mutable_map = b.class(
        "MutableMap",
        Interface,
        Abstract,
        &[("K", Invariant), ("V", Invariant)],
    );
    let entry = b.nested(map, "Entry", Interface, &[("K", Out), ("V", Out)]);
    let mutable_entry = b.nested(
        mutable_map,
        "MutableEntry",
        Interface,
        &[("K", Invariant), ("V", Invariant)],
    );

    let enum_bound = b.ty(enum_class, vec![b.param(enum_class, 0)]);
    let enum_param = b.store.class(enum_class).type_params[0];
    b.store.type_param_mut(enum_param).set_bounds(vec![enum_bound]);

    // Supertypes.
    let string_type = NativeType::simple(string);
    let comparable_string = b.ty(comparable, vec![string_type.clone()]);
    b.extends(string, vec![comparable_string, NativeType::simple(char_sequence)]);
    let comparable_enum = b.ty(comparable, vec![b.param(enum_class, 0)]);
    b.extends(enum_class, vec![comparable_enum]);
    for (sub, sups) in [
        (mutable_iterable, vec![iterable]),
        (mutable_iterator, vec![iterator]),
        (list_iterator, vec![iterator]),
        (mutable_list_iterator, vec![list_iterator, mutable_iterator]),
        (collection, vec![iterable]),
        (mutable_collection, vec![collection, mutable_iterable]),
        (list, vec![collection]),
        (mutable_list, vec![list, mutable_collection]),
        (set, vec![collection]),
        (mutable_set, vec![set, mutable_collection]),
        (mutable_map, vec![map]),
        (mutable_entry, vec![entry]),
    ] {
        let supertypes = sups
            .into_iter()
            .map(|sup| {
                let arguments = (0..b.store.class(sup).type_params.len())
                    .map(|idx| b.param(sub, idx))
                    .collect();
                b.ty(sup, arguments)
            })
            .collect();
        b.extends(sub, supertypes);
    }

    // Members.
    let int = NativeType::simple(primitives[PrimitiveType::Int as usize]);
    let boolean = NativeType::simple(primitives[PrimitiveType::Boolean as usize]);
    let char_type = NativeType::simple(primitives[PrimitiveType::Char as usize]);
    let nullable_any = NativeType::simple(any).make_nullable();
    let unit_type = NativeType::simple(unit);

    b.function(any, "equals", Open, vec![("other", nullable_any.clone())], boolean.clone());
    b.function(any, "hashCode", Open, vec![], int.clone());
    b.function(any, "toString", Open, vec![], string_type.clone());

    let compared = b.param(comparable, 0);
    b.function(comparable, "compareTo", Abstract, vec![("other", compared)], int.clone());
    b.function(char_sequence, "length", Abstract, vec![], int.clone());
    b.function(char_sequence, "charAt", Abstract, vec![("index", int.clone())], char_type);
    b.function(enum_class, "name", Final, vec![], string_type.clone());
    b.function(enum_class, "ordinal", Final, vec![], int.clone());
    b.function(throwable, "getMessage", Open, vec![], string_type.make_nullable());

    let element = b.param(array, 0);
    b.function(array, "get", Final, vec![("index", int.clone())], element.clone());
    b.function(
        array,
        "set",
        Final,
        vec![("index", int.clone()), ("value", element)],
        unit_type.clone(),
    );

    let iterator_of = b.ty(iterator, vec![b.param(iterable, 0)]);
    b.function(iterable, "iterator", Abstract, vec![], iterator_of);
    let mutable_iterator_of = b.ty(mutable_iterator, vec![b.param(mutable_iterable, 0)]);
    b.function(mutable_iterable, "iterator", Abstract, vec![], mutable_iterator_of);
    let next = b.param(iterator, 0);
    b.function(iterator, "next", Abstract, vec![], next);
    b.function(iterator, "hasNext", Abstract, vec![], boolean.clone());
    b.function(mutable_iterator, "remove", Abstract, vec![], unit_type);

    b.function(collection, "size", Abstract, vec![], int.clone());
    b.function(collection, "isEmpty", Abstract, vec![], boolean.clone());
    b.function(
        collection,
        "contains",
        Abstract,
        vec![("o", nullable_any.clone())],
        boolean.clone(),
    );
    let added = b.param(mutable_collection, 0);
    b.function(mutable_collection, "add", Abstract, vec![("e", added)], boolean.clone());
    b.function(
        mutable_collection,
        "remove",
        Abstract,
        vec![("o", nullable_any.clone())],
        boolean,
    );
    let list_element = b.param(list, 0);
    b.function(list, "get", Abstract, vec![("index", int.clone())], list_element);
    let mutable_element = b.param(mutable_list, 0);
    b.function(
        mutable_list,
        "set",
        Abstract,
        vec![("index", int.clone()), ("element", mutable_element.clone())],
        mutable_element,
    );

    let value = b.param(map, 1).make_nullable();
    b.function(map, "get", Abstract, vec![("key", nullable_any)], value);
    b.function(map, "size", Abstract, vec![], int);
    let (key, value) = (b.param(mutable_map, 0), b.param(mutable_map, 1));
    b.function(
        mutable_map,
        "put",
        Abstract,
        vec![("key", key), ("value", value.clone())],
        value.make_nullable(),
    );
    let entry_key = b.param(entry, 0);
    b.function(entry, "getKey", Abstract, vec![], entry_key);
    let entry_value = b.param(entry, 1);
    b.function(entry, "getValue", Abstract, vec![], entry_value);

    let by_name = b.finish(any);
    Builtins {
        root_package,
        package,
        any,
        nothing,
        unit,
        string,
        char_sequence,
        number,
        comparable,
        enum_class,
        throwable,
        annotation,
        array,
        primitives,
        primitive_arrays,
        by_name,
        synthetic: BTreeMap::new(),
    }
}

impl DescriptorStore {
    /// `FunctionN`, `ExtensionFunctionN` or `TupleN`, created on first use.
    /// `None` above [`MAX_SYNTHETIC_ARITY`].
    pub fn synthetic_class(&mut self, family: SyntheticFamily, arity: usize) -> Option<ClassId> {
        if arity > MAX_SYNTHETIC_ARITY {
            return None;
        }
        let key = (family as u8, arity);
        if let Some(id) = self.builtins.synthetic.get(&key) {
            return Some(*id);
        }

        let mut params: Vec<(String, Variance)> = Vec::new();
        match family {
            SyntheticFamily::Function => {
                params.extend((1..=arity).map(|i| (format!("P{i}"), Variance::In)));
                params.push(("R".to_string(), Variance::Out));
            }
            SyntheticFamily::ExtensionFunction => {
                params.push(("T".to_string(), Variance::In));
                params.extend((1..=arity).map(|i| (format!("P{i}"), Variance::In)));
                params.push(("R".to_string(), Variance::Out));
            }
            SyntheticFamily::Tuple => {
                params.extend((1..=arity).map(|i| (format!("T{i}"), Variance::Out)));
            }
        }
        let params: Vec<(&str, Variance)> = params
            .iter()
            .map(|(name, variance)| (name.as_str(), *variance))
            .collect();

        let any = self.builtins.any;
        let package = self.builtins.package;
        let mut b = Bootstrap {
            store: &mut *self,
            package,
            by_name: HashMap::new(),
        };
        let id = match family {
            SyntheticFamily::Tuple => {
                b.class(&family.class_name(arity), ClassKind::Class, Modality::Final, &params)
            }
            _ => b.class(
                &family.class_name(arity),
                ClassKind::Interface,
                Modality::Abstract,
                &params,
            ),
        };
        if family != SyntheticFamily::Tuple {
            let count = params.len();
            let first_value = usize::from(family == SyntheticFamily::ExtensionFunction);
            let value_params: Vec<(String, NativeType)> = (first_value..count - 1)
                .map(|idx| (format!("p{}", idx - first_value + 1), b.param(id, idx)))
                .collect();
            let return_type = b.param(id, count - 1);
            let invoke = b.function(
                id,
                "invoke",
                Modality::Abstract,
                value_params
                    .iter()
                    .map(|(name, ty)| (name.as_str(), ty.clone()))
                    .collect(),
                return_type,
            );
            if family == SyntheticFamily::ExtensionFunction {
                let receiver = b.param(id, 0);
                b.store.header_mut(invoke).receiver = Some(receiver);
            }
        }
        let by_name = b.finish(any);

        self.builtins.by_name.extend(by_name);
        self.builtins.synthetic.insert(key, id);
        Some(id)
    }

    /// Built-in class for a native qualified name, creating function and
    /// tuple classes on demand.
    pub fn builtin_class(&mut self, fq_name: &FqName) -> Option<ClassId> {
        if let Some(id) = self.builtins.class_by_name(fq_name) {
            return Some(id);
        }
        if fq_name.parent()?.as_str() != BUILTINS_PACKAGE {
            return None;
        }
        let short = fq_name.short_name();
        for (prefix, family) in [
            ("ExtensionFunction", SyntheticFamily::ExtensionFunction),
            ("Function", SyntheticFamily::Function),
            ("Tuple", SyntheticFamily::Tuple),
        ] {
            if let Some(arity) = short
                .strip_prefix(prefix)
                .and_then(|digits| digits.parse::<usize>().ok())
            {
                return self.synthetic_class(family, arity);
            }
        }
        None
    }
}
