use nova_interop_descriptors::{
    builtin_class_map, is_subtype, ClassKind, DescriptorStore, MappingPosition, NativeType,
    PrimitiveType, Substitution, SyntheticFamily, TypeProjection, Variance,
};
use nova_interop_model::{FqName, PrimitiveKind};
use pretty_assertions::assert_eq;

fn builtin(store: &DescriptorStore, name: &str) -> nova_interop_descriptors::ClassId {
    store
        .builtins()
        .class_by_name(&FqName::new(name))
        .unwrap_or_else(|| panic!("missing built-in {name}"))
}

#[test]
fn every_mapped_platform_class_has_a_builtin() {
    let store = DescriptorStore::new();
    let map = builtin_class_map();
    for foreign in [
        "java.lang.Object",
        "java.lang.String",
        "java.lang.Comparable",
        "java.util.List",
        "java.util.Map.Entry",
    ] {
        for position in [MappingPosition::Ordinary, MappingPosition::Covariant] {
            let native = map
                .map_class(&FqName::new(foreign), position)
                .unwrap_or_else(|| panic!("{foreign} is not mapped"));
            assert!(
                store.builtins().class_by_name(native).is_some(),
                "{native} is not a built-in"
            );
        }
    }
    for kind in [PrimitiveKind::Int, PrimitiveKind::Boolean, PrimitiveKind::Double] {
        let primitive = map.map_primitive(kind).unwrap();
        let class = store.builtins().primitive(primitive);
        assert_eq!(store.class(class).fq_name, primitive.fq_name());
    }
}

#[test]
fn collection_hierarchy() {
    let store = DescriptorStore::new();
    let mutable_list = builtin(&store, "jet.MutableList");
    let supertypes: Vec<String> = store
        .class(mutable_list)
        .supertypes
        .iter()
        .map(|ty| store.render_type(ty))
        .collect();
    assert_eq!(supertypes, vec!["List<E>", "MutableCollection<E>"]);
    assert_eq!(store.class(mutable_list).kind, ClassKind::Interface);

    let list = builtin(&store, "jet.List");
    let element = store.class(list).type_params[0];
    assert_eq!(store.type_param(element).variance, Variance::Out);
    assert_eq!(
        store.type_param(element).upper_bounds(),
        &[store.builtins().nullable_any_type()]
    );
}

#[test]
fn function_types_are_contravariant_in_parameters() {
    let mut store = DescriptorStore::new();
    let function1 = store.synthetic_class(SyntheticFamily::Function, 1).unwrap();
    let builtins = store.builtins().clone();
    let any = builtins.any_type();
    let string = builtins.string_type();

    let any_to_string = NativeType::class(
        function1,
        vec![
            TypeProjection::invariant(any.clone()),
            TypeProjection::invariant(string.clone()),
        ],
    );
    let string_to_any = NativeType::class(
        function1,
        vec![
            TypeProjection::invariant(string),
            TypeProjection::invariant(any),
        ],
    );
    assert!(is_subtype(&store, &any_to_string, &string_to_any));
    assert!(!is_subtype(&store, &string_to_any, &any_to_string));
    assert_eq!(
        store.render_callable(store.class(function1).builtin_members[0]),
        "fun invoke(p1: P1): R"
    );
}

#[test]
fn inherited_member_copies_are_substituted() {
    let mut store = DescriptorStore::new();
    let list = builtin(&store, "jet.List");
    let get = store
        .class(list)
        .builtin_members
        .iter()
        .copied()
        .find(|member| store.header(*member).name == "get")
        .unwrap();

    let int = store.builtins().primitive_type(PrimitiveType::Int);
    let list_of_int = NativeType::class(list, vec![TypeProjection::invariant(int)]);
    let substitution = Substitution::for_type(&store, &list_of_int);
    let owner = store.header(get).owner;
    let copy = store.copy_callable(
        get,
        owner,
        nova_interop_descriptors::MemberKind::FakeOverride,
        &substitution,
    );

    assert_eq!(store.render_callable(copy), "fun get(index: Int): Int");
    assert_eq!(store.original(copy), get);
    assert_eq!(store.render_callable(get), "fun get(index: Int): E");
}
