use nova_interop_config::ResolverConfig;
use nova_interop_descriptors::{
    ClassId, ClassKind, Container, DescriptorRef, InitState, PackageKind, Severity, Visibility,
};
use nova_interop_model::metadata::{self, element};
use nova_interop_model::{
    Annotation, DeclarationSite, ElementValue, FqName, ForeignClass, ForeignClassKind,
    ForeignConstructor, ForeignField, ForeignMethod, ForeignType, InMemoryClassModel,
    PrimitiveKind, ACC_FINAL, ACC_PRIVATE, ACC_PUBLIC, ACC_STATIC,
};
use nova_interop_resolve::{JavaDescriptorResolver, ResolveError};
use pretty_assertions::assert_eq;

fn model_with(classes: Vec<ForeignClass>) -> InMemoryClassModel {
    let mut model = InMemoryClassModel::new();
    for class in classes {
        model.add_class(class).unwrap();
    }
    model
}

fn jet_class(abi_version: i32) -> Annotation {
    Annotation::new(metadata::JET_CLASS)
        .with(element::ABI_VERSION, ElementValue::int(abi_version))
}

fn int() -> ForeignType {
    ForeignType::Primitive(PrimitiveKind::Int)
}

fn string() -> ForeignType {
    ForeignType::class("java.lang.String")
}

#[test]
fn resolving_twice_yields_the_same_descriptor() {
    let model = model_with(vec![
        ForeignClass::builder("a.Foo", ForeignClassKind::Class).build(),
    ]);
    let mut resolver = JavaDescriptorResolver::new(&model, ResolverConfig::default());
    let first = resolver.resolve_class(&FqName::new("a.Foo")).unwrap();
    let second = resolver.resolve_class(&FqName::new("a.Foo")).unwrap();
    assert!(first.is_some());
    assert_eq!(first, second);

    let foo = first.unwrap();
    assert_eq!(
        resolver
            .bindings()
            .descriptors_for(&DeclarationSite::Class(FqName::new("a.Foo"))),
        vec![DescriptorRef::Class(foo)]
    );
    assert_eq!(resolver.resolve_class(&FqName::new("a.Missing")), Ok(None));
    assert!(resolver.diagnostics().is_empty());
}

#[test]
fn platform_classes_resolve_to_builtins() {
    let model = InMemoryClassModel::new();
    let mut resolver = JavaDescriptorResolver::new(&model, ResolverConfig::default());
    let string = resolver.resolve_class(&FqName::new("jet.String")).unwrap();
    assert_eq!(string, Some(resolver.store().builtins().string));
}

#[test]
fn self_referential_bound() {
    let model = model_with(vec![ForeignClass::builder("a.Node", ForeignClassKind::Class)
        .type_param(
            "T",
            vec![ForeignType::generic(
                "a.Node",
                vec![ForeignType::type_variable("T")],
            )],
        )
        .build()]);
    let mut resolver = JavaDescriptorResolver::new(&model, ResolverConfig::default());
    let node = resolver
        .resolve_class(&FqName::new("a.Node"))
        .unwrap()
        .unwrap();
    let store = resolver.store();
    assert_eq!(store.render_class(node), "class Node<T : Node<T>?>");
    assert_eq!(store.render_type(&store.class(node).supertypes[0]), "Any");
    assert_eq!(bound_class(&resolver, node), Some(node));
}

#[test]
fn self_referential_bound_from_signature() {
    let model = model_with(vec![ForeignClass::builder("a.Node", ForeignClassKind::Class)
        .signature("<T:La/Node<TT;>;>Ljava/lang/Object;")
        .build()]);
    let mut resolver = JavaDescriptorResolver::new(&model, ResolverConfig::default());
    let node = resolver
        .resolve_class(&FqName::new("a.Node"))
        .unwrap()
        .unwrap();
    assert_eq!(resolver.store().render_class(node), "class Node<T : Node<T>>");
    assert_eq!(bound_class(&resolver, node), Some(node));
}

fn bound_class(resolver: &JavaDescriptorResolver<'_>, class: ClassId) -> Option<ClassId> {
    let store = resolver.store();
    let param = store.class(class).type_params[0];
    let bound = &store.type_param(param).upper_bounds()[0];
    let argument = bound.arguments[0].ty().unwrap();
    assert_eq!(argument.type_parameter_id(), Some(param));
    bound.class_id()
}

#[test]
fn raw_uses_become_star_projections() {
    let model = model_with(vec![
        ForeignClass::builder("a.Node", ForeignClassKind::Class)
            .type_param("T", Vec::new())
            .build(),
        ForeignClass::builder("a.Graph", ForeignClassKind::Class)
            .method(ForeignMethod::new("root", ForeignType::class("a.Node")))
            .method(
                ForeignMethod::new("add", ForeignType::Primitive(PrimitiveKind::Void))
                    .param("nodes", ForeignType::class("java.util.List")),
            )
            .build(),
    ]);
    let mut resolver = JavaDescriptorResolver::new(&model, ResolverConfig::default());
    let graph = resolver
        .resolve_class(&FqName::new("a.Graph"))
        .unwrap()
        .unwrap();
    let scope = resolver.member_scope(graph).unwrap();
    let (root, add) = (scope.functions("root")[0], scope.functions("add")[0]);
    let store = resolver.store();
    assert_eq!(store.render_callable(root.into()), "fun root(): Node<*>?");
    assert_eq!(
        store.render_callable(add.into()),
        "fun add(nodes: List<*>?): Unit"
    );
}

#[test]
fn primitive_arrays_map_to_native_array_classes() {
    let model = model_with(vec![ForeignClass::builder("a.Math", ForeignClassKind::Class)
        .method(ForeignMethod::from_descriptor("sum", "([I)I").unwrap())
        .build()]);
    let mut resolver = JavaDescriptorResolver::new(&model, ResolverConfig::default());
    let math = resolver
        .resolve_class(&FqName::new("a.Math"))
        .unwrap()
        .unwrap();
    let sum = resolver.member_scope(math).unwrap().functions("sum")[0];
    assert_eq!(
        resolver.store().render_callable(sum.into()),
        "fun sum(p0: IntArray?): Int"
    );
}

#[test]
fn collection_supertypes_are_mutable() {
    let model = model_with(vec![ForeignClass::builder("a.Bag", ForeignClassKind::Class)
        .interface(ForeignType::generic("java.lang.Iterable", vec![string()]))
        .build()]);
    let mut resolver = JavaDescriptorResolver::new(&model, ResolverConfig::default());
    let bag = resolver
        .resolve_class(&FqName::new("a.Bag"))
        .unwrap()
        .unwrap();
    let store = resolver.store();
    let supertypes: Vec<String> = store
        .class(bag)
        .supertypes
        .iter()
        .map(|ty| store.render_type(ty))
        .collect();
    assert_eq!(supertypes, vec!["MutableIterable<String>"]);
}

#[test]
fn constructors_keep_their_visibility() {
    let model = model_with(vec![
        ForeignClass::builder("a.Point", ForeignClassKind::Class)
            .constructor(ForeignConstructor::new().param("x", int()).param("y", int()))
            .constructor(ForeignConstructor::new().with_modifiers(ACC_PRIVATE))
            .build(),
        ForeignClass::builder("a.Empty", ForeignClassKind::Class).build(),
        ForeignClass::builder("a.Shape", ForeignClassKind::Interface).build(),
    ]);
    let mut resolver = JavaDescriptorResolver::new(&model, ResolverConfig::default());
    let point = resolver
        .resolve_class(&FqName::new("a.Point"))
        .unwrap()
        .unwrap();
    let constructors = resolver.store().class(point).constructors.clone();
    assert_eq!(constructors.len(), 2);
    let public = resolver.store().constructor(constructors[0]);
    let names: Vec<&str> = public
        .value_params
        .iter()
        .map(|param| param.name.as_str())
        .collect();
    assert_eq!(names, vec!["x", "y"]);
    assert_eq!(public.visibility, Visibility::Public);
    assert_eq!(
        resolver.store().constructor(constructors[1]).visibility,
        Visibility::Private
    );
    let site = DeclarationSite::Constructor {
        owner: FqName::new("a.Point"),
        index: 0,
    };
    assert_eq!(
        resolver.bindings().descriptors_for(&site),
        vec![DescriptorRef::Constructor(constructors[0])]
    );

    let empty = resolver
        .resolve_class(&FqName::new("a.Empty"))
        .unwrap()
        .unwrap();
    assert_eq!(resolver.store().class(empty).constructors.len(), 1);
    let shape = resolver
        .resolve_class(&FqName::new("a.Shape"))
        .unwrap()
        .unwrap();
    assert_eq!(resolver.store().class(shape).kind, ClassKind::Interface);
    assert!(resolver.store().class(shape).constructors.is_empty());
}

#[test]
fn classes_from_another_abi_version_are_skipped() {
    let model = model_with(vec![
        ForeignClass::builder("a.Old", ForeignClassKind::Class)
            .annotated(jet_class(6))
            .build(),
        ForeignClass::builder("a.Unversioned", ForeignClassKind::Class)
            .annotated(Annotation::new(metadata::JET_CLASS))
            .build(),
        ForeignClass::builder("a.Current", ForeignClassKind::Class)
            .annotated(jet_class(7))
            .build(),
    ]);
    let mut resolver = JavaDescriptorResolver::new(&model, ResolverConfig::default());
    assert_eq!(resolver.resolve_class(&FqName::new("a.Old")), Ok(None));
    assert_eq!(resolver.resolve_class(&FqName::new("a.Unversioned")), Ok(None));
    let current = resolver
        .resolve_class(&FqName::new("a.Current"))
        .unwrap()
        .unwrap();
    assert!(resolver.store().class(current).is_native);

    let diagnostics = resolver.take_diagnostics();
    let codes: Vec<&str> = diagnostics.iter().map(|diagnostic| diagnostic.code).collect();
    assert_eq!(codes, vec!["abi-version-mismatch", "abi-version-mismatch"]);
    assert_eq!(diagnostics[0].severity, Severity::Error);
    assert_eq!(
        diagnostics[0].site,
        Some(DeclarationSite::Class(FqName::new("a.Old")))
    );

    // The answer is cached; asking again reports nothing new.
    assert_eq!(resolver.resolve_class(&FqName::new("a.Old")), Ok(None));
    assert!(resolver.diagnostics().is_empty());
}

#[test]
fn packages_list_their_classes() {
    let model = model_with(vec![
        ForeignClass::builder("a.b.First", ForeignClassKind::Class).build(),
        ForeignClass::builder("a.b.Second", ForeignClassKind::Interface).build(),
    ]);
    let mut resolver = JavaDescriptorResolver::new(&model, ResolverConfig::default());
    let package = resolver
        .resolve_namespace(&FqName::new("a.b"))
        .unwrap()
        .unwrap();
    assert_eq!(resolver.store().package(package).kind, PackageKind::Proper);
    let parent = resolver.resolve_namespace(&FqName::new("a")).unwrap();
    assert_eq!(resolver.store().package(package).parent, parent);

    let classes = resolver.namespace_scope(package).unwrap().classes().to_vec();
    let names: Vec<String> = classes
        .iter()
        .map(|class| resolver.store().class(*class).fq_name.to_string())
        .collect();
    assert_eq!(names, vec!["a.b.First", "a.b.Second"]);
    let first = resolver.store().class(classes[0]);
    assert_eq!(first.container, Container::Package(package));

    assert_eq!(resolver.resolve_namespace(&FqName::new("x.y")), Ok(None));
}

#[test]
fn static_members_form_a_namespace_of_the_class() {
    let model = model_with(vec![ForeignClass::builder("a.Util", ForeignClassKind::Class)
        .method(
            ForeignMethod::from_descriptor("max", "(II)I")
                .unwrap()
                .with_modifiers(ACC_PUBLIC | ACC_STATIC),
        )
        .method(ForeignMethod::new("instance", int()))
        .field(
            ForeignField::new("LIMIT", int()).with_modifiers(ACC_PUBLIC | ACC_STATIC | ACC_FINAL),
        )
        .build()]);
    let mut resolver = JavaDescriptorResolver::new(&model, ResolverConfig::default());
    let statics = resolver
        .resolve_namespace(&FqName::new("a.Util"))
        .unwrap()
        .unwrap();
    assert_eq!(
        resolver.store().package(statics).kind,
        PackageKind::ClassStatics
    );

    let scope = resolver.namespace_scope(statics).unwrap();
    assert!(scope.functions("instance").is_empty());
    let (max, limit) = (scope.functions("max")[0], scope.properties("LIMIT")[0]);
    let store = resolver.store();
    assert_eq!(
        store.render_callable(max.into()),
        "fun max(p0: Int, p1: Int): Int"
    );
    assert_eq!(store.function(max).header.owner, Container::Package(statics));
    assert_eq!(store.render_callable(limit.into()), "val LIMIT: Int");
}

#[test]
fn classes_built_against_a_failed_class_fail_with_it() {
    let model = model_with(vec![
        ForeignClass::builder("a.A", ForeignClassKind::Class)
            .signature("La/B;La/C<Ljava/lang/String;>;")
            .build(),
        ForeignClass::builder("a.B", ForeignClassKind::Class)
            .signature("Ljava/lang/Object;La/I<La/A;>;")
            .build(),
        ForeignClass::builder("a.C", ForeignClassKind::Interface).build(),
        ForeignClass::builder("a.I", ForeignClassKind::Interface)
            .type_param("T", Vec::new())
            .build(),
    ]);
    let mut resolver = JavaDescriptorResolver::new(&model, ResolverConfig::default());
    let err = resolver.resolve_class(&FqName::new("a.A")).unwrap_err();
    assert_eq!(err.code(), "arity-mismatch");

    // B finished inside the window of A and names A in a supertype.
    assert_eq!(
        resolver.resolve_class(&FqName::new("a.B")),
        Err(ResolveError::PreviouslyFailed(FqName::new("a.B")))
    );
    let bound = resolver
        .bindings()
        .descriptors_for(&DeclarationSite::Class(FqName::new("a.B")));
    let [DescriptorRef::Class(b)] = bound.as_slice() else {
        panic!("expected one class binding, got {bound:?}");
    };
    assert_eq!(resolver.store().class(*b).state, InitState::Failed);

    // Classes that do not depend on A stay usable.
    for name in ["a.C", "a.I"] {
        let class = resolver.resolve_class(&FqName::new(name)).unwrap().unwrap();
        assert_eq!(resolver.store().class(class).state, InitState::Initialized);
    }
}

#[test]
fn signature_references_keep_dollars_in_class_names() {
    let model = model_with(vec![
        ForeignClass::builder("a.Host", ForeignClassKind::Class)
            .annotated(jet_class(7))
            .inner("a.Host.ClassObject$")
            .build(),
        ForeignClass::builder("a.Host.ClassObject$", ForeignClassKind::Class)
            .modifiers(ACC_PUBLIC | ACC_STATIC)
            .annotated(jet_class(7))
            .outer("a.Host")
            .build(),
        ForeignClass::builder("a.Odd$Name", ForeignClassKind::Class).build(),
        ForeignClass::builder("a.User", ForeignClassKind::Class)
            .method(
                ForeignMethod::new("host", ForeignType::class("a.Host.ClassObject$"))
                    .signature("()La/Host$ClassObject$;"),
            )
            .method(
                ForeignMethod::new("odd", ForeignType::class("a.Odd$Name"))
                    .signature("()La/Odd$Name;"),
            )
            .build(),
    ]);
    let mut resolver = JavaDescriptorResolver::new(&model, ResolverConfig::default());
    let user = resolver
        .resolve_class(&FqName::new("a.User"))
        .unwrap()
        .unwrap();
    let scope = resolver.member_scope(user).unwrap();
    let (host_fn, odd_fn) = (scope.functions("host")[0], scope.functions("odd")[0]);
    let host = resolver
        .resolve_class(&FqName::new("a.Host"))
        .unwrap()
        .unwrap();
    let odd = resolver
        .resolve_class(&FqName::new("a.Odd$Name"))
        .unwrap()
        .unwrap();

    let store = resolver.store();
    let class_object = store.class(host).class_object;
    assert!(class_object.is_some());
    assert_eq!(store.function(host_fn).return_type.class_id(), class_object);
    assert_eq!(store.function(odd_fn).return_type.class_id(), Some(odd));
    assert_eq!(store.render_callable(odd_fn.into()), "fun odd(): Odd$Name");
    assert!(resolver.diagnostics().is_empty());
}
