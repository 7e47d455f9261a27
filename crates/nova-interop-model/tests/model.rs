use nova_interop_model::{
    Annotated, Annotation, ChainClassModel, ClassModel, DeclarationSite, ElementValue, Error,
    FqName, ForeignClass, ForeignClassKind, ForeignField, ForeignMethod, ForeignType,
    InMemoryClassModel, PrimitiveKind, ACC_FINAL, ACC_PUBLIC, ACC_STATIC,
};
use pretty_assertions::assert_eq;

fn class(name: &str) -> ForeignClass {
    ForeignClass::builder(name, ForeignClassKind::Class).build()
}

#[test]
fn adding_classes_registers_the_package_chain() {
    let mut model = InMemoryClassModel::new();
    model.add_class(class("java.util.ArrayList")).unwrap();
    model.add_class(class("java.util.HashMap")).unwrap();
    model.add_class(class("Toplevel")).unwrap();

    let util = model.find_package(&FqName::new("java.util")).unwrap();
    assert_eq!(
        util.classes,
        vec![
            FqName::new("java.util.ArrayList"),
            FqName::new("java.util.HashMap")
        ]
    );

    let java = model.find_package(&FqName::new("java")).unwrap();
    assert_eq!(java.subpackages, vec![FqName::new("java.util")]);
    assert!(java.classes.is_empty());

    let root = model.find_package(&FqName::root()).unwrap();
    assert_eq!(root.subpackages, vec![FqName::new("java")]);
    assert_eq!(root.classes, vec![FqName::new("Toplevel")]);
}

#[test]
fn nested_classes_need_their_outer_class() {
    let mut model = InMemoryClassModel::new();
    let entry = ForeignClass::builder("java.util.Map.Entry", ForeignClassKind::Interface)
        .outer("java.util.Map")
        .build();

    assert_eq!(
        model.add_class(entry.clone()),
        Err(Error::OuterClassMissing {
            class: "java.util.Map.Entry".to_string(),
            outer: "java.util.Map".to_string(),
        })
    );

    model
        .add_class(
            ForeignClass::builder("java.util.Map", ForeignClassKind::Interface)
                .inner("java.util.Map.Entry")
                .build(),
        )
        .unwrap();
    model.add_class(entry).unwrap();

    let util = model.find_package(&FqName::new("java.util")).unwrap();
    assert_eq!(util.classes, vec![FqName::new("java.util.Map")]);
    assert_eq!(
        model.add_class(class("java.util.Map")),
        Err(Error::DuplicateClass("java.util.Map".to_string()))
    );
    assert_eq!(model.class_count(), 2);
}

#[test]
fn chain_prefers_earlier_models() {
    let mut first = InMemoryClassModel::new();
    first
        .add_class(
            ForeignClass::builder("a.Shared", ForeignClassKind::Interface).build(),
        )
        .unwrap();
    let mut second = InMemoryClassModel::new();
    second.add_class(class("a.Shared")).unwrap();
    second.add_class(class("b.Only")).unwrap();

    let models: Vec<&dyn ClassModel> = vec![&first, &second];
    let chain = ChainClassModel::new(models);
    assert_eq!(
        chain.find_class(&FqName::new("a.Shared")).unwrap().kind,
        ForeignClassKind::Interface
    );
    assert!(chain.find_class(&FqName::new("b.Only")).is_some());
    assert!(chain.find_package(&FqName::new("b")).is_some());
    assert!(chain.find_class(&FqName::new("c.Missing")).is_none());
}

#[test]
fn members_from_descriptors_and_annotations() {
    let method = ForeignMethod::from_descriptor("max", "(II)I")
        .unwrap()
        .with_modifiers(ACC_PUBLIC | ACC_STATIC)
        .annotated(
            Annotation::new("jet.runtime.typeinfo.JetMethod")
                .with("abiVersion", ElementValue::int(7))
                .with("flags", ElementValue::int(0)),
        );
    assert_eq!(method.parameters.len(), 2);
    assert!(method.parameters.iter().all(|p| p.name.is_none()));
    assert_eq!(method.return_type, ForeignType::Primitive(PrimitiveKind::Int));
    assert!(method.is_static());
    assert_eq!(
        method
            .annotation("jet.runtime.typeinfo.JetMethod")
            .and_then(|a| a.int("abiVersion")),
        Some(7)
    );
    assert!(!method.has_annotation("org.jetbrains.annotations.NotNull"));

    let field = ForeignField::from_descriptor("NAMES", "[Ljava/lang/String;")
        .unwrap()
        .with_modifiers(ACC_PUBLIC | ACC_STATIC | ACC_FINAL);
    assert!(field.modifiers.is_final());
    assert_eq!(field.ty.erased(), "java.lang.String[]");
}

#[test]
fn declaration_sites_render_their_owner() {
    let site = DeclarationSite::Method {
        owner: FqName::new("a.B"),
        name: "run".to_string(),
        index: 0,
    };
    assert_eq!(site.to_string(), "method run in class a.B");
    assert_eq!(site.owner(), &FqName::new("a.B"));
}
