use nova_interop_signature::{
    decode_type, parse_class_signature, parse_method_signature, parse_type, BaseType, ClassName,
    Error, SignatureType, TreeBuilder, TypeArgument, TypeSink, Variance,
};
use pretty_assertions::assert_eq;

fn class(name: &str, arguments: Vec<TypeArgument<SignatureType>>) -> SignatureType {
    SignatureType::Class {
        class: ClassName::Named(name.to_string()),
        arguments,
        nullable: false,
    }
}

fn var(name: &str) -> SignatureType {
    SignatureType::TypeVariable {
        name: name.to_string(),
        nullable: false,
    }
}

#[test]
fn primitive_array_stays_an_array_of_base_type() {
    assert_eq!(
        parse_type("[I").unwrap(),
        SignatureType::Array {
            component: Box::new(SignatureType::Base {
                base: BaseType::Int,
                nullable: false
            }),
            nullable: false,
        }
    );
}

#[test]
fn nullability_is_tracked_per_occurrence() {
    let ty = parse_type("?Ljava/util/Map<Ljava/lang/String;?TV;>;").unwrap();
    assert_eq!(
        ty,
        SignatureType::Class {
            class: ClassName::Named("java/util/Map".to_string()),
            arguments: vec![
                TypeArgument::Projected(Variance::Invariant, class("java/lang/String", vec![])),
                TypeArgument::Projected(
                    Variance::Invariant,
                    SignatureType::TypeVariable {
                        name: "V".to_string(),
                        nullable: true,
                    }
                ),
            ],
            nullable: true,
        }
    );
}

#[test]
fn wildcards_map_to_projections() {
    let ty = parse_type("Ljava/util/Map<*+Ljava/lang/Number;>;").unwrap();
    let SignatureType::Class { arguments, .. } = ty else {
        panic!("expected class type");
    };
    assert_eq!(
        arguments,
        vec![
            TypeArgument::Star,
            TypeArgument::Projected(Variance::Out, class("java/lang/Number", vec![])),
        ]
    );

    let ty = parse_type("Ljava/util/List<-TT;>;").unwrap();
    assert_eq!(
        ty,
        class(
            "java/util/List",
            vec![TypeArgument::Projected(Variance::In, var("T"))]
        )
    );
}

#[test]
fn inner_class_segments_join_with_dollar() {
    let ty = parse_type("Lfoo/Outer<TT;>.Inner<TU;>;").unwrap();
    assert_eq!(
        ty,
        class(
            "foo/Outer$Inner",
            vec![TypeArgument::Projected(Variance::Invariant, var("U"))]
        )
    );
}

#[test]
fn function_types_are_recognised_by_arity() {
    let ty = parse_type("Ljet/Function1<Ljava/lang/String;Ljet/Unit;>;").unwrap();
    let SignatureType::Class { class, arguments, .. } = ty else {
        panic!("expected class type");
    };
    assert_eq!(class, ClassName::Function(1));
    assert_eq!(arguments.len(), 2);
}

#[test]
fn class_signature_with_self_referential_bound() {
    let sig = parse_class_signature(
        "<T:Ljava/lang/Object;:Ljava/lang/Comparable<TT;>;>Ljava/lang/Object;Ljava/io/Serializable;",
    )
    .unwrap();

    assert_eq!(sig.type_parameters.len(), 1);
    let t = &sig.type_parameters[0];
    assert_eq!(t.name, "T");
    assert_eq!(
        t.decode_bounds(&mut TreeBuilder).unwrap(),
        vec![
            class("java/lang/Object", vec![]),
            class(
                "java/lang/Comparable",
                vec![TypeArgument::Projected(Variance::Invariant, var("T"))]
            ),
        ]
    );
    assert_eq!(
        sig.decode_supertypes(&mut TreeBuilder).unwrap(),
        vec![
            class("java/lang/Object", vec![]),
            class("java/io/Serializable", vec![]),
        ]
    );
}

#[test]
fn method_signature_accepts_thrown_types() {
    let sig = parse_method_signature(
        "<X:Ljava/lang/Throwable;>(TX;[?Ljava/lang/String;)V^TX;^Ljava/io/IOException;",
    )
    .unwrap();

    assert_eq!(sig.type_parameters.len(), 1);
    assert_eq!(sig.parameter_count(), 2);
    assert!(sig.returns_void());
    assert_eq!(sig.exception_count(), 2);
    assert_eq!(sig.decode_return_type(&mut TreeBuilder).unwrap(), None);

    let params = sig.decode_parameters(&mut TreeBuilder).unwrap();
    assert_eq!(
        params[1],
        SignatureType::Array {
            component: Box::new(SignatureType::Class {
                class: ClassName::Named("java/lang/String".to_string()),
                arguments: vec![],
                nullable: true,
            }),
            nullable: false,
        }
    );
}

#[test]
fn malformed_signatures_report_offsets() {
    let err = parse_method_signature("(I").unwrap_err();
    assert!(matches!(err, Error::UnexpectedEnd { .. }), "{err}");

    let err = parse_class_signature("<T:>").unwrap_err();
    assert!(matches!(err, Error::UnexpectedEnd { .. }), "{err}");

    let err = parse_type("Ljava/lang/String;X").unwrap_err();
    assert_eq!(err.offset(), 18);
    assert_eq!(err.signature(), "Ljava/lang/String;X");

    let err = parse_type("T;").unwrap_err();
    assert!(matches!(err, Error::EmptyIdentifier { offset: 1, .. }), "{err}");
}

/// Counts class sites while rendering a compact form, to show that nested sites
/// complete before their parents.
#[derive(Default)]
struct Renderer {
    completed: Vec<String>,
}

impl TypeSink for Renderer {
    type Output = String;
    type Error = Error;

    fn base_type(&mut self, base: BaseType, nullable: bool) -> Result<String, Error> {
        let out = format!("{base:?}{}", if nullable { "?" } else { "" });
        self.completed.push(out.clone());
        Ok(out)
    }

    fn array_type(&mut self, component: String, nullable: bool) -> Result<String, Error> {
        let out = format!("{component}[]{}", if nullable { "?" } else { "" });
        self.completed.push(out.clone());
        Ok(out)
    }

    fn type_variable(&mut self, name: &str, nullable: bool) -> Result<String, Error> {
        let out = format!("{name}{}", if nullable { "?" } else { "" });
        self.completed.push(out.clone());
        Ok(out)
    }

    fn class_type(
        &mut self,
        class: ClassName,
        arguments: Vec<TypeArgument<String>>,
        nullable: bool,
    ) -> Result<String, Error> {
        let args = arguments
            .into_iter()
            .map(|arg| match arg {
                TypeArgument::Star => "*".to_string(),
                TypeArgument::Projected(Variance::Invariant, ty) => ty,
                TypeArgument::Projected(Variance::In, ty) => format!("in {ty}"),
                TypeArgument::Projected(Variance::Out, ty) => format!("out {ty}"),
            })
            .collect::<Vec<_>>();
        let mut out = class.internal_name();
        if !args.is_empty() {
            out.push('<');
            out.push_str(&args.join(", "));
            out.push('>');
        }
        if nullable {
            out.push('?');
        }
        self.completed.push(out.clone());
        Ok(out)
    }
}

#[test]
fn sink_sees_inner_sites_before_outer_ones() {
    let mut renderer = Renderer::default();
    let out = decode_type("Ljava/util/List<+[?I>;", &mut renderer).unwrap();
    assert_eq!(out, "java/util/List<out Int?[]>");
    assert_eq!(
        renderer.completed,
        vec![
            "Int?".to_string(),
            "Int?[]".to_string(),
            "java/util/List<out Int?[]>".to_string(),
        ]
    );
}

#[test]
fn function_arity_beyond_the_builtin_range_is_a_plain_class() {
    assert_eq!(
        parse_type("Ljet/Function2000000;").unwrap(),
        class("jet/Function2000000", Vec::new())
    );
    assert_eq!(
        parse_type("Ljet/Tuple22;").unwrap(),
        SignatureType::Class {
            class: ClassName::Tuple(22),
            arguments: Vec::new(),
            nullable: false,
        }
    );
}
