//! Tests for type expression parsing.

use typetrace_syntax::{
    LiteralValue, PrimitiveKind, TemplateSpan, TypeNode, parse_declarations, parse_type_expression,
    print_type,
};

#[test]
fn parse_conditional_with_infer_records_names() {
    let node = parse_type_expression("T extends [infer A, infer B] ? A : never").unwrap();
    let TypeNode::Conditional { infer_names, .. } = node else {
        panic!("expected conditional, got {node:?}");
    };
    assert_eq!(infer_names, vec!["A".to_string(), "B".to_string()]);
}

#[test]
fn parse_union_preserves_declared_member_order() {
    let node = parse_type_expression(r#""b" | "a" | 1"#).unwrap();
    let TypeNode::Union { members } = node else {
        panic!("expected union, got {node:?}");
    };
    assert_eq!(members.len(), 3);
    assert_eq!(
        members[0],
        TypeNode::Literal(LiteralValue::String("b".into()))
    );
    assert_eq!(members[2], TypeNode::Literal(LiteralValue::Number("1".into())));
}

#[test]
fn parse_template_literal_interleaves_text_and_holes() {
    let node = parse_type_expression(r#"`get${"a" | "b"}_${1 | 2}`"#).unwrap();
    let TypeNode::TemplateLiteral { spans } = node else {
        panic!("expected template literal, got {node:?}");
    };
    assert!(matches!(&spans[0], TemplateSpan::Text(t) if t == "get"));
    assert!(matches!(&spans[1], TemplateSpan::Hole(TypeNode::Union { .. })));
    assert!(matches!(&spans[2], TemplateSpan::Text(t) if t == "_"));
    assert!(matches!(&spans[3], TemplateSpan::Hole(TypeNode::Union { .. })));
}

#[test]
fn parse_mapped_type_with_modifiers() {
    let node = parse_type_expression(r#"{ readonly [K in "a" | "b"]?: number }"#).unwrap();
    let TypeNode::Mapped {
        key_name,
        readonly,
        optional,
        ..
    } = node
    else {
        panic!("expected mapped type, got {node:?}");
    };
    assert_eq!(key_name, "K");
    assert!(readonly);
    assert!(optional);
}

#[test]
fn parse_distinguishes_array_suffix_from_indexed_access() {
    let array = parse_type_expression("string[]").unwrap();
    assert!(matches!(array, TypeNode::Array { .. }));

    let access = parse_type_expression(r#"Config["port"]"#).unwrap();
    let TypeNode::IndexedAccess { object, index } = access else {
        panic!("expected indexed access");
    };
    assert_eq!(*object, TypeNode::AliasReference { name: "Config".into() });
    assert_eq!(*index, TypeNode::Literal(LiteralValue::String("port".into())));
}

#[test]
fn parse_generic_reference_with_arguments() {
    let node = parse_type_expression(r#"Pair<"a", 1 | 2>"#).unwrap();
    let TypeNode::GenericReference { name, args } = node else {
        panic!("expected generic reference");
    };
    assert_eq!(name, "Pair");
    assert_eq!(args.len(), 2);
    assert!(matches!(args[1], TypeNode::Union { .. }));
}

#[test]
fn parse_primitive_keywords() {
    assert_eq!(
        parse_type_expression("never").unwrap(),
        TypeNode::Primitive(PrimitiveKind::Never)
    );
    assert_eq!(
        parse_type_expression("string").unwrap(),
        TypeNode::Primitive(PrimitiveKind::String)
    );
}

#[test]
fn parse_declarations_builds_symbol_table() {
    let table = parse_declarations(
        "type IsA<T> = T extends \"a\" ? true : false;\ntype Keys = \"x\" | \"y\";",
    )
    .unwrap();
    assert_eq!(table.len(), 2);
    let is_a = table.get("IsA").unwrap();
    assert_eq!(is_a.params, vec!["T".to_string()]);
    assert!(table.get("Keys").unwrap().params.is_empty());
}

#[test]
fn parse_duplicate_alias_is_an_error() {
    let err = parse_declarations("type A = 1; type A = 2;").unwrap_err();
    assert!(err.message.contains("Duplicate"));
}

#[test]
fn parse_truncated_declaration_is_an_error() {
    assert!(parse_declarations("type Test<S> = ").is_err());
}

#[test]
fn parse_error_reports_offset() {
    let err = parse_type_expression("T extends ? 1 : 2").unwrap_err();
    assert!(err.offset > 0);
    assert!(err.message.contains("Type expected"));
}

#[test]
fn print_round_trips_common_forms() {
    for source in [
        r#"T extends "a" ? 1 : 2"#,
        r#"`get${"a" | "b"}`"#,
        r#"{ [K in Keys]: boolean }"#,
        r#"Config["port"]"#,
        r#""a" | "b" | "c""#,
        r#"[string, number]"#,
        r#"{ a: 1; b: 2 }"#,
    ] {
        let node = parse_type_expression(source).unwrap();
        let printed = print_type(&node);
        let reparsed = parse_type_expression(&printed).unwrap();
        assert_eq!(node, reparsed, "print/parse mismatch for `{source}`");
    }
}

#[test]
fn keyof_collapses_to_opaque_text() {
    let node = parse_type_expression("keyof Config").unwrap();
    assert_eq!(
        node,
        TypeNode::Other {
            text: "keyof Config".into()
        }
    );
}
