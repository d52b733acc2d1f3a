// Integration tests driving the lexer and parser together over realistic
// multi-line schema sources.

use bitproto_ast::ast::{
    ConstExprKind, Declaration, MessageItem, TypeExprKind,
};
use bitproto_lexer::Token;
use bitproto_parser::parse_file;
use logos::Logos;
use std::ops::Range;

/// Helper: lex source to (token, byte range) pairs, panicking on lex errors.
fn lex(source: &str) -> Vec<(Token, Range<usize>)> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        let token = result.unwrap_or_else(|_| panic!("lex error at {:?}", lexer.span()));
        tokens.push((token, lexer.span()));
    }
    tokens
}

fn parse(source: &str) -> bitproto_ast::ast::FileAst {
    parse_file(&lex(source), 0).expect("parse failed")
}

#[test]
fn test_parse_minimal_proto() {
    let file = parse("proto pen");
    assert_eq!(file.proto_name.unwrap().name, "pen");
    assert!(file.decls.is_empty());
}

#[test]
fn test_missing_proto_statement_is_error() {
    let errors = parse_file(&lex("message M {}"), 0).unwrap_err();
    assert!(errors[0].message.contains("proto"));
}

#[test]
fn test_parse_message_with_fields() {
    let source = r#"
        proto pen

        message Pen {
            bool on = 1
            uint3 color = 2;
            int24 depth = 3
        }
    "#;
    let file = parse(source);
    let Declaration::Message(message) = &file.decls[0] else {
        panic!("expected message declaration");
    };
    assert_eq!(message.name, "Pen");
    assert!(!message.extensible);
    assert_eq!(message.items.len(), 3);

    let MessageItem::Field(field) = &message.items[1] else {
        panic!("expected field");
    };
    assert_eq!(field.name, "color");
    assert_eq!(field.number, 2);
    assert!(matches!(field.ty.kind, TypeExprKind::Uint(3)));
}

#[test]
fn test_parse_extensible_message() {
    let file = parse("proto pen\nmessage Pen' { uint8 a = 1 }");
    let Declaration::Message(message) = &file.decls[0] else {
        panic!("expected message");
    };
    assert!(message.extensible);
}

#[test]
fn test_parse_enum() {
    let source = r#"
        proto pen
        enum Color : uint3 {
            UNKNOWN = 0
            RED = 1;
            GREEN = 2
            BLUE = 3
        }
    "#;
    let file = parse(source);
    let Declaration::Enum(decl) = &file.decls[0] else {
        panic!("expected enum");
    };
    assert_eq!(decl.name, "Color");
    assert_eq!(decl.backing_nbits, 3);
    assert!(decl.extensible_marker.is_none());
    let values: Vec<_> = decl.members.iter().map(|m| (m.name.as_str(), m.value)).collect();
    assert_eq!(
        values,
        vec![("UNKNOWN", 0), ("RED", 1), ("GREEN", 2), ("BLUE", 3)]
    );
}

#[test]
fn test_enum_extensible_marker_is_kept_for_analysis() {
    let file = parse("proto pen\nenum Color : uint3' { UNKNOWN = 0 }");
    let Declaration::Enum(decl) = &file.decls[0] else {
        panic!("expected enum");
    };
    assert!(decl.extensible_marker.is_some());
}

#[test]
fn test_parse_array_types() {
    let source = r#"
        proto drone
        message Flight {
            int16[4] acceleration = 1
            byte[8]' name = 2
        }
    "#;
    let file = parse(source);
    let Declaration::Message(message) = &file.decls[0] else {
        panic!("expected message");
    };

    let MessageItem::Field(accel) = &message.items[0] else {
        panic!("expected field");
    };
    let TypeExprKind::Array {
        elem, extensible, ..
    } = &accel.ty.kind
    else {
        panic!("expected array type");
    };
    assert!(matches!(elem.kind, TypeExprKind::Int(16)));
    assert!(!extensible);

    let MessageItem::Field(name) = &message.items[1] else {
        panic!("expected field");
    };
    let TypeExprKind::Array { extensible, .. } = &name.ty.kind else {
        panic!("expected array type");
    };
    assert!(extensible);
}

#[test]
fn test_parse_const_expression_tree() {
    let file = parse("proto pen\nconst N = (3 + 1) * 2");
    let Declaration::Const(decl) = &file.decls[0] else {
        panic!("expected const");
    };
    let ConstExprKind::Binary { op, lhs, .. } = &decl.value.kind else {
        panic!("expected binary expression");
    };
    assert_eq!(op.symbol(), "*");
    assert!(matches!(lhs.kind, ConstExprKind::Binary { .. }));
}

#[test]
fn test_const_precedence() {
    // 2 + 3 * 4 parses as 2 + (3 * 4)
    let file = parse("proto pen\nconst N = 2 + 3 * 4");
    let Declaration::Const(decl) = &file.decls[0] else {
        panic!("expected const");
    };
    let ConstExprKind::Binary { op, rhs, .. } = &decl.value.kind else {
        panic!("expected binary expression");
    };
    assert_eq!(op.symbol(), "+");
    assert!(matches!(
        &rhs.kind,
        ConstExprKind::Binary { op, .. } if op.symbol() == "*"
    ));
}

#[test]
fn test_parse_imports() {
    let file = parse("proto pen\nimport \"base.bitproto\"\nimport lib \"shared.bitproto\"");
    let Declaration::Import(first) = &file.decls[0] else {
        panic!("expected import");
    };
    assert_eq!(first.alias, None);
    assert_eq!(first.path, "base.bitproto");

    let Declaration::Import(second) = &file.decls[1] else {
        panic!("expected import");
    };
    assert_eq!(second.alias.as_deref(), Some("lib"));
    assert_eq!(second.path, "shared.bitproto");
}

#[test]
fn test_parse_options() {
    let source = r#"
        proto pen
        option c.name_prefix = "Bp"
        message Pen {
            option max_bytes = 3 + 1
            uint8 a = 1
        }
    "#;
    let file = parse(source);
    let Declaration::Option(opt) = &file.decls[0] else {
        panic!("expected option");
    };
    assert_eq!(opt.name, "c.name_prefix");
    assert!(matches!(opt.value.kind, ConstExprKind::Str(_)));

    let Declaration::Message(message) = &file.decls[1] else {
        panic!("expected message");
    };
    let MessageItem::Option(max_bytes) = &message.items[0] else {
        panic!("expected option item");
    };
    assert_eq!(max_bytes.name, "max_bytes");
}

#[test]
fn test_parse_alias_and_typedef() {
    let file = parse("proto pen\ntype Timestamp = int64\ntypedef uint8 Level");
    let Declaration::Alias(modern) = &file.decls[0] else {
        panic!("expected alias");
    };
    assert_eq!(modern.name, "Timestamp");
    assert!(!modern.legacy_syntax);

    let Declaration::Alias(legacy) = &file.decls[1] else {
        panic!("expected alias");
    };
    assert_eq!(legacy.name, "Level");
    assert!(legacy.legacy_syntax);
    assert!(matches!(legacy.target.kind, TypeExprKind::Uint(8)));
}

#[test]
fn test_parse_nested_message_and_dotted_reference() {
    let source = r#"
        proto drone
        message Outer {
            message Inner {
                uint4 level = 1
            }
            Inner inner = 1
            shared.Timestamp stamp = 2
        }
    "#;
    let file = parse(source);
    let Declaration::Message(outer) = &file.decls[0] else {
        panic!("expected message");
    };
    assert!(matches!(outer.items[0], MessageItem::Message(_)));

    let MessageItem::Field(stamp) = &outer.items[2] else {
        panic!("expected field");
    };
    let TypeExprKind::Reference(path) = &stamp.ty.kind else {
        panic!("expected reference");
    };
    assert_eq!(path.to_string(), "shared.Timestamp");
}

#[test]
fn test_type_keyword_as_field_name() {
    let file = parse("proto pen\nmessage Pen { uint3 type = 1 }");
    let Declaration::Message(message) = &file.decls[0] else {
        panic!("expected message");
    };
    let MessageItem::Field(field) = &message.items[0] else {
        panic!("expected field");
    };
    assert_eq!(field.name, "type");
}

#[test]
fn test_error_recovery_reports_multiple_errors() {
    let source = "proto pen\nmessage { }\nenum Color uint3 { }\nmessage Ok { uint8 a = 1 }";
    let errors = parse_file(&lex(source), 0).unwrap_err();
    assert!(errors.len() >= 2, "expected at least 2 errors, got {:?}", errors);
}

#[test]
fn test_unclosed_message_is_eof_error() {
    let errors = parse_file(&lex("proto pen\nmessage Pen { uint8 a = 1"), 0).unwrap_err();
    assert!(errors
        .iter()
        .any(|e| e.kind == bitproto_parser::ParseErrorKind::UnexpectedEof));
}

#[test]
fn test_reserved_keyword_rejected() {
    let errors = parse_file(&lex("proto pen\nrender Pen {}"), 0).unwrap_err();
    assert!(!errors.is_empty());
}
