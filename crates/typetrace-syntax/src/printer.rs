//! Printed forms of type-expression trees.
//!
//! Produces the human-readable text used for trace step `expression_text` and
//! `result_text` fields. Printing is purely syntactic; it never resolves.

use std::fmt::Write;

use crate::ast::{LiteralValue, TemplateSpan, TypeNode};

/// Print a type node in TypeScript type syntax.
pub fn print_type(node: &TypeNode) -> String {
    let mut out = String::new();
    write_type(&mut out, node);
    out
}

fn write_type(out: &mut String, node: &TypeNode) {
    match node {
        TypeNode::Conditional {
            check,
            extends,
            true_ty,
            false_ty,
            ..
        } => {
            write_operand(out, check);
            out.push_str(" extends ");
            write_operand(out, extends);
            out.push_str(" ? ");
            write_type(out, true_ty);
            out.push_str(" : ");
            write_type(out, false_ty);
        }
        TypeNode::Mapped {
            key_name,
            source,
            value,
            readonly,
            optional,
        } => {
            out.push_str("{ ");
            if *readonly {
                out.push_str("readonly ");
            }
            let _ = write!(out, "[{key_name} in ");
            write_type(out, source);
            out.push(']');
            if *optional {
                out.push('?');
            }
            out.push_str(": ");
            write_type(out, value);
            out.push_str(" }");
        }
        TypeNode::TemplateLiteral { spans } => {
            out.push('`');
            for span in spans {
                match span {
                    TemplateSpan::Text(text) => {
                        for ch in text.chars() {
                            if ch == '`' || ch == '\\' {
                                out.push('\\');
                            }
                            out.push(ch);
                        }
                    }
                    TemplateSpan::Hole(hole) => {
                        out.push_str("${");
                        write_type(out, hole);
                        out.push('}');
                    }
                }
            }
            out.push('`');
        }
        TypeNode::IndexedAccess { object, index } => {
            write_operand(out, object);
            out.push('[');
            write_type(out, index);
            out.push(']');
        }
        TypeNode::GenericReference { name, args } => {
            out.push_str(name);
            out.push('<');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_type(out, arg);
            }
            out.push('>');
        }
        TypeNode::Union { members } => {
            for (i, member) in members.iter().enumerate() {
                if i > 0 {
                    out.push_str(" | ");
                }
                write_operand(out, member);
            }
        }
        TypeNode::AliasReference { name } => out.push_str(name),
        TypeNode::Infer { name } => {
            let _ = write!(out, "infer {name}");
        }
        TypeNode::Literal(value) => write_literal(out, value),
        TypeNode::Primitive(kind) => out.push_str(kind.as_str()),
        TypeNode::Tuple { elements } => {
            out.push('[');
            for (i, element) in elements.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_type(out, element);
            }
            out.push(']');
        }
        TypeNode::Object { properties } => {
            if properties.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{ ");
            for (i, prop) in properties.iter().enumerate() {
                if i > 0 {
                    out.push_str("; ");
                }
                if prop.readonly {
                    out.push_str("readonly ");
                }
                out.push_str(&prop.name);
                if prop.optional {
                    out.push('?');
                }
                out.push_str(": ");
                write_type(out, &prop.ty);
            }
            out.push_str(" }");
        }
        TypeNode::Array { element } => {
            write_operand(out, element);
            out.push_str("[]");
        }
        TypeNode::Other { text } => out.push_str(text),
    }
}

/// Write a node in operand position, parenthesizing where TypeScript requires
/// it (union and conditional operands of postfix/extends positions).
fn write_operand(out: &mut String, node: &TypeNode) {
    let needs_parens = matches!(node, TypeNode::Union { .. } | TypeNode::Conditional { .. });
    if needs_parens {
        out.push('(');
        write_type(out, node);
        out.push(')');
    } else {
        write_type(out, node);
    }
}

fn write_literal(out: &mut String, value: &LiteralValue) {
    match value {
        LiteralValue::String(text) => {
            out.push('"');
            for ch in text.chars() {
                if ch == '"' || ch == '\\' {
                    out.push('\\');
                }
                out.push(ch);
            }
            out.push('"');
        }
        LiteralValue::Number(text) => out.push_str(text),
        LiteralValue::Boolean(value) => out.push_str(if *value { "true" } else { "false" }),
    }
}
