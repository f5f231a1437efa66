//! Syntax layer for the typetrace engine.
//!
//! This crate turns source text into a navigable structural tree:
//! - `scanner`: hand-written tokenizer for the type-expression language
//! - `parser`: recursive-descent parser producing `TypeNode` trees and a
//!   `SymbolTable` of named type aliases
//! - `ast`: the immutable tree the Trace Builder walks (read-only after parse)
//! - `printer`: the human-readable printed form used for trace step text
//!
//! The parser performs no resolution; it only recognizes structure
//! (conditional types and their `infer` names, mapped types and their key
//! source, template-literal spans, indexed access, generic references,
//! unions).

pub mod ast;
pub mod parser;
pub mod printer;
pub mod scanner;

pub use ast::{
    LiteralValue, PrimitiveKind, PropertySig, SymbolTable, TemplateSpan, TypeAliasDecl, TypeNode,
};
pub use parser::{ParseError, parse_declarations, parse_type_expression};
pub use printer::print_type;
