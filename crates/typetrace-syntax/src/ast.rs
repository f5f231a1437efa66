//! The structural type-expression tree and symbol table.
//!
//! `TypeNode` is a closed tagged variant with one case per construct the
//! engine steps through. The tree is immutable after parse: the Trace Builder
//! only reads it, and substitution produces new trees.

use indexmap::IndexMap;

/// One case per construct the resolver knows how to step through. Anything
/// outside this set parses as `Other` and is resolved opaquely through the
/// oracle's printed form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeNode {
    /// `C extends E ? T : F`. `infer_names` lists the names introduced by
    /// `infer` inside `E`, in source order.
    Conditional {
        check: Box<TypeNode>,
        extends: Box<TypeNode>,
        true_ty: Box<TypeNode>,
        false_ty: Box<TypeNode>,
        infer_names: Vec<String>,
    },
    /// `{ [K in U]: V }` with optional `readonly` and `?` modifiers.
    Mapped {
        key_name: String,
        source: Box<TypeNode>,
        value: Box<TypeNode>,
        readonly: bool,
        optional: bool,
    },
    /// Backtick type; literal text segments interleaved with interpolation
    /// holes, in source order.
    TemplateLiteral { spans: Vec<TemplateSpan> },
    /// `T[K]`.
    IndexedAccess {
        object: Box<TypeNode>,
        index: Box<TypeNode>,
    },
    /// `Name<A, B>` — a reference with supplied type arguments (never empty).
    GenericReference { name: String, args: Vec<TypeNode> },
    /// `A | B | C`, member order as declared.
    Union { members: Vec<TypeNode> },
    /// A bare name: a zero-parameter alias or an in-scope type parameter.
    AliasReference { name: String },
    /// `infer X` inside a conditional's extends clause.
    Infer { name: String },
    /// String, number or boolean literal.
    Literal(LiteralValue),
    /// Built-in primitive keyword (`string`, `never`, ...).
    Primitive(PrimitiveKind),
    /// `[A, B, C]`.
    Tuple { elements: Vec<TypeNode> },
    /// `{ a: 1; b: 2 }`.
    Object { properties: Vec<PropertySig> },
    /// `T[]`.
    Array { element: Box<TypeNode> },
    /// Any construct outside the stepped set (`keyof`, intersections, ...),
    /// carried as printed text.
    Other { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemplateSpan {
    Text(String),
    Hole(TypeNode),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    String(String),
    /// Numeric literal, kept in its canonical source text form.
    Number(String),
    Boolean(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
    Bigint,
    Symbol,
    Object,
    Any,
    Unknown,
    Never,
    Undefined,
    Null,
    Void,
}

impl PrimitiveKind {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "bigint" => Self::Bigint,
            "symbol" => Self::Symbol,
            "object" => Self::Object,
            "any" => Self::Any,
            "unknown" => Self::Unknown,
            "never" => Self::Never,
            "undefined" => Self::Undefined,
            "null" => Self::Null,
            "void" => Self::Void,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Bigint => "bigint",
            Self::Symbol => "symbol",
            Self::Object => "object",
            Self::Any => "any",
            Self::Unknown => "unknown",
            Self::Never => "never",
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Void => "void",
        }
    }
}

/// One property of an object type literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertySig {
    pub name: String,
    pub optional: bool,
    pub readonly: bool,
    pub ty: TypeNode,
}

/// A named type alias declaration: `type Name<P1, P2> = Body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAliasDecl {
    pub name: String,
    pub params: Vec<String>,
    pub body: TypeNode,
}

/// Alias name → declaration, insertion-ordered, unique names. Built once per
/// evaluation request and read-only during tracing.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    aliases: IndexMap<String, TypeAliasDecl>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a declaration; returns the previous one if the name was taken.
    pub fn insert(&mut self, decl: TypeAliasDecl) -> Option<TypeAliasDecl> {
        self.aliases.insert(decl.name.clone(), decl)
    }

    pub fn get(&self, name: &str) -> Option<&TypeAliasDecl> {
        self.aliases.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeAliasDecl> {
        self.aliases.values()
    }
}

impl TypeNode {
    /// Whether resolving this node involves structural steps (as opposed to a
    /// value that is already final).
    pub fn is_compound(&self) -> bool {
        matches!(
            self,
            TypeNode::Conditional { .. }
                | TypeNode::Mapped { .. }
                | TypeNode::TemplateLiteral { .. }
                | TypeNode::IndexedAccess { .. }
                | TypeNode::GenericReference { .. }
                | TypeNode::Union { .. }
        )
    }

    /// Collect `infer` names in source order, without duplicates.
    pub fn collect_infer_names(&self, out: &mut Vec<String>) {
        match self {
            TypeNode::Infer { name } => {
                if !out.iter().any(|n| n == name) {
                    out.push(name.clone());
                }
            }
            TypeNode::Conditional {
                check,
                extends,
                true_ty,
                false_ty,
                ..
            } => {
                check.collect_infer_names(out);
                extends.collect_infer_names(out);
                true_ty.collect_infer_names(out);
                false_ty.collect_infer_names(out);
            }
            TypeNode::Mapped { source, value, .. } => {
                source.collect_infer_names(out);
                value.collect_infer_names(out);
            }
            TypeNode::TemplateLiteral { spans } => {
                for span in spans {
                    if let TemplateSpan::Hole(hole) = span {
                        hole.collect_infer_names(out);
                    }
                }
            }
            TypeNode::IndexedAccess { object, index } => {
                object.collect_infer_names(out);
                index.collect_infer_names(out);
            }
            TypeNode::GenericReference { args, .. } => {
                for arg in args {
                    arg.collect_infer_names(out);
                }
            }
            TypeNode::Union { members } => {
                for member in members {
                    member.collect_infer_names(out);
                }
            }
            TypeNode::Tuple { elements } => {
                for element in elements {
                    element.collect_infer_names(out);
                }
            }
            TypeNode::Object { properties } => {
                for prop in properties {
                    prop.ty.collect_infer_names(out);
                }
            }
            TypeNode::Array { element } => element.collect_infer_names(out),
            TypeNode::AliasReference { .. }
            | TypeNode::Literal(_)
            | TypeNode::Primitive(_)
            | TypeNode::Other { .. } => {}
        }
    }
}
