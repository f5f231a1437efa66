//! Recursive-descent parser for type aliases and type expressions.
//!
//! `parse_declarations` builds the symbol table from auxiliary declaration
//! source (`type Name<...> = ...;` statements); `parse_type_expression`
//! parses a single ad-hoc type expression. Both fail with `ParseError` on
//! malformed input and perform no resolution.

use std::fmt;

use crate::ast::{
    LiteralValue, PrimitiveKind, PropertySig, SymbolTable, TemplateSpan, TypeAliasDecl, TypeNode,
};
use crate::printer::print_type;
use crate::scanner::{SyntaxKind, Token, tokenize};

/// Malformed input source; no trace is produced for these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error at offset {}: {}", self.offset, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parse auxiliary declaration source into a symbol table.
pub fn parse_declarations(source: &str) -> Result<SymbolTable, ParseError> {
    let tokens = tokenize(source)?;
    let mut parser = ParserState::new(tokens);
    let mut table = SymbolTable::new();
    while !parser.is_token(SyntaxKind::EndOfFile) {
        let decl = parser.parse_type_alias()?;
        if table.contains(&decl.name) {
            return Err(ParseError::new(
                format!("Duplicate type alias `{}`", decl.name),
                parser.token_pos(),
            ));
        }
        tracing::debug!(name = %decl.name, params = decl.params.len(), "parsed type alias");
        table.insert(decl);
    }
    Ok(table)
}

/// Parse a single ad-hoc type expression.
pub fn parse_type_expression(text: &str) -> Result<TypeNode, ParseError> {
    let tokens = tokenize(text)?;
    let mut parser = ParserState::new(tokens);
    let node = parser.parse_type()?;
    parser.expect_end()?;
    Ok(node)
}

struct ParserState {
    tokens: Vec<Token>,
    index: usize,
}

impl ParserState {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0 }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self, ahead: usize) -> SyntaxKind {
        self.tokens
            .get(self.index + ahead)
            .map_or(SyntaxKind::EndOfFile, |t| t.kind)
    }

    fn is_token(&self, kind: SyntaxKind) -> bool {
        self.current().kind == kind
    }

    fn token_pos(&self) -> usize {
        self.current().pos
    }

    fn next_token(&mut self) -> Token {
        let token = self.current().clone();
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
        token
    }

    fn parse_expected(&mut self, kind: SyntaxKind, what: &str) -> Result<Token, ParseError> {
        if self.is_token(kind) {
            Ok(self.next_token())
        } else {
            Err(ParseError::new(
                format!("{} expected, found `{}`", what, self.current().text),
                self.token_pos(),
            ))
        }
    }

    fn expect_end(&self) -> Result<(), ParseError> {
        if self.is_token(SyntaxKind::EndOfFile) {
            Ok(())
        } else {
            Err(ParseError::new(
                format!("Unexpected `{}` after type expression", self.current().text),
                self.token_pos(),
            ))
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_type_alias(&mut self) -> Result<TypeAliasDecl, ParseError> {
        self.parse_expected(SyntaxKind::TypeKeyword, "`type`")?;
        let name = self
            .parse_expected(SyntaxKind::Identifier, "Type alias name")?
            .text;

        let mut params = Vec::new();
        if self.is_token(SyntaxKind::LessThan) {
            self.next_token();
            loop {
                let param = self
                    .parse_expected(SyntaxKind::Identifier, "Type parameter name")?
                    .text;
                params.push(param);
                // Parameter constraints/defaults are not part of this language.
                if self.is_token(SyntaxKind::Comma) {
                    self.next_token();
                    continue;
                }
                break;
            }
            self.parse_expected(SyntaxKind::GreaterThan, "`>`")?;
        }

        self.parse_expected(SyntaxKind::Equals, "`=`")?;
        let body = self.parse_type()?;
        if self.is_token(SyntaxKind::Semicolon) {
            self.next_token();
        }
        Ok(TypeAliasDecl { name, params, body })
    }

    // =========================================================================
    // Types — conditional is the lowest-precedence level
    // =========================================================================

    fn parse_type(&mut self) -> Result<TypeNode, ParseError> {
        let check = self.parse_union_type()?;
        if !self.is_token(SyntaxKind::ExtendsKeyword) {
            return Ok(check);
        }
        self.next_token();
        let extends = self.parse_union_type()?;
        self.parse_expected(SyntaxKind::Question, "`?`")?;
        let true_ty = self.parse_type()?;
        self.parse_expected(SyntaxKind::Colon, "`:`")?;
        let false_ty = self.parse_type()?;

        let mut infer_names = Vec::new();
        extends.collect_infer_names(&mut infer_names);

        Ok(TypeNode::Conditional {
            check: Box::new(check),
            extends: Box::new(extends),
            true_ty: Box::new(true_ty),
            false_ty: Box::new(false_ty),
            infer_names,
        })
    }

    fn parse_union_type(&mut self) -> Result<TypeNode, ParseError> {
        // Leading `|` is allowed: `| "a" | "b"`.
        if self.is_token(SyntaxKind::Bar) {
            self.next_token();
        }
        let first = self.parse_intersection_type()?;
        if !self.is_token(SyntaxKind::Bar) {
            return Ok(first);
        }
        let mut members = vec![first];
        while self.is_token(SyntaxKind::Bar) {
            self.next_token();
            members.push(self.parse_intersection_type()?);
        }
        Ok(TypeNode::Union { members })
    }

    /// Intersections are outside the stepped construct set; a multi-part
    /// intersection collapses to `Other` carrying its printed text.
    fn parse_intersection_type(&mut self) -> Result<TypeNode, ParseError> {
        let first = self.parse_postfix_type()?;
        if !self.is_token(SyntaxKind::Ampersand) {
            return Ok(first);
        }
        let mut parts = vec![first];
        while self.is_token(SyntaxKind::Ampersand) {
            self.next_token();
            parts.push(self.parse_postfix_type()?);
        }
        let text = parts
            .iter()
            .map(print_type)
            .collect::<Vec<_>>()
            .join(" & ");
        Ok(TypeNode::Other { text })
    }

    /// Postfix `[]` (array) and `[K]` (indexed access).
    fn parse_postfix_type(&mut self) -> Result<TypeNode, ParseError> {
        let mut node = self.parse_primary_type()?;
        while self.is_token(SyntaxKind::OpenBracket) {
            self.next_token();
            if self.is_token(SyntaxKind::CloseBracket) {
                self.next_token();
                node = TypeNode::Array {
                    element: Box::new(node),
                };
            } else {
                let index = self.parse_type()?;
                self.parse_expected(SyntaxKind::CloseBracket, "`]`")?;
                node = TypeNode::IndexedAccess {
                    object: Box::new(node),
                    index: Box::new(index),
                };
            }
        }
        Ok(node)
    }

    fn parse_primary_type(&mut self) -> Result<TypeNode, ParseError> {
        match self.current().kind {
            SyntaxKind::StringLiteral => {
                let token = self.next_token();
                Ok(TypeNode::Literal(LiteralValue::String(token.value)))
            }
            SyntaxKind::NumericLiteral => {
                let token = self.next_token();
                Ok(TypeNode::Literal(LiteralValue::Number(token.value)))
            }
            SyntaxKind::Minus => {
                self.next_token();
                let token =
                    self.parse_expected(SyntaxKind::NumericLiteral, "Numeric literal")?;
                Ok(TypeNode::Literal(LiteralValue::Number(format!(
                    "-{}",
                    token.value
                ))))
            }
            SyntaxKind::TrueKeyword => {
                self.next_token();
                Ok(TypeNode::Literal(LiteralValue::Boolean(true)))
            }
            SyntaxKind::FalseKeyword => {
                self.next_token();
                Ok(TypeNode::Literal(LiteralValue::Boolean(false)))
            }
            SyntaxKind::InferKeyword => {
                self.next_token();
                let name = self
                    .parse_expected(SyntaxKind::Identifier, "Inferred name")?
                    .text;
                Ok(TypeNode::Infer { name })
            }
            SyntaxKind::KeyofKeyword => {
                self.next_token();
                let inner = self.parse_postfix_type()?;
                Ok(TypeNode::Other {
                    text: format!("keyof {}", print_type(&inner)),
                })
            }
            SyntaxKind::Identifier => self.parse_type_reference(),
            SyntaxKind::NoSubstitutionTemplate => {
                let token = self.next_token();
                Ok(TypeNode::TemplateLiteral {
                    spans: vec![TemplateSpan::Text(token.value)],
                })
            }
            SyntaxKind::TemplateHead => self.parse_template_literal(),
            SyntaxKind::OpenBracket => self.parse_tuple_type(),
            SyntaxKind::OpenBrace => self.parse_brace_type(),
            SyntaxKind::OpenParen => {
                self.next_token();
                let inner = self.parse_type()?;
                self.parse_expected(SyntaxKind::CloseParen, "`)`")?;
                Ok(inner)
            }
            _ => Err(ParseError::new(
                format!("Type expected, found `{}`", self.current().text),
                self.token_pos(),
            )),
        }
    }

    fn parse_type_reference(&mut self) -> Result<TypeNode, ParseError> {
        let name = self.next_token().text;
        if let Some(primitive) = PrimitiveKind::from_name(&name) {
            return Ok(TypeNode::Primitive(primitive));
        }
        if !self.is_token(SyntaxKind::LessThan) {
            return Ok(TypeNode::AliasReference { name });
        }
        self.next_token();
        let mut args = Vec::new();
        loop {
            args.push(self.parse_type()?);
            if self.is_token(SyntaxKind::Comma) {
                self.next_token();
                continue;
            }
            break;
        }
        self.parse_expected(SyntaxKind::GreaterThan, "`>`")?;
        Ok(TypeNode::GenericReference { name, args })
    }

    fn parse_template_literal(&mut self) -> Result<TypeNode, ParseError> {
        let head = self.next_token();
        let mut spans = Vec::new();
        if !head.value.is_empty() {
            spans.push(TemplateSpan::Text(head.value));
        }
        loop {
            let hole = self.parse_type()?;
            spans.push(TemplateSpan::Hole(hole));
            match self.current().kind {
                SyntaxKind::TemplateMiddle => {
                    let middle = self.next_token();
                    if !middle.value.is_empty() {
                        spans.push(TemplateSpan::Text(middle.value));
                    }
                }
                SyntaxKind::TemplateTail => {
                    let tail = self.next_token();
                    if !tail.value.is_empty() {
                        spans.push(TemplateSpan::Text(tail.value));
                    }
                    break;
                }
                _ => {
                    return Err(ParseError::new(
                        "Unterminated template literal type",
                        self.token_pos(),
                    ));
                }
            }
        }
        Ok(TypeNode::TemplateLiteral { spans })
    }

    fn parse_tuple_type(&mut self) -> Result<TypeNode, ParseError> {
        self.next_token();
        let mut elements = Vec::new();
        if !self.is_token(SyntaxKind::CloseBracket) {
            loop {
                elements.push(self.parse_type()?);
                if self.is_token(SyntaxKind::Comma) {
                    self.next_token();
                    continue;
                }
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBracket, "`]`")?;
        Ok(TypeNode::Tuple { elements })
    }

    /// `{ ... }` — either a mapped type or an object type literal, decided by
    /// lookahead for `[Ident in`.
    fn parse_brace_type(&mut self) -> Result<TypeNode, ParseError> {
        if self.is_mapped_type_start() {
            self.parse_mapped_type()
        } else {
            self.parse_object_type()
        }
    }

    fn is_mapped_type_start(&self) -> bool {
        let mut ahead = 1;
        if self.peek_kind(ahead) == SyntaxKind::ReadonlyKeyword {
            ahead += 1;
        }
        self.peek_kind(ahead) == SyntaxKind::OpenBracket
            && self.peek_kind(ahead + 1) == SyntaxKind::Identifier
            && self.peek_kind(ahead + 2) == SyntaxKind::InKeyword
    }

    fn parse_mapped_type(&mut self) -> Result<TypeNode, ParseError> {
        self.parse_expected(SyntaxKind::OpenBrace, "`{`")?;
        let readonly = if self.is_token(SyntaxKind::ReadonlyKeyword) {
            self.next_token();
            true
        } else {
            false
        };
        self.parse_expected(SyntaxKind::OpenBracket, "`[`")?;
        let key_name = self
            .parse_expected(SyntaxKind::Identifier, "Mapped type key name")?
            .text;
        self.parse_expected(SyntaxKind::InKeyword, "`in`")?;
        let source = self.parse_type()?;
        self.parse_expected(SyntaxKind::CloseBracket, "`]`")?;
        let optional = if self.is_token(SyntaxKind::Question) {
            self.next_token();
            true
        } else {
            false
        };
        self.parse_expected(SyntaxKind::Colon, "`:`")?;
        let value = self.parse_type()?;
        if self.is_token(SyntaxKind::Semicolon) || self.is_token(SyntaxKind::Comma) {
            self.next_token();
        }
        self.parse_expected(SyntaxKind::CloseBrace, "`}`")?;
        Ok(TypeNode::Mapped {
            key_name,
            source: Box::new(source),
            value: Box::new(value),
            readonly,
            optional,
        })
    }

    fn parse_object_type(&mut self) -> Result<TypeNode, ParseError> {
        self.parse_expected(SyntaxKind::OpenBrace, "`{`")?;
        let mut properties = Vec::new();
        while !self.is_token(SyntaxKind::CloseBrace) {
            let readonly = if self.is_token(SyntaxKind::ReadonlyKeyword) {
                self.next_token();
                true
            } else {
                false
            };
            let name = match self.current().kind {
                SyntaxKind::Identifier
                | SyntaxKind::TypeKeyword
                | SyntaxKind::InKeyword
                | SyntaxKind::TrueKeyword
                | SyntaxKind::FalseKeyword => self.next_token().text,
                SyntaxKind::StringLiteral => self.next_token().value,
                SyntaxKind::NumericLiteral => self.next_token().value,
                _ => {
                    return Err(ParseError::new(
                        format!("Property name expected, found `{}`", self.current().text),
                        self.token_pos(),
                    ));
                }
            };
            let optional = if self.is_token(SyntaxKind::Question) {
                self.next_token();
                true
            } else {
                false
            };
            self.parse_expected(SyntaxKind::Colon, "`:`")?;
            let ty = self.parse_type()?;
            properties.push(PropertySig {
                name,
                optional,
                readonly,
                ty,
            });
            if self.is_token(SyntaxKind::Semicolon) || self.is_token(SyntaxKind::Comma) {
                self.next_token();
                continue;
            }
            break;
        }
        self.parse_expected(SyntaxKind::CloseBrace, "`}`")?;
        Ok(TypeNode::Object { properties })
    }
}
