//! The Trace Builder: a depth-first walk over the type-expression tree that
//! asks the oracle at every decision point and appends ordered steps to the
//! log.
//!
//! The walk is synchronous and deterministic: independent members are
//! resolved in declared order, and emission order never depends on oracle
//! completion timing. Construct-specific rules live under `rules/`.

use rustc_hash::FxHashMap;
use typetrace_syntax::{
    LiteralValue, SymbolTable, TypeNode, parse_type_expression, print_type,
};

use crate::cancel::CancelToken;
use crate::error::{EngineError, ResolutionError};
use crate::limits::{DEFAULT_MAX_TRACE_STEPS, MAX_RESOLUTION_DEPTH};
use crate::oracle::{OracleError, TypeOracle};
use crate::step::{ResolutionResult, StepId, StepKind, TraceLog};
use crate::substitute::TypeSubstitution;

/// Per-request policy knobs.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Cap on emitted trace steps.
    pub max_steps: usize,
    /// Cooperative cancellation handle; checked between any two steps.
    pub cancel: CancelToken,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_TRACE_STEPS,
            cancel: CancelToken::new(),
        }
    }
}

/// Internal walk failure; converted to `EngineError` (with the partial log)
/// at the top of `run`.
#[derive(Debug)]
pub(crate) enum WalkError {
    Oracle(OracleError),
    Cancelled,
    Arity {
        name: String,
        expected: usize,
        supplied: usize,
    },
    Fault(String),
}

impl From<OracleError> for WalkError {
    fn from(err: OracleError) -> Self {
        Self::Oracle(err)
    }
}

/// Walks one parsed type expression against a read-only symbol table,
/// emitting steps to a private append-only log.
pub struct TraceBuilder<'a> {
    pub(crate) table: &'a SymbolTable,
    pub(crate) oracle: &'a dyn TypeOracle,
    pub(crate) context_source: &'a str,
    pub(crate) options: &'a ResolveOptions,
    pub(crate) log: TraceLog,
    /// In-scope bindings: generic parameters, inferred names, mapped keys.
    pub(crate) scope: FxHashMap<String, TypeNode>,
}

impl<'a> TraceBuilder<'a> {
    pub fn new(
        table: &'a SymbolTable,
        oracle: &'a dyn TypeOracle,
        context_source: &'a str,
        options: &'a ResolveOptions,
    ) -> Self {
        Self {
            table,
            oracle,
            context_source,
            options,
            log: TraceLog::new(),
            scope: FxHashMap::default(),
        }
    }

    /// Resolve `target`, consuming the builder. Failures carry the partial
    /// trace collected so far.
    pub fn run(mut self, target: &TypeNode) -> Result<ResolutionResult, EngineError> {
        match self.resolve_node(target, 0, None) {
            Ok(final_type_text) => Ok(ResolutionResult {
                final_type_text,
                steps: self.log.into_steps(),
            }),
            Err(WalkError::Arity {
                name,
                expected,
                supplied,
            }) => Err(EngineError::Arity {
                name,
                expected,
                supplied,
            }),
            Err(err) => {
                let (message, retryable, cancelled) = match err {
                    WalkError::Oracle(oracle_err) => {
                        (oracle_err.to_string(), oracle_err.is_retryable(), false)
                    }
                    WalkError::Cancelled => ("resolution cancelled".to_string(), false, true),
                    WalkError::Fault(message) => (message, false, false),
                    WalkError::Arity { .. } => unreachable!("handled above"),
                };
                Err(EngineError::Resolution(ResolutionError {
                    message,
                    partial_steps: self.log.into_steps(),
                    retryable,
                    cancelled,
                }))
            }
        }
    }

    /// Append a step, honoring cancellation and the step cap first.
    pub(crate) fn emit(
        &mut self,
        kind: StepKind,
        expression_text: impl Into<String>,
        result_text: Option<String>,
        depth: u32,
        parent_id: Option<StepId>,
    ) -> Result<StepId, WalkError> {
        if self.options.cancel.is_cancelled() {
            return Err(WalkError::Cancelled);
        }
        if self.log.len() >= self.options.max_steps {
            return Err(WalkError::Fault(format!(
                "trace exceeded {} steps",
                self.options.max_steps
            )));
        }
        Ok(self
            .log
            .push(kind, expression_text, result_text, depth, parent_id))
    }

    /// Apply the current scope to `node`, producing the grounded form used
    /// for display text and oracle queries.
    pub(crate) fn scoped(&self, node: &TypeNode) -> TypeNode {
        if self.scope.is_empty() {
            return node.clone();
        }
        TypeSubstitution::from_bindings(
            self.scope
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        )
        .apply(node)
    }

    pub(crate) fn resolve_node(
        &mut self,
        node: &TypeNode,
        depth: u32,
        parent: Option<StepId>,
    ) -> Result<String, WalkError> {
        if depth > MAX_RESOLUTION_DEPTH {
            return Err(WalkError::Fault(format!(
                "resolution exceeded depth {MAX_RESOLUTION_DEPTH}"
            )));
        }

        match node {
            TypeNode::Literal(_) | TypeNode::Primitive(_) | TypeNode::Infer { .. } => {
                Ok(print_type(node))
            }
            TypeNode::Other { text } => Ok(self
                .oracle
                .print_type(text, self.context_source)?),
            TypeNode::AliasReference { name } => self.resolve_alias_reference(name, depth, parent),
            TypeNode::GenericReference { name, args } => {
                self.resolve_generic(name, args, depth, parent)
            }
            TypeNode::Conditional { .. } => self.resolve_conditional(node, depth, parent),
            TypeNode::TemplateLiteral { spans } => {
                self.resolve_template(node, spans, depth, parent)
            }
            TypeNode::Mapped { .. } => self.resolve_mapped(node, depth, parent),
            TypeNode::IndexedAccess { object, index } => {
                self.resolve_indexed_access(object, index, depth, parent)
            }
            TypeNode::Union { members } => self.resolve_plain_union(node, members, depth, parent),
            TypeNode::Tuple { elements } => {
                let mut parts = Vec::with_capacity(elements.len());
                for element in elements {
                    parts.push(self.resolve_node(element, depth, parent)?);
                }
                Ok(format!("[{}]", parts.join(", ")))
            }
            TypeNode::Object { properties } => {
                if properties.is_empty() {
                    return Ok("{}".to_string());
                }
                let mut parts = Vec::with_capacity(properties.len());
                for prop in properties {
                    let value = self.resolve_node(&prop.ty, depth, parent)?;
                    let mut text = String::new();
                    if prop.readonly {
                        text.push_str("readonly ");
                    }
                    text.push_str(&prop.name);
                    if prop.optional {
                        text.push('?');
                    }
                    text.push_str(": ");
                    text.push_str(&value);
                    parts.push(text);
                }
                Ok(format!("{{ {} }}", parts.join("; ")))
            }
            TypeNode::Array { element } => {
                let element_text = self.resolve_node(element, depth, parent)?;
                let element_node = parse_result(&element_text);
                Ok(print_type(&TypeNode::Array {
                    element: Box::new(element_node),
                }))
            }
        }
    }

    /// A bare name: an in-scope binding (parameter, inferred name, mapped
    /// key) or a zero-parameter alias from the symbol table.
    fn resolve_alias_reference(
        &mut self,
        name: &str,
        depth: u32,
        parent: Option<StepId>,
    ) -> Result<String, WalkError> {
        if let Some(bound) = self.scope.get(name) {
            let text = print_type(bound);
            self.emit(
                StepKind::AliasReference,
                name,
                Some(text.clone()),
                depth,
                parent,
            )?;
            return Ok(text);
        }

        let Some(decl) = self.table.get(name) else {
            return Err(WalkError::Fault(format!("unknown type name `{name}`")));
        };
        if !decl.params.is_empty() {
            return Err(WalkError::Arity {
                name: name.to_string(),
                expected: decl.params.len(),
                supplied: 0,
            });
        }

        let body = decl.body.clone();
        let start = self.emit(StepKind::TypeAliasStart, name, None, depth, parent)?;
        // Alias bodies resolve in their own lexical scope.
        let saved_scope = std::mem::take(&mut self.scope);
        let result = self.resolve_node(&body, depth + 1, Some(start));
        self.scope = saved_scope;
        let result = result?;
        self.emit(
            StepKind::TypeAliasResult,
            name,
            Some(result.clone()),
            depth,
            parent,
        )?;
        Ok(result)
    }

    /// Union encountered outside a distributing position: resolve each member
    /// independently, no distribution semantics.
    fn resolve_plain_union(
        &mut self,
        union: &TypeNode,
        members: &[TypeNode],
        depth: u32,
        parent: Option<StepId>,
    ) -> Result<String, WalkError> {
        let union_text = print_type(&self.scoped(union));
        let mut results = Vec::with_capacity(members.len());
        for member in members {
            let member_text = print_type(&self.scoped(member));
            let resolved = self.resolve_node(member, depth, parent)?;
            self.emit(
                StepKind::Substitution,
                member_text,
                Some(resolved.clone()),
                depth,
                parent,
            )?;
            results.push(resolved);
        }
        let combined = combine_union(&results);
        self.emit(
            StepKind::Substitution,
            union_text,
            Some(combined.clone()),
            depth,
            parent,
        )?;
        Ok(combined)
    }
}

/// Parse a result text back into a tree. Result texts are this crate's own
/// printed forms; anything unparseable is carried opaquely.
pub(crate) fn parse_result(text: &str) -> TypeNode {
    parse_type_expression(text).unwrap_or_else(|_| TypeNode::Other {
        text: text.to_string(),
    })
}

/// Split a printed type into its top-level union member texts.
pub(crate) fn split_union_text(text: &str) -> Vec<String> {
    match parse_result(text) {
        TypeNode::Union { members } => members.iter().map(print_type).collect(),
        _ => vec![text.to_string()],
    }
}

/// Union of result texts: flatten nested unions, drop `never`, deduplicate
/// structurally identical members, preserve first-seen order.
pub(crate) fn combine_union(results: &[String]) -> String {
    let mut seen: Vec<String> = Vec::new();
    for result in results {
        for member in split_union_text(result) {
            if member == "never" {
                continue;
            }
            if !seen.contains(&member) {
                seen.push(member);
            }
        }
    }
    if seen.is_empty() {
        "never".to_string()
    } else {
        seen.join(" | ")
    }
}

/// The literal text a union member contributes to a template-literal
/// combination, or `None` when the member is not reducible to a literal.
pub(crate) fn literal_text(node: &TypeNode) -> Option<String> {
    match node {
        TypeNode::Literal(LiteralValue::String(value)) => Some(value.clone()),
        TypeNode::Literal(LiteralValue::Number(text)) => Some(text.clone()),
        TypeNode::Literal(LiteralValue::Boolean(value)) => {
            Some(if *value { "true" } else { "false" }.to_string())
        }
        _ => None,
    }
}
