//! Structural oracle for the typetrace engine.
//!
//! Implements [`TypeOracle`] for the self-contained expression domain the
//! engine evaluates: literals, primitives, unions, tuples, objects, arrays,
//! template literals and the stepped constructs. The engine itself never
//! re-implements subtyping; this crate is where those judgments live,
//! standing in for an external type-checking service.
//!
//! Context parsing is the per-session startup cost; it is amortized with a
//! cache keyed by context source, so repeated queries under one context
//! reuse the symbol table.

mod eval;
mod extends;

use std::cell::RefCell;

use rustc_hash::FxHashMap;
use typetrace_engine::{ConditionVerdict, OracleError, TypeOracle};
use typetrace_syntax::{SymbolTable, parse_declarations, parse_type_expression, print_type};

use eval::Evaluator;
use extends::InferBindings;

/// In-process ground-truth oracle. Idempotent: answers depend only on the
/// query texts and context source.
#[derive(Default)]
pub struct StructuralOracle {
    sessions: RefCell<FxHashMap<String, SymbolTable>>,
}

impl StructuralOracle {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_table<T>(
        &self,
        context_source: &str,
        query: impl FnOnce(&SymbolTable) -> Result<T, OracleError>,
    ) -> Result<T, OracleError> {
        let mut sessions = self.sessions.borrow_mut();
        if !sessions.contains_key(context_source) {
            let table = parse_declarations(context_source)
                .map_err(|err| OracleError::Query(err.to_string()))?;
            tracing::debug!(aliases = table.len(), "oracle session context loaded");
            sessions.insert(context_source.to_string(), table);
        }
        query(&sessions[context_source])
    }
}

impl TypeOracle for StructuralOracle {
    fn check_condition(
        &self,
        check_text: &str,
        extends_text: &str,
        infer_names: &[String],
        context_source: &str,
    ) -> Result<ConditionVerdict, OracleError> {
        self.with_table(context_source, |table| {
            let check = parse_type_expression(check_text)
                .map_err(|err| OracleError::Query(err.to_string()))?;
            let pattern = parse_type_expression(extends_text)
                .map_err(|err| OracleError::Query(err.to_string()))?;

            let mut evaluator = Evaluator::new(table);
            let check_value = evaluator
                .eval(&check)
                .map_err(OracleError::Query)?;
            let pattern_value = evaluator
                .eval(&pattern)
                .map_err(OracleError::Query)?;

            let mut bindings = InferBindings::default();
            let satisfied = extends::satisfies(&check_value, &pattern_value, &mut bindings);
            tracing::trace!(check = check_text, extends = extends_text, satisfied, "extends check");

            let bound = if satisfied {
                infer_names
                    .iter()
                    .map(|name| {
                        let value = bindings
                            .get(name)
                            .map(print_type)
                            // An infer name left unmatched binds never.
                            .unwrap_or_else(|| "never".to_string());
                        (name.clone(), value)
                    })
                    .collect()
            } else {
                Vec::new()
            };
            Ok(ConditionVerdict {
                satisfied,
                bindings: bound,
            })
        })
    }

    fn print_type(
        &self,
        expression_text: &str,
        context_source: &str,
    ) -> Result<String, OracleError> {
        self.with_table(context_source, |table| {
            let node = parse_type_expression(expression_text)
                .map_err(|err| OracleError::Query(err.to_string()))?;
            let value = Evaluator::new(table)
                .eval(&node)
                .map_err(OracleError::Query)?;
            Ok(print_type(&value))
        })
    }
}
