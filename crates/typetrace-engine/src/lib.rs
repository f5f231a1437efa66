//! Type resolution trace engine.
//!
//! Given a type expression and optional auxiliary declarations, the engine
//! replays how a structural type system resolves the expression — union
//! distribution, branch selection under `infer`, Cartesian expansion of
//! template-literal unions, mapped-type key iteration, indexed access — as
//! an ordered, append-only log of discrete steps suitable for rendering.
//!
//! Every assignability judgment is deferred to a [`TypeOracle`]; the engine
//! contains no subtyping logic of its own. The walk is deterministic:
//! identical input yields a byte-identical step sequence.
//!
//! ```no_run
//! use typetrace_engine::{ResolveRequest, resolve};
//! # fn demo(oracle: &dyn typetrace_engine::TypeOracle) {
//! let request = ResolveRequest {
//!     type_expression_text: "Test<\"a\" | \"b\">".to_string(),
//!     auxiliary_declarations_text: Some(
//!         "type Test<T> = T extends \"a\" ? 1 : 2;".to_string(),
//!     ),
//! };
//! let result = resolve(&request, oracle).unwrap();
//! assert_eq!(result.final_type_text, "1 | 2");
//! # }
//! ```

mod cancel;
mod error;
pub mod limits;
mod oracle;
mod resolver;
mod rules;
mod step;
mod substitute;

pub use cancel::CancelToken;
pub use error::{EngineError, ResolutionError};
pub use oracle::{ConditionVerdict, OracleError, TypeOracle};
pub use resolver::{ResolveOptions, TraceBuilder};
pub use step::{ResolutionResult, StepId, StepKind, TraceLog, TraceStep};
pub use substitute::TypeSubstitution;

use typetrace_syntax::{parse_declarations, parse_type_expression};

/// Engine input: the expression to resolve plus optional `type X = ...;`
/// declarations it may reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    pub type_expression_text: String,
    pub auxiliary_declarations_text: Option<String>,
}

/// Resolve a request with default options.
pub fn resolve(
    request: &ResolveRequest,
    oracle: &dyn TypeOracle,
) -> Result<ResolutionResult, EngineError> {
    resolve_with_options(request, oracle, &ResolveOptions::default())
}

/// Resolve a request with explicit step-cap and cancellation options.
pub fn resolve_with_options(
    request: &ResolveRequest,
    oracle: &dyn TypeOracle,
    options: &ResolveOptions,
) -> Result<ResolutionResult, EngineError> {
    let context_source = request.auxiliary_declarations_text.as_deref().unwrap_or("");
    let table = parse_declarations(context_source)?;
    let target = parse_type_expression(&request.type_expression_text)?;
    tracing::debug!(
        expression = %request.type_expression_text,
        aliases = table.len(),
        "starting resolution"
    );
    let builder = TraceBuilder::new(&table, oracle, context_source, options);
    builder.run(&target)
}
