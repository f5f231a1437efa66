//! The ground-truth oracle interface.
//!
//! The engine never re-implements subtyping; every "is X assignable to Y"
//! judgment and every opaque printed form is deferred to a `TypeOracle`.
//! Implementations must be idempotent and side-effect-free on the caller's
//! state so a failed resolution can be retried wholesale. The trait is
//! object-safe so mock oracles can drive the Trace Builder in tests.

use std::fmt;

/// Answer to an `extends` check, with the values bound for each `infer` name
/// when the check succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionVerdict {
    pub satisfied: bool,
    /// `(infer name, printed bound type)` pairs, one per requested name,
    /// populated only when `satisfied`.
    pub bindings: Vec<(String, String)>,
}

impl ConditionVerdict {
    pub fn yes() -> Self {
        Self {
            satisfied: true,
            bindings: Vec::new(),
        }
    }

    pub fn no() -> Self {
        Self {
            satisfied: false,
            bindings: Vec::new(),
        }
    }
}

/// Oracle failure. `Timeout` is the retryable subtype: the caller may re-run
/// the whole resolution, never a single branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    Timeout,
    Query(String),
}

impl OracleError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "oracle query timed out"),
            Self::Query(message) => write!(f, "oracle query failed: {message}"),
        }
    }
}

impl std::error::Error for OracleError {}

/// External type-checking service, seen as two pure request/response
/// operations. Startup cost (loading definitions for `context_source`) is the
/// implementation's concern and must be amortized across calls.
pub trait TypeOracle {
    /// Does `check_text` satisfy `extends extends_text` under
    /// `context_source`? When `infer_names` is non-empty the verdict carries
    /// the bound value for each name.
    fn check_condition(
        &self,
        check_text: &str,
        extends_text: &str,
        infer_names: &[String],
        context_source: &str,
    ) -> Result<ConditionVerdict, OracleError>;

    /// The printed form of `expression_text` under `context_source`.
    fn print_type(
        &self,
        expression_text: &str,
        context_source: &str,
    ) -> Result<String, OracleError>;
}
