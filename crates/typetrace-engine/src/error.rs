//! Error taxonomy for resolution requests.
//!
//! All errors are returned as values. A `ResolutionError` keeps whatever
//! partial trace was collected before the failure, so a renderer can show
//! "evaluation failed at step N"; partial traces carry steps but no final
//! type text.

use std::fmt;

use typetrace_syntax::ParseError;

use crate::step::TraceStep;

/// Failure mid-walk: oracle error, cancellation, or an internal limit.
#[derive(Debug, Clone)]
pub struct ResolutionError {
    pub message: String,
    /// Steps emitted before the failure; explicitly incomplete.
    pub partial_steps: Vec<TraceStep>,
    /// True for oracle timeouts: the caller may retry the whole resolution.
    pub retryable: bool,
    /// True when the request was aborted via its cancel token.
    pub cancelled: bool,
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "resolution failed after {} step(s): {}",
            self.partial_steps.len(),
            self.message
        )
    }
}

impl std::error::Error for ResolutionError {}

/// Everything a resolution request can fail with.
#[derive(Debug, Clone)]
pub enum EngineError {
    /// Malformed input source; surfaced immediately, no trace produced.
    Parse(ParseError),
    /// Generic reference argument-count mismatch. Policy: fail fast.
    Arity {
        name: String,
        expected: usize,
        supplied: usize,
    },
    Resolution(ResolutionError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => err.fmt(f),
            Self::Arity {
                name,
                expected,
                supplied,
            } => write!(
                f,
                "generic type `{name}` expects {expected} type argument(s), but {supplied} were supplied"
            ),
            Self::Resolution(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Resolution(err) => Some(err),
            Self::Arity { .. } => None,
        }
    }
}

impl From<ParseError> for EngineError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}
