//! The trace step model: the data contract consumed by renderers.
//!
//! Steps live in an append-only arena addressed by integer id. Insertion
//! order is the meaningful order; a step is never mutated after emission, so
//! a finished trace replays by linear playback without lookahead. Parent
//! links are foreign-key style (`parent_id`), forming a forest over a single
//! linear emission order.

use serde::{Deserialize, Serialize};

/// What kind of resolution event a step describes. Renderers key off these
/// literal tags; the set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    TypeAliasStart,
    TypeAliasResult,
    GenericCall,
    GenericDef,
    GenericResult,
    Condition,
    ConditionalEvaluateLeft,
    ConditionalEvaluateRight,
    ConditionalEvaluation,
    BranchTrue,
    BranchFalse,
    TemplateLiteral,
    AliasReference,
    Substitution,
    MappedTypeStart,
    MappedTypeConstraint,
    MappedTypeConstraintResult,
    MapIteration,
    MapIterationResult,
    MappedTypeResult,
    IndexedAccess,
    IndexedAccessResult,
}

impl StepKind {
    /// The serialized literal tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TypeAliasStart => "type_alias_start",
            Self::TypeAliasResult => "type_alias_result",
            Self::GenericCall => "generic_call",
            Self::GenericDef => "generic_def",
            Self::GenericResult => "generic_result",
            Self::Condition => "condition",
            Self::ConditionalEvaluateLeft => "conditional_evaluate_left",
            Self::ConditionalEvaluateRight => "conditional_evaluate_right",
            Self::ConditionalEvaluation => "conditional_evaluation",
            Self::BranchTrue => "branch_true",
            Self::BranchFalse => "branch_false",
            Self::TemplateLiteral => "template_literal",
            Self::AliasReference => "alias_reference",
            Self::Substitution => "substitution",
            Self::MappedTypeStart => "mapped_type_start",
            Self::MappedTypeConstraint => "mapped_type_constraint",
            Self::MappedTypeConstraintResult => "mapped_type_constraint_result",
            Self::MapIteration => "map_iteration",
            Self::MapIterationResult => "map_iteration_result",
            Self::MappedTypeResult => "mapped_type_result",
            Self::IndexedAccess => "indexed_access",
            Self::IndexedAccessResult => "indexed_access_result",
        }
    }

    /// Every tag in the closed set, in a fixed order (renderer color tables
    /// iterate this).
    pub const ALL: [StepKind; 22] = [
        Self::TypeAliasStart,
        Self::TypeAliasResult,
        Self::GenericCall,
        Self::GenericDef,
        Self::GenericResult,
        Self::Condition,
        Self::ConditionalEvaluateLeft,
        Self::ConditionalEvaluateRight,
        Self::ConditionalEvaluation,
        Self::BranchTrue,
        Self::BranchFalse,
        Self::TemplateLiteral,
        Self::AliasReference,
        Self::Substitution,
        Self::MappedTypeStart,
        Self::MappedTypeConstraint,
        Self::MappedTypeConstraintResult,
        Self::MapIteration,
        Self::MapIterationResult,
        Self::MappedTypeResult,
        Self::IndexedAccess,
        Self::IndexedAccessResult,
    ];
}

/// Sequence position of a step within one trace.
pub type StepId = u32;

/// One observable resolution event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStep {
    /// Zero-based emission index; monotonic, never reordered.
    pub id: StepId,
    pub kind: StepKind,
    /// Printed form of the type expression this step concerns.
    pub expression_text: String,
    /// Printed form of a resolved sub-result, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_text: Option<String>,
    /// Nesting level; renderers indent/group by this.
    pub depth: u32,
    /// Id of the step that logically contains this one. Always refers to an
    /// earlier step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<StepId>,
}

/// Append-only step log. Ids are assigned from a single sequence counter;
/// steps are never removed or mutated.
#[derive(Debug, Default)]
pub struct TraceLog {
    steps: Vec<TraceStep>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Append a step and return its id.
    pub fn push(
        &mut self,
        kind: StepKind,
        expression_text: impl Into<String>,
        result_text: Option<String>,
        depth: u32,
        parent_id: Option<StepId>,
    ) -> StepId {
        let id = self.steps.len() as StepId;
        debug_assert!(parent_id.is_none_or(|p| p < id));
        let step = TraceStep {
            id,
            kind,
            expression_text: expression_text.into(),
            result_text,
            depth,
            parent_id,
        };
        tracing::trace!(id, kind = kind.as_str(), depth, "emit trace step");
        self.steps.push(step);
        id
    }

    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<TraceStep> {
        self.steps
    }
}

/// A finished trace: the final type plus every step that led to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub final_type_text: String,
    pub steps: Vec<TraceStep>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_and_zero_based() {
        let mut log = TraceLog::new();
        let a = log.push(StepKind::Condition, "T extends 1", None, 0, None);
        let b = log.push(StepKind::BranchTrue, "1", None, 1, Some(a));
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(log.steps()[1].parent_id, Some(0));
    }

    #[test]
    fn kind_tags_serialize_to_fixed_literals() {
        for kind in StepKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
