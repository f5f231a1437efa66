//! Indexed access resolution: `T[K]`.
//!
//! Compound sides resolve first; the access itself is a single oracle query
//! since property lookup is a subtyping-level judgment.

use typetrace_syntax::{TypeNode, print_type};

use crate::resolver::{TraceBuilder, WalkError, parse_result};
use crate::step::{StepId, StepKind};

impl<'a> TraceBuilder<'a> {
    pub(crate) fn resolve_indexed_access(
        &mut self,
        object: &TypeNode,
        index: &TypeNode,
        depth: u32,
        parent: Option<StepId>,
    ) -> Result<String, WalkError> {
        let object_node = self.ground_side(object, depth, parent)?;
        let index_node = self.ground_side(index, depth, parent)?;

        let access_text = print_type(&TypeNode::IndexedAccess {
            object: Box::new(object_node),
            index: Box::new(index_node),
        });
        let access_id = self.emit(StepKind::IndexedAccess, access_text.clone(), None, depth, parent)?;

        let result = self
            .oracle
            .print_type(&access_text, self.context_source)?;
        self.emit(
            StepKind::IndexedAccessResult,
            access_text,
            Some(result.clone()),
            depth,
            Some(access_id),
        )?;
        Ok(result)
    }

    /// Ground one side of the access: compound constructs resolve with their
    /// own steps; values and table alias names pass through (the oracle knows
    /// the context's names).
    fn ground_side(
        &mut self,
        side: &TypeNode,
        depth: u32,
        parent: Option<StepId>,
    ) -> Result<TypeNode, WalkError> {
        match self.scoped(side) {
            grounded @ (TypeNode::Literal(_)
            | TypeNode::Primitive(_)
            | TypeNode::Union { .. }
            | TypeNode::Tuple { .. }
            | TypeNode::Object { .. }
            | TypeNode::Array { .. }
            | TypeNode::AliasReference { .. }) => Ok(grounded),
            _ => {
                let text = self.resolve_node(side, depth, parent)?;
                Ok(parse_result(&text))
            }
        }
    }
}
