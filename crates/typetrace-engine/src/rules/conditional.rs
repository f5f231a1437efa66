//! Conditional type resolution: `C extends E ? T : F`.
//!
//! A conditional whose check type is a naked in-scope type-parameter
//! reference bound to a union distributes: each member is checked
//! independently (in declared order) and the results re-union. A union
//! reached any other way is treated as a single opaque value.

use smallvec::SmallVec;
use typetrace_syntax::{TypeNode, print_type};

use crate::resolver::{TraceBuilder, WalkError, combine_union, parse_result};
use crate::step::{StepId, StepKind};

impl<'a> TraceBuilder<'a> {
    pub(crate) fn resolve_conditional(
        &mut self,
        node: &TypeNode,
        depth: u32,
        parent: Option<StepId>,
    ) -> Result<String, WalkError> {
        let TypeNode::Conditional {
            check,
            extends,
            true_ty,
            false_ty,
            infer_names,
        } = node
        else {
            return Err(WalkError::Fault("expected a conditional type".into()));
        };

        // Distribution applies only to a naked type-parameter check bound to
        // a union; the parser/scope distinguish naked from wrapped checks.
        if let TypeNode::AliasReference { name } = check.as_ref() {
            if let Some(TypeNode::Union { members }) = self.scope.get(name) {
                let name = name.clone();
                let members = members.clone();
                return self.distribute_conditional(
                    &name, members, check, extends, true_ty, false_ty, infer_names, depth, parent,
                );
            }
        }

        self.conditional_once(check, extends, true_ty, false_ty, infer_names, depth, parent, true)
    }

    fn distribute_conditional(
        &mut self,
        param: &str,
        members: Vec<TypeNode>,
        check: &TypeNode,
        extends: &TypeNode,
        true_ty: &TypeNode,
        false_ty: &TypeNode,
        infer_names: &[String],
        depth: u32,
        parent: Option<StepId>,
    ) -> Result<String, WalkError> {
        let check_text = print_type(&self.scoped(check));
        let extends_text = print_type(&self.scoped(extends));
        let condition_id = self.emit(
            StepKind::Condition,
            format!("{check_text} extends {extends_text}"),
            None,
            depth,
            parent,
        )?;
        tracing::debug!(param, members = members.len(), "distributing conditional over union");

        let mut member_results = Vec::with_capacity(members.len());
        for member in &members {
            let previous = self.scope.insert(param.to_string(), member.clone());
            let result = self.conditional_once(
                check,
                extends,
                true_ty,
                false_ty,
                infer_names,
                depth + 1,
                Some(condition_id),
                false,
            );
            match previous {
                Some(bound) => {
                    self.scope.insert(param.to_string(), bound);
                }
                None => {
                    self.scope.remove(param);
                }
            }
            member_results.push(result?);
        }

        let combined = combine_union(&member_results);
        let full_text = format!(
            "{check_text} extends {extends_text} ? {} : {}",
            print_type(&self.scoped(true_ty)),
            print_type(&self.scoped(false_ty))
        );
        self.emit(
            StepKind::ConditionalEvaluation,
            full_text,
            Some(combined.clone()),
            depth,
            Some(condition_id),
        )?;
        Ok(combined)
    }

    /// One non-distributing evaluation of a conditional. When
    /// `with_condition_step` is false the caller already emitted the
    /// `condition` step (distribution) and `parent` is that step.
    fn conditional_once(
        &mut self,
        check: &TypeNode,
        extends: &TypeNode,
        true_ty: &TypeNode,
        false_ty: &TypeNode,
        infer_names: &[String],
        depth: u32,
        parent: Option<StepId>,
        with_condition_step: bool,
    ) -> Result<String, WalkError> {
        let check_scoped = self.scoped(check);
        let check_text = if needs_pre_resolution(&check_scoped) {
            let left = self.emit(
                StepKind::ConditionalEvaluateLeft,
                print_type(&check_scoped),
                None,
                depth,
                parent,
            )?;
            self.resolve_node(check, depth + 1, Some(left))?
        } else {
            print_type(&check_scoped)
        };

        let extends_scoped = self.scoped(extends);
        let extends_text = if infer_names.is_empty() && needs_pre_resolution(&extends_scoped) {
            let right = self.emit(
                StepKind::ConditionalEvaluateRight,
                print_type(&extends_scoped),
                None,
                depth,
                parent,
            )?;
            self.resolve_node(extends, depth + 1, Some(right))?
        } else {
            print_type(&extends_scoped)
        };

        let cond_text = format!("{check_text} extends {extends_text}");
        let condition_id = if with_condition_step {
            Some(self.emit(StepKind::Condition, cond_text.clone(), None, depth, parent)?)
        } else {
            parent
        };

        let verdict = self.oracle.check_condition(
            &check_text,
            &extends_text,
            infer_names,
            self.context_source,
        )?;
        self.emit(
            StepKind::ConditionalEvaluation,
            cond_text.clone(),
            Some(if verdict.satisfied { "true" } else { "false" }.to_string()),
            depth,
            condition_id,
        )?;

        let (branch_kind, branch_node) = if verdict.satisfied {
            (StepKind::BranchTrue, true_ty)
        } else {
            (StepKind::BranchFalse, false_ty)
        };

        // Inferred names are visible in the true branch only.
        let mut saved_bindings: SmallVec<[(String, Option<TypeNode>); 4]> = SmallVec::new();
        if verdict.satisfied {
            for (name, bound_text) in &verdict.bindings {
                let previous = self.scope.insert(name.clone(), parse_result(bound_text));
                saved_bindings.push((name.clone(), previous));
            }
        }

        let branch_text = print_type(&self.scoped(branch_node));
        let walk = self
            .emit(branch_kind, branch_text, None, depth, condition_id)
            .and_then(|branch_id| self.resolve_node(branch_node, depth + 1, Some(branch_id)));

        for (name, previous) in saved_bindings.into_iter().rev() {
            match previous {
                Some(bound) => {
                    self.scope.insert(name, bound);
                }
                None => {
                    self.scope.remove(&name);
                }
            }
        }
        let result = walk?;

        let full_text = format!(
            "{cond_text} ? {} : {}",
            print_type(&self.scoped(true_ty)),
            print_type(&self.scoped(false_ty))
        );
        self.emit(
            StepKind::ConditionalEvaluation,
            full_text,
            Some(result.clone()),
            depth,
            condition_id,
        )?;
        Ok(result)
    }
}

/// Whether a check/extends side must itself be resolved (with its own steps)
/// before the oracle query can be grounded.
fn needs_pre_resolution(node: &TypeNode) -> bool {
    matches!(
        node,
        TypeNode::Conditional { .. }
            | TypeNode::GenericReference { .. }
            | TypeNode::TemplateLiteral { .. }
            | TypeNode::IndexedAccess { .. }
            | TypeNode::Mapped { .. }
    )
}
