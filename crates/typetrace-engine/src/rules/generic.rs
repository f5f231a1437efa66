//! Generic reference resolution: `Name<A1, .., An>`.
//!
//! Arguments are grounded first, then positionally substituted into the
//! alias's declared parameters. Argument-count mismatches fail fast with an
//! arity error.

use typetrace_syntax::{TypeNode, print_type};

use crate::resolver::{TraceBuilder, WalkError, parse_result};
use crate::step::{StepId, StepKind};
use crate::substitute::TypeSubstitution;

impl<'a> TraceBuilder<'a> {
    pub(crate) fn resolve_generic(
        &mut self,
        name: &str,
        args: &[TypeNode],
        depth: u32,
        parent: Option<StepId>,
    ) -> Result<String, WalkError> {
        let Some(decl) = self.table.get(name) else {
            return Err(WalkError::Fault(format!("unknown type name `{name}`")));
        };
        if decl.params.len() != args.len() {
            return Err(WalkError::Arity {
                name: name.to_string(),
                expected: decl.params.len(),
                supplied: args.len(),
            });
        }
        let decl = decl.clone();

        // Ground each argument: compound arguments (and table alias names)
        // resolve to their result first; literal-ish arguments bind directly.
        let mut bound_args = Vec::with_capacity(args.len());
        for arg in args {
            let node = if argument_needs_resolution(arg, self) {
                let text = self.resolve_node(arg, depth, parent)?;
                parse_result(&text)
            } else {
                self.scoped(arg)
            };
            bound_args.push(node);
        }

        let call_text = format!(
            "{name}<{}>",
            bound_args
                .iter()
                .map(print_type)
                .collect::<Vec<_>>()
                .join(", ")
        );
        let call_id = self.emit(StepKind::GenericCall, call_text.clone(), None, depth, parent)?;

        let def_text = format!(
            "type {name}<{}> = {}",
            decl.params.join(", "),
            print_type(&decl.body)
        );
        self.emit(StepKind::GenericDef, def_text, None, depth + 1, Some(call_id))?;

        let substitution = TypeSubstitution::from_bindings(
            decl.params
                .iter()
                .cloned()
                .zip(bound_args.iter().cloned()),
        );
        self.emit(
            StepKind::Substitution,
            print_type(&substitution.apply(&decl.body)),
            None,
            depth + 1,
            Some(call_id),
        )?;

        // The alias body sees its own parameters only, never the caller's
        // scope.
        let saved_scope = std::mem::replace(
            &mut self.scope,
            decl.params
                .iter()
                .cloned()
                .zip(bound_args.into_iter())
                .collect(),
        );
        let walk = self.resolve_node(&decl.body, depth + 1, Some(call_id));
        self.scope = saved_scope;
        let result = walk?;

        self.emit(
            StepKind::GenericResult,
            call_text,
            Some(result.clone()),
            depth,
            parent,
        )?;
        Ok(result)
    }
}

/// Arguments that are already values (literals, unions of values, structural
/// literals, scope-bound names) bind directly; anything that still computes
/// resolves first.
fn argument_needs_resolution(arg: &TypeNode, builder: &TraceBuilder<'_>) -> bool {
    match arg {
        TypeNode::Literal(_)
        | TypeNode::Primitive(_)
        | TypeNode::Union { .. }
        | TypeNode::Tuple { .. }
        | TypeNode::Object { .. }
        | TypeNode::Array { .. }
        | TypeNode::TemplateLiteral { .. }
        | TypeNode::Infer { .. } => false,
        TypeNode::AliasReference { name } => !builder.scope.contains_key(name),
        TypeNode::Conditional { .. }
        | TypeNode::GenericReference { .. }
        | TypeNode::Mapped { .. }
        | TypeNode::IndexedAccess { .. }
        | TypeNode::Other { .. } => true,
    }
}
