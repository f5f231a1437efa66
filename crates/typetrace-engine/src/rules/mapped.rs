//! Mapped type resolution: `{ [K in U]: V }` and its modifier variants.
//!
//! The key union resolves first (with a constraint step pair when it is not
//! already a value), then each key substitutes as `K` into the value type,
//! one iteration pair per key in union order.

use typetrace_syntax::{LiteralValue, PrimitiveKind, TypeNode, print_type};

use crate::resolver::{TraceBuilder, WalkError, parse_result};
use crate::step::{StepId, StepKind};

impl<'a> TraceBuilder<'a> {
    pub(crate) fn resolve_mapped(
        &mut self,
        node: &TypeNode,
        depth: u32,
        parent: Option<StepId>,
    ) -> Result<String, WalkError> {
        let TypeNode::Mapped {
            key_name,
            source,
            value,
            readonly,
            optional,
        } = node
        else {
            return Err(WalkError::Fault("expected a mapped type".into()));
        };

        let mapped_text = print_type(&self.scoped(node));
        let start_id = self.emit(StepKind::MappedTypeStart, mapped_text.clone(), None, depth, parent)?;

        let key_node = match self.scoped(source) {
            grounded @ (TypeNode::Literal(_)
            | TypeNode::Primitive(_)
            | TypeNode::Union { .. }) => grounded,
            grounded => {
                // Constrained key source: fully resolve it first.
                let constraint_id = self.emit(
                    StepKind::MappedTypeConstraint,
                    print_type(&grounded),
                    None,
                    depth + 1,
                    Some(start_id),
                )?;
                let resolved = self.resolve_node(source, depth + 2, Some(constraint_id))?;
                self.emit(
                    StepKind::MappedTypeConstraintResult,
                    print_type(&grounded),
                    Some(resolved.clone()),
                    depth + 1,
                    Some(start_id),
                )?;
                parse_result(&resolved)
            }
        };

        let keys = match key_node {
            TypeNode::Union { members } => members,
            TypeNode::Primitive(PrimitiveKind::Never) => Vec::new(),
            single => vec![single],
        };
        tracing::debug!(keys = keys.len(), "iterating mapped type keys");

        let mut properties = Vec::with_capacity(keys.len());
        for key in &keys {
            let key_text = print_type(key);
            let iteration_id = self.emit(
                StepKind::MapIteration,
                key_text.clone(),
                None,
                depth + 1,
                Some(start_id),
            )?;

            let previous = self.scope.insert(key_name.clone(), key.clone());
            let walk = self.resolve_node(value, depth + 2, Some(iteration_id));
            match previous {
                Some(bound) => {
                    self.scope.insert(key_name.clone(), bound);
                }
                None => {
                    self.scope.remove(key_name);
                }
            }
            let value_text = walk?;

            self.emit(
                StepKind::MapIterationResult,
                key_text,
                Some(value_text.clone()),
                depth + 1,
                Some(start_id),
            )?;
            properties.push((property_name(key), value_text));
        }

        let object_text = render_object(&properties, *readonly, *optional);
        self.emit(
            StepKind::MappedTypeResult,
            mapped_text,
            Some(object_text.clone()),
            depth,
            Some(start_id),
        )?;
        Ok(object_text)
    }
}

/// How a key member prints as a property name.
fn property_name(key: &TypeNode) -> String {
    match key {
        TypeNode::Literal(LiteralValue::String(value)) => {
            if is_identifier_name(value) {
                value.clone()
            } else {
                print_type(key)
            }
        }
        TypeNode::Literal(LiteralValue::Number(text)) => text.clone(),
        _ => print_type(key),
    }
}

fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn render_object(properties: &[(String, String)], readonly: bool, optional: bool) -> String {
    if properties.is_empty() {
        return "{}".to_string();
    }
    let rendered: Vec<String> = properties
        .iter()
        .map(|(name, value)| {
            let mut text = String::new();
            if readonly {
                text.push_str("readonly ");
            }
            text.push_str(name);
            if optional {
                text.push('?');
            }
            text.push_str(": ");
            text.push_str(value);
            text
        })
        .collect();
    format!("{{ {} }}", rendered.join("; "))
}
