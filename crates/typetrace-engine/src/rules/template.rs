//! Template-literal resolution: Cartesian expansion of interpolation holes.
//!
//! Each hole contributes its union's members (or a singleton); combinations
//! are generated row-major with the rightmost hole varying fastest. A hole
//! member that is not reducible to a literal contributes its printed form as
//! one member, and the produced combination stays a template string.

use typetrace_syntax::{LiteralValue, TemplateSpan, TypeNode, print_type};

use crate::limits::TEMPLATE_LITERAL_EXPANSION_LIMIT;
use crate::resolver::{TraceBuilder, WalkError, combine_union, literal_text, parse_result};
use crate::step::{StepId, StepKind};

/// One in-progress combination: accumulated text, still purely literal?
#[derive(Clone)]
struct Combination {
    text: String,
    literal: bool,
}

impl<'a> TraceBuilder<'a> {
    pub(crate) fn resolve_template(
        &mut self,
        node: &TypeNode,
        spans: &[TemplateSpan],
        depth: u32,
        parent: Option<StepId>,
    ) -> Result<String, WalkError> {
        let template_text = print_type(&self.scoped(node));

        let mut combinations = vec![Combination {
            text: String::new(),
            literal: true,
        }];

        for span in spans {
            match span {
                TemplateSpan::Text(text) => {
                    for combo in &mut combinations {
                        combo.text.push_str(text);
                    }
                }
                TemplateSpan::Hole(hole) => {
                    let members = self.hole_members(hole, depth, parent)?;
                    let expanded = combinations
                        .len()
                        .saturating_mul(members.len());
                    if expanded > TEMPLATE_LITERAL_EXPANSION_LIMIT {
                        return Err(WalkError::Fault(format!(
                            "template literal expansion exceeds {TEMPLATE_LITERAL_EXPANSION_LIMIT} members"
                        )));
                    }
                    // Rightmost hole varies fastest: existing combinations
                    // iterate in the outer loop, this hole's members inner.
                    let mut next = Vec::with_capacity(expanded);
                    for combo in &combinations {
                        for member in &members {
                            match literal_text(member) {
                                Some(text) => next.push(Combination {
                                    text: format!("{}{}", combo.text, text),
                                    literal: combo.literal,
                                }),
                                None => next.push(Combination {
                                    text: format!(
                                        "{}${{{}}}",
                                        combo.text,
                                        print_type(member)
                                    ),
                                    literal: false,
                                }),
                            }
                        }
                    }
                    combinations = next;
                }
            }
        }

        let mut produced = Vec::with_capacity(combinations.len());
        for combo in &combinations {
            let printed = if combo.literal {
                print_type(&TypeNode::Literal(LiteralValue::String(combo.text.clone())))
            } else {
                format!("`{}`", combo.text)
            };
            self.emit(
                StepKind::TemplateLiteral,
                template_text.clone(),
                Some(printed.clone()),
                depth,
                parent,
            )?;
            produced.push(printed);
        }

        let combined = combine_union(&produced);
        self.emit(
            StepKind::TemplateLiteral,
            template_text,
            Some(combined.clone()),
            depth,
            parent,
        )?;
        Ok(combined)
    }

    /// The member set a hole contributes. Compound holes resolve first
    /// (emitting their own steps); the resolved form's union members are the
    /// contributions.
    fn hole_members(
        &mut self,
        hole: &TypeNode,
        depth: u32,
        parent: Option<StepId>,
    ) -> Result<Vec<TypeNode>, WalkError> {
        let grounded = match self.scoped(hole) {
            scoped @ (TypeNode::Literal(_)
            | TypeNode::Primitive(_)
            | TypeNode::Union { .. }) => scoped,
            _ => {
                let text = self.resolve_node(hole, depth, parent)?;
                parse_result(&text)
            }
        };
        Ok(match grounded {
            TypeNode::Union { members } => members,
            single => vec![single],
        })
    }
}
