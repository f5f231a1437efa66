//! Positional substitution of type arguments into alias bodies.
//!
//! Produces a new tree; the input tree is never mutated. Names shadowed by a
//! construct are left alone: a mapped type's key name inside its value type,
//! and a conditional's `infer` names inside its extends clause and true
//! branch.

use rustc_hash::{FxHashMap, FxHashSet};
use typetrace_syntax::{PropertySig, TemplateSpan, TypeNode};

/// Name → bound type mapping for one substitution pass.
#[derive(Debug, Default)]
pub struct TypeSubstitution {
    bindings: FxHashMap<String, TypeNode>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bindings<I>(bindings: I) -> Self
    where
        I: IntoIterator<Item = (String, TypeNode)>,
    {
        Self {
            bindings: bindings.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: TypeNode) {
        self.bindings.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&TypeNode> {
        self.bindings.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Apply the substitution to `node`, returning a new tree.
    pub fn apply(&self, node: &TypeNode) -> TypeNode {
        if self.bindings.is_empty() {
            return node.clone();
        }
        let mut shadowed = FxHashSet::default();
        self.apply_inner(node, &mut shadowed)
    }

    fn apply_inner(&self, node: &TypeNode, shadowed: &mut FxHashSet<String>) -> TypeNode {
        match node {
            TypeNode::AliasReference { name } => {
                if !shadowed.contains(name) {
                    if let Some(bound) = self.bindings.get(name) {
                        return bound.clone();
                    }
                }
                node.clone()
            }
            TypeNode::GenericReference { name, args } => TypeNode::GenericReference {
                name: name.clone(),
                args: args
                    .iter()
                    .map(|arg| self.apply_inner(arg, shadowed))
                    .collect(),
            },
            TypeNode::Conditional {
                check,
                extends,
                true_ty,
                false_ty,
                infer_names,
            } => {
                let check = self.apply_inner(check, shadowed);
                let false_ty = self.apply_inner(false_ty, shadowed);
                // `infer` names bind inside the extends clause and true branch.
                let introduced: Vec<&String> = infer_names
                    .iter()
                    .filter(|name| shadowed.insert((*name).clone()))
                    .collect();
                let extends = self.apply_inner(extends, shadowed);
                let true_ty = self.apply_inner(true_ty, shadowed);
                for name in introduced {
                    shadowed.remove(name);
                }
                TypeNode::Conditional {
                    check: Box::new(check),
                    extends: Box::new(extends),
                    true_ty: Box::new(true_ty),
                    false_ty: Box::new(false_ty),
                    infer_names: infer_names.clone(),
                }
            }
            TypeNode::Mapped {
                key_name,
                source,
                value,
                readonly,
                optional,
            } => {
                let source = self.apply_inner(source, shadowed);
                let introduced = shadowed.insert(key_name.clone());
                let value = self.apply_inner(value, shadowed);
                if introduced {
                    shadowed.remove(key_name);
                }
                TypeNode::Mapped {
                    key_name: key_name.clone(),
                    source: Box::new(source),
                    value: Box::new(value),
                    readonly: *readonly,
                    optional: *optional,
                }
            }
            TypeNode::TemplateLiteral { spans } => TypeNode::TemplateLiteral {
                spans: spans
                    .iter()
                    .map(|span| match span {
                        TemplateSpan::Text(text) => TemplateSpan::Text(text.clone()),
                        TemplateSpan::Hole(hole) => {
                            TemplateSpan::Hole(self.apply_inner(hole, shadowed))
                        }
                    })
                    .collect(),
            },
            TypeNode::IndexedAccess { object, index } => TypeNode::IndexedAccess {
                object: Box::new(self.apply_inner(object, shadowed)),
                index: Box::new(self.apply_inner(index, shadowed)),
            },
            TypeNode::Union { members } => TypeNode::Union {
                members: members
                    .iter()
                    .map(|member| self.apply_inner(member, shadowed))
                    .collect(),
            },
            TypeNode::Tuple { elements } => TypeNode::Tuple {
                elements: elements
                    .iter()
                    .map(|element| self.apply_inner(element, shadowed))
                    .collect(),
            },
            TypeNode::Object { properties } => TypeNode::Object {
                properties: properties
                    .iter()
                    .map(|prop| PropertySig {
                        name: prop.name.clone(),
                        optional: prop.optional,
                        readonly: prop.readonly,
                        ty: self.apply_inner(&prop.ty, shadowed),
                    })
                    .collect(),
            },
            TypeNode::Array { element } => TypeNode::Array {
                element: Box::new(self.apply_inner(element, shadowed)),
            },
            TypeNode::Infer { .. }
            | TypeNode::Literal(_)
            | TypeNode::Primitive(_)
            | TypeNode::Other { .. } => node.clone(),
        }
    }
}
