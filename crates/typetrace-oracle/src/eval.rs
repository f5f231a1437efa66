//! Normal-form evaluation of type expressions.
//!
//! Reduces a parsed tree to a value: literals, primitives, flattened unions,
//! and structural types with evaluated children. Carries the same
//! distribution, template-expansion and mapped-iteration semantics the
//! engine traces, which is what makes this oracle's answers usable as
//! ground truth for it.

use rustc_hash::FxHashMap;
use typetrace_syntax::{
    LiteralValue, PrimitiveKind, PropertySig, SymbolTable, TemplateSpan, TypeNode,
};

use crate::extends::{self, InferBindings};

const MAX_EVAL_DEPTH: u32 = 64;
const TEMPLATE_EXPANSION_LIMIT: usize = 1_000;

pub(crate) struct Evaluator<'a> {
    table: &'a SymbolTable,
    env: FxHashMap<String, TypeNode>,
    depth: u32,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(table: &'a SymbolTable) -> Self {
        Self {
            table,
            env: FxHashMap::default(),
            depth: 0,
        }
    }

    pub(crate) fn eval(&mut self, node: &TypeNode) -> Result<TypeNode, String> {
        if self.depth > MAX_EVAL_DEPTH {
            return Err(format!("evaluation exceeded depth {MAX_EVAL_DEPTH}"));
        }
        self.depth += 1;
        let result = self.eval_inner(node);
        self.depth -= 1;
        result
    }

    fn eval_inner(&mut self, node: &TypeNode) -> Result<TypeNode, String> {
        match node {
            TypeNode::Literal(_)
            | TypeNode::Primitive(_)
            | TypeNode::Infer { .. }
            | TypeNode::Other { .. } => Ok(node.clone()),
            TypeNode::AliasReference { name } => {
                if let Some(bound) = self.env.get(name) {
                    return Ok(bound.clone());
                }
                let Some(decl) = self.table.get(name) else {
                    return Err(format!("unknown type name `{name}`"));
                };
                if !decl.params.is_empty() {
                    return Err(format!(
                        "generic type `{name}` expects {} type argument(s)",
                        decl.params.len()
                    ));
                }
                let body = decl.body.clone();
                let saved = std::mem::take(&mut self.env);
                let result = self.eval(&body);
                self.env = saved;
                result
            }
            TypeNode::GenericReference { name, args } => {
                let Some(decl) = self.table.get(name) else {
                    return Err(format!("unknown type name `{name}`"));
                };
                if decl.params.len() != args.len() {
                    return Err(format!(
                        "generic type `{name}` expects {} type argument(s), but {} were supplied",
                        decl.params.len(),
                        args.len()
                    ));
                }
                let decl = decl.clone();
                let mut bound = FxHashMap::default();
                for (param, arg) in decl.params.iter().zip(args) {
                    bound.insert(param.clone(), self.eval(arg)?);
                }
                let saved = std::mem::replace(&mut self.env, bound);
                let result = self.eval(&decl.body);
                self.env = saved;
                result
            }
            TypeNode::Conditional { .. } => self.eval_conditional(node),
            TypeNode::Union { members } => {
                let mut evaluated = Vec::with_capacity(members.len());
                for member in members {
                    evaluated.push(self.eval(member)?);
                }
                Ok(make_union(evaluated))
            }
            TypeNode::Tuple { elements } => {
                let mut evaluated = Vec::with_capacity(elements.len());
                for element in elements {
                    evaluated.push(self.eval(element)?);
                }
                Ok(TypeNode::Tuple {
                    elements: evaluated,
                })
            }
            TypeNode::Object { properties } => {
                let mut evaluated = Vec::with_capacity(properties.len());
                for prop in properties {
                    evaluated.push(PropertySig {
                        name: prop.name.clone(),
                        optional: prop.optional,
                        readonly: prop.readonly,
                        ty: self.eval(&prop.ty)?,
                    });
                }
                Ok(TypeNode::Object {
                    properties: evaluated,
                })
            }
            TypeNode::Array { element } => Ok(TypeNode::Array {
                element: Box::new(self.eval(element)?),
            }),
            TypeNode::TemplateLiteral { spans } => self.eval_template(spans),
            TypeNode::Mapped { .. } => self.eval_mapped(node),
            TypeNode::IndexedAccess { object, index } => {
                let object_value = self.eval(object)?;
                let index_value = self.eval(index)?;
                index_into(&object_value, &index_value)
            }
        }
    }

    fn eval_conditional(&mut self, node: &TypeNode) -> Result<TypeNode, String> {
        let TypeNode::Conditional {
            check,
            extends,
            true_ty,
            false_ty,
            infer_names,
        } = node
        else {
            return Err("expected a conditional type".to_string());
        };

        // Naked type-parameter check over a union distributes.
        if let TypeNode::AliasReference { name } = check.as_ref() {
            if let Some(TypeNode::Union { members }) = self.env.get(name) {
                let name = name.clone();
                let members = members.clone();
                let mut results = Vec::with_capacity(members.len());
                for member in members {
                    let previous = self.env.insert(name.clone(), member);
                    let result =
                        self.eval_conditional_once(check, extends, true_ty, false_ty, infer_names);
                    match previous {
                        Some(value) => {
                            self.env.insert(name.clone(), value);
                        }
                        None => {
                            self.env.remove(&name);
                        }
                    }
                    results.push(result?);
                }
                return Ok(make_union(results));
            }
        }

        self.eval_conditional_once(check, extends, true_ty, false_ty, infer_names)
    }

    fn eval_conditional_once(
        &mut self,
        check: &TypeNode,
        extends: &TypeNode,
        true_ty: &TypeNode,
        false_ty: &TypeNode,
        infer_names: &[String],
    ) -> Result<TypeNode, String> {
        let check_value = self.eval(check)?;
        // `infer` nodes pass through evaluation, so the pattern keeps its
        // holes while alias references inside it are expanded.
        let pattern = self.eval(extends)?;

        let mut bindings = InferBindings::default();
        if extends::satisfies(&check_value, &pattern, &mut bindings) {
            // Inferred names are in scope for the true branch; an unmatched
            // name binds never.
            let saved: Vec<(String, Option<TypeNode>)> = infer_names
                .iter()
                .map(|name| {
                    let value = bindings
                        .get(name)
                        .cloned()
                        .unwrap_or(TypeNode::Primitive(PrimitiveKind::Never));
                    (name.clone(), self.env.insert(name.clone(), value))
                })
                .collect();
            let result = self.eval(true_ty);
            for (name, previous) in saved.into_iter().rev() {
                match previous {
                    Some(value) => {
                        self.env.insert(name, value);
                    }
                    None => {
                        self.env.remove(&name);
                    }
                }
            }
            result
        } else {
            self.eval(false_ty)
        }
    }

    fn eval_template(&mut self, spans: &[TemplateSpan]) -> Result<TypeNode, String> {
        // Each combination is a span list; contiguous text merges at the end.
        let mut combinations: Vec<Vec<TemplateSpan>> = vec![Vec::new()];
        for span in spans {
            match span {
                TemplateSpan::Text(text) => {
                    for combo in &mut combinations {
                        push_text(combo, text);
                    }
                }
                TemplateSpan::Hole(hole) => {
                    let value = self.eval(hole)?;
                    let members = match value {
                        TypeNode::Union { members } => members,
                        single => vec![single],
                    };
                    let expanded = combinations.len().saturating_mul(members.len());
                    if expanded > TEMPLATE_EXPANSION_LIMIT {
                        return Err(format!(
                            "template literal expansion exceeds {TEMPLATE_EXPANSION_LIMIT} members"
                        ));
                    }
                    let mut next = Vec::with_capacity(expanded);
                    for combo in &combinations {
                        for member in &members {
                            let mut extended = combo.clone();
                            match literal_string(member) {
                                Some(text) => push_text(&mut extended, &text),
                                None => extended.push(TemplateSpan::Hole(member.clone())),
                            }
                            next.push(extended);
                        }
                    }
                    combinations = next;
                }
            }
        }

        let members: Vec<TypeNode> = combinations
            .into_iter()
            .map(|combo| {
                if combo.iter().all(|span| matches!(span, TemplateSpan::Text(_))) {
                    let text = combo
                        .iter()
                        .map(|span| match span {
                            TemplateSpan::Text(text) => text.as_str(),
                            TemplateSpan::Hole(_) => unreachable!(),
                        })
                        .collect::<String>();
                    TypeNode::Literal(LiteralValue::String(text))
                } else {
                    TypeNode::TemplateLiteral { spans: combo }
                }
            })
            .collect();
        Ok(make_union(members))
    }

    fn eval_mapped(&mut self, node: &TypeNode) -> Result<TypeNode, String> {
        let TypeNode::Mapped {
            key_name,
            source,
            value,
            readonly,
            optional,
        } = node
        else {
            return Err("expected a mapped type".to_string());
        };

        let keys = match self.eval(source)? {
            TypeNode::Union { members } => members,
            TypeNode::Primitive(PrimitiveKind::Never) => Vec::new(),
            single => vec![single],
        };

        let mut properties = Vec::with_capacity(keys.len());
        for key in keys {
            let previous = self.env.insert(key_name.clone(), key.clone());
            let result = self.eval(value);
            match previous {
                Some(bound) => {
                    self.env.insert(key_name.clone(), bound);
                }
                None => {
                    self.env.remove(key_name);
                }
            }
            properties.push(PropertySig {
                name: key_property_name(&key),
                optional: *optional,
                readonly: *readonly,
                ty: result?,
            });
        }
        Ok(TypeNode::Object { properties })
    }
}

fn push_text(combo: &mut Vec<TemplateSpan>, text: &str) {
    if let Some(TemplateSpan::Text(last)) = combo.last_mut() {
        last.push_str(text);
    } else {
        combo.push(TemplateSpan::Text(text.to_string()));
    }
}

/// The string a literal contributes to a template combination.
pub(crate) fn literal_string(node: &TypeNode) -> Option<String> {
    match node {
        TypeNode::Literal(LiteralValue::String(value)) => Some(value.clone()),
        TypeNode::Literal(LiteralValue::Number(text)) => Some(text.clone()),
        TypeNode::Literal(LiteralValue::Boolean(value)) => {
            Some(if *value { "true" } else { "false" }.to_string())
        }
        _ => None,
    }
}

fn key_property_name(key: &TypeNode) -> String {
    match key {
        TypeNode::Literal(LiteralValue::String(value)) if is_identifier_name(value) => {
            value.clone()
        }
        TypeNode::Literal(LiteralValue::Number(text)) => text.clone(),
        other => typetrace_syntax::print_type(other),
    }
}

fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Flatten, drop `never`, deduplicate, collapse singletons.
pub(crate) fn make_union(members: Vec<TypeNode>) -> TypeNode {
    let mut flat: Vec<TypeNode> = Vec::with_capacity(members.len());
    for member in members {
        match member {
            TypeNode::Union { members: inner } => {
                for item in inner {
                    if item != TypeNode::Primitive(PrimitiveKind::Never) && !flat.contains(&item) {
                        flat.push(item);
                    }
                }
            }
            TypeNode::Primitive(PrimitiveKind::Never) => {}
            other => {
                if !flat.contains(&other) {
                    flat.push(other);
                }
            }
        }
    }
    match flat.len() {
        0 => TypeNode::Primitive(PrimitiveKind::Never),
        1 => flat.remove(0),
        _ => TypeNode::Union { members: flat },
    }
}

/// Resolve `object[index]` on evaluated values.
fn index_into(object: &TypeNode, index: &TypeNode) -> Result<TypeNode, String> {
    if let TypeNode::Union { members } = index {
        let mut results = Vec::with_capacity(members.len());
        for member in members {
            results.push(index_into(object, member)?);
        }
        return Ok(make_union(results));
    }

    match object {
        TypeNode::Object { properties } => match index {
            TypeNode::Literal(LiteralValue::String(name)) => properties
                .iter()
                .find(|prop| prop.name == *name)
                .map(|prop| prop.ty.clone())
                .ok_or_else(|| format!("property `{name}` does not exist")),
            TypeNode::Literal(LiteralValue::Number(text)) => properties
                .iter()
                .find(|prop| prop.name == *text)
                .map(|prop| prop.ty.clone())
                .ok_or_else(|| format!("property `{text}` does not exist")),
            TypeNode::Primitive(PrimitiveKind::String) => Ok(make_union(
                properties.iter().map(|prop| prop.ty.clone()).collect(),
            )),
            other => Err(format!(
                "cannot index object type with `{}`",
                typetrace_syntax::print_type(other)
            )),
        },
        TypeNode::Tuple { elements } => match index {
            TypeNode::Literal(LiteralValue::Number(text)) => {
                let position: usize = text
                    .parse()
                    .map_err(|_| format!("invalid tuple index `{text}`"))?;
                elements
                    .get(position)
                    .cloned()
                    .ok_or_else(|| format!("tuple has no element at index {position}"))
            }
            TypeNode::Primitive(PrimitiveKind::Number) => Ok(make_union(elements.clone())),
            other => Err(format!(
                "cannot index tuple type with `{}`",
                typetrace_syntax::print_type(other)
            )),
        },
        TypeNode::Array { element } => match index {
            TypeNode::Literal(LiteralValue::Number(_))
            | TypeNode::Primitive(PrimitiveKind::Number) => Ok((**element).clone()),
            other => Err(format!(
                "cannot index array type with `{}`",
                typetrace_syntax::print_type(other)
            )),
        },
        other => Err(format!(
            "type `{}` is not indexable",
            typetrace_syntax::print_type(other)
        )),
    }
}
