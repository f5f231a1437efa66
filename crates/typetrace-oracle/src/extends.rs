//! The `extends` relation over evaluated values, with `infer` capture.
//!
//! `satisfies(source, target, bindings)` answers "does `source extends
//! target` hold", binding any `infer` holes in the target along the way.
//! Both sides are expected in normal form (see `eval`), so alias and
//! generic references have already been expanded away except where they
//! stand for opaque names.

use rustc_hash::FxHashMap;
use typetrace_syntax::{LiteralValue, PrimitiveKind, TemplateSpan, TypeNode};

use crate::eval::{literal_string, make_union};

/// Values captured for `infer` names during a single `satisfies` walk.
/// A name matched at several positions accumulates a union.
#[derive(Debug, Clone, Default)]
pub(crate) struct InferBindings {
    map: FxHashMap<String, TypeNode>,
}

impl InferBindings {
    pub(crate) fn get(&self, name: &str) -> Option<&TypeNode> {
        self.map.get(name)
    }

    fn bind(&mut self, name: &str, value: TypeNode) {
        match self.map.get_mut(name) {
            Some(existing) => {
                if *existing != value {
                    let combined = make_union(vec![existing.clone(), value]);
                    *existing = combined;
                }
            }
            None => {
                self.map.insert(name.to_string(), value);
            }
        }
    }
}

pub(crate) fn satisfies(source: &TypeNode, target: &TypeNode, bindings: &mut InferBindings) -> bool {
    if let TypeNode::Infer { name } = target {
        bindings.bind(name, source.clone());
        return true;
    }
    if matches!(
        target,
        TypeNode::Primitive(PrimitiveKind::Any) | TypeNode::Primitive(PrimitiveKind::Unknown)
    ) {
        return true;
    }
    if matches!(
        source,
        TypeNode::Primitive(PrimitiveKind::Never) | TypeNode::Primitive(PrimitiveKind::Any)
    ) {
        return true;
    }

    // A union source must satisfy the target member-wise; a union target
    // needs only one matching member, with bindings committed on success.
    if let TypeNode::Union { members } = source {
        return members
            .iter()
            .all(|member| satisfies(member, target, bindings));
    }
    if let TypeNode::Union { members } = target {
        for member in members {
            let mut attempt = bindings.clone();
            if satisfies(source, member, &mut attempt) {
                *bindings = attempt;
                return true;
            }
        }
        return false;
    }

    match (source, target) {
        (TypeNode::Literal(left), TypeNode::Literal(right)) => left == right,
        (TypeNode::Literal(LiteralValue::String(_)), TypeNode::Primitive(PrimitiveKind::String))
        | (TypeNode::Literal(LiteralValue::Number(_)), TypeNode::Primitive(PrimitiveKind::Number))
        | (
            TypeNode::Literal(LiteralValue::Boolean(_)),
            TypeNode::Primitive(PrimitiveKind::Boolean),
        ) => true,
        (TypeNode::Primitive(left), TypeNode::Primitive(right)) => left == right,
        (TypeNode::Literal(LiteralValue::String(text)), TypeNode::TemplateLiteral { spans }) => {
            match_template(spans, text, bindings)
        }
        (TypeNode::TemplateLiteral { .. }, TypeNode::Primitive(PrimitiveKind::String)) => true,
        (
            TypeNode::TemplateLiteral { spans: left },
            TypeNode::TemplateLiteral { spans: right },
        ) => left == right,
        (TypeNode::Tuple { elements: left }, TypeNode::Tuple { elements: right }) => {
            left.len() == right.len()
                && left
                    .iter()
                    .zip(right)
                    .all(|(a, b)| satisfies(a, b, bindings))
        }
        (TypeNode::Tuple { elements }, TypeNode::Array { element }) => elements
            .iter()
            .all(|item| satisfies(item, element, bindings)),
        (TypeNode::Array { element: left }, TypeNode::Array { element: right }) => {
            satisfies(left, right, bindings)
        }
        // Width subtyping: source must cover every required target property.
        (TypeNode::Object { properties: left }, TypeNode::Object { properties: right }) => {
            right.iter().all(|want| {
                match left.iter().find(|have| have.name == want.name) {
                    Some(have) => satisfies(&have.ty, &want.ty, bindings),
                    None => want.optional,
                }
            })
        }
        (
            TypeNode::Object { .. } | TypeNode::Tuple { .. } | TypeNode::Array { .. },
            TypeNode::Primitive(PrimitiveKind::Object),
        ) => true,
        // Opaque names relate only to themselves.
        (TypeNode::AliasReference { name: left }, TypeNode::AliasReference { name: right }) => {
            left == right
        }
        (TypeNode::Other { text: left }, TypeNode::Other { text: right }) => left == right,
        _ => false,
    }
}

/// Match a string literal against a template pattern, binding `infer` holes
/// to the substrings they capture. Backtracks over split points, preferring
/// the shortest capture.
fn match_template(spans: &[TemplateSpan], text: &str, bindings: &mut InferBindings) -> bool {
    match spans.split_first() {
        None => text.is_empty(),
        Some((TemplateSpan::Text(prefix), rest)) => match text.strip_prefix(prefix.as_str()) {
            Some(remaining) => match_template(rest, remaining, bindings),
            None => false,
        },
        Some((TemplateSpan::Hole(hole), rest)) => {
            let mut boundaries: Vec<usize> =
                text.char_indices().map(|(index, _)| index).collect();
            boundaries.push(text.len());
            for split in boundaries {
                let candidate = &text[..split];
                let mut attempt = bindings.clone();
                if hole_matches(hole, candidate, &mut attempt)
                    && match_template(rest, &text[split..], &mut attempt)
                {
                    *bindings = attempt;
                    return true;
                }
            }
            false
        }
    }
}

fn hole_matches(hole: &TypeNode, candidate: &str, bindings: &mut InferBindings) -> bool {
    match hole {
        TypeNode::Infer { name } => {
            bindings.bind(name, TypeNode::Literal(LiteralValue::String(candidate.to_string())));
            true
        }
        TypeNode::Primitive(PrimitiveKind::String) => true,
        TypeNode::Primitive(PrimitiveKind::Number) => candidate.parse::<f64>().is_ok(),
        TypeNode::Union { members } => members
            .iter()
            .any(|member| hole_matches(member, candidate, bindings)),
        other => literal_string(other).is_some_and(|text| text == candidate),
    }
}

#[cfg(test)]
mod tests {
    use typetrace_syntax::parse_type_expression;

    use super::*;

    fn node(text: &str) -> TypeNode {
        parse_type_expression(text).unwrap()
    }

    fn check(source: &str, target: &str) -> bool {
        satisfies(&node(source), &node(target), &mut InferBindings::default())
    }

    #[test]
    fn literal_widens_to_primitive() {
        assert!(check("\"a\"", "string"));
        assert!(check("42", "number"));
        assert!(check("true", "boolean"));
        assert!(!check("\"a\"", "number"));
    }

    #[test]
    fn union_source_requires_all_members() {
        assert!(check("\"a\" | \"b\"", "string"));
        assert!(!check("\"a\" | 1", "string"));
    }

    #[test]
    fn union_target_requires_one_member() {
        assert!(check("\"a\"", "\"a\" | \"b\""));
        assert!(!check("\"c\"", "\"a\" | \"b\""));
    }

    #[test]
    fn never_satisfies_everything() {
        assert!(check("never", "\"a\""));
        assert!(check("never", "never"));
    }

    #[test]
    fn tuple_is_elementwise() {
        assert!(check("[1, \"x\"]", "[number, string]"));
        assert!(!check("[1, \"x\"]", "[number]"));
        assert!(check("[1, 2]", "number[]"));
    }

    #[test]
    fn object_width_subtyping() {
        assert!(check("{ a: 1; b: 2 }", "{ a: number }"));
        assert!(!check("{ a: 1 }", "{ a: number; b: number }"));
        assert!(check("{ a: 1 }", "{ a: number; b?: number }"));
    }

    #[test]
    fn infer_binds_whole_source() {
        let mut bindings = InferBindings::default();
        let pattern = node("[infer H, infer T]");
        assert!(satisfies(&node("[1, \"x\"]"), &pattern, &mut bindings));
        assert_eq!(bindings.get("H"), Some(&node("1")));
        assert_eq!(bindings.get("T"), Some(&node("\"x\"")));
    }

    #[test]
    fn template_pattern_splits_string() {
        let mut bindings = InferBindings::default();
        let pattern = node("`${infer Head}-${infer Tail}`");
        assert!(satisfies(
            &node("\"left-right\""),
            &pattern,
            &mut bindings
        ));
        assert_eq!(bindings.get("Head"), Some(&node("\"left\"")));
        assert_eq!(bindings.get("Tail"), Some(&node("\"right\"")));
    }

    #[test]
    fn template_number_hole_checks_shape() {
        assert!(check("\"id-42\"", "`id-${number}`"));
        assert!(!check("\"id-x\"", "`id-${number}`"));
    }

    #[test]
    fn rebinding_accumulates_a_union() {
        let mut bindings = InferBindings::default();
        let pattern = node("[infer X, infer X]");
        assert!(satisfies(&node("[1, 2]"), &pattern, &mut bindings));
        assert_eq!(bindings.get("X"), Some(&node("1 | 2")));
    }
}
