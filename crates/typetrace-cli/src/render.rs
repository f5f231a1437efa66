//! Terminal rendering of a finished trace.
//!
//! Steps replay in emission order; `depth` drives indentation and the step
//! kind picks the color. Rendering never inspects parent links beyond what
//! the depth field already encodes.

use colored::{Color, Colorize};
use typetrace_engine::{ResolutionResult, StepKind, TraceStep};

/// Render the step listing plus the final type for terminal output.
pub fn render_text(result: &ResolutionResult) -> String {
    let mut out = String::new();
    for step in &result.steps {
        out.push_str(&render_step(step));
        out.push('\n');
    }
    out.push_str(&format!(
        "{} {}\n",
        "final:".bold(),
        result.final_type_text.bold().green()
    ));
    out
}

/// Render a partial trace for error reporting; no final type line.
pub fn render_partial(steps: &[TraceStep]) -> String {
    let mut out = String::new();
    for step in steps {
        out.push_str(&render_step(step));
        out.push('\n');
    }
    out
}

pub fn render_json(result: &ResolutionResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

fn render_step(step: &TraceStep) -> String {
    let indent = "  ".repeat(step.depth as usize);
    let label = step.kind.as_str().color(kind_color(step.kind));
    match &step.result_text {
        Some(result) => format!(
            "{indent}{label} {} {} {}",
            step.expression_text,
            "=>".dimmed(),
            result.cyan()
        ),
        None => format!("{indent}{label} {}", step.expression_text),
    }
}

/// One fixed color per tag; related tags share a hue.
fn kind_color(kind: StepKind) -> Color {
    match kind {
        StepKind::TypeAliasStart | StepKind::TypeAliasResult => Color::Blue,
        StepKind::GenericCall | StepKind::GenericDef | StepKind::GenericResult => {
            Color::BrightBlue
        }
        StepKind::Condition
        | StepKind::ConditionalEvaluateLeft
        | StepKind::ConditionalEvaluateRight
        | StepKind::ConditionalEvaluation => Color::Yellow,
        StepKind::BranchTrue => Color::Green,
        StepKind::BranchFalse => Color::Red,
        StepKind::TemplateLiteral => Color::Magenta,
        StepKind::AliasReference | StepKind::Substitution => Color::Cyan,
        StepKind::MappedTypeStart
        | StepKind::MappedTypeConstraint
        | StepKind::MappedTypeConstraintResult
        | StepKind::MapIteration
        | StepKind::MapIterationResult
        | StepKind::MappedTypeResult => Color::BrightMagenta,
        StepKind::IndexedAccess | StepKind::IndexedAccessResult => Color::BrightYellow,
    }
}

#[cfg(test)]
mod tests {
    use typetrace_engine::{ResolveRequest, resolve};
    use typetrace_oracle::StructuralOracle;

    use super::*;

    fn sample_result() -> ResolutionResult {
        let request = ResolveRequest {
            type_expression_text: "Test<\"a\" | \"b\">".to_string(),
            auxiliary_declarations_text: Some(
                "type Test<T> = T extends \"a\" ? 1 : 2;".to_string(),
            ),
        };
        resolve(&request, &StructuralOracle::new()).unwrap()
    }

    #[test]
    fn every_kind_has_a_color() {
        // Exhaustive match in kind_color keeps this trivially true; the loop
        // guards against a panic path sneaking in.
        for kind in StepKind::ALL {
            let _ = kind_color(kind);
        }
    }

    #[test]
    fn text_output_indents_by_depth_and_ends_with_final_type() {
        colored::control::set_override(false);
        let result = sample_result();
        let text = render_text(&result);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), result.steps.len() + 1);
        for (line, step) in lines.iter().zip(&result.steps) {
            assert!(line.starts_with(&"  ".repeat(step.depth as usize)));
            assert!(line.contains(step.kind.as_str()));
        }
        assert_eq!(lines.last().unwrap(), &"final: 1 | 2");
    }

    #[test]
    fn json_output_round_trips() {
        let result = sample_result();
        let json = render_json(&result).unwrap();
        let parsed: ResolutionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn partial_render_has_no_final_line() {
        colored::control::set_override(false);
        let result = sample_result();
        let text = render_partial(&result.steps);
        assert_eq!(text.lines().count(), result.steps.len());
        assert!(!text.contains("final:"));
    }
}
