//! Trace Builder tests against a scripted mock oracle.
//!
//! The mock answers `extends` checks by textual equality unless a verdict is
//! scripted, and prints types as themselves unless a printed form is
//! scripted, which keeps every test deterministic and oracle-free.

use std::collections::HashMap;

use typetrace_engine::{
    CancelToken, ConditionVerdict, EngineError, OracleError, ResolveOptions, ResolveRequest,
    StepKind, TypeOracle, resolve, resolve_with_options,
};

#[derive(Default)]
struct MockOracle {
    conditions: HashMap<(String, String), ConditionVerdict>,
    prints: HashMap<String, String>,
    fail_matching: Option<(String, OracleError)>,
}

impl MockOracle {
    fn new() -> Self {
        Self::default()
    }

    fn condition(mut self, check: &str, extends: &str, verdict: ConditionVerdict) -> Self {
        self.conditions
            .insert((check.to_string(), extends.to_string()), verdict);
        self
    }

    fn print(mut self, expression: &str, printed: &str) -> Self {
        self.prints
            .insert(expression.to_string(), printed.to_string());
        self
    }

    fn fail_when(mut self, needle: &str, error: OracleError) -> Self {
        self.fail_matching = Some((needle.to_string(), error));
        self
    }
}

impl TypeOracle for MockOracle {
    fn check_condition(
        &self,
        check_text: &str,
        extends_text: &str,
        _infer_names: &[String],
        _context_source: &str,
    ) -> Result<ConditionVerdict, OracleError> {
        if let Some((needle, error)) = &self.fail_matching {
            if check_text.contains(needle.as_str()) || extends_text.contains(needle.as_str()) {
                return Err(error.clone());
            }
        }
        if let Some(verdict) = self
            .conditions
            .get(&(check_text.to_string(), extends_text.to_string()))
        {
            return Ok(verdict.clone());
        }
        Ok(if check_text == extends_text {
            ConditionVerdict::yes()
        } else {
            ConditionVerdict::no()
        })
    }

    fn print_type(
        &self,
        expression_text: &str,
        _context_source: &str,
    ) -> Result<String, OracleError> {
        if let Some((needle, error)) = &self.fail_matching {
            if expression_text.contains(needle.as_str()) {
                return Err(error.clone());
            }
        }
        Ok(self
            .prints
            .get(expression_text)
            .cloned()
            .unwrap_or_else(|| expression_text.to_string()))
    }
}

fn request(expression: &str, declarations: &str) -> ResolveRequest {
    ResolveRequest {
        type_expression_text: expression.to_string(),
        auxiliary_declarations_text: if declarations.is_empty() {
            None
        } else {
            Some(declarations.to_string())
        },
    }
}

fn count_kind(steps: &[typetrace_engine::TraceStep], kind: StepKind) -> usize {
    steps.iter().filter(|step| step.kind == kind).count()
}

#[test]
fn distributive_conditional_over_two_member_union() {
    let oracle = MockOracle::new();
    let result = resolve(
        &request(
            r#"Test<"a" | "b">"#,
            r#"type Test<T> = T extends "a" ? 1 : 2;"#,
        ),
        &oracle,
    )
    .unwrap();

    assert_eq!(result.final_type_text, "1 | 2");
    // One branch sequence per member: a true branch for "a", a false one for "b".
    assert_eq!(count_kind(&result.steps, StepKind::BranchTrue), 1);
    assert_eq!(count_kind(&result.steps, StepKind::BranchFalse), 1);
    assert_eq!(count_kind(&result.steps, StepKind::Condition), 1);

    // Both branch sequences precede the combining step, which carries the
    // deduplicated union.
    let combining = result
        .steps
        .iter()
        .filter(|step| step.kind == StepKind::ConditionalEvaluation)
        .next_back()
        .unwrap();
    assert_eq!(combining.result_text.as_deref(), Some("1 | 2"));
    let last_branch = result
        .steps
        .iter()
        .filter(|step| {
            step.kind == StepKind::BranchTrue || step.kind == StepKind::BranchFalse
        })
        .next_back()
        .unwrap();
    assert!(last_branch.id < combining.id);
}

#[test]
fn distribution_deduplicates_structurally_identical_results() {
    let oracle = MockOracle::new();
    let result = resolve(
        &request(
            r#"Test<"a" | "b" | "c">"#,
            r#"type Test<T> = T extends "a" ? 0 : 9;"#,
        ),
        &oracle,
    )
    .unwrap();
    // "b" and "c" both resolve to 9; the combined union keeps one.
    assert_eq!(result.final_type_text, "0 | 9");
}

#[test]
fn non_distributing_conditional_emits_exactly_one_branch() {
    let oracle = MockOracle::new();
    let result = resolve(&request(r#""a" extends "a" ? 1 : 2"#, ""), &oracle).unwrap();

    assert_eq!(result.final_type_text, "1");
    assert_eq!(count_kind(&result.steps, StepKind::BranchTrue), 1);
    assert_eq!(count_kind(&result.steps, StepKind::BranchFalse), 0);
}

#[test]
fn compound_check_side_resolves_before_the_condition() {
    let oracle = MockOracle::new();
    let result = resolve(
        &request(
            r#"Test<"a"> extends 1 ? "t" : "f""#,
            r#"type Test<T> = T extends "a" ? 1 : 2;"#,
        ),
        &oracle,
    )
    .unwrap();

    assert_eq!(result.final_type_text, r#""t""#);
    let left = result
        .steps
        .iter()
        .find(|step| step.kind == StepKind::ConditionalEvaluateLeft)
        .unwrap();
    assert_eq!(left.expression_text, r#"Test<"a">"#);
    // The nested generic's steps hang off the evaluate-left step.
    let call = result
        .steps
        .iter()
        .find(|step| step.kind == StepKind::GenericCall)
        .unwrap();
    assert_eq!(call.parent_id, Some(left.id));
    // The grounded check feeds the outer condition text; the nested
    // conditional inside the generic emits its own condition deeper.
    let condition = result
        .steps
        .iter()
        .find(|step| step.kind == StepKind::Condition && step.depth == 0)
        .unwrap();
    assert_eq!(condition.expression_text, "1 extends 1");
}

#[test]
fn compound_extends_side_resolves_before_the_condition() {
    let oracle = MockOracle::new();
    let result = resolve(
        &request(
            r#"1 extends Test<"a"> ? "t" : "f""#,
            r#"type Test<T> = T extends "a" ? 1 : 2;"#,
        ),
        &oracle,
    )
    .unwrap();

    assert_eq!(result.final_type_text, r#""t""#);
    let right = result
        .steps
        .iter()
        .find(|step| step.kind == StepKind::ConditionalEvaluateRight)
        .unwrap();
    assert_eq!(right.expression_text, r#"Test<"a">"#);
    let call = result
        .steps
        .iter()
        .find(|step| step.kind == StepKind::GenericCall)
        .unwrap();
    assert_eq!(call.parent_id, Some(right.id));
}

#[test]
fn wrapped_check_type_does_not_distribute() {
    let oracle = MockOracle::new()
        .condition(r#"["a" | "b"]"#, r#"["a"]"#, ConditionVerdict::no());
    let result = resolve(
        &request(
            r#"Test<"a" | "b">"#,
            r#"type Test<T> = [T] extends ["a"] ? 1 : 2;"#,
        ),
        &oracle,
    )
    .unwrap();

    // The tuple wrapper makes the union opaque: a single evaluation.
    assert_eq!(result.final_type_text, "2");
    assert_eq!(count_kind(&result.steps, StepKind::BranchFalse), 1);
    assert_eq!(count_kind(&result.steps, StepKind::BranchTrue), 0);
}

#[test]
fn template_literal_expands_cartesian_product_rightmost_fastest() {
    let oracle = MockOracle::new();
    let result = resolve(&request(r#"`${"a" | "b"}-${1 | 2}`"#, ""), &oracle).unwrap();

    assert_eq!(
        result.final_type_text,
        r#""a-1" | "a-2" | "b-1" | "b-2""#
    );
    let members: Vec<&str> = result
        .steps
        .iter()
        .filter(|step| step.kind == StepKind::TemplateLiteral)
        .filter_map(|step| step.result_text.as_deref())
        .collect();
    // Four member steps in generation order, then the combining union step.
    assert_eq!(
        members,
        vec![
            r#""a-1""#,
            r#""a-2""#,
            r#""b-1""#,
            r#""b-2""#,
            r#""a-1" | "a-2" | "b-1" | "b-2""#,
        ]
    );
}

#[test]
fn template_literal_with_singleton_hole_produces_one_member() {
    let oracle = MockOracle::new();
    let result = resolve(&request(r#"`prefix_${"value"}`"#, ""), &oracle).unwrap();

    assert_eq!(result.final_type_text, r#""prefix_value""#);
    // Exactly one literal-member step plus the combining step.
    assert_eq!(count_kind(&result.steps, StepKind::TemplateLiteral), 2);
}

#[test]
fn template_literal_non_literal_hole_falls_back_to_printed_form() {
    let oracle = MockOracle::new();
    let result = resolve(&request(r#"`id-${string}`"#, ""), &oracle).unwrap();
    assert_eq!(result.final_type_text, "`id-${string}`");
}

#[test]
fn mapped_type_iterates_each_key_in_union_order() {
    let oracle = MockOracle::new();
    let result = resolve(&request(r#"{ [K in "a" | "b"]: K }"#, ""), &oracle).unwrap();

    assert_eq!(result.final_type_text, r#"{ a: "a"; b: "b" }"#);
    let iterations: Vec<&str> = result
        .steps
        .iter()
        .filter(|step| step.kind == StepKind::MapIteration)
        .map(|step| step.expression_text.as_str())
        .collect();
    assert_eq!(iterations, vec![r#""a""#, r#""b""#]);
    assert_eq!(count_kind(&result.steps, StepKind::MapIterationResult), 2);

    // The result step comes after every iteration pair.
    let result_step = result
        .steps
        .iter()
        .find(|step| step.kind == StepKind::MappedTypeResult)
        .unwrap();
    assert_eq!(result_step.id, result.steps.last().unwrap().id);
}

#[test]
fn mapped_type_resolves_constrained_key_source_first() {
    let oracle = MockOracle::new();
    let result = resolve(
        &request(
            r#"{ [K in Keys]: boolean }"#,
            r#"type Keys = "x" | "y";"#,
        ),
        &oracle,
    )
    .unwrap();

    assert_eq!(result.final_type_text, "{ x: boolean; y: boolean }");
    assert_eq!(count_kind(&result.steps, StepKind::MappedTypeConstraint), 1);
    let constraint_result = result
        .steps
        .iter()
        .find(|step| step.kind == StepKind::MappedTypeConstraintResult)
        .unwrap();
    assert_eq!(
        constraint_result.result_text.as_deref(),
        Some(r#""x" | "y""#)
    );
}

#[test]
fn mapped_type_applies_readonly_and_optional_modifiers() {
    let oracle = MockOracle::new();
    let result = resolve(
        &request(r#"{ readonly [K in "a"]?: 1 }"#, ""),
        &oracle,
    )
    .unwrap();
    assert_eq!(result.final_type_text, "{ readonly a?: 1 }");
}

#[test]
fn indexed_access_defers_to_the_oracle() {
    let oracle = MockOracle::new().print(r#"Config["port"]"#, "8080");
    let result = resolve(
        &request(r#"Config["port"]"#, "type Config = { port: 8080 };"),
        &oracle,
    )
    .unwrap();

    assert_eq!(result.final_type_text, "8080");
    let access = result
        .steps
        .iter()
        .find(|step| step.kind == StepKind::IndexedAccess)
        .unwrap();
    let access_result = result
        .steps
        .iter()
        .find(|step| step.kind == StepKind::IndexedAccessResult)
        .unwrap();
    assert!(access.id < access_result.id);
    assert_eq!(access_result.parent_id, Some(access.id));
}

#[test]
fn infer_bindings_flow_into_the_true_branch() {
    let oracle = MockOracle::new().condition(
        r#"[1, "x"]"#,
        "[infer A, infer B]",
        ConditionVerdict {
            satisfied: true,
            bindings: vec![
                ("A".to_string(), "1".to_string()),
                ("B".to_string(), r#""x""#.to_string()),
            ],
        },
    );
    let result = resolve(
        &request(r#"[1, "x"] extends [infer A, infer B] ? B : never"#, ""),
        &oracle,
    )
    .unwrap();

    assert_eq!(result.final_type_text, r#""x""#);
    // Reading B from scope shows up as an alias_reference step.
    let reference = result
        .steps
        .iter()
        .find(|step| step.kind == StepKind::AliasReference)
        .unwrap();
    assert_eq!(reference.expression_text, "B");
    assert_eq!(reference.result_text.as_deref(), Some(r#""x""#));
}

#[test]
fn plain_union_target_emits_member_and_combining_steps() {
    let oracle = MockOracle::new();
    let result = resolve(&request(r#""a" | "b""#, ""), &oracle).unwrap();

    assert_eq!(result.final_type_text, r#""a" | "b""#);
    // One step per member plus the combining step.
    assert_eq!(count_kind(&result.steps, StepKind::Substitution), 3);
}

#[test]
fn zero_parameter_alias_resolves_through_start_and_result_steps() {
    let oracle = MockOracle::new();
    let result = resolve(
        &request("Answer", "type Answer = 42;"),
        &oracle,
    )
    .unwrap();

    assert_eq!(result.final_type_text, "42");
    assert_eq!(count_kind(&result.steps, StepKind::TypeAliasStart), 1);
    let alias_result = result
        .steps
        .iter()
        .find(|step| step.kind == StepKind::TypeAliasResult)
        .unwrap();
    assert_eq!(alias_result.result_text.as_deref(), Some("42"));
}

#[test]
fn generic_call_emits_definition_and_substitution_steps() {
    let oracle = MockOracle::new();
    let result = resolve(
        &request(r#"Box<"x">"#, "type Box<T> = [T];"),
        &oracle,
    )
    .unwrap();

    assert_eq!(result.final_type_text, r#"["x"]"#);
    let kinds: Vec<StepKind> = result.steps.iter().map(|step| step.kind).collect();
    assert_eq!(
        kinds,
        vec![
            StepKind::GenericCall,
            StepKind::GenericDef,
            StepKind::Substitution,
            StepKind::AliasReference,
            StepKind::GenericResult,
        ]
    );
}

#[test]
fn arity_mismatch_fails_fast() {
    let oracle = MockOracle::new();
    let err = resolve(
        &request("Test<1, 2>", "type Test<T> = T;"),
        &oracle,
    )
    .unwrap_err();
    let EngineError::Arity {
        name,
        expected,
        supplied,
    } = err
    else {
        panic!("expected arity error, got {err:?}");
    };
    assert_eq!(name, "Test");
    assert_eq!(expected, 1);
    assert_eq!(supplied, 2);

    // Missing arguments fail the same way.
    let err = resolve(&request("Test", "type Test<T> = T;"), &oracle).unwrap_err();
    assert!(matches!(err, EngineError::Arity { supplied: 0, .. }));
}

#[test]
fn truncated_declaration_is_a_parse_error_with_no_trace() {
    let oracle = MockOracle::new();
    let err = resolve(&request("Test<1>", "type Test<S> = "), &oracle).unwrap_err();
    assert!(matches!(err, EngineError::Parse(_)));
}

#[test]
fn oracle_timeout_returns_retryable_error_with_partial_trace() {
    let oracle = MockOracle::new().fail_when(r#""b""#, OracleError::Timeout);
    let err = resolve(
        &request(
            r#"Test<"a" | "b">"#,
            r#"type Test<T> = T extends "a" ? 1 : 2;"#,
        ),
        &oracle,
    )
    .unwrap_err();

    let EngineError::Resolution(resolution) = err else {
        panic!("expected resolution error, got {err:?}");
    };
    assert!(resolution.retryable);
    assert!(!resolution.cancelled);
    // The "a" member's branch sequence was already traced.
    assert!(
        resolution
            .partial_steps
            .iter()
            .any(|step| step.kind == StepKind::BranchTrue)
    );
}

#[test]
fn cancelled_request_aborts_with_partial_trace() {
    let oracle = MockOracle::new();
    let options = ResolveOptions::default();
    options.cancel.cancel();
    let err = resolve_with_options(
        &request(r#"Test<"a">"#, r#"type Test<T> = T extends "a" ? 1 : 2;"#),
        &oracle,
        &options,
    )
    .unwrap_err();

    let EngineError::Resolution(resolution) = err else {
        panic!("expected resolution error, got {err:?}");
    };
    assert!(resolution.cancelled);
    assert!(!resolution.retryable);
    assert!(resolution.partial_steps.is_empty());
}

#[test]
fn cancellation_mid_walk_keeps_steps_emitted_so_far() {
    struct CancellingOracle {
        token: CancelToken,
    }
    impl TypeOracle for CancellingOracle {
        fn check_condition(
            &self,
            check_text: &str,
            extends_text: &str,
            _infer_names: &[String],
            _context_source: &str,
        ) -> Result<ConditionVerdict, OracleError> {
            // Cancel as soon as the first check is answered.
            self.token.cancel();
            Ok(if check_text == extends_text {
                ConditionVerdict::yes()
            } else {
                ConditionVerdict::no()
            })
        }
        fn print_type(
            &self,
            expression_text: &str,
            _context_source: &str,
        ) -> Result<String, OracleError> {
            Ok(expression_text.to_string())
        }
    }

    let options = ResolveOptions::default();
    let oracle = CancellingOracle {
        token: options.cancel.clone(),
    };
    let err = resolve_with_options(
        &request(r#"Test<"a">"#, r#"type Test<T> = T extends "a" ? 1 : 2;"#),
        &oracle,
        &options,
    )
    .unwrap_err();

    let EngineError::Resolution(resolution) = err else {
        panic!("expected resolution error, got {err:?}");
    };
    assert!(resolution.cancelled);
    assert!(!resolution.partial_steps.is_empty());
}

#[test]
fn identical_input_yields_byte_identical_step_sequences() {
    let oracle = MockOracle::new();
    let req = request(
        r#"Wrap<Test<"a" | "b">>"#,
        r#"type Test<T> = T extends "a" ? `is_${T}` : never;
type Wrap<V> = { [K in V]: K };"#,
    );
    let first = resolve(&req, &oracle).unwrap();
    let second = resolve(&req, &oracle).unwrap();
    assert_eq!(
        serde_json::to_string(&first.steps).unwrap(),
        serde_json::to_string(&second.steps).unwrap()
    );
    assert_eq!(first.final_type_text, second.final_type_text);
}

#[test]
fn parent_steps_are_emitted_before_their_children() {
    let oracle = MockOracle::new();
    let result = resolve(
        &request(
            r#"Test<"a" | "b">"#,
            r#"type Test<T> = T extends "a" ? 1 : 2;"#,
        ),
        &oracle,
    )
    .unwrap();

    for (index, step) in result.steps.iter().enumerate() {
        assert_eq!(step.id as usize, index, "ids are dense and zero-based");
        if let Some(parent) = step.parent_id {
            assert!(parent < step.id, "parent must precede child");
        }
    }
}

#[test]
fn step_json_uses_the_fixed_kind_tags() {
    let oracle = MockOracle::new();
    let result = resolve(
        &request(
            r#"Test<"a">"#,
            r#"type Test<T> = T extends "a" ? 1 : 2;"#,
        ),
        &oracle,
    )
    .unwrap();
    let json = serde_json::to_string(&result.steps).unwrap();
    assert!(json.contains(r#""kind":"generic_call""#));
    assert!(json.contains(r#""kind":"condition""#));
    assert!(json.contains(r#""kind":"branch_true""#));
    assert!(json.contains(r#""kind":"generic_result""#));
}
