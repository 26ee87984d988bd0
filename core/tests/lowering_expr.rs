mod common;

use std::rc::Rc;

use common::*;
use ir2js_core::ir::{CallExpr, IrConst, IrNodeKind, TypeOperator};
use ir2js_core::js::{BinaryOperator, JsExpression, JsLiteral, JsNumber, JsStatement, PrefixOperator};
use ir2js_core::lower::{LongConstantPolicy, LoweringContext, LoweringErrorKind, LoweringOptions, lower_expression};

fn js_double(value: f64) -> JsExpression {
    JsExpression::literal(JsLiteral::Number(JsNumber::Double(value)))
}

fn vararg(elements: Vec<ir2js_core::IrNode>) -> ir2js_core::IrNode {
    node(IrNodeKind::Vararg { elements })
}

fn spread(name: &str) -> ir2js_core::IrNode {
    node(IrNodeKind::Spread { expression: Box::new(get(name)) })
}

fn type_op(operator: TypeOperator, argument: ir2js_core::IrNode, type_operand: &str) -> ir2js_core::IrNode {
    node(IrNodeKind::TypeOperator { operator, argument: Box::new(argument), type_operand: type_operand.to_string() })
}

fn runtime(namespace: &str, helper: &str) -> JsExpression {
    JsExpression::invoke(JsExpression::qualified(helper, js_name(namespace)), vec![])
}

#[test]
fn constants_lower_to_matching_literals() {
    assert_eq!(lower_expr(int(42)), js_int(42));
    assert_eq!(lower_expr(constant(IrConst::Char('a'))), js_int(97));
    assert_eq!(lower_expr(constant(IrConst::Byte(-3))), js_int(-3));
    assert_eq!(lower_expr(constant(IrConst::Short(300))), js_int(300));
    assert_eq!(lower_expr(constant(IrConst::Float(1.5))), js_double(1.5));
    assert_eq!(lower_expr(constant(IrConst::Double(-0.25))), js_double(-0.25));
    assert_eq!(lower_expr(constant(IrConst::Long(7))), js_double(7.0));
    assert_eq!(lower_expr(constant(IrConst::Boolean(true))), JsExpression::literal(JsLiteral::Bool(true)));
    assert_eq!(lower_expr(constant(IrConst::Null)), JsExpression::null());
    assert_eq!(
        lower_expr(string("hi")),
        JsExpression::literal(JsLiteral::String(Rc::from("hi")))
    );
}

#[test]
fn repeated_string_constants_share_one_allocation() {
    let lowered = lower(vec![func(
        "f",
        &[],
        vec![local("a", Some(string("same"))), local("b", Some(string("same")))],
    )]);
    let body = &function_at(&lowered, 0).body.statements;
    let literal = |stmt: &JsStatement| match stmt {
        JsStatement::Vars { vars } => match &vars[0].initializer {
            Some(JsExpression::Literal { value: JsLiteral::String(s) }) => Rc::clone(s),
            other => panic!("expected a string literal, got {:?}", other),
        },
        other => panic!("expected a var, got {:?}", other),
    };
    assert!(Rc::ptr_eq(&literal(&body[0]), &literal(&body[1])));
}

#[test]
fn long_constants_within_double_precision_are_exact() {
    let lowered = lower(vec![expr_func("f", &[], constant(IrConst::Long(1 << 53)))]);
    assert_eq!(returned(function_at(&lowered, 0)), &js_double(9007199254740992.0));
    assert!(lowered.is_complete());
}

#[test]
fn long_constants_beyond_double_precision_are_reported_when_lossy() {
    let lowered = lower(vec![expr_func("f", &[], constant(IrConst::Long((1 << 53) + 1)))]);
    assert!(!lowered.is_complete());
    assert_eq!(lowered.gaps().count(), 1);
    assert_eq!(lowered.diagnostics[0].node_kind(), "Const");
}

#[test]
fn long_constants_beyond_double_precision_fail_when_strict() {
    let options = LoweringOptions { long_constants: LongConstantPolicy::Strict, ..LoweringOptions::default() };
    let mut module = module_of(vec![expr_func("f", &[], constant(IrConst::Long(i64::MIN)))]);
    let err = ir2js_core::lower_module(&mut module, options).unwrap_err();
    assert_eq!(err.kind(), LoweringErrorKind::UnsupportedConstruct);
    assert_eq!(err.node_kind(), "Const");
}

#[test]
fn when_expression_with_else_lowers_to_ternary() {
    let expr = lower_expr_in(&["a"], when(vec![(get("a"), int(1))], Some(int(2))));
    assert_eq!(expr, JsExpression::conditional(js_name("a"), js_int(1), js_int(2)));
}

#[test]
fn when_expression_without_else_is_rejected() {
    let err = lower_err(vec![expr_func("f", &["a"], when(vec![(get("a"), int(1))], None))]);
    assert_eq!(err.kind(), LoweringErrorKind::InvariantViolation);
    assert_eq!(err.node_kind(), "When");
}

/// Evaluates a lowered conditional chain whose tests are parameters `c<i>`.
fn select(expr: &JsExpression, truth: &[bool]) -> i32 {
    match expr {
        JsExpression::Conditional { test, then_expr, else_expr } => {
            let index = match test.as_ref() {
                JsExpression::NameRef { name, qualifier: None } => name[1..].parse::<usize>().unwrap(),
                other => panic!("unexpected test {:?}", other),
            };
            if truth[index] { select(then_expr, truth) } else { select(else_expr, truth) }
        }
        JsExpression::Literal { value: JsLiteral::Number(JsNumber::Int(v)) } => *v,
        other => panic!("unexpected node {:?}", other),
    }
}

#[test]
fn when_expression_selects_first_true_branch_for_every_assignment() {
    for n in 1..=4usize {
        let names: Vec<String> = (0..n).map(|i| format!("c{}", i)).collect();
        let params: Vec<&str> = names.iter().map(String::as_str).collect();
        let branches = (0..n).map(|i| (get(&names[i]), int(i as i32))).collect();
        let expr = lower_expr_in(&params, when(branches, Some(int(99))));

        for bits in 0..(1u32 << n) {
            let truth: Vec<bool> = (0..n).map(|i| bits & (1 << i) != 0).collect();
            let expected = truth.iter().position(|t| *t).map(|i| i as i32).unwrap_or(99);
            assert_eq!(select(&expr, &truth), expected, "n = {}, truth = {:?}", n, truth);
        }
    }
}

#[test]
fn sequence_literal_without_spread_is_an_array() {
    let expr = lower_expr(vararg(vec![int(1), int(2), int(3)]));
    assert_eq!(expr, JsExpression::ArrayLiteral { elements: vec![js_int(1), js_int(2), js_int(3)] });
}

#[test]
fn sequence_literal_with_spread_concatenates_chunks() {
    let expr = lower_expr_in(&["xs"], vararg(vec![int(1), spread("xs"), int(2)]));
    let empty = JsExpression::ArrayLiteral { elements: vec![] };
    assert_eq!(
        expr,
        JsExpression::invoke(
            JsExpression::qualified("concat", empty),
            vec![
                JsExpression::ArrayLiteral { elements: vec![js_int(1)] },
                js_name("xs"),
                JsExpression::ArrayLiteral { elements: vec![js_int(2)] },
            ],
        )
    );
}

/// Flattens `[].concat(parts...)` the way the target runtime would, with
/// `xs` bound to `[7, 8]`.
fn flatten(expr: &JsExpression) -> Vec<i32> {
    let element = |e: &JsExpression| match e {
        JsExpression::Literal { value: JsLiteral::Number(JsNumber::Int(v)) } => *v,
        other => panic!("unexpected element {:?}", other),
    };
    match expr {
        JsExpression::ArrayLiteral { elements } => elements.iter().map(element).collect(),
        JsExpression::NameRef { name, qualifier: None } if name == "xs" => vec![7, 8],
        JsExpression::Invocation { arguments, .. } => arguments.iter().flat_map(flatten).collect(),
        other => panic!("unexpected node {:?}", other),
    }
}

#[test]
fn spread_concatenation_preserves_element_order() {
    let expr = lower_expr_in(&["xs"], vararg(vec![spread("xs"), int(1), int(2), spread("xs"), int(3)]));
    assert_eq!(flatten(&expr), vec![7, 8, 1, 2, 7, 8, 3]);
    match &expr {
        JsExpression::Invocation { arguments, .. } => assert_eq!(arguments.len(), 4),
        other => panic!("expected concat, got {:?}", other),
    }
}

#[test]
fn instance_checks_lower_to_instanceof_and_its_negation() {
    let is = lower_expr_in(&["x"], type_op(TypeOperator::InstanceOf, get("x"), "T"));
    assert_eq!(is, JsExpression::instance_of(js_name("x"), js_name("T")));

    let is_not = lower_expr_in(&["x"], type_op(TypeOperator::NotInstanceOf, get("x"), "T"));
    assert_eq!(
        is_not,
        JsExpression::Prefix {
            op: PrefixOperator::Not,
            operand: Box::new(JsExpression::instance_of(js_name("x"), js_name("T"))),
        }
    );
}

#[test]
fn cast_of_reference_tests_then_yields_value() {
    let expr = lower_expr_in(&["x"], type_op(TypeOperator::Cast, get("x"), "pkg.Shape"));
    let shape = JsExpression::qualified("Shape", js_name("pkg"));
    assert_eq!(
        expr,
        JsExpression::conditional(
            JsExpression::instance_of(js_name("x"), shape),
            js_name("x"),
            runtime("kotlin", "throwCCE"),
        )
    );
}

#[test]
fn safe_cast_falls_back_to_null() {
    let expr = lower_expr_in(&["x"], type_op(TypeOperator::SafeCast, get("x"), "T"));
    assert_eq!(
        expr,
        JsExpression::conditional(
            JsExpression::instance_of(js_name("x"), js_name("T")),
            js_name("x"),
            JsExpression::null(),
        )
    );
}

#[test]
fn not_null_assertion_yields_value_unless_null() {
    let expr = lower_expr_in(&["x"], type_op(TypeOperator::ImplicitNotNull, get("x"), "T"));
    assert_eq!(
        expr,
        JsExpression::conditional(
            JsExpression::binary(BinaryOperator::Neq, js_name("x"), JsExpression::null()),
            js_name("x"),
            runtime("kotlin", "throwNPE"),
        )
    );
}

#[test]
fn cast_of_call_evaluates_it_once_through_a_temporary() {
    let lowered = lower(vec![expr_func(
        "f",
        &[],
        type_op(TypeOperator::ImplicitCast, call("g", &[], vec![]), "T"),
    )]);
    let function = function_at(&lowered, 0);
    match &function.body.statements[0] {
        JsStatement::Vars { vars } => {
            assert_eq!(vars.len(), 1);
            assert_eq!(vars[0].name, "tmp$");
            assert!(vars[0].initializer.is_none());
        }
        other => panic!("expected temporaries, got {:?}", other),
    }
    let g = JsExpression::invoke(js_name("g"), vec![]);
    assert_eq!(
        returned(function),
        &JsExpression::comma(
            JsExpression::assign(js_name("tmp$"), g),
            JsExpression::conditional(
                JsExpression::instance_of(js_name("tmp$"), js_name("T")),
                js_name("tmp$"),
                runtime("kotlin", "throwCCE"),
            ),
        )
    );
}

#[test]
fn runtime_namespace_is_configurable() {
    let options = LoweringOptions { runtime_namespace: "rt.core".to_string(), ..LoweringOptions::default() };
    let lowered = lower_with(
        vec![expr_func("f", &["x"], type_op(TypeOperator::Cast, get("x"), "T"))],
        options,
    );
    let expected = JsExpression::invoke(JsExpression::qualified("throwCCE", JsExpression::dotted("rt.core")), vec![]);
    match returned(function_at(&lowered, 0)) {
        JsExpression::Conditional { else_expr, .. } => assert_eq!(else_expr.as_ref(), &expected),
        other => panic!("expected a conditional, got {:?}", other),
    }
}

fn receiver_call(extension: bool, declared: usize, supplied: usize) -> ir2js_core::IrNode {
    let names: Vec<String> = (0..declared).map(|i| format!("p{}", i)).collect();
    let arguments = (0..supplied).map(|i| if i % 2 == 0 { Some(int(i as i32)) } else { None }).collect();
    node(IrNodeKind::Call(CallExpr {
        callee: "m".to_string(),
        target: None,
        dispatch_receiver: Some(Box::new(get("obj"))),
        extension_receiver: if extension { Some(Box::new(get("ext"))) } else { None },
        value_parameters: names,
        arguments,
    }))
}

#[test]
fn call_argument_count_matches_declared_parameters() {
    for declared in 0..4 {
        for supplied in 0..=declared {
            for extension in [false, true] {
                let expr = lower_expr(receiver_call(extension, declared, supplied));
                match expr {
                    JsExpression::Invocation { callee, arguments } => {
                        assert_eq!(*callee, JsExpression::qualified("m", js_name("obj")));
                        assert_eq!(arguments.len(), declared + usize::from(extension));
                        if extension {
                            assert_eq!(arguments[0], js_name("ext"));
                        }
                    }
                    other => panic!("expected an invocation, got {:?}", other),
                }
            }
        }
    }
}

#[test]
fn omitted_arguments_are_passed_as_void_zero() {
    let expr = lower_expr(call("g", &["a", "b", "c"], vec![Some(int(1)), None]));
    assert_eq!(
        expr,
        JsExpression::invoke(js_name("g"), vec![js_int(1), JsExpression::void_zero(), JsExpression::void_zero()])
    );
}

#[test]
fn too_many_arguments_is_an_invariant_violation() {
    let err = lower_err(vec![expr_func("f", &[], call("g", &["a"], vec![Some(int(1)), Some(int(2))]))]);
    assert_eq!(err.kind(), LoweringErrorKind::InvariantViolation);
    assert_eq!(err.node_kind(), "Call");
}

#[test]
fn receiver_read_resolves_to_receiver_parameter() {
    let lowered = lower(vec![ext_func("f", &[], vec![ret(Some(node(IrNodeKind::GetExtensionReceiver)))])]);
    assert_eq!(returned(function_at(&lowered, 0)), &js_name("$receiver"));
}

#[test]
fn receiver_read_without_receiver_is_rejected() {
    let err = lower_err(vec![expr_func("f", &[], node(IrNodeKind::GetExtensionReceiver))]);
    assert_eq!(err.kind(), LoweringErrorKind::InvariantViolation);
}

#[test]
fn singleton_references_are_placeholders_with_gaps() {
    let lowered = lower(vec![
        expr_func("f", &[], node(IrNodeKind::GetObjectValue { name: "Unit".to_string() })),
        expr_func(
            "g",
            &[],
            node(IrNodeKind::GetEnumValue { enum_name: "Color".to_string(), entry: "RED".to_string() }),
        ),
    ]);
    assert_eq!(returned(function_at(&lowered, 0)), &js_name("Unit"));
    assert_eq!(returned(function_at(&lowered, 1)), &JsExpression::qualified("RED", js_name("Color")));
    assert_eq!(lowered.gaps().count(), 2);
    assert!(!lowered.is_complete());
}

#[test]
fn variable_write_is_an_assignment_expression() {
    let expr = lower_expr_in(&["x"], set("x", int(5)));
    assert_eq!(expr, JsExpression::assign(js_name("x"), js_int(5)));
}

#[test]
fn unresolved_identifiers_reference_external_names() {
    assert_eq!(lower_expr(get("topLevelProperty")), js_name("topLevelProperty"));
}

#[test]
fn nested_block_expression_lowers_to_comma_sequence() {
    let expr = lower_expr_in(
        &["x"],
        call("h", &["v"], vec![Some(block(vec![call("g", &[], vec![]), get("x")]))]),
    );
    let sequence = JsExpression::comma(JsExpression::invoke(js_name("g"), vec![]), js_name("x"));
    assert_eq!(expr, JsExpression::invoke(js_name("h"), vec![sequence]));
}

#[test]
fn nested_block_expression_with_declaration_is_unsupported() {
    let err = lower_err(vec![expr_func(
        "f",
        &[],
        call("h", &["v"], vec![Some(block(vec![local("y", Some(int(1))), get("y")]))]),
    )]);
    assert_eq!(err.kind(), LoweringErrorKind::UnsupportedConstruct);
    assert_eq!(err.node_kind(), "Variable");
}

#[test]
fn statement_kind_in_expression_position_is_unsupported() {
    let err = lower_err(vec![expr_func("f", &[], node(IrNodeKind::Break { label: None }))]);
    assert_eq!(err.kind(), LoweringErrorKind::UnsupportedConstruct);
    assert_eq!(err.node_kind(), "Break");
    assert!(err.dump().contains("Break"));
}

#[test]
fn temporaries_need_an_enclosing_function() {
    let mut ctx = LoweringContext::new(LoweringOptions::default());
    let reference = type_op(TypeOperator::Cast, get("x"), "T");
    assert!(lower_expression(&reference, &mut ctx).is_ok());

    let impure = type_op(TypeOperator::Cast, call("g", &[], vec![]), "T");
    let err = lower_expression(&impure, &mut ctx).unwrap_err();
    assert_eq!(err.kind(), LoweringErrorKind::InvariantViolation);
    assert_eq!(err.node_kind(), "Call");
}
