#![allow(dead_code)]

use ir2js_core::ir::{CallExpr, FunctionDecl, IrConst, IrFile, IrModule, IrNode, IrNodeKind, WhenBranch};
use ir2js_core::js::{JsExpression, JsFunction, JsLiteral, JsNumber, JsStatement};
use ir2js_core::lower::{LoweredModule, LoweringError, LoweringOptions, lower_module};

pub fn node(kind: IrNodeKind) -> IrNode {
    IrNode::new(kind)
}

pub fn int(value: i32) -> IrNode {
    node(IrNodeKind::Const { value: IrConst::Int(value) })
}

pub fn constant(value: IrConst) -> IrNode {
    node(IrNodeKind::Const { value })
}

pub fn string(value: &str) -> IrNode {
    constant(IrConst::String(value.to_string()))
}

pub fn get(name: &str) -> IrNode {
    node(IrNodeKind::GetVariable { name: name.to_string() })
}

pub fn set(name: &str, value: IrNode) -> IrNode {
    node(IrNodeKind::SetVariable { name: name.to_string(), value: Box::new(value) })
}

pub fn local(name: &str, initializer: Option<IrNode>) -> IrNode {
    node(IrNodeKind::Variable { name: name.to_string(), initializer: initializer.map(Box::new) })
}

pub fn block(statements: Vec<IrNode>) -> IrNode {
    node(IrNodeKind::Block { statements })
}

pub fn ret(value: Option<IrNode>) -> IrNode {
    node(IrNodeKind::Return { value: value.map(Box::new) })
}

pub fn when(branches: Vec<(IrNode, IrNode)>, else_branch: Option<IrNode>) -> IrNode {
    let branches = branches
        .into_iter()
        .map(|(condition, result)| WhenBranch { condition, result })
        .collect();
    node(IrNodeKind::When { branches, else_branch: else_branch.map(Box::new) })
}

pub fn call(callee: &str, parameters: &[&str], arguments: Vec<Option<IrNode>>) -> IrNode {
    node(IrNodeKind::Call(CallExpr {
        callee: callee.to_string(),
        target: None,
        dispatch_receiver: None,
        extension_receiver: None,
        value_parameters: parameters.iter().map(|p| p.to_string()).collect(),
        arguments,
    }))
}

fn function_node(name: &str, parameters: &[&str], extension: bool, body: Option<IrNode>) -> IrNode {
    node(IrNodeKind::Function(FunctionDecl {
        name: name.to_string(),
        value_parameters: parameters.iter().map(|p| p.to_string()).collect(),
        has_extension_receiver: extension,
        signature: None,
        body: body.map(Box::new),
    }))
}

/// `fun name(params) { statements }`
pub fn func(name: &str, parameters: &[&str], statements: Vec<IrNode>) -> IrNode {
    function_node(name, parameters, false, Some(node(IrNodeKind::BlockBody { statements })))
}

/// `fun Receiver.name(params) { statements }`
pub fn ext_func(name: &str, parameters: &[&str], statements: Vec<IrNode>) -> IrNode {
    function_node(name, parameters, true, Some(node(IrNodeKind::BlockBody { statements })))
}

/// `fun name(params) = expression`
pub fn expr_func(name: &str, parameters: &[&str], expression: IrNode) -> IrNode {
    function_node(name, parameters, false, Some(node(IrNodeKind::ExpressionBody { expression: Box::new(expression) })))
}

pub fn bodiless(name: &str, parameters: &[&str]) -> IrNode {
    function_node(name, parameters, false, None)
}

pub fn module_of(declarations: Vec<IrNode>) -> IrModule {
    IrModule::new("test", vec![IrFile::new("main.kt", declarations)])
}

pub fn lower(declarations: Vec<IrNode>) -> LoweredModule {
    lower_with(declarations, LoweringOptions::default())
}

pub fn lower_with(declarations: Vec<IrNode>, options: LoweringOptions) -> LoweredModule {
    let mut module = module_of(declarations);
    lower_module(&mut module, options).expect("lowering should succeed")
}

pub fn lower_err(declarations: Vec<IrNode>) -> LoweringError {
    let mut module = module_of(declarations);
    match lower_module(&mut module, LoweringOptions::default()) {
        Ok(lowered) => panic!("expected a lowering error, got {:#?}", lowered.program),
        Err(e) => e,
    }
}

/// Function value bound by the `index`-th top-level statement.
pub fn function_at(lowered: &LoweredModule, index: usize) -> &JsFunction {
    match &lowered.program.statements[index] {
        JsStatement::Vars { vars } => match &vars[0].initializer {
            Some(JsExpression::Function(function)) => function,
            other => panic!("expected a function value, got {:?}", other),
        },
        other => panic!("expected a var statement, got {:?}", other),
    }
}

/// Lowers `fun f(params) = expression` and returns the returned expression.
pub fn lower_expr_in(parameters: &[&str], expression: IrNode) -> JsExpression {
    let lowered = lower(vec![expr_func("f", parameters, expression)]);
    returned(function_at(&lowered, 0)).clone()
}

pub fn lower_expr(expression: IrNode) -> JsExpression {
    lower_expr_in(&[], expression)
}

/// Value of the last `return` in a function body.
pub fn returned(function: &JsFunction) -> &JsExpression {
    match function.body.statements.last() {
        Some(JsStatement::Return { value: Some(value) }) => value,
        other => panic!("expected a return with a value, got {:?}", other),
    }
}

pub fn js_name(name: &str) -> JsExpression {
    JsExpression::name(name)
}

pub fn js_int(value: i32) -> JsExpression {
    JsExpression::literal(JsLiteral::Number(JsNumber::Int(value)))
}
