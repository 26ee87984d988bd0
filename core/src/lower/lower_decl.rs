//! file: core/src/lower/lower_decl.rs
//! description: top-level and local declaration lowering.
//!
//! A function declaration becomes `var name = function (params) { body }`.
//! Every other declaration kind is recognized but not lowered: it produces an
//! empty statement and a known-gap diagnostic so the run reports itself as
//! incomplete.

use log::debug;

use crate::ir::{FunctionDecl, IrNode, IrNodeKind};
use crate::js::{JsBlock, JsExpression, JsFunction, JsStatement};

use super::err::{LowerResult, LoweringError, Position};
use super::function_builder::FunctionBuilder;
use super::lower_expr::lower_expression;
use super::lower_stmt::lower_statement;
use super::lowering_context::LoweringContext;

pub fn lower_declaration(decl: &IrNode, ctx: &mut LoweringContext) -> LowerResult<JsStatement> {
    match decl.get_kind() {
        IrNodeKind::Function(function) => {
            let name = match ctx.function_name(decl) {
                Some(name) => name,
                None => ctx.declare_function_name(decl, function),
            };
            debug!("lowering function {} as {}", function.name, name);
            let value = lower_function(function, ctx)?;
            Ok(JsStatement::var(name, Some(JsExpression::Function(value))))
        }
        IrNodeKind::Declaration { .. } => Ok(placeholder(decl, ctx)),

        IrNodeKind::Variable { .. }
        | IrNodeKind::BlockBody { .. }
        | IrNodeKind::ExpressionBody { .. }
        | IrNodeKind::Block { .. }
        | IrNodeKind::Composite { .. }
        | IrNodeKind::When { .. }
        | IrNodeKind::WhileLoop { .. }
        | IrNodeKind::DoWhileLoop { .. }
        | IrNodeKind::TryCatch { .. }
        | IrNodeKind::Break { .. }
        | IrNodeKind::Continue { .. }
        | IrNodeKind::Return { .. }
        | IrNodeKind::Throw { .. }
        | IrNodeKind::Const { .. }
        | IrNodeKind::Vararg { .. }
        | IrNodeKind::Spread { .. }
        | IrNodeKind::GetObjectValue { .. }
        | IrNodeKind::GetEnumValue { .. }
        | IrNodeKind::GetVariable { .. }
        | IrNodeKind::SetVariable { .. }
        | IrNodeKind::GetExtensionReceiver
        | IrNodeKind::Call(_)
        | IrNodeKind::TypeOperator { .. } => Err(LoweringError::unsupported(decl, Position::Declaration)),
    }
}

/// Empty statement standing in for a declaration kind with no lowering.
pub fn placeholder(decl: &IrNode, ctx: &mut LoweringContext) -> JsStatement {
    if let IrNodeKind::Declaration { kind, name } = decl.get_kind() {
        ctx.report_gap(decl, format!("{} `{}` is not lowered; emitted an empty placeholder", kind.describe(), name));
    }
    JsStatement::Empty
}

/// Builds the function value in a child of the current scope. Parameters are
/// bound in declaration order, then the receiver parameter last when the
/// function has an extension receiver.
pub fn lower_function(function: &FunctionDecl, ctx: &mut LoweringContext) -> LowerResult<JsFunction> {
    let parent = ctx.current_scope();
    let mut builder = FunctionBuilder::new(&function.name, &mut ctx.scopes, parent);
    for parameter in &function.value_parameters {
        builder.add_parameter(&mut ctx.scopes, parameter);
    }
    if function.has_extension_receiver {
        let receiver = ctx.options.receiver_name.clone();
        builder.add_parameter(&mut ctx.scopes, &receiver);
    }

    let (builder, body) = ctx.with_function(builder, |ctx| match function.body.as_deref() {
        Some(body) => lower_body(body, ctx),
        None => Ok(JsBlock::default()),
    });
    let body = body?;
    debug!(
        "{}: {} parameters, {} body statements",
        builder.name(),
        builder.parameter_count(),
        body.statements.len()
    );
    Ok(builder.finish(body))
}

fn lower_body(body: &IrNode, ctx: &mut LoweringContext) -> LowerResult<JsBlock> {
    match body.get_kind() {
        IrNodeKind::BlockBody { statements } => {
            let lowered = statements
                .iter()
                .map(|s| lower_statement(s, ctx))
                .collect::<LowerResult<Vec<_>>>()?;
            Ok(JsBlock::new(lowered))
        }
        IrNodeKind::ExpressionBody { expression } => {
            let value = lower_expression(expression, ctx)?;
            Ok(JsBlock::new(vec![JsStatement::Return { value: Some(value) }]))
        }
        _ => Err(LoweringError::unsupported(body, Position::Body)),
    }
}
