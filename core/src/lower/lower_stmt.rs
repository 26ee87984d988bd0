//! file: core/src/lower/lower_stmt.rs
//! description: statement-position lowering.
//!
//! Every IR node in statement position produces exactly one target
//! statement, a block when several are needed. Expression kinds fall through
//! to `lower_expression` and are wrapped as expression statements.

use log::trace;

use crate::ir::{CatchClause, IrNode, IrNodeKind, WhenBranch};
use crate::js::{JsBlock, JsCatch, JsExpression, JsStatement};

use super::err::{LowerResult, LoweringError, Position};
use super::lower_decl::{lower_function, placeholder};
use super::lower_expr::lower_expression;
use super::lowering_context::LoweringContext;

pub fn lower_statement(node: &IrNode, ctx: &mut LoweringContext) -> LowerResult<JsStatement> {
    match node.get_kind() {
        IrNodeKind::Variable { name, initializer } => {
            // The initializer cannot see the variable it initializes.
            let value = initializer.as_deref().map(|init| lower_expression(init, ctx)).transpose()?;
            let target = ctx.declare_local(name);
            Ok(JsStatement::var(target, value))
        }
        IrNodeKind::Function(function) => {
            let target = ctx.declare_local_function(function);
            let value = lower_function(function, ctx)?;
            Ok(JsStatement::var(target, Some(JsExpression::Function(value))))
        }
        IrNodeKind::Declaration { .. } => Ok(placeholder(node, ctx)),
        IrNodeKind::Block { statements } | IrNodeKind::Composite { statements } => {
            Ok(JsStatement::Block(lower_statements(statements, ctx)?))
        }
        IrNodeKind::When { branches, else_branch } => lower_when(branches, else_branch.as_deref(), ctx),
        IrNodeKind::WhileLoop { label, condition, body } => {
            let condition = lower_expression(condition, ctx)?;
            let body = lower_loop_body(body.as_deref(), ctx)?;
            Ok(labeled(label.as_deref(), JsStatement::While { condition, body }))
        }
        IrNodeKind::DoWhileLoop { label, condition, body } => {
            let body = lower_loop_body(body.as_deref(), ctx)?;
            let condition = lower_expression(condition, ctx)?;
            Ok(labeled(label.as_deref(), JsStatement::DoWhile { condition, body }))
        }
        IrNodeKind::TryCatch { try_result, catches, finally } => {
            lower_try(node, try_result, catches, finally.as_deref(), ctx)
        }
        IrNodeKind::Break { label } => Ok(JsStatement::Break { label: label.clone() }),
        IrNodeKind::Continue { label } => Ok(JsStatement::Continue { label: label.clone() }),
        IrNodeKind::Return { value } => {
            let value = value.as_deref().map(|v| lower_expression(v, ctx)).transpose()?;
            Ok(JsStatement::Return { value })
        }
        IrNodeKind::Throw { value } => Ok(JsStatement::Throw { value: lower_expression(value, ctx)? }),

        IrNodeKind::Const { .. }
        | IrNodeKind::Vararg { .. }
        | IrNodeKind::GetObjectValue { .. }
        | IrNodeKind::GetEnumValue { .. }
        | IrNodeKind::GetVariable { .. }
        | IrNodeKind::SetVariable { .. }
        | IrNodeKind::GetExtensionReceiver
        | IrNodeKind::Call(_)
        | IrNodeKind::TypeOperator { .. } => Ok(JsStatement::expression(lower_expression(node, ctx)?)),

        IrNodeKind::BlockBody { .. } | IrNodeKind::ExpressionBody { .. } | IrNodeKind::Spread { .. } => {
            Err(LoweringError::unsupported(node, Position::Statement))
        }
    }
}

fn lower_statements(statements: &[IrNode], ctx: &mut LoweringContext) -> LowerResult<JsBlock> {
    let lowered = statements
        .iter()
        .map(|s| lower_statement(s, ctx))
        .collect::<LowerResult<Vec<_>>>()?;
    Ok(JsBlock::new(lowered))
}

/// `if (c1) r1 else if (c2) r2 ... else e`. Branches are lowered in source
/// order, then folded from the last one outward. Without an else the
/// innermost `if` has no alternative; with no branches either, the whole
/// construct is an empty statement.
fn lower_when(
    branches: &[WhenBranch],
    else_branch: Option<&IrNode>,
    ctx: &mut LoweringContext,
) -> LowerResult<JsStatement> {
    let mut lowered = Vec::with_capacity(branches.len());
    for branch in branches {
        let condition = lower_expression(&branch.condition, ctx)?;
        let result = lower_statement(&branch.result, ctx)?;
        lowered.push((condition, result));
    }
    let seed = else_branch.map(|e| lower_statement(e, ctx)).transpose()?;

    let chain = lowered.into_iter().rev().fold(seed, |acc, (condition, result)| {
        Some(JsStatement::If {
            condition,
            then_branch: Box::new(result),
            else_branch: acc.map(Box::new),
        })
    });
    Ok(chain.unwrap_or(JsStatement::Empty))
}

fn lower_loop_body(body: Option<&IrNode>, ctx: &mut LoweringContext) -> LowerResult<JsBlock> {
    match body {
        Some(body) => Ok(lower_statement(body, ctx)?.into_block()),
        None => Ok(JsBlock::default()),
    }
}

fn labeled(label: Option<&str>, statement: JsStatement) -> JsStatement {
    match label {
        Some(label) => JsStatement::Labeled { label: label.to_string(), body: Box::new(statement) },
        None => statement,
    }
}

fn lower_try(
    node: &IrNode,
    try_result: &IrNode,
    catches: &[CatchClause],
    finally: Option<&IrNode>,
    ctx: &mut LoweringContext,
) -> LowerResult<JsStatement> {
    if catches.is_empty() && finally.is_none() {
        return Err(LoweringError::invariant(node, "try without catch clauses or finally"));
    }

    let body = lower_statement(try_result, ctx)?.into_block();
    let mut lowered_catches = Vec::with_capacity(catches.len());
    for clause in catches {
        let guard = clause.exception_type.as_deref().filter(|_| ctx.options.flag_catch_guards);
        if let Some(exception_type) = guard {
            ctx.report_gap(
                &clause.result,
                format!(
                    "catch of `{}` accepts every exception; the type guard is not lowered",
                    exception_type
                ),
            );
        }
        let description = format!("catch {}", clause.parameter);
        let catch = ctx.with_block_scope(&description, |ctx, scope| {
            let parameter = ctx.scopes.declare_fresh_name(scope, &clause.parameter);
            trace!("catch parameter {} bound as {}", clause.parameter, parameter);
            let body = lower_statement(&clause.result, ctx)?.into_block();
            Ok(JsCatch { scope, parameter, body })
        })?;
        lowered_catches.push(catch);
    }
    let finally = finally.map(|f| lower_statement(f, ctx).map(JsStatement::into_block)).transpose()?;

    Ok(JsStatement::Try { body, catches: lowered_catches, finally })
}
