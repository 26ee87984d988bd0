//! file: core/src/lower/lower_expr.rs
//! description: expression-position lowering.
//!
//! `lower_expression` turns one IR node into one target expression. It never
//! calls back into statement lowering: block expressions that survive
//! normalization must be made of expressions only.
//!
use log::trace;

use crate::ir::{CallExpr, IrConst, IrNode, IrNodeKind, TypeOperator};
use crate::js::{BinaryOperator, JsExpression, JsLiteral};

use super::err::{LowerResult, LoweringError, Position};
use super::lowering_context::LoweringContext;
use super::options::LongConstantPolicy;

/// Largest magnitude a double represents without gaps between integers.
const MAX_EXACT_LONG: u64 = 1 << 53;

pub fn lower_expression(node: &IrNode, ctx: &mut LoweringContext) -> LowerResult<JsExpression> {
    match node.get_kind() {
        IrNodeKind::Const { value } => lower_const(value, node, ctx).map(JsExpression::literal),
        IrNodeKind::Vararg { elements } => lower_vararg(elements, ctx),
        // Only the containing literal cares that this was a spread.
        IrNodeKind::Spread { expression } => lower_expression(expression, ctx),
        IrNodeKind::GetObjectValue { name } => {
            ctx.report_gap(node, format!("object `{}` is referenced by name only; singleton access is not lowered", name));
            Ok(JsExpression::name(ctx.resolve_or_external(name)))
        }
        IrNodeKind::GetEnumValue { enum_name, entry } => {
            ctx.report_gap(
                node,
                format!("enum entry `{}.{}` is referenced by name only; entry access is not lowered", enum_name, entry),
            );
            Ok(JsExpression::qualified(entry.as_str(), JsExpression::name(ctx.resolve_or_external(enum_name))))
        }
        IrNodeKind::GetVariable { name } => Ok(JsExpression::name(ctx.resolve_or_external(name))),
        IrNodeKind::SetVariable { name, value } => {
            let value = lower_expression(value, ctx)?;
            Ok(JsExpression::assign(JsExpression::name(ctx.resolve_or_external(name)), value))
        }
        IrNodeKind::GetExtensionReceiver => {
            let receiver = ctx.options.receiver_name.clone();
            match ctx.resolve(&receiver) {
                Some(name) => Ok(JsExpression::name(name)),
                None => Err(LoweringError::invariant(
                    node,
                    "extension receiver read outside of a function with an extension receiver",
                )),
            }
        }
        IrNodeKind::Call(call) => lower_call(call, node, ctx),
        IrNodeKind::TypeOperator { operator, argument, type_operand } => {
            lower_type_operator(*operator, argument, type_operand, ctx)
        }
        IrNodeKind::When { branches, else_branch } => {
            let Some(else_branch) = else_branch else {
                return Err(LoweringError::invariant(node, "`when` used as a value has no else branch"));
            };
            let mut lowered = Vec::with_capacity(branches.len());
            for branch in branches {
                let condition = lower_expression(&branch.condition, ctx)?;
                let result = lower_expression(&branch.result, ctx)?;
                lowered.push((condition, result));
            }
            let seed = lower_expression(else_branch, ctx)?;
            Ok(lowered
                .into_iter()
                .rev()
                .fold(seed, |acc, (condition, result)| JsExpression::conditional(condition, result, acc)))
        }
        IrNodeKind::Block { statements } => lower_block_value(statements, node, ctx),

        IrNodeKind::Function(_)
        | IrNodeKind::Variable { .. }
        | IrNodeKind::Declaration { .. }
        | IrNodeKind::BlockBody { .. }
        | IrNodeKind::ExpressionBody { .. }
        | IrNodeKind::Composite { .. }
        | IrNodeKind::WhileLoop { .. }
        | IrNodeKind::DoWhileLoop { .. }
        | IrNodeKind::TryCatch { .. }
        | IrNodeKind::Break { .. }
        | IrNodeKind::Continue { .. }
        | IrNodeKind::Return { .. }
        | IrNodeKind::Throw { .. } => Err(LoweringError::unsupported(node, Position::Expression)),
    }
}

/// Target literal for a constant. Integral kinds widen to numbers; `Long`
/// follows the configured policy because doubles are exact only up to 2^53.
pub fn lower_const(value: &IrConst, node: &IrNode, ctx: &mut LoweringContext) -> LowerResult<JsLiteral> {
    Ok(match value {
        IrConst::String(s) => ctx.literals.string(s),
        IrConst::Null => ctx.literals.null(),
        IrConst::Boolean(b) => ctx.literals.bool(*b),
        IrConst::Char(c) => ctx.literals.int(u32::from(*c) as i32),
        IrConst::Byte(v) => ctx.literals.int(i32::from(*v)),
        IrConst::Short(v) => ctx.literals.int(i32::from(*v)),
        IrConst::Int(v) => ctx.literals.int(*v),
        IrConst::Long(v) => {
            if v.unsigned_abs() > MAX_EXACT_LONG {
                match ctx.options.long_constants {
                    LongConstantPolicy::Lossy => ctx.report_gap(
                        node,
                        format!("long constant {} exceeds 2^53 and loses precision as a double", v),
                    ),
                    LongConstantPolicy::Strict => {
                        return Err(LoweringError::unsupported_because(
                            node,
                            format!("long constant {} is not exactly representable as a double", v),
                        ));
                    }
                }
            }
            ctx.literals.double(*v as f64)
        }
        IrConst::Float(v) => ctx.literals.double(f64::from(*v)),
        IrConst::Double(v) => ctx.literals.double(*v),
    })
}

/// Sequence literal. Without spreads this is a plain array literal. With
/// spreads, runs of plain elements are packed into array chunks and the
/// chunks and spread operands are concatenated in source order, so a plain
/// element that happens to be a sequence is never flattened.
fn lower_vararg(elements: &[IrNode], ctx: &mut LoweringContext) -> LowerResult<JsExpression> {
    let has_spread = elements.iter().any(|e| matches!(e.get_kind(), IrNodeKind::Spread { .. }));
    if !has_spread {
        let lowered = elements
            .iter()
            .map(|e| lower_expression(e, ctx))
            .collect::<LowerResult<Vec<_>>>()?;
        return Ok(JsExpression::ArrayLiteral { elements: lowered });
    }

    let mut parts = Vec::new();
    let mut chunk = Vec::new();
    for element in elements {
        let lowered = lower_expression(element, ctx)?;
        if matches!(element.get_kind(), IrNodeKind::Spread { .. }) {
            if !chunk.is_empty() {
                parts.push(JsExpression::ArrayLiteral { elements: std::mem::take(&mut chunk) });
            }
            parts.push(lowered);
        } else {
            chunk.push(lowered);
        }
    }
    if !chunk.is_empty() {
        parts.push(JsExpression::ArrayLiteral { elements: chunk });
    }
    trace!("spread literal lowered to concat of {} parts", parts.len());
    let concat = JsExpression::qualified("concat", JsExpression::ArrayLiteral { elements: Vec::new() });
    Ok(JsExpression::invoke(concat, parts))
}

/// Receivers are evaluated first, then the arguments in declared-parameter
/// order. The extension receiver becomes the leading positional argument and
/// every omitted argument is passed as `void 0`.
fn lower_call(call: &CallExpr, node: &IrNode, ctx: &mut LoweringContext) -> LowerResult<JsExpression> {
    if call.arguments.len() > call.value_parameters.len() {
        return Err(LoweringError::invariant(
            node,
            format!(
                "call to `{}` supplies {} arguments for {} declared parameters",
                call.callee,
                call.arguments.len(),
                call.value_parameters.len()
            ),
        ));
    }

    let dispatch = call.dispatch_receiver.as_deref().map(|r| lower_expression(r, ctx)).transpose()?;
    let extension = call.extension_receiver.as_deref().map(|r| lower_expression(r, ctx)).transpose()?;

    let callee = match dispatch {
        Some(receiver) => JsExpression::qualified(call.callee.as_str(), receiver),
        None => JsExpression::name(ctx.resolve_callee(&call.callee, call.target.as_deref())),
    };

    let mut arguments = Vec::with_capacity(call.value_parameters.len() + 1);
    arguments.extend(extension);
    for index in 0..call.value_parameters.len() {
        match call.arguments.get(index).and_then(Option::as_ref) {
            Some(argument) => arguments.push(lower_expression(argument, ctx)?),
            None => arguments.push(JsExpression::void_zero()),
        }
    }
    Ok(JsExpression::invoke(callee, arguments))
}

/// Every type operator is built on one `instanceof` test. Operators that
/// yield the tested value evaluate the operand once, through a temporary
/// when it is not a plain reference.
fn lower_type_operator(
    operator: TypeOperator,
    argument: &IrNode,
    type_operand: &str,
    ctx: &mut LoweringContext,
) -> LowerResult<JsExpression> {
    let value = lower_expression(argument, ctx)?;
    let type_ref = JsExpression::dotted(type_operand);

    match operator {
        TypeOperator::InstanceOf => Ok(JsExpression::instance_of(value, type_ref)),
        TypeOperator::NotInstanceOf => Ok(JsExpression::not(JsExpression::instance_of(value, type_ref))),
        TypeOperator::Cast | TypeOperator::ImplicitCast => {
            let failure = runtime_call(ctx, "throwCCE");
            guarded(ctx, argument, value, |v| JsExpression::instance_of(v, type_ref), failure)
        }
        TypeOperator::SafeCast => {
            guarded(ctx, argument, value, |v| JsExpression::instance_of(v, type_ref), JsExpression::null())
        }
        TypeOperator::ImplicitNotNull => {
            let failure = runtime_call(ctx, "throwNPE");
            guarded(
                ctx,
                argument,
                value,
                |v| JsExpression::binary(BinaryOperator::Neq, v, JsExpression::null()),
                failure,
            )
        }
    }
}

/// `test(v) ? v : fallback`, binding `v` to a temporary first if needed.
fn guarded(
    ctx: &mut LoweringContext,
    argument: &IrNode,
    value: JsExpression,
    test: impl FnOnce(JsExpression) -> JsExpression,
    fallback: JsExpression,
) -> LowerResult<JsExpression> {
    if value.is_pure_reference() {
        return Ok(JsExpression::conditional(test(value.clone()), value, fallback));
    }
    let tmp = ctx.declare_temporary(argument)?;
    let bind = JsExpression::assign(JsExpression::name(tmp.as_str()), value);
    let select = JsExpression::conditional(
        test(JsExpression::name(tmp.as_str())),
        JsExpression::name(tmp.as_str()),
        fallback,
    );
    Ok(JsExpression::comma(bind, select))
}

fn runtime_call(ctx: &LoweringContext, helper: &str) -> JsExpression {
    let namespace = JsExpression::dotted(&ctx.options.runtime_namespace);
    JsExpression::invoke(JsExpression::qualified(helper, namespace), Vec::new())
}

/// Block expression left in a nested expression position by the normalizer:
/// `(s1, s2, value)` when every member is itself an expression.
fn lower_block_value(statements: &[IrNode], node: &IrNode, ctx: &mut LoweringContext) -> LowerResult<JsExpression> {
    let Some((last, leading)) = statements.split_last() else {
        return Err(LoweringError::invariant(node, "empty block used as a value"));
    };
    let mut sequence: Option<JsExpression> = None;
    for member in leading.iter().chain(std::iter::once(last)) {
        if !member.get_kind().is_expression() {
            return Err(LoweringError::unsupported_because(
                member,
                format!("`{}` inside a block expression cannot be lowered in expression position", member.kind_name()),
            ));
        }
        let lowered = lower_expression(member, ctx)?;
        sequence = Some(match sequence {
            Some(prev) => JsExpression::comma(prev, lowered),
            None => lowered,
        });
    }
    sequence.ok_or_else(|| LoweringError::invariant(node, "empty block used as a value"))
}
