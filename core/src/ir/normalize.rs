//! file: core/src/ir/normalize.rs
//! description: block-expression normalizer run once before lowering.
//!
//! Rewrites every declaration body in place so expression-valued constructs
//! reach the lowering passes in one canonical shape:
//!
//! * composite and block-expression members of a statement list are spliced
//!   into the enclosing list (neither introduces a scope);
//! * a block expression holding a single expression collapses to it;
//! * a block expression used as a variable initializer, return value, throw
//!   value or statement-level assignment value has its leading statements
//!   hoisted in front of the enclosing statement;
//! * a `when`, `try` or block in one of those value positions whose arms only
//!   lower as statements is turned inside out: each arm assigns its result to
//!   the variable being initialized, or to a fresh local the consumer reads;
//! * an expression body whose value needs that treatment becomes a block body
//!   returning it.
//!
//! Children are rewritten before their parents, so one pass reaches the
//! fixed point and running it again changes nothing.

use log::trace;

use crate::lower::err::{LowerResult, LoweringError};

use super::kind::{DeclarationKind, IrNodeKind};
use super::module::IrModule;
use super::node::IrNode;

pub fn normalize_module(module: &mut IrModule) -> LowerResult<()> {
    let mut normalizer = Normalizer::default();
    for file in module.files.iter_mut() {
        for decl in file.declarations.iter_mut() {
            normalizer.declaration(decl)?;
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
struct Normalizer {
    /// Result locals introduced so far; numbers the next one.
    results: usize,
}

impl Normalizer {
    fn declaration(&mut self, decl: &mut IrNode) -> LowerResult<()> {
        if !decl.get_kind().is_declaration() {
            return Err(LoweringError::malformed(
                decl,
                format!("`{}` cannot appear at file level", decl.kind_name()),
            ));
        }
        self.node(decl)
    }

    fn body(&mut self, body: &mut IrNode) -> LowerResult<()> {
        match &mut body.kind {
            IrNodeKind::BlockBody { statements } => return self.statements(statements),
            IrNodeKind::ExpressionBody { expression } => {
                self.node(expression)?;
                if !needs_statement_form(expression) {
                    return Ok(());
                }
            }
            _ => {
                return Err(LoweringError::malformed(
                    body,
                    format!("function body must be a block or expression body, found `{}`", body.kind_name()),
                ));
            }
        }

        let kind = std::mem::replace(&mut body.kind, IrNodeKind::BlockBody { statements: Vec::new() });
        let IrNodeKind::ExpressionBody { expression } = kind else {
            return Ok(());
        };
        trace!("expression body of `{}` rewritten as a block body", expression.kind_name());
        let mut statements = vec![body.derived(IrNodeKind::Return { value: Some(expression) })];
        self.statements(&mut statements)?;
        body.kind = IrNodeKind::BlockBody { statements };
        Ok(())
    }

    fn statements(&mut self, statements: &mut Vec<IrNode>) -> LowerResult<()> {
        let mut out = Vec::with_capacity(statements.len());
        for mut stmt in statements.drain(..) {
            if let IrNodeKind::Declaration {
                kind: kind @ (DeclarationKind::AnonymousInitializer | DeclarationKind::EnumEntry),
                ..
            } = stmt.get_kind()
            {
                return Err(LoweringError::malformed(
                    &stmt,
                    format!("{} cannot be declared inside a function body", kind.describe()),
                ));
            }
            self.node(&mut stmt)?;
            if let IrNodeKind::Composite { statements: inner } | IrNodeKind::Block { statements: inner } = &mut stmt.kind {
                trace!("splicing {} nested statements", inner.len());
                out.append(inner);
            } else {
                self.lift_value(stmt, &mut out)?;
            }
        }
        *statements = out;
        Ok(())
    }

    fn node(&mut self, node: &mut IrNode) -> LowerResult<()> {
        if matches!(node.kind, IrNodeKind::Spread { .. }) {
            return Err(LoweringError::malformed(node, "spread marker outside of a sequence literal"));
        }
        if matches!(node.kind, IrNodeKind::BlockBody { .. } | IrNodeKind::ExpressionBody { .. }) {
            return Err(LoweringError::malformed(node, "function body nested outside of a function"));
        }

        match &mut node.kind {
            IrNodeKind::Function(function) => {
                if let Some(body) = function.body.as_deref_mut() {
                    self.body(body)?;
                }
            }
            IrNodeKind::Variable { initializer, .. } => {
                if let Some(init) = initializer.as_deref_mut() {
                    self.node(init)?;
                }
            }
            IrNodeKind::Block { statements } | IrNodeKind::Composite { statements } => {
                self.statements(statements)?;
            }
            IrNodeKind::When { branches, else_branch } => {
                for branch in branches.iter_mut() {
                    self.node(&mut branch.condition)?;
                    self.node(&mut branch.result)?;
                }
                if let Some(e) = else_branch.as_deref_mut() {
                    self.node(e)?;
                }
            }
            IrNodeKind::WhileLoop { condition, body, .. } | IrNodeKind::DoWhileLoop { condition, body, .. } => {
                self.node(condition)?;
                if let Some(b) = body.as_deref_mut() {
                    self.node(b)?;
                }
            }
            IrNodeKind::TryCatch { try_result, catches, finally } => {
                self.node(try_result)?;
                for clause in catches.iter_mut() {
                    self.node(&mut clause.result)?;
                }
                if let Some(f) = finally.as_deref_mut() {
                    self.node(f)?;
                }
            }
            IrNodeKind::Return { value } => {
                if let Some(v) = value.as_deref_mut() {
                    self.node(v)?;
                }
            }
            IrNodeKind::Throw { value } | IrNodeKind::SetVariable { value, .. } => self.node(value)?,
            IrNodeKind::TypeOperator { argument, .. } => self.node(argument)?,
            IrNodeKind::Vararg { elements } => {
                for element in elements.iter_mut() {
                    match &mut element.kind {
                        IrNodeKind::Spread { expression } => self.node(expression)?,
                        _ => self.node(element)?,
                    }
                }
            }
            IrNodeKind::Call(call) => {
                if let Some(r) = call.dispatch_receiver.as_deref_mut() {
                    self.node(r)?;
                }
                if let Some(r) = call.extension_receiver.as_deref_mut() {
                    self.node(r)?;
                }
                for arg in call.arguments.iter_mut().flatten() {
                    self.node(arg)?;
                }
            }
            IrNodeKind::Declaration { .. }
            | IrNodeKind::Break { .. }
            | IrNodeKind::Continue { .. }
            | IrNodeKind::Const { .. }
            | IrNodeKind::GetObjectValue { .. }
            | IrNodeKind::GetEnumValue { .. }
            | IrNodeKind::GetVariable { .. }
            | IrNodeKind::GetExtensionReceiver => {}
            // rejected before the match
            IrNodeKind::Spread { .. } | IrNodeKind::BlockBody { .. } | IrNodeKind::ExpressionBody { .. } => {}
        }

        collapse_singleton_block(node);
        Ok(())
    }

    /// Rewrites the value operand of `stmt` until it lowers as a plain
    /// expression, pushing whatever has to run first onto `out`. The value is
    /// the first thing `stmt` evaluates, so evaluation order is unchanged.
    fn lift_value(&mut self, mut stmt: IrNode, out: &mut Vec<IrNode>) -> LowerResult<()> {
        loop {
            let Some(value) = value_slot(&mut stmt) else {
                break;
            };
            if let Some(leading) = take_leading(value) {
                trace!("hoisting {} statements out of `{}`", leading.len(), stmt.kind_name());
                out.extend(leading);
                continue;
            }
            if needs_statement_form(value) {
                return self.split_value(stmt, out);
            }
            break;
        }
        out.push(stmt);
        Ok(())
    }

    /// `val x = when {..}` becomes `val x; when { .. -> x = r }`; an
    /// assignment keeps its own target. Returns and throws read the value
    /// back from a fresh local declared in front.
    fn split_value(&mut self, mut stmt: IrNode, out: &mut Vec<IrNode>) -> LowerResult<()> {
        let target = match stmt.get_kind() {
            IrNodeKind::Variable { name, .. } | IrNodeKind::SetVariable { name, .. } => name.clone(),
            _ => {
                let name = format!("value${}", self.results);
                self.results += 1;
                name
            }
        };
        let declares = !matches!(stmt.kind, IrNodeKind::SetVariable { .. });
        let reads_back = !matches!(stmt.kind, IrNodeKind::Variable { .. } | IrNodeKind::SetVariable { .. });
        let read_back = stmt.derived(IrNodeKind::GetVariable { name: target.clone() });
        let declare = stmt.derived(IrNodeKind::Variable { name: target.clone(), initializer: None });
        let Some(slot) = value_slot(&mut stmt) else {
            out.push(stmt);
            return Ok(());
        };
        let mut value = std::mem::replace(slot, read_back);
        assign_result(&mut value, &target)?;
        trace!("`{}` value assigned to {} in statement form", value.kind_name(), target);

        if declares {
            out.push(declare);
        }
        out.push(value);
        if reads_back {
            out.push(stmt);
        }
        Ok(())
    }
}

/// `{ e }` becomes `e` when `e` is an expression.
fn collapse_singleton_block(node: &mut IrNode) {
    let single = match &mut node.kind {
        IrNodeKind::Block { statements } if statements.len() == 1 && statements[0].get_kind().is_expression() => {
            statements.pop()
        }
        _ => None,
    };
    if let Some(inner) = single {
        *node = inner;
    }
}

fn value_slot(stmt: &mut IrNode) -> Option<&mut IrNode> {
    match &mut stmt.kind {
        IrNodeKind::Variable { initializer: Some(value), .. }
        | IrNodeKind::Return { value: Some(value) }
        | IrNodeKind::Throw { value }
        | IrNodeKind::SetVariable { value, .. } => Some(&mut **value),
        _ => None,
    }
}

/// Splits `{ s1; ..; sn; e }` into its leading statements, leaving `e` in
/// place of the block.
fn take_leading(value: &mut IrNode) -> Option<Vec<IrNode>> {
    let IrNodeKind::Block { statements } = &mut value.kind else {
        return None;
    };
    if statements.len() < 2 {
        return None;
    }
    let last = statements.pop()?;
    let leading = std::mem::take(statements);
    *value = last;
    Some(leading)
}

/// Values with an arm or member that only lowers as a statement.
fn needs_statement_form(value: &IrNode) -> bool {
    let statement_only = |node: &IrNode| !node.get_kind().is_expression() || needs_statement_form(node);
    match value.get_kind() {
        IrNodeKind::TryCatch { .. } => true,
        IrNodeKind::Block { statements } => statements.iter().any(statement_only),
        IrNodeKind::When { branches, else_branch } => branches
            .iter()
            .map(|b| &b.result)
            .chain(else_branch.as_deref())
            .any(statement_only),
        _ => false,
    }
}

/// Turns every arm of `value` into `target = arm`. Arms that never complete
/// normally (`throw`, `return`, jumps) are left alone.
fn assign_result(value: &mut IrNode, target: &str) -> LowerResult<()> {
    if let IrNodeKind::When { else_branch: None, .. } = value.get_kind() {
        return Err(LoweringError::invariant(value, "`when` used as a value has no else branch"));
    }
    match &mut value.kind {
        IrNodeKind::When { branches, else_branch } => {
            for branch in branches.iter_mut() {
                assign_result(&mut branch.result, target)?;
            }
            if let Some(e) = else_branch.as_deref_mut() {
                assign_result(e, target)?;
            }
            return Ok(());
        }
        IrNodeKind::TryCatch { try_result, catches, .. } => {
            assign_result(try_result, target)?;
            for clause in catches.iter_mut() {
                assign_result(&mut clause.result, target)?;
            }
            return Ok(());
        }
        IrNodeKind::Block { statements } | IrNodeKind::Composite { statements } => {
            if let Some(last) = statements.last_mut() {
                assign_result(last, target)?;
            }
            return Ok(());
        }
        _ => {}
    }
    if value.get_kind().is_expression() {
        let kind = std::mem::replace(&mut value.kind, IrNodeKind::GetExtensionReceiver);
        let result = value.derived(kind);
        value.kind = IrNodeKind::SetVariable { name: target.to_string(), value: Box::new(result) };
    }
    Ok(())
}
