//! file: core/src/js/ast.rs
//! description: target AST produced by lowering.
//!
//! Nodes are freshly built during a run and owned by their parent; nothing is
//! shared. Formatting the tree as source text is left to a downstream printer.
//!
use std::rc::Rc;

use serde::Serialize;

use super::scope::ScopeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    Assign,     // =
    Eq,         // ==
    Neq,        // !=
    InstanceOf, // instanceof
    Comma,      // ,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrefixOperator {
    Not,  // !
    Void, // void
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum JsNumber {
    Int(i32),
    Double(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum JsLiteral {
    String(Rc<str>),
    Number(JsNumber),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsParameter {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsFunction {
    /// Scope owning the parameters and locals of this function.
    pub scope: ScopeId,
    pub parameters: Vec<JsParameter>,
    pub body: JsBlock,
}

impl JsFunction {
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum JsExpression {
    Binary {
        op: BinaryOperator,
        left: Box<JsExpression>,
        right: Box<JsExpression>,
    },
    Prefix {
        op: PrefixOperator,
        operand: Box<JsExpression>,
    },
    Conditional {
        test: Box<JsExpression>,
        then_expr: Box<JsExpression>,
        else_expr: Box<JsExpression>,
    },
    Invocation {
        callee: Box<JsExpression>,
        arguments: Vec<JsExpression>,
    },
    NameRef {
        name: String,
        qualifier: Option<Box<JsExpression>>,
    },
    Literal {
        value: JsLiteral,
    },
    ArrayLiteral {
        elements: Vec<JsExpression>,
    },
    Function(JsFunction),
}

impl JsExpression {
    pub fn name(name: impl Into<String>) -> Self {
        JsExpression::NameRef { name: name.into(), qualifier: None }
    }

    pub fn qualified(name: impl Into<String>, qualifier: JsExpression) -> Self {
        JsExpression::NameRef { name: name.into(), qualifier: Some(Box::new(qualifier)) }
    }

    /// `a.b.c` as nested qualified references.
    pub fn dotted(path: &str) -> Self {
        let mut parts = path.split('.');
        let first = parts.next().unwrap_or_default();
        parts.fold(JsExpression::name(first), |acc, part| JsExpression::qualified(part, acc))
    }

    pub fn literal(value: JsLiteral) -> Self {
        JsExpression::Literal { value }
    }

    pub fn null() -> Self {
        JsExpression::literal(JsLiteral::Null)
    }

    pub fn binary(op: BinaryOperator, left: JsExpression, right: JsExpression) -> Self {
        JsExpression::Binary { op, left: Box::new(left), right: Box::new(right) }
    }

    pub fn assign(target: JsExpression, value: JsExpression) -> Self {
        JsExpression::binary(BinaryOperator::Assign, target, value)
    }

    pub fn instance_of(value: JsExpression, type_ref: JsExpression) -> Self {
        JsExpression::binary(BinaryOperator::InstanceOf, value, type_ref)
    }

    pub fn comma(left: JsExpression, right: JsExpression) -> Self {
        JsExpression::binary(BinaryOperator::Comma, left, right)
    }

    pub fn not(operand: JsExpression) -> Self {
        JsExpression::Prefix { op: PrefixOperator::Not, operand: Box::new(operand) }
    }

    /// `void 0`, the "no value supplied" marker for omitted arguments.
    pub fn void_zero() -> Self {
        JsExpression::Prefix {
            op: PrefixOperator::Void,
            operand: Box::new(JsExpression::literal(JsLiteral::Number(JsNumber::Int(0)))),
        }
    }

    pub fn conditional(test: JsExpression, then_expr: JsExpression, else_expr: JsExpression) -> Self {
        JsExpression::Conditional {
            test: Box::new(test),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        }
    }

    pub fn invoke(callee: JsExpression, arguments: Vec<JsExpression>) -> Self {
        JsExpression::Invocation { callee: Box::new(callee), arguments }
    }

    /// Unqualified names and literals can be evaluated more than once
    /// without observable effects.
    pub fn is_pure_reference(&self) -> bool {
        matches!(
            self,
            JsExpression::NameRef { qualifier: None, .. } | JsExpression::Literal { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct JsBlock {
    pub statements: Vec<JsStatement>,
}

impl JsBlock {
    pub fn new(statements: Vec<JsStatement>) -> Self {
        JsBlock { statements }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsVar {
    pub name: String,
    /// `None` is the target's absent value, never a zero default.
    pub initializer: Option<JsExpression>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsCatch {
    pub scope: ScopeId,
    pub parameter: String,
    pub body: JsBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum JsStatement {
    Block(JsBlock),
    Vars {
        vars: Vec<JsVar>,
    },
    Expression {
        expression: JsExpression,
    },
    If {
        condition: JsExpression,
        then_branch: Box<JsStatement>,
        else_branch: Option<Box<JsStatement>>,
    },
    While {
        condition: JsExpression,
        body: JsBlock,
    },
    DoWhile {
        condition: JsExpression,
        body: JsBlock,
    },
    Labeled {
        label: String,
        body: Box<JsStatement>,
    },
    Try {
        body: JsBlock,
        catches: Vec<JsCatch>,
        finally: Option<JsBlock>,
    },
    Break {
        label: Option<String>,
    },
    Continue {
        label: Option<String>,
    },
    Return {
        value: Option<JsExpression>,
    },
    Throw {
        value: JsExpression,
    },
    Empty,
}

impl JsStatement {
    pub fn var(name: impl Into<String>, initializer: Option<JsExpression>) -> Self {
        JsStatement::Vars { vars: vec![JsVar { name: name.into(), initializer }] }
    }

    pub fn expression(expression: JsExpression) -> Self {
        JsStatement::Expression { expression }
    }

    /// Wraps a statement in a block unless it already is one.
    pub fn into_block(self) -> JsBlock {
        match self {
            JsStatement::Block(block) => block,
            JsStatement::Empty => JsBlock::default(),
            other => JsBlock::new(vec![other]),
        }
    }
}
