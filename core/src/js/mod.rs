pub mod ast;
pub mod literal;
pub mod scope;

pub use ast::{
    BinaryOperator, JsBlock, JsCatch, JsExpression, JsFunction, JsLiteral, JsNumber, JsParameter, JsStatement, JsVar,
    PrefixOperator,
};
pub use literal::LiteralPool;
pub use scope::{ScopeId, ScopeRegistry};
