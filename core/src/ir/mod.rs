pub mod kind;
pub mod module;
pub mod node;
pub mod normalize;

pub use kind::{CallExpr, CatchClause, DeclarationKind, FunctionDecl, IrConst, IrNodeKind, TypeOperator, WhenBranch};
pub use module::{IrFile, IrModule};
pub use node::{IrNode, NodeId};
pub use normalize::normalize_module;
