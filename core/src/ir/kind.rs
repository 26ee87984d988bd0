//! file: core/src/ir/kind.rs
//! description: IR node kind definitions.
//!
//! `IrNodeKind` is the single tagged union of every node shape the front end
//! hands to the lowering core. Lowering functions match on it exhaustively,
//! so adding a variant here is a compile error until every position decides
//! what to do with it.
//!
use serde::{Deserialize, Serialize};

use super::node::IrNode;

/// Typed constant payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum IrConst {
    String(String),
    Null,
    Boolean(bool),
    Char(char),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl IrConst {
    pub fn kind_name(&self) -> &'static str {
        match self {
            IrConst::String(_) => "String",
            IrConst::Null => "Null",
            IrConst::Boolean(_) => "Boolean",
            IrConst::Char(_) => "Char",
            IrConst::Byte(_) => "Byte",
            IrConst::Short(_) => "Short",
            IrConst::Int(_) => "Int",
            IrConst::Long(_) => "Long",
            IrConst::Float(_) => "Float",
            IrConst::Double(_) => "Double",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeOperator {
    Cast,
    ImplicitCast,
    ImplicitNotNull,
    SafeCast,
    InstanceOf,
    NotInstanceOf,
}

/// Declarations the core recognizes but does not lower yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclarationKind {
    Class,
    Property,
    Object,
    EnumEntry,
    TypeAlias,
    AnonymousInitializer,
}

impl DeclarationKind {
    pub fn describe(&self) -> &'static str {
        match self {
            DeclarationKind::Class => "class",
            DeclarationKind::Property => "property",
            DeclarationKind::Object => "object",
            DeclarationKind::EnumEntry => "enum entry",
            DeclarationKind::TypeAlias => "type alias",
            DeclarationKind::AnonymousInitializer => "anonymous initializer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    #[serde(default)]
    pub value_parameters: Vec<String>,
    #[serde(default)]
    pub has_extension_receiver: bool,
    /// Unique key of this overload, e.g. `f(Int,Int)`.
    #[serde(default)]
    pub signature: Option<String>,
    /// `BlockBody` or `ExpressionBody`; absent for bodiless functions.
    #[serde(default)]
    pub body: Option<Box<IrNode>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    pub callee: String,
    /// `signature` of the called declaration when the front end resolved it.
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub dispatch_receiver: Option<Box<IrNode>>,
    #[serde(default)]
    pub extension_receiver: Option<Box<IrNode>>,
    /// Declared value parameter names of the callee, in declaration order.
    #[serde(default)]
    pub value_parameters: Vec<String>,
    /// One slot per declared parameter; `None` means the argument was omitted.
    #[serde(default)]
    pub arguments: Vec<Option<IrNode>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhenBranch {
    pub condition: IrNode,
    pub result: IrNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    pub parameter: String,
    /// Caught exception type; `None` catches everything.
    #[serde(default)]
    pub exception_type: Option<String>,
    pub result: IrNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum IrNodeKind {
    Function(FunctionDecl),
    Variable {
        name: String,
        #[serde(default)]
        initializer: Option<Box<IrNode>>,
    },
    Declaration {
        #[serde(rename = "declaration")]
        kind: DeclarationKind,
        name: String,
    },

    BlockBody { statements: Vec<IrNode> },
    ExpressionBody { expression: Box<IrNode> },
    /// Block expression: the value is the value of its last member.
    Block { statements: Vec<IrNode> },
    Composite { statements: Vec<IrNode> },

    When {
        branches: Vec<WhenBranch>,
        #[serde(default)]
        else_branch: Option<Box<IrNode>>,
    },
    WhileLoop {
        #[serde(default)]
        label: Option<String>,
        condition: Box<IrNode>,
        #[serde(default)]
        body: Option<Box<IrNode>>,
    },
    DoWhileLoop {
        #[serde(default)]
        label: Option<String>,
        condition: Box<IrNode>,
        #[serde(default)]
        body: Option<Box<IrNode>>,
    },
    TryCatch {
        try_result: Box<IrNode>,
        #[serde(default)]
        catches: Vec<CatchClause>,
        #[serde(default)]
        finally: Option<Box<IrNode>>,
    },
    Break {
        #[serde(default)]
        label: Option<String>,
    },
    Continue {
        #[serde(default)]
        label: Option<String>,
    },
    Return {
        #[serde(default)]
        value: Option<Box<IrNode>>,
    },
    Throw { value: Box<IrNode> },

    Const { value: IrConst },
    Vararg { elements: Vec<IrNode> },
    Spread { expression: Box<IrNode> },
    GetObjectValue { name: String },
    GetEnumValue { enum_name: String, entry: String },
    GetVariable { name: String },
    SetVariable { name: String, value: Box<IrNode> },
    GetExtensionReceiver,
    Call(CallExpr),
    TypeOperator {
        operator: TypeOperator,
        argument: Box<IrNode>,
        type_operand: String,
    },
}

impl IrNodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            IrNodeKind::Function(_) => "Function",
            IrNodeKind::Variable { .. } => "Variable",
            IrNodeKind::Declaration { .. } => "Declaration",
            IrNodeKind::BlockBody { .. } => "BlockBody",
            IrNodeKind::ExpressionBody { .. } => "ExpressionBody",
            IrNodeKind::Block { .. } => "Block",
            IrNodeKind::Composite { .. } => "Composite",
            IrNodeKind::When { .. } => "When",
            IrNodeKind::WhileLoop { .. } => "WhileLoop",
            IrNodeKind::DoWhileLoop { .. } => "DoWhileLoop",
            IrNodeKind::TryCatch { .. } => "TryCatch",
            IrNodeKind::Break { .. } => "Break",
            IrNodeKind::Continue { .. } => "Continue",
            IrNodeKind::Return { .. } => "Return",
            IrNodeKind::Throw { .. } => "Throw",
            IrNodeKind::Const { .. } => "Const",
            IrNodeKind::Vararg { .. } => "Vararg",
            IrNodeKind::Spread { .. } => "Spread",
            IrNodeKind::GetObjectValue { .. } => "GetObjectValue",
            IrNodeKind::GetEnumValue { .. } => "GetEnumValue",
            IrNodeKind::GetVariable { .. } => "GetVariable",
            IrNodeKind::SetVariable { .. } => "SetVariable",
            IrNodeKind::GetExtensionReceiver => "GetExtensionReceiver",
            IrNodeKind::Call(_) => "Call",
            IrNodeKind::TypeOperator { .. } => "TypeOperator",
        }
    }

    /// Kinds that may legally appear as file-level declarations.
    pub fn is_declaration(&self) -> bool {
        matches!(self, IrNodeKind::Function(_) | IrNodeKind::Declaration { .. })
    }

    /// Kinds that produce a value without needing statement context.
    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            IrNodeKind::Const { .. }
                | IrNodeKind::Vararg { .. }
                | IrNodeKind::GetObjectValue { .. }
                | IrNodeKind::GetEnumValue { .. }
                | IrNodeKind::GetVariable { .. }
                | IrNodeKind::SetVariable { .. }
                | IrNodeKind::GetExtensionReceiver
                | IrNodeKind::Call(_)
                | IrNodeKind::TypeOperator { .. }
                | IrNodeKind::When { .. }
                | IrNodeKind::Block { .. }
        )
    }
}
