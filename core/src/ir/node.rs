use serde::{Deserialize, Serialize};

use crate::location;

use super::kind::{IrConst, IrNodeKind};

pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrNode {
    #[serde(skip, default = "IrNode::create_id")]
    id: NodeId,
    #[serde(flatten)]
    pub kind: IrNodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<location::Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<location::Span>,
}

impl IrNode {
    fn create_id() -> NodeId {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static COUNTER: AtomicUsize = AtomicUsize::new(1);
        COUNTER.fetch_add(1, Ordering::Relaxed)
    }

    pub fn new(kind: IrNodeKind) -> Self {
        IrNode {
            id: Self::create_id(),
            kind,
            location: None,
            span: None,
        }
    }

    pub fn with_location(mut self, location: location::Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_span(mut self, span: location::Span) -> Self {
        self.span = Some(span);
        self
    }

    /// New node at this node's source position.
    pub fn derived(&self, kind: IrNodeKind) -> IrNode {
        IrNode { id: Self::create_id(), kind, location: self.location.clone(), span: self.span.clone() }
    }

    pub fn get_id(&self) -> NodeId {
        self.id
    }
    pub fn get_kind(&self) -> &IrNodeKind {
        &self.kind
    }
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }
    pub fn get_location(&self) -> Option<&location::Location> {
        self.location.as_ref()
    }
    pub fn get_span(&self) -> Option<&location::Span> {
        self.span.as_ref()
    }

    /// Direct children in evaluation order.
    pub fn children(&self) -> Vec<&IrNode> {
        match &self.kind {
            IrNodeKind::Function(f) => f.body.as_deref().into_iter().collect(),
            IrNodeKind::Variable { initializer, .. } => initializer.as_deref().into_iter().collect(),
            IrNodeKind::Declaration { .. }
            | IrNodeKind::Break { .. }
            | IrNodeKind::Continue { .. }
            | IrNodeKind::Const { .. }
            | IrNodeKind::GetObjectValue { .. }
            | IrNodeKind::GetEnumValue { .. }
            | IrNodeKind::GetVariable { .. }
            | IrNodeKind::GetExtensionReceiver => Vec::new(),
            IrNodeKind::BlockBody { statements }
            | IrNodeKind::Block { statements }
            | IrNodeKind::Composite { statements } => statements.iter().collect(),
            IrNodeKind::ExpressionBody { expression } | IrNodeKind::Spread { expression } => vec![expression.as_ref()],
            IrNodeKind::When { branches, else_branch } => branches
                .iter()
                .flat_map(|b| [&b.condition, &b.result])
                .chain(else_branch.as_deref())
                .collect(),
            IrNodeKind::WhileLoop { condition, body, .. } | IrNodeKind::DoWhileLoop { condition, body, .. } => {
                std::iter::once(&**condition).chain(body.as_deref()).collect()
            }
            IrNodeKind::TryCatch { try_result, catches, finally } => std::iter::once(&**try_result)
                .chain(catches.iter().map(|c| &c.result))
                .chain(finally.as_deref())
                .collect(),
            IrNodeKind::Return { value } => value.as_deref().into_iter().collect(),
            IrNodeKind::Throw { value } | IrNodeKind::SetVariable { value, .. } => vec![value.as_ref()],
            IrNodeKind::Vararg { elements } => elements.iter().collect(),
            IrNodeKind::Call(call) => call
                .dispatch_receiver
                .as_deref()
                .into_iter()
                .chain(call.extension_receiver.as_deref())
                .chain(call.arguments.iter().flatten())
                .collect(),
            IrNodeKind::TypeOperator { argument, .. } => vec![argument.as_ref()],
        }
    }

    /// One-line description of this node without its children.
    fn header(&self) -> String {
        match &self.kind {
            IrNodeKind::Function(f) => format!("Function {}({})", f.name, f.value_parameters.join(", ")),
            IrNodeKind::Variable { name, .. } => format!("Variable {}", name),
            IrNodeKind::Declaration { kind, name } => format!("Declaration {} {}", kind.describe(), name),
            IrNodeKind::WhileLoop { label: Some(l), .. } => format!("WhileLoop @{}", l),
            IrNodeKind::DoWhileLoop { label: Some(l), .. } => format!("DoWhileLoop @{}", l),
            IrNodeKind::Break { label: Some(l) } => format!("Break @{}", l),
            IrNodeKind::Continue { label: Some(l) } => format!("Continue @{}", l),
            IrNodeKind::When { else_branch, branches } => {
                format!("When branches={} else={}", branches.len(), else_branch.is_some())
            }
            IrNodeKind::TryCatch { catches, .. } => {
                let params: Vec<&str> = catches.iter().map(|c| c.parameter.as_str()).collect();
                format!("TryCatch catch({})", params.join(", "))
            }
            IrNodeKind::Const { value } => match value {
                IrConst::String(s) => format!("Const String {:?}", s),
                IrConst::Null => "Const Null".to_string(),
                IrConst::Boolean(b) => format!("Const Boolean {}", b),
                IrConst::Char(c) => format!("Const Char {:?}", c),
                IrConst::Byte(v) => format!("Const Byte {}", v),
                IrConst::Short(v) => format!("Const Short {}", v),
                IrConst::Int(v) => format!("Const Int {}", v),
                IrConst::Long(v) => format!("Const Long {}", v),
                IrConst::Float(v) => format!("Const Float {}", v),
                IrConst::Double(v) => format!("Const Double {}", v),
            },
            IrNodeKind::GetObjectValue { name } => format!("GetObjectValue {}", name),
            IrNodeKind::GetEnumValue { enum_name, entry } => format!("GetEnumValue {}.{}", enum_name, entry),
            IrNodeKind::GetVariable { name } => format!("GetVariable {}", name),
            IrNodeKind::SetVariable { name, .. } => format!("SetVariable {}", name),
            IrNodeKind::Call(call) => format!(
                "Call {} dispatch={} extension={} params={}",
                call.callee,
                call.dispatch_receiver.is_some(),
                call.extension_receiver.is_some(),
                call.value_parameters.len()
            ),
            IrNodeKind::TypeOperator { operator, type_operand, .. } => {
                format!("TypeOperator {:?} {}", operator, type_operand)
            }
            other => other.name().to_string(),
        }
    }

    /// Indented structural dump used in diagnostics.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(&self.header());
        if let Some(loc) = &self.location {
            out.push_str(&format!(" @ {}", loc));
        }
        out.push('\n');
        for child in self.children() {
            child.dump_into(out, depth + 1);
        }
    }
}

impl std::fmt::Display for IrNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dump())
    }
}
