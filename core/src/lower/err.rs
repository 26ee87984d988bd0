use std::fmt;

use thiserror::Error;

use crate::error::{Ir2JsErrorExt, Level};
use crate::ir::IrNode;
use crate::location::{Location, Span};

const ISSUER: &str = "ir2js::lower";

/// Where a node was being lowered when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Declaration,
    Body,
    Statement,
    Expression,
    Normalizer,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Position::Declaration => "declaration position",
            Position::Body => "function body position",
            Position::Statement => "statement position",
            Position::Expression => "expression position",
            Position::Normalizer => "block-expression normalization",
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoweringErrorKind {
    /// No lowering rule exists for the node in the position it was found.
    UnsupportedConstruct,
    /// An IR precondition is broken; the defect is upstream.
    InvariantViolation,
    /// The tree shape is not one the normalizer recognizes.
    MalformedShape,
}

impl fmt::Display for LoweringErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LoweringErrorKind::UnsupportedConstruct => "unsupported construct",
            LoweringErrorKind::InvariantViolation => "invariant violation",
            LoweringErrorKind::MalformedShape => "malformed shape",
        };
        write!(f, "{}", text)
    }
}

/// Fatal failure of a lowering run. Any of these aborts the whole module.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message} (node kind `{node_kind}`)\n{dump}")]
pub struct LoweringError {
    kind: LoweringErrorKind,
    message: String,
    node_kind: String,
    dump: String,
    location: Option<Location>,
    span: Option<Span>,
}

impl LoweringError {
    pub fn with(
        kind: LoweringErrorKind,
        message: String,
        node_kind: String,
        dump: String,
        location: Option<Location>,
        span: Option<Span>,
    ) -> Self {
        LoweringError { kind, message, node_kind, dump, location, span }
    }

    fn for_node(kind: LoweringErrorKind, node: &IrNode, message: String) -> Self {
        LoweringError::with(
            kind,
            message,
            node.kind_name().to_string(),
            node.dump(),
            node.location.clone(),
            node.span.clone(),
        )
    }

    pub fn unsupported(node: &IrNode, position: Position) -> Self {
        Self::for_node(
            LoweringErrorKind::UnsupportedConstruct,
            node,
            format!("no lowering rule for `{}` in {}", node.kind_name(), position),
        )
    }

    pub fn unsupported_because(node: &IrNode, detail: impl Into<String>) -> Self {
        Self::for_node(LoweringErrorKind::UnsupportedConstruct, node, detail.into())
    }

    pub fn invariant(node: &IrNode, detail: impl Into<String>) -> Self {
        Self::for_node(LoweringErrorKind::InvariantViolation, node, detail.into())
    }

    pub fn malformed(node: &IrNode, detail: impl Into<String>) -> Self {
        Self::for_node(LoweringErrorKind::MalformedShape, node, detail.into())
    }

    pub fn kind(&self) -> LoweringErrorKind {
        self.kind
    }

    pub fn node_kind(&self) -> &str {
        &self.node_kind
    }

    pub fn dump(&self) -> &str {
        &self.dump
    }
}

impl Ir2JsErrorExt for LoweringError {
    fn level(&self) -> Level {
        match self.kind {
            LoweringErrorKind::InvariantViolation => Level::Critical,
            LoweringErrorKind::UnsupportedConstruct | LoweringErrorKind::MalformedShape => Level::Error,
        }
    }

    fn message(&self) -> String {
        format!("{}: {} (node kind `{}`)", self.kind, self.message, self.node_kind)
    }

    fn issuer(&self) -> String {
        ISSUER.to_string()
    }

    fn span(&self) -> Option<Span> {
        self.span.clone()
    }

    fn location(&self) -> Option<Location> {
        self.location.clone()
    }
}

pub type LowerResult<T> = Result<T, LoweringError>;

/// A recognized construct that was lowered to a documented placeholder or
/// with a documented limitation. The run still succeeds, but its output is
/// incomplete.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    level: Level,
    message: String,
    node_kind: String,
    location: Option<Location>,
    span: Option<Span>,
}

impl Diagnostic {
    pub fn known_gap(node: &IrNode, message: String) -> Self {
        Diagnostic {
            level: Level::Warning,
            message,
            node_kind: node.kind_name().to_string(),
            location: node.location.clone(),
            span: node.span.clone(),
        }
    }

    pub fn info(message: String) -> Self {
        Diagnostic {
            level: Level::Info,
            message,
            node_kind: "Module".to_string(),
            location: None,
            span: None,
        }
    }

    pub fn node_kind(&self) -> &str {
        &self.node_kind
    }

    pub fn is_gap(&self) -> bool {
        self.level >= Level::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{} at {}", self.message, loc),
            None => write!(f, "{}", self.message),
        }
    }
}

impl Ir2JsErrorExt for Diagnostic {
    fn level(&self) -> Level {
        self.level
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn issuer(&self) -> String {
        ISSUER.to_string()
    }

    fn span(&self) -> Option<Span> {
        self.span.clone()
    }

    fn location(&self) -> Option<Location> {
        self.location.clone()
    }
}
