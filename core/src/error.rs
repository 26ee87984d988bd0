//! file: core/src/error.rs
//! description: severity levels and the reporting trait shared by failures
//! and diagnostics.

use std::fmt;

use crate::location::{Location, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    /// Levels that abort a lowering run.
    pub fn is_fatal(&self) -> bool {
        *self >= Level::Error
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        };
        write!(f, "{}", text)
    }
}

/// Common surface of everything the lowering core reports: hard failures
/// (`LoweringError`) as well as known-gap diagnostics.
pub trait Ir2JsErrorExt {
    fn level(&self) -> Level;
    fn message(&self) -> String;
    fn issuer(&self) -> String;
    fn span(&self) -> Option<Span>;
    fn location(&self) -> Option<Location>;
}

impl fmt::Debug for dyn Ir2JsErrorExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = self.location().map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string());
        let span = self.span().map(|s| s.to_string()).unwrap_or_else(|| "span:none".to_string());
        write!(f, "IR2JS | {} | {} | {} | {} | {}", self.level(), location, self.issuer(), span, self.message())
    }
}

impl fmt::Display for dyn Ir2JsErrorExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location() {
            Some(location) => write!(f, "{} at {}: {}", self.level(), location, self.message()),
            None => write!(f, "{}: {}", self.level(), self.message()),
        }
    }
}
