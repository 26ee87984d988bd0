//! Source positions attached to IR nodes by the front end. They are carried
//! through unchanged so diagnostics can point back at the original program.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Location {
    /// The source file the node came from.
    pub file: String,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self { file: file.into(), line, column }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Location,
    pub end: Location,
}

impl Span {
    pub fn new(start: Location, end: Location) -> Self {
        Self { start, end }
    }

    /// Whether both ends sit in the same file.
    pub fn is_single_file(&self) -> bool {
        self.start.file == self.end.file
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_single_file() {
            write!(
                f,
                "{}:{}:{}-{}:{}",
                self.start.file, self.start.line, self.start.column, self.end.line, self.end.column
            )
        } else {
            write!(f, "{} - {}", self.start, self.end)
        }
    }
}
