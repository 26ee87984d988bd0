//! file: core/src/ir/module.rs
//! description: module and file containers of the input IR.
//!
//! An `IrModule` aggregates one or more `IrFile` translation units, each an
//! ordered list of top-level declarations. Both derive serde so drivers can
//! exchange the IR as JSON.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::node::IrNode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrFile {
    pub name: String,
    #[serde(default)]
    pub declarations: Vec<IrNode>,
}

impl IrFile {
    pub fn new(name: impl Into<String>, declarations: Vec<IrNode>) -> Self {
        IrFile { name: name.into(), declarations }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrModule {
    pub name: String,
    #[serde(default)]
    pub files: Vec<IrFile>,
}

impl IrModule {
    pub fn new(name: impl Into<String>, files: Vec<IrFile>) -> Self {
        IrModule { name: name.into(), files }
    }

    pub fn declaration_count(&self) -> usize {
        self.files.iter().map(|f| f.declarations.len()).sum()
    }

    pub fn from_json(raw: &str) -> Result<IrModule, String> {
        serde_json::from_str(raw).map_err(|e| format!("parse IR module: {}", e))
    }

    /// Load a JSON-encoded module from disk.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<IrModule, String> {
        let raw = std::fs::read_to_string(&path).map_err(|e| format!("read IR module: {}", e))?;
        Self::from_json(&raw)
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("encode IR module: {}", e))
    }
}

impl std::fmt::Display for IrModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "module {}", self.name)?;
        for file in &self.files {
            writeln!(f, "file {}", file.name)?;
            for decl in &file.declarations {
                write!(f, "{}", decl)?;
            }
        }
        Ok(())
    }
}
