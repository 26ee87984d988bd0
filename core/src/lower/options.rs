//! file: core/src/lower/options.rs
//! description: knobs for one lowering run.
//!
//! Options are plain data with serde defaults so a driver can load them from
//! a JSON file where every field is optional.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which translation units of a module are lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileSelection {
    /// Every file, in module order.
    #[default]
    All,
    /// Only the first file; the others are skipped with an info diagnostic.
    FirstOnly,
}

/// How 64-bit integer constants are mapped onto the target's double-precision
/// numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LongConstantPolicy {
    /// Widen to a double. Values beyond 2^53 lose precision and are reported
    /// as known gaps.
    #[default]
    Lossy,
    /// Fail the run on any value that cannot be represented exactly.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoweringOptions {
    pub files: FileSelection,
    /// Object holding runtime helpers such as `throwCCE`.
    pub runtime_namespace: String,
    /// Identifier of the synthetic extension-receiver parameter.
    pub receiver_name: String,
    pub long_constants: LongConstantPolicy,
    /// Report typed catch clauses, whose type guard is not lowered.
    pub flag_catch_guards: bool,
}

impl Default for LoweringOptions {
    fn default() -> Self {
        LoweringOptions {
            files: FileSelection::All,
            runtime_namespace: "kotlin".to_string(),
            receiver_name: "$receiver".to_string(),
            long_constants: LongConstantPolicy::Lossy,
            flag_catch_guards: true,
        }
    }
}

impl LoweringOptions {
    pub fn from_json(raw: &str) -> Result<LoweringOptions, String> {
        serde_json::from_str(raw).map_err(|e| format!("parse lowering options: {}", e))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<LoweringOptions, String> {
        let raw = std::fs::read_to_string(&path).map_err(|e| format!("read lowering options: {}", e))?;
        Self::from_json(&raw)
    }
}
