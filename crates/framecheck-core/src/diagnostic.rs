//! Mismatch diagnostics attached to failed assertions
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};

/// What kind of units were compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Field-by-field schema comparison
    SchemaMismatch,

    /// Row-by-row data comparison
    RowMismatch,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SchemaMismatch => write!(f, "schema mismatch"),
            Self::RowMismatch => write!(f, "row mismatch"),
        }
    }
}

/// Result of a failed comparison
///
/// Created only on failure, carried by the raised `AssertionError`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Kind of mismatch
    pub kind: DiagnosticKind,

    /// Number of differing units (fields or row pairs)
    pub mismatched: usize,

    /// Number of units compared
    pub total: usize,

    /// Rendered textual diff
    pub diff: String,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(kind: DiagnosticKind, mismatched: usize, total: usize, diff: impl Into<String>) -> Self {
        Self {
            kind,
            mismatched,
            total,
            diff: diff.into(),
        }
    }

    /// Share of differing units, 0.0 to 100.0
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.mismatched as f64 / self.total as f64 * 100.0
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
