//! Comparison options (framecheck.toml)

use serde::{Deserialize, Serialize};

use crate::error::AssertionError;

/// Default relative tolerance
pub const DEFAULT_RTOL: f64 = 1e-5;

/// Default absolute tolerance
pub const DEFAULT_ATOL: f64 = 1e-8;

/// Numeric tolerance for approximate equality
///
/// Two numbers `a` (actual) and `b` (expected) are approximately equal when
/// `|a - b| <= atol + rtol * |b|`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub rtol: f64,
    pub atol: f64,
}

impl Tolerance {
    pub fn new(rtol: f64, atol: f64) -> Self {
        Self { rtol, atol }
    }

    /// Zero tolerance: floats must match exactly
    pub fn exact() -> Self {
        Self { rtol: 0.0, atol: 0.0 }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            rtol: DEFAULT_RTOL,
            atol: DEFAULT_ATOL,
        }
    }
}

/// Options that affect schema comparison only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaOptions {
    /// Skip nullability at every level
    pub ignore_nullable: bool,

    /// Sort fields by name before comparing
    pub ignore_column_order: bool,

    /// Replace field names with their positions before comparing
    pub ignore_column_name: bool,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            ignore_nullable: true,
            ignore_column_order: false,
            ignore_column_name: false,
        }
    }
}

impl SchemaOptions {
    /// Reject combinations that cannot be honored together
    pub fn validate(&self) -> Result<(), AssertionError> {
        if self.ignore_column_order && self.ignore_column_name {
            return Err(AssertionError::conflicting_options(
                "ignore_column_order",
                "ignore_column_name",
            ));
        }
        Ok(())
    }
}

/// Full set of toggles for a dataset assertion
///
/// Constructed once per assertion call and never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonOptions {
    /// Pair rows positionally instead of by canonical sort order
    pub check_row_order: bool,

    /// Relative tolerance for floats and decimals
    pub rtol: f64,

    /// Absolute tolerance for floats and decimals
    pub atol: f64,

    /// Skip nullability when comparing schemas
    pub ignore_nullable: bool,

    /// Compare columns by name instead of position
    pub ignore_column_order: bool,

    /// Compare columns by position, ignoring their names
    pub ignore_column_name: bool,

    /// Cast every column to string before comparing
    pub ignore_column_type: bool,

    /// Stop after this many mismatching row pairs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_errors: Option<usize>,

    /// Only include mismatching rows in the report
    pub show_only_diff: bool,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            check_row_order: false,
            rtol: DEFAULT_RTOL,
            atol: DEFAULT_ATOL,
            ignore_nullable: true,
            ignore_column_order: false,
            ignore_column_name: false,
            ignore_column_type: false,
            max_errors: None,
            show_only_diff: false,
        }
    }
}

impl ComparisonOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check_row_order(mut self, check_row_order: bool) -> Self {
        self.check_row_order = check_row_order;
        self
    }

    pub fn with_rtol(mut self, rtol: f64) -> Self {
        self.rtol = rtol;
        self
    }

    pub fn with_atol(mut self, atol: f64) -> Self {
        self.atol = atol;
        self
    }

    pub fn ignore_nullable(mut self, ignore_nullable: bool) -> Self {
        self.ignore_nullable = ignore_nullable;
        self
    }

    pub fn ignore_column_order(mut self, ignore_column_order: bool) -> Self {
        self.ignore_column_order = ignore_column_order;
        self
    }

    pub fn ignore_column_name(mut self, ignore_column_name: bool) -> Self {
        self.ignore_column_name = ignore_column_name;
        self
    }

    pub fn ignore_column_type(mut self, ignore_column_type: bool) -> Self {
        self.ignore_column_type = ignore_column_type;
        self
    }

    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = Some(max_errors);
        self
    }

    pub fn show_only_diff(mut self, show_only_diff: bool) -> Self {
        self.show_only_diff = show_only_diff;
        self
    }

    /// Tolerance view
    pub fn tolerance(&self) -> Tolerance {
        Tolerance::new(self.rtol, self.atol)
    }

    /// Schema comparison view
    pub fn schema_options(&self) -> SchemaOptions {
        SchemaOptions {
            ignore_nullable: self.ignore_nullable,
            ignore_column_order: self.ignore_column_order,
            ignore_column_name: self.ignore_column_name,
        }
    }

    /// Reject combinations that cannot be honored together
    pub fn validate(&self) -> Result<(), AssertionError> {
        self.schema_options().validate()
    }

    /// Load options from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load options from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save options to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
