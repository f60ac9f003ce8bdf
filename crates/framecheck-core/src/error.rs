//! Error classes and structured assertion failures
//!
//! IMPORTANT: Error classes are versioned and stable.
//! NEVER rename or remove classes - callers match on them.
//! Add new classes with new names only.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::diagnostic::Diagnostic;

/// Expected-type description used by argument errors
pub const DATASET_ARG_TYPE: &str = "DataFrame or list of rows";

/// Error class registry (v1)
///
/// These classes are STABLE and VERSIONED.
/// Do NOT rename or remove classes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorClass {
    /// A schema assertion received a type that is not a struct
    UnsupportedDataType,

    /// Schemas differ under the requested comparison policy
    DifferentSchema,

    /// At least one row pair differs
    DifferentRows,

    /// A dataset argument is missing or of an unrecognized kind
    InvalidTypeDfEqualityArg,

    /// Mutually exclusive comparison options were enabled together
    InvalidComparisonOptions,
}

impl ErrorClass {
    /// Get the error class as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedDataType => "UNSUPPORTED_DATA_TYPE",
            Self::DifferentSchema => "DIFFERENT_SCHEMA",
            Self::DifferentRows => "DIFFERENT_ROWS",
            Self::InvalidTypeDfEqualityArg => "INVALID_TYPE_DF_EQUALITY_ARG",
            Self::InvalidComparisonOptions => "INVALID_COMPARISON_OPTIONS",
        }
    }

    /// Message template; `<name>` placeholders are filled from message parameters
    pub fn template(&self) -> &'static str {
        match self {
            Self::UnsupportedDataType => "Unsupported DataType `<data_type>`.",
            Self::DifferentSchema => "Schemas do not match.\n--- actual\n+++ expected\n<error_msg>",
            Self::DifferentRows => "<error_msg>",
            Self::InvalidTypeDfEqualityArg => {
                "Expected type <expected_type> for `<arg_name>` but got type <actual_type>."
            }
            Self::InvalidComparisonOptions => {
                "Options <options> cannot be enabled at the same time."
            }
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured failure raised by every assertion entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionError {
    /// Stable error class
    pub error_class: ErrorClass,

    /// Named parameters substituted into the class template
    pub message_parameters: BTreeMap<String, String>,

    /// Mismatch details, present for schema and row mismatches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
}

impl AssertionError {
    /// Create a new error from a class and its parameters
    pub fn new<K, V>(error_class: ErrorClass, parameters: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            error_class,
            message_parameters: parameters
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            diagnostic: None,
        }
    }

    /// Attach mismatch details
    pub fn with_diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostic = Some(diagnostic);
        self
    }

    /// A schema assertion was handed something other than a struct type
    pub fn unsupported_data_type(data_type: impl Into<String>) -> Self {
        Self::new(ErrorClass::UnsupportedDataType, [("data_type", data_type.into())])
    }

    /// A dataset argument is missing or unrecognized
    pub fn invalid_argument(arg_name: impl Into<String>, actual_type: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvalidTypeDfEqualityArg,
            [
                ("expected_type", DATASET_ARG_TYPE.to_string()),
                ("arg_name", arg_name.into()),
                ("actual_type", actual_type.into()),
            ],
        )
    }

    /// Two options that cannot be combined were both enabled
    pub fn conflicting_options(first: &str, second: &str) -> Self {
        Self::new(
            ErrorClass::InvalidComparisonOptions,
            [("options", format!("`{}` and `{}`", first, second))],
        )
    }

    /// Render the class template with the message parameters
    ///
    /// Placeholders are filled in a single pass over the template, so
    /// parameter values are never expanded themselves. Unknown placeholders
    /// are kept as written.
    pub fn message(&self) -> String {
        let template = self.error_class.template();
        let mut message = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find('<') {
            message.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let filled = after.find('>').and_then(|end| {
                self.message_parameters
                    .get(&after[..end])
                    .map(|value| (end, value))
            });
            match filled {
                Some((end, value)) => {
                    message.push_str(value);
                    rest = &after[end + 1..];
                }
                None => {
                    message.push('<');
                    rest = after;
                }
            }
        }
        message.push_str(rest);
        message
    }

    /// Look up a single message parameter
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.message_parameters.get(key).map(String::as_str)
    }
}

impl std::fmt::Display for AssertionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.error_class, self.message())
    }
}

impl std::error::Error for AssertionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_class_stability() {
        // Ensure classes are stable strings
        assert_eq!(ErrorClass::DifferentSchema.as_str(), "DIFFERENT_SCHEMA");
        assert_eq!(ErrorClass::DifferentRows.as_str(), "DIFFERENT_ROWS");
        assert_eq!(
            ErrorClass::InvalidTypeDfEqualityArg.as_str(),
            "INVALID_TYPE_DF_EQUALITY_ARG"
        );
        assert_eq!(ErrorClass::UnsupportedDataType.as_str(), "UNSUPPORTED_DATA_TYPE");
    }

    #[test]
    fn message_fills_template() {
        let err = AssertionError::invalid_argument("actual", "None");
        assert_eq!(
            err.to_string(),
            "[INVALID_TYPE_DF_EQUALITY_ARG] Expected type DataFrame or list of rows for `actual` but got type None."
        );
        assert_eq!(err.parameter("arg_name"), Some("actual"));
    }

    #[test]
    fn parameter_values_are_not_expanded() {
        let err = AssertionError::invalid_argument("actual", "<arg_name>");
        assert_eq!(
            err.message(),
            "Expected type DataFrame or list of rows for `actual` but got type <arg_name>."
        );

        let err = AssertionError::invalid_argument("<expected_type>", "map<string,int>");
        assert_eq!(
            err.message(),
            "Expected type DataFrame or list of rows for `<expected_type>` but got type map<string,int>."
        );
    }

    #[test]
    fn error_serialization() {
        let err = AssertionError::unsupported_data_type("array<int>");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("UNSUPPORTED_DATA_TYPE"));
        assert!(json.contains("array<int>"));
        assert!(!json.contains("diagnostic"));
    }
}
