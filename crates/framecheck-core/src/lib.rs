//! framecheck core
//!
//! Data model shared by every comparison: schemas, values, rows,
//! structured assertion failures and comparison options.
//! Never rename error classes - they are part of the public API.

pub mod error;
pub mod schema;
pub mod value;
pub mod diagnostic;
pub mod config;
pub mod frame;
pub mod fixture;

pub use error::{AssertionError, ErrorClass};
pub use schema::{DataType, Field, Schema};
pub use value::{Row, Value};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use config::{ComparisonOptions, ConfigError, SchemaOptions, Tolerance};
pub use frame::{DataFrame, Dataset, DatasetInput, InMemoryFrame, Side};
