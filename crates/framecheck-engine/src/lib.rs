//! framecheck engine - comparison and reporting
//!
//! This crate implements the assertion logic:
//! - Recursive tolerance-aware value comparison
//! - Schema comparison
//! - Grouped actual/expected diff rendering
//! - Dataset equality assertion
//! - Deadline-bounded condition polling

pub mod value_compare;
pub mod schema_compare;
pub mod diff;
pub mod dataset;
pub mod retry;

pub use value_compare::{rows_equal, values_equal};
pub use schema_compare::{assert_schema_equal, assert_schema_type_equal, schemas_equal};
pub use diff::{ColorSink, DiffReporter, NoColor, Opcode, Tag, TerminalColor};
pub use dataset::{assert_dataframe_equal, assert_dataframe_equal_with, assert_json_equal, assert_rows_equal};
pub use retry::{eventually, Attempt, Eventually, RetryError};
