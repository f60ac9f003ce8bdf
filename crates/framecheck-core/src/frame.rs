//! Dataset sources consumed by the dataset assertion
//!
//! The execution engine that produces rows is external; it is seen only
//! through the `DataFrame` trait. `InMemoryFrame` is the in-crate
//! implementation used by fixtures and tests.

use crate::schema::Schema;
use crate::value::{Row, Value};

/// Which argument of an assertion a value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Actual,
    Expected,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Actual => "actual",
            Self::Expected => "expected",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A dataset with a schema, materialized on demand
///
/// Both calls are synchronous and reflect the source's state at call time.
/// The assertion calls `collect` at most once per side.
pub trait DataFrame {
    /// Ordered field list
    fn schema(&self) -> Schema;

    /// Materialize every row
    fn collect(&self) -> Vec<Row>;
}

/// A dataset held in memory
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InMemoryFrame {
    schema: Schema,
    rows: Vec<Row>,
}

impl InMemoryFrame {
    /// Create a frame; rows take their column names from the schema
    pub fn new(schema: Schema, rows: Vec<Row>) -> Self {
        let names: Vec<String> = schema.fields.iter().map(|f| f.name.clone()).collect();
        let rows = rows.into_iter().map(|row| row.with_names(&names)).collect();
        Self { schema, rows }
    }

    /// Create a frame from raw value lists
    pub fn from_values(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self::new(schema, rows.into_iter().map(Row::new).collect())
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

impl DataFrame for InMemoryFrame {
    fn schema(&self) -> Schema {
        self.schema.clone()
    }

    fn collect(&self) -> Vec<Row> {
        self.rows.clone()
    }
}

/// Borrowed view of one assertion argument
#[derive(Clone, Copy)]
pub enum Dataset<'a> {
    /// A dataset exposing a schema
    Frame(&'a dyn DataFrame),

    /// A bare list of rows; skips schema comparison
    Rows(&'a [Row]),
}

impl<'a> Dataset<'a> {
    /// View any `DataFrame` implementation
    pub fn frame(frame: &'a dyn DataFrame) -> Self {
        Self::Frame(frame)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Frame(_) => "DataFrame",
            Self::Rows(_) => "list of rows",
        }
    }

    /// Schema, when this side exposes one
    pub fn schema(&self) -> Option<Schema> {
        match self {
            Self::Frame(frame) => Some(frame.schema()),
            Self::Rows(_) => None,
        }
    }

    /// Materialize rows
    pub fn collect(&self) -> Vec<Row> {
        match self {
            Self::Frame(frame) => frame.collect(),
            Self::Rows(rows) => rows.to_vec(),
        }
    }
}

impl std::fmt::Debug for Dataset<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Frame(frame) => f.debug_tuple("Frame").field(&frame.schema()).finish(),
            Self::Rows(rows) => f.debug_tuple("Rows").field(&rows.len()).finish(),
        }
    }
}

impl<'a> From<&'a InMemoryFrame> for Dataset<'a> {
    fn from(frame: &'a InMemoryFrame) -> Self {
        Self::Frame(frame)
    }
}

impl<'a> From<&'a [Row]> for Dataset<'a> {
    fn from(rows: &'a [Row]) -> Self {
        Self::Rows(rows)
    }
}

impl<'a> From<&'a Vec<Row>> for Dataset<'a> {
    fn from(rows: &'a Vec<Row>) -> Self {
        Self::Rows(rows.as_slice())
    }
}

/// Owned assertion argument, as loaded from a fixture
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetInput {
    Frame(InMemoryFrame),
    Rows(Vec<Row>),
}

impl DatasetInput {
    /// Borrow as a `Dataset`
    pub fn as_dataset(&self) -> Dataset<'_> {
        match self {
            Self::Frame(frame) => Dataset::Frame(frame),
            Self::Rows(rows) => Dataset::Rows(rows),
        }
    }
}
