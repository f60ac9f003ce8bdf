//! Dataset equality assertion
//!
//! Pipeline: validate options, normalize columns (order, names, types),
//! compare schemas when both sides are frames, materialize and optionally
//! sort rows, then compare row pairs and report mismatches as a diff.

use framecheck_core::fixture::dataset_from_json;
use framecheck_core::{
    AssertionError, ComparisonOptions, Dataset, Diagnostic, DiagnosticKind, ErrorClass, Row, Schema,
    SchemaOptions, Side,
};

use crate::diff::DiffReporter;
use crate::schema_compare::assert_schema_equal;
use crate::value_compare::rows_equal;

/// Report line for the slot of a row one side does not have
const ABSENT_ROW: &str = "None";

/// Assert that two datasets hold the same rows
///
/// `None` stands for a missing argument: two missing arguments are equal,
/// one missing argument is an `INVALID_TYPE_DF_EQUALITY_ARG` error.
pub fn assert_dataframe_equal(
    actual: Option<Dataset<'_>>,
    expected: Option<Dataset<'_>>,
    options: &ComparisonOptions,
) -> Result<(), AssertionError> {
    assert_dataframe_equal_with(actual, expected, options, &DiffReporter::default())
}

/// Like `assert_dataframe_equal`, rendering the row diff through `reporter`
pub fn assert_dataframe_equal_with(
    actual: Option<Dataset<'_>>,
    expected: Option<Dataset<'_>>,
    options: &ComparisonOptions,
    reporter: &DiffReporter,
) -> Result<(), AssertionError> {
    options.validate()?;

    let (actual, expected) = match (actual, expected) {
        (None, None) => return Ok(()),
        (None, Some(_)) => return Err(AssertionError::invalid_argument(Side::Actual.as_str(), "None")),
        (Some(_), None) => return Err(AssertionError::invalid_argument(Side::Expected.as_str(), "None")),
        (Some(actual), Some(expected)) => (actual, expected),
    };

    tracing::debug!(
        actual = actual.kind_name(),
        expected = expected.kind_name(),
        ignore_column_order = options.ignore_column_order,
        ignore_column_name = options.ignore_column_name,
        ignore_column_type = options.ignore_column_type,
        "comparing datasets"
    );

    let actual_plan = ColumnPlan::new(actual.schema(), options);
    let expected_plan = ColumnPlan::new(expected.schema(), options);

    // Column normalization already happened, so only nullability is left to decide
    if let (Some(actual_schema), Some(expected_schema)) = (&actual_plan.schema, &expected_plan.schema) {
        let schema_options = SchemaOptions {
            ignore_nullable: options.ignore_nullable,
            ignore_column_order: false,
            ignore_column_name: false,
        };
        assert_schema_equal(actual_schema, expected_schema, &schema_options)?;
        tracing::debug!(fields = actual_schema.len(), "schemas match");
    }

    let actual_rows = actual_plan.rows(actual.collect(), options);
    let expected_rows = expected_plan.rows(expected.collect(), options);
    tracing::debug!(actual = actual_rows.len(), expected = expected_rows.len(), "rows collected");

    compare_rows(&actual_rows, &expected_rows, options, reporter)
}

/// Assert that two bare row lists hold the same rows
pub fn assert_rows_equal(
    actual: &[Row],
    expected: &[Row],
    options: &ComparisonOptions,
) -> Result<(), AssertionError> {
    assert_dataframe_equal(Some(Dataset::Rows(actual)), Some(Dataset::Rows(expected)), options)
}

/// Assert equality of two datasets described as JSON fixtures
///
/// Accepts the same shapes as `fixture::dataset_from_json`; an argument of
/// any other shape raises `INVALID_TYPE_DF_EQUALITY_ARG` naming the side.
pub fn assert_json_equal(
    actual: &serde_json::Value,
    expected: &serde_json::Value,
    options: &ComparisonOptions,
) -> Result<(), AssertionError> {
    let actual = dataset_from_json(actual, Side::Actual)?;
    let expected = dataset_from_json(expected, Side::Expected)?;
    assert_dataframe_equal(
        actual.as_ref().map(|input| input.as_dataset()),
        expected.as_ref().map(|input| input.as_dataset()),
        options,
    )
}

/// Column normalization derived from one side's schema
struct ColumnPlan {
    schema: Option<Schema>,
    order: Option<Vec<usize>>,
}

impl ColumnPlan {
    fn new(schema: Option<Schema>, options: &ComparisonOptions) -> Self {
        let Some(mut schema) = schema else {
            return Self {
                schema: None,
                order: None,
            };
        };

        let mut order = None;
        if options.ignore_column_order {
            let by_name = schema.name_order();
            schema = schema.select(&by_name);
            order = Some(by_name);
        }
        if options.ignore_column_name {
            schema = schema.renamed_positionally();
        }
        if options.ignore_column_type {
            schema = schema.retyped_to_string();
        }

        Self {
            schema: Some(schema),
            order,
        }
    }

    fn rows(&self, rows: Vec<Row>, options: &ComparisonOptions) -> Vec<Row> {
        let mut rows: Vec<Row> = rows.into_iter().map(|row| self.normalize(row, options)).collect();
        if !options.check_row_order {
            rows.sort_by_cached_key(|row| row.to_string());
        }
        rows
    }

    fn normalize(&self, mut row: Row, options: &ComparisonOptions) -> Row {
        if options.ignore_column_order {
            // Frames follow their schema; bare rows sort by their own names
            row = match (&self.order, row.name_order()) {
                (Some(order), _) => row.select(order),
                (None, Some(order)) => row.select(&order),
                (None, None) => row,
            };
        }
        if options.ignore_column_name {
            row = row.renamed_positionally();
        }
        if options.ignore_column_type {
            row = row.cast_to_string();
        }
        row
    }
}

fn compare_rows(
    actual: &[Row],
    expected: &[Row],
    options: &ComparisonOptions,
    reporter: &DiffReporter,
) -> Result<(), AssertionError> {
    let tolerance = options.tolerance();
    let total = actual.len().max(expected.len());

    let mut mismatched = 0usize;
    let mut actual_lines = Vec::new();
    let mut expected_lines = Vec::new();

    for i in 0..total {
        let (a, e) = (actual.get(i), expected.get(i));
        let equal = rows_equal(a, e, &tolerance);
        if !equal {
            mismatched += 1;
        }
        if !equal || !options.show_only_diff {
            actual_lines.push(a.map_or_else(|| ABSENT_ROW.to_string(), Row::to_string));
            expected_lines.push(e.map_or_else(|| ABSENT_ROW.to_string(), Row::to_string));
        }
        if !equal && options.max_errors.is_some_and(|max| mismatched >= max) {
            tracing::debug!(mismatched, "stopping at max_errors");
            break;
        }
    }

    if mismatched == 0 {
        tracing::debug!(rows = total, "rows match");
        return Ok(());
    }

    let diff = reporter.render_to_string(&actual_lines, &expected_lines, total);
    let diagnostic = Diagnostic::new(DiagnosticKind::RowMismatch, mismatched, total, diff);
    let message = format!(
        "Results do not match: ( {:.5} % )\n{}",
        diagnostic.percent(),
        diagnostic.diff
    );
    tracing::debug!(mismatched, total, "rows differ");

    Err(AssertionError::new(ErrorClass::DifferentRows, [("error_msg", message)]).with_diagnostic(diagnostic))
}
