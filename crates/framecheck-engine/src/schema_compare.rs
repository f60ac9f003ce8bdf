//! Structural schema comparison
//!
//! Fields are compared pairwise after optional normalization (sort by name,
//! then rename to positions). Types recurse through arrays, maps and structs
//! and nullability is checked at every level unless ignored.

use framecheck_core::{AssertionError, DataType, Diagnostic, DiagnosticKind, ErrorClass, Field, Schema, SchemaOptions};

use crate::diff::DiffReporter;

/// Check schema equality under `options`
pub fn schemas_equal(actual: &Schema, expected: &Schema, options: &SchemaOptions) -> bool {
    let actual = normalize(actual, options);
    let expected = normalize(expected, options);
    fields_equal(&actual.fields, &expected.fields, options.ignore_nullable)
}

/// Assert schema equality, raising `DIFFERENT_SCHEMA` with a field diff
pub fn assert_schema_equal(
    actual: &Schema,
    expected: &Schema,
    options: &SchemaOptions,
) -> Result<(), AssertionError> {
    let actual = normalize(actual, options);
    let expected = normalize(expected, options);

    if fields_equal(&actual.fields, &expected.fields, options.ignore_nullable) {
        return Ok(());
    }

    let total = actual.len().max(expected.len());
    let mismatched = (0..total)
        .filter(|&i| match (actual.fields.get(i), expected.fields.get(i)) {
            (Some(a), Some(b)) => !field_equal(a, b, options.ignore_nullable),
            _ => true,
        })
        .count();

    // Nullability the policy ignores is left out of the rendering
    let (actual_lines, expected_lines) = if options.ignore_nullable {
        (
            erase_nullability(&actual).to_lines(),
            erase_nullability(&expected).to_lines(),
        )
    } else {
        (actual.to_lines(), expected.to_lines())
    };
    let diff = DiffReporter::default().render_to_string(&actual_lines, &expected_lines, total);

    tracing::debug!(mismatched, total, "schemas differ");

    Err(
        AssertionError::new(ErrorClass::DifferentSchema, [("error_msg", diff.clone())])
            .with_diagnostic(Diagnostic::new(DiagnosticKind::SchemaMismatch, mismatched, total, diff)),
    )
}

/// Assert equality of two raw types; both must be struct types
pub fn assert_schema_type_equal(
    actual: &DataType,
    expected: &DataType,
    options: &SchemaOptions,
) -> Result<(), AssertionError> {
    let actual = Schema::try_from(actual.clone())?;
    let expected = Schema::try_from(expected.clone())?;
    assert_schema_equal(&actual, &expected, options)
}

fn normalize(schema: &Schema, options: &SchemaOptions) -> Schema {
    let mut schema = schema.clone();
    if options.ignore_column_order {
        schema = schema.sorted_by_name();
    }
    if options.ignore_column_name {
        schema = schema.renamed_positionally();
    }
    schema
}

fn fields_equal(actual: &[Field], expected: &[Field], ignore_nullable: bool) -> bool {
    actual.len() == expected.len()
        && actual
            .iter()
            .zip(expected)
            .all(|(a, b)| field_equal(a, b, ignore_nullable))
}

fn field_equal(actual: &Field, expected: &Field, ignore_nullable: bool) -> bool {
    actual.name == expected.name
        && (ignore_nullable || actual.nullable == expected.nullable)
        && types_equal(&actual.data_type, &expected.data_type, ignore_nullable)
}

fn types_equal(actual: &DataType, expected: &DataType, ignore_nullable: bool) -> bool {
    match (actual, expected) {
        (
            DataType::Array {
                element_type: a,
                contains_null: a_null,
            },
            DataType::Array {
                element_type: b,
                contains_null: b_null,
            },
        ) => (ignore_nullable || a_null == b_null) && types_equal(a, b, ignore_nullable),
        (
            DataType::Map {
                key_type: ak,
                value_type: av,
                value_contains_null: a_null,
            },
            DataType::Map {
                key_type: bk,
                value_type: bv,
                value_contains_null: b_null,
            },
        ) => {
            (ignore_nullable || a_null == b_null)
                && types_equal(ak, bk, ignore_nullable)
                && types_equal(av, bv, ignore_nullable)
        }
        (DataType::Struct { fields: a }, DataType::Struct { fields: b }) => {
            fields_equal(a, b, ignore_nullable)
        }
        _ => actual == expected,
    }
}

fn erase_nullability(schema: &Schema) -> Schema {
    Schema::from_fields(schema.fields.iter().map(erase_field_nullability).collect())
}

fn erase_field_nullability(field: &Field) -> Field {
    Field::new(field.name.clone(), erase_type_nullability(&field.data_type))
}

fn erase_type_nullability(data_type: &DataType) -> DataType {
    match data_type {
        DataType::Array { element_type, .. } => DataType::array(erase_type_nullability(element_type)),
        DataType::Map { key_type, value_type, .. } => {
            DataType::map(erase_type_nullability(key_type), erase_type_nullability(value_type))
        }
        DataType::Struct { fields } => {
            DataType::structure(fields.iter().map(erase_field_nullability).collect())
        }
        other => other.clone(),
    }
}
