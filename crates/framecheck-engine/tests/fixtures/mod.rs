//! Test fixtures for dataset assertion integration tests
//!
//! Reusable schemas and frames modelled on common result tables.

#![allow(dead_code)]

use framecheck_core::{DataType, Field, InMemoryFrame, Schema, Value};

/// Payments table schema
///
/// - Identifier (id)
/// - Amount as a double, compared with tolerance
pub fn payments_schema() -> Schema {
    Schema::from_fields(vec![
        Field::new("id", DataType::String).with_nullable(false),
        Field::new("amount", DataType::Double),
    ])
}

/// Payments frame from `(id, amount)` pairs
pub fn payments(rows: &[(&str, f64)]) -> InMemoryFrame {
    InMemoryFrame::from_values(
        payments_schema(),
        rows.iter()
            .map(|(id, amount)| vec![Value::from(*id), Value::from(*amount)])
            .collect(),
    )
}

/// Orders table schema with a decimal total
pub fn orders_schema() -> Schema {
    Schema::from_fields(vec![
        Field::new("id", DataType::Long).with_nullable(false),
        Field::new("customer", DataType::String),
        Field::new("total", DataType::Decimal { precision: 10, scale: 2 }),
    ])
}

/// Nested measurement schema
///
/// - A list of readings per sensor
/// - A struct of calibration metadata
/// - A map of tag values
pub fn measurements_schema() -> Schema {
    Schema::from_fields(vec![
        Field::new("sensor", DataType::String).with_nullable(false),
        Field::new("readings", DataType::array(DataType::Double)),
        Field::new(
            "calibration",
            DataType::structure(vec![
                Field::new("offset", DataType::Double),
                Field::new("verified", DataType::Boolean),
            ]),
        ),
        Field::new("tags", DataType::map(DataType::String, DataType::Double)),
    ])
}

/// Every scalar type once
pub fn all_types_schema() -> Schema {
    Schema::from_fields(vec![
        Field::new("null_col", DataType::Null),
        Field::new("bool_col", DataType::Boolean),
        Field::new("byte_col", DataType::Byte),
        Field::new("short_col", DataType::Short),
        Field::new("int_col", DataType::Integer),
        Field::new("long_col", DataType::Long),
        Field::new("float_col", DataType::Float),
        Field::new("double_col", DataType::Double),
        Field::new("decimal_col", DataType::Decimal { precision: 18, scale: 4 }),
        Field::new("string_col", DataType::String),
        Field::new("binary_col", DataType::Binary),
        Field::new("date_col", DataType::Date),
        Field::new("timestamp_col", DataType::Timestamp),
    ])
}

/// Every fixture schema
pub fn all_schemas() -> Vec<Schema> {
    vec![
        payments_schema(),
        orders_schema(),
        measurements_schema(),
        all_types_schema(),
        Schema::new(),
    ]
}
