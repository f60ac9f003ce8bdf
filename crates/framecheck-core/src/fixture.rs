//! JSON fixtures
//!
//! Expected datasets are often kept as JSON next to the tests. A fixture is
//! either a list of rows (arrays or objects) or a frame object:
//!
//! ```json
//! {
//!   "schema": {"type": "struct", "fields": [
//!     {"name": "id", "data_type": {"type": "string"}},
//!     {"name": "amount", "data_type": {"type": "decimal", "precision": 10, "scale": 2}}
//!   ]},
//!   "rows": [["1", "1000.00"], {"id": "2", "amount": 3000}]
//! }
//! ```
//!
//! When a schema is present, values are coerced to the declared types where
//! possible (decimal strings, ISO dates, RFC 3339 timestamps, byte arrays).

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value as Json;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::AssertionError;
use crate::frame::{DatasetInput, InMemoryFrame, Side};
use crate::schema::{DataType, Field, Schema};
use crate::value::{Row, Value};

/// JSON kind name, used in argument errors
pub fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

/// Convert JSON without type information
pub fn value_from_json(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::Array(items.iter().map(value_from_json).collect()),
        Json::Object(entries) => Value::Map(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), value_from_json(v)))
                .collect(),
        ),
    }
}

/// Convert JSON guided by a declared type
///
/// Falls back to `value_from_json` when the JSON does not fit the type.
pub fn typed_value_from_json(json: &Json, data_type: &DataType) -> Value {
    let coerced = match (data_type, json) {
        (_, Json::Null) => Some(Value::Null),
        (DataType::Float | DataType::Double, Json::Number(n)) => n.as_f64().map(Value::Float),
        (
            DataType::Byte | DataType::Short | DataType::Integer | DataType::Long,
            Json::Number(n),
        ) => n.as_i64().map(Value::Int),
        (DataType::Decimal { .. }, Json::Number(n)) => {
            Decimal::from_str(&n.to_string()).ok().map(Value::Decimal)
        }
        (DataType::Decimal { .. }, Json::String(s)) => {
            Decimal::from_str(s).ok().map(Value::Decimal)
        }
        (DataType::Date, Json::String(s)) => {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().map(Value::Date)
        }
        (DataType::Timestamp, Json::String(s)) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|ts| Value::Timestamp(ts.with_timezone(&Utc))),
        (DataType::Binary, Json::Array(items)) => items
            .iter()
            .map(|item| item.as_u64().and_then(|b| u8::try_from(b).ok()))
            .collect::<Option<Vec<u8>>>()
            .map(Value::Binary),
        (DataType::Array { element_type, .. }, Json::Array(items)) => Some(Value::Array(
            items
                .iter()
                .map(|item| typed_value_from_json(item, element_type))
                .collect(),
        )),
        (DataType::Map { value_type, .. }, Json::Object(entries)) => Some(Value::Map(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), typed_value_from_json(v, value_type)))
                .collect::<BTreeMap<_, _>>(),
        )),
        (DataType::Struct { fields }, Json::Array(_) | Json::Object(_)) => {
            typed_row(json, fields).map(Value::Struct)
        }
        _ => None,
    };

    coerced.unwrap_or_else(|| value_from_json(json))
}

fn typed_row(json: &Json, fields: &[Field]) -> Option<Row> {
    match json {
        Json::Array(items) => {
            let values = items
                .iter()
                .enumerate()
                .map(|(i, item)| match fields.get(i) {
                    Some(field) => typed_value_from_json(item, &field.data_type),
                    None => value_from_json(item),
                })
                .collect();
            let names: Vec<String> = fields.iter().map(|f| f.name.clone()).collect();
            Some(Row::new(values).with_names(&names))
        }
        Json::Object(entries) => Some(Row::named(fields.iter().map(|field| {
            let value = entries
                .get(&field.name)
                .map_or(Value::Null, |v| typed_value_from_json(v, &field.data_type));
            (field.name.clone(), value)
        }))),
        _ => None,
    }
}

/// Convert one JSON row; arrays are positional, objects are named
pub fn row_from_json(json: &Json, fields: Option<&[Field]>, side: Side) -> Result<Row, AssertionError> {
    if let Some(fields) = fields {
        if let Some(row) = typed_row(json, fields) {
            return Ok(row);
        }
    }

    match json {
        Json::Array(items) => Ok(Row::new(items.iter().map(value_from_json).collect())),
        Json::Object(entries) => Ok(Row::named(
            entries.iter().map(|(k, v)| (k.clone(), value_from_json(v))),
        )),
        other => Err(AssertionError::invalid_argument(
            side.as_str(),
            format!("list containing {}", json_kind(other)),
        )),
    }
}

/// Parse a struct schema from JSON
pub fn schema_from_json(json: &Json) -> Result<Schema, AssertionError> {
    let data_type: DataType = serde_json::from_value(json.clone())
        .map_err(|_| AssertionError::unsupported_data_type(json.to_string()))?;
    Schema::try_from(data_type)
}

/// Convert one assertion argument
///
/// `null` yields `None`, which the assertion treats as a missing argument.
pub fn dataset_from_json(json: &Json, side: Side) -> Result<Option<DatasetInput>, AssertionError> {
    match json {
        Json::Null => Ok(None),
        Json::Array(items) => {
            let rows = items
                .iter()
                .map(|item| row_from_json(item, None, side))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(DatasetInput::Rows(rows)))
        }
        Json::Object(entries) => {
            let (schema_json, rows_json) = match (entries.get("schema"), entries.get("rows")) {
                (Some(schema), Some(rows)) => (schema, rows),
                _ => return Err(AssertionError::invalid_argument(side.as_str(), "object")),
            };

            let schema = schema_from_json(schema_json)?;
            let items = rows_json.as_array().ok_or_else(|| {
                AssertionError::invalid_argument(
                    side.as_str(),
                    format!("frame with {} rows", json_kind(rows_json)),
                )
            })?;
            let rows = items
                .iter()
                .map(|item| row_from_json(item, Some(&schema.fields), side))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(Some(DatasetInput::Frame(InMemoryFrame::new(schema, rows))))
        }
        other => Err(AssertionError::invalid_argument(side.as_str(), json_kind(other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;
    use crate::frame::DataFrame;
    use serde_json::json;

    #[test]
    fn untyped_values() {
        assert_eq!(value_from_json(&json!(5)), Value::Int(5));
        assert_eq!(value_from_json(&json!(5.5)), Value::Float(5.5));
        assert_eq!(
            value_from_json(&json!([1, "a", null])),
            Value::Array(vec![Value::Int(1), Value::from("a"), Value::Null])
        );
    }

    #[test]
    fn typed_values_follow_schema() {
        let decimal = DataType::Decimal { precision: 10, scale: 2 };
        assert_eq!(
            typed_value_from_json(&json!("1000.50"), &decimal),
            Value::Decimal(Decimal::from_str("1000.50").unwrap())
        );
        assert_eq!(typed_value_from_json(&json!(3), &DataType::Double), Value::Float(3.0));
        assert_eq!(
            typed_value_from_json(&json!("2024-01-02"), &DataType::Date),
            Value::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
        );
        // Unparseable input keeps its JSON shape
        assert_eq!(
            typed_value_from_json(&json!("soon"), &DataType::Date),
            Value::from("soon")
        );
    }

    #[test]
    fn list_fixture_is_bare_rows() {
        let input = dataset_from_json(&json!([[1, "A"], {"id": 2, "name": "B"}]), Side::Actual)
            .unwrap()
            .unwrap();

        match input {
            DatasetInput::Rows(rows) => {
                assert_eq!(rows[0].to_string(), "Row(1, 'A')");
                assert_eq!(rows[1].to_string(), "Row(id=2, name='B')");
            }
            other => panic!("expected rows, got {:?}", other),
        }
    }

    #[test]
    fn frame_fixture_uses_schema() {
        let input = dataset_from_json(
            &json!({
                "schema": {"type": "struct", "fields": [
                    {"name": "id", "data_type": {"type": "string"}},
                    {"name": "amount", "data_type": {"type": "double"}}
                ]},
                "rows": [["1", 1000], {"amount": 3000, "id": "2"}]
            }),
            Side::Expected,
        )
        .unwrap()
        .unwrap();

        let DatasetInput::Frame(frame) = input else {
            panic!("expected a frame");
        };
        let rows = frame.collect();
        assert_eq!(rows[0].to_string(), "Row(id='1', amount=1000.0)");
        assert_eq!(rows[1].to_string(), "Row(id='2', amount=3000.0)");
    }

    #[test]
    fn null_fixture_is_missing() {
        assert!(dataset_from_json(&Json::Null, Side::Actual).unwrap().is_none());
    }

    #[test]
    fn scalar_fixture_is_rejected() {
        let err = dataset_from_json(&json!(42), Side::Expected).unwrap_err();
        assert_eq!(err.error_class, ErrorClass::InvalidTypeDfEqualityArg);
        assert_eq!(err.parameter("arg_name"), Some("expected"));
        assert_eq!(err.parameter("actual_type"), Some("number"));

        let err = dataset_from_json(&json!([1, 2]), Side::Actual).unwrap_err();
        assert_eq!(err.parameter("actual_type"), Some("list containing number"));
    }

    #[test]
    fn non_struct_schema_is_unsupported() {
        let err = dataset_from_json(
            &json!({"schema": {"type": "array", "element_type": {"type": "integer"}}, "rows": []}),
            Side::Actual,
        )
        .unwrap_err();
        assert_eq!(err.error_class, ErrorClass::UnsupportedDataType);
        assert_eq!(err.parameter("data_type"), Some("array<int>"));
    }
}
