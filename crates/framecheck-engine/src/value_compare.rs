//! Tolerance-aware value and row equality
//!
//! Approximate equality propagates through arrays, structs and maps, so a
//! single drifted float deep inside a nested value still fails the row.
//! Integers, strings, booleans and the other scalars must match exactly.

use framecheck_core::{Row, Tolerance, Value};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

/// Compare two values; `expected` scales the relative tolerance
///
/// Total over the value domain: never panics, length and kind mismatches
/// resolve to `false`.
pub fn values_equal(actual: &Value, expected: &Value, tolerance: &Tolerance) -> bool {
    match (actual, expected) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,

        (Value::Float(a), Value::Float(b)) => floats_close(*a, *b, tolerance),
        (Value::Decimal(a), Value::Decimal(b)) => decimals_close(*a, *b, tolerance),

        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len()
                && a.iter().zip(b).all(|(x, y)| values_equal(x, y, tolerance))
        }
        (Value::Struct(a), Value::Struct(b)) => records_equal(a, b, tolerance),
        (Value::Map(a), Value::Map(b)) => {
            a.len() == b.len()
                && a.iter().all(|(key, x)| {
                    b.get(key).is_some_and(|y| values_equal(x, y, tolerance))
                })
        }

        // Mixed numeric kinds compare by exact numeric value
        (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
            int_equals_float(*a, *b)
        }
        (Value::Int(a), Value::Decimal(b)) | (Value::Decimal(b), Value::Int(a)) => {
            Decimal::from(*a) == *b
        }

        _ => actual == expected,
    }
}

/// Compare two optional rows; an absent row never equals a present one
pub fn rows_equal(actual: Option<&Row>, expected: Option<&Row>, tolerance: &Tolerance) -> bool {
    match (actual, expected) {
        (None, None) => true,
        (Some(a), Some(b)) => records_equal(a, b, tolerance),
        _ => false,
    }
}

/// Records compare positionally; column names are resolved before this point
fn records_equal(actual: &Row, expected: &Row, tolerance: &Tolerance) -> bool {
    actual.len() == expected.len()
        && actual
            .values()
            .iter()
            .zip(expected.values())
            .all(|(a, b)| values_equal(a, b, tolerance))
}

/// Exact comparison without rounding the integer through `f64`
fn int_equals_float(int: i64, float: f64) -> bool {
    // 2^63 is the first float past i64::MAX
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    float.fract() == 0.0 && (-LIMIT..LIMIT).contains(&float) && float as i64 == int
}

fn floats_close(actual: f64, expected: f64, tolerance: &Tolerance) -> bool {
    if actual.is_nan() || expected.is_nan() {
        return actual.is_nan() && expected.is_nan();
    }
    if actual.is_infinite() || expected.is_infinite() {
        return actual == expected;
    }
    (actual - expected).abs() <= tolerance.atol + tolerance.rtol * expected.abs()
}

fn decimals_close(actual: Decimal, expected: Decimal, tolerance: &Tolerance) -> bool {
    let atol = Decimal::from_f64(tolerance.atol).unwrap_or(Decimal::ZERO);
    let rtol = Decimal::from_f64(tolerance.rtol).unwrap_or(Decimal::ZERO);

    let difference = actual.saturating_sub(expected).abs();
    let bound = atol.saturating_add(rtol.saturating_mul(expected.abs()));
    difference <= bound
}
