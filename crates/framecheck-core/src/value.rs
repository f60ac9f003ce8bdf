//! Values and rows
//!
//! The `Display` impls produce the canonical form used for order-insensitive
//! row alignment and for diff reports. Changing them changes row pairing.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    String(String),
    Binary(Vec<u8>),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Array(Vec<Value>),
    Struct(Row),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Short kind name, used in logs and error parameters
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Decimal(_) => "decimal",
            Self::String(_) => "string",
            Self::Binary(_) => "binary",
            Self::Date(_) => "date",
            Self::Timestamp(_) => "timestamp",
            Self::Array(_) => "array",
            Self::Struct(_) => "struct",
            Self::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Cast to the string representation used when column types are ignored
    ///
    /// Numbers that are integral when viewed as a float render as integers,
    /// so `5.0`, `5` and `5.00` all become `"5"`. Null stays null.
    pub fn cast_to_string(&self) -> Value {
        match self {
            Self::Null => Self::Null,
            other => Self::String(other.cast_text()),
        }
    }

    fn cast_text(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            // Adding zero folds -0.0 into 0.0
            Self::Float(x) if x.is_finite() && x.fract() == 0.0 => format!("{:.0}", x + 0.0),
            Self::Float(x) => x.to_string(),
            Self::Decimal(d) if d.fract().is_zero() => d.trunc().normalize().to_string(),
            Self::Decimal(d) => d.to_string(),
            Self::String(s) => s.clone(),
            Self::Binary(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            Self::Array(items) => {
                let parts: Vec<String> = items.iter().map(Value::cast_text).collect();
                format!("[{}]", parts.join(", "))
            }
            Self::Struct(row) => {
                let parts: Vec<String> = row.values().iter().map(Value::cast_text).collect();
                format!("{{{}}}", parts.join(", "))
            }
            Self::Map(entries) => {
                let parts: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{} -> {}", k, v.cast_text()))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) if x.is_nan() => write!(f, "nan"),
            Self::Float(x) => write!(f, "{:?}", x),
            Self::Decimal(d) => write!(f, "Decimal({})", d),
            Self::String(s) => write_quoted(f, s),
            Self::Binary(bytes) => {
                write!(f, "0x")?;
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            Self::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Self::Struct(row) => write!(f, "{}", row),
            Self::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_quoted(f, k)?;
                    write!(f, ": {}", v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Single-quoted text with `\\`, `'` and control characters escaped
fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "'")?;
    for c in s.chars() {
        match c {
            '\\' => write!(f, "\\\\")?,
            '\'' => write!(f, "\\'")?,
            '\n' => write!(f, "\\n")?,
            '\r' => write!(f, "\\r")?,
            '\t' => write!(f, "\\t")?,
            c if c.is_control() => write!(f, "\\u{{{:x}}}", c as u32)?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "'")
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Row> for Value {
    fn from(v: Row) -> Self {
        Self::Struct(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// An ordered record of values, optionally carrying column names
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    names: Option<Vec<String>>,
    values: Vec<Value>,
}

impl Row {
    /// Create an unnamed row
    pub fn new(values: Vec<Value>) -> Self {
        Self { names: None, values }
    }

    /// Create a row from `(name, value)` pairs
    pub fn named<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let (names, values): (Vec<String>, Vec<Value>) = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self {
            names: Some(names),
            values,
        }
    }

    /// Attach column names; names beyond the value count are dropped
    pub fn with_names(mut self, names: &[String]) -> Self {
        let mut names: Vec<String> = names.iter().take(self.values.len()).cloned().collect();
        while names.len() < self.values.len() {
            names.push(names.len().to_string());
        }
        self.names = Some(names);
        self
    }

    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Look up a value by column name
    pub fn field(&self, name: &str) -> Option<&Value> {
        let names = self.names.as_ref()?;
        let index = names.iter().position(|n| n == name)?;
        self.values.get(index)
    }

    /// Copy with columns rearranged into `order`; out-of-range positions are skipped
    pub fn select(&self, order: &[usize]) -> Row {
        let values = order
            .iter()
            .filter_map(|&i| self.values.get(i).cloned())
            .collect();
        let names = self.names.as_ref().map(|names| {
            order
                .iter()
                .filter_map(|&i| names.get(i).cloned())
                .collect()
        });
        Row { names, values }
    }

    /// Positions of the named columns after a stable sort by name
    pub fn name_order(&self) -> Option<Vec<usize>> {
        let names = self.names.as_ref()?;
        let mut order: Vec<usize> = (0..names.len()).collect();
        order.sort_by(|&a, &b| names[a].cmp(&names[b]));
        Some(order)
    }

    /// Copy with every column renamed to its zero-based position
    pub fn renamed_positionally(&self) -> Row {
        Row {
            names: Some((0..self.values.len()).map(|i| i.to_string()).collect()),
            values: self.values.clone(),
        }
    }

    /// Copy with every value cast to its string representation
    pub fn cast_to_string(&self) -> Row {
        Row {
            names: self.names.clone(),
            values: self.values.iter().map(Value::cast_to_string).collect(),
        }
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row(")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match self.names.as_ref().and_then(|names| names.get(i)) {
                Some(name) => write!(f, "{}={}", name, value)?,
                None => write!(f, "{}", value)?,
            }
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn row_canonical_form() {
        let named = Row::named([("id", Value::from("1")), ("amount", Value::from(1000.0))]);
        assert_eq!(named.to_string(), "Row(id='1', amount=1000.0)");

        let positional = Row::new(vec![Value::from("1"), Value::from(1000.0)]);
        assert_eq!(positional.to_string(), "Row('1', 1000.0)");

        let mixed = Row::new(vec![Value::Int(2), Value::Null, Value::from(vec![1, 2])]);
        assert_eq!(mixed.to_string(), "Row(2, null, [1, 2])");

        let flags = Row::named([
            ("id", Value::from("1")),
            ("ok", Value::from(true)),
            ("n", Value::Null),
        ]);
        assert_eq!(flags.to_string(), "Row(id='1', ok=true, n=null)");
    }

    #[test]
    fn strings_escape_quotes_and_backslashes() {
        assert_eq!(Value::from("it's").to_string(), r"'it\'s'");
        assert_eq!(Value::from(r"a\b").to_string(), r"'a\\b'");
        assert_eq!(Value::from("say \"hi\"").to_string(), r#"'say "hi"'"#);
        assert_eq!(Value::from("a\nb").to_string(), r"'a\nb'");
    }

    #[test]
    fn nested_values_render() {
        let mut map = BTreeMap::new();
        map.insert("k".to_string(), Value::Bool(true));
        let value = Value::Array(vec![Value::Map(map), Value::Binary(vec![0x0a, 0xff])]);
        assert_eq!(value.to_string(), "[{'k': true}, 0x0aff]");
    }

    #[test]
    fn cast_drops_integral_fraction() {
        assert_eq!(Value::Float(5.0).cast_to_string(), Value::from("5"));
        assert_eq!(Value::Int(5).cast_to_string(), Value::from("5"));
        assert_eq!(
            Value::Decimal(Decimal::from_str("5.00").unwrap()).cast_to_string(),
            Value::from("5")
        );
        assert_eq!(Value::Float(5.5).cast_to_string(), Value::from("5.5"));
        assert_eq!(Value::Null.cast_to_string(), Value::Null);
        assert_eq!(Value::Bool(true).cast_to_string(), Value::from("true"));
    }

    #[test]
    fn cast_folds_negative_zero() {
        assert_eq!(Value::Float(-0.0).cast_to_string(), Value::from("0"));
        assert_eq!(Value::Float(0.0).cast_to_string(), Value::from("0"));
        assert_eq!(Value::Float(-3.0).cast_to_string(), Value::from("-3"));
    }

    #[test]
    fn row_reordering_and_renaming() {
        let row = Row::named([("b", 2), ("a", 1)]);
        let order = row.name_order().unwrap();
        assert_eq!(order, vec![1, 0]);

        let sorted = row.select(&order);
        assert_eq!(sorted.to_string(), "Row(a=1, b=2)");
        assert_eq!(sorted.field("b"), Some(&Value::Int(2)));
        assert_eq!(row.renamed_positionally().to_string(), "Row(0=2, 1=1)");
        assert!(Row::new(vec![Value::Int(1)]).name_order().is_none());
    }
}
