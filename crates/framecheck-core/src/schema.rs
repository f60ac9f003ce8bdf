//! Schema types and canonical type rendering

use serde::{Deserialize, Serialize};

use crate::error::AssertionError;

fn default_true() -> bool {
    true
}

/// Recursive structural type descriptor
///
/// Width and precision are part of a type's identity: `Integer` and `Long`
/// are different types, as are `decimal(10,2)` and `decimal(12,2)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DataType {
    /// Type of a column that only holds nulls
    Null,

    /// Boolean type
    Boolean,

    /// 8-bit integer
    Byte,

    /// 16-bit integer
    Short,

    /// 32-bit integer
    Integer,

    /// 64-bit integer
    Long,

    /// 32-bit floating point
    Float,

    /// 64-bit floating point
    Double,

    /// Fixed-point decimal with precision and scale
    Decimal {
        precision: u8,
        scale: u8,
    },

    /// UTF-8 string
    String,

    /// Raw bytes
    Binary,

    /// Calendar date
    Date,

    /// Instant in UTC
    Timestamp,

    /// Ordered sequence of one element type
    Array {
        element_type: Box<DataType>,
        #[serde(default = "default_true")]
        contains_null: bool,
    },

    /// String-keyed mapping
    Map {
        key_type: Box<DataType>,
        value_type: Box<DataType>,
        #[serde(default = "default_true")]
        value_contains_null: bool,
    },

    /// Structured type with named fields
    Struct {
        fields: Vec<Field>,
    },
}

impl DataType {
    /// Array type whose elements may be null
    pub fn array(element_type: DataType) -> Self {
        Self::Array {
            element_type: Box::new(element_type),
            contains_null: true,
        }
    }

    /// Map type whose values may be null
    pub fn map(key_type: DataType, value_type: DataType) -> Self {
        Self::Map {
            key_type: Box::new(key_type),
            value_type: Box::new(value_type),
            value_contains_null: true,
        }
    }

    /// Struct type from fields
    pub fn structure(fields: Vec<Field>) -> Self {
        Self::Struct { fields }
    }

    /// Type name without parameters, e.g. `decimal` or `array`
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "void",
            Self::Boolean => "boolean",
            Self::Byte => "tinyint",
            Self::Short => "smallint",
            Self::Integer => "int",
            Self::Long => "bigint",
            Self::Float => "float",
            Self::Double => "double",
            Self::Decimal { .. } => "decimal",
            Self::String => "string",
            Self::Binary => "binary",
            Self::Date => "date",
            Self::Timestamp => "timestamp",
            Self::Array { .. } => "array",
            Self::Map { .. } => "map",
            Self::Struct { .. } => "struct",
        }
    }
}

fn not_null_suffix(nullable: bool) -> &'static str {
    if nullable {
        ""
    } else {
        " not null"
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decimal { precision, scale } => write!(f, "decimal({},{})", precision, scale),
            Self::Array { element_type, contains_null } => {
                write!(f, "array<{}{}>", element_type, not_null_suffix(*contains_null))
            }
            Self::Map { key_type, value_type, value_contains_null } => write!(
                f,
                "map<{},{}{}>",
                key_type,
                value_type,
                not_null_suffix(*value_contains_null)
            ),
            Self::Struct { fields } => {
                write!(f, "struct<")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(
                        f,
                        "{}:{}{}",
                        field.name,
                        field.data_type,
                        not_null_suffix(field.nullable)
                    )?;
                }
                write!(f, ">")
            }
            other => write!(f, "{}", other.type_name()),
        }
    }
}

/// A named, typed field in a schema
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    /// Field name
    pub name: String,

    /// Field type
    pub data_type: DataType,

    /// Whether the field may hold nulls
    #[serde(default = "default_true")]
    pub nullable: bool,
}

impl Field {
    /// Create a new nullable field
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
        }
    }

    /// Set nullability
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}{}", self.name, self.data_type, not_null_suffix(self.nullable))
    }
}

/// An ordered collection of fields
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Ordered list of fields
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new empty schema
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Create a schema from fields
    pub fn from_fields(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Find a field by name
    pub fn find_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get field names
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Positions of the fields after a stable sort by name
    pub fn name_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.fields.len()).collect();
        order.sort_by(|&a, &b| self.fields[a].name.cmp(&self.fields[b].name));
        order
    }

    /// Copy with fields rearranged into `order`
    pub fn select(&self, order: &[usize]) -> Schema {
        Schema::from_fields(order.iter().map(|&i| self.fields[i].clone()).collect())
    }

    /// Copy with fields sorted by name
    pub fn sorted_by_name(&self) -> Schema {
        self.select(&self.name_order())
    }

    /// Copy with every field renamed to its zero-based position
    pub fn renamed_positionally(&self) -> Schema {
        Schema::from_fields(
            self.fields
                .iter()
                .enumerate()
                .map(|(i, f)| Field {
                    name: i.to_string(),
                    ..f.clone()
                })
                .collect(),
        )
    }

    /// Copy with every field retyped to a nullable string
    pub fn retyped_to_string(&self) -> Schema {
        Schema::from_fields(
            self.fields
                .iter()
                .map(|f| Field::new(f.name.clone(), DataType::String))
                .collect(),
        )
    }

    /// Canonical rendering, one field per line
    pub fn to_lines(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.to_string()).collect()
    }

    /// View this schema as a struct type
    pub fn to_data_type(&self) -> DataType {
        DataType::Struct {
            fields: self.fields.clone(),
        }
    }
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_data_type())
    }
}

impl TryFrom<DataType> for Schema {
    type Error = AssertionError;

    fn try_from(data_type: DataType) -> Result<Self, Self::Error> {
        match data_type {
            DataType::Struct { fields } => Ok(Schema::from_fields(fields)),
            other => Err(AssertionError::unsupported_data_type(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;

    #[test]
    fn data_type_display() {
        assert_eq!(DataType::Long.to_string(), "bigint");
        assert_eq!(
            DataType::Decimal { precision: 10, scale: 2 }.to_string(),
            "decimal(10,2)"
        );
        assert_eq!(DataType::array(DataType::Double).to_string(), "array<double>");
        assert_eq!(
            DataType::Array {
                element_type: Box::new(DataType::Double),
                contains_null: false,
            }
            .to_string(),
            "array<double not null>"
        );
        assert_eq!(
            DataType::map(DataType::String, DataType::Integer).to_string(),
            "map<string,int>"
        );
        assert_eq!(
            DataType::structure(vec![
                Field::new("a", DataType::Integer),
                Field::new("b", DataType::String).with_nullable(false),
            ])
            .to_string(),
            "struct<a:int,b:string not null>"
        );
    }

    #[test]
    fn schema_operations() {
        let schema = Schema::from_fields(vec![
            Field::new("id", DataType::Long),
            Field::new("amount", DataType::Double),
        ]);

        assert_eq!(schema.field_names(), vec!["id", "amount"]);
        assert!(schema.find_field("id").is_some());
        assert!(schema.find_field("nonexistent").is_none());
        assert_eq!(schema.sorted_by_name().field_names(), vec!["amount", "id"]);
        assert_eq!(schema.renamed_positionally().field_names(), vec!["0", "1"]);
        assert_eq!(schema.to_lines(), vec!["id: bigint", "amount: double"]);
    }

    #[test]
    fn non_struct_type_is_not_a_schema() {
        let err = Schema::try_from(DataType::array(DataType::Integer)).unwrap_err();
        assert_eq!(err.error_class, ErrorClass::UnsupportedDataType);
        assert_eq!(err.parameter("data_type"), Some("array<int>"));
    }

    #[test]
    fn data_type_from_json() {
        let json = r#"{"type": "struct", "fields": [
            {"name": "names", "data_type": {"type": "array", "element_type": {"type": "double"}}},
            {"name": "total", "data_type": {"type": "decimal", "precision": 10, "scale": 2}, "nullable": false}
        ]}"#;
        let parsed: DataType = serde_json::from_str(json).unwrap();
        let schema = Schema::try_from(parsed).unwrap();

        assert_eq!(schema.fields[0].data_type, DataType::array(DataType::Double));
        assert!(schema.fields[0].nullable);
        assert!(!schema.fields[1].nullable);
    }
}
