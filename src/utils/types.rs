use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::error::{ReportError, ReportResult};

/// In-memory table produced by a connector and consumed by the renderer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularData {
    pub columns: Vec<ColumnMetadata>,
    pub rows: Vec<Row>,
}

/// Metadata for a column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMetadata {
    pub name: String,
    pub data_type: DataType,
}

/// Supported data types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DataType {
    Text,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
    Binary,
}

/// A row of data
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub values: Vec<Value>,
}

/// Individual cell values
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(String),      // ISO 8601 format
    DateTime(String),  // ISO 8601 format
    Binary(Vec<u8>),
    Null,
}

/// Connector types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectorType {
    Csv,
    Excel,
    PostgreSQL,
    SqlServer,
}

impl ColumnMetadata {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

impl TabularData {
    /// Create an empty table with the given columns
    pub fn new(columns: Vec<ColumnMetadata>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Create a table of text columns from plain names
    pub fn with_column_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            names
                .into_iter()
                .map(|name| ColumnMetadata::new(name, DataType::Text))
                .collect(),
        )
    }

    /// Append a row, rejecting rows whose width differs from the column count
    pub fn push_row(&mut self, row: Row) -> ReportResult<()> {
        if row.values.len() != self.columns.len() {
            return Err(ReportError::read_failure(format!(
                "Row {} has {} values, expected {}",
                self.rows.len() + 1,
                row.values.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append every row from `other`; both tables must share the same columns
    pub fn append(&mut self, other: TabularData) -> ReportResult<()> {
        if other.columns.len() != self.columns.len() {
            return Err(ReportError::read_failure(format!(
                "Cannot append a table with {} columns to one with {}",
                other.columns.len(),
                self.columns.len()
            )));
        }
        self.rows.extend(other.rows);
        Ok(())
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Values of the named column, top to bottom
    pub fn column_values<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a Value> + 'a> {
        let index = self.columns.iter().position(|c| c.name == name)?;
        Some(self.rows.iter().map(move |row| &row.values[index]))
    }
}

impl Row {
    /// Create a new row with the given values
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Get a value by column index
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }
}

impl Value {
    /// Infer a value from a raw text field
    pub fn infer(field: &str) -> Self {
        if field.is_empty() {
            Value::Null
        } else if let Ok(int_val) = field.parse::<i64>() {
            Value::Integer(int_val)
        } else if is_integer_literal(field) {
            // Too wide for i64; going through f64 would change the digits
            Value::Text(field.to_string())
        } else if let Ok(float_val) = field.parse::<f64>() {
            Value::Float(float_val)
        } else if let Ok(bool_val) = field.parse::<bool>() {
            Value::Boolean(bool_val)
        } else {
            Value::Text(field.to_string())
        }
    }

    /// Interpret a textual field according to a declared column type
    pub fn from_text(field: &str, data_type: DataType) -> Self {
        match data_type {
            DataType::Integer => field
                .parse::<i64>()
                .map(Value::Integer)
                .unwrap_or_else(|_| Value::Text(field.to_string())),
            DataType::Float => field
                .parse::<f64>()
                .map(Value::Float)
                .unwrap_or_else(|_| Value::Text(field.to_string())),
            DataType::Boolean => match field {
                "t" | "true" | "1" => Value::Boolean(true),
                "f" | "false" | "0" => Value::Boolean(false),
                _ => Value::Text(field.to_string()),
            },
            DataType::Binary => decode_bytea_hex(field)
                .map(Value::Binary)
                .unwrap_or_else(|| Value::Text(field.to_string())),
            DataType::Date => Value::Date(field.to_string()),
            DataType::DateTime => Value::DateTime(field.to_string()),
            DataType::Text => Value::Text(field.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) | Value::Date(s) | Value::DateTime(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => format_float(*x, f),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Binary(bytes) => {
                f.write_str("0x")?;
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            Value::Null => Ok(()),
        }
    }
}

/// Optional sign followed by digits only
fn is_integer_literal(field: &str) -> bool {
    let digits = field.strip_prefix(['+', '-']).unwrap_or(field);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// PostgreSQL `bytea` hex output: `\x` followed by pairs of hex digits
fn decode_bytea_hex(field: &str) -> Option<Vec<u8>> {
    let hex = field.strip_prefix("\\x")?;
    if hex.len() % 2 != 0 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

// Plain notation between 1e-4 and 1e16, scientific outside it. The mantissa
// always carries a decimal point, so integral values print as 2.0 or 1.0e16.
fn format_float(x: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if !x.is_finite() {
        return write!(f, "{}", x);
    }

    let magnitude = x.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let scientific = format!("{:e}", x);
        return match scientific.split_once('e') {
            Some((mantissa, exponent)) if !mantissa.contains('.') => write!(f, "{}.0e{}", mantissa, exponent),
            _ => f.write_str(&scientific),
        };
    }

    if x.fract() == 0.0 {
        write!(f, "{:.1}", x)
    } else {
        write!(f, "{}", x)
    }
}

impl fmt::Display for ConnectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectorType::Csv => write!(f, "CSV"),
            ConnectorType::Excel => write!(f, "Excel"),
            ConnectorType::PostgreSQL => write!(f, "PostgreSQL"),
            ConnectorType::SqlServer => write!(f, "SQL Server"),
        }
    }
}
