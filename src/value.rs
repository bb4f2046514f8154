use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// The type every compiled expression is assigned.
///
/// # Examples
///
/// ```
/// use iql_lang::ValueType;
///
/// assert!(ValueType::Integer.is_numeric());
/// assert_eq!(ValueType::Integer.promote(ValueType::Decimal), ValueType::Decimal);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Integer,
    Decimal,
    Text,
    Boolean,
    DateTime,
    /// A whole object of some class, as selected by a bare alias
    ClassReference,
}

impl ValueType {
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueType::Integer | ValueType::Decimal)
    }

    /// Result type of arithmetic on two numeric operands.
    pub fn promote(self, other: ValueType) -> ValueType {
        if self == ValueType::Decimal || other == ValueType::Decimal {
            ValueType::Decimal
        } else {
            ValueType::Integer
        }
    }

    /// Whether values of the two types can be compared with each other.
    pub fn comparable_with(self, other: ValueType) -> bool {
        match (self, other) {
            (a, b) if a.is_numeric() && b.is_numeric() => true,
            (ValueType::Text, ValueType::Text)
            | (ValueType::DateTime, ValueType::DateTime)
            | (ValueType::Boolean, ValueType::Boolean) => true,
            _ => false,
        }
    }

    /// Parse the attribute type names used by JSON model files.
    pub fn from_name(name: &str) -> Option<ValueType> {
        match name.to_ascii_lowercase().as_str() {
            "integer" | "int" | "long" | "short" => Some(ValueType::Integer),
            "decimal" | "float" | "double" | "bigdecimal" => Some(ValueType::Decimal),
            "text" | "string" => Some(ValueType::Text),
            "boolean" | "bool" => Some(ValueType::Boolean),
            "datetime" | "date" => Some(ValueType::DateTime),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueType::Integer => "integer",
            ValueType::Decimal => "decimal",
            ValueType::Text => "text",
            ValueType::Boolean => "boolean",
            ValueType::DateTime => "datetime",
            ValueType::ClassReference => "class",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed literal.
///
/// Integers and decimals keep their written form: `Decimal` preserves scale,
/// so `1.20` prints back as `1.20`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Decimal(Decimal),
    Text(String),
    Boolean(bool),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Integer(_) => ValueType::Integer,
            Value::Decimal(_) => ValueType::Decimal,
            Value::Text(_) => ValueType::Text,
            Value::Boolean(_) => ValueType::Boolean,
            Value::DateTime(_) => ValueType::DateTime,
        }
    }
}
