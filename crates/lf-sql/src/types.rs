//! Canonical SQL type tags
//!
//! Lineage reports carry a single canonical tag per output column. Declared
//! schema types come in two vocabularies: the short data-frame style names
//! (`str`, `int64`, `float64`, `bool`, ...) and ordinary SQL type names
//! (`VARCHAR(32)`, `DECIMAL(10,2)`, `INT64`, ...). Both normalise here.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Canonical type tag of an inferred output column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    /// BOOL
    Bool,
    /// TINYINT (8-bit)
    TinyInt,
    /// SMALLINT (16-bit)
    SmallInt,
    /// INT (32-bit)
    Int,
    /// BIGINT (64-bit)
    BigInt,
    /// FLOAT (32-bit)
    Float,
    /// DOUBLE (64-bit)
    Double,
    /// DECIMAL / NUMERIC
    Decimal,
    /// TEXT, the type of declared string columns
    Text,
    /// VARCHAR, the type of string literals
    Varchar,
    /// CHAR
    Char,
    /// DATE
    Date,
    /// TIME
    Time,
    /// DATETIME
    Datetime,
    /// TIMESTAMP
    Timestamp,
    /// INTERVAL
    Interval,
    /// BINARY / BYTES
    Binary,
    /// JSON
    Json,
    /// UUID
    Uuid,
    /// Type could not be determined
    Unknown,
}

impl TypeTag {
    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Bool => "BOOL",
            TypeTag::TinyInt => "TINYINT",
            TypeTag::SmallInt => "SMALLINT",
            TypeTag::Int => "INT",
            TypeTag::BigInt => "BIGINT",
            TypeTag::Float => "FLOAT",
            TypeTag::Double => "DOUBLE",
            TypeTag::Decimal => "DECIMAL",
            TypeTag::Text => "TEXT",
            TypeTag::Varchar => "VARCHAR",
            TypeTag::Char => "CHAR",
            TypeTag::Date => "DATE",
            TypeTag::Time => "TIME",
            TypeTag::Datetime => "DATETIME",
            TypeTag::Timestamp => "TIMESTAMP",
            TypeTag::Interval => "INTERVAL",
            TypeTag::Binary => "BINARY",
            TypeTag::Json => "JSON",
            TypeTag::Uuid => "UUID",
            TypeTag::Unknown => "UNKNOWN",
        }
    }

    /// Returns true for the integer family
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            TypeTag::TinyInt | TypeTag::SmallInt | TypeTag::Int | TypeTag::BigInt
        )
    }

    /// Returns true for FLOAT and DOUBLE
    pub fn is_float(&self) -> bool {
        matches!(self, TypeTag::Float | TypeTag::Double)
    }

    /// Returns true if this type is unknown
    pub fn is_unknown(&self) -> bool {
        matches!(self, TypeTag::Unknown)
    }

    /// Map a declared schema type to its canonical tag.
    ///
    /// Short data-frame style names are tried first, then SQL type names.
    /// Anything unrecognised maps to [`TypeTag::Unknown`].
    pub fn from_declared(declared: &str) -> TypeTag {
        let lower = declared.trim().to_ascii_lowercase();
        match lower.as_str() {
            "str" | "string" | "object" => TypeTag::Text,
            "int8" => TypeTag::TinyInt,
            "int16" => TypeTag::SmallInt,
            "int32" => TypeTag::Int,
            "int64" => TypeTag::BigInt,
            "float32" => TypeTag::Float,
            "float64" => TypeTag::Double,
            "bool" | "boolean" => TypeTag::Bool,
            "bytes" => TypeTag::Binary,
            "datetime64" => TypeTag::Timestamp,
            _ => TypeTag::from_sql_name(declared),
        }
    }

    /// Map a SQL type name (optionally parameterised) to its canonical tag.
    pub fn from_sql_name(name: &str) -> TypeTag {
        let upper = name.trim().to_ascii_uppercase();
        let base = match upper.find(['(', '<']) {
            Some(idx) => upper[..idx].trim_end(),
            None => upper.as_str(),
        };

        match base {
            "BOOL" | "BOOLEAN" | "LOGICAL" => TypeTag::Bool,
            "TINYINT" | "INT1" | "BYTEINT" => TypeTag::TinyInt,
            "SMALLINT" | "INT2" => TypeTag::SmallInt,
            "INT" | "INTEGER" | "INT4" | "MEDIUMINT" => TypeTag::Int,
            "BIGINT" | "INT8" | "INT64" | "LONG" => TypeTag::BigInt,
            "FLOAT" | "FLOAT4" | "REAL" => TypeTag::Float,
            "DOUBLE" | "DOUBLE PRECISION" | "FLOAT8" | "FLOAT64" => TypeTag::Double,
            "DECIMAL" | "NUMERIC" | "NUMBER" | "BIGNUMERIC" | "BIGDECIMAL" => TypeTag::Decimal,
            "TEXT" | "STRING" => TypeTag::Text,
            "VARCHAR" | "CHARACTER VARYING" | "NVARCHAR" => TypeTag::Varchar,
            "CHAR" | "CHARACTER" | "NCHAR" | "BPCHAR" => TypeTag::Char,
            "DATE" => TypeTag::Date,
            "TIME" => TypeTag::Time,
            "DATETIME" => TypeTag::Datetime,
            "TIMESTAMP" | "TIMESTAMPTZ" | "TIMESTAMP WITH TIME ZONE" | "TIMESTAMP_NTZ"
            | "TIMESTAMP_LTZ" | "TIMESTAMP_TZ" => TypeTag::Timestamp,
            "INTERVAL" => TypeTag::Interval,
            "BINARY" | "VARBINARY" | "BLOB" | "BYTEA" | "BYTES" => TypeTag::Binary,
            "JSON" | "JSONB" => TypeTag::Json,
            "UUID" => TypeTag::Uuid,
            _ => TypeTag::Unknown,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = String;

    /// Parse a canonical or SQL type name. Unlike [`TypeTag::from_sql_name`],
    /// an unrecognised name is an error rather than `UNKNOWN`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("UNKNOWN") {
            return Ok(TypeTag::Unknown);
        }
        match TypeTag::from_sql_name(s) {
            TypeTag::Unknown => Err(format!("unrecognised type name '{s}'")),
            tag => Ok(tag),
        }
    }
}

impl Serialize for TypeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TypeTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
