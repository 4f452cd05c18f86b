//! Row-to-JSON conversion for warehouse result sets.
//!
//! # Architecture
//!
//! PostgreSQL values are decoded in two phases:
//! 1. `TypeCategory` classifies the column type name into a logical category
//! 2. a category-specific decoder extracts the value
//!
//! SQL Server rows carry their own type tags, so the decoder tries the
//! candidate Rust types in turn until one matches the column.

use serde_json::Value as JsonValue;
use sqlx::postgres::PgRow;
use sqlx::{Column, Row, TypeInfo};

/// Logical category for database column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Json,
    Binary,
    Unknown,
}

/// Classify a database type name into a logical category.
pub fn categorize_type(type_name: &str) -> TypeCategory {
    let lower = type_name.to_lowercase();

    // Decimal/Numeric - check first as it overlaps with "numeric" in float checks
    if lower.contains("decimal") || lower.contains("numeric") || lower == "money" {
        return TypeCategory::Decimal;
    }

    if matches!(
        lower.as_str(),
        "int2" | "int4" | "int8" | "smallint" | "integer" | "bigint" | "serial" | "bigserial"
    ) {
        return TypeCategory::Integer;
    }

    if lower == "bool" || lower == "boolean" {
        return TypeCategory::Boolean;
    }

    if lower.contains("float") || lower.contains("double") || lower == "real" {
        return TypeCategory::Float;
    }

    if lower == "json" || lower == "jsonb" {
        return TypeCategory::Json;
    }

    if lower == "bytea" {
        return TypeCategory::Binary;
    }

    // Text, dates, uuids and everything else decode as strings
    TypeCategory::Unknown
}

/// Trait for converting database rows to JSON maps.
pub trait RowToJson {
    fn column_names(&self) -> Vec<String>;
    fn to_json_map(&self) -> serde_json::Map<String, JsonValue>;
}

impl RowToJson for PgRow {
    fn column_names(&self) -> Vec<String> {
        self.columns().iter().map(|c| c.name().to_string()).collect()
    }

    fn to_json_map(&self) -> serde_json::Map<String, JsonValue> {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let category = categorize_type(col.type_info().name());
                (col.name().to_string(), postgres::decode_column(self, idx, category))
            })
            .collect()
    }
}

impl RowToJson for tiberius::Row {
    fn column_names(&self) -> Vec<String> {
        self.columns().iter().map(|c| c.name().to_string()).collect()
    }

    fn to_json_map(&self) -> serde_json::Map<String, JsonValue> {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| (col.name().to_string(), mssql::decode_column(self, idx)))
            .collect()
    }
}

mod postgres {
    use super::*;

    pub fn decode_column(row: &PgRow, idx: usize, category: TypeCategory) -> JsonValue {
        match category {
            TypeCategory::Integer => decode_integer(row, idx),
            TypeCategory::Boolean => decode_boolean(row, idx),
            TypeCategory::Float => decode_float(row, idx),
            TypeCategory::Json => decode_json(row, idx),
            TypeCategory::Binary => decode_binary(row, idx),
            TypeCategory::Decimal | TypeCategory::Unknown => decode_text(row, idx),
        }
    }

    fn decode_integer(row: &PgRow, idx: usize) -> JsonValue {
        if let Ok(Some(v)) = row.try_get::<Option<i16>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<i32>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        JsonValue::Null
    }

    fn decode_boolean(row: &PgRow, idx: usize) -> JsonValue {
        row.try_get::<Option<bool>, _>(idx)
            .ok()
            .flatten()
            .map(JsonValue::Bool)
            .unwrap_or(JsonValue::Null)
    }

    fn decode_float(row: &PgRow, idx: usize) -> JsonValue {
        if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
            return serde_json::Number::from_f64(v)
                .map(JsonValue::Number)
                .unwrap_or_else(|| JsonValue::String(v.to_string()));
        }
        if let Ok(Some(v)) = row.try_get::<Option<f32>, _>(idx) {
            return serde_json::Number::from_f64(v as f64)
                .map(JsonValue::Number)
                .unwrap_or_else(|| JsonValue::String(v.to_string()));
        }
        JsonValue::Null
    }

    fn decode_json(row: &PgRow, idx: usize) -> JsonValue {
        row.try_get::<Option<JsonValue>, _>(idx)
            .ok()
            .flatten()
            .unwrap_or(JsonValue::Null)
    }

    fn decode_binary(row: &PgRow, idx: usize) -> JsonValue {
        row.try_get::<Option<Vec<u8>>, _>(idx)
            .ok()
            .flatten()
            .map(|bytes| JsonValue::String(format!("<{} bytes>", bytes.len())))
            .unwrap_or(JsonValue::Null)
    }

    /// Simple-protocol results arrive in text format, so dates, uuids and
    /// numerics can be read unchecked as their textual representation.
    fn decode_text(row: &PgRow, idx: usize) -> JsonValue {
        row.try_get::<Option<String>, _>(idx)
            .or_else(|_| row.try_get_unchecked::<Option<String>, _>(idx))
            .ok()
            .flatten()
            .map(JsonValue::String)
            .unwrap_or(JsonValue::Null)
    }
}

mod mssql {
    use super::*;
    use tiberius::numeric::Numeric;

    /// Try one Rust type; a type mismatch falls through to the next candidate,
    /// while a matching NULL returns `JsonValue::Null`.
    macro_rules! try_decode {
        ($row:expr, $idx:expr, $ty:ty, $map:expr) => {
            if let Ok(value) = $row.try_get::<$ty, _>($idx) {
                return value.map($map).unwrap_or(JsonValue::Null);
            }
        };
    }

    pub fn decode_column(row: &tiberius::Row, idx: usize) -> JsonValue {
        try_decode!(row, idx, &str, |s: &str| JsonValue::String(s.to_string()));
        try_decode!(row, idx, i32, JsonValue::from);
        try_decode!(row, idx, i64, JsonValue::from);
        try_decode!(row, idx, i16, JsonValue::from);
        try_decode!(row, idx, u8, JsonValue::from);
        try_decode!(row, idx, bool, JsonValue::Bool);
        try_decode!(row, idx, f64, JsonValue::from);
        try_decode!(row, idx, f32, |v: f32| JsonValue::from(v as f64));
        try_decode!(row, idx, Numeric, |n: Numeric| JsonValue::String(n.to_string()));
        try_decode!(row, idx, chrono::NaiveDateTime, |d: chrono::NaiveDateTime| {
            JsonValue::String(d.to_string())
        });
        try_decode!(row, idx, chrono::NaiveDate, |d: chrono::NaiveDate| {
            JsonValue::String(d.to_string())
        });
        try_decode!(row, idx, tiberius::Uuid, |u: tiberius::Uuid| {
            JsonValue::String(u.to_string())
        });
        try_decode!(row, idx, &[u8], |b: &[u8]| {
            JsonValue::String(format!("<{} bytes>", b.len()))
        });
        JsonValue::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_type_integer() {
        assert_eq!(categorize_type("INT4"), TypeCategory::Integer);
        assert_eq!(categorize_type("int8"), TypeCategory::Integer);
        assert_eq!(categorize_type("bigserial"), TypeCategory::Integer);
        assert_eq!(categorize_type("INTERVAL"), TypeCategory::Unknown);
        assert_eq!(categorize_type("POINT"), TypeCategory::Unknown);
    }

    #[test]
    fn test_categorize_type_decimal_before_float() {
        assert_eq!(categorize_type("NUMERIC"), TypeCategory::Decimal);
        assert_eq!(categorize_type("money"), TypeCategory::Decimal);
        assert_eq!(categorize_type("FLOAT8"), TypeCategory::Float);
    }

    #[test]
    fn test_categorize_type_fallbacks() {
        assert_eq!(categorize_type("JSONB"), TypeCategory::Json);
        assert_eq!(categorize_type("BOOL"), TypeCategory::Boolean);
        assert_eq!(categorize_type("BYTEA"), TypeCategory::Binary);
        assert_eq!(categorize_type("TIMESTAMPTZ"), TypeCategory::Unknown);
        assert_eq!(categorize_type("UUID"), TypeCategory::Unknown);
    }
}
