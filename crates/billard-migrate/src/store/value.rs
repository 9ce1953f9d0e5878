//! SQL value enum for type-safe row handling, plus literal rendering.

use tokio_postgres::Row;

/// A single column value read from a PostgreSQL row.
#[derive(Debug, Clone)]
pub enum SqlValue {
    Null(SqlNullType),
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
    Uuid(uuid::Uuid),
    Decimal(rust_decimal::Decimal),
    DateTime(chrono::NaiveDateTime),
    DateTimeOffset(chrono::DateTime<chrono::FixedOffset>),
    Date(chrono::NaiveDate),
    Time(chrono::NaiveTime),
}

/// Type hint for NULL values, so writes can distinguish a missing value
/// from a typed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlNullType {
    Bool,
    I16,
    I32,
    I64,
    F32,
    F64,
    String,
    Bytes,
    Uuid,
    Decimal,
    DateTime,
    DateTimeOffset,
    Date,
    Time,
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null(_))
    }

    /// Convert one column of a row to SqlValue based on its reported type.
    pub fn from_pg_row(row: &Row, idx: usize) -> SqlValue {
        let data_type = row.columns()[idx].type_().name().to_lowercase();

        match data_type.as_str() {
            "bool" => row
                .try_get::<_, bool>(idx)
                .ok()
                .map(SqlValue::Bool)
                .unwrap_or(SqlValue::Null(SqlNullType::Bool)),
            "int2" => row
                .try_get::<_, i16>(idx)
                .ok()
                .map(SqlValue::I16)
                .unwrap_or(SqlValue::Null(SqlNullType::I16)),
            "int4" => row
                .try_get::<_, i32>(idx)
                .ok()
                .map(SqlValue::I32)
                .unwrap_or(SqlValue::Null(SqlNullType::I32)),
            "int8" => row
                .try_get::<_, i64>(idx)
                .ok()
                .map(SqlValue::I64)
                .unwrap_or(SqlValue::Null(SqlNullType::I64)),
            "float4" => row
                .try_get::<_, f32>(idx)
                .ok()
                .map(SqlValue::F32)
                .unwrap_or(SqlValue::Null(SqlNullType::F32)),
            "float8" => row
                .try_get::<_, f64>(idx)
                .ok()
                .map(SqlValue::F64)
                .unwrap_or(SqlValue::Null(SqlNullType::F64)),
            "uuid" => row
                .try_get::<_, uuid::Uuid>(idx)
                .ok()
                .map(SqlValue::Uuid)
                .unwrap_or(SqlValue::Null(SqlNullType::Uuid)),
            "numeric" => row
                .try_get::<_, rust_decimal::Decimal>(idx)
                .ok()
                .map(SqlValue::Decimal)
                .unwrap_or(SqlValue::Null(SqlNullType::Decimal)),
            "timestamp" => row
                .try_get::<_, chrono::NaiveDateTime>(idx)
                .ok()
                .map(SqlValue::DateTime)
                .unwrap_or(SqlValue::Null(SqlNullType::DateTime)),
            "timestamptz" => row
                .try_get::<_, chrono::DateTime<chrono::FixedOffset>>(idx)
                .ok()
                .map(SqlValue::DateTimeOffset)
                .unwrap_or(SqlValue::Null(SqlNullType::DateTimeOffset)),
            "date" => row
                .try_get::<_, chrono::NaiveDate>(idx)
                .ok()
                .map(SqlValue::Date)
                .unwrap_or(SqlValue::Null(SqlNullType::Date)),
            "time" => row
                .try_get::<_, chrono::NaiveTime>(idx)
                .ok()
                .map(SqlValue::Time)
                .unwrap_or(SqlValue::Null(SqlNullType::Time)),
            "bytea" => row
                .try_get::<_, Vec<u8>>(idx)
                .ok()
                .map(SqlValue::Bytes)
                .unwrap_or(SqlValue::Null(SqlNullType::Bytes)),
            "json" | "jsonb" => row
                .try_get::<_, serde_json::Value>(idx)
                .ok()
                .map(|v| SqlValue::String(v.to_string()))
                .unwrap_or(SqlValue::Null(SqlNullType::String)),
            _ => row
                .try_get::<_, String>(idx)
                .ok()
                .map(SqlValue::String)
                .unwrap_or(SqlValue::Null(SqlNullType::String)),
        }
    }

    /// Render the value as a SQL literal for an INSERT statement.
    ///
    /// Strings are left uncast so the literal coerces to the column's
    /// type (text, json, enum, ...). Non-finite floats have no SQL
    /// spelling and render as NULL.
    pub fn to_literal(&self) -> String {
        match self {
            SqlValue::Null(_) => "NULL".to_string(),
            SqlValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            SqlValue::I16(n) => n.to_string(),
            SqlValue::I32(n) => n.to_string(),
            SqlValue::I64(n) => n.to_string(),
            SqlValue::F32(n) if !n.is_finite() => "NULL".to_string(),
            SqlValue::F32(n) => n.to_string(),
            SqlValue::F64(n) if !n.is_finite() => "NULL".to_string(),
            SqlValue::F64(n) => n.to_string(),
            SqlValue::String(s) => format!("'{}'", escape_sql_string(s)),
            SqlValue::Bytes(b) => format!("'\\x{}'::bytea", hex::encode(b)),
            SqlValue::Uuid(u) => format!("'{}'::uuid", u),
            SqlValue::Decimal(d) => format!("{}::numeric", d),
            SqlValue::DateTime(dt) => {
                format!("'{}'::timestamp", dt.format("%Y-%m-%d %H:%M:%S%.6f"))
            }
            SqlValue::DateTimeOffset(dt) => format!("'{}'::timestamptz", dt.to_rfc3339()),
            SqlValue::Date(d) => format!("'{}'::date", d),
            SqlValue::Time(t) => format!("'{}'::time", t),
        }
    }
}

/// Escape a string for SQL literal use.
fn escape_sql_string(s: &str) -> String {
    s.replace('\'', "''")
}
