//! Typed bind values for dynamically built queries.

use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::Database;

use crate::entity::{Field, FieldKind};
use crate::error::AppError;

/// A value bound to a `$n` placeholder. Conversion from JSON is checked
/// against the field's kind, so a mismatched value is a caller error
/// raised before the store is touched.
#[derive(Clone, Debug, PartialEq)]
pub enum BindValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl BindValue {
    pub fn from_json(field: &Field, v: &Value) -> Result<Self, AppError> {
        let mismatch = || AppError::FieldType {
            field: field.name.to_string(),
            expected: field.kind.expects(),
        };
        match (field.kind, v) {
            (_, Value::Null) => Ok(BindValue::Null),
            (FieldKind::Int | FieldKind::BigInt, Value::Number(n)) => {
                n.as_i64().map(BindValue::Int).ok_or_else(mismatch)
            }
            (FieldKind::Float, Value::Number(n)) => {
                n.as_f64().map(BindValue::Float).ok_or_else(mismatch)
            }
            (FieldKind::Bool, Value::Bool(b)) => Ok(BindValue::Bool(*b)),
            (FieldKind::Text, Value::String(s)) => Ok(BindValue::Text(s.clone())),
            _ => Err(mismatch()),
        }
    }
}

impl From<i32> for BindValue {
    fn from(v: i32) -> Self {
        BindValue::Int(i64::from(v))
    }
}

impl From<i64> for BindValue {
    fn from(v: i64) -> Self {
        BindValue::Int(v)
    }
}

impl From<f64> for BindValue {
    fn from(v: f64) -> Self {
        BindValue::Float(v)
    }
}

impl From<bool> for BindValue {
    fn from(v: bool) -> Self {
        BindValue::Bool(v)
    }
}

impl From<String> for BindValue {
    fn from(v: String) -> Self {
        BindValue::Text(v)
    }
}

impl From<&str> for BindValue {
    fn from(v: &str) -> Self {
        BindValue::Text(v.to_string())
    }
}

impl<'q> Encode<'q, Postgres> for BindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            BindValue::Null => <Option<i32> as Encode<Postgres>>::encode_by_ref(&None, buf)?,
            BindValue::Bool(b) => <bool as Encode<Postgres>>::encode_by_ref(b, buf)?,
            BindValue::Int(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            BindValue::Float(n) => <f64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            BindValue::Text(s) => {
                let s_ref: &str = s.as_str();
                <&str as Encode<Postgres>>::encode_by_ref(&s_ref, buf)?
            }
        })
    }

    /// Declare the real wire type per variant; the statement's explicit
    /// casts take it from there.
    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            BindValue::Null | BindValue::Text(_) => <String as sqlx::Type<Postgres>>::type_info(),
            BindValue::Bool(_) => <bool as sqlx::Type<Postgres>>::type_info(),
            BindValue::Int(_) => <i64 as sqlx::Type<Postgres>>::type_info(),
            BindValue::Float(_) => <f64 as sqlx::Type<Postgres>>::type_info(),
        })
    }
}

impl sqlx::Type<Postgres> for BindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(kind: FieldKind) -> Field {
        Field::required("f", kind)
    }

    #[test]
    fn json_values_convert_by_kind() {
        let v = BindValue::from_json(&field(FieldKind::Int), &json!(1975)).unwrap();
        assert_eq!(v, BindValue::Int(1975));
        let v = BindValue::from_json(&field(FieldKind::Text), &json!("Fusca")).unwrap();
        assert_eq!(v, BindValue::Text("Fusca".into()));
        let v = BindValue::from_json(&field(FieldKind::Bool), &json!(true)).unwrap();
        assert_eq!(v, BindValue::Bool(true));
        let v = BindValue::from_json(&field(FieldKind::Float), &json!(2)).unwrap();
        assert_eq!(v, BindValue::Float(2.0));
    }

    #[test]
    fn null_converts_for_any_kind() {
        let v = BindValue::from_json(&field(FieldKind::Int), &Value::Null).unwrap();
        assert_eq!(v, BindValue::Null);
    }

    #[test]
    fn mismatched_values_are_rejected() {
        let err = BindValue::from_json(&field(FieldKind::Int), &json!("VW")).unwrap_err();
        assert!(matches!(err, AppError::FieldType { .. }));
        let err = BindValue::from_json(&field(FieldKind::Int), &json!(19.75)).unwrap_err();
        assert!(matches!(err, AppError::FieldType { .. }));
        let err = BindValue::from_json(&field(FieldKind::Text), &json!(7)).unwrap_err();
        assert!(matches!(err, AppError::FieldType { .. }));
        let err = BindValue::from_json(&field(FieldKind::Bool), &json!("yes")).unwrap_err();
        assert!(matches!(err, AppError::FieldType { .. }));
    }

    #[test]
    fn id_types_convert_into_bind_values() {
        assert_eq!(BindValue::from(7i32), BindValue::Int(7));
        assert_eq!(BindValue::from("x"), BindValue::Text("x".into()));
    }
}
