//! Entity descriptors: per-type field metadata driving DDL, dynamic SQL,
//! and field-name lookup.

use std::fmt;

use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::FromRow;

use crate::error::SchemaError;
use crate::sql::params::BindValue;

/// Storage kind of a field. Decides the DDL column type, the placeholder
/// cast, and how JSON values convert to bind values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    BigInt,
    Float,
    Bool,
    Text,
}

impl FieldKind {
    /// PostgreSQL type for column definitions.
    pub fn ddl_type(self) -> &'static str {
        match self {
            FieldKind::Int => "INTEGER",
            FieldKind::BigInt => "BIGINT",
            FieldKind::Float => "DOUBLE PRECISION",
            FieldKind::Bool => "BOOLEAN",
            FieldKind::Text => "TEXT",
        }
    }

    /// PostgreSQL type for placeholder casts (`$n::int4`).
    pub fn cast(self) -> &'static str {
        match self {
            FieldKind::Int => "int4",
            FieldKind::BigInt => "int8",
            FieldKind::Float => "float8",
            FieldKind::Bool => "bool",
            FieldKind::Text => "text",
        }
    }

    /// What a misuse error should say the field expects.
    pub fn expects(self) -> &'static str {
        match self {
            FieldKind::Int | FieldKind::BigInt => "an integer",
            FieldKind::Float => "a number",
            FieldKind::Bool => "a boolean",
            FieldKind::Text => "a string",
        }
    }
}

/// One column of an entity's table.
#[derive(Clone, Copy, Debug)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub nullable: bool,
    /// Startup DDL creates a secondary index on this field.
    pub indexed: bool,
}

impl Field {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Field {
            name,
            kind,
            nullable: false,
            indexed: false,
        }
    }

    pub const fn nullable(name: &'static str, kind: FieldKind) -> Self {
        Field {
            name,
            kind,
            nullable: true,
            indexed: false,
        }
    }

    pub const fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }
}

/// A persisted record type bound to its table descriptor and payload types.
///
/// Implementations are pure data; [`crate::store::Store`] supplies all
/// behavior. `FIELDS` lists every column in persisted order. `ID` names the
/// store-assigned primary key, which no insert or update statement ever
/// writes.
pub trait Entity:
    for<'r> FromRow<'r, PgRow> + Serialize + Send + Sync + Unpin + 'static
{
    /// Primary-key type, convertible to a bind value for id lookups.
    type Id: Into<BindValue> + fmt::Display + Clone + Send + Sync;
    /// Payload accepted by create operations.
    type Create: Serialize + serde::de::DeserializeOwned + Send + Sync;
    /// Payload accepted by update operations; absent fields stay untouched.
    type Update: Serialize + serde::de::DeserializeOwned + Send + Sync;

    const TABLE: &'static str;
    const FIELDS: &'static [Field];
    const ID: &'static str = "id";

    fn id(&self) -> Self::Id;
}

/// Find a field descriptor by name.
pub fn field_named<E: Entity>(name: &str) -> Option<&'static Field> {
    E::FIELDS.iter().find(|f| f.name == name)
}

/// Check an entity descriptor at startup so bad field tables fail fast,
/// before any DDL runs or query is built.
pub fn validate_fields<E: Entity>() -> Result<(), SchemaError> {
    if E::FIELDS.is_empty() {
        return Err(SchemaError::NoFields { table: E::TABLE });
    }
    for (i, field) in E::FIELDS.iter().enumerate() {
        if E::FIELDS[..i].iter().any(|f| f.name == field.name) {
            return Err(SchemaError::DuplicateField {
                table: E::TABLE,
                field: field.name,
            });
        }
    }
    let id = field_named::<E>(E::ID).ok_or(SchemaError::MissingId {
        table: E::TABLE,
        id: E::ID,
    })?;
    match id.kind {
        FieldKind::Int | FieldKind::BigInt => Ok(()),
        _ => Err(SchemaError::IdKind {
            table: E::TABLE,
            id: E::ID,
        }),
    }
}
