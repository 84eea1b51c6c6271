//! The car entity and its payload types.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::entity::{Entity, Field, FieldKind};
use crate::store::Store;

/// A persisted car record from `carrinhos`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Car {
    pub id: i32,
    /// Nullable for legacy rows; create payloads always set it.
    pub modelo: Option<String>,
    pub nome: String,
    pub cor: String,
    pub marca: String,
    pub versao: String,
    pub ano: i32,
}

/// Payload for creating a car. Every field is required; the id is
/// store-assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarCreate {
    pub modelo: String,
    pub nome: String,
    pub cor: String,
    pub marca: String,
    pub versao: String,
    pub ano: i32,
}

/// Partial update payload: absent fields leave the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CarUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modelo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marca: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versao: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ano: Option<i32>,
}

impl Entity for Car {
    type Id = i32;
    type Create = CarCreate;
    type Update = CarUpdate;

    const TABLE: &'static str = "carrinhos";
    const FIELDS: &'static [Field] = &[
        Field::required("id", FieldKind::Int),
        Field::nullable("modelo", FieldKind::Text).indexed(),
        Field::required("nome", FieldKind::Text),
        Field::required("cor", FieldKind::Text),
        Field::required("marca", FieldKind::Text),
        Field::required("versao", FieldKind::Text),
        Field::required("ano", FieldKind::Int),
    ];

    fn id(&self) -> i32 {
        self.id
    }
}

/// The car-bound access object. Pure specialization of [`Store`].
pub type CarStore = Store<Car>;
