//! Wire shapes for dynamic filtering.
//!
//! Operator spellings are part of the protocol; deserialization is the
//! validation, so an unsupported operator never reaches the SQL builder.

use serde::Deserialize;
use serde_json::Value;

/// One clause of a conjunctive filter list. Clauses apply in listed order.
#[derive(Clone, Debug, Deserialize)]
pub struct Filter {
    pub field: String,
    #[serde(default)]
    pub operator: FilterOp,
    pub value: Value,
}

impl Filter {
    /// Equality clause, the default operator.
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Filter {
            field: field.into(),
            operator: FilterOp::Eq,
            value,
        }
    }
}

/// Operators accepted in filter lists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum FilterOp {
    #[default]
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    /// String-contains, case-sensitive.
    #[serde(rename = "like")]
    Contains,
    /// String-contains, case-insensitive.
    #[serde(rename = "ilike")]
    ContainsCi,
    /// Set membership; the value must be an array.
    #[serde(rename = "in")]
    In,
    /// Set exclusion; the value must be an array.
    #[serde(rename = "notin")]
    NotIn,
}

/// Per-field comparison for last-record lookups. The value defaults to
/// null, which only `is_null` ignores.
#[derive(Clone, Debug, Deserialize)]
pub struct Comparison {
    pub operator: CompareOp,
    #[serde(default)]
    pub value: Value,
}

/// Comparison operators. `=` is accepted as an alias of `==`; `like` is a
/// contains match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum CompareOp {
    #[serde(rename = "==", alias = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "like")]
    Contains,
    #[serde(rename = "is_null")]
    IsNull,
}
