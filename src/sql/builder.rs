//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from entity
//! descriptors. Field names are validated against the descriptor and
//! values are converted by field kind before any SQL leaves this module,
//! so misuse fails without touching the store.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::entity::{self, Entity, Field, FieldKind};
use crate::error::AppError;
use crate::filter::{CompareOp, Comparison, Filter, FilterOp};
use crate::sql::params::BindValue;

/// Quote an identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: BindValue) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// SELECT list: every descriptor field, quoted, in descriptor order.
fn select_columns<E: Entity>() -> String {
    E::FIELDS
        .iter()
        .map(|f| quoted(f.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn known_field<E: Entity>(name: &str) -> Result<&'static Field, AppError> {
    entity::field_named::<E>(name).ok_or_else(|| AppError::UnknownField(name.to_string()))
}

/// Placeholder with an explicit cast from the field kind, e.g. `$1::int4`.
fn placeholder(n: usize, f: &Field) -> String {
    format!("${}::{}", n, f.kind.cast())
}

fn push_comparison(
    q: &mut QueryBuf,
    f: &'static Field,
    op_sql: &str,
    value: &Value,
) -> Result<String, AppError> {
    let n = q.push_param(BindValue::from_json(f, value)?);
    Ok(format!("{} {} {}", quoted(f.name), op_sql, placeholder(n, f)))
}

/// Contains match: the field must be text and the value a string; the
/// pattern wraps the value in `%...%`.
fn push_contains(
    q: &mut QueryBuf,
    f: &'static Field,
    keyword: &str,
    op_name: &'static str,
    value: &Value,
) -> Result<String, AppError> {
    if f.kind != FieldKind::Text {
        return Err(AppError::Filter {
            operator: op_name,
            requirement: "a text field",
        });
    }
    let Value::String(s) = value else {
        return Err(AppError::Filter {
            operator: op_name,
            requirement: "a string value",
        });
    };
    let n = q.push_param(BindValue::Text(format!("%{}%", s)));
    Ok(format!("{} {} {}", quoted(f.name), keyword, placeholder(n, f)))
}

fn push_membership(
    q: &mut QueryBuf,
    f: &'static Field,
    negated: bool,
    value: &Value,
) -> Result<String, AppError> {
    let Value::Array(items) = value else {
        return Err(AppError::Filter {
            operator: if negated { "notin" } else { "in" },
            requirement: "an array value",
        });
    };
    if items.is_empty() {
        // An empty set matches nothing; its complement matches everything.
        return Ok(if negated { "1 = 1" } else { "1 = 0" }.to_string());
    }
    let mut placeholders = Vec::with_capacity(items.len());
    for item in items {
        let n = q.push_param(BindValue::from_json(f, item)?);
        placeholders.push(placeholder(n, f));
    }
    Ok(format!(
        "{} {} ({})",
        quoted(f.name),
        if negated { "NOT IN" } else { "IN" },
        placeholders.join(", ")
    ))
}

/// SELECT by id. Caller binds the id as the sole param.
pub fn select_by_id<E: Entity>() -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let id = known_field::<E>(E::ID)?;
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        select_columns::<E>(),
        quoted(E::TABLE),
        quoted(id.name),
        placeholder(1, id)
    );
    Ok(q)
}

/// Paged SELECT ordered ascending by `order_by`, which must name a
/// descriptor field.
pub fn select_page<E: Entity>(order_by: &str, skip: i64, limit: i64) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let order = known_field::<E>(order_by)?;
    q.sql = format!(
        "SELECT {} FROM {} ORDER BY {} LIMIT {} OFFSET {}",
        select_columns::<E>(),
        quoted(E::TABLE),
        quoted(order.name),
        limit,
        skip
    );
    Ok(q)
}

/// SELECT matching equality on one field, ordered ascending by `order_by`.
pub fn select_eq<E: Entity>(
    field: &str,
    value: &Value,
    order_by: &str,
    limit: Option<i64>,
) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let f = known_field::<E>(field)?;
    let order = known_field::<E>(order_by)?;
    let n = q.push_param(BindValue::from_json(f, value)?);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {} ORDER BY {}",
        select_columns::<E>(),
        quoted(E::TABLE),
        quoted(f.name),
        placeholder(n, f),
        quoted(order.name)
    );
    if let Some(n) = limit {
        q.sql.push_str(&format!(" LIMIT {}", n));
    }
    Ok(q)
}

/// SELECT satisfying the conjunction of all filter clauses, applied in
/// listed order, ascending by id.
pub fn select_filtered<E: Entity>(filters: &[Filter]) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let id = known_field::<E>(E::ID)?;
    let mut where_parts = Vec::with_capacity(filters.len());
    for filter in filters {
        let f = known_field::<E>(&filter.field)?;
        let clause = match filter.operator {
            FilterOp::Eq => push_comparison(&mut q, f, "=", &filter.value)?,
            FilterOp::Ne => push_comparison(&mut q, f, "<>", &filter.value)?,
            FilterOp::Lt => push_comparison(&mut q, f, "<", &filter.value)?,
            FilterOp::Le => push_comparison(&mut q, f, "<=", &filter.value)?,
            FilterOp::Gt => push_comparison(&mut q, f, ">", &filter.value)?,
            FilterOp::Ge => push_comparison(&mut q, f, ">=", &filter.value)?,
            FilterOp::Contains => push_contains(&mut q, f, "LIKE", "like", &filter.value)?,
            FilterOp::ContainsCi => push_contains(&mut q, f, "ILIKE", "ilike", &filter.value)?,
            FilterOp::In => push_membership(&mut q, f, false, &filter.value)?,
            FilterOp::NotIn => push_membership(&mut q, f, true, &filter.value)?,
        };
        where_parts.push(clause);
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {}",
        select_columns::<E>(),
        quoted(E::TABLE),
        where_clause,
        quoted(id.name)
    );
    Ok(q)
}

/// SELECT the single highest-id row satisfying all per-field comparisons.
pub fn select_last<E: Entity>(
    criteria: &BTreeMap<String, Comparison>,
) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let id = known_field::<E>(E::ID)?;
    let mut where_parts = Vec::with_capacity(criteria.len());
    for (name, cmp) in criteria {
        let f = known_field::<E>(name)?;
        let clause = match cmp.operator {
            CompareOp::Eq => push_comparison(&mut q, f, "=", &cmp.value)?,
            CompareOp::Ne => push_comparison(&mut q, f, "<>", &cmp.value)?,
            CompareOp::Lt => push_comparison(&mut q, f, "<", &cmp.value)?,
            CompareOp::Le => push_comparison(&mut q, f, "<=", &cmp.value)?,
            CompareOp::Gt => push_comparison(&mut q, f, ">", &cmp.value)?,
            CompareOp::Ge => push_comparison(&mut q, f, ">=", &cmp.value)?,
            CompareOp::Contains => push_contains(&mut q, f, "LIKE", "like", &cmp.value)?,
            CompareOp::IsNull => format!("{} IS NULL", quoted(f.name)),
        };
        where_parts.push(clause);
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {} DESC LIMIT 1",
        select_columns::<E>(),
        quoted(E::TABLE),
        where_clause,
        quoted(id.name)
    );
    Ok(q)
}

/// INSERT from a payload map: descriptor fields present in the map, in
/// descriptor order; the id field is store-assigned and never written.
pub fn insert<E: Entity>(values: &Map<String, Value>) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for f in E::FIELDS {
        if f.name == E::ID {
            continue;
        }
        let Some(v) = values.get(f.name) else { continue };
        let n = q.push_param(BindValue::from_json(f, v)?);
        cols.push(quoted(f.name));
        placeholders.push(placeholder(n, f));
    }
    if cols.is_empty() {
        return Err(AppError::BadRequest(
            "payload has no persistable fields".into(),
        ));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(E::TABLE),
        cols.join(", "),
        placeholders.join(", "),
        select_columns::<E>()
    );
    Ok(q)
}

/// UPDATE by id: SET only descriptor fields present in the payload map,
/// never the id. An all-absent payload degrades to a SELECT by id so the
/// caller still gets the row back.
pub fn update_by_id<E: Entity>(
    id: BindValue,
    values: &Map<String, Value>,
) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let id_f = known_field::<E>(E::ID)?;
    let mut sets = Vec::new();
    for f in E::FIELDS {
        if f.name == E::ID {
            continue;
        }
        let Some(v) = values.get(f.name) else { continue };
        let n = q.push_param(BindValue::from_json(f, v)?);
        sets.push(format!("{} = {}", quoted(f.name), placeholder(n, f)));
    }
    if sets.is_empty() {
        let n = q.push_param(id);
        q.sql = format!(
            "SELECT {} FROM {} WHERE {} = {}",
            select_columns::<E>(),
            quoted(E::TABLE),
            quoted(id_f.name),
            placeholder(n, id_f)
        );
        return Ok(q);
    }
    let n = q.push_param(id);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {} RETURNING {}",
        quoted(E::TABLE),
        sets.join(", "),
        quoted(id_f.name),
        placeholder(n, id_f),
        select_columns::<E>()
    );
    Ok(q)
}

/// UPDATE all rows equal on `match_field` to the payload's value for it,
/// setting every descriptor field the payload carries (id excepted).
/// A payload without the match field is misuse.
pub fn update_by_match<E: Entity>(
    match_field: &str,
    values: &Map<String, Value>,
) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let mf = known_field::<E>(match_field)?;
    let Some(match_value) = values.get(match_field) else {
        return Err(AppError::BadRequest(format!(
            "payload missing match field '{}'",
            match_field
        )));
    };
    let match_bind = BindValue::from_json(mf, match_value)?;
    let mut sets = Vec::new();
    for f in E::FIELDS {
        if f.name == E::ID {
            continue;
        }
        let Some(v) = values.get(f.name) else { continue };
        let n = q.push_param(BindValue::from_json(f, v)?);
        sets.push(format!("{} = {}", quoted(f.name), placeholder(n, f)));
    }
    if sets.is_empty() {
        let n = q.push_param(match_bind);
        q.sql = format!(
            "SELECT {} FROM {} WHERE {} = {}",
            select_columns::<E>(),
            quoted(E::TABLE),
            quoted(mf.name),
            placeholder(n, mf)
        );
        return Ok(q);
    }
    let n = q.push_param(match_bind);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {} RETURNING {}",
        quoted(E::TABLE),
        sets.join(", "),
        quoted(mf.name),
        placeholder(n, mf),
        select_columns::<E>()
    );
    Ok(q)
}

/// UPDATE all rows equal-matching every criteria field, setting every
/// change field. Unknown names in either map are misuse; the id is never
/// set. No RETURNING: the caller reads rows_affected.
pub fn update_where<E: Entity>(
    criteria: &BTreeMap<String, Value>,
    changes: &BTreeMap<String, Value>,
) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for (name, v) in changes {
        if name == E::ID {
            continue;
        }
        let f = known_field::<E>(name)?;
        let n = q.push_param(BindValue::from_json(f, v)?);
        sets.push(format!("{} = {}", quoted(f.name), placeholder(n, f)));
    }
    if sets.is_empty() {
        return Err(AppError::BadRequest("no fields to update".into()));
    }
    let mut where_parts = Vec::with_capacity(criteria.len());
    for (name, v) in criteria {
        let f = known_field::<E>(name)?;
        let n = q.push_param(BindValue::from_json(f, v)?);
        where_parts.push(format!("{} = {}", quoted(f.name), placeholder(n, f)));
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    q.sql = format!(
        "UPDATE {} SET {}{}",
        quoted(E::TABLE),
        sets.join(", "),
        where_clause
    );
    Ok(q)
}

/// DELETE by id, returning the deleted row. Caller binds the id as the
/// sole param.
pub fn delete_by_id<E: Entity>() -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let id = known_field::<E>(E::ID)?;
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {} RETURNING {}",
        quoted(E::TABLE),
        quoted(id.name),
        placeholder(1, id),
        select_columns::<E>()
    );
    Ok(q)
}

/// Serialize a typed payload into its field map. Payload types serialize
/// to JSON objects by construction; anything else is a caller error.
pub fn payload_map<T: serde::Serialize>(payload: &T) -> Result<Map<String, Value>, AppError> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::BadRequest("payload must be a JSON object".into())),
        Err(e) => Err(AppError::Internal(format!("serialize payload: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::car::{Car, CarCreate, CarUpdate};
    use serde_json::json;

    const COLS: &str = "\"id\", \"modelo\", \"nome\", \"cor\", \"marca\", \"versao\", \"ano\"";

    fn fusca() -> CarCreate {
        CarCreate {
            modelo: "Fusca".into(),
            nome: "Classic".into(),
            cor: "blue".into(),
            marca: "VW".into(),
            versao: "1.6".into(),
            ano: 1975,
        }
    }

    #[test]
    fn select_by_id_casts_the_id() {
        let q = select_by_id::<Car>().unwrap();
        assert_eq!(
            q.sql,
            format!("SELECT {COLS} FROM \"carrinhos\" WHERE \"id\" = $1::int4")
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn select_page_orders_and_bounds() {
        let q = select_page::<Car>("ano", 5, 10).unwrap();
        assert_eq!(
            q.sql,
            format!("SELECT {COLS} FROM \"carrinhos\" ORDER BY \"ano\" LIMIT 10 OFFSET 5")
        );
    }

    #[test]
    fn select_page_rejects_unknown_order_field() {
        let err = select_page::<Car>("potato", 0, 10).unwrap_err();
        assert!(matches!(err, AppError::UnknownField(f) if f == "potato"));
    }

    #[test]
    fn select_eq_binds_typed_value() {
        let q = select_eq::<Car>("marca", &json!("VW"), "id", None).unwrap();
        assert_eq!(
            q.sql,
            format!("SELECT {COLS} FROM \"carrinhos\" WHERE \"marca\" = $1::text ORDER BY \"id\"")
        );
        assert_eq!(q.params, vec![BindValue::Text("VW".into())]);
        let q = select_eq::<Car>("ano", &json!(1975), "id", Some(1)).unwrap();
        assert!(q.sql.ends_with("ORDER BY \"id\" LIMIT 1"));
        assert_eq!(q.params, vec![BindValue::Int(1975)]);
    }

    #[test]
    fn filtered_select_applies_clauses_in_order() {
        let filters = vec![
            Filter {
                field: "ano".into(),
                operator: FilterOp::Ge,
                value: json!(2010),
            },
            Filter::eq("marca", json!("VW")),
        ];
        let q = select_filtered::<Car>(&filters).unwrap();
        assert_eq!(
            q.sql,
            format!(
                "SELECT {COLS} FROM \"carrinhos\" WHERE \"ano\" >= $1::int4 AND \"marca\" = $2::text ORDER BY \"id\""
            )
        );
        assert_eq!(
            q.params,
            vec![BindValue::Int(2010), BindValue::Text("VW".into())]
        );
    }

    #[test]
    fn filtered_select_without_clauses_selects_all() {
        let q = select_filtered::<Car>(&[]).unwrap();
        assert_eq!(
            q.sql,
            format!("SELECT {COLS} FROM \"carrinhos\" ORDER BY \"id\"")
        );
    }

    #[test]
    fn contains_wraps_pattern_and_requires_text() {
        let filters = vec![Filter {
            field: "nome".into(),
            operator: FilterOp::Contains,
            value: json!("Class"),
        }];
        let q = select_filtered::<Car>(&filters).unwrap();
        assert!(q.sql.contains("\"nome\" LIKE $1::text"));
        assert_eq!(q.params, vec![BindValue::Text("%Class%".into())]);

        let filters = vec![Filter {
            field: "ano".into(),
            operator: FilterOp::Contains,
            value: json!("19"),
        }];
        let err = select_filtered::<Car>(&filters).unwrap_err();
        assert!(matches!(
            err,
            AppError::Filter {
                operator: "like",
                ..
            }
        ));
    }

    #[test]
    fn case_insensitive_contains_uses_ilike() {
        let filters = vec![Filter {
            field: "marca".into(),
            operator: FilterOp::ContainsCi,
            value: json!("vw"),
        }];
        let q = select_filtered::<Car>(&filters).unwrap();
        assert!(q.sql.contains("\"marca\" ILIKE $1::text"));
    }

    #[test]
    fn membership_expands_placeholders() {
        let filters = vec![Filter {
            field: "marca".into(),
            operator: FilterOp::In,
            value: json!(["VW", "Fiat"]),
        }];
        let q = select_filtered::<Car>(&filters).unwrap();
        assert!(q.sql.contains("\"marca\" IN ($1::text, $2::text)"));
        assert_eq!(
            q.params,
            vec![
                BindValue::Text("VW".into()),
                BindValue::Text("Fiat".into())
            ]
        );
    }

    #[test]
    fn membership_requires_an_array() {
        let filters = vec![Filter {
            field: "marca".into(),
            operator: FilterOp::In,
            value: json!("VW"),
        }];
        let err = select_filtered::<Car>(&filters).unwrap_err();
        assert!(matches!(
            err,
            AppError::Filter {
                operator: "in",
                ..
            }
        ));
    }

    #[test]
    fn empty_sets_compile_to_constants() {
        let q = select_filtered::<Car>(&[Filter {
            field: "marca".into(),
            operator: FilterOp::In,
            value: json!([]),
        }])
        .unwrap();
        assert!(q.sql.contains("WHERE 1 = 0"));
        let q = select_filtered::<Car>(&[Filter {
            field: "marca".into(),
            operator: FilterOp::NotIn,
            value: json!([]),
        }])
        .unwrap();
        assert!(q.sql.contains("WHERE 1 = 1"));
    }

    #[test]
    fn unknown_filter_field_is_rejected() {
        let filters = vec![Filter::eq("portas", json!(4))];
        let err = select_filtered::<Car>(&filters).unwrap_err();
        assert!(matches!(err, AppError::UnknownField(f) if f == "portas"));
    }

    #[test]
    fn last_by_criteria_orders_descending() {
        let mut criteria = BTreeMap::new();
        criteria.insert(
            "ano".to_string(),
            Comparison {
                operator: CompareOp::Ge,
                value: json!(2010),
            },
        );
        criteria.insert(
            "modelo".to_string(),
            Comparison {
                operator: CompareOp::IsNull,
                value: Value::Null,
            },
        );
        let q = select_last::<Car>(&criteria).unwrap();
        assert_eq!(
            q.sql,
            format!(
                "SELECT {COLS} FROM \"carrinhos\" WHERE \"ano\" >= $1::int4 AND \"modelo\" IS NULL ORDER BY \"id\" DESC LIMIT 1"
            )
        );
        assert_eq!(q.params, vec![BindValue::Int(2010)]);
    }

    #[test]
    fn last_by_criteria_wraps_contains_pattern() {
        let mut criteria = BTreeMap::new();
        criteria.insert(
            "nome".to_string(),
            Comparison {
                operator: CompareOp::Contains,
                value: json!("Cla"),
            },
        );
        let q = select_last::<Car>(&criteria).unwrap();
        assert!(q.sql.contains("\"nome\" LIKE $1::text"));
        assert_eq!(q.params, vec![BindValue::Text("%Cla%".into())]);
    }

    #[test]
    fn insert_skips_id_and_returns_all_columns() {
        let values = payload_map(&fusca()).unwrap();
        let q = insert::<Car>(&values).unwrap();
        assert_eq!(
            q.sql,
            format!(
                "INSERT INTO \"carrinhos\" (\"modelo\", \"nome\", \"cor\", \"marca\", \"versao\", \"ano\") \
                 VALUES ($1::text, $2::text, $3::text, $4::text, $5::text, $6::int4) RETURNING {COLS}"
            )
        );
        assert_eq!(q.params.len(), 6);
        assert_eq!(q.params[5], BindValue::Int(1975));
    }

    #[test]
    fn update_sets_only_present_fields() {
        let patch = CarUpdate {
            nome: Some("NewName".into()),
            ..CarUpdate::default()
        };
        let values = payload_map(&patch).unwrap();
        let q = update_by_id::<Car>(BindValue::Int(7), &values).unwrap();
        assert_eq!(
            q.sql,
            format!(
                "UPDATE \"carrinhos\" SET \"nome\" = $1::text WHERE \"id\" = $2::int4 RETURNING {COLS}"
            )
        );
        assert_eq!(
            q.params,
            vec![BindValue::Text("NewName".into()), BindValue::Int(7)]
        );
    }

    #[test]
    fn empty_update_degrades_to_select() {
        let values = payload_map(&CarUpdate::default()).unwrap();
        let q = update_by_id::<Car>(BindValue::Int(7), &values).unwrap();
        assert_eq!(
            q.sql,
            format!("SELECT {COLS} FROM \"carrinhos\" WHERE \"id\" = $1::int4")
        );
        assert_eq!(q.params, vec![BindValue::Int(7)]);
    }

    #[test]
    fn update_by_match_binds_match_value_last() {
        let patch = CarUpdate {
            modelo: Some("Gol".into()),
            cor: Some("azul".into()),
            ..CarUpdate::default()
        };
        let values = payload_map(&patch).unwrap();
        let q = update_by_match::<Car>("modelo", &values).unwrap();
        assert_eq!(
            q.sql,
            format!(
                "UPDATE \"carrinhos\" SET \"modelo\" = $1::text, \"cor\" = $2::text \
                 WHERE \"modelo\" = $3::text RETURNING {COLS}"
            )
        );
        assert_eq!(
            q.params,
            vec![
                BindValue::Text("Gol".into()),
                BindValue::Text("azul".into()),
                BindValue::Text("Gol".into())
            ]
        );
    }

    #[test]
    fn update_by_match_requires_the_match_value() {
        let patch = CarUpdate {
            cor: Some("azul".into()),
            ..CarUpdate::default()
        };
        let values = payload_map(&patch).unwrap();
        let err = update_by_match::<Car>("modelo", &values).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn update_where_sets_and_matches() {
        let criteria = BTreeMap::from([("marca".to_string(), json!("VW"))]);
        let changes = BTreeMap::from([("cor".to_string(), json!("preto"))]);
        let q = update_where::<Car>(&criteria, &changes).unwrap();
        assert_eq!(
            q.sql,
            "UPDATE \"carrinhos\" SET \"cor\" = $1::text WHERE \"marca\" = $2::text"
        );
        assert_eq!(
            q.params,
            vec![
                BindValue::Text("preto".into()),
                BindValue::Text("VW".into())
            ]
        );
    }

    #[test]
    fn update_where_rejects_empty_changes_and_unknown_fields() {
        let criteria = BTreeMap::from([("marca".to_string(), json!("VW"))]);
        let err = update_where::<Car>(&criteria, &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let changes = BTreeMap::from([("portas".to_string(), json!(4))]);
        let err = update_where::<Car>(&criteria, &changes).unwrap_err();
        assert!(matches!(err, AppError::UnknownField(f) if f == "portas"));
    }

    #[test]
    fn update_where_never_rewrites_the_id() {
        let criteria = BTreeMap::new();
        let changes = BTreeMap::from([
            ("id".to_string(), json!(99)),
            ("cor".to_string(), json!("preto")),
        ]);
        let q = update_where::<Car>(&criteria, &changes).unwrap();
        assert_eq!(q.sql, "UPDATE \"carrinhos\" SET \"cor\" = $1::text");
        assert_eq!(q.params, vec![BindValue::Text("preto".into())]);
    }

    #[test]
    fn delete_returns_the_row() {
        let q = delete_by_id::<Car>().unwrap();
        assert_eq!(
            q.sql,
            format!("DELETE FROM \"carrinhos\" WHERE \"id\" = $1::int4 RETURNING {COLS}")
        );
    }
}
