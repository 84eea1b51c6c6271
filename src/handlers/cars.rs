//! Car handlers: CRUD, filtered listing, bulk writes, CSV import/export,
//! and the printable report.

use std::collections::{BTreeMap, HashMap};

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;

use crate::entity::{field_named, Entity, Field, FieldKind};
use crate::error::AppError;
use crate::filter::{Comparison, Filter};
use crate::models::car::{Car, CarCreate, CarStore, CarUpdate};
use crate::sql::payload_map;
use crate::state::AppState;
use crate::{report, sheet};

/// Row count from a criteria update.
#[derive(Debug, Serialize)]
pub struct UpdateSummary {
    pub updated: u64,
}

#[derive(Debug, Deserialize)]
pub struct MatchQuery {
    #[serde(rename = "match")]
    pub match_field: String,
}

/// Coerce a query-string value by the field's kind. Values that do not
/// parse stay strings; the builder rejects those with a typed error.
fn query_value(field: &Field, raw: &str) -> Value {
    match field.kind {
        FieldKind::Int | FieldKind::BigInt => {
            if let Ok(n) = raw.parse::<i64>() {
                return Value::Number(n.into());
            }
        }
        FieldKind::Float => {
            if let Some(n) = raw.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                return Value::Number(n);
            }
        }
        FieldKind::Bool => {
            if raw.eq_ignore_ascii_case("true") {
                return Value::Bool(true);
            }
            if raw.eq_ignore_ascii_case("false") {
                return Value::Bool(false);
            }
        }
        FieldKind::Text => {}
    }
    Value::String(raw.to_string())
}

/// GET /api/v1/cars: `skip`, `limit` and `order_by` control paging; any
/// recognized field name becomes an equality filter (then all matches are
/// returned, without paging). Unrecognized parameters are ignored.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let mut skip: i64 = 0;
    let mut limit: i64 = 100;
    let mut order_by: String = Car::ID.to_string();
    let mut filters: Vec<(String, Value)> = Vec::new();

    for (k, v) in params {
        match k.as_str() {
            "skip" => {
                if let Ok(n) = v.parse() {
                    skip = n;
                }
            }
            "limit" => {
                if let Ok(n) = v.parse() {
                    limit = n;
                }
            }
            "order_by" => order_by = v,
            _ => {
                if let Some(field) = field_named::<Car>(&k) {
                    filters.push((k, query_value(field, &v)));
                }
            }
        }
    }

    let cars = match filters.len() {
        0 => CarStore::get_multi(&state.pool, skip, limit, &order_by).await?,
        1 => {
            let (field, value) = &filters[0];
            CarStore::get_multi_filter(&state.pool, field, value, &order_by).await?
        }
        _ => {
            let filters: Vec<Filter> = filters
                .into_iter()
                .map(|(field, value)| Filter::eq(field, value))
                .collect();
            CarStore::get_multi_filters(&state.pool, &filters).await?
        }
    };
    Ok(Json(cars))
}

/// POST /api/v1/cars
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CarCreate>,
) -> Result<impl IntoResponse, AppError> {
    let car = CarStore::create(&state.pool, &payload).await?;
    Ok((StatusCode::CREATED, Json(car)))
}

/// GET /api/v1/cars/:id
pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Car>, AppError> {
    let car = CarStore::get(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("car {}", id)))?;
    Ok(Json(car))
}

/// PUT /api/v1/cars/:id: partial update, absent fields keep their value.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(patch): Json<CarUpdate>,
) -> Result<Json<Car>, AppError> {
    let current = CarStore::get(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("car {}", id)))?;
    let car = CarStore::update(&state.pool, &current, &patch).await?;
    Ok(Json(car))
}

/// DELETE /api/v1/cars/:id: returns the deleted record.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Car>, AppError> {
    let car = CarStore::remove(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("car {}", id)))?;
    Ok(Json(car))
}

/// POST /api/v1/cars/bulk: insert all payloads in one transaction.
pub async fn bulk_create(
    State(state): State<AppState>,
    Json(payloads): Json<Vec<CarCreate>>,
) -> Result<impl IntoResponse, AppError> {
    let summary = CarStore::create_multi(&state.pool, &payloads).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// PATCH /api/v1/cars/bulk?match=<field>: apply each payload to the
/// records equal to it on the match field; returns all updated records.
pub async fn bulk_update(
    State(state): State<AppState>,
    Query(q): Query<MatchQuery>,
    Json(payloads): Json<Vec<CarUpdate>>,
) -> Result<Json<Vec<Car>>, AppError> {
    let cars = CarStore::update_multi(&state.pool, &payloads, &q.match_field).await?;
    Ok(Json(cars))
}

/// PATCH /api/v1/cars: query parameters are equality criteria (all rows
/// when none), the body is the change payload; returns the row count.
pub async fn update_where(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    Json(patch): Json<CarUpdate>,
) -> Result<Json<UpdateSummary>, AppError> {
    let mut criteria = BTreeMap::new();
    for (k, v) in params {
        let field = field_named::<Car>(&k).ok_or_else(|| AppError::UnknownField(k.clone()))?;
        criteria.insert(k, query_value(field, &v));
    }
    let changes: BTreeMap<String, Value> = payload_map(&patch)?.into_iter().collect();
    let updated = CarStore::update_many(&state.pool, &criteria, &changes).await?;
    Ok(Json(UpdateSummary { updated }))
}

/// POST /api/v1/cars/search: body is a filter list, conjunction applies.
pub async fn search(
    State(state): State<AppState>,
    Json(filters): Json<Vec<Filter>>,
) -> Result<Json<Vec<Car>>, AppError> {
    let cars = CarStore::get_multi_filters(&state.pool, &filters).await?;
    Ok(Json(cars))
}

/// POST /api/v1/cars/last: body maps field names to comparisons; returns
/// the highest-id match.
pub async fn last(
    State(state): State<AppState>,
    Json(criteria): Json<BTreeMap<String, Comparison>>,
) -> Result<Json<Car>, AppError> {
    let car = CarStore::get_last_by_filters(&state.pool, &criteria)
        .await?
        .ok_or_else(|| AppError::NotFound("no car matches the criteria".into()))?;
    Ok(Json(car))
}

/// POST /api/v1/cars/import: multipart form with a `file` field holding a
/// CSV; rows become create payloads inserted as one batch.
pub async fn import_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut file_bytes: Option<Vec<u8>> = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name().unwrap_or("") != "file" {
            continue;
        }
        let file_name = field.file_name().unwrap_or("").to_string();
        if !file_name.to_ascii_lowercase().ends_with(".csv") {
            return Err(AppError::BadRequest("only .csv uploads are accepted".into()));
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        file_bytes = Some(data.to_vec());
        break;
    }
    let bytes = file_bytes
        .ok_or_else(|| AppError::BadRequest("missing 'file' field in multipart body".into()))?;

    let payloads = sheet::read_payloads::<Car>(&bytes)?;
    let summary = CarStore::create_multi(&state.pool, &payloads).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

const EXPORT_PAGE: i64 = 500;

async fn collect_all(pool: &PgPool) -> Result<Vec<Car>, AppError> {
    let mut all = Vec::new();
    let mut skip = 0;
    loop {
        let page = CarStore::get_multi(pool, skip, EXPORT_PAGE, Car::ID).await?;
        let short = (page.len() as i64) < EXPORT_PAGE;
        all.extend(page);
        if short {
            break;
        }
        skip += EXPORT_PAGE;
    }
    Ok(all)
}

/// GET /api/v1/cars/export.csv: every record as a CSV attachment; 404
/// when there is nothing to export.
pub async fn export_csv(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let cars = collect_all(&state.pool).await?;
    if cars.is_empty() {
        return Err(AppError::NotFound("no cars to export".into()));
    }
    let bytes = sheet::write_records::<Car>(&cars)?;
    let disposition = format!(
        "attachment; filename=\"carros-{}.csv\"",
        chrono::Utc::now().format("%Y-%m-%d")
    );
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

/// GET /api/v1/cars/export.html: every record as a printable document;
/// 404 when there is nothing to export.
pub async fn export_html(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let cars = collect_all(&state.pool).await?;
    if cars.is_empty() {
        return Err(AppError::NotFound("no cars to export".into()));
    }
    Ok(Html(report::render::<Car>(&cars)?))
}
