//! Generic data-access operations against PostgreSQL.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;

use crate::entity::Entity;
use crate::error::AppError;
use crate::filter::{Comparison, Filter};
use crate::sql::{self, QueryBuf};

/// Outcome summary of a batch creation. The created records are not
/// echoed back; bulk ingestion only needs the count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CreateSummary {
    pub inserted: u64,
}

/// Entity-agnostic persistence operations, parametrized by the record
/// type and its payload types. Stateless: every operation is an
/// associated function over a pool, committed before it returns.
pub struct Store<E> {
    _entity: PhantomData<E>,
}

impl<E: Entity> Store<E> {
    /// Fetch one record by id. Every record is addressable by id;
    /// no status flag filters the lookup.
    pub async fn get(pool: &PgPool, id: E::Id) -> Result<Option<E>, AppError> {
        let mut q = sql::select_by_id::<E>()?;
        q.params.push(id.into());
        Self::fetch_optional(pool, &q).await
    }

    /// List records ordered ascending by `order_by`, offset `skip`,
    /// bounded to `limit`.
    pub async fn get_multi(
        pool: &PgPool,
        skip: i64,
        limit: i64,
        order_by: &str,
    ) -> Result<Vec<E>, AppError> {
        let q = sql::select_page::<E>(order_by, skip, limit)?;
        Self::fetch_all(pool, &q).await
    }

    /// First record matching equality on one field, or None.
    pub async fn get_first_by_filter(
        pool: &PgPool,
        field: &str,
        value: &Value,
        order_by: &str,
    ) -> Result<Option<E>, AppError> {
        let q = sql::select_eq::<E>(field, value, order_by, Some(1))?;
        Self::fetch_optional(pool, &q).await
    }

    /// All records matching equality on one field.
    pub async fn get_multi_filter(
        pool: &PgPool,
        field: &str,
        value: &Value,
        order_by: &str,
    ) -> Result<Vec<E>, AppError> {
        let q = sql::select_eq::<E>(field, value, order_by, None)?;
        Self::fetch_all(pool, &q).await
    }

    /// Records satisfying the conjunction of all filter clauses, applied
    /// in listed order, ascending by id.
    pub async fn get_multi_filters(pool: &PgPool, filters: &[Filter]) -> Result<Vec<E>, AppError> {
        let q = sql::select_filtered::<E>(filters)?;
        Self::fetch_all(pool, &q).await
    }

    /// The most recent (highest-id) record satisfying all per-field
    /// comparisons, or None.
    pub async fn get_last_by_filters(
        pool: &PgPool,
        criteria: &BTreeMap<String, Comparison>,
    ) -> Result<Option<E>, AppError> {
        let q = sql::select_last::<E>(criteria)?;
        Self::fetch_optional(pool, &q).await
    }

    /// Persist a new record; returns it with the store-assigned id.
    pub async fn create(pool: &PgPool, payload: &E::Create) -> Result<E, AppError> {
        let values = sql::payload_map(payload)?;
        let q = sql::insert::<E>(&values)?;
        Self::fetch_one(pool, &q).await
    }

    /// Persist all payloads as one batch in a single transaction; a
    /// failure partway aborts the whole batch. Every payload is validated
    /// before the first write.
    pub async fn create_multi(
        pool: &PgPool,
        payloads: &[E::Create],
    ) -> Result<CreateSummary, AppError> {
        let mut queries = Vec::with_capacity(payloads.len());
        for payload in payloads {
            let values = sql::payload_map(payload)?;
            queries.push(sql::insert::<E>(&values)?);
        }
        let mut tx = pool.begin().await?;
        let mut inserted = 0;
        for q in &queries {
            inserted += Self::execute_tx(&mut tx, q).await?;
        }
        tx.commit().await?;
        Ok(CreateSummary { inserted })
    }

    /// Partial update: fields the patch sets replace the stored values,
    /// absent fields stay untouched, the id is never rewritten. Returns
    /// the updated record (re-read unchanged for an all-absent patch).
    pub async fn update(pool: &PgPool, record: &E, patch: &E::Update) -> Result<E, AppError> {
        let values = sql::payload_map(patch)?;
        let q = sql::update_by_id::<E>(record.id().into(), &values)?;
        Self::fetch_one(pool, &q).await
    }

    /// For each payload, update the records equal on `match_field` to the
    /// payload's value for it, applying all payload fields. Payloads with
    /// no match are silently skipped; a payload missing the match field
    /// fails the whole call before any write. Returns all updated records.
    pub async fn update_multi(
        pool: &PgPool,
        payloads: &[E::Update],
        match_field: &str,
    ) -> Result<Vec<E>, AppError> {
        let mut queries = Vec::with_capacity(payloads.len());
        for payload in payloads {
            let values = sql::payload_map(payload)?;
            queries.push(sql::update_by_match::<E>(match_field, &values)?);
        }
        let mut updated = Vec::new();
        for q in &queries {
            updated.extend(Self::fetch_all(pool, q).await?);
        }
        Ok(updated)
    }

    /// Update every record equal-matching all criteria fields, setting
    /// all change fields; returns the count of rows affected. Empty
    /// criteria match every row; an empty change set is misuse.
    pub async fn update_many(
        pool: &PgPool,
        criteria: &BTreeMap<String, Value>,
        changes: &BTreeMap<String, Value>,
    ) -> Result<u64, AppError> {
        let q = sql::update_where::<E>(criteria, changes)?;
        Self::execute(pool, &q).await
    }

    /// Hard-delete by id; returns the deleted record, or None if absent.
    pub async fn remove(pool: &PgPool, id: E::Id) -> Result<Option<E>, AppError> {
        let mut q = sql::delete_by_id::<E>()?;
        q.params.push(id.into());
        Self::fetch_optional(pool, &q).await
    }

    async fn fetch_optional(pool: &PgPool, q: &QueryBuf) -> Result<Option<E>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_as::<_, E>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.fetch_optional(pool).await?)
    }

    async fn fetch_one(pool: &PgPool, q: &QueryBuf) -> Result<E, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_as::<_, E>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.fetch_one(pool).await?)
    }

    async fn fetch_all(pool: &PgPool, q: &QueryBuf) -> Result<Vec<E>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_as::<_, E>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.fetch_all(pool).await?)
    }

    async fn execute(pool: &PgPool, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.execute(pool).await?.rows_affected())
    }

    async fn execute_tx(tx: &mut sqlx::PgConnection, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute (tx)");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.execute(&mut *tx).await?.rows_affected())
    }
}
