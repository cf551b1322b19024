//! Append-only API cost log in `quota_usage_log`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// One category's share of a run's API cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaUsageEntry {
    pub category: String,
    pub calls: i32,
    pub units: i32,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QuotaUsageRow {
    pub id: i64,
    pub collection_run_id: Option<i64>,
    pub category: String,
    pub calls: i32,
    pub units: i32,
    pub recorded_at: DateTime<Utc>,
}

/// Appends one row per entry, all stamped with the same run id.
///
/// Entries with zero calls are skipped.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails; nothing is written in that case.
pub async fn insert_quota_usage(
    pool: &PgPool,
    run_id: Option<i64>,
    entries: &[QuotaUsageEntry],
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    for entry in entries.iter().filter(|e| e.calls > 0) {
        sqlx::query(
            "INSERT INTO quota_usage_log (collection_run_id, category, calls, units) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(run_id)
        .bind(&entry.category)
        .bind(entry.calls)
        .bind(entry.units)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Returns the most recent `limit` rows, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_quota_usage(pool: &PgPool, limit: i64) -> Result<Vec<QuotaUsageRow>, DbError> {
    let rows = sqlx::query_as::<_, QuotaUsageRow>(
        "SELECT id, collection_run_id, category, calls, units, recorded_at \
         FROM quota_usage_log \
         ORDER BY recorded_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Total units logged at or after `since`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn sum_units_since(pool: &PgPool, since: DateTime<Utc>) -> Result<i64, DbError> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(SUM(units), 0)::BIGINT FROM quota_usage_log WHERE recorded_at >= $1",
    )
    .bind(since)
    .fetch_one(pool)
    .await?;

    Ok(total)
}
