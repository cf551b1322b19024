//! Database operations for the `channels` table.

use chanscout_core::{EnrichedRecord, ExistingEntry, ExistingIndex, RecordUpdate, StoreLocation};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{to_bigint, DbError};

/// The slice of a `channels` row needed for reconciliation.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChannelIndexRow {
    pub id: i64,
    pub channel_id: String,
    pub fetched_at: DateTime<Utc>,
}

impl ChannelIndexRow {
    #[must_use]
    pub fn into_entry(self) -> (String, ExistingEntry) {
        (
            self.channel_id,
            ExistingEntry {
                location: StoreLocation(self.id),
                last_fetched_at: self.fetched_at,
            },
        )
    }
}

/// Loads the reconciliation index over every non-excluded channel.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_channel_index(pool: &PgPool) -> Result<ExistingIndex, DbError> {
    let rows = sqlx::query_as::<_, ChannelIndexRow>(
        "SELECT id, channel_id, fetched_at \
         FROM channels \
         WHERE is_excluded = false",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ChannelIndexRow::into_entry).collect())
}

/// Inserts new channel rows in one transaction.
///
/// A channel id that already exists (including excluded rows) is left as is.
/// Returns the number of rows actually inserted.
///
/// # Errors
///
/// Returns [`DbError::OutOfRange`] if a count does not fit a `BIGINT`, or
/// [`DbError::Sqlx`] if any insert fails; nothing is written in that case.
pub async fn insert_channels(pool: &PgPool, records: &[EnrichedRecord]) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0;

    for record in records {
        let c = &record.candidate;
        let result = sqlx::query(
            "INSERT INTO channels \
                 (public_id, channel_id, name, url, subscriber_count, description, \
                  thumbnail_url, social_link, uploads_playlist_id, upload_frequency, \
                  avg_views, avg_likes, avg_comments, last_published_at, fetched_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             ON CONFLICT (channel_id) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(&c.channel_id)
        .bind(&c.name)
        .bind(&c.url)
        .bind(to_bigint(c.subscriber_count, "subscriber_count")?)
        .bind(&c.description)
        .bind(c.thumbnail_url.as_deref())
        .bind(c.social_link.as_deref())
        .bind(&c.uploads_playlist_id)
        .bind(record.upload_frequency)
        .bind(to_bigint(record.avg_views, "avg_views")?)
        .bind(to_bigint(record.avg_likes, "avg_likes")?)
        .bind(to_bigint(record.avg_comments, "avg_comments")?)
        .bind(record.last_published_at)
        .bind(record.fetched_at)
        .execute(&mut *tx)
        .await?;
        inserted += result.rows_affected();
    }

    tx.commit().await?;
    Ok(inserted)
}

/// Overwrites the data columns of existing rows, addressed by row id.
///
/// The exclusion flag and `public_id` are never touched. Returns the number
/// of rows updated.
///
/// # Errors
///
/// Returns [`DbError::OutOfRange`] if a count does not fit a `BIGINT`, or
/// [`DbError::Sqlx`] if any update fails; nothing is written in that case.
pub async fn update_channels(pool: &PgPool, updates: &[RecordUpdate]) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;
    let mut updated = 0;

    for update in updates {
        updated += update_one(&mut tx, update).await?;
    }

    tx.commit().await?;
    Ok(updated)
}

async fn update_one(
    tx: &mut Transaction<'_, Postgres>,
    update: &RecordUpdate,
) -> Result<u64, DbError> {
    let record = &update.record;
    let c = &record.candidate;
    let result = sqlx::query(
        "UPDATE channels SET \
             name = $1, url = $2, subscriber_count = $3, description = $4, \
             thumbnail_url = $5, social_link = $6, uploads_playlist_id = $7, \
             upload_frequency = $8, avg_views = $9, avg_likes = $10, avg_comments = $11, \
             last_published_at = $12, fetched_at = $13, updated_at = NOW() \
         WHERE id = $14 AND channel_id = $15",
    )
    .bind(&c.name)
    .bind(&c.url)
    .bind(to_bigint(c.subscriber_count, "subscriber_count")?)
    .bind(&c.description)
    .bind(c.thumbnail_url.as_deref())
    .bind(c.social_link.as_deref())
    .bind(&c.uploads_playlist_id)
    .bind(record.upload_frequency)
    .bind(to_bigint(record.avg_views, "avg_views")?)
    .bind(to_bigint(record.avg_likes, "avg_likes")?)
    .bind(to_bigint(record.avg_comments, "avg_comments")?)
    .bind(record.last_published_at)
    .bind(record.fetched_at)
    .bind(update.location.0)
    .bind(&c.channel_id)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}
