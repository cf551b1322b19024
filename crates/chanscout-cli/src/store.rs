//! [`RecordStore`] implementations backed by Postgres.

use async_trait::async_trait;
use chanscout_core::{EnrichedRecord, ExistingIndex, RecordUpdate};
use chanscout_pipeline::{RecordStore, StoreError};
use sqlx::PgPool;

pub(crate) struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn existing_index(&self) -> Result<ExistingIndex, StoreError> {
        chanscout_db::list_channel_index(&self.pool)
            .await
            .map_err(|e| StoreError::new("loading channel index", e))
    }

    async fn excluded_keywords(&self) -> Result<Vec<String>, StoreError> {
        chanscout_db::list_active_exclusion_keywords(&self.pool)
            .await
            .map_err(|e| StoreError::new("loading exclusion keywords", e))
    }

    async fn append_new(&self, records: &[EnrichedRecord]) -> Result<u64, StoreError> {
        let inserted = chanscout_db::insert_channels(&self.pool, records)
            .await
            .map_err(|e| StoreError::new("inserting channels", e))?;
        let ignored = u64::try_from(records.len())
            .unwrap_or(u64::MAX)
            .saturating_sub(inserted);
        if ignored > 0 {
            tracing::warn!(ignored, "channels already present at insert time were left as is");
        }
        tracing::info!(inserted, "channels appended");
        Ok(inserted)
    }

    async fn apply_updates(&self, updates: &[RecordUpdate]) -> Result<(), StoreError> {
        let updated = chanscout_db::update_channels(&self.pool, updates)
            .await
            .map_err(|e| StoreError::new("updating channels", e))?;
        tracing::info!(updated, "channels refreshed");
        Ok(())
    }
}

/// Reads through to `inner`; writes are logged and dropped.
pub(crate) struct DryRunStore<'a> {
    inner: &'a dyn RecordStore,
}

impl<'a> DryRunStore<'a> {
    pub(crate) fn new(inner: &'a dyn RecordStore) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl RecordStore for DryRunStore<'_> {
    async fn existing_index(&self) -> Result<ExistingIndex, StoreError> {
        self.inner.existing_index().await
    }

    async fn excluded_keywords(&self) -> Result<Vec<String>, StoreError> {
        self.inner.excluded_keywords().await
    }

    /// Reports every record as written so callers see what a real run would add.
    async fn append_new(&self, records: &[EnrichedRecord]) -> Result<u64, StoreError> {
        tracing::info!(count = records.len(), "dry-run: skipping channel inserts");
        Ok(u64::try_from(records.len()).unwrap_or(u64::MAX))
    }

    async fn apply_updates(&self, updates: &[RecordUpdate]) -> Result<(), StoreError> {
        tracing::info!(count = updates.len(), "dry-run: skipping channel updates");
        Ok(())
    }
}
