//! Partition of discovered ids against the existing record index.

use chanscout_core::{ExistingIndex, StoreLocation};
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Not in the index.
    pub new_ids: Vec<String>,
    /// In the index and at least `refresh_interval` old.
    pub update_due: Vec<(String, StoreLocation)>,
    /// In the index and fresher than `refresh_interval`.
    pub skipped: Vec<String>,
}

impl Partition {
    /// Ids that need a detail lookup: new ones first, then update-due ones.
    #[must_use]
    pub fn ids_to_fetch(&self) -> Vec<String> {
        self.new_ids
            .iter()
            .cloned()
            .chain(self.update_due.iter().map(|(id, _)| id.clone()))
            .collect()
    }

    #[must_use]
    pub fn location_of(&self, channel_id: &str) -> Option<StoreLocation> {
        self.update_due
            .iter()
            .find(|(id, _)| id == channel_id)
            .map(|(_, loc)| *loc)
    }
}

/// Splits `ids` into new, update-due, and skipped.
///
/// Age is `now - last_fetched_at`; an age equal to `refresh_interval` is due.
/// Order within each list follows `ids`.
#[must_use]
pub fn partition(
    ids: &[String],
    index: &ExistingIndex,
    refresh_interval: Duration,
    now: DateTime<Utc>,
) -> Partition {
    let mut out = Partition::default();
    for id in ids {
        match index.get(id) {
            None => out.new_ids.push(id.clone()),
            Some(entry) if now - entry.last_fetched_at >= refresh_interval => {
                out.update_due.push((id.clone(), entry.location));
            }
            Some(_) => out.skipped.push(id.clone()),
        }
    }
    out
}
