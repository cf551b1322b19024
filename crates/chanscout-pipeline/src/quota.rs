//! Weighted accounting of platform calls.
//!
//! The ledger only counts. The platform enforces its own daily cap by
//! rejecting calls, which surfaces as a quota error in the stage that made it.

use std::collections::BTreeMap;

/// Kind of platform call, each with a fixed unit cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CallCategory {
    Search,
    ChannelDetails,
    PlaylistItems,
    VideoStats,
}

impl CallCategory {
    pub const ALL: [CallCategory; 4] = [
        CallCategory::Search,
        CallCategory::ChannelDetails,
        CallCategory::PlaylistItems,
        CallCategory::VideoStats,
    ];

    /// Units one call of this category costs against the daily quota.
    #[must_use]
    pub const fn weight(self) -> u64 {
        match self {
            CallCategory::Search => 100,
            CallCategory::ChannelDetails | CallCategory::PlaylistItems | CallCategory::VideoStats => 1,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            CallCategory::Search => "search",
            CallCategory::ChannelDetails => "channel_details",
            CallCategory::PlaylistItems => "playlist_items",
            CallCategory::VideoStats => "video_stats",
        }
    }
}

impl std::fmt::Display for CallCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryUsage {
    pub calls: u64,
    pub units: u64,
}

/// Per-run call counts and units, one entry per category that was used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotaLedger {
    usage: BTreeMap<CallCategory, CategoryUsage>,
}

impl QuotaLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one issued call. Counts only ever grow.
    pub fn record(&mut self, category: CallCategory) {
        let entry = self.usage.entry(category).or_default();
        entry.calls += 1;
        entry.units += category.weight();
    }

    #[must_use]
    pub fn total_units(&self) -> u64 {
        self.usage.values().map(|u| u.units).sum()
    }

    #[must_use]
    pub fn total_calls(&self) -> u64 {
        self.usage.values().map(|u| u.calls).sum()
    }

    /// Usage for one category; zero when it was never recorded.
    #[must_use]
    pub fn usage(&self, category: CallCategory) -> CategoryUsage {
        self.usage.get(&category).copied().unwrap_or_default()
    }

    /// Recorded categories in a stable order.
    pub fn entries(&self) -> impl Iterator<Item = (CallCategory, CategoryUsage)> + '_ {
        self.usage.iter().map(|(c, u)| (*c, *u))
    }

    /// Folds another stage's ledger into this one.
    pub fn merge(&mut self, other: &QuotaLedger) {
        for (category, usage) in other.entries() {
            let entry = self.usage.entry(category).or_default();
            entry.calls += usage.calls;
            entry.units += usage.units;
        }
    }

    /// Units left of `daily_limit` after this run alone. Reporting only.
    #[must_use]
    pub fn remaining(&self, daily_limit: u64) -> u64 {
        daily_limit.saturating_sub(self.total_units())
    }
}
