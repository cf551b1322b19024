//! Channel discovery pipeline: discover, filter, enrich, reconcile.
//!
//! Every stage takes the immutable [`DiscoveryConfig`](chanscout_core::DiscoveryConfig)
//! and an [`ExecutionWindow`] by reference and returns its own [`QuotaLedger`]
//! and [`FilterStats`]; [`run_discovery`] merges them into a [`RunReport`].
//! External services are reached only through the [`ChannelPlatform`] and
//! [`RecordStore`] traits.

pub mod discover;
pub mod enrich;
pub mod error;
pub mod filter;
pub mod manual;
pub mod platform;
pub mod quota;
pub mod reconcile;
pub mod run;
pub mod social;
pub mod window;

mod youtube;

pub use error::{classify, is_quota_error, ErrorClass, FetchError, StoreError};
pub use filter::{FilterStats, Rejection};
pub use manual::{
    add_channel, AddError, AddFailure, ChannelIdentifier, ManualOutcome, ManualReport,
};
pub use platform::{
    ChannelPlatform, ItemStats, RawChannel, RawThumbnails, RecentItem, RecordStore, SearchPage,
};
pub use quota::{CallCategory, CategoryUsage, QuotaLedger};
pub use run::{run_discovery, Halt, RunReport, RunStatus};
pub use window::ExecutionWindow;
