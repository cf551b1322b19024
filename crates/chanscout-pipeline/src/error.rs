//! Failure types for pipeline I/O and the classifier that decides abort vs. continue.
//!
//! Rejections (too few subscribers, inactive, ...) are not errors; they are
//! [`Rejection`](crate::filter::Rejection) values. Only calls to the platform
//! or the store fail with the types here.

use chanscout_youtube::YoutubeError;
use thiserror::Error;

/// A failed call to a [`ChannelPlatform`](crate::ChannelPlatform).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Youtube(#[from] YoutubeError),

    /// Any other platform implementation's failure, carried as text.
    #[error("{0}")]
    Message(String),
}

/// A failed call to a [`RecordStore`](crate::RecordStore).
#[derive(Debug, Error)]
#[error("{context}: {source}")]
pub struct StoreError {
    pub context: String,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl StoreError {
    #[must_use]
    pub fn new(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            context: context.into(),
            source: source.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The platform's daily cap is spent. Ends the run.
    Quota,
    /// Network fault, timeout, throttling, or a 5xx. Skip the item and continue.
    Transient,
    /// Malformed or missing data in a response.
    Validation,
    Other,
}

const QUOTA_VOCABULARY: &[&str] = &["quota", "dailylimitexceeded", "daily limit"];

const TRANSIENT_VOCABULARY: &[&str] = &[
    "timeout",
    "timed out",
    "connection",
    "network",
    "temporarily",
    "unavailable",
    "rate limit",
    "ratelimitexceeded",
    "backend error",
    "backenderror",
    "reset by peer",
];

const VALIDATION_VOCABULARY: &[&str] = &[
    "invalid",
    "malformed",
    "missing",
    "deserializ",
    "parse",
    "expected",
];

/// Classifies a platform failure.
///
/// Typed [`YoutubeError`]s are inspected structurally; everything else falls
/// back to [`classify_message`].
#[must_use]
pub fn classify(err: &FetchError) -> ErrorClass {
    match err {
        FetchError::Youtube(yt) => classify_youtube(yt),
        FetchError::Message(msg) => classify_message(msg),
    }
}

fn classify_youtube(err: &YoutubeError) -> ErrorClass {
    match err {
        YoutubeError::QuotaExceeded(_) => ErrorClass::Quota,
        YoutubeError::Http(e) => {
            if e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            {
                ErrorClass::Transient
            } else {
                classify_message(&e.to_string())
            }
        }
        YoutubeError::Api { status, .. } => {
            if *status >= 500 || err.is_rate_limited() {
                ErrorClass::Transient
            } else if *status == 400 {
                ErrorClass::Validation
            } else {
                ErrorClass::Other
            }
        }
        YoutubeError::Deserialize { .. } => ErrorClass::Validation,
        YoutubeError::InvalidBaseUrl(_) => ErrorClass::Other,
    }
}

/// Classifies free-form error text by vocabulary, quota first.
#[must_use]
pub fn classify_message(message: &str) -> ErrorClass {
    let lower = message.to_lowercase();
    let mentions = |vocab: &[&str]| vocab.iter().any(|word| lower.contains(word));

    if mentions(QUOTA_VOCABULARY) {
        ErrorClass::Quota
    } else if mentions(TRANSIENT_VOCABULARY) {
        ErrorClass::Transient
    } else if mentions(VALIDATION_VOCABULARY) {
        ErrorClass::Validation
    } else {
        ErrorClass::Other
    }
}

/// The single abort-vs-continue predicate used by every stage.
#[must_use]
pub fn is_quota_error(err: &FetchError) -> bool {
    classify(err) == ErrorClass::Quota
}
