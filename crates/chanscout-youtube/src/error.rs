use thiserror::Error;

/// Error reasons the platform uses when the daily quota is spent.
const QUOTA_REASONS: &[&str] = &["quotaExceeded", "dailyLimitExceeded"];

/// Error reasons that signal a short-term throttle rather than a spent quota.
const RATE_LIMIT_REASONS: &[&str] = &["rateLimitExceeded", "userRateLimitExceeded"];

/// Errors returned by the `YouTube` Data API client.
#[derive(Debug, Error)]
pub enum YoutubeError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform rejected the call because the daily quota is spent.
    #[error("YouTube quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The API answered with a non-2xx status and an error envelope.
    #[error("YouTube API error {status} ({reason}): {message}")]
    Api {
        status: u16,
        reason: String,
        message: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),
}

impl YoutubeError {
    /// Builds the error for a non-2xx response from its status and raw body.
    ///
    /// Quota reasons become [`YoutubeError::QuotaExceeded`]; everything else is
    /// kept as [`YoutubeError::Api`]. Bodies that are not an error envelope
    /// still produce an `Api` error carrying the status.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let envelope = serde_json::from_str::<crate::types::ErrorEnvelope>(body).ok();
        let (reason, message) = envelope.map_or_else(
            || (String::from("unknown"), body.chars().take(200).collect()),
            |env| {
                let reason = env
                    .error
                    .errors
                    .first()
                    .and_then(|e| e.reason.clone())
                    .unwrap_or_else(|| String::from("unknown"));
                (reason, env.error.message)
            },
        );

        if QUOTA_REASONS.contains(&reason.as_str()) {
            return YoutubeError::QuotaExceeded(message);
        }
        YoutubeError::Api {
            status,
            reason,
            message,
        }
    }

    /// `true` for 404-style "the thing you asked about does not exist" answers.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, YoutubeError::Api { status: 404, .. })
    }

    /// `true` for throttling responses that clear up after a short wait.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        match self {
            YoutubeError::Api { status, reason, .. } => {
                *status == 429 || RATE_LIMIT_REASONS.contains(&reason.as_str())
            }
            _ => false,
        }
    }
}
