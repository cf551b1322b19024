//! Shared configuration and record types for chanscout.

pub mod app_config;
pub mod channel;
pub mod config;
pub mod discovery;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use channel::{
    CandidateRecord, EnrichedRecord, ExistingEntry, ExistingIndex, RecordUpdate, StoreLocation,
    SOCIAL_LINK_UNAVAILABLE,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use discovery::{load_discovery_config, DiscoveryConfig, SearchOrder};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read discovery config {path}: {source}")]
    DiscoveryFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse discovery config: {0}")]
    DiscoveryFileParse(#[from] serde_yaml::Error),

    #[error("invalid discovery config: {0}")]
    Validation(String),
}
