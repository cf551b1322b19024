//! Discovery run settings loaded from `config/discovery.yaml`.
//!
//! A [`DiscoveryConfig`] is built once at run start and passed by reference
//! into every pipeline stage. Nothing reads it from global state.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Hard upper bound the platform accepts for `maxResults` and id lists.
pub const PLATFORM_BATCH_LIMIT: u32 = 50;

/// Ranking order passed to the search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchOrder {
    Relevance,
    Date,
    ViewCount,
    Rating,
    Title,
    VideoCount,
}

impl SearchOrder {
    /// Wire value for the `order` query parameter.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SearchOrder::Relevance => "relevance",
            SearchOrder::Date => "date",
            SearchOrder::ViewCount => "viewCount",
            SearchOrder::Rating => "rating",
            SearchOrder::Title => "title",
            SearchOrder::VideoCount => "videoCount",
        }
    }
}

impl std::fmt::Display for SearchOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Search keywords; every keyword is searched once per order.
    pub keywords: Vec<String>,
    #[serde(default = "default_orders")]
    pub orders: Vec<SearchOrder>,
    /// Static exclusion keywords, merged with the ones the store supplies.
    #[serde(default)]
    pub exclusion_keywords: Vec<String>,
    /// Global cap on distinct channel ids collected per run.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    #[serde(default = "default_min_subscribers")]
    pub min_subscribers: u64,
    #[serde(default = "default_activity_threshold_days")]
    pub activity_threshold_days: u32,
    #[serde(default = "default_refresh_interval_days")]
    pub refresh_interval_days: u32,
    #[serde(default = "default_recent_items_limit")]
    pub recent_items_limit: u32,
    #[serde(default = "default_detail_batch_size")]
    pub detail_batch_size: usize,
    #[serde(default = "default_description_max_chars")]
    pub description_max_chars: usize,
    #[serde(default = "default_inter_call_delay_ms")]
    pub inter_call_delay_ms: u64,
    /// Wall-clock budget for one run, kept below the host's own ceiling.
    #[serde(default = "default_time_budget_secs")]
    pub time_budget_secs: u64,
    /// Platform daily quota, used for reporting only.
    #[serde(default = "default_daily_quota_limit")]
    pub daily_quota_limit: u64,
}

fn default_orders() -> Vec<SearchOrder> {
    vec![SearchOrder::Relevance, SearchOrder::Date]
}
fn default_max_results() -> usize {
    500
}
fn default_page_size() -> u32 {
    PLATFORM_BATCH_LIMIT
}
fn default_max_pages() -> u32 {
    20
}
fn default_min_subscribers() -> u64 {
    1_000
}
fn default_activity_threshold_days() -> u32 {
    90
}
fn default_refresh_interval_days() -> u32 {
    7
}
fn default_recent_items_limit() -> u32 {
    10
}
fn default_detail_batch_size() -> usize {
    50
}
fn default_description_max_chars() -> usize {
    500
}
fn default_inter_call_delay_ms() -> u64 {
    100
}
fn default_time_budget_secs() -> u64 {
    330
}
fn default_daily_quota_limit() -> u64 {
    10_000
}

impl DiscoveryConfig {
    /// Config with every tunable at its default and the given keywords.
    #[must_use]
    pub fn with_keywords(keywords: Vec<String>) -> Self {
        Self {
            keywords,
            orders: default_orders(),
            exclusion_keywords: Vec::new(),
            max_results: default_max_results(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            min_subscribers: default_min_subscribers(),
            activity_threshold_days: default_activity_threshold_days(),
            refresh_interval_days: default_refresh_interval_days(),
            recent_items_limit: default_recent_items_limit(),
            detail_batch_size: default_detail_batch_size(),
            description_max_chars: default_description_max_chars(),
            inter_call_delay_ms: default_inter_call_delay_ms(),
            time_budget_secs: default_time_budget_secs(),
            daily_quota_limit: default_daily_quota_limit(),
        }
    }

    #[must_use]
    pub fn time_budget(&self) -> Duration {
        Duration::from_secs(self.time_budget_secs)
    }

    #[must_use]
    pub fn inter_call_delay(&self) -> Duration {
        Duration::from_millis(self.inter_call_delay_ms)
    }

    #[must_use]
    pub fn activity_threshold(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.activity_threshold_days))
    }

    #[must_use]
    pub fn refresh_interval(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.refresh_interval_days))
    }

    /// Checks the invariants the pipeline relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "at least one non-blank keyword is required".to_string(),
            ));
        }
        if self.orders.is_empty() {
            return Err(ConfigError::Validation(
                "at least one search order is required".to_string(),
            ));
        }
        if self.page_size == 0 || self.page_size > PLATFORM_BATCH_LIMIT {
            return Err(ConfigError::Validation(format!(
                "page_size must be between 1 and {PLATFORM_BATCH_LIMIT}, got {}",
                self.page_size
            )));
        }
        if self.detail_batch_size == 0 || self.detail_batch_size > PLATFORM_BATCH_LIMIT as usize {
            return Err(ConfigError::Validation(format!(
                "detail_batch_size must be between 1 and {PLATFORM_BATCH_LIMIT}, got {}",
                self.detail_batch_size
            )));
        }
        if self.recent_items_limit == 0 || self.recent_items_limit > PLATFORM_BATCH_LIMIT {
            return Err(ConfigError::Validation(format!(
                "recent_items_limit must be between 1 and {PLATFORM_BATCH_LIMIT}, got {}",
                self.recent_items_limit
            )));
        }
        for (name, value) in [
            ("max_results", self.max_results),
            ("description_max_chars", self.description_max_chars),
        ] {
            if value == 0 {
                return Err(ConfigError::Validation(format!("{name} must be non-zero")));
            }
        }
        if self.max_pages == 0 {
            return Err(ConfigError::Validation(
                "max_pages must be non-zero".to_string(),
            ));
        }
        if self.time_budget_secs == 0 {
            return Err(ConfigError::Validation(
                "time_budget_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse and validate discovery settings from YAML text.
///
/// # Errors
///
/// Returns [`ConfigError::DiscoveryFileParse`] on malformed YAML and
/// [`ConfigError::Validation`] when a value is out of range.
pub fn parse_discovery_config(yaml: &str) -> Result<DiscoveryConfig, ConfigError> {
    let config: DiscoveryConfig = serde_yaml::from_str(yaml)?;
    config.validate()?;
    Ok(config)
}

/// Load and validate the discovery configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_discovery_config(path: &Path) -> Result<DiscoveryConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::DiscoveryFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_discovery_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_yaml_fills_defaults() {
        let cfg = parse_discovery_config("keywords: [\"rust tutorial\"]\n").unwrap();
        assert_eq!(cfg.keywords, vec!["rust tutorial".to_string()]);
        assert_eq!(cfg.orders, vec![SearchOrder::Relevance, SearchOrder::Date]);
        assert_eq!(cfg.max_results, 500);
        assert_eq!(cfg.page_size, 50);
        assert_eq!(cfg.max_pages, 20);
        assert_eq!(cfg.min_subscribers, 1_000);
        assert_eq!(cfg.activity_threshold_days, 90);
        assert_eq!(cfg.refresh_interval_days, 7);
        assert_eq!(cfg.recent_items_limit, 10);
        assert_eq!(cfg.detail_batch_size, 50);
        assert_eq!(cfg.description_max_chars, 500);
        assert_eq!(cfg.time_budget_secs, 330);
        assert_eq!(cfg.daily_quota_limit, 10_000);
    }

    #[test]
    fn orders_use_wire_names() {
        let cfg =
            parse_discovery_config("keywords: [a]\norders: [viewCount, videoCount, date]\n")
                .unwrap();
        assert_eq!(
            cfg.orders,
            vec![
                SearchOrder::ViewCount,
                SearchOrder::VideoCount,
                SearchOrder::Date
            ]
        );
        assert_eq!(SearchOrder::ViewCount.as_str(), "viewCount");
    }

    #[test]
    fn rejects_blank_keywords() {
        let err = parse_discovery_config("keywords: [\"  \"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_oversized_detail_batch() {
        let err = parse_discovery_config("keywords: [a]\ndetail_batch_size: 51\n").unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(ref m) if m.contains("detail_batch_size")),
            "got: {err:?}"
        );
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = parse_discovery_config("keywords: [a]\nkeywordz: [b]\n").unwrap_err();
        assert!(matches!(err, ConfigError::DiscoveryFileParse(_)));
    }

    #[test]
    fn with_keywords_passes_validation() {
        let cfg = DiscoveryConfig::with_keywords(vec!["podcast".to_string()]);
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.refresh_interval(), chrono::Duration::days(7));
        assert_eq!(cfg.time_budget(), Duration::from_secs(330));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_discovery_config(Path::new("/nonexistent/discovery.yaml")).unwrap_err();
        assert!(
            matches!(err, ConfigError::DiscoveryFileIo { ref path, .. } if path.contains("nonexistent"))
        );
    }
}
