//! Keyword × order search matrix with pagination and id deduplication.

use std::collections::HashSet;
use std::time::Duration;

use chanscout_core::DiscoveryConfig;

use crate::error::is_quota_error;
use crate::platform::ChannelPlatform;
use crate::quota::{CallCategory, QuotaLedger};
use crate::run::Halt;
use crate::window::ExecutionWindow;

#[derive(Debug, Default)]
pub struct DiscoveryOutcome {
    /// Distinct channel ids in first-seen order, at most `max_results`.
    pub ids: Vec<String>,
    pub ledger: QuotaLedger,
    pub pages_fetched: u32,
    /// (order, keyword) pairs abandoned after a non-quota failure.
    pub pairs_abandoned: u32,
    pub halt: Option<Halt>,
}

/// Inter-call pacing; not applied after a quota failure.
async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Runs every (order, keyword) pair through paginated search.
///
/// Pagination of a pair stops at the global cap, at `max_pages`, when the
/// window expires, or when no next page token comes back. A non-quota failure
/// abandons the current pair only; a quota failure stops the whole matrix.
pub async fn discover_ids(
    platform: &dyn ChannelPlatform,
    config: &DiscoveryConfig,
    window: &ExecutionWindow,
) -> DiscoveryOutcome {
    let mut outcome = DiscoveryOutcome::default();
    let mut seen: HashSet<String> = HashSet::new();
    let cap = config.max_results;
    let delay = config.inter_call_delay();

    'matrix: for order in &config.orders {
        for keyword in config.keywords.iter().map(|k| k.trim()).filter(|k| !k.is_empty()) {
            let mut page_token: Option<String> = None;

            for page in 0..config.max_pages {
                if outcome.ids.len() >= cap {
                    tracing::info!(cap, "result cap reached, stopping discovery");
                    break 'matrix;
                }
                if window.is_expired() {
                    tracing::warn!(%order, keyword, page, "time budget exhausted during discovery");
                    outcome.halt = Some(Halt::Deadline);
                    break 'matrix;
                }

                let result = platform
                    .search(keyword, *order, config.page_size, page_token.as_deref())
                    .await;
                outcome.ledger.record(CallCategory::Search);
                outcome.pages_fetched += 1;

                let search_page = match result {
                    Ok(p) => p,
                    Err(e) if is_quota_error(&e) => {
                        tracing::error!(%order, keyword, error = %e, "quota exhausted during search, stopping discovery");
                        outcome.halt = Some(Halt::Quota(e.to_string()));
                        break 'matrix;
                    }
                    Err(e) => {
                        tracing::warn!(%order, keyword, page, error = %e, "search failed, abandoning keyword");
                        outcome.pairs_abandoned += 1;
                        pause(delay).await;
                        break;
                    }
                };

                pause(delay).await;

                let before = outcome.ids.len();
                for id in search_page.ids {
                    if outcome.ids.len() >= cap {
                        break;
                    }
                    if seen.insert(id.clone()) {
                        outcome.ids.push(id);
                    }
                }
                tracing::debug!(
                    %order,
                    keyword,
                    page,
                    new_ids = outcome.ids.len() - before,
                    total_ids = outcome.ids.len(),
                    "search page processed"
                );

                match search_page.next_page_token {
                    Some(token) => page_token = Some(token),
                    None => break,
                }
            }
        }
    }

    tracing::info!(
        ids = outcome.ids.len(),
        pages = outcome.pages_fetched,
        pairs_abandoned = outcome.pairs_abandoned,
        "discovery complete"
    );
    outcome
}
