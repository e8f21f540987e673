use std::time::Duration;

use untappd_core::AppConfig;

use crate::extract::FieldSchema;
use crate::pagination::PaginationPolicy;
use crate::readiness::{ReadinessMarker, ReadinessPolicy};

pub const DEFAULT_BASE_URL: &str = "https://untappd.com";

/// Everything the page scrapers need besides a browser session.
#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    /// Site root without trailing slash.
    pub base_url: String,
    pub readiness: ReadinessPolicy,
    pub pagination: PaginationPolicy,
    /// Wait after expanding a truncated description.
    pub expand_pause: Duration,
    pub schema: FieldSchema,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            readiness: ReadinessPolicy::default(),
            pagination: PaginationPolicy::default(),
            expand_pause: Duration::from_millis(500),
            schema: FieldSchema::default(),
        }
    }
}

impl ScrapeSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let defaults = Self::default();
        Self {
            base_url: config.base_url.clone(),
            readiness: ReadinessPolicy {
                marker: ReadinessMarker::default(),
                max_attempts: config.ready_max_attempts,
                timeout: Duration::from_secs(config.ready_timeout_secs),
                absent_delay: Duration::from_millis(config.ready_absent_delay_ms),
                mismatch_delay: Duration::from_millis(config.ready_mismatch_delay_ms),
                max_delay: defaults.readiness.max_delay,
            },
            pagination: PaginationPolicy {
                tolerance: defaults.pagination.tolerance,
                click_pause: Duration::from_millis(config.show_more_pause_ms),
                miss_pause: Duration::from_millis(config.show_more_miss_pause_ms),
                max_clicks: config.show_more_max_clicks,
            },
            expand_pause: Duration::from_millis(config.expand_pause_ms),
            schema: defaults.schema,
        }
    }

    /// URL prefix every beer page shares, e.g. `https://untappd.com/beer`.
    #[must_use]
    pub fn beer_url_prefix(&self) -> String {
        format!("{}/beer", self.base_url)
    }
}
