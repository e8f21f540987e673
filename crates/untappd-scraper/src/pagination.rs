//! "Show More" pagination.
//!
//! Activity streams and search results render a page of items plus a
//! "Show More" control. [`exhaust_pagination`] keeps clicking the newest
//! control until it stops turning up. Stale copies of the control can linger
//! higher in the DOM, so the last match is the live one.
//!
//! A miss (no control, lookup error, failed click) bumps a counter that is
//! never reset; the loader stops once it reaches the tolerance. Two misses
//! absorb one slow render without spinning on a list that is already
//! exhausted.

use std::time::Duration;

use crate::driver::{By, Element, Session};

pub const SHOW_MORE_TEXT: &str = "Show More";

#[derive(Debug, Clone)]
pub struct PaginationPolicy {
    /// Misses allowed before giving up.
    pub tolerance: u32,
    /// Pause after a successful click, for the next batch to render.
    pub click_pause: Duration,
    /// Pause after a miss.
    pub miss_pause: Duration,
    /// Hard stop on clicks, for a control that never goes away.
    pub max_clicks: usize,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            tolerance: 2,
            click_pause: Duration::from_secs(1),
            miss_pause: Duration::from_secs(2),
            max_clicks: 1000,
        }
    }
}

/// Counters for one pagination run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationState {
    pub clicks: usize,
    pub misses: u32,
}

/// How a pagination run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationSummary {
    pub clicks: usize,
    pub misses: u32,
    /// `true` if the run stopped on `max_clicks` rather than on misses.
    pub capped: bool,
}

/// Clicks "Show More" until it has been missing `policy.tolerance` times.
///
/// Best-effort: never fails. Whatever content loaded is left in the DOM for
/// the extractors.
pub async fn exhaust_pagination<S: Session>(
    session: &S,
    policy: &PaginationPolicy,
) -> PaginationSummary {
    let mut state = PaginationState::default();

    while state.misses < policy.tolerance {
        if state.clicks >= policy.max_clicks {
            tracing::warn!(
                clicks = state.clicks,
                "pagination control never went away; stopping at click limit"
            );
            return PaginationSummary {
                clicks: state.clicks,
                misses: state.misses,
                capped: true,
            };
        }

        if click_last_control(session).await {
            state.clicks += 1;
            tokio::time::sleep(policy.click_pause).await;
        } else {
            state.misses += 1;
            tokio::time::sleep(policy.miss_pause).await;
        }
    }

    tracing::debug!(clicks = state.clicks, misses = state.misses, "pagination exhausted");
    PaginationSummary {
        clicks: state.clicks,
        misses: state.misses,
        capped: false,
    }
}

/// Returns `true` if a control was found and clicked.
async fn click_last_control<S: Session>(session: &S) -> bool {
    let controls = match session.find_many(By::ContainsText(SHOW_MORE_TEXT)).await {
        Ok(controls) => controls,
        Err(e) => {
            tracing::debug!(error = %e, "pagination control lookup failed");
            return false;
        }
    };
    let Some(control) = controls.last() else {
        return false;
    };
    match control.click().await {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(error = %e, "pagination control click failed");
            false
        }
    }
}
