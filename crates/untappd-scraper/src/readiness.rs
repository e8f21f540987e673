//! Page readiness gate.
//!
//! After navigation the page is polled for a marker element (the site logo)
//! until it shows the expected text. Polling is bounded by an attempt count
//! and a wall-clock budget; running out of either is a
//! [`ScraperError::Timeout`]. Once ready, the app-install banner is closed
//! if it is showing. The banner step is best-effort and only reported.

use std::time::Duration;

use tokio::time::Instant;

use crate::driver::{By, Element, Session};
use crate::error::ScraperError;

pub const BANNER_FRAME_ID: &str = "branch-banner-iframe";
pub const BANNER_CLOSE_ID: &str = "branch-banner-close";

/// Element whose presence and text confirm the page belongs to the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessMarker {
    pub class_name: &'static str,
    pub text: &'static str,
}

impl Default for ReadinessMarker {
    fn default() -> Self {
        Self {
            class_name: "logo",
            text: "Untappd",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReadinessPolicy {
    pub marker: ReadinessMarker,
    /// Upper bound on marker checks, including the first.
    pub max_attempts: u32,
    /// Upper bound on total time spent polling.
    pub timeout: Duration,
    /// Base wait after the marker was not found.
    pub absent_delay: Duration,
    /// Base wait after the marker was found with the wrong text.
    pub mismatch_delay: Duration,
    /// Ceiling for the per-attempt wait once backoff kicks in.
    pub max_delay: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            marker: ReadinessMarker::default(),
            max_attempts: 20,
            timeout: Duration::from_secs(60),
            absent_delay: Duration::from_secs(2),
            mismatch_delay: Duration::from_secs(3),
            max_delay: Duration::from_secs(10),
        }
    }
}

/// What happened to the app-install banner after the page became ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerOutcome {
    Absent,
    Dismissed,
    /// The banner was there but could not be closed. Scraping continues.
    Failed,
}

/// Result of a successful [`ensure_loaded`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLoad {
    pub url: String,
    /// Marker checks performed, including the successful one.
    pub attempts: u32,
    pub banner: BannerOutcome,
}

enum MarkerCheck {
    Ready,
    Absent,
    Mismatch(String),
}

/// Navigates to `url` and waits until the readiness marker is present.
///
/// # Errors
///
/// - [`ScraperError::Driver`] if navigation itself fails.
/// - [`ScraperError::Timeout`] if the marker is still missing (or wrong)
///   after `policy.max_attempts` checks or `policy.timeout`.
pub async fn ensure_loaded<S: Session>(
    session: &S,
    url: &str,
    policy: &ReadinessPolicy,
) -> Result<PageLoad, ScraperError> {
    session.navigate(url).await?;

    let started = Instant::now();
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let base_delay = match check_marker(session, &policy.marker).await {
            MarkerCheck::Ready => break,
            MarkerCheck::Absent => {
                tracing::debug!(url, attempt, "readiness marker not found, pausing");
                policy.absent_delay
            }
            MarkerCheck::Mismatch(found) => {
                tracing::debug!(url, attempt, found = %found, "readiness marker text mismatch, pausing");
                policy.mismatch_delay
            }
        };

        let delay = backoff_delay(base_delay, attempt, policy.max_delay);
        let elapsed = started.elapsed();
        if attempt >= policy.max_attempts || elapsed + delay > policy.timeout {
            tracing::warn!(
                url,
                attempts = attempt,
                elapsed_ms = elapsed.as_millis(),
                "page never became ready"
            );
            return Err(ScraperError::Timeout {
                url: url.to_owned(),
                attempts: attempt,
                waited_ms: elapsed.as_millis(),
            });
        }
        tokio::time::sleep(delay).await;
    }

    let banner = dismiss_banner(session).await;
    tracing::debug!(url, attempts = attempt, ?banner, "page ready");

    Ok(PageLoad {
        url: url.to_owned(),
        attempts: attempt,
        banner,
    })
}

/// `base * 2^(attempt - 1)`, capped at `max`.
fn backoff_delay(base: Duration, attempt: u32, max: Duration) -> Duration {
    let factor = 1u32 << attempt.saturating_sub(1).min(16);
    base.saturating_mul(factor).min(max)
}

async fn check_marker<S: Session>(session: &S, marker: &ReadinessMarker) -> MarkerCheck {
    let logo = match session.find_one(By::ClassName(marker.class_name)).await {
        Ok(Some(logo)) => logo,
        Ok(None) => return MarkerCheck::Absent,
        Err(e) => {
            tracing::debug!(error = %e, "readiness marker lookup failed");
            return MarkerCheck::Absent;
        }
    };
    match logo.text().await {
        Ok(text) if text.trim() == marker.text => MarkerCheck::Ready,
        Ok(text) => MarkerCheck::Mismatch(text),
        Err(e) => {
            tracing::debug!(error = %e, "readiness marker text unreadable");
            MarkerCheck::Absent
        }
    }
}

/// Closes the app-install banner if it is showing, then always returns to
/// the top-level document. Never fails.
async fn dismiss_banner<S: Session>(session: &S) -> BannerOutcome {
    let outcome = match session.find_one(By::Id(BANNER_FRAME_ID)).await {
        Ok(None) => BannerOutcome::Absent,
        Ok(Some(frame)) => match close_banner(session, &frame).await {
            Ok(true) => BannerOutcome::Dismissed,
            Ok(false) => {
                tracing::debug!("banner frame has no close control");
                BannerOutcome::Failed
            }
            Err(e) => {
                tracing::debug!(error = %e, "could not close banner");
                BannerOutcome::Failed
            }
        },
        Err(e) => {
            tracing::debug!(error = %e, "banner lookup failed");
            BannerOutcome::Failed
        }
    };

    if let Err(e) = session.switch_default_context().await {
        tracing::debug!(error = %e, "could not switch back to default content");
    }

    outcome
}

async fn close_banner<S: Session>(
    session: &S,
    frame: &S::Element,
) -> Result<bool, crate::error::DriverError> {
    session.switch_frame(frame).await?;
    match session.find_one(By::Id(BANNER_CLOSE_ID)).await? {
        Some(close) => {
            close.click().await?;
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
#[path = "readiness_test.rs"]
mod tests;
