use thiserror::Error;

/// Failure reported by the browser automation layer itself.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("could not start a browser session at {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("webdriver command `{command}` failed: {reason}")]
    Command {
        command: &'static str,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum ScraperError {
    /// The browser rejected a command (navigation, lookup, click). Usually
    /// transient: the DOM was mid-render or the driver hiccuped.
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// The readiness marker never showed up within the polling budget.
    #[error("page {url} not ready after {attempts} attempts ({waited_ms} ms)")]
    Timeout {
        url: String,
        attempts: u32,
        waited_ms: u128,
    },

    /// A required element of the page layout is missing.
    #[error("required element {locator} missing while reading {context}")]
    MissingElement {
        context: &'static str,
        locator: String,
    },

    #[error("invalid beer URL \"{url}\": {reason}")]
    InvalidBeerUrl { url: String, reason: String },

    #[error("normalization error for beer {beer_id}: {reason}")]
    Normalization { beer_id: String, reason: String },
}

impl ScraperError {
    pub(crate) fn missing(context: &'static str, locator: impl std::fmt::Display) -> Self {
        Self::MissingElement {
            context,
            locator: locator.to_string(),
        }
    }
}

/// Returns `true` if `err` describes a condition that may clear up on a
/// fresh attempt (driver hiccup, page slow to render).
///
/// Missing layout elements, bad URLs and normalization failures are
/// deterministic and are never retried.
#[must_use]
pub fn is_retriable(err: &ScraperError) -> bool {
    matches!(err, ScraperError::Driver(_) | ScraperError::Timeout { .. })
}
