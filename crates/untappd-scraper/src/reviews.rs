//! Check-in stream collection.
//!
//! Each check-in in the activity stream is read on its own. A check-in that
//! cannot be attributed (no reviewer link) or has no rating element at all is
//! skipped and recorded in [`ReviewCollection::skipped`]; the rest of the
//! stream is still collected.
//!
//! Ratings are encoded in a class name on the rating badge, e.g.
//! `class="rating small r35"` for 3.5 stars: the digits are the rating with
//! the decimal point removed.

use thiserror::Error;
use untappd_core::ReviewRecord;

use crate::driver::{By, Element, Session};
use crate::error::{DriverError, ScraperError};

pub const STREAM_ID: &str = "main-stream";
pub const CHECKIN_CLASS: &str = "checkin";
pub const USER_LINK_CLASS: &str = "user";
pub const RATING_SERVING_CLASS: &str = "rating-serving";
pub const RATING_CLASS_PREFIX: &str = "rating small";
pub const COMMENT_CLASS: &str = "comment-text";

const USER_PATH: &str = "/user/";

/// Why a single check-in produced no record.
#[derive(Debug, Error)]
pub enum ReviewSkip {
    #[error("check-in has no reviewer profile link")]
    MissingReviewer,

    #[error("check-in has no rating element")]
    MissingRatingElement,

    #[error(transparent)]
    Driver(#[from] DriverError),
}

#[derive(Debug)]
pub struct SkippedReview {
    /// Position of the check-in in the stream.
    pub index: usize,
    pub reason: ReviewSkip,
}

/// Everything read from one activity stream.
#[derive(Debug, Default)]
pub struct ReviewCollection {
    pub reviews: Vec<ReviewRecord>,
    pub skipped: Vec<SkippedReview>,
}

impl ReviewCollection {
    /// Number of check-in elements examined.
    #[must_use]
    pub fn seen(&self) -> usize {
        self.reviews.len() + self.skipped.len()
    }
}

/// Reads every check-in currently rendered in the activity stream.
///
/// # Errors
///
/// - [`ScraperError::MissingElement`] if the stream container is absent.
/// - [`ScraperError::Driver`] if listing the check-ins fails.
///
/// Failures inside a single check-in never fail the batch.
pub async fn collect_reviews<S: Session>(
    session: &S,
    beer_id: &str,
) -> Result<ReviewCollection, ScraperError> {
    let stream_by = By::Id(STREAM_ID);
    let stream = session
        .find_one(stream_by)
        .await?
        .ok_or_else(|| ScraperError::missing("check-in stream", stream_by))?;
    let items = stream.find_many(By::ClassName(CHECKIN_CLASS)).await?;

    let mut collection = ReviewCollection::default();
    for (index, item) in items.iter().enumerate() {
        match extract_review(item, beer_id).await {
            Ok(review) => collection.reviews.push(review),
            Err(reason) => {
                tracing::debug!(beer_id, index, reason = %reason, "skipping check-in");
                collection.skipped.push(SkippedReview { index, reason });
            }
        }
    }

    if !collection.skipped.is_empty() {
        tracing::warn!(
            beer_id,
            skipped = collection.skipped.len(),
            collected = collection.reviews.len(),
            "some check-ins could not be read"
        );
    }

    Ok(collection)
}

/// Builds a [`ReviewRecord`] from one check-in element.
///
/// # Errors
///
/// Returns a [`ReviewSkip`] when the check-in has no usable reviewer link,
/// no rating element, or the browser fails mid-read.
pub async fn extract_review<E: Element>(
    item: &E,
    beer_id: &str,
) -> Result<ReviewRecord, ReviewSkip> {
    let reviewer = read_reviewer(item).await?;
    let rating = read_rating(item).await?;
    let comment = read_comment(item).await;

    Ok(ReviewRecord {
        beer_id: beer_id.to_owned(),
        reviewer,
        rating,
        comment,
    })
}

async fn read_reviewer<E: Element>(item: &E) -> Result<String, ReviewSkip> {
    let link = item
        .find_one(By::ClassName(USER_LINK_CLASS))
        .await?
        .ok_or(ReviewSkip::MissingReviewer)?;
    let href = link
        .property("href")
        .await?
        .ok_or(ReviewSkip::MissingReviewer)?;
    reviewer_from_href(&href).ok_or(ReviewSkip::MissingReviewer)
}

/// `Ok(None)` means the badge is there but carries no decodable score.
async fn read_rating<E: Element>(item: &E) -> Result<Option<f64>, ReviewSkip> {
    let serving = item
        .find_one(By::ClassName(RATING_SERVING_CLASS))
        .await?
        .ok_or(ReviewSkip::MissingRatingElement)?;

    let mut code = None;
    for span in serving.find_many(By::Tag("span")).await? {
        if let Some(class_attr) = span.attribute("class").await? {
            if let Some(found) = rating_code(&class_attr) {
                code = Some(found.to_owned());
            }
        }
    }

    Ok(code.as_deref().and_then(decode_rating))
}

async fn read_comment<E: Element>(item: &E) -> Option<String> {
    match item.find_one(By::ClassName(COMMENT_CLASS)).await {
        Ok(Some(node)) => match node.text().await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::debug!(error = %e, "comment text unreadable");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::debug!(error = %e, "comment lookup failed");
            None
        }
    }
}

/// Extracts the encoded rating from a badge's class attribute.
///
/// `"rating small r35"` yields `Some("35")`; classes without the
/// `rating small` prefix yield `None`.
#[must_use]
pub fn rating_code(class_attr: &str) -> Option<&str> {
    let rest = class_attr.strip_prefix(RATING_CLASS_PREFIX)?;
    let token = rest.split_whitespace().last()?;
    let mut chars = token.chars();
    chars.next()?;
    Some(chars.as_str())
}

/// Turns a tenths-encoded rating code into a number.
///
/// One digit is a whole rating (`"5"` → 5.0). Longer codes get a decimal
/// point after the first digit (`"35"` → 3.5, `"100"` → 1.00). Anything that
/// is not all ASCII digits decodes to `None`.
#[must_use]
pub fn decode_rating(code: &str) -> Option<f64> {
    if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (whole, fraction) = code.split_at(1);
    let text = if fraction.is_empty() {
        whole.to_owned()
    } else {
        format!("{whole}.{fraction}")
    };
    text.parse::<f64>().ok()
}

/// Username from a profile link, e.g. `https://untappd.com/user/alice` →
/// `alice`. Falls back to the last path segment for unexpected shapes.
#[must_use]
pub fn reviewer_from_href(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    let segment = match path.split_once(USER_PATH) {
        Some((_, rest)) => rest.split('/').next().unwrap_or(rest),
        None => path.trim_end_matches('/').rsplit('/').next().unwrap_or(path),
    };
    (!segment.is_empty()).then(|| segment.to_owned())
}

#[cfg(test)]
#[path = "reviews_test.rs"]
mod tests;
