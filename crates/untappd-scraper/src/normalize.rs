//! Parsing of a beer page's display strings into typed values.
//!
//! Every parser is lenient: text that does not have the expected shape
//! (`"N/A IBU"`, an empty rating) becomes `None` instead of an error.

use chrono::NaiveDate;
use untappd_core::{BeerRecord, NormalizedBeer};

use crate::error::ScraperError;

const ADDED_DATE_FORMAT: &str = "%m/%d/%y";

/// `"5.6% ABV"` → `5.6`.
#[must_use]
pub fn parse_abv(text: &str) -> Option<f64> {
    first_token(text).and_then(|t| parse_decimal(t.trim_end_matches('%')))
}

/// `"35 IBU"` → `35.0`; `"N/A IBU"` → `None`.
#[must_use]
pub fn parse_ibu(text: &str) -> Option<f64> {
    first_token(text).and_then(parse_decimal)
}

/// `"(3.87)"` → `3.87`.
#[must_use]
pub fn parse_rating(text: &str) -> Option<f64> {
    parse_decimal(text.trim().trim_start_matches('(').trim_end_matches(')'))
}

/// `"1,234 Ratings"` → `1234`.
#[must_use]
pub fn parse_raters(text: &str) -> Option<u64> {
    let digits: String = first_token(text)?.chars().filter(|c| *c != ',').collect();
    digits.parse().ok()
}

/// `"Added 03/14/15"` → 2015-03-14. The date is the second word, written
/// month/day/two-digit-year.
#[must_use]
pub fn parse_added_date(text: &str) -> Option<NaiveDate> {
    let date = text.split_whitespace().nth(1)?;
    NaiveDate::parse_from_str(date, ADDED_DATE_FORMAT).ok()
}

/// Converts a raw [`BeerRecord`] into a [`NormalizedBeer`].
///
/// Unparseable numeric or date fields become `None` and are logged at
/// debug level.
///
/// # Errors
///
/// Returns [`ScraperError::Normalization`] if the record has no identifier,
/// since nothing downstream could join reviews to it.
pub fn normalize_beer(record: &BeerRecord) -> Result<NormalizedBeer, ScraperError> {
    if record.id.trim().is_empty() {
        return Err(ScraperError::Normalization {
            beer_id: record.id.clone(),
            reason: "beer record has an empty id".to_owned(),
        });
    }

    let normalized = NormalizedBeer {
        id: record.id.clone(),
        name: record.name.trim().to_owned(),
        brewery: record.brewery.trim().to_owned(),
        style: record.style.trim().to_owned(),
        abv: parse_abv(&record.abv),
        ibu: parse_ibu(&record.ibu),
        rating: parse_rating(&record.rating),
        raters: parse_raters(&record.raters),
        added_on: parse_added_date(&record.date),
        description: record.description.trim().to_owned(),
    };

    for (field, raw, parsed) in [
        ("abv", &record.abv, normalized.abv.is_some()),
        ("ibu", &record.ibu, normalized.ibu.is_some()),
        ("rating", &record.rating, normalized.rating.is_some()),
        ("raters", &record.raters, normalized.raters.is_some()),
        ("date", &record.date, normalized.added_on.is_some()),
    ] {
        if !parsed {
            tracing::debug!(beer_id = %record.id, field, raw = %raw, "field left unparsed");
        }
    }

    Ok(normalized)
}

fn first_token(text: &str) -> Option<&str> {
    text.split_whitespace().next()
}

fn parse_decimal(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
