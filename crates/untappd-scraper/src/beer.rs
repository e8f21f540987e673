//! Single beer page scraping.
//!
//! Order matters here: the description's expand link and the check-in
//! stream's pagination control share the "Show More" text, so the beer
//! fields are read before the stream is paginated.

use untappd_core::BeerRecord;

use crate::driver::Session;
use crate::error::ScraperError;
use crate::extract::extract_fields;
use crate::pagination::{exhaust_pagination, PaginationSummary};
use crate::readiness::{ensure_loaded, PageLoad};
use crate::reviews::{collect_reviews, ReviewCollection};
use crate::settings::ScrapeSettings;

/// Everything read from one beer page.
#[derive(Debug)]
pub struct ScrapedBeer {
    pub beer: BeerRecord,
    pub reviews: ReviewCollection,
    pub load: PageLoad,
    pub pagination: PaginationSummary,
}

/// Beer identifier from a page URL: the last path segment, ignoring query,
/// fragment and trailing slashes.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidBeerUrl`] if no segment is left.
pub fn beer_id_from_url(url: &str) -> Result<String, ScraperError> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let id = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    if id.is_empty() {
        return Err(ScraperError::InvalidBeerUrl {
            url: url.to_owned(),
            reason: "no path segment to use as beer id".to_owned(),
        });
    }
    Ok(id.to_owned())
}

pub struct BeerScraper<'a, S: Session> {
    session: &'a S,
    settings: &'a ScrapeSettings,
}

impl<'a, S: Session> BeerScraper<'a, S> {
    pub fn new(session: &'a S, settings: &'a ScrapeSettings) -> Self {
        Self { session, settings }
    }

    /// Loads `url`, reads the beer fields, expands the check-in stream and
    /// collects every check-in.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidBeerUrl`] before any navigation if `url` has
    ///   no usable identifier.
    /// - [`ScraperError::Timeout`] if the page never becomes ready.
    /// - [`ScraperError::MissingElement`] if a beer field, the description or
    ///   the check-in stream is missing.
    /// - [`ScraperError::Driver`] on browser failures outside a single
    ///   check-in.
    pub async fn scrape_beer(&self, url: &str) -> Result<ScrapedBeer, ScraperError> {
        let beer_id = beer_id_from_url(url)?;
        let load = ensure_loaded(self.session, url, &self.settings.readiness).await?;

        let beer = extract_fields(
            self.session,
            &self.settings.schema,
            &beer_id,
            self.settings.expand_pause,
        )
        .await?;
        let pagination = exhaust_pagination(self.session, &self.settings.pagination).await;
        let reviews = collect_reviews(self.session, &beer_id).await?;

        tracing::info!(
            beer_id = %beer_id,
            name = %beer.name,
            reviews = reviews.reviews.len(),
            skipped = reviews.skipped.len(),
            capped = pagination.capped,
            "beer scraped"
        );

        Ok(ScrapedBeer {
            beer,
            reviews,
            load,
            pagination,
        })
    }
}

#[cfg(test)]
#[path = "beer_test.rs"]
mod tests;
