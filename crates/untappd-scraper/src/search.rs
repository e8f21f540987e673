//! Search result scraping.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use untappd_core::SearchResultSet;

use crate::driver::{By, Element, Session};
use crate::error::ScraperError;
use crate::pagination::exhaust_pagination;
use crate::readiness::ensure_loaded;
use crate::settings::ScrapeSettings;

pub const BEER_ITEM_CLASS: &str = "beer-item";

/// Search page URL for `term`: words are trimmed, percent-encoded and
/// joined with `+`.
#[must_use]
pub fn search_url(base_url: &str, term: &str) -> String {
    let query = term
        .split_whitespace()
        .map(|word| utf8_percent_encode(word, NON_ALPHANUMERIC).to_string())
        .collect::<Vec<_>>()
        .join("+");
    format!("{base_url}/search?q={query}")
}

/// `true` if `href` points at a beer page under `beer_prefix`.
#[must_use]
pub fn is_beer_link(href: &str, beer_prefix: &str) -> bool {
    href.starts_with(beer_prefix)
}

/// Turns a search term into the beer page URLs it lists.
pub struct SearchScraper<'a, S: Session> {
    session: &'a S,
    settings: &'a ScrapeSettings,
}

impl<'a, S: Session> SearchScraper<'a, S> {
    pub fn new(session: &'a S, settings: &'a ScrapeSettings) -> Self {
        Self { session, settings }
    }

    /// Loads the search page for `term`, expands every result batch and
    /// returns the beer links in page order.
    ///
    /// Duplicates are kept; a term with no hits yields an empty set.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Timeout`] if the search page never becomes ready.
    /// - [`ScraperError::Driver`] if navigation or result lookup fails.
    pub async fn scrape_search_term(&self, term: &str) -> Result<SearchResultSet, ScraperError> {
        let url = search_url(&self.settings.base_url, term);
        let load = ensure_loaded(self.session, &url, &self.settings.readiness).await?;
        let pagination = exhaust_pagination(self.session, &self.settings.pagination).await;

        let prefix = self.settings.beer_url_prefix();
        let mut urls = Vec::new();
        for item in self.session.find_many(By::ClassName(BEER_ITEM_CLASS)).await? {
            for link in item.find_many(By::Tag("a")).await? {
                match link.property("href").await? {
                    Some(href) if is_beer_link(&href, &prefix) => urls.push(href),
                    _ => {}
                }
            }
        }

        tracing::info!(
            term,
            results = urls.len(),
            batches = pagination.clicks + 1,
            ready_after = load.attempts,
            "search results collected"
        );

        Ok(SearchResultSet {
            term: term.to_owned(),
            urls,
        })
    }
}
