//! Browser-backed command handlers.
//!
//! Each handler opens one WebDriver session, runs to completion and closes
//! the session whether or not the run succeeded. Per-beer failures in a
//! crawl are logged and skipped so one broken page does not abort the run.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use untappd_core::{AppConfig, BeerRecord, ReviewRecord, SearchResultSet};
use untappd_scraper::{
    login, retry_with_backoff, BeerScraper, ScrapeSettings, SearchScraper, Session,
    WebDriverSession,
};

use crate::export::{save_snapshot, write_csvs, Snapshot, SNAPSHOT_FILE};

async fn open_session(config: &AppConfig) -> anyhow::Result<WebDriverSession> {
    WebDriverSession::connect(&config.webdriver_url, config.browser, config.headless)
        .await
        .with_context(|| format!("failed to start {} via {}", config.browser, config.webdriver_url))
}

async fn close_session(session: WebDriverSession) {
    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "failed to close browser session");
    }
}

async fn sign_in_if_configured<S: Session>(session: &S, config: &AppConfig) -> anyhow::Result<()> {
    match &config.credentials {
        Some(credentials) => login(session, &config.login_url(), credentials)
            .await
            .context("login failed"),
        None => {
            tracing::info!("no credentials configured; browsing anonymously");
            Ok(())
        }
    }
}

pub(crate) async fn run_search(config: &AppConfig, terms: &[String]) -> anyhow::Result<()> {
    let settings = ScrapeSettings::from_config(config);
    let session = open_session(config).await?;
    let result = async {
        sign_in_if_configured(&session, config).await?;
        search_terms(&session, config, &settings, terms).await
    }
    .await;
    close_session(session).await;

    for results in result? {
        println!("{} ({} results)", results.term, results.len());
        for url in &results.urls {
            println!("  {url}");
        }
    }
    Ok(())
}

pub(crate) async fn run_beer(config: &AppConfig, url: &str, json: bool) -> anyhow::Result<()> {
    let settings = ScrapeSettings::from_config(config);
    let session = open_session(config).await?;
    let result = async {
        sign_in_if_configured(&session, config).await?;
        let scraper = BeerScraper::new(&session, &settings);
        retry_with_backoff(config.max_retries, config.retry_backoff_base_secs, || {
            scraper.scrape_beer(url)
        })
        .await
        .with_context(|| format!("failed to scrape {url}"))
    }
    .await;
    close_session(session).await;
    let scraped = result?;

    if json {
        let output = serde_json::json!({
            "beer": scraped.beer,
            "reviews": scraped.reviews.reviews,
            "skipped_checkins": scraped.reviews.skipped.len(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let beer = &scraped.beer;
        println!("{} ({})", beer.name, beer.id);
        println!("  brewery: {}", beer.brewery);
        println!("  style:   {}", beer.style);
        println!("  abv:     {}", beer.abv);
        println!("  ibu:     {}", beer.ibu);
        println!("  rating:  {} from {}", beer.rating, beer.raters);
        println!(
            "  check-ins: {} read, {} skipped",
            scraped.reviews.reviews.len(),
            scraped.reviews.skipped.len()
        );
    }
    Ok(())
}

pub(crate) async fn run_crawl(
    config: &AppConfig,
    terms: &[String],
    out_dir: &Path,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let settings = ScrapeSettings::from_config(config);
    let session = open_session(config).await?;
    let result = crawl(&session, config, &settings, terms, limit).await;
    close_session(session).await;
    let snapshot = result?;

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    save_snapshot(&snapshot, &out_dir.join(SNAPSHOT_FILE))?;
    let summary = write_csvs(&snapshot, out_dir)?;

    println!(
        "scraped {} beers and {} check-ins into {}",
        summary.beers,
        summary.reviews,
        out_dir.display()
    );
    Ok(())
}

async fn crawl<S: Session>(
    session: &S,
    config: &AppConfig,
    settings: &ScrapeSettings,
    terms: &[String],
    limit: Option<usize>,
) -> anyhow::Result<Snapshot> {
    sign_in_if_configured(session, config).await?;

    let searches = search_terms(session, config, settings, terms).await?;
    let urls = distinct_urls(&searches, limit);
    if urls.is_empty() {
        tracing::warn!(terms = terms.len(), "searches found no beers");
        return Ok(Snapshot::new(searches, Vec::new(), Vec::new()));
    }

    let (beers, reviews) = scrape_beers(session, config, settings, &urls).await?;
    Ok(Snapshot::new(searches, beers, reviews))
}

/// Runs every search. A failing term is logged and skipped; the call only
/// fails when no term could be searched.
async fn search_terms<S: Session>(
    session: &S,
    config: &AppConfig,
    settings: &ScrapeSettings,
    terms: &[String],
) -> anyhow::Result<Vec<SearchResultSet>> {
    let scraper = SearchScraper::new(session, settings);
    let mut searches = Vec::with_capacity(terms.len());
    let mut failed_terms = 0usize;

    for term in terms {
        let result = retry_with_backoff(config.max_retries, config.retry_backoff_base_secs, || {
            scraper.scrape_search_term(term)
        })
        .await;
        match result {
            Ok(results) => searches.push(results),
            Err(e) => {
                tracing::error!(term = %term, error = %e, "search failed");
                failed_terms += 1;
            }
        }
    }

    if failed_terms > 0 && failed_terms == terms.len() {
        anyhow::bail!("all {failed_terms} searches failed");
    }
    Ok(searches)
}

async fn scrape_beers<S: Session>(
    session: &S,
    config: &AppConfig,
    settings: &ScrapeSettings,
    urls: &[String],
) -> anyhow::Result<(Vec<BeerRecord>, Vec<ReviewRecord>)> {
    let scraper = BeerScraper::new(session, settings);
    let mut beers = Vec::with_capacity(urls.len());
    let mut reviews = Vec::new();
    let mut failed_beers = 0usize;

    for (index, url) in urls.iter().enumerate() {
        tracing::info!(url = %url, progress = index + 1, total = urls.len(), "scraping beer");
        let result = retry_with_backoff(config.max_retries, config.retry_backoff_base_secs, || {
            scraper.scrape_beer(url)
        })
        .await;
        match result {
            Ok(scraped) => {
                reviews.extend(scraped.reviews.reviews);
                beers.push(scraped.beer);
            }
            Err(e) => {
                tracing::error!(url = %url, error = %e, "failed to scrape beer");
                failed_beers += 1;
            }
        }
    }

    if failed_beers > 0 {
        tracing::warn!(failed_beers, total_beers = urls.len(), "some beers failed to scrape");
    }
    if failed_beers == urls.len() {
        anyhow::bail!("all {failed_beers} beers failed to scrape");
    }
    Ok((beers, reviews))
}

/// Beer URLs across all searches, first occurrence wins, capped at `limit`.
pub(crate) fn distinct_urls(searches: &[SearchResultSet], limit: Option<usize>) -> Vec<String> {
    let limit = limit.unwrap_or(usize::MAX);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut urls = Vec::new();
    for url in searches.iter().flat_map(|s| &s.urls) {
        if urls.len() >= limit {
            break;
        }
        if seen.insert(url.as_str()) {
            urls.push(url.clone());
        }
    }
    urls
}
