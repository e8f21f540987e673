//! Crawl snapshots and CSV export.
//!
//! A crawl is saved as one JSON snapshot holding the raw page text. The CSV
//! files are derived from it by normalization, so they can be rebuilt from
//! an old snapshot without touching the site again.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use untappd_core::{BeerRecord, ReviewRecord, SearchResultSet};
use untappd_scraper::normalize_beer;

pub(crate) const SNAPSHOT_FILE: &str = "snapshot.json";
pub(crate) const BEERS_CSV: &str = "beers.csv";
pub(crate) const REVIEWS_CSV: &str = "reviews.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Snapshot {
    pub generated_at: DateTime<Utc>,
    pub searches: Vec<SearchResultSet>,
    pub beers: Vec<BeerRecord>,
    pub reviews: Vec<ReviewRecord>,
}

impl Snapshot {
    pub(crate) fn new(
        searches: Vec<SearchResultSet>,
        beers: Vec<BeerRecord>,
        reviews: Vec<ReviewRecord>,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            searches,
            beers,
            reviews,
        }
    }
}

/// Row counts written by [`write_csvs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ExportSummary {
    pub beers: usize,
    pub reviews: usize,
    /// Beers that failed normalization; their check-ins are dropped too.
    pub skipped_beers: usize,
}

pub(crate) fn save_snapshot(snapshot: &Snapshot, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

pub(crate) fn load_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a crawl snapshot", path.display()))
}

/// Writes `beers.csv` (normalized) and `reviews.csv` into `dir`.
///
/// Check-ins are kept only when their beer made it into `beers.csv`, so the
/// two files always join on the beer id.
pub(crate) fn write_csvs(snapshot: &Snapshot, dir: &Path) -> anyhow::Result<ExportSummary> {
    let beers_path = dir.join(BEERS_CSV);
    let mut beers_csv = csv::Writer::from_path(&beers_path)
        .with_context(|| format!("failed to create {}", beers_path.display()))?;
    let mut exported: HashSet<&str> = HashSet::new();
    let mut beers = 0usize;
    let mut skipped_beers = 0usize;

    for record in &snapshot.beers {
        match normalize_beer(record) {
            Ok(beer) => {
                beers_csv.serialize(&beer)?;
                exported.insert(record.id.as_str());
                beers += 1;
            }
            Err(e) => {
                tracing::warn!(error = %e, "skipping beer that failed normalization");
                skipped_beers += 1;
            }
        }
    }
    beers_csv.flush()?;

    let reviews_path = dir.join(REVIEWS_CSV);
    let mut reviews_csv = csv::Writer::from_path(&reviews_path)
        .with_context(|| format!("failed to create {}", reviews_path.display()))?;
    let mut reviews = 0usize;
    for review in &snapshot.reviews {
        if exported.contains(review.beer_id.as_str()) {
            reviews_csv.serialize(review)?;
            reviews += 1;
        }
    }
    reviews_csv.flush()?;

    let dropped = snapshot.reviews.len() - reviews;
    if dropped > 0 {
        tracing::warn!(dropped, "check-ins without an exported beer were left out");
    }

    Ok(ExportSummary {
        beers,
        reviews,
        skipped_beers,
    })
}

pub(crate) fn run_export(snapshot_path: &Path, out: Option<&Path>) -> anyhow::Result<()> {
    let snapshot = load_snapshot(snapshot_path)?;
    let out_dir = out.unwrap_or_else(|| {
        snapshot_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    });
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let summary = write_csvs(&snapshot, out_dir)?;
    println!(
        "exported {} beers and {} check-ins to {} ({} beers skipped)",
        summary.beers,
        summary.reviews,
        out_dir.display(),
        summary.skipped_beers
    );
    Ok(())
}
