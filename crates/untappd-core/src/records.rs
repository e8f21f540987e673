use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A beer page as rendered, before any normalization.
///
/// Every numeric and date field holds the visible text exactly as the page
/// showed it; stripping units and separators happens in a later pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeerRecord {
    /// Last path segment of the beer URL, e.g. `"4473"` for `/beer/4473`.
    pub id: String,
    pub name: String,
    pub brewery: String,
    pub style: String,
    /// e.g. `"5.6% ABV"`.
    pub abv: String,
    /// e.g. `"35 IBU"` or `"N/A IBU"`.
    pub ibu: String,
    /// e.g. `"(3.87)"`.
    pub rating: String,
    /// e.g. `"1,234 Ratings"`.
    pub raters: String,
    /// e.g. `"Added 03/14/15"`.
    pub date: String,
    /// Description with the trailing "Show Less" affordance removed.
    pub description: String,
}

/// One check-in from a beer's activity stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// [`BeerRecord::id`] of the beer this check-in belongs to.
    pub beer_id: String,
    /// Username taken from the reviewer's profile link.
    pub reviewer: String,
    /// Decoded star rating; `None` when the check-in carries no usable score.
    pub rating: Option<f64>,
    pub comment: Option<String>,
}

/// Candidate beer URLs found for one search term.
///
/// URLs appear in page order; the same beer may be listed more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultSet {
    pub term: String,
    pub urls: Vec<String>,
}

impl SearchResultSet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// A [`BeerRecord`] with its raw text fields parsed into typed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBeer {
    pub id: String,
    pub name: String,
    pub brewery: String,
    pub style: String,
    pub abv: Option<f64>,
    pub ibu: Option<f64>,
    pub rating: Option<f64>,
    pub raters: Option<u64>,
    pub added_on: Option<NaiveDate>,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_record_serializes_missing_rating_as_null() {
        let review = ReviewRecord {
            beer_id: "4473".to_owned(),
            reviewer: "alice".to_owned(),
            rating: None,
            comment: None,
        };
        let value = serde_json::to_value(&review).unwrap();
        assert!(value["rating"].is_null());
        assert!(value["comment"].is_null());
    }

    #[test]
    fn search_result_set_len_counts_duplicates() {
        let set = SearchResultSet {
            term: "pale ale".to_owned(),
            urls: vec![
                "https://untappd.com/beer/1".to_owned(),
                "https://untappd.com/beer/1".to_owned(),
            ],
        };
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
    }
}
