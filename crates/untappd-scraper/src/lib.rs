pub mod beer;
pub mod driver;
pub mod error;
pub mod extract;
pub mod login;
pub mod normalize;
pub mod pagination;
pub mod readiness;
pub mod retry;
pub mod reviews;
pub mod search;
pub mod settings;
pub mod webdriver;

#[cfg(test)]
mod fake_dom;

pub use beer::{beer_id_from_url, BeerScraper, ScrapedBeer};
pub use driver::{By, Element, Session};
pub use error::{is_retriable, DriverError, ScraperError};
pub use login::login;
pub use normalize::normalize_beer;
pub use retry::retry_with_backoff;
pub use reviews::{ReviewCollection, ReviewSkip, SkippedReview};
pub use search::SearchScraper;
pub use settings::ScrapeSettings;
pub use webdriver::WebDriverSession;
