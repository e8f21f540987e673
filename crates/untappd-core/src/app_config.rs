use std::path::PathBuf;

/// Browser the WebDriver server should launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserKind {
    Chrome,
    Firefox,
}

impl std::fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BrowserKind::Chrome => write!(f, "chrome"),
            BrowserKind::Firefox => write!(f, "firefox"),
        }
    }
}

/// Site login. Only present when both username and password are configured.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Site root, without trailing slash, e.g. `"https://untappd.com"`.
    pub base_url: String,
    pub webdriver_url: String,
    pub browser: BrowserKind,
    pub headless: bool,
    pub credentials: Option<Credentials>,
    pub log_level: String,
    pub output_dir: PathBuf,
    pub ready_timeout_secs: u64,
    pub ready_max_attempts: u32,
    pub ready_absent_delay_ms: u64,
    pub ready_mismatch_delay_ms: u64,
    pub show_more_pause_ms: u64,
    pub show_more_miss_pause_ms: u64,
    pub show_more_max_clicks: usize,
    pub expand_pause_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
}

impl AppConfig {
    /// URL of the login form on the configured site.
    #[must_use]
    pub fn login_url(&self) -> String {
        format!("{}/login", self.base_url)
    }
}
