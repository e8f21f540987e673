use crate::app_config::{AppConfig, BrowserKind, Credentials};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid or only half of the login
/// credentials is set.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid or only half of the login
/// credentials is set.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let base_url = or_default("UNTAPPD_BASE_URL", "https://untappd.com")
        .trim_end_matches('/')
        .to_string();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(invalid(
            "UNTAPPD_BASE_URL",
            format!("\"{base_url}\" is not an http(s) URL"),
        ));
    }

    let webdriver_url = or_default("UNTAPPD_WEBDRIVER_URL", "http://localhost:4444");
    let browser = parse_browser(&or_default("UNTAPPD_BROWSER", "chrome"))?;
    let headless = parse_bool("UNTAPPD_HEADLESS", &or_default("UNTAPPD_HEADLESS", "true"))?;
    let credentials = parse_credentials(
        lookup("UNTAPPD_USERNAME").ok(),
        lookup("UNTAPPD_PASSWORD").ok(),
    )?;
    let log_level = or_default("UNTAPPD_LOG_LEVEL", "info");
    let output_dir = PathBuf::from(or_default("UNTAPPD_OUTPUT_DIR", "./output"));

    let ready_timeout_secs = parse_u64("UNTAPPD_READY_TIMEOUT_SECS", "60")?;
    let ready_max_attempts = parse_u32("UNTAPPD_READY_MAX_ATTEMPTS", "20")?;
    if ready_max_attempts == 0 {
        return Err(invalid(
            "UNTAPPD_READY_MAX_ATTEMPTS",
            "must be at least 1".to_string(),
        ));
    }
    let ready_absent_delay_ms = parse_u64("UNTAPPD_READY_ABSENT_DELAY_MS", "2000")?;
    let ready_mismatch_delay_ms = parse_u64("UNTAPPD_READY_MISMATCH_DELAY_MS", "3000")?;

    let show_more_pause_ms = parse_u64("UNTAPPD_SHOW_MORE_PAUSE_MS", "1000")?;
    let show_more_miss_pause_ms = parse_u64("UNTAPPD_SHOW_MORE_MISS_PAUSE_MS", "2000")?;
    let show_more_max_clicks = parse_usize("UNTAPPD_SHOW_MORE_MAX_CLICKS", "1000")?;
    let expand_pause_ms = parse_u64("UNTAPPD_EXPAND_PAUSE_MS", "500")?;

    let max_retries = parse_u32("UNTAPPD_MAX_RETRIES", "2")?;
    let retry_backoff_base_secs = parse_u64("UNTAPPD_RETRY_BACKOFF_BASE_SECS", "5")?;

    Ok(AppConfig {
        base_url,
        webdriver_url,
        browser,
        headless,
        credentials,
        log_level,
        output_dir,
        ready_timeout_secs,
        ready_max_attempts,
        ready_absent_delay_ms,
        ready_mismatch_delay_ms,
        show_more_pause_ms,
        show_more_miss_pause_ms,
        show_more_max_clicks,
        expand_pause_ms,
        max_retries,
        retry_backoff_base_secs,
    })
}

fn parse_browser(s: &str) -> Result<BrowserKind, ConfigError> {
    match s.to_ascii_lowercase().as_str() {
        "chrome" | "chromium" => Ok(BrowserKind::Chrome),
        "firefox" => Ok(BrowserKind::Firefox),
        other => Err(ConfigError::InvalidEnvVar {
            var: "UNTAPPD_BROWSER".to_string(),
            reason: format!("unsupported browser \"{other}\" (expected chrome, chromium or firefox)"),
        }),
    }
}

fn parse_bool(var: &str, s: &str) -> Result<bool, ConfigError> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got \"{other}\""),
        }),
    }
}

/// Credentials are all-or-nothing: a username without a password (or the
/// reverse) is a configuration mistake, not an anonymous run.
fn parse_credentials(
    username: Option<String>,
    password: Option<String>,
) -> Result<Option<Credentials>, ConfigError> {
    match (username, password) {
        (Some(username), Some(password)) => Ok(Some(Credentials { username, password })),
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::MissingEnvVar("UNTAPPD_PASSWORD".to_string())),
        (None, Some(_)) => Err(ConfigError::MissingEnvVar("UNTAPPD_USERNAME".to_string())),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
