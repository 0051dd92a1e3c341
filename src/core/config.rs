use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the bot

/// Telegram bot token.
/// Read from BOT_TOKEN (or TELOXIDE_TOKEN as a fallback).
/// An empty value is a fatal error at startup.
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_default()
});

/// SQLite database file path.
/// Read from DATABASE_PATH, defaults to "database.sqlite".
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "database.sqlite".to_string()));

/// Public base URL of the call page, without a trailing slash.
/// Read from APP_PUBLIC_BASE_URL, defaults to "http://localhost:8080".
/// The call page itself is served elsewhere; the bot only hands out links.
pub static APP_PUBLIC_BASE_URL: Lazy<String> = Lazy::new(|| {
    let base = env::var("APP_PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    base.trim_end_matches('/').to_string()
});

/// Log file path.
/// Read from LOG_FILE_PATH, defaults to "zvonilka.log".
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "zvonilka.log".to_string()));

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API HTTP requests (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Contact search configuration
pub mod search {
    /// Maximum number of rows returned by a contact search
    pub const MAX_RESULTS: i64 = 25;
}

/// Room token configuration
pub mod rooms {
    /// Number of random bytes per room token (12 chars once base64-encoded)
    pub const TOKEN_BYTES: usize = 9;
}

/// Startup configuration
pub mod startup {
    use super::Duration;

    /// Maximum number of get_me attempts while the Bot API warms up
    pub const MAX_GET_ME_RETRIES: u32 = 12;

    /// Delay between get_me attempts (in seconds)
    pub const GET_ME_RETRY_DELAY_SECS: u64 = 5;

    /// Delay between get_me attempts
    pub fn get_me_retry_delay() -> Duration {
        Duration::from_secs(GET_ME_RETRY_DELAY_SECS)
    }
}
