//! Configuration loading from environment variables.

use core::num::NonZeroU32;
use core::str::FromStr;
use core::time::Duration;
use std::path::PathBuf;

use anyhow::Context;

/// Default REST root of the remote actor platform.
pub const DEFAULT_API_BASE_URL: &str = "https://api.apify.com/v2";

/// Well-known public actors appended to every catalog listing.
pub const DEFAULT_CURATED_ACTOR_IDS: &[&str] = &[
    "apify~web-scraper",
    "apify~google-search-scraper",
    "apify~website-content-crawler",
    "compass~crawler-google-places",
    "apify~instagram-scraper",
];

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the platform REST API, without a trailing slash
    pub api_base_url: String,

    /// Per-request HTTP timeout
    pub http_timeout: Duration,

    /// Client-side request quota
    pub requests_per_second: NonZeroU32,

    /// Delay between two run status polls
    pub poll_interval: Duration,

    /// Wall-clock bound on the poll loop
    pub poll_ceiling: Duration,

    /// Actor ids merged into every catalog listing
    pub curated_actor_ids: Vec<String>,

    /// JSON file replacing the built-in schema override table
    pub schema_overrides_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            http_timeout: Duration::from_secs(60),
            requests_per_second: NonZeroU32::new(10).unwrap_or(NonZeroU32::MIN),
            poll_interval: Duration::from_secs(2),
            poll_ceiling: Duration::from_secs(60),
            curated_actor_ids: DEFAULT_CURATED_ACTOR_IDS
                .iter()
                .map(|id| (*id).to_owned())
                .collect(),
            schema_overrides_path: None,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Every variable is optional:
    /// - `PLATFORM_API_BASE_URL`: REST root (default: `https://api.apify.com/v2`)
    /// - `HTTP_TIMEOUT_SECS`: per-request timeout (default: 60)
    /// - `PLATFORM_REQUESTS_PER_SECOND`: client-side throttle (default: 10)
    /// - `RUN_POLL_INTERVAL_SECS`: delay between status polls (default: 2)
    /// - `RUN_POLL_CEILING_SECS`: poll loop bound (default: 60)
    /// - `CURATED_ACTOR_IDS`: comma separated actor ids
    /// - `SCHEMA_OVERRIDES_PATH`: JSON file with schema overrides
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let api_base_url = std::env::var("PLATFORM_API_BASE_URL")
            .map_or(defaults.api_base_url, |url| url.trim_end_matches('/').to_owned());

        let http_timeout = env_parsed::<u64>("HTTP_TIMEOUT_SECS")?
            .map_or(defaults.http_timeout, Duration::from_secs);

        let requests_per_second = env_parsed::<NonZeroU32>("PLATFORM_REQUESTS_PER_SECOND")?
            .unwrap_or(defaults.requests_per_second);

        let poll_interval = env_parsed::<u64>("RUN_POLL_INTERVAL_SECS")?
            .map_or(defaults.poll_interval, Duration::from_secs);

        let poll_ceiling = env_parsed::<u64>("RUN_POLL_CEILING_SECS")?
            .map_or(defaults.poll_ceiling, Duration::from_secs);

        let curated_actor_ids = std::env::var("CURATED_ACTOR_IDS").map_or(
            defaults.curated_actor_ids,
            |ids| {
                ids.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_owned)
                    .collect()
            },
        );

        let schema_overrides_path = std::env::var("SCHEMA_OVERRIDES_PATH")
            .ok()
            .map(PathBuf::from);

        Ok(Self {
            api_base_url,
            http_timeout,
            requests_per_second,
            poll_interval,
            poll_ceiling,
            curated_actor_ids,
            schema_overrides_path,
        })
    }
}

/// Reads and parses an optional environment variable.
fn env_parsed<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: core::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} has an invalid value: {raw}")),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_poll_policy() {
        let config = Config::default();
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.poll_ceiling, Duration::from_secs(60));
        assert_eq!(config.requests_per_second.get(), 10);
        assert_eq!(config.curated_actor_ids.len(), DEFAULT_CURATED_ACTOR_IDS.len());
    }

    #[test]
    fn test_env_parsed_missing_variable() {
        let parsed = env_parsed::<u64>("ACTOR_BRIDGE_TEST_UNSET_VARIABLE").unwrap();
        assert_eq!(parsed, None);
    }
}
