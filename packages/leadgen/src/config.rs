//! Process-wide configuration.
//!
//! One explicit struct, built once at startup and passed by `Arc` into each
//! component constructor. No ambient globals, no mutation after load.

use secrecy::SecretString;
use std::time::Duration;

use crate::error::ConfigError;
use crate::ratelimit::DEFAULT_REQUESTS_PER_MINUTE;

/// Default user agent presented to platforms when crawling.
const DEFAULT_USER_AGENT: &str = "wavelet-leadgen/0.1 (by /u/wavelet-growth)";

/// Application configuration, loaded from the environment.
pub struct AppConfig {
    /// Base URL of the Wavelet Agent API.
    pub agent_base_url: String,

    /// API key for the Wavelet Agent.
    pub agent_api_key: SecretString,

    /// Whether generated replies are posted back to platforms automatically.
    pub auto_post: bool,

    /// Process-wide minimum confidence; markets may override upward or down.
    pub min_confidence: f32,

    /// Per-source request budget per minute.
    pub max_requests_per_minute: u32,

    /// Upper bound on questions fetched per crawl invocation.
    pub max_posts_per_crawl: usize,

    /// Market assigned to drafts crawled without an explicit market.
    pub default_market: String,

    /// Timeout applied to platform-facing requests.
    pub request_timeout: Duration,

    /// User agent for crawling and scraping.
    pub user_agent: String,

    /// OAuth bearer token for posting reddit comments. Posting is disabled
    /// without it.
    pub reddit_bearer_token: Option<SecretString>,
}

impl AppConfig {
    /// Load configuration from the environment (and `.env` when present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            agent_base_url: require("WAVELET_AGENT_URL")?,
            agent_api_key: SecretString::from(require("WAVELET_AGENT_API_KEY")?),
            auto_post: parse_or("AUTO_POST_ENABLED", false)?,
            min_confidence: parse_or("MIN_CONFIDENCE_SCORE", 0.7)?,
            max_requests_per_minute: parse_or(
                "MAX_REQUESTS_PER_MINUTE",
                DEFAULT_REQUESTS_PER_MINUTE,
            )?,
            max_posts_per_crawl: parse_or("MAX_POSTS_PER_CRAWL", 100)?,
            default_market: optional("DEFAULT_MARKET").unwrap_or_else(|| "general_video".into()),
            request_timeout: Duration::from_secs(parse_or("REQUEST_TIMEOUT_SECS", 30u64)?),
            user_agent: optional("CRAWLER_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.into()),
            reddit_bearer_token: optional("REDDIT_BEARER_TOKEN").map(SecretString::from),
        })
    }
}

impl Default for AppConfig {
    /// Offline defaults, suitable for tests and local development.
    fn default() -> Self {
        Self {
            agent_base_url: "http://localhost:8080".into(),
            agent_api_key: SecretString::from(String::new()),
            auto_post: false,
            min_confidence: 0.7,
            max_requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            max_posts_per_crawl: 100,
            default_market: "general_video".into(),
            request_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.into(),
            reddit_bearer_token: None,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("agent_base_url", &self.agent_base_url)
            .field("agent_api_key", &"[REDACTED]")
            .field("auto_post", &self.auto_post)
            .field("min_confidence", &self.min_confidence)
            .field("max_requests_per_minute", &self.max_requests_per_minute)
            .field("max_posts_per_crawl", &self.max_posts_per_crawl)
            .field("default_market", &self.default_market)
            .finish_non_exhaustive()
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn optional(name: &'static str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_or<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidVar {
            name,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_conservative() {
        let config = AppConfig::default();
        assert!(!config.auto_post);
        assert_eq!(config.min_confidence, 0.7);
        assert_eq!(config.default_market, "general_video");
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = AppConfig::default();
        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
    }
}
