//! Source adapter implementations and the platform dispatch registry.

pub mod quora;
pub mod reddit;

pub use quora::QuoraAdapter;
pub use reddit::RedditAdapter;

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::markets::{MarketRegistry, PlatformParams};
use crate::ratelimit::SourceRateLimiter;
use crate::traits::adapter::{AdapterFactory, SourceAdapter};
use crate::types::{Platform, QuestionDraft};

/// Posts older than this are never worth answering.
const MAX_POST_AGE_DAYS: i64 = 7;

/// Relevance gate applied to every candidate draft inside an adapter.
///
/// A draft is accepted iff it is recent, clears the market's upvote floor,
/// and (when a keyword list is configured) mentions at least one keyword.
/// Question markers are a soft signal only: pain-point statements that are
/// not phrased as questions still pass.
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    min_upvotes: i64,
    keywords: Vec<String>,
}

impl RelevanceFilter {
    pub fn new(min_upvotes: i64, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            min_upvotes,
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        }
    }

    /// Build a filter from a market's platform parameters.
    pub fn from_params(params: &PlatformParams) -> Self {
        Self::new(params.min_upvotes, params.keywords.clone())
    }

    /// Whether a draft passes the gate.
    pub fn accepts(&self, draft: &QuestionDraft) -> bool {
        if Self::age_days(draft.created_at) > MAX_POST_AGE_DAYS {
            return false;
        }

        if draft.upvotes < self.min_upvotes {
            return false;
        }

        if !self.keywords.is_empty() {
            let text = format!("{} {}", draft.title, draft.content).to_lowercase();
            if !self.keywords.iter().any(|k| text.contains(k.as_str())) {
                return false;
            }
        }

        true
    }

    /// Soft signal: does the text read like a question or ask for help?
    pub fn has_question_marker(text: &str) -> bool {
        const MARKERS: &[&str] = &[
            "?",
            "how ",
            "what ",
            "why ",
            "when ",
            "where ",
            "can i",
            "should i",
            "is it",
            "looking for",
            "need help",
            "recommendations",
            "suggestions",
        ];
        let lower = text.to_lowercase();
        MARKERS.iter().any(|m| lower.contains(m))
    }

    fn age_days(created_at: DateTime<Utc>) -> i64 {
        (Utc::now() - created_at).num_days()
    }
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self {
            min_upvotes: 1,
            keywords: Vec::new(),
        }
    }
}

/// Platform-enum-dispatched adapter factory.
///
/// Holds the shared collaborators every adapter needs and constructs a
/// fresh adapter per (platform, market) request.
pub struct PlatformRegistry {
    config: Arc<AppConfig>,
    markets: Arc<MarketRegistry>,
    limiter: Arc<SourceRateLimiter>,
}

impl PlatformRegistry {
    pub fn new(
        config: Arc<AppConfig>,
        markets: Arc<MarketRegistry>,
        limiter: Arc<SourceRateLimiter>,
    ) -> Self {
        Self {
            config,
            markets,
            limiter,
        }
    }

    /// The fixed platform list used when crawling without a market.
    pub fn known_platforms() -> &'static [Platform] {
        &[Platform::Reddit, Platform::Quora]
    }
}

impl AdapterFactory for PlatformRegistry {
    fn adapter_for(
        &self,
        platform: Platform,
        market: Option<&str>,
    ) -> Option<Box<dyn SourceAdapter>> {
        match platform {
            Platform::Reddit => Some(Box::new(RedditAdapter::new(
                Arc::clone(&self.config),
                &self.markets,
                Arc::clone(&self.limiter),
                market.map(String::from),
            ))),
            Platform::Quora => Some(Box::new(QuoraAdapter::new(
                Arc::clone(&self.config),
                &self.markets,
                Arc::clone(&self.limiter),
                market.map(String::from),
            ))),
            Platform::Twitter | Platform::Other => None,
        }
    }
}
