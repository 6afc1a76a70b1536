//! Quora source adapter.
//!
//! Quora has no public API, so this adapter scrapes topic pages and pulls
//! question links out of the HTML. The scraping client is a scoped
//! resource: built at the start of each fetch-or-post call and dropped on
//! every exit path.

use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::dedup;
use crate::error::{AdapterError, AdapterResult};
use crate::markets::MarketRegistry;
use crate::ratelimit::SourceRateLimiter;
use crate::traits::adapter::SourceAdapter;
use crate::types::{CommentDraft, Platform, QuestionDraft};

use super::RelevanceFilter;

const QUORA_BASE: &str = "https://www.quora.com";

/// Rate limiter key shared by every quora call.
const SOURCE_KEY: &str = "quora";

/// Topics crawled when no market is supplied.
const DEFAULT_CHANNELS: &[&str] = &["Artificial-Intelligence", "Video-Editing"];

/// Scrapes quora topic pages for question links.
pub struct QuoraAdapter {
    limiter: Arc<SourceRateLimiter>,
    config: Arc<AppConfig>,
    market: Option<String>,
    channels: Vec<String>,
    filter: RelevanceFilter,
}

impl QuoraAdapter {
    pub fn new(
        config: Arc<AppConfig>,
        markets: &MarketRegistry,
        limiter: Arc<SourceRateLimiter>,
        market: Option<String>,
    ) -> Self {
        let params = market
            .as_deref()
            .and_then(|name| markets.get(name))
            .and_then(|m| m.platform_params(Platform::Quora));

        let (channels, filter) = match params {
            Some(p) => (p.channels.clone(), RelevanceFilter::from_params(p)),
            None => {
                if let Some(name) = market.as_deref() {
                    warn!(market = name, "no quora params for market, using defaults");
                }
                (
                    DEFAULT_CHANNELS.iter().map(|s| s.to_string()).collect(),
                    RelevanceFilter::new(0, Vec::<String>::new()),
                )
            }
        };

        info!(
            market = market.as_deref().unwrap_or("-"),
            topics = channels.len(),
            "quora adapter ready"
        );

        Self {
            limiter,
            config,
            market,
            channels,
            filter,
        }
    }

    /// Build the scoped scraping client for one call.
    fn scraping_client(&self) -> AdapterResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.config.request_timeout)
            .user_agent(self.config.user_agent.clone())
            .build()
            .map_err(|e| AdapterError::Http(Box::new(e)))
    }

    /// Pull question drafts out of a topic page's HTML.
    ///
    /// Quora's markup shifts often; anchor extraction plus a
    /// question-marker check is deliberately the most conservative read.
    fn extract_questions(&self, html: &str) -> Vec<QuestionDraft> {
        let anchor = regex::Regex::new(r#"<a[^>]+href="([^"]+)"[^>]*>([^<]+)</a>"#)
            .expect("anchor pattern is valid");

        let mut seen = HashSet::new();
        let mut drafts = Vec::new();

        for cap in anchor.captures_iter(html) {
            let href = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
            let text = cap.get(2).map(|m| m.as_str().trim()).unwrap_or_default();

            // Anchor text without a question mark is nav, profiles, spaces.
            if text.is_empty() || !text.contains('?') {
                continue;
            }

            let url = if href.starts_with('/') {
                format!("{QUORA_BASE}{href}")
            } else if href.starts_with(QUORA_BASE) {
                href.to_string()
            } else {
                continue;
            };

            let Some(post_id) = dedup::extract_platform_id(&url, Platform::Quora) else {
                continue;
            };

            if !seen.insert(post_id.clone()) {
                continue;
            }

            let draft = QuestionDraft {
                platform: Platform::Quora,
                post_id,
                title: text.to_string(),
                content: text.to_string(),
                // Author and vote counts need per-question scraping.
                author: "unknown".to_string(),
                url,
                tags: Vec::new(),
                upvotes: 0,
                market: Some(
                    self.market
                        .clone()
                        .unwrap_or_else(|| self.config.default_market.clone()),
                ),
                created_at: Utc::now(),
            };

            if self.filter.accepts(&draft) {
                drafts.push(draft);
            }
        }

        drafts
    }
}

#[async_trait]
impl SourceAdapter for QuoraAdapter {
    fn platform(&self) -> Platform {
        Platform::Quora
    }

    fn market(&self) -> Option<&str> {
        self.market.as_deref()
    }

    async fn fetch_questions(&self, limit: usize) -> AdapterResult<Vec<QuestionDraft>> {
        let client = self.scraping_client()?;
        let mut drafts = Vec::new();

        for topic in &self.channels {
            self.limiter.await_capacity(SOURCE_KEY).await;

            let url = format!("{QUORA_BASE}/topic/{}", topic.replace(' ', "-"));
            let html = match fetch_page(&client, &url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!(%topic, error = %e, "failed to fetch quora topic, skipping");
                    continue;
                }
            };

            let found = self.extract_questions(&html);
            debug!(%topic, found = found.len(), "quora topic scraped");
            drafts.extend(found);

            if drafts.len() >= limit {
                break;
            }
        }

        drafts.truncate(limit);
        info!(
            market = self.market.as_deref().unwrap_or("-"),
            count = drafts.len(),
            "quora fetch complete"
        );
        Ok(drafts)
    }

    async fn fetch_comments(&self, question_url: &str) -> AdapterResult<Vec<CommentDraft>> {
        // Answers are rendered client-side; nothing to collect without a
        // full browser session.
        debug!(url = question_url, "quora answers not exposed to scraping");
        Ok(Vec::new())
    }

    async fn post_response(&self, question_url: &str, _response_text: &str) -> bool {
        warn!(
            url = question_url,
            "quora posting requires an authenticated browser session; skipping"
        );
        false
    }
}

async fn fetch_page(client: &reqwest::Client, url: &str) -> AdapterResult<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AdapterError::Http(Box::new(e)))?;

    if !response.status().is_success() {
        return Err(AdapterError::Http(Box::new(std::io::Error::other(
            format!("quora returned {}", response.status()),
        ))));
    }

    response
        .text()
        .await
        .map_err(|e| AdapterError::Http(Box::new(e)))
}
