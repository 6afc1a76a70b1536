//! Reddit source adapter.
//!
//! Reads the public JSON listing and search endpoints; posting a comment
//! goes through the OAuth API and requires a pre-provisioned bearer token.

use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use serde::Deserialize;
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

const LISTING_BASE: &str = "https://www.reddit.com";
const OAUTH_BASE: &str = "https://oauth.reddit.com";

/// Rate limiter key shared by every reddit call.
const SOURCE_KEY: &str = "reddit";

/// Subreddits crawled when no market is supplied.
const DEFAULT_CHANNELS: &[&str] = &[
    "videoproduction",
    "videoediting",
    "artificial",
    "contentcreation",
];

#[derive(Debug, Deserialize)]
struct Listing<T> {
    data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
struct ListingData<T> {
    children: Vec<Child<T>>,
}

#[derive(Debug, Deserialize)]
struct Child<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct RedditPost {
    id: String,
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    author: String,
    permalink: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    created_utc: f64,
    #[serde(default)]
    link_flair_text: Option<String>,
    subreddit: String,
}

#[derive(Debug, Deserialize)]
struct RedditComment {
    #[serde(default)]
    id: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    created_utc: f64,
}

/// Crawls reddit for a market and posts replies as comments.
pub struct RedditAdapter {
    client: reqwest::Client,
    limiter: Arc<SourceRateLimiter>,
    config: Arc<AppConfig>,
    market: Option<String>,
    channels: Vec<String>,
    search_queries: Vec<String>,
    filter: RelevanceFilter,
}

impl RedditAdapter {
    pub fn new(
        config: Arc<AppConfig>,
        markets: &MarketRegistry,
        limiter: Arc<SourceRateLimiter>,
        market: Option<String>,
    ) -> Self {
        let params = market
            .as_deref()
            .and_then(|name| markets.get(name))
            .and_then(|m| m.platform_params(Platform::Reddit));

        let (channels, search_queries, filter) = match params {
            Some(p) => (
                p.channels.clone(),
                p.search_queries.clone(),
                RelevanceFilter::from_params(p),
            ),
            None => {
                if let Some(name) = market.as_deref() {
                    warn!(market = name, "no reddit params for market, using defaults");
                }
                (
                    DEFAULT_CHANNELS.iter().map(|s| s.to_string()).collect(),
                    Vec::new(),
                    RelevanceFilter::default(),
                )
            }
        };

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .expect("failed to build HTTP client");

        info!(
            market = market.as_deref().unwrap_or("-"),
            channels = channels.len(),
            "reddit adapter ready"
        );

        Self {
            client,
            limiter,
            config,
            market,
            channels,
            search_queries,
            filter,
        }
    }

    async fn get_listing(&self, url: &str) -> AdapterResult<Vec<RedditPost>> {
        self.limiter.await_capacity(SOURCE_KEY).await;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AdapterError::Http(Box::new(e)))?;

        if !response.status().is_success() {
            return Err(AdapterError::Http(Box::new(std::io::Error::other(
                format!("reddit returned {}", response.status()),
            ))));
        }

        let listing: Listing<RedditPost> = response
            .json()
            .await
            .map_err(|e| AdapterError::Parse(e.to_string()))?;

        Ok(listing.data.children.into_iter().map(|c| c.data).collect())
    }

    /// New posts plus keyword search results for one subreddit.
    ///
    /// A failed search query keeps the listing results gathered so far.
    async fn fetch_channel(&self, channel: &str, limit: usize) -> AdapterResult<Vec<RedditPost>> {
        let mut posts = self
            .get_listing(&format!(
                "{LISTING_BASE}/r/{channel}/new.json?limit={}",
                limit * 2
            ))
            .await?;

        for query in &self.search_queries {
            let url = format!(
                "{LISTING_BASE}/r/{channel}/search.json?q={}&restrict_sr=1&t=week&limit={}",
                urlencode(query),
                limit.min(20)
            );
            match self.get_listing(&url).await {
                Ok(found) => posts.extend(found),
                Err(e) => {
                    warn!(%channel, query = %query, error = %e, "reddit search failed");
                }
            }
        }

        Ok(posts)
    }

    fn post_to_draft(&self, post: RedditPost) -> QuestionDraft {
        let mut tags = Vec::new();
        if let Some(flair) = post.link_flair_text.filter(|f| !f.is_empty()) {
            tags.push(flair);
        }
        tags.push(format!("r/{}", post.subreddit));

        let content = if post.selftext.is_empty() {
            post.title.clone()
        } else {
            post.selftext
        };

        let author = if post.author.is_empty() {
            "[deleted]".to_string()
        } else {
            post.author
        };

        QuestionDraft {
            platform: Platform::Reddit,
            post_id: post.id,
            title: post.title,
            content,
            author,
            url: format!("https://reddit.com{}", post.permalink),
            tags,
            upvotes: post.score,
            market: Some(
                self.market
                    .clone()
                    .unwrap_or_else(|| self.config.default_market.clone()),
            ),
            created_at: timestamp(post.created_utc),
        }
    }
}

#[async_trait]
impl SourceAdapter for RedditAdapter {
    fn platform(&self) -> Platform {
        Platform::Reddit
    }

    fn market(&self) -> Option<&str> {
        self.market.as_deref()
    }

    async fn fetch_questions(&self, limit: usize) -> AdapterResult<Vec<QuestionDraft>> {
        let per_channel = (limit / self.channels.len().max(1)).max(1);
        let mut seen = HashSet::new();
        let mut drafts = Vec::new();

        for channel in &self.channels {
            let posts = match self.fetch_channel(channel, per_channel).await {
                Ok(posts) => posts,
                Err(e) => {
                    warn!(%channel, error = %e, "failed to fetch subreddit, skipping");
                    continue;
                }
            };

            let mut kept = 0usize;
            for post in posts {
                if !seen.insert(post.id.clone()) {
                    continue;
                }
                let draft = self.post_to_draft(post);
                if self.filter.accepts(&draft) {
                    drafts.push(draft);
                    kept += 1;
                }
                if kept >= per_channel {
                    break;
                }
            }
            debug!(%channel, kept, "subreddit crawled");
        }

        drafts.truncate(limit);
        info!(
            market = self.market.as_deref().unwrap_or("-"),
            count = drafts.len(),
            "reddit fetch complete"
        );
        Ok(drafts)
    }

    async fn fetch_comments(&self, question_url: &str) -> AdapterResult<Vec<CommentDraft>> {
        self.limiter.await_capacity(SOURCE_KEY).await;

        let url = format!("{}.json", dedup::normalize_url(question_url));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AdapterError::Http(Box::new(e)))?;

        if !response.status().is_success() {
            return Err(AdapterError::Http(Box::new(std::io::Error::other(
                format!("reddit returned {}", response.status()),
            ))));
        }

        // Post pages are a two-element array: [post listing, comment listing].
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AdapterError::Parse(e.to_string()))?;

        let Some(comment_listing) = body.get(1) else {
            return Ok(Vec::new());
        };

        let listing: Listing<RedditComment> =
            serde_json::from_value(comment_listing.clone())
                .map_err(|e| AdapterError::Parse(e.to_string()))?;

        Ok(listing
            .data
            .children
            .into_iter()
            .map(|c| c.data)
            .filter(|c| !c.body.is_empty())
            .map(|c| CommentDraft {
                comment_id: c.id,
                content: c.body,
                author: if c.author.is_empty() {
                    "[deleted]".to_string()
                } else {
                    c.author
                },
                upvotes: c.score,
                created_at: timestamp(c.created_utc),
            })
            .collect())
    }

    async fn post_response(&self, question_url: &str, response_text: &str) -> bool {
        let Some(token) = self.config.reddit_bearer_token.as_ref() else {
            warn!("reddit posting disabled: no bearer token configured");
            return false;
        };

        let Some(post_id) = dedup::extract_platform_id(question_url, Platform::Reddit) else {
            warn!(url = question_url, "could not extract post id, not posting");
            return false;
        };

        self.limiter.await_capacity(SOURCE_KEY).await;

        let result = self
            .client
            .post(format!("{OAUTH_BASE}/api/comment"))
            .bearer_auth(token.expose_secret())
            .form(&[
                ("api_type", "json"),
                ("thing_id", &format!("t3_{post_id}")),
                ("text", response_text),
            ])
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                info!(%post_id, "reddit comment posted");
                true
            }
            Ok(response) => {
                warn!(%post_id, status = %response.status(), "reddit rejected comment");
                false
            }
            Err(e) => {
                warn!(%post_id, error = %e, "reddit comment post failed");
                false
            }
        }
    }
}

fn timestamp(created_utc: f64) -> DateTime<Utc> {
    DateTime::from_timestamp(created_utc as i64, 0).unwrap_or_else(Utc::now)
}

/// Minimal query-string escaping for search terms.
fn urlencode(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            ' ' => "+".to_string(),
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => c.to_string(),
            other => format!("%{:02X}", other as u32),
        })
        .collect()
}
