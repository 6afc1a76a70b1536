//! Market registry: static per-market crawl and response configuration.
//!
//! A market is a target audience with its own platforms, keywords, tone and
//! thresholds. The registry is built once at startup, validated, and
//! immutable afterwards.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Platform;

/// Generic fallback when a market has no workflow links configured.
pub const DEFAULT_WORKFLOW_URL: &str = "https://app.wavelet.ai";

/// Search parameters for one platform within a market.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformParams {
    /// Where to look: subreddits for reddit, topics for quora.
    pub channels: Vec<String>,

    /// A draft must contain at least one of these (when non-empty).
    pub keywords: Vec<String>,

    /// Minimum upvote floor for a draft to be considered.
    pub min_upvotes: i64,

    /// Extra search queries run on top of the new-post listing.
    pub search_queries: Vec<String>,
}

impl PlatformParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channels(mut self, channels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.channels = channels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_keywords(mut self, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_min_upvotes(mut self, min: i64) -> Self {
        self.min_upvotes = min;
        self
    }

    pub fn with_search_queries(
        mut self,
        queries: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.search_queries = queries.into_iter().map(Into::into).collect();
        self
    }
}

/// Context about a market handed to the agent for scoring and generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketContext {
    pub market: String,
    pub tone: String,
    pub target_pain: String,
    pub product_context: String,
}

/// Configuration for one target market segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    pub name: String,
    pub description: String,

    /// Platforms this market is crawled on.
    pub platforms: Vec<Platform>,

    /// Per-platform search parameters. Every platform listed above must
    /// have an entry; the registry rejects the market otherwise.
    pub params: IndexMap<Platform, PlatformParams>,

    /// Tone for generated replies.
    pub tone: String,

    /// What this audience struggles with.
    pub target_pain: String,

    /// Product capabilities relevant to this audience.
    pub product_context: String,

    /// Workflow links keyed by semantic tag. Order matters: the first
    /// entry is the fallback when no tag matches the question text.
    pub workflow_links: IndexMap<String, String>,

    /// Market-specific minimum confidence; `None` falls back to the
    /// process-wide default.
    pub min_confidence: Option<f32>,

    /// How often the scheduler should crawl this market.
    pub crawl_interval_hours: u32,

    /// Posting budget per day, enforced by the scheduler.
    pub max_posts_per_day: u32,
}

impl MarketConfig {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            platforms: Vec::new(),
            params: IndexMap::new(),
            tone: "helpful, professional".into(),
            target_pain: String::new(),
            product_context: String::new(),
            workflow_links: IndexMap::new(),
            min_confidence: None,
            crawl_interval_hours: 6,
            max_posts_per_day: 20,
        }
    }

    /// Add a platform with its search parameters.
    pub fn with_platform(mut self, platform: Platform, params: PlatformParams) -> Self {
        self.platforms.push(platform);
        self.params.insert(platform, params);
        self
    }

    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = tone.into();
        self
    }

    pub fn with_target_pain(mut self, pain: impl Into<String>) -> Self {
        self.target_pain = pain.into();
        self
    }

    pub fn with_product_context(mut self, context: impl Into<String>) -> Self {
        self.product_context = context.into();
        self
    }

    pub fn with_workflow_link(mut self, tag: impl Into<String>, url: impl Into<String>) -> Self {
        self.workflow_links.insert(tag.into(), url.into());
        self
    }

    pub fn with_min_confidence(mut self, min: f32) -> Self {
        self.min_confidence = Some(min);
        self
    }

    pub fn with_cadence(mut self, interval_hours: u32, max_posts_per_day: u32) -> Self {
        self.crawl_interval_hours = interval_hours;
        self.max_posts_per_day = max_posts_per_day;
        self
    }

    /// Parameters for one of this market's platforms.
    pub fn platform_params(&self, platform: Platform) -> Option<&PlatformParams> {
        self.params.get(&platform)
    }

    /// Agent-facing context for this market.
    pub fn context(&self) -> MarketContext {
        MarketContext {
            market: self.name.clone(),
            tone: self.tone.clone(),
            target_pain: self.target_pain.clone(),
            product_context: self.product_context.clone(),
        }
    }
}

/// Immutable lookup table of configured markets.
#[derive(Debug)]
pub struct MarketRegistry {
    markets: IndexMap<String, MarketConfig>,
}

impl MarketRegistry {
    /// Build a registry, failing fast on inconsistent market definitions.
    pub fn from_markets(
        markets: impl IntoIterator<Item = MarketConfig>,
    ) -> Result<Self, ConfigError> {
        let mut table = IndexMap::new();

        for market in markets {
            if table.contains_key(&market.name) {
                return Err(ConfigError::DuplicateMarket(market.name));
            }
            for platform in &market.platforms {
                if !market.params.contains_key(platform) {
                    return Err(ConfigError::MissingPlatformParams {
                        market: market.name.clone(),
                        platform: *platform,
                    });
                }
            }
            table.insert(market.name.clone(), market);
        }

        Ok(Self { markets: table })
    }

    /// The built-in market table.
    pub fn builtin() -> Self {
        Self::from_markets(builtin_markets()).expect("built-in market table is valid")
    }

    pub fn get(&self, name: &str) -> Option<&MarketConfig> {
        self.markets.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.markets.contains_key(name)
    }

    /// Names of all configured markets, in definition order.
    pub fn market_names(&self) -> Vec<&str> {
        self.markets.keys().map(String::as_str).collect()
    }

    /// Markets that crawl the given platform.
    pub fn markets_for_platform(&self, platform: Platform) -> Vec<&str> {
        self.markets
            .values()
            .filter(|m| m.platforms.contains(&platform))
            .map(|m| m.name.as_str())
            .collect()
    }

    /// Keywords configured for a (market, platform) pair; empty when either
    /// side is unknown.
    pub fn keywords_for(&self, market: &str, platform: Platform) -> Vec<String> {
        self.get(market)
            .and_then(|m| m.platform_params(platform))
            .map(|p| p.keywords.clone())
            .unwrap_or_default()
    }

    /// The minimum confidence in force for a market: its override when
    /// present, else the process-wide default.
    pub fn effective_min_confidence(&self, market: Option<&str>, default: f32) -> f32 {
        market
            .and_then(|name| self.get(name))
            .and_then(|m| m.min_confidence)
            .unwrap_or(default)
    }

    /// Pick the workflow link that best matches a question's text.
    ///
    /// Matches a link tag (underscores read as spaces) against the lowered
    /// text, then falls back to the market's first configured link, then to
    /// the generic default.
    pub fn workflow_link_for_context(&self, market: Option<&str>, question_text: &str) -> String {
        let Some(config) = market.and_then(|name| self.get(name)) else {
            return DEFAULT_WORKFLOW_URL.to_string();
        };

        if config.workflow_links.is_empty() {
            return DEFAULT_WORKFLOW_URL.to_string();
        }

        let text = question_text.to_lowercase();
        for (tag, url) in &config.workflow_links {
            if text.contains(&tag.replace('_', " ")) {
                return url.clone();
            }
        }

        config
            .workflow_links
            .values()
            .next()
            .cloned()
            .unwrap_or_else(|| DEFAULT_WORKFLOW_URL.to_string())
    }
}

/// Built-in market definitions for the Wavelet product.
fn builtin_markets() -> Vec<MarketConfig> {
    vec![
        MarketConfig::new(
            "indie_authors",
            "Independent authors, self-publishers, and writers",
        )
        .with_platform(
            Platform::Reddit,
            PlatformParams::new()
                .with_channels([
                    "selfpublish",
                    "writing",
                    "authors",
                    "PubTips",
                    "bookmarketing",
                ])
                .with_keywords([
                    "book trailer",
                    "author website",
                    "book marketing",
                    "book cover video",
                    "book promotion",
                    "promote my book",
                    "author platform",
                    "book advertising",
                ])
                .with_min_upvotes(2)
                .with_search_queries(["book trailer", "market my book", "promote novel"]),
        )
        .with_platform(
            Platform::Quora,
            PlatformParams::new()
                .with_channels(["Self-Publishing", "Book-Marketing", "Writing"])
                .with_keywords([
                    "publish my book",
                    "market my book",
                    "book trailer",
                    "promote book",
                ]),
        )
        .with_tone("encouraging, creative, supportive")
        .with_target_pain("marketing their books and building an author brand")
        .with_product_context("video for book promotion, author branding, book trailers")
        .with_workflow_link("book_trailer", "https://app.wavelet.ai/workflow/book-trailer")
        .with_workflow_link("author_intro", "https://app.wavelet.ai/workflow/author-intro")
        .with_min_confidence(0.65)
        .with_cadence(6, 15),
        MarketConfig::new(
            "course_creators",
            "Online educators, course creators, and e-learning professionals",
        )
        .with_platform(
            Platform::Reddit,
            PlatformParams::new()
                .with_channels(["teachonline", "elearning", "coursecreators", "Udemy"])
                .with_keywords([
                    "course video",
                    "lecture recording",
                    "online course",
                    "teaching video",
                    "course creation",
                    "video lessons",
                    "explainer video",
                ])
                .with_min_upvotes(3)
                .with_search_queries(["create course videos", "record lectures"]),
        )
        .with_tone("professional, educational, helpful")
        .with_target_pain("creating engaging course content and keeping students watching")
        .with_product_context("educational video, course content, lecture recording")
        .with_workflow_link("lecture_video", "https://app.wavelet.ai/workflow/lecture")
        .with_workflow_link("course_promo", "https://app.wavelet.ai/workflow/course-promo")
        .with_cadence(8, 12),
        MarketConfig::new(
            "nonprofits",
            "Nonprofit organizations, fundraisers, and social impact teams",
        )
        .with_platform(
            Platform::Reddit,
            PlatformParams::new()
                .with_channels(["nonprofit", "fundraising", "charity"])
                .with_keywords([
                    "fundraising video",
                    "donor outreach",
                    "impact storytelling",
                    "nonprofit video",
                    "donation campaign",
                    "volunteer recruitment",
                ])
                .with_min_upvotes(3)
                .with_search_queries(["fundraising video", "donor engagement"]),
        )
        .with_tone("empathetic, mission-focused, inspiring")
        .with_target_pain("fundraising, donor engagement, and impact storytelling")
        .with_product_context("fundraising video, impact storytelling, cause marketing")
        .with_workflow_link("fundraising", "https://app.wavelet.ai/workflow/fundraising")
        .with_workflow_link(
            "impact_story",
            "https://app.wavelet.ai/workflow/impact-story",
        )
        .with_cadence(12, 8),
        // Catch-all for broader video questions; also the default market
        // assigned to drafts crawled without one.
        MarketConfig::new("general_video", "General video creation and production")
            .with_platform(
                Platform::Reddit,
                PlatformParams::new()
                    .with_channels(["videoproduction", "videoediting", "contentcreation"])
                    .with_keywords([
                        "ai video",
                        "video creation",
                        "video editing",
                        "make videos",
                        "video generator",
                        "text to video",
                    ])
                    .with_min_upvotes(5)
                    .with_search_queries(["ai video", "video creation tool"]),
            )
            .with_platform(
                Platform::Quora,
                PlatformParams::new()
                    .with_channels(["Video-Editing", "Artificial-Intelligence"])
                    .with_keywords(["ai video", "video editing", "create videos"]),
            )
            .with_tone("helpful, enthusiastic, informative")
            .with_target_pain("video creation taking too long and costing too much")
            .with_product_context("AI video generation, automated video creation")
            .with_workflow_link(
                "video_creation",
                "https://app.wavelet.ai/workflow/video-creation",
            )
            .with_cadence(6, 10),
    ]
}
