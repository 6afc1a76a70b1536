//! Market-aware lead-generation pipeline.
//!
//! Crawls social platforms for questions relevant to configured target
//! markets, scores each question's answerability through the Wavelet Agent,
//! generates a market-tuned reply, and optionally posts it back to the
//! source platform.
//!
//! This crate is the orchestration and consistency layer: deduplicated
//! ingestion, confidence-gated scoring, and a strict question state machine
//! (`pending → processing → {answered, ignored, error}`) with an atomic
//! processing claim so no question is ever posted twice. The HTTP API, CLI
//! and scheduler live elsewhere and call in through [`CrawlOrchestrator`],
//! [`CapabilityScorer`] and [`ResponsePipeline`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use leadgen::{
//!     AppConfig, CrawlOrchestrator, MarketRegistry, MemoryStore,
//!     PlatformRegistry, ResponsePipeline, SourceRateLimiter, WaveletAgent,
//! };
//!
//! let config = Arc::new(AppConfig::from_env()?);
//! let markets = Arc::new(MarketRegistry::builtin());
//! let limiter = Arc::new(SourceRateLimiter::new(config.max_requests_per_minute));
//! let store = Arc::new(MemoryStore::new());
//! let agent = Arc::new(WaveletAgent::from_config(&config));
//! let factory = Arc::new(PlatformRegistry::new(config.clone(), markets.clone(), limiter));
//!
//! let orchestrator = CrawlOrchestrator::new(store.clone(), markets.clone(), factory.clone());
//! let report = orchestrator.crawl_market("indie_authors", 50).await?;
//!
//! let pipeline = ResponsePipeline::new(
//!     store, agent, markets, factory, config.auto_post, config.min_confidence,
//! );
//! let processed = pipeline.process_pending(10, Some("indie_authors")).await;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (SourceAdapter, StorageGateway, Agent)
//! - [`types`] - Domain types (Question, Verdict, CrawlLog)
//! - [`pipeline`] - Crawl orchestrator, capability scorer, response pipeline
//! - [`adapters`] - Platform adapters (reddit, quora) and dispatch registry
//! - [`stores`] - Storage implementations (MemoryStore, PostgresStore)
//! - [`markets`] - Market registry and per-market configuration
//! - [`dedup`] - Content fingerprinting and platform-id extraction
//! - [`ratelimit`] - Per-source request throttling
//! - [`testing`] - Mock collaborators for tests

pub mod adapters;
pub mod agent;
pub mod config;
pub mod dedup;
pub mod error;
pub mod markets;
pub mod pipeline;
pub mod ratelimit;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use config::AppConfig;
pub use error::{
    AdapterError, AgentError, ConfigError, PipelineError, PipelineResult, StoreError,
};
pub use markets::{MarketConfig, MarketContext, MarketRegistry, PlatformParams};
pub use ratelimit::SourceRateLimiter;
pub use types::{
    CommentDraft, CrawlLog, CrawlReport, CrawlStatus, MarketCrawlReport, Platform, Question,
    QuestionDraft, QuestionStatus, Verdict, VerdictStats,
};

// Re-export traits
pub use traits::{AdapterFactory, Agent, Analysis, Generation, SourceAdapter, StorageGateway};

// Re-export pipeline components
pub use pipeline::{
    format_response, CapabilityScorer, CrawlOrchestrator, ProcessOutcome, ResponsePipeline,
    DISCLOSURE,
};

// Re-export adapters and the dispatch registry
pub use adapters::{PlatformRegistry, QuoraAdapter, RedditAdapter, RelevanceFilter};

// Re-export stores
pub use stores::MemoryStore;

#[cfg(feature = "postgres")]
pub use stores::PostgresStore;

// Re-export the production agent
pub use agent::WaveletAgent;
