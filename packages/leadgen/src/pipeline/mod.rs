//! Pipeline stages: crawl, score, respond.

pub mod crawl;
pub mod respond;
pub mod score;

pub use crawl::CrawlOrchestrator;
pub use respond::{format_response, ProcessOutcome, ResponsePipeline, DISCLOSURE};
pub use score::CapabilityScorer;
