//! Crawl records: append-only logs plus the typed results callers see.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::question::Platform;

/// Outcome class of one crawl run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlStatus {
    Success,
    Failure,
    Partial,
}

impl CrawlStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrawlStatus::Success => "success",
            CrawlStatus::Failure => "failure",
            CrawlStatus::Partial => "partial",
        }
    }
}

impl std::str::FromStr for CrawlStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(CrawlStatus::Success),
            "failure" => Ok(CrawlStatus::Failure),
            "partial" => Ok(CrawlStatus::Partial),
            other => Err(format!("unknown crawl status: {other}")),
        }
    }
}

/// One crawl log entry per orchestrator run per (platform, market).
///
/// Append-only: completion fields are set once, nothing is mutated after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlLog {
    pub id: Uuid,
    pub platform: Platform,
    pub market: Option<String>,
    pub status: CrawlStatus,
    pub items_found: usize,
    pub items_stored: usize,
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CrawlLog {
    /// Open a log entry for a crawl that is starting now.
    pub fn started(platform: Platform, market: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            platform,
            market,
            status: CrawlStatus::Success,
            items_found: 0,
            items_stored: 0,
            error_message: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Close the entry with final counts.
    pub fn complete(mut self, status: CrawlStatus, found: usize, stored: usize) -> Self {
        self.status = status;
        self.items_found = found;
        self.items_stored = stored;
        self.completed_at = Some(Utc::now());
        self
    }

    /// Close the entry as a failure.
    pub fn fail(mut self, error: impl Into<String>) -> Self {
        self.status = CrawlStatus::Failure;
        self.error_message = Some(error.into());
        self.completed_at = Some(Utc::now());
        self
    }
}

/// Result of crawling one platform for one market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    pub platform: Platform,
    pub market: Option<String>,
    pub items_found: usize,
    pub items_stored: usize,
    pub duplicates: usize,
    pub duration_seconds: f64,

    /// Set when the adapter call itself failed.
    pub error: Option<String>,
}

impl CrawlReport {
    /// A report for a crawl that failed before producing items.
    pub fn failed(platform: Platform, market: Option<String>, error: impl Into<String>) -> Self {
        Self {
            platform,
            market,
            items_found: 0,
            items_stored: 0,
            duplicates: 0,
            duration_seconds: 0.0,
            error: Some(error.into()),
        }
    }
}

/// Aggregated result of crawling every platform a market is configured for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketCrawlReport {
    pub market: String,
    pub total_found: usize,
    pub total_stored: usize,
    pub platforms: Vec<CrawlReport>,
}
