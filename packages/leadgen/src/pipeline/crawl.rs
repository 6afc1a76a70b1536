//! Crawl orchestrator: drives source adapters for a market and persists
//! deduplicated questions.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::dedup;
use crate::error::{PipelineError, PipelineResult};
use crate::markets::MarketRegistry;
use crate::traits::adapter::AdapterFactory;
use crate::traits::store::StorageGateway;
use crate::types::{
    CrawlLog, CrawlReport, CrawlStatus, MarketCrawlReport, Platform, QuestionDraft,
};

/// Platforms crawled in legacy "no market" mode.
const LEGACY_PLATFORMS: &[Platform] = &[Platform::Reddit, Platform::Quora];

/// Orchestrates adapters for one or more platforms, dedupes against the
/// store, and records a crawl log per (platform, market) run.
pub struct CrawlOrchestrator<S> {
    store: Arc<S>,
    markets: Arc<MarketRegistry>,
    factory: Arc<dyn AdapterFactory>,
}

impl<S: StorageGateway> CrawlOrchestrator<S> {
    pub fn new(
        store: Arc<S>,
        markets: Arc<MarketRegistry>,
        factory: Arc<dyn AdapterFactory>,
    ) -> Self {
        Self {
            store,
            markets,
            factory,
        }
    }

    /// Crawl one platform, optionally scoped to a market.
    ///
    /// Never errors: adapter failures become a failure crawl log and a
    /// report carrying the error text.
    pub async fn crawl_platform(
        &self,
        platform: Platform,
        market: Option<&str>,
        limit: usize,
    ) -> CrawlReport {
        let Some(adapter) = self.factory.adapter_for(platform, market) else {
            warn!(%platform, "no adapter registered");
            return CrawlReport::failed(
                platform,
                market.map(String::from),
                format!("unknown platform: {platform}"),
            );
        };

        info!(%platform, market = market.unwrap_or("-"), limit, "starting crawl");
        let log = CrawlLog::started(platform, market.map(String::from));
        let started_at = log.started_at;

        let drafts = match adapter.fetch_questions(limit).await {
            Ok(drafts) => drafts,
            Err(e) => {
                warn!(%platform, market = market.unwrap_or("-"), error = %e, "crawl failed");
                let report =
                    CrawlReport::failed(platform, market.map(String::from), e.to_string());
                self.record_log(log.fail(e.to_string())).await;
                return report;
            }
        };

        let found = drafts.len();
        let (stored, duplicates) = self.store_drafts(drafts).await;

        // Per-item errors and duplicates do not make the run a failure.
        let log = log.complete(CrawlStatus::Success, found, stored);
        let duration_seconds = log
            .completed_at
            .map(|end| (end - started_at).num_milliseconds() as f64 / 1000.0)
            .unwrap_or_default();
        self.record_log(log).await;

        info!(
            %platform,
            market = market.unwrap_or("-"),
            found,
            stored,
            duplicates,
            "crawl complete"
        );

        CrawlReport {
            platform,
            market: market.map(String::from),
            items_found: found,
            items_stored: stored,
            duplicates,
            duration_seconds,
            error: None,
        }
    }

    /// Crawl every platform a market is configured for, sequentially.
    pub async fn crawl_market(
        &self,
        market: &str,
        limit: usize,
    ) -> PipelineResult<MarketCrawlReport> {
        let config = self
            .markets
            .get(market)
            .ok_or_else(|| PipelineError::UnknownMarket(market.to_string()))?;
        let platforms = config.platforms.clone();

        info!(market, platforms = platforms.len(), "starting market crawl");

        let mut reports = Vec::with_capacity(platforms.len());
        for platform in platforms {
            reports.push(self.crawl_platform(platform, Some(market), limit).await);
        }

        let total_found = reports.iter().map(|r| r.items_found).sum();
        let total_stored = reports.iter().map(|r| r.items_stored).sum();

        info!(market, total_found, total_stored, "market crawl complete");

        Ok(MarketCrawlReport {
            market: market.to_string(),
            total_found,
            total_stored,
            platforms: reports,
        })
    }

    /// Crawl all configured markets, sequentially. Markets are independent;
    /// callers may run several orchestrators concurrently instead.
    pub async fn crawl_all_markets(&self, limit: usize) -> Vec<MarketCrawlReport> {
        let names: Vec<String> = self
            .markets
            .market_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut reports = Vec::with_capacity(names.len());
        for name in names {
            match self.crawl_market(&name, limit).await {
                Ok(report) => reports.push(report),
                Err(e) => warn!(market = %name, error = %e, "market crawl skipped"),
            }
        }
        reports
    }

    /// Crawl the fixed platform list without market scoping (legacy mode).
    pub async fn crawl_all_platforms(&self, limit: usize) -> Vec<CrawlReport> {
        let mut reports = Vec::with_capacity(LEGACY_PLATFORMS.len());
        for &platform in LEGACY_PLATFORMS {
            reports.push(self.crawl_platform(platform, None, limit).await);
        }
        reports
    }

    /// Store drafts, skipping duplicates. Returns (stored, duplicates).
    async fn store_drafts(&self, drafts: Vec<QuestionDraft>) -> (usize, usize) {
        let mut stored = 0;
        let mut duplicates = 0;

        for draft in drafts {
            // Platform-id check first: cheaper and the most specific.
            match self
                .store
                .question_exists(draft.platform, &draft.post_id)
                .await
            {
                Ok(true) => {
                    debug!(post_id = %draft.post_id, "duplicate platform id");
                    duplicates += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(post_id = %draft.post_id, error = %e, "existence check failed");
                    continue;
                }
            }

            let hash = dedup::fingerprint(&draft.content);
            match self.store.content_hash_exists(&hash).await {
                Ok(true) => {
                    debug!(post_id = %draft.post_id, "duplicate content fingerprint");
                    duplicates += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(post_id = %draft.post_id, error = %e, "fingerprint check failed");
                    continue;
                }
            }

            match self.store.create_question(draft.into_question(hash)).await {
                // None: a concurrent run won the insert race.
                Ok(Some(_)) => stored += 1,
                Ok(None) => duplicates += 1,
                Err(e) => warn!(error = %e, "failed to store question"),
            }
        }

        (stored, duplicates)
    }

    async fn record_log(&self, log: CrawlLog) {
        if let Err(e) = self.store.create_crawl_log(log).await {
            warn!(error = %e, "failed to record crawl log");
        }
    }
}
