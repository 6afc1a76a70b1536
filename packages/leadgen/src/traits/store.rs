//! Storage gateway: the narrow persistence interface the pipeline runs on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::types::{CrawlLog, Platform, Question, QuestionStatus, Verdict, VerdictStats};

/// Persistence operations for questions, verdicts and crawl logs.
///
/// Every call is individually atomic; none assume multi-statement
/// transactions. The store is the single source of truth: components never
/// cache question or verdict state beyond one operation.
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Store a question. Returns `Ok(None)` when a uniqueness constraint
    /// ((platform, post_id) or content hash) rejected the insert.
    async fn create_question(&self, question: Question) -> StoreResult<Option<Question>>;

    async fn get_question(&self, id: Uuid) -> StoreResult<Option<Question>>;

    /// Whether a question with this (platform, post_id) identity exists.
    async fn question_exists(&self, platform: Platform, post_id: &str) -> StoreResult<bool>;

    /// Whether any stored question carries this content fingerprint.
    async fn content_hash_exists(&self, hash: &str) -> StoreResult<bool>;

    /// Unconditionally set a question's status. Returns false when the
    /// question does not exist.
    async fn update_question_status(&self, id: Uuid, status: QuestionStatus) -> StoreResult<bool>;

    /// Atomically move a question from `from` to `to`.
    ///
    /// This is the claim used to guarantee at-most-one-concurrent-processing
    /// per question: of two racing callers, exactly one sees `true`.
    async fn claim_question(
        &self,
        id: Uuid,
        from: QuestionStatus,
        to: QuestionStatus,
    ) -> StoreResult<bool>;

    async fn list_questions_by_status(
        &self,
        status: QuestionStatus,
        limit: usize,
        market: Option<&str>,
    ) -> StoreResult<Vec<Question>>;

    /// Store a verdict. Returns `Ok(None)` when the question already has
    /// one, or when the parent question does not exist (a verdict is never
    /// created without a parent).
    async fn create_verdict(&self, verdict: Verdict) -> StoreResult<Option<Verdict>>;

    /// The verdict for a question, if one exists.
    async fn get_verdict(&self, question_id: Uuid) -> StoreResult<Option<Verdict>>;

    /// Persist generated reply text onto a verdict.
    async fn update_verdict_text(&self, verdict_id: Uuid, text: &str) -> StoreResult<bool>;

    /// Stamp a verdict's posted flag and timestamp.
    async fn update_verdict_posted(
        &self,
        verdict_id: Uuid,
        posted: bool,
        posted_at: Option<DateTime<Utc>>,
    ) -> StoreResult<bool>;

    /// Append a crawl log entry.
    async fn create_crawl_log(&self, entry: CrawlLog) -> StoreResult<Option<CrawlLog>>;

    /// Most recent crawl logs, newest first.
    async fn recent_crawl_logs(&self, limit: usize) -> StoreResult<Vec<CrawlLog>>;

    /// Question counts keyed by status string.
    async fn question_counts_by_status(&self) -> StoreResult<HashMap<String, usize>>;

    /// Question counts keyed by platform string.
    async fn question_counts_by_platform(&self) -> StoreResult<HashMap<String, usize>>;

    /// Aggregate verdict/response statistics.
    async fn verdict_stats(&self) -> StoreResult<VerdictStats>;
}
