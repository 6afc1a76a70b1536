//! Source adapter capability contract.

use async_trait::async_trait;

use crate::error::AdapterResult;
use crate::types::{CommentDraft, Platform, QuestionDraft};

/// A platform-specific component that fetches question-like items and can
/// post a reply back.
///
/// Implementations rate-limit themselves before every network call and
/// tolerate partial failure: one bad channel or query keeps the results
/// gathered so far.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// The platform this adapter talks to.
    fn platform(&self) -> Platform;

    /// The market this adapter was instantiated for, if any. Drafts carry
    /// this value (adapters fall back to the configured default market
    /// when none was supplied).
    fn market(&self) -> Option<&str>;

    /// Fetch up to `limit` candidate question drafts.
    ///
    /// Errors only when the platform is wholly unreachable; intra-crawl
    /// errors (one channel, one query) are logged and skipped.
    async fn fetch_questions(&self, limit: usize) -> AdapterResult<Vec<QuestionDraft>>;

    /// Fetch comments for a question. Best-effort: platforms that hide
    /// comments behind deeper scraping legitimately return an empty list.
    async fn fetch_comments(&self, question_url: &str) -> AdapterResult<Vec<CommentDraft>>;

    /// Post a reply under the given question URL.
    ///
    /// Side-effecting; rate-limits itself. Never errors outward: any
    /// platform failure is logged and reported as `false`.
    async fn post_response(&self, question_url: &str, response_text: &str) -> bool;
}

/// Builds the adapter for a (platform, market) pair.
///
/// Dispatch is by platform enum, not reflection: unknown platforms yield
/// `None` and the caller reports them.
pub trait AdapterFactory: Send + Sync {
    fn adapter_for(
        &self,
        platform: Platform,
        market: Option<&str>,
    ) -> Option<Box<dyn SourceAdapter>>;
}
