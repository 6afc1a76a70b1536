//! Agent trait abstracting the AI scoring/generation service.
//!
//! Implementations wrap a specific provider (the Wavelet Agent in
//! production, [`MockAgent`](crate::testing::MockAgent) in tests) and
//! handle wire specifics; the pipeline only sees these domain types.

use async_trait::async_trait;

use crate::error::AgentResult;
use crate::markets::MarketContext;

/// Capability analysis for one question.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Whether the service believes it can answer the question.
    pub is_in_scope: bool,

    /// Service confidence, 0.0 to 1.0.
    pub confidence: f32,

    /// Why the service reached this verdict.
    pub reasoning: String,

    /// Workflow the service suggests pointing the asker at.
    pub suggested_workflow: Option<String>,
}

/// A generated reply for one question.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Reply body. `None` or empty means generation failed.
    pub response_text: Option<String>,

    /// Workflow link the service chose, if any.
    pub workflow_link: Option<String>,

    /// Service confidence in the reply, 0.0 to 1.0.
    pub confidence: f32,
}

impl Generation {
    /// Whether this generation produced usable text.
    pub fn has_text(&self) -> bool {
        self.response_text
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }
}

/// AI scoring and generation operations used by the pipeline.
///
/// Calls carry bounded timeouts inside the implementation; errors are
/// returned, never panicked, and the caller decides what degradation means.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Score whether a question is answerable and how confidently.
    async fn analyze(
        &self,
        question: &str,
        title: &str,
        context: Option<&MarketContext>,
    ) -> AgentResult<Analysis>;

    /// Draft a reply for a question.
    async fn generate(
        &self,
        question: &str,
        workflow_id: Option<&str>,
        context: Option<&MarketContext>,
    ) -> AgentResult<Generation>;
}
