//! Response pipeline: the question state machine from scored verdict to
//! posted (or ready) reply.
//!
//! Transitions: `pending → processing → {answered, ignored, error}`.
//! The pending→processing step is an atomic claim on the store, so two
//! workers racing on the same question cannot both post.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{PipelineError, PipelineResult};
use crate::markets::MarketRegistry;
use crate::traits::adapter::AdapterFactory;
use crate::traits::agent::Agent;
use crate::traits::store::StorageGateway;
use crate::types::{Question, QuestionStatus, Verdict};

/// Appended to every generated reply. Mandatory for platform compliance;
/// deliberately not configurable.
pub const DISCLOSURE: &str =
    "*Disclosure: I work with Wavelet, which offers tools for creating videos easily.*";

/// What processing one question amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Reply generated (and posted, when auto-post is on).
    Answered,

    /// Out of scope or below the confidence threshold.
    Ignored,

    /// Nothing to do: missing question/verdict, or another worker holds
    /// the claim.
    Skipped,

    /// Generation or posting failed; the question is in `error`.
    Failed,
}

impl ProcessOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, ProcessOutcome::Answered)
    }
}

/// Drives a scored question through generation, formatting and posting.
pub struct ResponsePipeline<S, A> {
    store: Arc<S>,
    agent: Arc<A>,
    markets: Arc<MarketRegistry>,
    factory: Arc<dyn AdapterFactory>,
    auto_post: bool,
    default_min_confidence: f32,
}

impl<S: StorageGateway, A: Agent> ResponsePipeline<S, A> {
    pub fn new(
        store: Arc<S>,
        agent: Arc<A>,
        markets: Arc<MarketRegistry>,
        factory: Arc<dyn AdapterFactory>,
        auto_post: bool,
        default_min_confidence: f32,
    ) -> Self {
        Self {
            store,
            agent,
            markets,
            factory,
            auto_post,
            default_min_confidence,
        }
    }

    /// Process one question end to end.
    ///
    /// Never errors outward. Missing question or verdict is a no-op with no
    /// state change; any unexpected failure past the claim lands the
    /// question in `error`.
    pub async fn process(&self, question_id: Uuid) -> ProcessOutcome {
        match self.try_process(question_id).await {
            Ok(outcome) => outcome,
            Err(PipelineError::QuestionNotFound(id)) => {
                warn!(question = %id, "question not found");
                ProcessOutcome::Skipped
            }
            Err(PipelineError::VerdictNotFound(id)) => {
                warn!(question = %id, "no verdict yet, cannot process");
                ProcessOutcome::Skipped
            }
            Err(e) => {
                error!(question = %question_id, error = %e, "processing failed");
                if let Err(e) = self
                    .store
                    .update_question_status(question_id, QuestionStatus::Error)
                    .await
                {
                    error!(question = %question_id, error = %e, "could not mark error status");
                }
                ProcessOutcome::Failed
            }
        }
    }

    async fn try_process(&self, question_id: Uuid) -> PipelineResult<ProcessOutcome> {
        let question = self
            .store
            .get_question(question_id)
            .await?
            .ok_or(PipelineError::QuestionNotFound(question_id))?;
        let verdict = self
            .store
            .get_verdict(question_id)
            .await?
            .ok_or(PipelineError::VerdictNotFound(question_id))?;

        if question.status != QuestionStatus::Pending {
            debug!(question = %question_id, status = %question.status, "not pending, skipping");
            return Ok(ProcessOutcome::Skipped);
        }

        if !verdict.is_in_scope {
            info!(question = %question_id, "out of scope, ignoring");
            self.store
                .update_question_status(question_id, QuestionStatus::Ignored)
                .await?;
            return Ok(ProcessOutcome::Ignored);
        }

        // Re-check against current market config: thresholds may have moved
        // since the verdict was created.
        let market = question.market.as_deref();
        let min_confidence = self
            .markets
            .effective_min_confidence(market, self.default_min_confidence);
        if verdict.confidence < min_confidence {
            info!(
                question = %question_id,
                confidence = %verdict.confidence,
                min_confidence,
                "below threshold, ignoring"
            );
            self.store
                .update_question_status(question_id, QuestionStatus::Ignored)
                .await?;
            return Ok(ProcessOutcome::Ignored);
        }

        // Claim the question. Exactly one of two racing workers gets it;
        // the loser observes a non-pending status and no-ops.
        if !self
            .store
            .claim_question(
                question_id,
                QuestionStatus::Pending,
                QuestionStatus::Processing,
            )
            .await?
        {
            debug!(question = %question_id, "claim lost to another worker");
            return Ok(ProcessOutcome::Skipped);
        }

        self.generate_and_deliver(&question, &verdict).await
    }

    /// Steps after the claim: generate, format, persist, optionally post.
    async fn generate_and_deliver(
        &self,
        question: &Question,
        verdict: &Verdict,
    ) -> PipelineResult<ProcessOutcome> {
        let market = question.market.as_deref();
        let context = market.and_then(|m| self.markets.get(m)).map(|m| m.context());

        let generation = match self
            .agent
            .generate(&question.content, None, context.as_ref())
            .await
        {
            Ok(generation) if generation.has_text() => generation,
            Ok(_) => {
                error!(question = %question.id, "generation returned empty text");
                self.store
                    .update_question_status(question.id, QuestionStatus::Error)
                    .await?;
                return Ok(ProcessOutcome::Failed);
            }
            Err(e) => {
                error!(question = %question.id, error = %e, "generation failed");
                self.store
                    .update_question_status(question.id, QuestionStatus::Error)
                    .await?;
                return Ok(ProcessOutcome::Failed);
            }
        };

        let workflow_link = verdict.workflow_link.clone().unwrap_or_else(|| {
            self.markets
                .workflow_link_for_context(market, &question.content)
        });

        let body = generation.response_text.as_deref().unwrap_or_default();
        let formatted = format_response(body, Some(&workflow_link));

        self.store
            .update_verdict_text(verdict.id, &formatted)
            .await?;

        if !self.auto_post {
            // Reply is ready; delivery is manual.
            info!(question = %question.id, "auto-post disabled, reply ready");
            self.store
                .update_question_status(question.id, QuestionStatus::Answered)
                .await?;
            return Ok(ProcessOutcome::Answered);
        }

        let posted = match self.factory.adapter_for(question.platform, market) {
            Some(adapter) => adapter.post_response(&question.url, &formatted).await,
            None => {
                warn!(platform = %question.platform, "no adapter to post through");
                false
            }
        };

        if posted {
            self.store
                .update_verdict_posted(verdict.id, true, Some(Utc::now()))
                .await?;
            self.store
                .update_question_status(question.id, QuestionStatus::Answered)
                .await?;
            info!(question = %question.id, "reply posted");
            Ok(ProcessOutcome::Answered)
        } else {
            // Record the attempt; a failed auto-post is terminal. The next
            // scheduled sweep will not silently retry a reply the platform
            // rejected.
            warn!(question = %question.id, "posting failed, marking error");
            self.store
                .update_verdict_posted(verdict.id, false, None)
                .await?;
            self.store
                .update_question_status(question.id, QuestionStatus::Error)
                .await?;
            Ok(ProcessOutcome::Failed)
        }
    }

    /// Sweep pending questions that already have an in-scope verdict.
    ///
    /// One question failing never aborts the sweep. Returns the number
    /// processed successfully.
    pub async fn process_pending(&self, limit: usize, market: Option<&str>) -> usize {
        let pending = match self
            .store
            .list_questions_by_status(QuestionStatus::Pending, limit, market)
            .await
        {
            Ok(pending) => pending,
            Err(e) => {
                error!(error = %e, "could not list pending questions");
                return 0;
            }
        };

        info!(
            count = pending.len(),
            market = market.unwrap_or("-"),
            "processing pending questions"
        );

        let mut processed = 0;
        for question in pending {
            let verdict = match self.store.get_verdict(question.id).await {
                Ok(verdict) => verdict,
                Err(e) => {
                    warn!(question = %question.id, error = %e, "verdict lookup failed");
                    continue;
                }
            };

            match verdict {
                Some(v) if v.is_in_scope => {
                    if self.process(question.id).await.succeeded() {
                        processed += 1;
                    }
                }
                _ => debug!(question = %question.id, "no in-scope verdict, skipping"),
            }
        }

        info!(processed, "sweep complete");
        processed
    }
}

/// Final reply text: generated body, optional helpful link, mandatory
/// disclosure.
pub fn format_response(body: &str, workflow_link: Option<&str>) -> String {
    let mut formatted = body.trim().to_string();

    if let Some(link) = workflow_link {
        formatted.push_str(&format!("\n\nYou might find this helpful: {link}"));
    }

    formatted.push_str("\n\n");
    formatted.push_str(DISCLOSURE);
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disclosure_appears_exactly_once() {
        let formatted = format_response("Here is how you do it.", Some("https://app.wavelet.ai"));
        assert_eq!(formatted.matches(DISCLOSURE).count(), 1);
        assert!(formatted.ends_with(DISCLOSURE));
    }

    #[test]
    fn link_is_optional() {
        let without = format_response("Body.", None);
        assert!(!without.contains("You might find this helpful"));
        assert!(without.contains(DISCLOSURE));

        let with = format_response("Body.", Some("https://app.wavelet.ai/workflow/x"));
        assert!(with.contains("You might find this helpful: https://app.wavelet.ai/workflow/x"));
    }

    #[test]
    fn body_is_trimmed_before_suffixes() {
        let formatted = format_response("  Body.\n\n", None);
        assert!(formatted.starts_with("Body."));
    }
}
