//! Capability scorer: asks the agent whether a question is answerable and
//! persists the verdict.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::markets::MarketRegistry;
use crate::traits::agent::Agent;
use crate::traits::store::StorageGateway;
use crate::types::{Question, Verdict};

/// Scores questions through the agent service.
///
/// Never errors outward: a failed agent call becomes a zero-confidence,
/// out-of-scope verdict with the error recorded, and a failed persist still
/// returns the in-memory verdict so callers can proceed.
pub struct CapabilityScorer<S, A> {
    store: Arc<S>,
    agent: Arc<A>,
    markets: Arc<MarketRegistry>,
    default_min_confidence: f32,
}

impl<S: StorageGateway, A: Agent> CapabilityScorer<S, A> {
    pub fn new(
        store: Arc<S>,
        agent: Arc<A>,
        markets: Arc<MarketRegistry>,
        default_min_confidence: f32,
    ) -> Self {
        Self {
            store,
            agent,
            markets,
            default_min_confidence,
        }
    }

    /// Score one question and persist the verdict.
    pub async fn check(&self, question: &Question) -> Verdict {
        let market = question.market.as_deref();
        let context = market.and_then(|m| self.markets.get(m)).map(|m| m.context());

        let verdict = match self
            .agent
            .analyze(&question.content, &question.title, context.as_ref())
            .await
        {
            Ok(analysis) => {
                let min_confidence = self
                    .markets
                    .effective_min_confidence(market, self.default_min_confidence);
                // A confidence exactly at the threshold passes.
                let meets_threshold = analysis.confidence >= min_confidence;

                info!(
                    question = %question.id,
                    in_scope = analysis.is_in_scope,
                    confidence = %analysis.confidence,
                    meets_threshold,
                    "question analyzed"
                );

                let mut verdict = Verdict::new(
                    question.id,
                    analysis.is_in_scope && meets_threshold,
                    analysis.confidence,
                );
                verdict.workflow_link = analysis.suggested_workflow;
                verdict
            }
            Err(e) => {
                warn!(question = %question.id, error = %e, "capability check degraded");
                Verdict::errored(question.id, e.to_string())
            }
        };

        match self.store.create_verdict(verdict.clone()).await {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                warn!(question = %question.id, "verdict not stored (duplicate or missing parent)");
                verdict
            }
            Err(e) => {
                warn!(question = %question.id, error = %e, "failed to persist verdict");
                verdict
            }
        }
    }

    /// Score a batch of question ids, skipping ids that do not resolve.
    pub async fn check_batch(&self, question_ids: &[Uuid]) -> HashMap<Uuid, Verdict> {
        let mut results = HashMap::with_capacity(question_ids.len());

        for &id in question_ids {
            let question = match self.store.get_question(id).await {
                Ok(Some(question)) => question,
                Ok(None) => {
                    warn!(question = %id, "question not found, skipping");
                    continue;
                }
                Err(e) => {
                    warn!(question = %id, error = %e, "failed to load question, skipping");
                    continue;
                }
            };

            let verdict = self.check(&question).await;
            results.insert(id, verdict);
        }

        results
    }

    /// Whether a verdict clears its market's effective threshold.
    pub fn is_answerable(&self, verdict: &Verdict, market: Option<&str>) -> bool {
        let min_confidence = self
            .markets
            .effective_min_confidence(market, self.default_min_confidence);
        verdict.is_in_scope && verdict.confidence >= min_confidence
    }
}
