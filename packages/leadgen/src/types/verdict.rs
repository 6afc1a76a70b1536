//! Verdicts: the stored outcome of capability scoring for one question.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of capability scoring plus generated-response state.
///
/// At most one per question, never created without a parent question.
/// The capability scorer creates it; the response pipeline mutates
/// `response_text`, `posted` and `posted_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub id: Uuid,
    pub question_id: Uuid,

    /// Final in-scope decision: service verdict AND confidence gate.
    pub is_in_scope: bool,

    /// Confidence reported by the scoring service, 0.0 to 1.0.
    pub confidence: f32,

    /// Workflow link suggested by the scoring service.
    pub workflow_link: Option<String>,

    /// Formatted reply text, set once generation succeeds.
    pub response_text: Option<String>,

    #[serde(default)]
    pub posted: bool,

    pub posted_at: Option<DateTime<Utc>>,

    /// Error recorded when scoring or posting degraded.
    pub error_message: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Verdict {
    /// Build a fresh verdict for a question.
    pub fn new(question_id: Uuid, is_in_scope: bool, confidence: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            question_id,
            is_in_scope,
            confidence,
            workflow_link: None,
            response_text: None,
            posted: false,
            posted_at: None,
            error_message: None,
            created_at: Utc::now(),
        }
    }

    /// Degraded verdict recorded when the scoring service failed.
    pub fn errored(question_id: Uuid, error: impl Into<String>) -> Self {
        let mut verdict = Self::new(question_id, false, 0.0);
        verdict.error_message = Some(error.into());
        verdict
    }

    /// Attach a suggested workflow link.
    pub fn with_workflow_link(mut self, link: impl Into<String>) -> Self {
        self.workflow_link = Some(link.into());
        self
    }
}

/// Aggregate response statistics for the analytics boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerdictStats {
    pub total: usize,
    pub posted: usize,

    /// posted / total, 0.0 when no verdicts exist.
    pub success_rate: f64,

    /// Mean confidence across all verdicts, 0.0 when none exist.
    pub avg_confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errored_verdict_is_out_of_scope() {
        let v = Verdict::errored(Uuid::new_v4(), "timeout");
        assert!(!v.is_in_scope);
        assert_eq!(v.confidence, 0.0);
        assert_eq!(v.error_message.as_deref(), Some("timeout"));
        assert!(!v.posted);
    }
}
