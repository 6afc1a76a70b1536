//! Request and response types for the Wavelet Agent API.

use serde::{Deserialize, Serialize};

/// Market context forwarded to the agent so scoring and generation can be
/// tuned to the audience the question came from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketContext {
    /// Market segment name (e.g. "indie_authors").
    pub market: String,

    /// Desired tone for generated text.
    pub tone: String,

    /// What this audience struggles with.
    #[serde(default)]
    pub target_pain: String,

    /// Product capabilities relevant to this audience.
    #[serde(default)]
    pub product_context: String,
}

/// Request body for `POST /api/analyze`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest {
    /// The question content.
    pub question: String,

    /// The question title, empty when the platform has none.
    pub title: String,

    /// Task discriminator understood by the agent.
    pub task: &'static str,

    /// Optional market context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_context: Option<MarketContext>,
}

impl AnalyzeRequest {
    /// Build an analyze request for a question.
    pub fn new(question: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            title: title.into(),
            task: "analyze_capability",
            market_context: None,
        }
    }

    /// Attach market context.
    pub fn with_market_context(mut self, context: MarketContext) -> Self {
        self.market_context = Some(context);
        self
    }
}

/// Response body from `POST /api/analyze`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeResponse {
    /// Whether the agent believes it can answer the question.
    #[serde(default)]
    pub is_in_scope: bool,

    /// Confidence in the verdict, 0.0 to 1.0.
    #[serde(default)]
    pub confidence_score: f32,

    /// Why the agent reached this verdict.
    #[serde(default)]
    pub reasoning: String,

    /// A workflow the agent suggests pointing the asker at.
    #[serde(default)]
    pub suggested_workflow: Option<String>,
}

/// Request body for `POST /api/generate`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    /// The question to answer.
    pub question: String,

    /// Task discriminator understood by the agent.
    pub task: &'static str,

    /// Specific workflow to build the answer around.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,

    /// Optional market context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_context: Option<MarketContext>,

    /// Tone override, defaults server-side when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
}

impl GenerateRequest {
    /// Build a generate request for a question.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            task: "generate_response",
            workflow_id: None,
            market_context: None,
            tone: None,
        }
    }

    /// Attach market context and its tone.
    pub fn with_market_context(mut self, context: MarketContext) -> Self {
        self.tone = Some(context.tone.clone());
        self.market_context = Some(context);
        self
    }

    /// Pin the answer to a specific workflow.
    pub fn with_workflow(mut self, workflow_id: impl Into<String>) -> Self {
        self.workflow_id = Some(workflow_id.into());
        self
    }
}

/// Response body from `POST /api/generate`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    /// Generated reply text. Absent or empty means generation failed.
    #[serde(default)]
    pub response_text: Option<String>,

    /// Workflow link the agent chose, if any.
    #[serde(default)]
    pub workflow_link: Option<String>,

    /// Confidence in the generated answer, 0.0 to 1.0.
    #[serde(default)]
    pub confidence: f32,
}

/// Response body from `GET /api/workflows/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WorkflowResponse {
    #[serde(default)]
    pub public_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_request_serializes_task() {
        let req = AnalyzeRequest::new("How do I make a book trailer?", "Book trailer help");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["task"], "analyze_capability");
        assert!(json.get("market_context").is_none());
    }

    #[test]
    fn generate_request_carries_tone_from_context() {
        let ctx = MarketContext {
            market: "indie_authors".into(),
            tone: "encouraging, creative".into(),
            ..Default::default()
        };
        let req = GenerateRequest::new("question").with_market_context(ctx);
        assert_eq!(req.tone.as_deref(), Some("encouraging, creative"));
    }

    #[test]
    fn analyze_response_defaults_are_safe() {
        let resp: AnalyzeResponse = serde_json::from_str("{}").unwrap();
        assert!(!resp.is_in_scope);
        assert_eq!(resp.confidence_score, 0.0);
        assert!(resp.suggested_workflow.is_none());
    }

    #[test]
    fn generate_response_tolerates_null_text() {
        let resp: GenerateResponse =
            serde_json::from_str(r#"{"response_text": null, "confidence": 0.4}"#).unwrap();
        assert!(resp.response_text.is_none());
    }
}
