//! Wavelet Agent implementation of the [`Agent`] trait.
//!
//! Maps the pipeline's domain types onto the wire types of
//! `wavelet-client` and its errors onto [`AgentError`].

use async_trait::async_trait;
use secrecy::ExposeSecret;

use wavelet_client::{
    AnalyzeRequest, GenerateRequest, MarketContext as WireContext, WaveletClient, WaveletError,
};

use crate::config::AppConfig;
use crate::error::{AgentError, AgentResult};
use crate::markets::MarketContext;
use crate::traits::agent::{Agent, Analysis, Generation};

/// Production agent backed by the Wavelet Agent API.
pub struct WaveletAgent {
    client: WaveletClient,
}

impl WaveletAgent {
    pub fn new(client: WaveletClient) -> Self {
        Self { client }
    }

    /// Build a client from application configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let client = WaveletClient::new(
            config.agent_base_url.clone(),
            config.agent_api_key.expose_secret().to_string(),
        )
        .with_timeout(config.request_timeout);
        Self::new(client)
    }

    /// Whether the agent service is reachable.
    pub async fn health_check(&self) -> bool {
        self.client.health_check().await
    }
}

#[async_trait]
impl Agent for WaveletAgent {
    async fn analyze(
        &self,
        question: &str,
        title: &str,
        context: Option<&MarketContext>,
    ) -> AgentResult<Analysis> {
        let mut request = AnalyzeRequest::new(question, title);
        if let Some(ctx) = context {
            request = request.with_market_context(to_wire(ctx));
        }

        let response = self
            .client
            .analyze_question(&request)
            .await
            .map_err(agent_error)?;

        Ok(Analysis {
            is_in_scope: response.is_in_scope,
            confidence: response.confidence_score.clamp(0.0, 1.0),
            reasoning: response.reasoning,
            suggested_workflow: response.suggested_workflow,
        })
    }

    async fn generate(
        &self,
        question: &str,
        workflow_id: Option<&str>,
        context: Option<&MarketContext>,
    ) -> AgentResult<Generation> {
        let mut request = GenerateRequest::new(question);
        if let Some(ctx) = context {
            request = request.with_market_context(to_wire(ctx));
        }
        if let Some(id) = workflow_id {
            request = request.with_workflow(id);
        }

        let response = self
            .client
            .generate_response(&request)
            .await
            .map_err(agent_error)?;

        Ok(Generation {
            response_text: response.response_text,
            workflow_link: response.workflow_link,
            confidence: response.confidence.clamp(0.0, 1.0),
        })
    }
}

fn to_wire(ctx: &MarketContext) -> WireContext {
    WireContext {
        market: ctx.market.clone(),
        tone: ctx.tone.clone(),
        target_pain: ctx.target_pain.clone(),
        product_context: ctx.product_context.clone(),
    }
}

fn agent_error(e: WaveletError) -> AgentError {
    match e {
        WaveletError::Status { status, body } => AgentError::Service {
            status,
            message: body,
        },
        WaveletError::Decode(e) => AgentError::InvalidResponse(e.to_string()),
        WaveletError::Transport(e) => AgentError::Transport(Box::new(e)),
        WaveletError::Config(message) => AgentError::InvalidResponse(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_map_to_service() {
        let err = agent_error(WaveletError::Status {
            status: 503,
            body: "overloaded".into(),
        });
        assert!(matches!(err, AgentError::Service { status: 503, .. }));
    }
}
