//! Testing utilities: mock agent, mock adapter, fixture helpers.
//!
//! Useful for exercising the pipeline without network or AI calls. Mocks
//! track their calls so tests can assert on what was invoked.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{AdapterError, AdapterResult, AgentError, AgentResult};
use crate::markets::MarketContext;
use crate::traits::adapter::{AdapterFactory, SourceAdapter};
use crate::traits::agent::{Agent, Analysis, Generation};
use crate::types::{CommentDraft, Platform, QuestionDraft};

/// Build an analysis fixture.
pub fn analysis(is_in_scope: bool, confidence: f32) -> Analysis {
    Analysis {
        is_in_scope,
        confidence,
        reasoning: "mock analysis".to_string(),
        suggested_workflow: None,
    }
}

/// Build a generation fixture.
pub fn generation(text: &str) -> Generation {
    Generation {
        response_text: (!text.is_empty()).then(|| text.to_string()),
        workflow_link: None,
        confidence: 0.8,
    }
}

/// Build a question draft fixture.
pub fn sample_draft(platform: Platform, post_id: &str, text: &str) -> QuestionDraft {
    QuestionDraft {
        platform,
        post_id: post_id.to_string(),
        title: text.to_string(),
        content: text.to_string(),
        author: "test_user".to_string(),
        url: match platform {
            Platform::Reddit => format!("https://reddit.com/r/test/comments/{post_id}"),
            _ => format!("https://example.com/{post_id}"),
        },
        tags: Vec::new(),
        upvotes: 5,
        market: Some("general_video".to_string()),
        created_at: Utc::now(),
    }
}

/// Record of a call made to [`MockAgent`].
#[derive(Debug, Clone)]
pub enum MockAgentCall {
    Analyze {
        question: String,
        market: Option<String>,
    },
    Generate {
        question: String,
        market: Option<String>,
    },
}

/// Deterministic, configurable [`Agent`] for tests.
#[derive(Default)]
pub struct MockAgent {
    analyses: Arc<RwLock<HashMap<String, Analysis>>>,
    default_analysis: Arc<RwLock<Option<Analysis>>>,
    generations: Arc<RwLock<HashMap<String, Generation>>>,
    default_generation: Arc<RwLock<Option<Generation>>>,
    fail_analyze: Arc<RwLock<bool>>,
    fail_generate: Arc<RwLock<bool>>,
    calls: Arc<RwLock<Vec<MockAgentCall>>>,
}

impl MockAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Predefine the analysis for a specific question text.
    pub fn with_analysis(self, question: impl Into<String>, analysis: Analysis) -> Self {
        self.analyses
            .write()
            .unwrap()
            .insert(question.into(), analysis);
        self
    }

    /// Analysis returned for questions without a predefined one.
    pub fn with_default_analysis(self, analysis: Analysis) -> Self {
        *self.default_analysis.write().unwrap() = Some(analysis);
        self
    }

    /// Predefine the generation for a specific question text.
    pub fn with_generation(self, question: impl Into<String>, generation: Generation) -> Self {
        self.generations
            .write()
            .unwrap()
            .insert(question.into(), generation);
        self
    }

    /// Generation returned for questions without a predefined one.
    pub fn with_default_generation(self, generation: Generation) -> Self {
        *self.default_generation.write().unwrap() = Some(generation);
        self
    }

    /// Make every analyze call fail with a transport error.
    pub fn failing_analyze(self) -> Self {
        *self.fail_analyze.write().unwrap() = true;
        self
    }

    /// Make every generate call fail with a transport error.
    pub fn failing_generate(self) -> Self {
        *self.fail_generate.write().unwrap() = true;
        self
    }

    /// All calls made to this mock.
    pub fn calls(&self) -> Vec<MockAgentCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of generate calls made.
    pub fn generate_calls(&self) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, MockAgentCall::Generate { .. }))
            .count()
    }

    fn transport_error() -> AgentError {
        AgentError::Transport(Box::new(std::io::Error::other("mock transport failure")))
    }
}

#[async_trait]
impl Agent for MockAgent {
    async fn analyze(
        &self,
        question: &str,
        _title: &str,
        context: Option<&MarketContext>,
    ) -> AgentResult<Analysis> {
        self.calls.write().unwrap().push(MockAgentCall::Analyze {
            question: question.to_string(),
            market: context.map(|c| c.market.clone()),
        });

        if *self.fail_analyze.read().unwrap() {
            return Err(Self::transport_error());
        }

        Ok(self
            .analyses
            .read()
            .unwrap()
            .get(question)
            .cloned()
            .or_else(|| self.default_analysis.read().unwrap().clone())
            .unwrap_or_else(|| analysis(true, 0.9)))
    }

    async fn generate(
        &self,
        question: &str,
        _workflow_id: Option<&str>,
        context: Option<&MarketContext>,
    ) -> AgentResult<Generation> {
        self.calls.write().unwrap().push(MockAgentCall::Generate {
            question: question.to_string(),
            market: context.map(|c| c.market.clone()),
        });

        if *self.fail_generate.read().unwrap() {
            return Err(Self::transport_error());
        }

        Ok(self
            .generations
            .read()
            .unwrap()
            .get(question)
            .cloned()
            .or_else(|| self.default_generation.read().unwrap().clone())
            .unwrap_or_else(|| generation("Here is a mock answer.")))
    }
}

/// Record of a call made to [`MockAdapter`].
#[derive(Debug, Clone)]
pub enum MockAdapterCall {
    FetchQuestions { limit: usize },
    FetchComments { url: String },
    PostResponse { url: String },
}

/// A [`SourceAdapter`] returning predefined drafts.
///
/// Clones share state, so a clone handed out through a factory reports its
/// calls back to the original.
#[derive(Clone)]
pub struct MockAdapter {
    platform: Platform,
    market: Option<String>,
    drafts: Arc<RwLock<Vec<QuestionDraft>>>,
    fail_fetch: Arc<RwLock<bool>>,
    post_result: Arc<RwLock<bool>>,
    posted: Arc<RwLock<Vec<(String, String)>>>,
    calls: Arc<RwLock<Vec<MockAdapterCall>>>,
}

impl MockAdapter {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            market: None,
            drafts: Arc::new(RwLock::new(Vec::new())),
            fail_fetch: Arc::new(RwLock::new(false)),
            post_result: Arc::new(RwLock::new(true)),
            posted: Arc::new(RwLock::new(Vec::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn with_market(mut self, market: impl Into<String>) -> Self {
        self.market = Some(market.into());
        self
    }

    /// Add a draft returned by `fetch_questions`.
    pub fn with_draft(self, draft: QuestionDraft) -> Self {
        self.drafts.write().unwrap().push(draft);
        self
    }

    /// Make `fetch_questions` fail.
    pub fn failing_fetch(self) -> Self {
        *self.fail_fetch.write().unwrap() = true;
        self
    }

    /// Set what `post_response` reports.
    pub fn with_post_result(self, result: bool) -> Self {
        *self.post_result.write().unwrap() = result;
        self
    }

    /// (url, text) pairs posted through this adapter.
    pub fn posted(&self) -> Vec<(String, String)> {
        self.posted.read().unwrap().clone()
    }

    /// All calls made to this mock.
    pub fn calls(&self) -> Vec<MockAdapterCall> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl SourceAdapter for MockAdapter {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn market(&self) -> Option<&str> {
        self.market.as_deref()
    }

    async fn fetch_questions(&self, limit: usize) -> AdapterResult<Vec<QuestionDraft>> {
        self.calls
            .write()
            .unwrap()
            .push(MockAdapterCall::FetchQuestions { limit });

        if *self.fail_fetch.read().unwrap() {
            return Err(AdapterError::Http(Box::new(std::io::Error::other(
                "mock fetch failure",
            ))));
        }

        let drafts = self.drafts.read().unwrap();
        Ok(drafts.iter().take(limit).cloned().collect())
    }

    async fn fetch_comments(&self, question_url: &str) -> AdapterResult<Vec<CommentDraft>> {
        self.calls
            .write()
            .unwrap()
            .push(MockAdapterCall::FetchComments {
                url: question_url.to_string(),
            });
        Ok(Vec::new())
    }

    async fn post_response(&self, question_url: &str, response_text: &str) -> bool {
        self.calls
            .write()
            .unwrap()
            .push(MockAdapterCall::PostResponse {
                url: question_url.to_string(),
            });

        let result = *self.post_result.read().unwrap();
        if result {
            self.posted
                .write()
                .unwrap()
                .push((question_url.to_string(), response_text.to_string()));
        }
        result
    }
}

/// Factory dispensing shared-state clones of mock adapters.
#[derive(Default)]
pub struct MockFactory {
    adapters: HashMap<Platform, MockAdapter>,
}

impl MockFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_adapter(mut self, adapter: MockAdapter) -> Self {
        self.adapters.insert(adapter.platform(), adapter);
        self
    }
}

impl AdapterFactory for MockFactory {
    fn adapter_for(
        &self,
        platform: Platform,
        _market: Option<&str>,
    ) -> Option<Box<dyn SourceAdapter>> {
        self.adapters
            .get(&platform)
            .map(|a| Box::new(a.clone()) as Box<dyn SourceAdapter>)
    }
}
