//! Typed errors for the lead-generation pipeline.
//!
//! One enum per collaborator boundary. Adapters, the store, and the agent
//! each fail in their own vocabulary; `PipelineError` is what the
//! orchestration layer speaks.

use thiserror::Error;

use crate::types::Platform;

/// Errors from a source adapter talking to its platform.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The platform answered with something we could not parse.
    #[error("unparseable platform response: {0}")]
    Parse(String),

    /// Invalid or unrecognized platform URL.
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// The adapter cannot perform this operation on its platform.
    #[error("{platform} does not support {operation}")]
    Unsupported {
        platform: Platform,
        operation: &'static str,
    },
}

/// Errors from the storage gateway.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend failure (connection, query, constraint other than uniqueness).
    #[error("storage error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Stored data could not be decoded into a domain type.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Errors from the AI agent boundary.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Transport failure or timeout reaching the agent service.
    #[error("agent transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The agent answered with a non-success status.
    #[error("agent service error ({status}): {message}")]
    Service { status: u16, message: String },

    /// The agent answered but the payload was unusable.
    #[error("invalid agent response: {0}")]
    InvalidResponse(String),
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing environment variable: {0}")]
    MissingVar(&'static str),

    /// An environment variable is present but unusable.
    #[error("invalid value for {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },

    /// A market lists a platform it has no parameters for.
    #[error("market '{market}' lists platform '{platform}' without parameters")]
    MissingPlatformParams { market: String, platform: Platform },

    /// Duplicate market name in the registry.
    #[error("duplicate market: {0}")]
    DuplicateMarket(String),
}

/// Errors surfaced by the orchestration layer (crawl, score, respond).
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    /// No such market is configured.
    #[error("unknown market: {0}")]
    UnknownMarket(String),

    /// No adapter is registered for the platform.
    #[error("unknown platform: {0}")]
    UnknownPlatform(Platform),

    /// The question id did not resolve to a stored question.
    #[error("question not found: {0}")]
    QuestionNotFound(uuid::Uuid),

    /// The question has no verdict yet.
    #[error("no verdict for question: {0}")]
    VerdictNotFound(uuid::Uuid),
}

/// Result alias for adapter operations.
pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

/// Result alias for storage operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result alias for agent operations.
pub type AgentResult<T> = std::result::Result<T, AgentError>;

/// Result alias for pipeline operations.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
