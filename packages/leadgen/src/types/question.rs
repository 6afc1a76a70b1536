//! Question entities crawled from social platforms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Platforms the pipeline knows how to crawl or post to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Reddit,
    Quora,
    Twitter,
    Other,
}

impl Platform {
    /// Stable string key used for storage and adapter dispatch.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Reddit => "reddit",
            Platform::Quora => "quora",
            Platform::Twitter => "twitter",
            Platform::Other => "other",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reddit" => Ok(Platform::Reddit),
            "quora" => Ok(Platform::Quora),
            "twitter" => Ok(Platform::Twitter),
            "other" => Ok(Platform::Other),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

/// Lifecycle of a stored question.
///
/// Transitions: `pending → processing → {answered, ignored, error}`.
/// Only the crawl orchestrator (initial insert) and the response pipeline
/// move a question between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    Pending,
    Processing,
    Answered,
    Ignored,
    Error,
}

impl QuestionStatus {
    /// Stable string key used for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionStatus::Pending => "pending",
            QuestionStatus::Processing => "processing",
            QuestionStatus::Answered => "answered",
            QuestionStatus::Ignored => "ignored",
            QuestionStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QuestionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(QuestionStatus::Pending),
            "processing" => Ok(QuestionStatus::Processing),
            "answered" => Ok(QuestionStatus::Answered),
            "ignored" => Ok(QuestionStatus::Ignored),
            "error" => Ok(QuestionStatus::Error),
            other => Err(format!("unknown question status: {other}")),
        }
    }
}

/// A question stored by the pipeline.
///
/// Identity is (platform, post_id); the content fingerprint is a second
/// uniqueness axis so reposts of identical text are rejected at ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub platform: Platform,

    /// Platform-native post id (e.g. a reddit submission id).
    pub post_id: String,

    pub title: String,
    pub content: String,
    pub author: String,

    /// Canonical URL of the post.
    pub url: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub upvotes: i64,

    /// Market the question was crawled for. `None` means the default market.
    pub market: Option<String>,

    pub status: QuestionStatus,

    /// Normalized SHA-256 fingerprint of the content.
    pub content_hash: String,

    /// When the post was created, as reported by the platform.
    pub created_at: DateTime<Utc>,

    /// When we ingested it.
    pub crawled_at: DateTime<Utc>,
}

/// A candidate question produced by a source adapter, before storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub platform: Platform,
    pub post_id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub url: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub upvotes: i64,

    pub market: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl QuestionDraft {
    /// Promote a draft to a stored question.
    pub fn into_question(self, content_hash: String) -> Question {
        Question {
            id: Uuid::new_v4(),
            platform: self.platform,
            post_id: self.post_id,
            title: self.title,
            content: self.content,
            author: self.author,
            url: self.url,
            tags: self.tags,
            upvotes: self.upvotes,
            market: self.market,
            status: QuestionStatus::Pending,
            content_hash,
            created_at: self.created_at,
            crawled_at: Utc::now(),
        }
    }
}

/// A comment fetched alongside a question. Best-effort: some platforms
/// expose nothing without deeper scraping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDraft {
    /// Platform-native comment id.
    pub comment_id: String,
    pub content: String,
    pub author: String,

    #[serde(default)]
    pub upvotes: i64,

    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_round_trips_through_str() {
        for p in [
            Platform::Reddit,
            Platform::Quora,
            Platform::Twitter,
            Platform::Other,
        ] {
            assert_eq!(p.as_str().parse::<Platform>().unwrap(), p);
        }
    }

    #[test]
    fn draft_promotes_to_pending_question() {
        let draft = QuestionDraft {
            platform: Platform::Reddit,
            post_id: "abc123".into(),
            title: "How to promote my book?".into(),
            content: "Looking for book marketing tips".into(),
            author: "writer42".into(),
            url: "https://reddit.com/r/selfpublish/comments/abc123".into(),
            tags: vec!["r/selfpublish".into()],
            upvotes: 5,
            market: Some("indie_authors".into()),
            created_at: Utc::now(),
        };

        let question = draft.into_question("deadbeef".into());
        assert_eq!(question.status, QuestionStatus::Pending);
        assert_eq!(question.content_hash, "deadbeef");
        assert_eq!(question.market.as_deref(), Some("indie_authors"));
    }
}
