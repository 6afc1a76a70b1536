//! In-memory storage gateway for testing and development.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::traits::store::StorageGateway;
use crate::types::{CrawlLog, Platform, Question, QuestionStatus, Verdict, VerdictStats};

/// In-memory store backed by locked maps.
///
/// Useful for tests and local development; data is lost on restart.
/// Uniqueness and claim semantics match the Postgres backend.
#[derive(Default)]
pub struct MemoryStore {
    questions: RwLock<HashMap<Uuid, Question>>,
    verdicts: RwLock<HashMap<Uuid, Verdict>>,
    crawl_logs: RwLock<Vec<CrawlLog>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored questions.
    pub fn question_count(&self) -> usize {
        self.questions.read().unwrap().len()
    }

    /// Number of stored verdicts.
    pub fn verdict_count(&self) -> usize {
        self.verdicts.read().unwrap().len()
    }

    /// Number of crawl log entries.
    pub fn crawl_log_count(&self) -> usize {
        self.crawl_logs.read().unwrap().len()
    }
}

#[async_trait]
impl StorageGateway for MemoryStore {
    async fn create_question(&self, question: Question) -> StoreResult<Option<Question>> {
        let mut questions = self.questions.write().unwrap();

        let conflict = questions.values().any(|q| {
            (q.platform == question.platform && q.post_id == question.post_id)
                || q.content_hash == question.content_hash
        });
        if conflict {
            return Ok(None);
        }

        questions.insert(question.id, question.clone());
        Ok(Some(question))
    }

    async fn get_question(&self, id: Uuid) -> StoreResult<Option<Question>> {
        Ok(self.questions.read().unwrap().get(&id).cloned())
    }

    async fn question_exists(&self, platform: Platform, post_id: &str) -> StoreResult<bool> {
        Ok(self
            .questions
            .read()
            .unwrap()
            .values()
            .any(|q| q.platform == platform && q.post_id == post_id))
    }

    async fn content_hash_exists(&self, hash: &str) -> StoreResult<bool> {
        Ok(self
            .questions
            .read()
            .unwrap()
            .values()
            .any(|q| q.content_hash == hash))
    }

    async fn update_question_status(&self, id: Uuid, status: QuestionStatus) -> StoreResult<bool> {
        let mut questions = self.questions.write().unwrap();
        match questions.get_mut(&id) {
            Some(question) => {
                question.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn claim_question(
        &self,
        id: Uuid,
        from: QuestionStatus,
        to: QuestionStatus,
    ) -> StoreResult<bool> {
        // Compare-and-set under the write lock: of two racing claimers,
        // exactly one observes `from`.
        let mut questions = self.questions.write().unwrap();
        match questions.get_mut(&id) {
            Some(question) if question.status == from => {
                question.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_questions_by_status(
        &self,
        status: QuestionStatus,
        limit: usize,
        market: Option<&str>,
    ) -> StoreResult<Vec<Question>> {
        let questions = self.questions.read().unwrap();
        let mut matching: Vec<Question> = questions
            .values()
            .filter(|q| q.status == status)
            .filter(|q| market.is_none() || q.market.as_deref() == market)
            .cloned()
            .collect();

        matching.sort_by_key(|q| q.crawled_at);
        matching.truncate(limit);
        Ok(matching)
    }

    async fn create_verdict(&self, verdict: Verdict) -> StoreResult<Option<Verdict>> {
        if !self
            .questions
            .read()
            .unwrap()
            .contains_key(&verdict.question_id)
        {
            return Ok(None);
        }

        let mut verdicts = self.verdicts.write().unwrap();
        if verdicts
            .values()
            .any(|v| v.question_id == verdict.question_id)
        {
            return Ok(None);
        }

        verdicts.insert(verdict.id, verdict.clone());
        Ok(Some(verdict))
    }

    async fn get_verdict(&self, question_id: Uuid) -> StoreResult<Option<Verdict>> {
        Ok(self
            .verdicts
            .read()
            .unwrap()
            .values()
            .find(|v| v.question_id == question_id)
            .cloned())
    }

    async fn update_verdict_text(&self, verdict_id: Uuid, text: &str) -> StoreResult<bool> {
        let mut verdicts = self.verdicts.write().unwrap();
        match verdicts.get_mut(&verdict_id) {
            Some(verdict) => {
                verdict.response_text = Some(text.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_verdict_posted(
        &self,
        verdict_id: Uuid,
        posted: bool,
        posted_at: Option<DateTime<Utc>>,
    ) -> StoreResult<bool> {
        let mut verdicts = self.verdicts.write().unwrap();
        match verdicts.get_mut(&verdict_id) {
            Some(verdict) => {
                verdict.posted = posted;
                verdict.posted_at = posted_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_crawl_log(&self, entry: CrawlLog) -> StoreResult<Option<CrawlLog>> {
        self.crawl_logs.write().unwrap().push(entry.clone());
        Ok(Some(entry))
    }

    async fn recent_crawl_logs(&self, limit: usize) -> StoreResult<Vec<CrawlLog>> {
        let logs = self.crawl_logs.read().unwrap();
        let mut recent: Vec<CrawlLog> = logs.clone();
        recent.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        recent.truncate(limit);
        Ok(recent)
    }

    async fn question_counts_by_status(&self) -> StoreResult<HashMap<String, usize>> {
        let questions = self.questions.read().unwrap();
        let mut counts = HashMap::new();
        for q in questions.values() {
            *counts.entry(q.status.as_str().to_string()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn question_counts_by_platform(&self) -> StoreResult<HashMap<String, usize>> {
        let questions = self.questions.read().unwrap();
        let mut counts = HashMap::new();
        for q in questions.values() {
            *counts.entry(q.platform.as_str().to_string()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn verdict_stats(&self) -> StoreResult<VerdictStats> {
        let verdicts = self.verdicts.read().unwrap();
        let total = verdicts.len();
        if total == 0 {
            return Ok(VerdictStats::default());
        }

        let posted = verdicts.values().filter(|v| v.posted).count();
        let avg_confidence =
            verdicts.values().map(|v| v.confidence as f64).sum::<f64>() / total as f64;

        Ok(VerdictStats {
            total,
            posted,
            success_rate: posted as f64 / total as f64,
            avg_confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QuestionDraft;

    fn draft(post_id: &str, content: &str) -> Question {
        QuestionDraft {
            platform: Platform::Reddit,
            post_id: post_id.into(),
            title: content.into(),
            content: content.into(),
            author: "user".into(),
            url: format!("https://reddit.com/r/x/comments/{post_id}"),
            tags: vec![],
            upvotes: 3,
            market: Some("general_video".into()),
            created_at: Utc::now(),
        }
        .into_question(crate::dedup::fingerprint(content))
    }

    #[tokio::test]
    async fn duplicate_platform_id_stores_first_only() {
        let store = MemoryStore::new();
        assert!(store
            .create_question(draft("p1", "first text"))
            .await
            .unwrap()
            .is_some());
        assert!(store
            .create_question(draft("p1", "different text"))
            .await
            .unwrap()
            .is_none());
        assert_eq!(store.question_count(), 1);
    }

    #[tokio::test]
    async fn duplicate_fingerprint_stores_first_only() {
        let store = MemoryStore::new();
        assert!(store
            .create_question(draft("p1", "Same   Text"))
            .await
            .unwrap()
            .is_some());
        // Different post id, identical normalized content.
        assert!(store
            .create_question(draft("p2", "same text"))
            .await
            .unwrap()
            .is_none());
        assert_eq!(store.question_count(), 1);
    }

    #[tokio::test]
    async fn claim_is_exclusive() {
        let store = MemoryStore::new();
        let q = store
            .create_question(draft("p1", "text"))
            .await
            .unwrap()
            .unwrap();

        assert!(store
            .claim_question(q.id, QuestionStatus::Pending, QuestionStatus::Processing)
            .await
            .unwrap());
        // Second claim sees a non-pending status.
        assert!(!store
            .claim_question(q.id, QuestionStatus::Pending, QuestionStatus::Processing)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn verdict_requires_parent_and_is_unique() {
        let store = MemoryStore::new();

        let orphan = Verdict::new(Uuid::new_v4(), true, 0.9);
        assert!(store.create_verdict(orphan).await.unwrap().is_none());

        let q = store
            .create_question(draft("p1", "text"))
            .await
            .unwrap()
            .unwrap();
        assert!(store
            .create_verdict(Verdict::new(q.id, true, 0.9))
            .await
            .unwrap()
            .is_some());
        assert!(store
            .create_verdict(Verdict::new(q.id, false, 0.1))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn list_filters_by_market() {
        let store = MemoryStore::new();
        let mut a = draft("p1", "one");
        a.market = Some("indie_authors".into());
        let b = draft("p2", "two");
        store.create_question(a).await.unwrap();
        store.create_question(b).await.unwrap();

        let indie = store
            .list_questions_by_status(QuestionStatus::Pending, 10, Some("indie_authors"))
            .await
            .unwrap();
        assert_eq!(indie.len(), 1);

        let all = store
            .list_questions_by_status(QuestionStatus::Pending, 10, None)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn stats_aggregate() {
        let store = MemoryStore::new();
        let q1 = store
            .create_question(draft("p1", "one"))
            .await
            .unwrap()
            .unwrap();
        let q2 = store
            .create_question(draft("p2", "two"))
            .await
            .unwrap()
            .unwrap();

        let v1 = store
            .create_verdict(Verdict::new(q1.id, true, 0.8))
            .await
            .unwrap()
            .unwrap();
        store
            .create_verdict(Verdict::new(q2.id, true, 0.6))
            .await
            .unwrap();
        store
            .update_verdict_posted(v1.id, true, Some(Utc::now()))
            .await
            .unwrap();

        let stats = store.verdict_stats().await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.posted, 1);
        assert!((stats.success_rate - 0.5).abs() < 1e-9);
        assert!((stats.avg_confidence - 0.7).abs() < 1e-6);
    }
}
