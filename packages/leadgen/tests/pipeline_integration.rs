//! End-to-end pipeline tests: crawl → dedupe → score → respond, driven by
//! mock collaborators and the in-memory store.

use std::sync::Arc;

use leadgen::dedup;
use leadgen::testing::{analysis, generation, sample_draft, MockAdapter, MockAgent, MockFactory};
use leadgen::{
    CapabilityScorer, CrawlOrchestrator, CrawlStatus, MarketRegistry, MemoryStore, Platform,
    ProcessOutcome, Question, QuestionStatus, RelevanceFilter, ResponsePipeline, StorageGateway,
    Verdict, DISCLOSURE,
};

const GLOBAL_MIN_CONFIDENCE: f32 = 0.7;

fn registry() -> Arc<MarketRegistry> {
    Arc::new(MarketRegistry::builtin())
}

async fn seed_question(store: &MemoryStore, post_id: &str, text: &str) -> Question {
    let draft = sample_draft(Platform::Reddit, post_id, text);
    let hash = dedup::fingerprint(text);
    store
        .create_question(draft.into_question(hash))
        .await
        .unwrap()
        .expect("fixture question stored")
}

async fn seed_verdict(
    store: &MemoryStore,
    question: &Question,
    is_in_scope: bool,
    confidence: f32,
) -> Verdict {
    store
        .create_verdict(Verdict::new(question.id, is_in_scope, confidence))
        .await
        .unwrap()
        .expect("fixture verdict stored")
}

fn pipeline(
    store: &Arc<MemoryStore>,
    agent: &Arc<MockAgent>,
    adapter: &MockAdapter,
    auto_post: bool,
) -> ResponsePipeline<MemoryStore, MockAgent> {
    let factory = Arc::new(MockFactory::new().with_adapter(adapter.clone()));
    ResponsePipeline::new(
        Arc::clone(store),
        Arc::clone(agent),
        registry(),
        factory,
        auto_post,
        GLOBAL_MIN_CONFIDENCE,
    )
}

// --- crawl orchestration ---------------------------------------------------

#[tokio::test]
async fn low_upvote_draft_is_filtered_before_storage() {
    // course_creators sets a reddit upvote floor of 3; an upvotes=1 draft
    // dies inside the adapter's relevance gate and never reaches storage.
    let registry = registry();
    let params = registry
        .get("course_creators")
        .unwrap()
        .platform_params(Platform::Reddit)
        .unwrap();
    let filter = RelevanceFilter::from_params(params);

    let mut draft = sample_draft(Platform::Reddit, "p1", "need an explainer video for my course");
    draft.upvotes = 1;
    assert!(!filter.accepts(&draft));

    // The adapter therefore surfaces nothing, and the crawl stores nothing.
    let store = Arc::new(MemoryStore::new());
    let adapter = MockAdapter::new(Platform::Reddit).with_market("course_creators");
    let factory = Arc::new(MockFactory::new().with_adapter(adapter));
    let orchestrator = CrawlOrchestrator::new(Arc::clone(&store), registry, factory);

    let report = orchestrator
        .crawl_platform(Platform::Reddit, Some("course_creators"), 50)
        .await;

    assert_eq!(report.items_stored, 0);
    assert_eq!(store.question_count(), 0);
}

#[tokio::test]
async fn crawl_dedupes_by_platform_id_and_fingerprint() {
    let store = Arc::new(MemoryStore::new());
    let adapter = MockAdapter::new(Platform::Reddit)
        // Same (platform, post id) twice.
        .with_draft(sample_draft(Platform::Reddit, "p1", "first question text"))
        .with_draft(sample_draft(Platform::Reddit, "p1", "first question text edited"))
        // New id, identical normalized content as the first.
        .with_draft(sample_draft(Platform::Reddit, "p2", "First   Question TEXT"))
        .with_draft(sample_draft(Platform::Reddit, "p3", "a genuinely new question"));
    let factory = Arc::new(MockFactory::new().with_adapter(adapter));
    let orchestrator = CrawlOrchestrator::new(Arc::clone(&store), registry(), factory);

    let report = orchestrator.crawl_platform(Platform::Reddit, None, 50).await;

    assert_eq!(report.items_found, 4);
    assert_eq!(report.items_stored, 2);
    assert_eq!(report.duplicates, 2);
    assert_eq!(store.question_count(), 2);
    assert!(report.error.is_none());

    // Every stored question starts pending.
    let pending = store
        .list_questions_by_status(QuestionStatus::Pending, 10, None)
        .await
        .unwrap();
    assert_eq!(pending.len(), 2);

    // Re-crawling the same drafts stores nothing new.
    let again = orchestrator.crawl_platform(Platform::Reddit, None, 50).await;
    assert_eq!(again.items_stored, 0);
    assert_eq!(again.duplicates, 4);
    assert_eq!(store.crawl_log_count(), 2);
}

#[tokio::test]
async fn adapter_failure_becomes_failure_log_not_error() {
    let store = Arc::new(MemoryStore::new());
    let adapter = MockAdapter::new(Platform::Reddit).failing_fetch();
    let factory = Arc::new(MockFactory::new().with_adapter(adapter));
    let orchestrator = CrawlOrchestrator::new(Arc::clone(&store), registry(), factory);

    let report = orchestrator.crawl_platform(Platform::Reddit, None, 50).await;

    assert!(report.error.is_some());
    assert_eq!(report.items_stored, 0);

    let logs = store.recent_crawl_logs(5).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, CrawlStatus::Failure);
    assert!(logs[0].error_message.is_some());
}

#[tokio::test]
async fn market_crawl_aggregates_platform_reports() {
    // general_video crawls reddit and quora.
    let store = Arc::new(MemoryStore::new());
    let reddit = MockAdapter::new(Platform::Reddit)
        .with_draft(sample_draft(Platform::Reddit, "r1", "reddit question one"))
        .with_draft(sample_draft(Platform::Reddit, "r2", "reddit question two"));
    let quora = MockAdapter::new(Platform::Quora)
        .with_draft(sample_draft(Platform::Quora, "q1", "quora question one"));
    let factory = Arc::new(
        MockFactory::new()
            .with_adapter(reddit)
            .with_adapter(quora),
    );
    let orchestrator = CrawlOrchestrator::new(Arc::clone(&store), registry(), factory);

    let report = orchestrator.crawl_market("general_video", 50).await.unwrap();

    assert_eq!(report.market, "general_video");
    assert_eq!(report.platforms.len(), 2);
    assert_eq!(report.total_found, 3);
    assert_eq!(report.total_stored, 3);

    // One crawl log per (platform, market) pair.
    assert_eq!(store.crawl_log_count(), 2);
}

#[tokio::test]
async fn unknown_market_is_an_error() {
    let store = Arc::new(MemoryStore::new());
    let factory = Arc::new(MockFactory::new());
    let orchestrator = CrawlOrchestrator::new(store, registry(), factory);

    assert!(orchestrator.crawl_market("no_such_market", 10).await.is_err());
}

// --- capability scoring ----------------------------------------------------

#[tokio::test]
async fn confidence_at_threshold_is_accepted_one_below_rejected() {
    let store = Arc::new(MemoryStore::new());
    // general_video has no override, so the global 0.7 applies.
    let at = seed_question(&store, "p1", "how do i make an ai video").await;
    let below = seed_question(&store, "p2", "how do i edit an ai video").await;

    let agent = Arc::new(
        MockAgent::new()
            .with_analysis(at.content.clone(), analysis(true, 0.7))
            .with_analysis(below.content.clone(), analysis(true, 0.69)),
    );
    let scorer = CapabilityScorer::new(
        Arc::clone(&store),
        agent,
        registry(),
        GLOBAL_MIN_CONFIDENCE,
    );

    let verdict_at = scorer.check(&at).await;
    assert!(verdict_at.is_in_scope);

    let verdict_below = scorer.check(&below).await;
    assert!(!verdict_below.is_in_scope);
}

#[tokio::test]
async fn market_override_changes_the_gate() {
    let store = Arc::new(MemoryStore::new());
    // indie_authors lowers the floor to 0.65.
    let mut question = seed_question(&store, "p1", "help marketing my book").await;
    question.market = Some("indie_authors".into());

    let agent = Arc::new(MockAgent::new().with_default_analysis(analysis(true, 0.66)));
    let scorer = CapabilityScorer::new(
        Arc::clone(&store),
        agent,
        registry(),
        GLOBAL_MIN_CONFIDENCE,
    );

    let verdict = scorer.check(&question).await;
    assert!(verdict.is_in_scope);
}

#[tokio::test]
async fn agent_failure_degrades_to_zero_confidence_verdict() {
    let store = Arc::new(MemoryStore::new());
    let question = seed_question(&store, "p1", "some question").await;

    let agent = Arc::new(MockAgent::new().failing_analyze());
    let scorer = CapabilityScorer::new(
        Arc::clone(&store),
        agent,
        registry(),
        GLOBAL_MIN_CONFIDENCE,
    );

    let verdict = scorer.check(&question).await;
    assert!(!verdict.is_in_scope);
    assert_eq!(verdict.confidence, 0.0);
    assert!(verdict.error_message.is_some());

    // The degraded verdict was persisted too.
    let stored = store.get_verdict(question.id).await.unwrap().unwrap();
    assert!(!stored.is_in_scope);
}

#[tokio::test]
async fn batch_check_skips_unknown_ids() {
    let store = Arc::new(MemoryStore::new());
    let known = seed_question(&store, "p1", "a known question").await;
    let unknown = uuid::Uuid::new_v4();

    let agent = Arc::new(MockAgent::new());
    let scorer = CapabilityScorer::new(
        Arc::clone(&store),
        agent,
        registry(),
        GLOBAL_MIN_CONFIDENCE,
    );

    let results = scorer.check_batch(&[known.id, unknown]).await;
    assert_eq!(results.len(), 1);
    assert!(results.contains_key(&known.id));
}

// --- response pipeline state machine ---------------------------------------

#[tokio::test]
async fn question_without_verdict_never_reaches_processing() {
    let store = Arc::new(MemoryStore::new());
    let question = seed_question(&store, "p1", "a question").await;

    let agent = Arc::new(MockAgent::new());
    let adapter = MockAdapter::new(Platform::Reddit);
    let pipeline = pipeline(&store, &agent, &adapter, false);

    let outcome = pipeline.process(question.id).await;
    assert_eq!(outcome, ProcessOutcome::Skipped);

    // Fail fast means no state change at all.
    let after = store.get_question(question.id).await.unwrap().unwrap();
    assert_eq!(after.status, QuestionStatus::Pending);
    assert_eq!(agent.generate_calls(), 0);
}

#[tokio::test]
async fn out_of_scope_verdict_is_ignored_never_answered() {
    let store = Arc::new(MemoryStore::new());
    let question = seed_question(&store, "p1", "a question").await;
    seed_verdict(&store, &question, false, 0.9).await;

    let agent = Arc::new(MockAgent::new());
    let adapter = MockAdapter::new(Platform::Reddit);
    let pipeline = pipeline(&store, &agent, &adapter, true);

    let outcome = pipeline.process(question.id).await;
    assert_eq!(outcome, ProcessOutcome::Ignored);

    let after = store.get_question(question.id).await.unwrap().unwrap();
    assert_eq!(after.status, QuestionStatus::Ignored);
    assert!(adapter.posted().is_empty());
}

#[tokio::test]
async fn confidence_above_threshold_proceeds_to_generation() {
    let store = Arc::new(MemoryStore::new());
    let question = seed_question(&store, "p1", "how do i make videos").await;
    seed_verdict(&store, &question, true, 0.72).await;

    let agent = Arc::new(MockAgent::new());
    let adapter = MockAdapter::new(Platform::Reddit);
    let pipeline = pipeline(&store, &agent, &adapter, false);

    let outcome = pipeline.process(question.id).await;
    assert_eq!(outcome, ProcessOutcome::Answered);
    assert_eq!(agent.generate_calls(), 1);
}

#[tokio::test]
async fn stale_verdict_is_regated_against_current_config() {
    let store = Arc::new(MemoryStore::new());
    let question = seed_question(&store, "p1", "how do i make videos").await;
    // In-scope at creation time, but below today's 0.7 gate.
    seed_verdict(&store, &question, true, 0.5).await;

    let agent = Arc::new(MockAgent::new());
    let adapter = MockAdapter::new(Platform::Reddit);
    let pipeline = pipeline(&store, &agent, &adapter, false);

    let outcome = pipeline.process(question.id).await;
    assert_eq!(outcome, ProcessOutcome::Ignored);
    assert_eq!(agent.generate_calls(), 0);
}

#[tokio::test]
async fn empty_generation_marks_error_and_persists_nothing() {
    let store = Arc::new(MemoryStore::new());
    let question = seed_question(&store, "p1", "how do i make videos").await;
    seed_verdict(&store, &question, true, 0.9).await;

    let agent = Arc::new(
        MockAgent::new().with_generation(question.content.clone(), generation("")),
    );
    let adapter = MockAdapter::new(Platform::Reddit);
    let pipeline = pipeline(&store, &agent, &adapter, true);

    let outcome = pipeline.process(question.id).await;
    assert_eq!(outcome, ProcessOutcome::Failed);

    let after = store.get_question(question.id).await.unwrap().unwrap();
    assert_eq!(after.status, QuestionStatus::Error);

    let verdict = store.get_verdict(question.id).await.unwrap().unwrap();
    assert!(verdict.response_text.is_none());
    assert!(adapter.posted().is_empty());
}

#[tokio::test]
async fn auto_post_disabled_answers_without_posting() {
    let store = Arc::new(MemoryStore::new());
    let question = seed_question(&store, "p1", "how do i make videos").await;
    seed_verdict(&store, &question, true, 0.9).await;

    let agent = Arc::new(MockAgent::new());
    let adapter = MockAdapter::new(Platform::Reddit);
    let pipeline = pipeline(&store, &agent, &adapter, false);

    let outcome = pipeline.process(question.id).await;
    assert_eq!(outcome, ProcessOutcome::Answered);

    let after = store.get_question(question.id).await.unwrap().unwrap();
    assert_eq!(after.status, QuestionStatus::Answered);

    let verdict = store.get_verdict(question.id).await.unwrap().unwrap();
    assert!(!verdict.posted);
    assert!(verdict.posted_at.is_none());
    assert!(adapter.posted().is_empty());

    // The reply is ready, formatted, and discloses exactly once.
    let text = verdict.response_text.unwrap();
    assert_eq!(text.matches(DISCLOSURE).count(), 1);
    assert!(text.contains("You might find this helpful:"));
}

#[tokio::test]
async fn auto_post_success_stamps_verdict() {
    let store = Arc::new(MemoryStore::new());
    let question = seed_question(&store, "p1", "how do i make videos").await;
    seed_verdict(&store, &question, true, 0.9).await;

    let agent = Arc::new(MockAgent::new());
    let adapter = MockAdapter::new(Platform::Reddit);
    let pipeline = pipeline(&store, &agent, &adapter, true);

    let outcome = pipeline.process(question.id).await;
    assert_eq!(outcome, ProcessOutcome::Answered);

    let after = store.get_question(question.id).await.unwrap().unwrap();
    assert_eq!(after.status, QuestionStatus::Answered);

    let verdict = store.get_verdict(question.id).await.unwrap().unwrap();
    assert!(verdict.posted);
    assert!(verdict.posted_at.is_some());
    assert_eq!(adapter.posted().len(), 1);
}

#[tokio::test]
async fn failed_auto_post_is_terminal_error() {
    let store = Arc::new(MemoryStore::new());
    let question = seed_question(&store, "p1", "how do i make videos").await;
    seed_verdict(&store, &question, true, 0.9).await;

    let agent = Arc::new(MockAgent::new());
    let adapter = MockAdapter::new(Platform::Reddit).with_post_result(false);
    let pipeline = pipeline(&store, &agent, &adapter, true);

    let outcome = pipeline.process(question.id).await;
    assert_eq!(outcome, ProcessOutcome::Failed);

    let after = store.get_question(question.id).await.unwrap().unwrap();
    assert_eq!(after.status, QuestionStatus::Error);

    // The attempt is recorded: text kept, posted stays false.
    let verdict = store.get_verdict(question.id).await.unwrap().unwrap();
    assert!(!verdict.posted);
    assert!(verdict.response_text.is_some());
}

#[tokio::test]
async fn concurrent_processing_posts_exactly_once() {
    let store = Arc::new(MemoryStore::new());
    let question = seed_question(&store, "p1", "how do i make videos").await;
    seed_verdict(&store, &question, true, 0.9).await;

    let agent = Arc::new(MockAgent::new());
    let adapter = MockAdapter::new(Platform::Reddit);
    let pipeline = Arc::new(pipeline(&store, &agent, &adapter, true));

    let a = {
        let p = Arc::clone(&pipeline);
        tokio::spawn(async move { p.process(question.id).await })
    };
    let b = {
        let p = Arc::clone(&pipeline);
        tokio::spawn(async move { p.process(question.id).await })
    };

    let (a, b) = (a.await.unwrap(), b.await.unwrap());

    // Exactly one worker wins the claim and posts; the loser observes a
    // non-pending status and no-ops.
    let answered = [a, b]
        .iter()
        .filter(|o| **o == ProcessOutcome::Answered)
        .count();
    assert_eq!(answered, 1);
    assert_eq!(adapter.posted().len(), 1);

    let after = store.get_question(question.id).await.unwrap().unwrap();
    assert_eq!(after.status, QuestionStatus::Answered);
}

// --- pending sweep ----------------------------------------------------------

#[tokio::test]
async fn sweep_processes_scored_questions_and_survives_failures() {
    let store = Arc::new(MemoryStore::new());

    let good = seed_question(&store, "p1", "first good question").await;
    seed_verdict(&store, &good, true, 0.9).await;

    // Generation fails for this one; the sweep must keep going.
    let broken = seed_question(&store, "p2", "question with broken generation").await;
    seed_verdict(&store, &broken, true, 0.9).await;

    let also_good = seed_question(&store, "p3", "second good question").await;
    seed_verdict(&store, &also_good, true, 0.9).await;

    // No verdict at all: skipped by the sweep.
    seed_question(&store, "p4", "unscored question").await;

    // Out of scope: not picked up either.
    let out = seed_question(&store, "p5", "out of scope question").await;
    seed_verdict(&store, &out, false, 0.9).await;

    let agent = Arc::new(
        MockAgent::new().with_generation(broken.content.clone(), generation("")),
    );
    let adapter = MockAdapter::new(Platform::Reddit);
    let pipeline = pipeline(&store, &agent, &adapter, false);

    let processed = pipeline.process_pending(10, None).await;
    assert_eq!(processed, 2);

    assert_eq!(
        store
            .get_question(broken.id)
            .await
            .unwrap()
            .unwrap()
            .status,
        QuestionStatus::Error
    );
    assert_eq!(
        store.get_question(out.id).await.unwrap().unwrap().status,
        QuestionStatus::Pending
    );
}

#[tokio::test]
async fn sweep_respects_market_filter() {
    let store = Arc::new(MemoryStore::new());

    let general = seed_question(&store, "p1", "a general question").await;
    seed_verdict(&store, &general, true, 0.9).await;

    let mut indie_draft = sample_draft(Platform::Reddit, "p2", "an indie author question");
    indie_draft.market = Some("indie_authors".into());
    let indie = store
        .create_question(indie_draft.into_question(dedup::fingerprint("an indie author question")))
        .await
        .unwrap()
        .unwrap();
    seed_verdict(&store, &indie, true, 0.9).await;

    let agent = Arc::new(MockAgent::new());
    let adapter = MockAdapter::new(Platform::Reddit);
    let pipeline = pipeline(&store, &agent, &adapter, false);

    let processed = pipeline.process_pending(10, Some("indie_authors")).await;
    assert_eq!(processed, 1);

    // The general-market question was left untouched.
    assert_eq!(
        store
            .get_question(general.id)
            .await
            .unwrap()
            .unwrap()
            .status,
        QuestionStatus::Pending
    );
}
