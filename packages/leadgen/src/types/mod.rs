//! Domain types: questions, verdicts, crawl records.

pub mod crawl;
pub mod question;
pub mod verdict;

pub use crawl::{CrawlLog, CrawlReport, CrawlStatus, MarketCrawlReport};
pub use question::{CommentDraft, Platform, Question, QuestionDraft, QuestionStatus};
pub use verdict::{Verdict, VerdictStats};
