//! Content fingerprinting and platform-id extraction.
//!
//! Pure functions, no state. Storage-level uniqueness is exact-fingerprint
//! plus platform-id based; [`similarity`] is only an auxiliary signal.

use sha2::{Digest, Sha256};

use crate::types::Platform;

/// Normalized SHA-256 fingerprint of question content.
///
/// Lowercases and collapses all internal whitespace first, so texts that
/// differ only in case or spacing fingerprint identically.
pub fn fingerprint(content: &str) -> String {
    let normalized = content
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Token-set Jaccard similarity between two texts, in [0, 1].
pub fn similarity(a: &str, b: &str) -> f64 {
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();

    let set_a: std::collections::HashSet<&str> = a_lower.split_whitespace().collect();
    let set_b: std::collections::HashSet<&str> = b_lower.split_whitespace().collect();

    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();

    intersection as f64 / union as f64
}

/// Strip query, fragment and trailing slash; lowercase the rest.
pub fn normalize_url(url: &str) -> String {
    let url = url.split('?').next().unwrap_or(url);
    let url = url.split('#').next().unwrap_or(url);
    url.trim_end_matches('/').to_lowercase()
}

/// Extract the platform-native post id from a URL.
///
/// Returns `None` on malformed input; never panics.
pub fn extract_platform_id(url: &str, platform: Platform) -> Option<String> {
    match platform {
        Platform::Reddit => {
            // Reddit URL format: .../comments/POST_ID/...
            let parts: Vec<&str> = url.split('/').collect();
            let idx = parts.iter().position(|p| *p == "comments")?;
            parts
                .get(idx + 1)
                .filter(|id| !id.is_empty())
                .map(|id| id.to_string())
        }
        Platform::Quora => {
            // Quora URL format: quora.com/QUESTION-SLUG[/answer/...]
            url.split('/')
                .rev()
                .find(|part| !part.is_empty() && *part != "answer" && !part.contains('.'))
                .filter(|part| !part.starts_with("http"))
                .map(|part| part.to_string())
        }
        Platform::Twitter | Platform::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fingerprint_ignores_case_and_whitespace() {
        assert_eq!(fingerprint("Book   Trailer"), fingerprint("book trailer"));
        assert_eq!(fingerprint("  book\ntrailer  "), fingerprint("book trailer"));
    }

    #[test]
    fn fingerprint_distinguishes_content() {
        assert_ne!(fingerprint("book trailer"), fingerprint("book teaser"));
    }

    #[test]
    fn similarity_identical_is_one() {
        assert_eq!(similarity("make a video", "make a video"), 1.0);
    }

    #[test]
    fn similarity_disjoint_is_zero() {
        assert_eq!(similarity("alpha beta", "gamma delta"), 0.0);
        assert_eq!(similarity("", "gamma delta"), 0.0);
    }

    #[test]
    fn similarity_partial_overlap() {
        // {how, to, edit} vs {how, to, film}: 2 shared of 4 total.
        let s = similarity("how to edit", "how to film");
        assert!((s - 0.5).abs() < 1e-9);
    }

    #[test]
    fn normalize_url_strips_params_and_slash() {
        assert_eq!(
            normalize_url("https://Reddit.com/r/writing/comments/abc/?utm=x#top"),
            "https://reddit.com/r/writing/comments/abc"
        );
    }

    #[test]
    fn extracts_reddit_post_id() {
        assert_eq!(
            extract_platform_id(
                "https://reddit.com/r/selfpublish/comments/1abc9z/how_do_i_market/",
                Platform::Reddit
            ),
            Some("1abc9z".to_string())
        );
    }

    #[test]
    fn extracts_quora_question_slug() {
        assert_eq!(
            extract_platform_id(
                "https://www.quora.com/How-do-I-make-a-book-trailer",
                Platform::Quora
            ),
            Some("How-do-I-make-a-book-trailer".to_string())
        );
        assert_eq!(
            extract_platform_id(
                "https://www.quora.com/How-do-I-make-a-book-trailer/answer/",
                Platform::Quora
            ),
            Some("How-do-I-make-a-book-trailer".to_string())
        );
    }

    #[test]
    fn malformed_urls_yield_none() {
        assert_eq!(extract_platform_id("", Platform::Reddit), None);
        assert_eq!(extract_platform_id("not a url", Platform::Reddit), None);
        assert_eq!(
            extract_platform_id("https://reddit.com/r/writing/comments/", Platform::Reddit),
            None
        );
    }

    proptest! {
        #[test]
        fn fingerprint_is_case_insensitive(s in "[a-zA-Z0-9 ]{0,64}") {
            prop_assert_eq!(fingerprint(&s), fingerprint(&s.to_uppercase()));
        }

        #[test]
        fn fingerprint_is_whitespace_insensitive(
            words in proptest::collection::vec("[a-z]{1,8}", 0..8),
            pads in proptest::collection::vec(1usize..4, 0..8),
        ) {
            let single = words.join(" ");
            let padded = words
                .iter()
                .zip(pads.iter().chain(std::iter::repeat(&1)))
                .map(|(w, pad)| format!("{}{}", w, " ".repeat(*pad)))
                .collect::<String>();
            prop_assert_eq!(fingerprint(&single), fingerprint(&padded));
        }

        #[test]
        fn similarity_is_symmetric(a in "[a-z ]{0,32}", b in "[a-z ]{0,32}") {
            prop_assert_eq!(similarity(&a, &b).to_bits(), similarity(&b, &a).to_bits());
        }

        #[test]
        fn extract_never_panics(url in ".{0,128}") {
            let _ = extract_platform_id(&url, Platform::Reddit);
            let _ = extract_platform_id(&url, Platform::Quora);
        }
    }
}
