//! Integration tests for the keyword fallback cascade and its invariants.

mod common;

use common::engine_with_store;
use safe_echo_core::CallerContext;
use safe_echo_rules::{FULL_KEYWORDS, REDUCED_KEYWORDS};

#[test]
fn keyword_fallback_tests_every_full_set_keyword_flags_unknown_senders() {
    let (engine, _store) = engine_with_store(None);

    for keyword in FULL_KEYWORDS {
        let text = format!("regarding {keyword} today");
        let outcome = engine.classify(&text, CallerContext::unknown_sender());
        assert!(outcome.verdict.is_scam, "keyword '{keyword}' should flag");
        assert!(
            !outcome.verdict.reason.trim().is_empty(),
            "scam verdict for '{keyword}' must carry a reason"
        );
        assert!(outcome.verdict.confidence <= 100);
    }
}

#[test]
fn keyword_fallback_tests_saved_contacts_only_flag_reduced_set() {
    let (engine, _store) = engine_with_store(None);
    let saved = CallerContext::saved_contact();

    for keyword in REDUCED_KEYWORDS {
        let text = format!("what is your {keyword}");
        assert!(
            engine.classify(&text, saved).verdict.is_scam,
            "reduced keyword '{keyword}' should flag saved contacts"
        );
    }

    // Full-set-only vocabulary must stay quiet for a saved contact.
    for text in [
        "you won the lottery",
        "urgent wire transfer needed",
        "claim your prize winner",
    ] {
        assert!(
            !engine.classify(text, saved).verdict.is_scam,
            "'{text}' should not flag a saved contact"
        );
    }
}

#[test]
fn keyword_fallback_tests_unmatched_text_is_safe_with_fixed_confidence() {
    let (engine, _store) = engine_with_store(None);
    let outcome = engine.classify(
        "see you at the park tomorrow",
        CallerContext::unknown_sender(),
    );

    assert!(!outcome.verdict.is_scam);
    assert_eq!(outcome.verdict.confidence, 95);
    assert!(!outcome.verdict.reason.trim().is_empty());
}

#[test]
fn keyword_fallback_tests_categorized_keyword_gets_category_message() {
    let (engine, _store) = engine_with_store(None);
    let outcome = engine.classify(
        "pay the visa fee by western union",
        CallerContext::unknown_sender(),
    );

    assert!(outcome.verdict.is_scam);
    assert!(
        outcome.verdict.reason.contains("gift cards or wire transfers"),
        "expected the money-transfer category message, got: {}",
        outcome.verdict.reason
    );
}
