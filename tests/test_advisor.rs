//! Integration tests for the advisory engine against a scripted model.
//!
//! Run with:
//!   cargo test --test test_advisor

use indigo::advisor::GardenAdvisor;
use indigo::config::ProviderKeys;
use indigo::llm::providers::dummy::DummyClient;
use indigo::llm::{LlmClient, ProviderError, providers};
use indigo::memory::{Anchor, GardenMemory, LogEntry};

// ── helpers ──────────────────────────────────────────────────────────────────

fn backyard() -> GardenMemory {
    GardenMemory::new(
        "Backyard",
        Anchor {
            principles: vec!["Feed the soil, not the plant".into()],
            location: "Portland, OR".into(),
            zone: "8b".into(),
            style: "no-dig".into(),
        },
    )
}

fn echo() -> LlmClient {
    LlmClient::Dummy(DummyClient::new())
}

// ── journaling + advice flow ─────────────────────────────────────────────────

#[tokio::test]
async fn journal_then_advise_round_trip() {
    let mut mem = backyard();
    let tagger = LlmClient::Dummy(DummyClient::with_reply("tomato,planting"));
    {
        let mut advisor = GardenAdvisor::new(&mut mem, &tagger);
        advisor.append_log_entry("Planted tomatoes").await.unwrap();
    }

    assert_eq!(mem.log.len(), 1);
    assert_eq!(mem.log[0].entry, "Planted tomatoes");
    assert_eq!(mem.log[0].tags, vec!["tomato", "planting"]);

    let llm = echo();
    let advisor = GardenAdvisor::new(&mut mem, &llm);
    let advice = advisor.ask_advice("When do I stake them?").await.unwrap();
    // Echo provider exposes the assembled context.
    assert!(advice.contains("Planted tomatoes"));
    assert!(advice.contains("When do I stake them?"));
    assert!(advice.contains("Feed the soil, not the plant"));
}

#[tokio::test]
async fn advice_window_is_exactly_the_last_five_of_seven() {
    let mut mem = backyard();
    for i in 1..=7 {
        mem.log.push(LogEntry {
            date: format!("2026-07-{i:02}"),
            entry: format!("week {i} observations"),
            tags: vec![],
        });
    }

    let llm = echo();
    let advisor = GardenAdvisor::new(&mut mem, &llm);
    let prompt = advisor.ask_advice("Any pests?").await.unwrap();

    assert!(!prompt.contains("week 1 observations"));
    assert!(!prompt.contains("week 2 observations"));
    for i in 3..=7 {
        assert!(prompt.contains(&format!("week {i} observations")));
    }
}

#[tokio::test]
async fn failed_tagging_leaves_no_half_formed_entry() {
    let mut mem = backyard();
    let llm = LlmClient::Dummy(DummyClient::failing());
    let mut advisor = GardenAdvisor::new(&mut mem, &llm);

    let err = advisor.append_log_entry("Planted tomatoes").await.unwrap_err();
    assert!(matches!(err, ProviderError::Request(_)));
    // Tag generation failed, so nothing was appended.
    assert!(mem.log.is_empty());
}

#[tokio::test]
async fn failed_advice_leaves_memory_untouched() {
    let mut mem = backyard();
    mem.log.push(LogEntry {
        date: "2026-08-01".into(),
        entry: "existing entry".into(),
        tags: vec![],
    });
    let before = mem.clone();

    let llm = LlmClient::Dummy(DummyClient::failing());
    let advisor = GardenAdvisor::new(&mut mem, &llm);
    assert!(advisor.ask_advice("anything").await.is_err());
    assert_eq!(mem, before);
}

// ── seasonal review ──────────────────────────────────────────────────────────

#[tokio::test]
async fn review_of_empty_log_appends_nothing() {
    let mut mem = backyard();
    let llm = echo();
    let mut advisor = GardenAdvisor::new(&mut mem, &llm);
    advisor.seasonal_review("Autumn 2026").await.unwrap();
    assert_eq!(mem.review.len(), 0);
}

#[tokio::test]
async fn review_summarizes_whole_log_and_keeps_it() {
    let mut mem = backyard();
    for i in 1..=3 {
        mem.log.push(LogEntry {
            date: format!("2026-08-{i:02}"),
            entry: format!("entry {i}"),
            tags: vec![],
        });
    }

    let llm = LlmClient::Dummy(DummyClient::with_reply(
        "Steady growth all month.\nLesson: water deeply.\nLesson: thin earlier.\nLesson: shade the greens.",
    ));
    let mut advisor = GardenAdvisor::new(&mut mem, &llm);
    advisor.seasonal_review("August 2026").await.unwrap();

    assert_eq!(mem.review.len(), 1);
    assert_eq!(mem.review[0].summary, "Steady growth all month.");
    assert_eq!(mem.review[0].lessons_learned.len(), 1);
    assert!(mem.review[0].lessons_learned[0].starts_with("Steady growth all month."));
    // No pruning after review.
    assert_eq!(mem.log.len(), 3);
}

// ── factory ──────────────────────────────────────────────────────────────────

#[test]
fn factory_rejects_unknown_provider_before_any_network_attempt() {
    let keys = ProviderKeys {
        openai: Some("sk-test".into()),
        ..Default::default()
    };
    let err = providers::build("unknown-provider", &keys, 5).unwrap_err();
    assert_eq!(err.to_string(), "unknown provider: unknown-provider");
}

#[test]
fn factory_requires_a_key_for_remote_backends() {
    let err = providers::build("gemini", &ProviderKeys::default(), 5).unwrap_err();
    assert!(matches!(err, ProviderError::MissingKey("GEMINI_API_KEY")));
}
