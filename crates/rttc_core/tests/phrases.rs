//! Phrase book tests.

mod common;

use std::sync::Arc;

use common::{generic_phrase, FakeDetector, FixedSession, MemoryPhrases};
use pretty_assertions::assert_eq;
use rttc_core::{PhraseStore, StoreError};

#[tokio::test]
async fn added_phrase_is_tagged_with_detected_language_and_listed() {
    let detector = Arc::new(FakeDetector::new("pt"));
    let repository = Arc::new(MemoryPhrases::with_generic(vec![
        generic_phrase("Obrigado", "pt"),
        generic_phrase("Thank you", "en"),
    ]));
    let store = PhraseStore::new(
        Arc::new(FixedSession(Some(common::user("ana@example.com")))),
        repository.clone(),
        detector.clone(),
    );
    store.list("en").await.unwrap();

    let detected = store.add("Bom dia", None).await.unwrap();
    assert_eq!(detected, Some("pt".to_string()));

    // The view switched to the detected language.
    assert_eq!(store.language(), Some("pt".to_string()));
    let listed = store.list("pt").await.unwrap();
    assert_eq!(listed.user_phrases.len(), 1);
    assert_eq!(listed.user_phrases[0].text, "Bom dia");
    assert_eq!(listed.user_phrases[0].language, "pt");
    assert_eq!(listed.user_phrases[0].category, "Personal");
    let generic: Vec<&str> = listed.generic_phrases.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(generic, vec!["Obrigado"]);
}

#[tokio::test]
async fn blank_text_is_rejected_before_detection() {
    let detector = Arc::new(FakeDetector::new("pt"));
    let store = PhraseStore::new(
        Arc::new(FixedSession(Some(common::user("ana@example.com")))),
        Arc::new(MemoryPhrases::default()),
        detector.clone(),
    );

    let outcome = store.add("   ", Some("Travel")).await;

    assert_eq!(
        outcome,
        Err(StoreError::Validation("Text is required".to_string()))
    );
    assert_eq!(detector.calls(), 0);
}

#[tokio::test]
async fn guests_see_generic_phrases_and_store_nothing() {
    let repository = Arc::new(MemoryPhrases::with_generic(vec![generic_phrase("Olá", "pt")]));
    let detector = Arc::new(FakeDetector::new("pt"));
    let store = PhraseStore::new(
        Arc::new(FixedSession(None)),
        repository.clone(),
        detector.clone(),
    );

    assert_eq!(store.add("Bom dia", None).await, Ok(None));
    assert!(repository.user.lock().unwrap().is_empty());
    assert_eq!(detector.calls(), 0);

    let listed = store.list("pt").await.unwrap();
    assert!(listed.user_phrases.is_empty());
    assert_eq!(listed.generic_phrases.len(), 1);
}

#[tokio::test]
async fn detection_failure_is_reported() {
    let repository = Arc::new(MemoryPhrases::default());
    let store = PhraseStore::new(
        Arc::new(FixedSession(Some(common::user("ana@example.com")))),
        repository.clone(),
        Arc::new(FakeDetector::failing()),
    );

    let outcome = store.add("Bom dia", Some("Greetings")).await;

    assert!(matches!(outcome, Err(StoreError::Detection(_))));
    assert!(repository.user.lock().unwrap().is_empty());
    assert!(store.last_error().is_some());
}

#[tokio::test]
async fn user_phrases_can_be_removed_but_generic_ones_cannot() {
    let generic = generic_phrase("Obrigado", "pt");
    let repository = Arc::new(MemoryPhrases::with_generic(vec![generic.clone()]));
    let store = PhraseStore::new(
        Arc::new(FixedSession(Some(common::user("ana@example.com")))),
        repository.clone(),
        Arc::new(FakeDetector::new("pt")),
    );
    store.add("Bom dia", Some("Greetings")).await.unwrap();
    let own = store.phrases().user_phrases[0].clone();
    assert_eq!(own.category, "Greetings");

    assert!(matches!(
        store.remove(generic.id).await,
        Err(StoreError::Validation(_))
    ));
    store.remove(own.id).await.unwrap();

    assert!(store.phrases().user_phrases.is_empty());
    assert_eq!(store.phrases().generic_phrases, vec![generic]);
}

#[tokio::test]
async fn generic_phrase_of_another_language_cannot_be_removed() {
    let portuguese = generic_phrase("Obrigado", "pt");
    let repository = Arc::new(MemoryPhrases::with_generic(vec![
        portuguese.clone(),
        generic_phrase("Thank you", "en"),
    ]));
    let store = PhraseStore::new(
        Arc::new(FixedSession(Some(common::user("ana@example.com")))),
        repository.clone(),
        Arc::new(FakeDetector::new("pt")),
    );
    store.list("en").await.unwrap();

    assert!(matches!(
        store.remove(portuguese.id).await,
        Err(StoreError::Validation(_))
    ));
    assert_eq!(repository.generic.len(), 2);
}

#[tokio::test]
async fn generic_phrase_is_protected_before_any_listing() {
    let generic = generic_phrase("Obrigado", "pt");
    let store = PhraseStore::new(
        Arc::new(FixedSession(None)),
        Arc::new(MemoryPhrases::with_generic(vec![generic.clone()])),
        Arc::new(FakeDetector::new("pt")),
    );

    assert!(matches!(
        store.remove(generic.id).await,
        Err(StoreError::Validation(_))
    ));
}
