//! End-to-end routing behavior over the default tables and configuration.

use mediarr_protocol::{OperationKind, ServiceKind};
use mediarr_router::IntentRouter;

#[test]
fn exact_service_name_always_selects_that_service() {
    let router = IntentRouter::new();
    for service in ServiceKind::PRIORITY {
        let text = format!("check {} please", service.as_str());
        let intent = router.parse_intent(&text);
        assert_eq!(intent.service, service, "input: {text}");
        assert!(
            intent.confidence > router.config().min_confidence,
            "confidence {} not above threshold for {text}",
            intent.confidence
        );
    }
}

#[test]
fn parsing_is_deterministic() {
    let router = IntentRouter::new();
    for text in [
        "Add Breaking Bad to my collection",
        "Search for Dune in 4K",
        "Download English subtitles for Dune",
        "what is playing right now",
        "complete gibberish input 42",
    ] {
        let first = router.parse_intent(text);
        let second = router.parse_intent(text);
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap(),
            "non-deterministic parse for: {text}"
        );
    }
}

#[test]
fn unrecognized_text_yields_unknown_below_threshold() {
    let router = IntentRouter::new();
    for text in [
        "make me a sandwich",
        "what time is it",
        "hello there",
        "",
    ] {
        let intent = router.parse_intent(text);
        assert_eq!(intent.service, ServiceKind::Unknown, "input: {text}");
        assert!(
            intent.confidence <= router.config().min_confidence,
            "confidence {} above threshold for {text}",
            intent.confidence
        );
    }
}

#[test]
fn search_for_dune_in_4k() {
    let router = IntentRouter::new();
    let intent = router.parse_intent("Search for Dune in 4K");
    assert_eq!(intent.operation, OperationKind::Search);
    assert_eq!(intent.context.quality.as_deref(), Some("4K"));
    assert!(intent
        .context
        .title
        .as_deref()
        .unwrap_or_default()
        .contains("Dune"));
}

#[test]
fn add_breaking_bad_to_my_collection() {
    let router = IntentRouter::new();
    let intent = router.parse_intent("Add Breaking Bad to my collection");
    assert_eq!(intent.service, ServiceKind::Sonarr);
    assert_eq!(intent.operation, OperationKind::Add);
    assert_eq!(intent.context.title.as_deref(), Some("Breaking Bad"));
    assert!(
        intent.confidence >= 0.6,
        "confidence was {}",
        intent.confidence
    );
}

#[test]
fn download_english_subtitles_for_dune() {
    let router = IntentRouter::new();
    let intent = router.parse_intent("Download English subtitles for Dune");
    assert_eq!(intent.service, ServiceKind::Bazarr);
    assert_eq!(intent.operation, OperationKind::Download);
    assert_eq!(intent.context.title.as_deref(), Some("Dune"));
    assert_eq!(intent.context.language.as_deref(), Some("English"));
}

#[test]
fn year_season_episode_extraction() {
    let router = IntentRouter::new();

    let intent = router.parse_intent("Add The Matrix from 1999");
    assert_eq!(intent.context.year, Some(1999));
    assert_eq!(intent.context.title.as_deref(), Some("The Matrix"));

    let intent = router.parse_intent("Get Breaking Bad season 5 episode 14");
    assert_eq!(intent.context.season, Some(5));
    assert_eq!(intent.context.episode, Some(14));
    assert_eq!(intent.context.title.as_deref(), Some("Breaking Bad"));
}

#[test]
fn confidence_is_always_in_unit_interval() {
    let router = IntentRouter::new();
    for text in [
        "",
        "sonarr radarr prowlarr bazarr overseerr plex",
        "search find lookup add delete list sync play scan refresh",
        "add the tv show series episode season anime collection to sonarr now",
        "random words entirely unrelated to media",
    ] {
        let intent = router.parse_intent(text);
        assert!(
            (0.0..=1.0).contains(&intent.confidence),
            "confidence {} out of range for {text}",
            intent.confidence
        );
    }
}

#[test]
fn low_confidence_intents_carry_their_evidence() {
    let router = IntentRouter::new();
    // Verb only, no service: demoted to Unknown but the match survives
    // so the caller can explain the near-miss.
    let intent = router.parse_intent("search for something");
    assert_eq!(intent.service, ServiceKind::Unknown);
    assert_eq!(intent.operation, OperationKind::Search);
    assert!(intent.matched_keywords.iter().any(|k| k == "search"));
    assert_eq!(intent.raw_text, "search for something");
}
