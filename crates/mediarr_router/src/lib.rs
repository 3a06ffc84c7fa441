//! Keyword-driven intent router.
//!
//! Converts free text into a structured, confidence-scored [`Intent`].
//! Parsing is a pure function over immutable trigger tables: identical
//! input always yields an identical intent, the router holds no mutable
//! state, and it never fails — unmatched input degrades to
//! `ServiceKind::Unknown` with low confidence so the caller can ask for
//! clarification instead of guessing.

mod context;
mod tables;

pub use tables::{OPERATION_KEYWORDS, SERVICE_KEYWORDS};

use context::{extract_context, Tokens};
use mediarr_protocol::{Intent, OperationKind, ServiceKind};
use tracing::debug;

// ============================================================================
// Router configuration
// ============================================================================

/// Scoring thresholds and weights.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Below this, the service is forced to Unknown.
    pub min_confidence: f32,
    /// Service match weight in the combined confidence (gates dispatch).
    pub service_weight: f32,
    /// Operation match weight in the combined confidence.
    pub operation_weight: f32,
    /// Score at which a service match counts as fully certain.
    pub service_norm: f32,
    /// Score at which an operation match counts as fully certain.
    pub operation_norm: f32,
    /// Weight of an exact, full-word service-name token. Dominates any
    /// realistic sum of generic terms.
    pub service_name_weight: f32,
    /// Operation strength reported when a service matched but no verb did.
    pub default_operation_strength: f32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.4,
            service_weight: 0.6,
            operation_weight: 0.4,
            service_norm: 1.5,
            operation_norm: 1.5,
            service_name_weight: 5.0,
            default_operation_strength: 0.5,
        }
    }
}

// ============================================================================
// Scoring
// ============================================================================

/// Best entry of one trigger table.
struct TableMatch<K> {
    kind: K,
    score: f32,
    phrases: Vec<String>,
}

/// Everything a table scan produced: the winner plus the token indexes
/// matched by any entry, with multi-word matches tracked separately
/// (multi-word phrases claim their span exclusively).
struct TableScore<K> {
    best: Option<TableMatch<K>>,
    matched_indexes: Vec<usize>,
    multiword_indexes: Vec<usize>,
}

/// Phrase weight: longer phrases always outweigh shorter ones.
fn phrase_weight(phrase: &str) -> f32 {
    let words = phrase.split_whitespace().count().max(1);
    1.0 + 0.5 * (words as f32 - 1.0)
}

/// Score every entry of a trigger table against the unconsumed tokens.
/// Entries may overlap each other; ties keep the earlier table entry.
fn score_table<K: Copy>(
    table: &[(K, &[&str])],
    tokens: &Tokens,
    weight: impl Fn(K, &str, &Tokens) -> f32,
) -> TableScore<K> {
    let mut best: Option<TableMatch<K>> = None;
    let mut matched_indexes = Vec::new();
    let mut multiword_indexes = Vec::new();

    for (kind, phrases) in table {
        let mut score = 0.0;
        let mut matched = Vec::new();

        for phrase in *phrases {
            if let Some(indexes) = tokens.match_phrase(phrase) {
                score += weight(*kind, phrase, tokens);
                matched.push((*phrase).to_string());
                if indexes.len() > 1 {
                    multiword_indexes.extend(indexes.iter().copied());
                }
                matched_indexes.extend(indexes);
            }
        }

        if score <= 0.0 {
            continue;
        }

        let better = best.as_ref().map(|b| score > b.score).unwrap_or(true);
        if better {
            best = Some(TableMatch {
                kind: *kind,
                score,
                phrases: matched,
            });
        }
    }

    TableScore {
        best,
        matched_indexes,
        multiword_indexes,
    }
}

// ============================================================================
// Intent Router
// ============================================================================

/// The router. Stateless apart from its configuration; safe to share
/// across any number of concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct IntentRouter {
    config: RouterConfig,
}

impl IntentRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RouterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Parse free text into an intent. Never fails.
    pub fn parse_intent(&self, text: &str) -> Intent {
        let mut tokens = Tokens::new(text);

        // Verbs first. A multi-word verb phrase ("show all") claims its
        // span exclusively, so "show" cannot also vote for a service; a
        // single-word verb ("request") may still double as service
        // evidence, as callers phrase it that way.
        let operations = score_table(OPERATION_KEYWORDS, &tokens, |_, phrase, _| {
            phrase_weight(phrase)
        });
        tokens.consume(&operations.multiword_indexes);

        let services = score_table(SERVICE_KEYWORDS, &tokens, |kind, phrase, tokens| {
            let kind: ServiceKind = kind;
            if phrase == kind.as_str() && tokens.has_exact_token(phrase) {
                self.config.service_name_weight
            } else {
                phrase_weight(phrase)
            }
        });

        // Every trigger token is vocabulary, not title material.
        tokens.consume(&services.matched_indexes);
        tokens.consume(&operations.matched_indexes);

        let (mut service, service_strength) = match &services.best {
            Some(m) => (m.kind, (m.score / self.config.service_norm).min(1.0)),
            None => (ServiceKind::Unknown, 0.0),
        };

        let (operation, operation_strength) = match &operations.best {
            Some(m) => (m.kind, (m.score / self.config.operation_norm).min(1.0)),
            None if service.is_known() => (
                service.default_operation(),
                self.config.default_operation_strength,
            ),
            None => (OperationKind::Unknown, 0.0),
        };

        let context = extract_context(&mut tokens, text);

        let confidence = (self.config.service_weight * service_strength
            + self.config.operation_weight * operation_strength)
            .clamp(0.0, 1.0);

        if confidence < self.config.min_confidence && service.is_known() {
            debug!(
                confidence,
                threshold = self.config.min_confidence,
                "confidence below threshold, demoting {} to unknown",
                service
            );
            service = ServiceKind::Unknown;
        }

        let mut matched_keywords = Vec::new();
        if let Some(m) = services.best {
            matched_keywords.extend(m.phrases);
        }
        if let Some(m) = operations.best {
            matched_keywords.extend(m.phrases);
        }

        Intent {
            service,
            operation,
            confidence,
            context,
            matched_keywords,
            raw_text: text.to_string(),
        }
    }

    /// Human-readable account of how a query would be routed.
    pub fn explain(&self, text: &str) -> String {
        let intent = self.parse_intent(text);

        let mut out = format!(
            "Service: {} ({:.0}% confident)\nOperation: {}\n",
            intent.service.display_name(),
            intent.confidence * 100.0,
            intent.operation,
        );

        if intent.matched_keywords.is_empty() {
            out.push_str("Matched keywords: none\n");
        } else {
            out.push_str(&format!(
                "Matched keywords: {}\n",
                intent.matched_keywords.join(", ")
            ));
        }

        if !intent.context.is_empty() {
            out.push_str("Context:\n");
            if let Some(title) = &intent.context.title {
                out.push_str(&format!("  - title: {}\n", title));
            }
            if let Some(year) = intent.context.year {
                out.push_str(&format!("  - year: {}\n", year));
            }
            if let Some(quality) = &intent.context.quality {
                out.push_str(&format!("  - quality: {}\n", quality));
            }
            if let Some(season) = intent.context.season {
                out.push_str(&format!("  - season: {}\n", season));
            }
            if let Some(episode) = intent.context.episode {
                out.push_str(&format!("  - episode: {}\n", episode));
            }
            if let Some(language) = &intent.context.language {
                out.push_str(&format!("  - language: {}\n", language));
            }
        }

        out
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_weight_grows_with_length() {
        assert_eq!(phrase_weight("subtitle"), 1.0);
        assert_eq!(phrase_weight("on deck"), 1.5);
        assert_eq!(phrase_weight("mark as watched"), 2.0);
    }

    #[test]
    fn test_service_name_dominates_generic_terms() {
        let router = IntentRouter::new();
        // "movie" pulls toward Radarr, but the explicit name wins.
        let intent = router.parse_intent("ask bazarr about that movie");
        assert_eq!(intent.service, ServiceKind::Bazarr);
    }

    #[test]
    fn test_tie_breaks_by_table_order() {
        let router = IntentRouter::new();
        // "collection" is a trigger for Sonarr, Radarr and Plex alike.
        let intent = router.parse_intent("add Breaking Bad to my collection");
        assert_eq!(intent.service, ServiceKind::Sonarr);
    }

    #[test]
    fn test_default_operation_when_no_verb() {
        let router = IntentRouter::new();
        let intent = router.parse_intent("sonarr");
        assert_eq!(intent.service, ServiceKind::Sonarr);
        assert_eq!(intent.operation, OperationKind::Search);

        let intent = router.parse_intent("overseerr");
        assert_eq!(intent.operation, OperationKind::Request);
    }

    #[test]
    fn test_unmatched_text_is_unknown() {
        let router = IntentRouter::new();
        let intent = router.parse_intent("make me a sandwich");
        assert_eq!(intent.service, ServiceKind::Unknown);
        assert_eq!(intent.operation, OperationKind::Unknown);
        assert!(intent.confidence <= router.config().min_confidence);
    }

    #[test]
    fn test_multiword_verb_claims_its_span() {
        let router = IntentRouter::new();
        // "show all" (List) claims "show", so Sonarr's "show" trigger
        // cannot outvote Prowlarr's "indexer".
        let intent = router.parse_intent("show all indexers");
        assert_eq!(intent.operation, OperationKind::List);
        assert_eq!(intent.service, ServiceKind::Prowlarr);
    }

    #[test]
    fn test_single_verb_still_counts_for_service() {
        let router = IntentRouter::new();
        // "request" is both the Overseerr trigger and the Request verb.
        let intent = router.parse_intent("request Inception");
        assert_eq!(intent.service, ServiceKind::Overseerr);
        assert_eq!(intent.operation, OperationKind::Request);
        assert_eq!(intent.context.title.as_deref(), Some("Inception"));
    }

    #[test]
    fn test_mark_watched_beats_monitor() {
        let router = IntentRouter::new();
        let intent = router.parse_intent("mark as watched: Dune");
        assert_eq!(intent.operation, OperationKind::MarkWatched);
    }

    #[test]
    fn test_matched_keywords_retained() {
        let router = IntentRouter::new();
        let intent = router.parse_intent("download English subtitles for Dune");
        assert!(intent
            .matched_keywords
            .iter()
            .any(|k| k == "subtitle" || k == "subs"));
        assert!(intent.matched_keywords.iter().any(|k| k == "download"));
    }

    #[test]
    fn test_explain_mentions_service_and_keywords() {
        let router = IntentRouter::new();
        let text = router.explain("list all indexers");
        assert!(text.contains("Prowlarr"));
        assert!(text.contains("indexer"));
        assert!(text.contains("list"));
    }
}
