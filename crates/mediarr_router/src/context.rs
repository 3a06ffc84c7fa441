//! Context extraction: pull semantic fields out of the request text.
//!
//! Works over a tokenized view of the original text. Trigger tokens are
//! consumed by the scorer before extraction runs; whatever survives both
//! the scorer and the pattern rules below becomes the title guess.

use crate::tables::{QUALITY_TOKENS, STOP_WORDS};
use mediarr_protocol::IntentContext;
use regex::Regex;
use std::sync::OnceLock;

fn quoted_title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"["']([^"']+)["']"#).expect("valid regex"))
}

fn season_episode_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^s(\d{1,2})e(\d{1,3})$").expect("valid regex"))
}

fn resolution_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{3,4}p$").expect("valid regex"))
}

// ============================================================================
// Tokenized query
// ============================================================================

/// The request text split into parallel original/normalized token lists,
/// with a consumption mask used to carve out the title span.
pub(crate) struct Tokens {
    pub original: Vec<String>,
    pub normalized: Vec<String>,
    pub consumed: Vec<bool>,
}

impl Tokens {
    pub fn new(text: &str) -> Self {
        let mut original = Vec::new();
        let mut normalized = Vec::new();
        for word in text.split_whitespace() {
            let trimmed: String = word
                .chars()
                .filter(|c| c.is_alphanumeric() || *c == '-')
                .collect();
            if trimmed.is_empty() {
                continue;
            }
            normalized.push(trimmed.to_lowercase());
            original.push(trimmed);
        }
        let consumed = vec![false; original.len()];
        Self {
            original,
            normalized,
            consumed,
        }
    }

    /// First window of unconsumed tokens where every phrase word is a
    /// prefix of its token.
    ///
    /// Single-word triggers therefore also fire on plural and inflected
    /// forms ("subtitle" matches "subtitles").
    pub fn match_phrase(&self, phrase: &str) -> Option<Vec<usize>> {
        let words: Vec<&str> = phrase.split_whitespace().collect();
        if words.is_empty() || words.len() > self.normalized.len() {
            return None;
        }
        'outer: for start in 0..=(self.normalized.len() - words.len()) {
            for (offset, word) in words.iter().enumerate() {
                let index = start + offset;
                if self.consumed[index] || !self.normalized[index].starts_with(word) {
                    continue 'outer;
                }
            }
            return Some((start..start + words.len()).collect());
        }
        None
    }

    /// Exact full-word occurrence, used for the service-name bonus.
    pub fn has_exact_token(&self, word: &str) -> bool {
        self.normalized.iter().any(|t| t == word)
    }

    pub fn consume(&mut self, indexes: &[usize]) {
        for &i in indexes {
            self.consumed[i] = true;
        }
    }
}

// ============================================================================
// Extraction
// ============================================================================

/// Extract year, quality, season/episode, language, flags and a title guess.
pub(crate) fn extract_context(tokens: &mut Tokens, raw_text: &str) -> IntentContext {
    let mut context = IntentContext::default();
    let raw_lower = raw_text.to_lowercase();

    // Explicit negations, checked against the raw text so apostrophes survive.
    context.monitored = !raw_lower.contains("unmonitor");
    context.search_on_add =
        !(raw_lower.contains("don't search") || raw_lower.contains("dont search"));

    extract_year(tokens, &mut context);
    extract_quality(tokens, &mut context);
    extract_season_episode(tokens, &mut context);
    extract_language(tokens, &mut context);

    // A quoted span beats any guess.
    if let Some(caps) = quoted_title_re().captures(raw_text) {
        context.title = Some(caps[1].trim().to_string());
    } else {
        context.title = guess_title(tokens);
    }

    context
}

fn extract_year(tokens: &mut Tokens, context: &mut IntentContext) {
    for i in 0..tokens.normalized.len() {
        let token = &tokens.normalized[i];
        if token.len() == 4
            && (token.starts_with("19") || token.starts_with("20"))
            && token.chars().all(|c| c.is_ascii_digit())
        {
            if context.year.is_none() {
                context.year = token.parse().ok();
            }
            tokens.consumed[i] = true;
        }
    }
}

fn extract_quality(tokens: &mut Tokens, context: &mut IntentContext) {
    for i in 0..tokens.normalized.len() {
        let token = &tokens.normalized[i];
        if QUALITY_TOKENS.contains(&token.as_str()) || resolution_re().is_match(token) {
            if context.quality.is_none() {
                context.quality = Some(tokens.original[i].clone());
            }
            tokens.consumed[i] = true;
        }
    }
}

fn extract_season_episode(tokens: &mut Tokens, context: &mut IntentContext) {
    let len = tokens.normalized.len();
    for i in 0..len {
        let token = tokens.normalized[i].clone();

        // Compact "s05e14" form.
        if let Some(caps) = season_episode_re().captures(&token) {
            context.season = context.season.or_else(|| caps[1].parse().ok());
            context.episode = context.episode.or_else(|| caps[2].parse().ok());
            tokens.consumed[i] = true;
            continue;
        }

        // "season N" / "episode N" marker followed by a number.
        let next_number = |tokens: &Tokens| -> Option<u32> {
            tokens
                .normalized
                .get(i + 1)
                .and_then(|next| next.parse().ok())
        };
        if token == "season" {
            if let Some(n) = next_number(tokens) {
                context.season = context.season.or(Some(n));
                tokens.consumed[i + 1] = true;
            }
            tokens.consumed[i] = true;
        } else if token == "episode" {
            if let Some(n) = next_number(tokens) {
                context.episode = context.episode.or(Some(n));
                tokens.consumed[i + 1] = true;
            }
            tokens.consumed[i] = true;
        }
    }
}

/// A word directly before a subtitle/language marker that nothing else
/// claimed is read as the requested language ("English subtitles").
fn extract_language(tokens: &mut Tokens, context: &mut IntentContext) {
    const MARKERS: [&str; 4] = ["subtitle", "subs", "caption", "language"];
    for i in 0..tokens.normalized.len() {
        let is_marker = MARKERS
            .iter()
            .any(|m| tokens.normalized[i].starts_with(m));
        if !is_marker {
            continue;
        }
        tokens.consumed[i] = true;
        if i == 0 || tokens.consumed[i - 1] || context.language.is_some() {
            continue;
        }
        let candidate = &tokens.normalized[i - 1];
        if candidate.chars().all(|c| c.is_alphabetic())
            && !STOP_WORDS.contains(&candidate.as_str())
        {
            context.language = Some(tokens.original[i - 1].clone());
            tokens.consumed[i - 1] = true;
        }
    }
}

/// Longest contiguous run of unconsumed, non-filler tokens, original casing.
fn guess_title(tokens: &mut Tokens) -> Option<String> {
    for i in 0..tokens.normalized.len() {
        if STOP_WORDS.contains(&tokens.normalized[i].as_str()) {
            tokens.consumed[i] = true;
        }
    }

    let mut best: Option<(usize, usize)> = None;
    let mut run_start = None;
    for i in 0..=tokens.consumed.len() {
        let open = i < tokens.consumed.len() && !tokens.consumed[i];
        match (open, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                let length = i - start;
                if best.map(|(_, l)| length > l).unwrap_or(true) {
                    best = Some((start, length));
                }
                run_start = None;
            }
            _ => {}
        }
    }

    best.map(|(start, length)| tokens.original[start..start + length].join(" "))
}

// ============================================================================
// Tests
// ============================================================================
