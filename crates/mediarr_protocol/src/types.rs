//! Services, operations and parsed intents.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Service Kind - the backends dispatch can target
// ============================================================================

/// One independently wrapped media-management backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// TV series management
    Sonarr,
    /// Movie management
    Radarr,
    /// Indexer management
    Prowlarr,
    /// Subtitle management
    Bazarr,
    /// Media requests and discovery
    Overseerr,
    /// Media server (libraries, sessions, playback)
    Plex,
    /// No backend could be determined from the input
    Unknown,
}

impl ServiceKind {
    /// Every dispatchable backend, in dispatch-priority order.
    ///
    /// When two services score identically during intent parsing, the one
    /// listed earlier wins.
    pub const PRIORITY: [ServiceKind; 6] = [
        ServiceKind::Sonarr,
        ServiceKind::Radarr,
        ServiceKind::Prowlarr,
        ServiceKind::Bazarr,
        ServiceKind::Overseerr,
        ServiceKind::Plex,
    ];

    /// Canonical lowercase identifier (matches config section names).
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Sonarr => "sonarr",
            ServiceKind::Radarr => "radarr",
            ServiceKind::Prowlarr => "prowlarr",
            ServiceKind::Bazarr => "bazarr",
            ServiceKind::Overseerr => "overseerr",
            ServiceKind::Plex => "plex",
            ServiceKind::Unknown => "unknown",
        }
    }

    /// Human-facing name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ServiceKind::Sonarr => "Sonarr",
            ServiceKind::Radarr => "Radarr",
            ServiceKind::Prowlarr => "Prowlarr",
            ServiceKind::Bazarr => "Bazarr",
            ServiceKind::Overseerr => "Overseerr",
            ServiceKind::Plex => "Plex",
            ServiceKind::Unknown => "Unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ServiceKind::Unknown)
    }

    /// Operation assumed when the input names this service but no verb.
    pub fn default_operation(&self) -> OperationKind {
        match self {
            ServiceKind::Sonarr | ServiceKind::Radarr | ServiceKind::Bazarr => {
                OperationKind::Search
            }
            ServiceKind::Prowlarr => OperationKind::List,
            ServiceKind::Overseerr => OperationKind::Request,
            ServiceKind::Plex => OperationKind::Get,
            ServiceKind::Unknown => OperationKind::Unknown,
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when parsing a ServiceKind from string.
#[derive(Debug, Error, Clone)]
#[error("unknown service: {0}")]
pub struct ServiceParseError(String);

impl std::str::FromStr for ServiceKind {
    type Err = ServiceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sonarr" => Ok(ServiceKind::Sonarr),
            "radarr" => Ok(ServiceKind::Radarr),
            "prowlarr" => Ok(ServiceKind::Prowlarr),
            "bazarr" => Ok(ServiceKind::Bazarr),
            "overseerr" => Ok(ServiceKind::Overseerr),
            "plex" => Ok(ServiceKind::Plex),
            other => Err(ServiceParseError(other.to_string())),
        }
    }
}

// ============================================================================
// Operation Kind
// ============================================================================

/// What the caller wants done, independent of which backend does it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Search,
    Add,
    Delete,
    Update,
    List,
    Get,
    Configure,
    Monitor,
    Download,
    Request,
    Approve,
    Sync,
    Backup,
    Play,
    Scan,
    Refresh,
    MarkWatched,
    Unknown,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Search => "search",
            OperationKind::Add => "add",
            OperationKind::Delete => "delete",
            OperationKind::Update => "update",
            OperationKind::List => "list",
            OperationKind::Get => "get",
            OperationKind::Configure => "configure",
            OperationKind::Monitor => "monitor",
            OperationKind::Download => "download",
            OperationKind::Request => "request",
            OperationKind::Approve => "approve",
            OperationKind::Sync => "sync",
            OperationKind::Backup => "backup",
            OperationKind::Play => "play",
            OperationKind::Scan => "scan",
            OperationKind::Refresh => "refresh",
            OperationKind::MarkWatched => "mark_watched",
            OperationKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when parsing an OperationKind from string.
#[derive(Debug, Error, Clone)]
#[error("unknown operation: {0}")]
pub struct OperationParseError(String);

impl std::str::FromStr for OperationKind {
    type Err = OperationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "search" => Ok(OperationKind::Search),
            "add" => Ok(OperationKind::Add),
            "delete" => Ok(OperationKind::Delete),
            "update" => Ok(OperationKind::Update),
            "list" => Ok(OperationKind::List),
            "get" => Ok(OperationKind::Get),
            "configure" => Ok(OperationKind::Configure),
            "monitor" => Ok(OperationKind::Monitor),
            "download" => Ok(OperationKind::Download),
            "request" => Ok(OperationKind::Request),
            "approve" => Ok(OperationKind::Approve),
            "sync" => Ok(OperationKind::Sync),
            "backup" => Ok(OperationKind::Backup),
            "play" => Ok(OperationKind::Play),
            "scan" => Ok(OperationKind::Scan),
            "refresh" => Ok(OperationKind::Refresh),
            "mark_watched" => Ok(OperationKind::MarkWatched),
            other => Err(OperationParseError(other.to_string())),
        }
    }
}

// ============================================================================
// Intent Context - fields extracted from free text
// ============================================================================

/// Semantic fields pulled out of the request text.
///
/// `monitored` and `search_on_add` default to true; the router flips them
/// only when the text explicitly asks (e.g. "unmonitor", "don't search").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default = "default_true")]
    pub monitored: bool,
    #[serde(default = "default_true")]
    pub search_on_add: bool,
}

fn default_true() -> bool {
    true
}

impl Default for IntentContext {
    fn default() -> Self {
        Self {
            title: None,
            year: None,
            quality: None,
            season: None,
            episode: None,
            language: None,
            monitored: true,
            search_on_add: true,
        }
    }
}

impl IntentContext {
    /// True when no semantic field was extracted.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.year.is_none()
            && self.quality.is_none()
            && self.season.is_none()
            && self.episode.is_none()
            && self.language.is_none()
    }
}

// ============================================================================
// Intent - the dispatch decision
// ============================================================================

/// A parsed request: which backend, which operation, how sure, and the
/// extracted arguments. Created per request and discarded after dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub service: ServiceKind,
    pub operation: OperationKind,
    /// Router certainty in [0, 1].
    pub confidence: f32,
    pub context: IntentContext,
    /// Trigger phrases that fired, kept so callers can explain the decision.
    pub matched_keywords: Vec<String>,
    pub raw_text: String,
}

impl Intent {
    /// An intent the router could not ground in any backend.
    pub fn unknown(raw_text: impl Into<String>, confidence: f32) -> Self {
        Self {
            service: ServiceKind::Unknown,
            operation: OperationKind::Unknown,
            confidence,
            context: IntentContext::default(),
            matched_keywords: Vec::new(),
            raw_text: raw_text.into(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
