//! Process-wide trigger tables.
//!
//! Loaded once as read-only statics; never mutated, so they need no
//! synchronization. The first entry of each service list is the service's
//! own name, which the scorer weights above everything else. Table order
//! doubles as the tie-break order.

use mediarr_protocol::{OperationKind, ServiceKind};

/// Trigger phrases per service.
pub const SERVICE_KEYWORDS: &[(ServiceKind, &[&str])] = &[
    (
        ServiceKind::Sonarr,
        &[
            "sonarr",
            "tv",
            "show",
            "series",
            "episode",
            "season",
            "television",
            "tvdb",
            "anime",
            "collection",
        ],
    ),
    (
        ServiceKind::Radarr,
        &[
            "radarr",
            "movie",
            "film",
            "cinema",
            "tmdb",
            "collection",
        ],
    ),
    (
        ServiceKind::Prowlarr,
        &[
            "prowlarr",
            "indexer",
            "tracker",
            "search engine",
            "torrent site",
            "usenet",
        ],
    ),
    (
        ServiceKind::Bazarr,
        &[
            "bazarr",
            "subtitle",
            "subs",
            "caption",
            "language",
            "translation",
        ],
    ),
    (
        ServiceKind::Overseerr,
        &[
            "overseerr",
            "request",
            "approve",
            "decline",
            "discover",
            "trending",
        ],
    ),
    (
        ServiceKind::Plex,
        &[
            "plex",
            "library",
            "libraries",
            "playing",
            "session",
            "watch",
            "watched",
            "on deck",
            "recently added",
            "playlist",
            "collection",
            "transcode",
            "stream",
            "media server",
        ],
    ),
];

/// Trigger verbs per operation. Order doubles as the tie-break order.
pub const OPERATION_KEYWORDS: &[(OperationKind, &[&str])] = &[
    (
        OperationKind::Search,
        &["search", "find", "lookup", "query", "locate"],
    ),
    (
        OperationKind::Add,
        &["add", "create", "new", "insert", "import"],
    ),
    (
        OperationKind::Delete,
        &["delete", "remove", "unmonitor", "destroy"],
    ),
    (
        OperationKind::Update,
        &["update", "modify", "change", "edit"],
    ),
    (
        OperationKind::List,
        &["list", "show all", "get all", "display", "view"],
    ),
    (
        OperationKind::Get,
        &["get", "retrieve", "fetch", "show", "details"],
    ),
    (
        OperationKind::Configure,
        &["configure", "config", "settings", "setup", "customize"],
    ),
    (
        OperationKind::Monitor,
        &["monitor", "track", "follow", "watch"],
    ),
    (
        OperationKind::Download,
        &["download", "grab", "get subtitles", "fetch subtitles"],
    ),
    (
        OperationKind::Request,
        &["request", "want", "need", "ask for"],
    ),
    (
        OperationKind::Approve,
        &["approve", "accept", "decline", "reject"],
    ),
    (OperationKind::Sync, &["sync", "synchronize"]),
    (
        OperationKind::Backup,
        &["backup", "back up", "export database"],
    ),
    (
        OperationKind::Play,
        &["play", "playing", "stream", "streaming"],
    ),
    (OperationKind::Scan, &["scan", "analyze", "index"]),
    (
        OperationKind::Refresh,
        &["refresh", "reload", "update library"],
    ),
    (
        OperationKind::MarkWatched,
        &["mark watched", "mark as watched", "scrobble"],
    ),
];

/// Filler words never part of a title guess.
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "all", "are", "at", "for", "from", "i", "in", "is", "it", "me", "my", "of", "on",
    "our", "please", "some", "that", "this", "to", "was", "we", "with", "you", "your",
];

/// Quality tokens recognized during context extraction.
pub const QUALITY_TOKENS: &[&str] = &["4k", "2160p", "1080p", "720p", "480p", "sd", "hd", "uhd"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_service_list_starts_with_its_name() {
        for (service, phrases) in SERVICE_KEYWORDS {
            assert_eq!(phrases[0], service.as_str());
        }
    }

    #[test]
    fn test_tables_cover_priority_order() {
        let listed: Vec<ServiceKind> = SERVICE_KEYWORDS.iter().map(|(s, _)| *s).collect();
        assert_eq!(listed, ServiceKind::PRIORITY.to_vec());
    }

    #[test]
    fn test_no_empty_phrases() {
        for (_, phrases) in SERVICE_KEYWORDS {
            assert!(phrases.iter().all(|p| !p.is_empty()));
        }
        for (_, phrases) in OPERATION_KEYWORDS {
            assert!(phrases.iter().all(|p| !p.is_empty()));
        }
    }
}
