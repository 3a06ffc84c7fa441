//! Per-backend operation catalogs.
//!
//! Catalogs are data: each backend contributes (operation → endpoint)
//! entries instead of carrying its own client type. Operations that need
//! identifiers free text cannot supply resolve to a guidance message
//! steering the caller to the direct-call tool.

use mediarr_protocol::{ClientRequest, IntentContext, Method, OperationKind, ServiceKind};
use serde_json::json;

/// What a catalog entry does when invoked.
pub enum EndpointAction {
    /// A concrete HTTP call. `title_param` names the query parameter the
    /// extracted title feeds; `command` wraps the call in the arr-style
    /// `POST command {"name": ...}` body.
    Call {
        method: Method,
        path: &'static str,
        title_param: Option<&'static str>,
        command: Option<&'static str>,
    },
    /// The operation exists but needs identifiers the router cannot
    /// extract from free text.
    NeedsIds(&'static str),
}

/// One (operation → endpoint) mapping.
pub struct CatalogEntry {
    pub operation: OperationKind,
    pub action: EndpointAction,
}

const fn call(
    operation: OperationKind,
    method: Method,
    path: &'static str,
) -> CatalogEntry {
    CatalogEntry {
        operation,
        action: EndpointAction::Call {
            method,
            path,
            title_param: None,
            command: None,
        },
    }
}

const fn lookup_call(
    operation: OperationKind,
    path: &'static str,
    title_param: &'static str,
) -> CatalogEntry {
    CatalogEntry {
        operation,
        action: EndpointAction::Call {
            method: Method::Get,
            path,
            title_param: Some(title_param),
            command: None,
        },
    }
}

const fn command_call(operation: OperationKind, command: &'static str) -> CatalogEntry {
    CatalogEntry {
        operation,
        action: EndpointAction::Call {
            method: Method::Post,
            path: "command",
            title_param: None,
            command: Some(command),
        },
    }
}

const fn needs_ids(operation: OperationKind, message: &'static str) -> CatalogEntry {
    CatalogEntry {
        operation,
        action: EndpointAction::NeedsIds(message),
    }
}

/// The full catalog, loaded once and never mutated.
pub static CATALOG: &[(ServiceKind, &[CatalogEntry])] = &[
    (
        ServiceKind::Sonarr,
        &[
            lookup_call(OperationKind::Search, "series/lookup", "term"),
            call(OperationKind::List, Method::Get, "series"),
            call(OperationKind::Get, Method::Get, "series"),
            command_call(OperationKind::Backup, "Backup"),
            needs_ids(
                OperationKind::Add,
                "adding a series needs a TVDB id and quality profile; call sonarr add with them",
            ),
            needs_ids(
                OperationKind::Delete,
                "deleting a series needs its Sonarr id; list series first",
            ),
        ],
    ),
    (
        ServiceKind::Radarr,
        &[
            lookup_call(OperationKind::Search, "movie/lookup", "term"),
            call(OperationKind::List, Method::Get, "movie"),
            call(OperationKind::Get, Method::Get, "movie"),
            command_call(OperationKind::Backup, "Backup"),
            needs_ids(
                OperationKind::Add,
                "adding a movie needs a TMDB id and quality profile; call radarr add with them",
            ),
            needs_ids(
                OperationKind::Delete,
                "deleting a movie needs its Radarr id; list movies first",
            ),
        ],
    ),
    (
        ServiceKind::Prowlarr,
        &[
            lookup_call(OperationKind::Search, "search", "query"),
            call(OperationKind::List, Method::Get, "indexer"),
            call(OperationKind::Get, Method::Get, "indexer"),
            command_call(OperationKind::Sync, "ApplicationSync"),
            command_call(OperationKind::Backup, "Backup"),
        ],
    ),
    (
        ServiceKind::Bazarr,
        &[
            call(OperationKind::List, Method::Get, "series"),
            needs_ids(
                OperationKind::Search,
                "subtitle search needs a series or movie id; list bazarr media first",
            ),
            needs_ids(
                OperationKind::Download,
                "subtitle download needs a media id and language code; list bazarr media first",
            ),
        ],
    ),
    (
        ServiceKind::Overseerr,
        &[
            lookup_call(OperationKind::Search, "search", "query"),
            call(OperationKind::List, Method::Get, "request"),
            call(OperationKind::Get, Method::Get, "request"),
            needs_ids(
                OperationKind::Request,
                "requesting media needs a media type and TMDB/TVDB id; search overseerr first",
            ),
            needs_ids(
                OperationKind::Approve,
                "approving needs a request id; list overseerr requests first",
            ),
        ],
    ),
    (
        ServiceKind::Plex,
        &[
            lookup_call(OperationKind::Search, "search", "query"),
            call(OperationKind::List, Method::Get, "library/sections"),
            call(OperationKind::Get, Method::Get, "library/sections"),
            call(OperationKind::Play, Method::Get, "status/sessions"),
            call(OperationKind::Refresh, Method::Get, "library/recentlyAdded"),
            needs_ids(
                OperationKind::Scan,
                "scanning needs a library section id; list plex libraries first",
            ),
            needs_ids(
                OperationKind::MarkWatched,
                "marking watched needs the item's rating key; search plex first",
            ),
        ],
    ),
];

/// Look up the entry for a (service, operation) pair.
pub fn lookup(service: ServiceKind, operation: OperationKind) -> Option<&'static CatalogEntry> {
    CATALOG
        .iter()
        .find(|(s, _)| *s == service)
        .and_then(|(_, entries)| entries.iter().find(|e| e.operation == operation))
}

/// Materialize a catalog call into a concrete request.
pub fn build_request(
    method: Method,
    path: &'static str,
    title_param: Option<&'static str>,
    command: Option<&'static str>,
    context: &IntentContext,
) -> ClientRequest {
    let mut request = ClientRequest::new(method, path);
    if let Some(param) = title_param {
        let title = context.title.clone().unwrap_or_default();
        request = request.query(param, title);
    }
    if let Some(name) = command {
        request = request.body(json!({ "name": name }));
    }
    request
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_known_service_has_entries() {
        for service in ServiceKind::PRIORITY {
            assert!(
                CATALOG.iter().any(|(s, _)| *s == service),
                "no catalog for {service}"
            );
        }
    }

    #[test]
    fn test_search_is_mapped_everywhere() {
        for service in ServiceKind::PRIORITY {
            assert!(
                lookup(service, OperationKind::Search).is_some(),
                "{service} has no search entry"
            );
        }
    }

    #[test]
    fn test_lookup_misses_cleanly() {
        assert!(lookup(ServiceKind::Plex, OperationKind::Sync).is_none());
        assert!(lookup(ServiceKind::Unknown, OperationKind::Search).is_none());
    }

    #[test]
    fn test_build_request_with_title() {
        let context = IntentContext {
            title: Some("Dune".to_string()),
            ..IntentContext::default()
        };
        let request = build_request(
            Method::Get,
            "series/lookup",
            Some("term"),
            None,
            &context,
        );
        assert_eq!(request.path, "series/lookup");
        assert_eq!(
            request.query,
            vec![("term".to_string(), "Dune".to_string())]
        );
    }

    #[test]
    fn test_build_command_request() {
        let request = build_request(
            Method::Post,
            "command",
            None,
            Some("ApplicationSync"),
            &IntentContext::default(),
        );
        assert_eq!(request.body.unwrap()["name"], "ApplicationSync");
    }
}
