//! Canonical default values shared across the suite.

use crate::types::ServiceKind;

pub const DEFAULT_HOST: &str = "localhost";

pub const DEFAULT_SONARR_PORT: u16 = 8989;
pub const DEFAULT_RADARR_PORT: u16 = 7878;
pub const DEFAULT_PROWLARR_PORT: u16 = 9696;
pub const DEFAULT_BAZARR_PORT: u16 = 6767;
pub const DEFAULT_OVERSEERR_PORT: u16 = 5055;
pub const DEFAULT_PLEX_PORT: u16 = 32400;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 500;
pub const DEFAULT_RETRY_MULTIPLIER: f64 = 2.0;
pub const DEFAULT_RETRY_JITTER_MS: u64 = 250;
pub const DEFAULT_RETRY_MAX_DELAY_SECS: u64 = 30;
pub const DEFAULT_RETRYABLE_STATUS: [u16; 4] = [429, 502, 503, 504];

/// Default port for a backend when its config omits one.
pub fn default_port(service: ServiceKind) -> u16 {
    match service {
        ServiceKind::Sonarr => DEFAULT_SONARR_PORT,
        ServiceKind::Radarr => DEFAULT_RADARR_PORT,
        ServiceKind::Prowlarr => DEFAULT_PROWLARR_PORT,
        ServiceKind::Bazarr => DEFAULT_BAZARR_PORT,
        ServiceKind::Overseerr => DEFAULT_OVERSEERR_PORT,
        ServiceKind::Plex => DEFAULT_PLEX_PORT,
        ServiceKind::Unknown => 0,
    }
}

/// API path prefix each backend expects between base URL and endpoint.
pub fn api_prefix(service: ServiceKind) -> &'static str {
    match service {
        ServiceKind::Sonarr | ServiceKind::Radarr | ServiceKind::Prowlarr => "api/v3",
        ServiceKind::Bazarr => "api/v4",
        ServiceKind::Overseerr => "api/v1",
        ServiceKind::Plex | ServiceKind::Unknown => "",
    }
}

/// Endpoint probed to decide whether a backend is reachable.
pub fn status_endpoint(service: ServiceKind) -> &'static str {
    match service {
        ServiceKind::Plex => "identity",
        _ => "system/status",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ports() {
        assert_eq!(default_port(ServiceKind::Sonarr), 8989);
        assert_eq!(default_port(ServiceKind::Plex), 32400);
    }

    #[test]
    fn test_api_prefixes() {
        assert_eq!(api_prefix(ServiceKind::Radarr), "api/v3");
        assert_eq!(api_prefix(ServiceKind::Bazarr), "api/v4");
        assert_eq!(api_prefix(ServiceKind::Overseerr), "api/v1");
        assert_eq!(api_prefix(ServiceKind::Plex), "");
    }

    #[test]
    fn test_status_endpoints() {
        assert_eq!(status_endpoint(ServiceKind::Sonarr), "system/status");
        assert_eq!(status_endpoint(ServiceKind::Plex), "identity");
    }
}
