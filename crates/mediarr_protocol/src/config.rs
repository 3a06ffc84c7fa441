//! Suite configuration: per-backend connection settings plus global knobs.
//!
//! Loaded once from a TOML file; environment variables of the form
//! `MEDIARR_<SERVICE>_<FIELD>` override file values so credentials can stay
//! out of the file entirely. A backend is enabled iff its section exists
//! (in file or environment) and carries a non-empty credential.

use crate::defaults;
use crate::request::{AuthScheme, BackendDescriptor, RetryPolicy};
use crate::types::ServiceKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Per-service settings
// ============================================================================

/// Connection settings for one backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    pub host: String,
    /// Falls back to the service's well-known port when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Plex configs may spell this `token`.
    #[serde(alias = "token")]
    pub api_key: String,
    pub ssl: bool,
    pub base_path: String,
}

impl ServiceSettings {
    fn host_or_default(&self) -> &str {
        if self.host.is_empty() {
            defaults::DEFAULT_HOST
        } else {
            &self.host
        }
    }

    /// Compose `http[s]://host:port[/base_path]`.
    pub fn base_url(&self, service: ServiceKind) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        let port = self.port.unwrap_or_else(|| defaults::default_port(service));
        let mut url = format!("{}://{}:{}", scheme, self.host_or_default(), port);
        let base_path = self.base_path.trim_matches('/');
        if !base_path.is_empty() {
            url.push('/');
            url.push_str(base_path);
        }
        url
    }
}

// ============================================================================
// Suite configuration
// ============================================================================

/// The whole suite: optional per-backend sections plus global settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sonarr: Option<ServiceSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radarr: Option<ServiceSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prowlarr: Option<ServiceSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bazarr: Option<ServiceSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overseerr: Option<ServiceSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plex: Option<ServiceSettings>,

    #[serde(rename = "request_timeout", skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl SuiteConfig {
    /// Load from a TOML file, then fold in environment overrides.
    ///
    /// A missing file is not an error: the suite starts with no backends
    /// enabled and environment variables can still enable them.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no config file at {}, starting empty", path.display());
                Self::default()
            }
            Err(e) => {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Fold `MEDIARR_<SERVICE>_{HOST,PORT,API_KEY,TOKEN,SSL,BASE_PATH}` and
    /// the global `MEDIARR_{REQUEST_TIMEOUT,MAX_RETRIES,LOG_LEVEL}` into the
    /// loaded values. A credential supplied only via environment creates the
    /// service section on the fly.
    pub fn apply_env_overrides(&mut self) {
        for service in ServiceKind::PRIORITY {
            let prefix = format!("MEDIARR_{}", service.as_str().to_uppercase());

            let credential = std::env::var(format!("{prefix}_API_KEY"))
                .or_else(|_| std::env::var(format!("{prefix}_TOKEN")))
                .ok();
            let host = std::env::var(format!("{prefix}_HOST")).ok();
            let port = std::env::var(format!("{prefix}_PORT"))
                .ok()
                .and_then(|v| v.parse::<u16>().ok());
            let ssl = std::env::var(format!("{prefix}_SSL"))
                .ok()
                .map(|v| parse_bool(&v));
            let base_path = std::env::var(format!("{prefix}_BASE_PATH")).ok();

            if credential.is_none()
                && host.is_none()
                && port.is_none()
                && ssl.is_none()
                && base_path.is_none()
            {
                continue;
            }

            let settings = self
                .settings_mut(service)
                .get_or_insert_with(ServiceSettings::default);
            if let Some(value) = credential {
                settings.api_key = value;
            }
            if let Some(value) = host {
                settings.host = value;
            }
            if port.is_some() {
                settings.port = port;
            }
            if let Some(value) = ssl {
                settings.ssl = value;
            }
            if let Some(value) = base_path {
                settings.base_path = value;
            }
        }

        if let Some(value) = std::env::var("MEDIARR_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.request_timeout_secs = Some(value);
        }
        if let Some(value) = std::env::var("MEDIARR_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
        {
            self.max_retries = Some(value);
        }
        if let Ok(value) = std::env::var("MEDIARR_LOG_LEVEL") {
            self.log_level = Some(value);
        }
    }

    pub fn settings(&self, service: ServiceKind) -> Option<&ServiceSettings> {
        match service {
            ServiceKind::Sonarr => self.sonarr.as_ref(),
            ServiceKind::Radarr => self.radarr.as_ref(),
            ServiceKind::Prowlarr => self.prowlarr.as_ref(),
            ServiceKind::Bazarr => self.bazarr.as_ref(),
            ServiceKind::Overseerr => self.overseerr.as_ref(),
            ServiceKind::Plex => self.plex.as_ref(),
            ServiceKind::Unknown => None,
        }
    }

    fn settings_mut(&mut self, service: ServiceKind) -> &mut Option<ServiceSettings> {
        match service {
            ServiceKind::Sonarr => &mut self.sonarr,
            ServiceKind::Radarr => &mut self.radarr,
            ServiceKind::Prowlarr => &mut self.prowlarr,
            ServiceKind::Bazarr => &mut self.bazarr,
            ServiceKind::Overseerr => &mut self.overseerr,
            ServiceKind::Plex => &mut self.plex,
            ServiceKind::Unknown => unreachable!("unknown service has no settings"),
        }
    }

    /// A backend is enabled iff its section exists with a credential.
    pub fn is_enabled(&self, service: ServiceKind) -> bool {
        self.settings(service)
            .map(|s| !s.api_key.is_empty())
            .unwrap_or(false)
    }

    pub fn enabled_services(&self) -> Vec<ServiceKind> {
        ServiceKind::PRIORITY
            .into_iter()
            .filter(|s| self.is_enabled(*s))
            .collect()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(defaults::DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(defaults::DEFAULT_MAX_RETRIES)
    }

    pub fn log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .unwrap_or(defaults::DEFAULT_LOG_LEVEL)
    }

    /// The retry policy every backend call uses.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries().max(1),
            ..RetryPolicy::default()
        }
    }

    /// Produce the descriptor for an enabled backend.
    pub fn descriptor(&self, service: ServiceKind) -> Option<BackendDescriptor> {
        if !self.is_enabled(service) {
            return None;
        }
        let settings = self.settings(service)?;
        Some(BackendDescriptor {
            service,
            base_url: settings.base_url(service),
            api_prefix: defaults::api_prefix(service).to_string(),
            auth: AuthScheme::for_service(service),
            credential: settings.api_key.clone(),
            timeout: self.request_timeout(),
            retry: self.retry_policy(),
        })
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        request_timeout = 10
        max_retries = 5
        log_level = "debug"

        [sonarr]
        host = "media-box"
        api_key = "abc123"

        [plex]
        token = "plex-token"
        ssl = true

        [radarr]
        host = "media-box"
    "#;

    #[test]
    fn test_parse_sample() {
        let config = SuiteConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.max_retries(), 5);
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn test_enabled_requires_credential() {
        let config = SuiteConfig::from_toml_str(SAMPLE).unwrap();
        assert!(config.is_enabled(ServiceKind::Sonarr));
        assert!(config.is_enabled(ServiceKind::Plex));
        // radarr section exists but has no api_key
        assert!(!config.is_enabled(ServiceKind::Radarr));
        assert!(!config.is_enabled(ServiceKind::Bazarr));
        assert_eq!(
            config.enabled_services(),
            vec![ServiceKind::Sonarr, ServiceKind::Plex]
        );
    }

    #[test]
    fn test_plex_token_alias() {
        let config = SuiteConfig::from_toml_str(SAMPLE).unwrap();
        let plex = config.settings(ServiceKind::Plex).unwrap();
        assert_eq!(plex.api_key, "plex-token");
    }

    #[test]
    fn test_base_url_composition() {
        let config = SuiteConfig::from_toml_str(SAMPLE).unwrap();
        let sonarr = config.settings(ServiceKind::Sonarr).unwrap();
        assert_eq!(
            sonarr.base_url(ServiceKind::Sonarr),
            "http://media-box:8989"
        );
        let plex = config.settings(ServiceKind::Plex).unwrap();
        assert_eq!(plex.base_url(ServiceKind::Plex), "https://localhost:32400");
    }

    #[test]
    fn test_base_url_with_base_path() {
        let settings = ServiceSettings {
            base_path: "/sonarr/".to_string(),
            port: Some(9000),
            ..ServiceSettings::default()
        };
        assert_eq!(
            settings.base_url(ServiceKind::Sonarr),
            "http://localhost:9000/sonarr"
        );
    }

    #[test]
    fn test_descriptor_folds_globals() {
        let config = SuiteConfig::from_toml_str(SAMPLE).unwrap();
        let descriptor = config.descriptor(ServiceKind::Sonarr).unwrap();
        assert_eq!(descriptor.timeout, Duration::from_secs(10));
        assert_eq!(descriptor.retry.max_attempts, 5);
        assert_eq!(descriptor.api_prefix, "api/v3");
        assert_eq!(descriptor.auth, AuthScheme::ApiKey);

        assert!(config.descriptor(ServiceKind::Bazarr).is_none());
    }

    #[test]
    fn test_missing_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = SuiteConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert!(config.enabled_services().is_empty());
    }

    #[test]
    fn test_defaults_when_globals_absent() {
        let config = SuiteConfig::from_toml_str("").unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_retries(), 3);
        assert_eq!(config.log_level(), "info");
    }
}
