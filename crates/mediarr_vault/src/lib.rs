//! Backup, restore and inspection of per-service database files.
//!
//! The control plane owns no backend state; these utilities operate on
//! the backends' own database files by service id and path, treating the
//! files as opaque bytes. Backups are timestamped copies whose names sort
//! chronologically.

use chrono::Local;
use mediarr_protocol::ServiceKind;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Database file name per service. Plex and Overseerr manage their own
/// backup schedules, so only the arr databases are covered.
const DATABASE_FILES: &[(ServiceKind, &str)] = &[
    (ServiceKind::Sonarr, "sonarr.db"),
    (ServiceKind::Radarr, "radarr.db"),
    (ServiceKind::Prowlarr, "prowlarr.db"),
    (ServiceKind::Bazarr, "bazarr.db"),
];

/// Errors raised by vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("no database is managed for service: {0}")]
    UnknownService(ServiceKind),

    #[error("database not found: {0}")]
    MissingDatabase(PathBuf),

    #[error("backup file not found: {0}")]
    MissingBackup(PathBuf),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

fn io_err(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> VaultError {
    let context = context.into();
    move |source| VaultError::Io { context, source }
}

/// Size of one database, raw and human-readable.
#[derive(Debug, Clone)]
pub struct SizeInfo {
    pub bytes: u64,
    pub human: String,
}

// ============================================================================
// Vault
// ============================================================================

/// Handle over the directory layout the services keep their config in:
/// `<root>/<service>/<service>.db`, backups under `<root>/backups/<service>/`.
#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
}

impl Vault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Canonical database file name for a service, if it has one.
    pub fn db_file(service: ServiceKind) -> Option<&'static str> {
        DATABASE_FILES
            .iter()
            .find(|(s, _)| *s == service)
            .map(|(_, f)| *f)
    }

    /// Services with a managed database.
    pub fn managed_services() -> Vec<ServiceKind> {
        DATABASE_FILES.iter().map(|(s, _)| *s).collect()
    }

    /// Path where the service's live database is expected.
    pub fn db_path(&self, service: ServiceKind) -> Result<PathBuf, VaultError> {
        let file = Self::db_file(service).ok_or(VaultError::UnknownService(service))?;
        Ok(self.root.join(service.as_str()).join(file))
    }

    fn default_backup_dir(&self, service: ServiceKind) -> PathBuf {
        self.root.join("backups").join(service.as_str())
    }

    /// Copy the live database into a timestamped backup file.
    pub fn backup(
        &self,
        service: ServiceKind,
        backup_dir: Option<&Path>,
    ) -> Result<PathBuf, VaultError> {
        let db_path = self.db_path(service)?;
        if !db_path.exists() {
            return Err(VaultError::MissingDatabase(db_path));
        }

        let dir = backup_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.default_backup_dir(service));
        fs::create_dir_all(&dir)
            .map_err(io_err(format!("creating backup dir {}", dir.display())))?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let target = dir.join(format!("{}_{}.db", service.as_str(), timestamp));

        info!(service = %service, target = %target.display(), "backing up database");
        fs::copy(&db_path, &target).map_err(io_err(format!(
            "copying {} to {}",
            db_path.display(),
            target.display()
        )))?;

        Ok(target)
    }

    /// Back up every managed database; services without one are skipped
    /// with a warning, other failures are reported per service.
    pub fn backup_all(
        &self,
        backup_dir: Option<&Path>,
    ) -> Vec<(ServiceKind, Result<PathBuf, VaultError>)> {
        let mut results = Vec::new();
        for service in Self::managed_services() {
            match self.backup(service, backup_dir) {
                Err(VaultError::MissingDatabase(path)) => {
                    warn!(service = %service, path = %path.display(), "no database, skipping");
                }
                result => results.push((service, result)),
            }
        }
        results
    }

    /// Restore a database from a backup file, optionally preserving the
    /// current database as a fresh backup first.
    pub fn restore(
        &self,
        service: ServiceKind,
        backup_file: &Path,
        keep_current: bool,
    ) -> Result<(), VaultError> {
        let db_path = self.db_path(service)?;
        if !backup_file.exists() {
            return Err(VaultError::MissingBackup(backup_file.to_path_buf()));
        }

        if keep_current && db_path.exists() {
            self.backup(service, None)?;
        }

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)
                .map_err(io_err(format!("creating {}", parent.display())))?;
        }

        info!(
            service = %service,
            from = %backup_file.display(),
            to = %db_path.display(),
            "restoring database"
        );
        fs::copy(backup_file, &db_path).map_err(io_err(format!(
            "restoring {} from {}",
            db_path.display(),
            backup_file.display()
        )))?;

        Ok(())
    }

    /// Backups for a service, newest first. Timestamped names sort
    /// chronologically, so a reverse name sort is a time sort.
    pub fn list_backups(&self, service: ServiceKind) -> Result<Vec<PathBuf>, VaultError> {
        Self::db_file(service).ok_or(VaultError::UnknownService(service))?;
        let dir = self.default_backup_dir(service);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir)
            .map_err(io_err(format!("reading backup dir {}", dir.display())))?;
        let mut backups: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map(|ext| ext == "db").unwrap_or(false))
            .collect();
        backups.sort();
        backups.reverse();
        Ok(backups)
    }

    /// Size of one database file; 0 when absent.
    pub fn database_size(&self, service: ServiceKind) -> Result<u64, VaultError> {
        let path = self.db_path(service)?;
        Ok(path.metadata().map(|m| m.len()).unwrap_or(0))
    }

    /// Sizes of all managed databases.
    pub fn database_sizes(&self) -> Vec<(ServiceKind, SizeInfo)> {
        Self::managed_services()
            .into_iter()
            .map(|service| {
                let bytes = self.database_size(service).unwrap_or(0);
                (
                    service,
                    SizeInfo {
                        bytes,
                        human: human_size(bytes),
                    },
                )
            })
            .collect()
    }
}

/// Bytes to a human-readable figure.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    for unit in UNITS {
        if size < 1024.0 {
            return format!("{size:.2} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.2} PB")
}

// ============================================================================
// Tests
// ============================================================================
