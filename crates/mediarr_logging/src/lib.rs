//! Shared tracing setup for Mediarr binaries.
//!
//! Installs two layers: a size-capped log file under the mediarr home
//! directory and stderr. The configured level seeds the filter; `RUST_LOG`
//! overrides it. The MCP server owns stdout for JSON-RPC, so nothing here
//! ever writes there.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const MAX_LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Mediarr home directory: `$MEDIARR_HOME` or `~/.mediarr`.
pub fn mediarr_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("MEDIARR_HOME") {
        return PathBuf::from(override_path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mediarr")
}

/// Logs directory: `<home>/logs`.
pub fn logs_dir() -> PathBuf {
    mediarr_home().join("logs")
}

/// Default config file path: `<home>/config.toml`.
pub fn default_config_path() -> PathBuf {
    mediarr_home().join("config.toml")
}

/// Initialize tracing for a binary. `level` comes from configuration
/// ("trace".."error"); `verbose` widens the stderr layer to match the
/// file layer instead of warnings only.
pub fn init(app_name: &str, level: &str, verbose: bool) -> Result<()> {
    let logs = logs_dir();
    std::fs::create_dir_all(&logs)
        .with_context(|| format!("failed to create log directory {}", logs.display()))?;

    let file_writer = CappedFileWriter::new(logs.join(format!("{app_name}.log")))
        .context("failed to open log file")?;

    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let stderr_filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_filter(stderr_filter),
        )
        .init();

    Ok(())
}

// ============================================================================
// Capped file writer
// ============================================================================

/// Appends to one log file; when it outgrows the cap the current file is
/// rotated to `<name>.old` and a fresh one is started.
struct CappedFile {
    path: PathBuf,
    file: File,
    size: u64,
}

impl CappedFile {
    fn open(path: PathBuf) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let size = file.metadata()?.len();
        Ok(Self { path, file, size })
    }

    fn rotate(&mut self) -> io::Result<()> {
        let _ = self.file.flush();
        let old = self.path.with_extension("log.old");
        let _ = std::fs::remove_file(&old);
        std::fs::rename(&self.path, &old)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.file = file;
        self.size = 0;
        Ok(())
    }
}

impl Write for CappedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.size + buf.len() as u64 > MAX_LOG_FILE_SIZE {
            self.rotate()?;
        }
        let written = self.file.write(buf)?;
        self.size += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

#[derive(Clone)]
struct CappedFileWriter {
    inner: Arc<Mutex<CappedFile>>,
}

impl CappedFileWriter {
    fn new(path: PathBuf) -> io::Result<Self> {
        Ok(Self {
            inner: Arc::new(Mutex::new(CappedFile::open(path)?)),
        })
    }
}

struct CappedFileGuard {
    inner: Arc<Mutex<CappedFile>>,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CappedFileWriter {
    type Writer = CappedFileGuard;

    fn make_writer(&'a self) -> Self::Writer {
        CappedFileGuard {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Write for CappedFileGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        guard.flush()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capped_file_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut file = CappedFile::open(path.clone()).unwrap();
        file.write_all(b"one\n").unwrap();
        file.write_all(b"two\n").unwrap();
        file.flush().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_rotation_moves_current_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut file = CappedFile::open(path.clone()).unwrap();
        file.write_all(b"first generation\n").unwrap();
        file.rotate().unwrap();
        file.write_all(b"second generation\n").unwrap();
        file.flush().unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "second generation\n"
        );
        assert_eq!(
            std::fs::read_to_string(path.with_extension("log.old")).unwrap(),
            "first generation\n"
        );
    }
}
