//! Mediarr launcher.
//!
//! `serve` runs the MCP server over stdio; the remaining subcommands are
//! standalone utilities (offline intent explanation, backend status,
//! database backup/restore).

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mediarr_dispatch::Dispatcher;
use mediarr_mcp::McpServer;
use mediarr_protocol::{ServiceKind, SuiteConfig};
use mediarr_router::IntentRouter;
use mediarr_vault::Vault;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "mediarr", about = "Natural-language control plane for a media suite")]
struct Cli {
    /// Config file (defaults to ~/.mediarr/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Mirror file-level logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the MCP server on stdio (default)
    Serve,

    /// Explain how a query would be routed, without executing it
    Route {
        /// The natural-language query
        text: Vec<String>,
    },

    /// Probe every configured backend
    Status,

    /// Back up a service database ("all" for every managed service)
    Backup {
        /// Service name or "all"
        service: String,

        /// Directory holding the services' config trees
        #[arg(long, env = "MEDIARR_CONFIG_ROOT", default_value = "/opt/docker-media-server/config")]
        root: PathBuf,

        /// Where to put the backup (defaults to <root>/backups/<service>)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Restore a service database from a backup file
    Restore {
        /// Service name
        service: String,

        /// Backup file to restore from
        #[arg(long)]
        file: PathBuf,

        /// Directory holding the services' config trees
        #[arg(long, env = "MEDIARR_CONFIG_ROOT", default_value = "/opt/docker-media-server/config")]
        root: PathBuf,

        /// Skip backing up the current database first
        #[arg(long)]
        skip_safety_backup: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(mediarr_logging::default_config_path);
    let config = SuiteConfig::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    mediarr_logging::init("mediarr", config.log_level(), cli.verbose)?;
    info!(
        config = %config_path.display(),
        backends = config.enabled_services().len(),
        "mediarr starting"
    );

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Route { text } => route(&text.join(" ")),
        Command::Status => status(config).await,
        Command::Backup { service, root, dir } => backup(&service, root, dir),
        Command::Restore {
            service,
            file,
            root,
            skip_safety_backup,
        } => restore(&service, &file, root, skip_safety_backup),
    }
}

async fn serve(config: SuiteConfig) -> Result<()> {
    let mut server = McpServer::new(config)?;
    server.run().await
}

fn route(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        bail!("nothing to route; pass a query, e.g. mediarr route add Dune in 4K");
    }
    let router = IntentRouter::new();
    print!("{}", router.explain(text));
    Ok(())
}

async fn status(config: SuiteConfig) -> Result<()> {
    let dispatcher = Dispatcher::from_config(&config)?;
    if dispatcher.available().is_empty() {
        println!("no backends configured");
        return Ok(());
    }
    for (service, result) in dispatcher.statuses().await {
        match result {
            Ok(_) => println!("{:<10} online", service.as_str()),
            Err(e) => println!("{:<10} offline ({e})", service.as_str()),
        }
    }
    Ok(())
}

fn backup(service: &str, root: PathBuf, dir: Option<PathBuf>) -> Result<()> {
    let vault = Vault::new(root);

    if service.eq_ignore_ascii_case("all") {
        let results = vault.backup_all(dir.as_deref());
        if results.is_empty() {
            println!("no databases found");
            return Ok(());
        }
        for (service, result) in results {
            match result {
                Ok(path) => println!("{:<10} -> {}", service.as_str(), path.display()),
                Err(e) => println!("{:<10} failed: {e}", service.as_str()),
            }
        }
        return Ok(());
    }

    let service: ServiceKind = service
        .parse()
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let path = vault.backup(service, dir.as_deref())?;
    println!("{} -> {}", service.as_str(), path.display());
    Ok(())
}

fn restore(service: &str, file: &PathBuf, root: PathBuf, skip_safety_backup: bool) -> Result<()> {
    let service: ServiceKind = service
        .parse()
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let vault = Vault::new(root);
    vault.restore(service, file, !skip_safety_backup)?;
    println!("{} restored from {}", service.as_str(), file.display());
    Ok(())
}
