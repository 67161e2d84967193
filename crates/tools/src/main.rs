use std::fs;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use session::backend::RenderBackend;
use session::host::MapHost;
use session::settings::SessionConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Validate map configurations and replay map sessions")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a JSON map configuration and print its canonical form
    Validate {
        /// Path to the configuration file
        file: PathBuf,
    },

    /// Replay a JSON-lines script of host calls and print commands and events
    Replay {
        /// Path to the script; reads stdin when omitted
        script: Option<PathBuf>,

        /// Engine dev server URL (overrides GEOMAP_DEV_SERVER_URL)
        #[arg(long)]
        dev_server: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Validate { file } => validate_file(&file),
        Command::Replay { script, dev_server } => replay(script, dev_server),
    }
}

fn validate_file(path: &Path) -> Result<()> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let raw: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    let config = config::validate::validate(&raw)
        .with_context(|| format!("validating {}", path.display()))?;
    info!(layers = config.layers().len(), "configuration is valid");
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn replay(script: Option<PathBuf>, dev_server: Option<String>) -> Result<()> {
    let backend = match dev_server {
        Some(url) => RenderBackend::from_vars(Some(&url), None)?,
        None => RenderBackend::from_env()?,
    };
    let settings = SessionConfig::from_env();
    info!(?backend, dev_server = backend.is_dev_server(), ?settings, "starting replay");
    let mut host = MapHost::new(backend, settings);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = match script {
        Some(path) => {
            let file = fs::File::open(&path).with_context(|| format!("opening {}", path.display()))?;
            tools::replay::run(BufReader::new(file), &mut out, &mut host)?
        }
        None => tools::replay::run(io::stdin().lock(), &mut out, &mut host)?,
    };
    info!(
        calls = summary.calls,
        commands = summary.commands,
        events = summary.events,
        rejected = summary.rejected,
        "replay finished"
    );
    Ok(())
}
