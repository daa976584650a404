use anyhow::Result;
use clap::Parser;
use pairsheet::{config::Config, pipeline};
use reqwest::Client;
use std::path::PathBuf;
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Build flashcard exports from the letter-pair memo sheets.
#[derive(Parser, Debug)]
struct Args {
    /// YAML config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Google Sheets document id
    #[arg(long, env = "PAIRSHEET_SHEET_ID")]
    sheet_id: Option<String>,

    #[arg(long)]
    audio_sheet: Option<String>,

    #[arg(long)]
    corner_sheet: Option<String>,

    #[arg(long)]
    edge_sheet: Option<String>,

    /// Directory for data.json, data.csv and data.txt
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Read saved `<sheet>.txt` responses from this directory instead of fetching
    #[arg(long)]
    local_dir: Option<PathBuf>,

    #[arg(long)]
    max_retries: Option<u32>,

    /// Abort on the first audio record that cannot be resolved
    #[arg(long)]
    strict: bool,
}

impl Args {
    fn into_config(self) -> Result<Config> {
        let mut cfg = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(v) = self.sheet_id {
            cfg.sheet_id = v;
        }
        if let Some(v) = self.audio_sheet {
            cfg.audio_sheet = v;
        }
        if let Some(v) = self.corner_sheet {
            cfg.corner_sheet = v;
        }
        if let Some(v) = self.edge_sheet {
            cfg.edge_sheet = v;
        }
        if let Some(v) = self.out_dir {
            cfg.out_dir = v;
        }
        if self.local_dir.is_some() {
            cfg.local_dir = self.local_dir;
        }
        if let Some(v) = self.max_retries {
            cfg.max_retries = v;
        }
        cfg.strict |= self.strict;
        Ok(cfg)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    // ─── 2) resolve configuration ────────────────────────────────────
    let cfg = Args::parse().into_config()?;
    info!(
        sheet_id = %cfg.sheet_id,
        local_dir = ?cfg.local_dir,
        out_dir = %cfg.out_dir.display(),
        "startup"
    );

    // ─── 3) fetch, resolve, write ────────────────────────────────────
    let start = Instant::now();
    let source = cfg.source(Client::new());
    let written = pipeline::run(&source, &cfg).await?;
    for path in &written {
        info!(path = %path.display(), "written");
    }

    info!(elapsed = ?start.elapsed(), "all done");
    Ok(())
}
