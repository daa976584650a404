use anyhow::{Context, Result};
use clap::Parser;
use pairsheet::{
    config::DEFAULT_SHEET_ID,
    fetch::{GridSource, RetryPolicy},
    table::{alternate_label, parse_letter_pairs, primary_code},
};
use reqwest::Client;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

/// Print the letter pairs of a single sheet.
#[derive(Parser, Debug)]
struct Args {
    /// Sheet (tab) name, e.g. "UFR Corners"
    sheet: String,

    #[arg(long, env = "PAIRSHEET_SHEET_ID", default_value = DEFAULT_SHEET_ID)]
    sheet_id: String,

    /// Read `<sheet>.txt` from this directory instead of fetching
    #[arg(long)]
    local_dir: Option<PathBuf>,

    /// Save the raw response body to this file
    #[arg(long)]
    save: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let args = Args::parse();
    let source = match &args.local_dir {
        Some(dir) => GridSource::local(dir),
        None => GridSource::remote(Client::new(), &args.sheet_id, RetryPolicy::default()),
    };

    let body = source.fetch_body(&args.sheet).await?;
    if let Some(path) = &args.save {
        std::fs::write(path, &body).with_context(|| format!("saving {}", path.display()))?;
    }
    let grid = pairsheet::fetch::decode_response(&args.sheet, &body)?;
    let pairs = parse_letter_pairs(&grid);

    let width = grid.first().map(Vec::len).unwrap_or(0);
    println!(
        "{}: {} rows x {} columns, {} pairs",
        args.sheet,
        grid.len(),
        width,
        pairs.len()
    );
    for pair in &pairs {
        let code = match (primary_code(&pair.first_letter), primary_code(&pair.second_letter)) {
            (Ok(f), Ok(s)) => format!("{}{}", f, s),
            _ => "??".to_string(),
        };
        println!(
            "{}  {:<8} {:<8} {}",
            code,
            alternate_label(&pair.first_letter),
            alternate_label(&pair.second_letter),
            pair.data
        );
    }
    Ok(())
}
