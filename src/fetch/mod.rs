// src/fetch/mod.rs

pub mod gviz;

use reqwest::Client;
use std::{path::PathBuf, time::Duration};
use tokio::{fs, time::sleep};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::error::RetrievalError;
use crate::table::Grid;

pub use gviz::decode_response;

const SHEETS_BASE: &str = "https://docs.google.com/spreadsheets/d/";

/// Retry policy for remote fetches: `max_retries` extra attempts with the
/// delay doubling from `initial_backoff`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

/// Where sheets come from.
#[derive(Debug, Clone)]
pub enum GridSource {
    /// Live Google Sheets document, addressed by its id.
    Remote {
        client: Client,
        sheet_id: String,
        retry: RetryPolicy,
    },
    /// A directory of saved gviz response bodies named `<sheet>.txt`.
    Local { dir: PathBuf },
}

impl GridSource {
    pub fn remote(client: Client, sheet_id: impl Into<String>, retry: RetryPolicy) -> Self {
        GridSource::Remote {
            client,
            sheet_id: sheet_id.into(),
            retry,
        }
    }

    pub fn local(dir: impl Into<PathBuf>) -> Self {
        GridSource::Local { dir: dir.into() }
    }

    /// Raw gviz response body for `sheet`.
    pub async fn fetch_body(&self, sheet: &str) -> Result<String, RetrievalError> {
        match self {
            GridSource::Remote {
                client,
                sheet_id,
                retry,
            } => {
                let url = sheet_url(sheet_id, sheet)?;
                get_text_with_retry(client, &url, sheet, *retry).await
            }
            GridSource::Local { dir } => {
                let path = dir.join(format!("{}.txt", sheet));
                debug!(path = %path.display(), "reading saved sheet");
                fs::read_to_string(&path)
                    .await
                    .map_err(|source| RetrievalError::Io {
                        sheet: sheet.to_string(),
                        path: path.display().to_string(),
                        source,
                    })
            }
        }
    }

    /// Fetch `sheet` and decode it into a grid.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch_grid(&self, sheet: &str) -> Result<Grid, RetrievalError> {
        let body = self.fetch_body(sheet).await?;
        let grid = decode_response(sheet, &body)?;
        info!(rows = grid.len(), "fetched sheet");
        Ok(grid)
    }
}

/// `.../d/<id>/gviz/tq?sheet=<name>`, with the sheet name percent-encoded.
pub fn sheet_url(sheet_id: &str, sheet: &str) -> Result<Url, RetrievalError> {
    let mut url = Url::parse(SHEETS_BASE)
        .and_then(|base| base.join(&format!("{}/gviz/tq", sheet_id)))
        .map_err(|source| RetrievalError::Url {
            sheet: sheet.to_string(),
            source,
        })?;
    url.query_pairs_mut().append_pair("sheet", sheet);
    Ok(url)
}

async fn get_text(client: &Client, url: &Url, sheet: &str) -> Result<String, RetrievalError> {
    debug!("GET {}", url);
    let http = |source| RetrievalError::Http {
        sheet: sheet.to_string(),
        source,
    };
    client
        .get(url.clone())
        .send()
        .await
        .map_err(http)?
        .error_for_status()
        .map_err(http)?
        .text()
        .await
        .map_err(http)
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based), saturating instead of
    /// overflowing for large attempt counts.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// 4xx responses will not change on retry.
fn is_retryable(err: &RetrievalError) -> bool {
    match err {
        RetrievalError::Http { source, .. } => {
            !source.status().is_some_and(|s| s.is_client_error())
        }
        _ => true,
    }
}

async fn get_text_with_retry(
    client: &Client,
    url: &Url,
    sheet: &str,
    retry: RetryPolicy,
) -> Result<String, RetrievalError> {
    let mut attempts = 0;
    loop {
        match get_text(client, url, sheet).await {
            Ok(t) => return Ok(t),
            Err(e) if attempts < retry.max_retries && is_retryable(&e) => {
                attempts += 1;
                let backoff = retry.backoff(attempts);
                warn!(%url, attempt = attempts, delay_ms = backoff.as_millis() as u64, error = %e, "retrying");
                sleep(backoff).await;
            }
            Err(e) => {
                error!(%url, error = %e, "exhausted retries");
                return Err(e);
            }
        }
    }
}
