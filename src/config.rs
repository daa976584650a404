// src/config.rs

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::fetch::{GridSource, RetryPolicy};

pub const DEFAULT_SHEET_ID: &str = "1NEYh8MeTqHwnwA4s_CAYBGWU76pqdlutxR0SA2hNZKk";

/// Run settings. Every field has a default, so a YAML file only needs the
/// keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub sheet_id: String,
    pub audio_sheet: String,
    pub corner_sheet: String,
    pub edge_sheet: String,
    pub out_dir: PathBuf,
    /// Read `<sheet>.txt` response bodies from here instead of fetching.
    pub local_dir: Option<PathBuf>,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    /// Abort on the first audio record that fails to resolve. Otherwise
    /// such records are logged and left out of the outputs.
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sheet_id: DEFAULT_SHEET_ID.to_string(),
            audio_sheet: "Audio".to_string(),
            corner_sheet: "UFR Corners".to_string(),
            edge_sheet: "UF Edges".to_string(),
            out_dir: PathBuf::from("."),
            local_dir: None,
            max_retries: 3,
            initial_backoff_ms: 500,
            strict: false,
        }
    }
}

impl Config {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parsing YAML config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("in config {}", path.display()))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
        }
    }

    /// The table source this configuration points at.
    pub fn source(&self, client: Client) -> GridSource {
        match &self.local_dir {
            Some(dir) => GridSource::local(dir),
            None => GridSource::remote(client, &self.sheet_id, self.retry_policy()),
        }
    }
}
