// src/pipeline.rs

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::Config;
use crate::fetch::GridSource;
use crate::output;
use crate::resolve::{ResolveStats, ResolvedRecord, Resolver};
use crate::table::{parse_letter_pairs, Grid};

/// The three fetched sheets.
#[derive(Debug, Clone, Default)]
pub struct Sheets {
    pub audio: Grid,
    pub corners: Grid,
    pub edges: Grid,
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<ResolvedRecord>,
    pub stats: ResolveStats,
    /// Audio records left out because they failed to resolve.
    pub skipped: usize,
}

/// Fetch all three sheets concurrently.
pub async fn fetch_sheets(source: &GridSource, cfg: &Config) -> Result<Sheets> {
    let (audio, corners, edges) = futures::try_join!(
        async {
            source
                .fetch_grid(&cfg.audio_sheet)
                .await
                .with_context(|| format!("fetching audio sheet `{}`", cfg.audio_sheet))
        },
        async {
            source
                .fetch_grid(&cfg.corner_sheet)
                .await
                .with_context(|| format!("fetching corner sheet `{}`", cfg.corner_sheet))
        },
        async {
            source
                .fetch_grid(&cfg.edge_sheet)
                .await
                .with_context(|| format!("fetching edge sheet `{}`", cfg.edge_sheet))
        },
    )?;
    Ok(Sheets {
        audio,
        corners,
        edges,
    })
}

/// Parse the sheets and resolve every audio pair.
///
/// Records that fail to resolve are skipped unless `strict` is set, in which
/// case the first failure is returned.
pub fn build_dataset(sheets: &Sheets, strict: bool) -> Result<Dataset> {
    let audio = parse_letter_pairs(&sheets.audio);
    let corners = parse_letter_pairs(&sheets.corners);
    let edges = parse_letter_pairs(&sheets.edges);
    info!(
        audio = audio.len(),
        corners = corners.len(),
        edges = edges.len(),
        "parsed letter pairs"
    );

    let resolver = Resolver::from_pairs(&corners, &edges);
    let dataset = if strict {
        let (records, stats) = resolver.resolve(&audio).context("resolving audio sheet")?;
        Dataset {
            records,
            stats,
            skipped: 0,
        }
    } else {
        let resolution = resolver.resolve_lenient(&audio);
        if !resolution.skipped.is_empty() {
            warn!(skipped = resolution.skipped.len(), "some audio records were skipped");
        }
        Dataset {
            records: resolution.records,
            stats: resolution.stats,
            skipped: resolution.skipped.len(),
        }
    };

    let ResolveStats { corners, edges } = dataset.stats;
    info!(
        records = dataset.records.len(),
        corners_direct = corners.direct,
        corners_inverted = corners.inverted,
        corners_missing = corners.missing,
        edges_direct = edges.direct,
        edges_inverted = edges.inverted,
        edges_missing = edges.missing,
        "resolved"
    );
    Ok(dataset)
}

/// Fetch, resolve and write all artifacts for `cfg`.
pub async fn run(source: &GridSource, cfg: &Config) -> Result<Vec<PathBuf>> {
    let sheets = fetch_sheets(source, cfg).await?;
    let dataset = build_dataset(&sheets, cfg.strict)?;
    if dataset.records.is_empty() {
        warn!(sheet = %cfg.audio_sheet, "audio sheet produced no records");
    }
    output::write_all(&cfg.out_dir, &dataset.records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::gviz::encode_response;
    use crate::output::{CSV_FILE, JSON_FILE, TEXT_FILE};
    use crate::resolve::TableStats;
    use crate::table::grid_from;
    use std::fs;
    use tempfile::tempdir;
    use tracing_subscriber::{fmt, EnvFilter};

    fn init_logging() {
        let _ = fmt()
            .with_env_filter(EnvFilter::new("debug"))
            .with_target(false)
            .with_test_writer()
            .try_init();
    }

    fn sheets() -> Sheets {
        Sheets {
            audio: grid_from(&[
                &["", "A", "B (BEE)"],
                &["A", "", "ba-memo"],
                &["B (BEE)", "memo-AB", ""],
            ]),
            corners: grid_from(&[&["", "A", "B"], &["A", "", "R U R'"], &["B", "", ""]]),
            edges: grid_from(&[&["", "A"], &["A", ""]]),
        }
    }

    #[test]
    fn builds_dataset_from_grids() {
        init_logging();
        let dataset = build_dataset(&sheets(), false).unwrap();
        assert_eq!(dataset.records.len(), 2);

        let ab = &dataset.records[0];
        assert_eq!((ab.first_main_letter, ab.second_main_letter), ('A', 'B'));
        assert_eq!(ab.second_alternate_letter, "BEE");
        assert_eq!(ab.corner_alg, "R U' R'");
        assert_eq!(ab.edge_alg, "");

        let ba = &dataset.records[1];
        assert_eq!(ba.memo, "ba-memo");
        assert_eq!(ba.corner_alg, "R U R'");

        assert_eq!(
            dataset.stats.corners,
            TableStats {
                direct: 1,
                inverted: 1,
                missing: 0
            }
        );
        assert_eq!(dataset.stats.edges.missing, 2);
    }

    #[test]
    fn empty_labels_are_skipped_by_default_and_fatal_when_strict() {
        init_logging();
        let mut bad = sheets();
        bad.audio = grid_from(&[&["", "A", ""], &["B", "ab", "orphan"]]);

        let dataset = build_dataset(&bad, false).unwrap();
        assert_eq!(dataset.records.len(), 1);
        assert_eq!(dataset.records[0].memo, "ab");
        assert_eq!(dataset.skipped, 1);

        let err = build_dataset(&bad, true).unwrap_err();
        let chain = format!("{:#}", err);
        assert!(chain.contains("empty label"), "{}", chain);
        // each cause appears once in the chain
        assert_eq!(chain.matches("label is empty").count(), 1, "{}", chain);
    }

    #[tokio::test]
    async fn run_with_an_empty_audio_label_still_writes_artifacts() -> Result<()> {
        init_logging();
        let saved = tempdir()?;
        let out = tempdir()?;
        fs::write(
            saved.path().join("Audio.txt"),
            encode_response(&[&["", "A", ""], &["B", "ab", "orphan"]]),
        )?;
        fs::write(saved.path().join("UFR Corners.txt"), encode_response(&[&[""]]))?;
        fs::write(saved.path().join("UF Edges.txt"), encode_response(&[&[""]]))?;

        let cfg = Config {
            local_dir: Some(saved.path().to_path_buf()),
            out_dir: out.path().to_path_buf(),
            ..Config::default()
        };
        let source = cfg.source(reqwest::Client::new());
        run(&source, &cfg).await?;
        assert_eq!(fs::read_to_string(out.path().join(TEXT_FILE))?, "AB-ab");
        assert!(out.path().join(CSV_FILE).exists());
        assert!(out.path().join(JSON_FILE).exists());

        let strict = Config {
            strict: true,
            out_dir: out.path().join("strict"),
            ..cfg
        };
        assert!(run(&source, &strict).await.is_err());
        assert!(!strict.out_dir.join(TEXT_FILE).exists());
        Ok(())
    }

    #[tokio::test]
    async fn run_writes_artifacts_from_saved_sheets() -> Result<()> {
        init_logging();
        let saved = tempdir()?;
        let out = tempdir()?;
        fs::write(
            saved.path().join("Audio.txt"),
            encode_response(&[&["", "A"], &["B (BEE)", "memo-AB"]]),
        )?;
        fs::write(
            saved.path().join("UFR Corners.txt"),
            encode_response(&[&["", "B"], &["A", "R U R'"]]),
        )?;
        fs::write(saved.path().join("UF Edges.txt"), encode_response(&[&[""]]))?;

        let cfg = Config {
            local_dir: Some(saved.path().to_path_buf()),
            out_dir: out.path().to_path_buf(),
            ..Config::default()
        };
        let source = cfg.source(reqwest::Client::new());
        let paths = run(&source, &cfg).await?;
        assert_eq!(paths.len(), 3);

        assert_eq!(fs::read_to_string(out.path().join(TEXT_FILE))?, "AB-memo-AB");
        assert_eq!(
            fs::read_to_string(out.path().join(CSV_FILE))?.trim_end(),
            "A;B;A;BEE;memo-AB;;R U' R'"
        );
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.path().join(JSON_FILE))?)?;
        assert_eq!(json[0]["cornerAlg"], "R U' R'");
        assert_eq!(json[0]["secondAlternateLetter"], "BEE");
        Ok(())
    }

    #[tokio::test]
    async fn missing_sheet_reports_which_one() {
        let saved = tempdir().unwrap();
        fs::write(
            saved.path().join("Audio.txt"),
            encode_response(&[&["", "A"], &["B", "m"]]),
        )
        .unwrap();
        let cfg = Config {
            local_dir: Some(saved.path().to_path_buf()),
            ..Config::default()
        };
        let err = fetch_sheets(&cfg.source(reqwest::Client::new()), &cfg)
            .await
            .unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("UFR Corners") || msg.contains("UF Edges"), "{}", msg);
    }
}
