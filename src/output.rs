// src/output.rs

use anyhow::{Context, Result};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::resolve::ResolvedRecord;

pub const JSON_FILE: &str = "data.json";
pub const CSV_FILE: &str = "data.csv";
pub const TEXT_FILE: &str = "data.txt";

/// Full-fidelity debug dump: a pretty-printed JSON array.
pub fn write_json<W: Write>(mut out: W, records: &[ResolvedRecord]) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, records).context("serializing records to JSON")?;
    Ok(())
}

/// Flashcard import: `;`-separated, no header row, one line per record.
pub fn write_csv<W: Write>(out: W, records: &[ResolvedRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_writer(out);
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("writing CSV row for {}", quiz_card(record)))?;
    }
    writer.flush().context("flushing CSV writer")?;
    Ok(())
}

fn quiz_card(record: &ResolvedRecord) -> String {
    format!(
        "{}{}-{}",
        record.first_main_letter, record.second_main_letter, record.memo
    )
}

/// Quiz import: `{first}{second}-{memo}` cards joined by `;`.
pub fn quiz_text(records: &[ResolvedRecord]) -> String {
    records.iter().map(quiz_card).collect::<Vec<_>>().join(";")
}

fn write_file<F>(path: &Path, render: F) -> Result<()>
where
    F: FnOnce(&mut fs::File) -> Result<()>,
{
    let mut file =
        fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    render(&mut file).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Write `data.json`, `data.csv` and `data.txt` into `dir`, creating it if
/// needed. Returns the written paths.
pub fn write_all(dir: &Path, records: &[ResolvedRecord]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let json_path = dir.join(JSON_FILE);
    write_file(&json_path, |f| write_json(f, records))?;

    let csv_path = dir.join(CSV_FILE);
    write_file(&csv_path, |f| write_csv(f, records))?;

    let text_path = dir.join(TEXT_FILE);
    write_file(&text_path, |f| {
        f.write_all(quiz_text(records).as_bytes())?;
        Ok(())
    })?;

    info!(records = records.len(), dir = %dir.display(), "wrote outputs");
    Ok(vec![json_path, csv_path, text_path])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn records() -> Vec<ResolvedRecord> {
        vec![
            ResolvedRecord {
                first_main_letter: 'A',
                second_main_letter: 'B',
                first_alternate_letter: "A".into(),
                second_alternate_letter: "BEE".into(),
                memo: "memo-AB".into(),
                edge_alg: "".into(),
                corner_alg: "R U' R'".into(),
            },
            ResolvedRecord {
                first_main_letter: 'C',
                second_main_letter: 'D',
                first_alternate_letter: "CH".into(),
                second_alternate_letter: "D".into(),
                memo: "cat; dog".into(),
                edge_alg: "M2".into(),
                corner_alg: "".into(),
            },
        ]
    }

    #[test]
    fn csv_has_no_header_and_uses_semicolons() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &records()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "A;B;A;BEE;memo-AB;;R U' R'",
                "C;D;CH;D;\"cat; dog\";M2;",
            ]
        );
    }

    #[test]
    fn json_uses_camel_case_in_declaration_order() {
        let mut buf = Vec::new();
        write_json(&mut buf, &records()[..1]).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let keys = [
            "firstMainLetter",
            "secondMainLetter",
            "firstAlternateLetter",
            "secondAlternateLetter",
            "memo",
            "edgeAlg",
            "cornerAlg",
        ];
        let positions: Vec<usize> = keys
            .iter()
            .map(|k| text.find(&format!("\"{}\"", k)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        let back: Vec<ResolvedRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, records()[..1].to_vec());
    }

    #[test]
    fn quiz_text_joins_cards() {
        assert_eq!(quiz_text(&records()), "AB-memo-AB;CD-cat; dog");
        assert_eq!(quiz_text(&[]), "");
    }

    #[test]
    fn writes_all_three_artifacts() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let paths = write_all(&out, &records()).unwrap();
        assert_eq!(paths.len(), 3);
        for p in &paths {
            assert!(p.exists(), "{} missing", p.display());
        }
        let txt = fs::read_to_string(out.join(TEXT_FILE)).unwrap();
        assert_eq!(txt, "AB-memo-AB;CD-cat; dog");
    }
}
