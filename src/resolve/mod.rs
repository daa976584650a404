// src/resolve/mod.rs

pub mod index;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::ResolveError;
use crate::table::{alternate_label, primary_code, LetterPair};

pub use index::{AlgIndex, Lookup};

/// One memo together with its corner and edge algorithms.
///
/// Field order is the column order of the CSV export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRecord {
    pub first_main_letter: char,
    pub second_main_letter: char,
    pub first_alternate_letter: String,
    pub second_alternate_letter: String,
    pub memo: String,
    pub edge_alg: String,
    pub corner_alg: String,
}

/// How each algorithm field of a table was filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    pub direct: usize,
    pub inverted: usize,
    pub missing: usize,
}

impl TableStats {
    fn count(&mut self, lookup: &Lookup) {
        match lookup {
            Lookup::Direct(_) => self.direct += 1,
            Lookup::Inverted(_) => self.inverted += 1,
            Lookup::Missing => self.missing += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub corners: TableStats,
    pub edges: TableStats,
}

/// Output of a lenient run: what resolved, and the records that did not.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub records: Vec<ResolvedRecord>,
    pub skipped: Vec<ResolveError>,
    pub stats: ResolveStats,
}

/// Cross-references audio pairs against the corner and edge tables.
#[derive(Debug, Clone)]
pub struct Resolver {
    corners: AlgIndex,
    edges: AlgIndex,
}

impl Resolver {
    pub fn new(corners: AlgIndex, edges: AlgIndex) -> Self {
        Self { corners, edges }
    }

    /// Index both algorithm tables.
    pub fn from_pairs(corner_pairs: &[LetterPair], edge_pairs: &[LetterPair]) -> Self {
        let corners = AlgIndex::build("corners", corner_pairs);
        let edges = AlgIndex::build("edges", edge_pairs);
        info!(
            corners = corners.len(),
            edges = edges.len(),
            "indexed algorithm tables"
        );
        Self::new(corners, edges)
    }

    fn lookup(
        &self,
        table: &AlgIndex,
        audio: &LetterPair,
        first: char,
        second: char,
    ) -> Result<Lookup, ResolveError> {
        let found = table
            .lookup(first, second)
            .map_err(|source| ResolveError::Notation {
                table: table.name().to_string(),
                first: audio.first_letter.clone(),
                second: audio.second_letter.clone(),
                source,
            })?;
        if found == Lookup::Missing {
            debug!(table = table.name(), %first, %second, "no algorithm in either order");
        }
        Ok(found)
    }

    fn resolve_counted(
        &self,
        audio: &LetterPair,
        stats: &mut ResolveStats,
    ) -> Result<ResolvedRecord, ResolveError> {
        let empty_label = |source| ResolveError::EmptyLabel {
            first: audio.first_letter.clone(),
            second: audio.second_letter.clone(),
            source,
        };
        let first = primary_code(&audio.first_letter).map_err(empty_label)?;
        let second = primary_code(&audio.second_letter).map_err(empty_label)?;

        let corner = self.lookup(&self.corners, audio, first, second)?;
        let edge = self.lookup(&self.edges, audio, first, second)?;
        stats.corners.count(&corner);
        stats.edges.count(&edge);

        Ok(ResolvedRecord {
            first_main_letter: first,
            second_main_letter: second,
            first_alternate_letter: alternate_label(&audio.first_letter),
            second_alternate_letter: alternate_label(&audio.second_letter),
            memo: audio.data.clone(),
            edge_alg: edge.into_alg(),
            corner_alg: corner.into_alg(),
        })
    }

    /// Resolve a single audio pair.
    pub fn resolve_one(&self, audio: &LetterPair) -> Result<ResolvedRecord, ResolveError> {
        self.resolve_counted(audio, &mut ResolveStats::default())
    }

    /// Resolve every audio pair in order, stopping at the first failure.
    pub fn resolve(
        &self,
        audio: &[LetterPair],
    ) -> Result<(Vec<ResolvedRecord>, ResolveStats), ResolveError> {
        let mut stats = ResolveStats::default();
        let records = audio
            .iter()
            .map(|pair| self.resolve_counted(pair, &mut stats))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((records, stats))
    }

    /// Resolve every audio pair in order, setting failing ones aside.
    pub fn resolve_lenient(&self, audio: &[LetterPair]) -> Resolution {
        let mut out = Resolution::default();
        for pair in audio {
            match self.resolve_counted(pair, &mut out.stats) {
                Ok(record) => out.records.push(record),
                Err(e) => {
                    error!(
                        error = %e,
                        cause = ?std::error::Error::source(&e).map(|c| c.to_string()),
                        "skipping record"
                    );
                    out.skipped.push(e);
                }
            }
        }
        out
    }
}
