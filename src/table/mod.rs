// src/table/mod.rs

pub mod letters;

pub use letters::{alternate_label, primary_code};

/// One cell of a fetched sheet. `None` and `Some("")` are both empty.
pub type RawCell = Option<String>;

/// A sheet as rows of cells. Row 0 holds the column labels and column 0 the
/// row labels; cell (0, 0) is unused.
pub type Grid = Vec<Vec<RawCell>>;

/// A non-empty intersection cell together with its raw axis labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterPair {
    /// Column label, from the header row.
    pub first_letter: String,
    /// Row label, from the header column.
    pub second_letter: String,
    pub data: String,
}

fn cell(grid: &Grid, row: usize, col: usize) -> &str {
    grid.get(row)
        .and_then(|r| r.get(col))
        .and_then(|c| c.as_deref())
        .unwrap_or("")
}

/// Flatten a grid into letter pairs, column-major: every row of column 1,
/// then every row of column 2, and so on.
///
/// Column count comes from the header row, row count from the grid height.
/// Cells missing from short rows are treated as empty.
pub fn parse_letter_pairs(grid: &Grid) -> Vec<LetterPair> {
    let Some(header) = grid.first() else {
        return Vec::new();
    };
    let cols = header.len();
    let rows = grid.len();

    let mut pairs = Vec::new();
    for c in 1..cols {
        for r in 1..rows {
            let data = cell(grid, r, c);
            if data.is_empty() {
                continue;
            }
            pairs.push(LetterPair {
                first_letter: cell(grid, 0, c).to_string(),
                second_letter: cell(grid, r, 0).to_string(),
                data: data.to_string(),
            });
        }
    }
    pairs
}

#[cfg(test)]
pub(crate) fn grid_from(rows: &[&[&str]]) -> Grid {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|s| if s.is_empty() { None } else { Some(s.to_string()) })
                .collect()
        })
        .collect()
}
