use std::collections::{hash_map::Entry, HashMap};
use tracing::{debug, warn};

use crate::error::NotationError;
use crate::notation;
use crate::table::{primary_code, LetterPair};

/// Outcome of looking a canonical pair up in one algorithm table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Stored under the queried pair; the cell text as written.
    Direct(String),
    /// Stored only under the reversed pair; the inverse of that cell.
    Inverted(String),
    /// Neither order is present.
    Missing,
}

impl Lookup {
    pub fn into_alg(self) -> String {
        match self {
            Lookup::Direct(alg) | Lookup::Inverted(alg) => alg,
            Lookup::Missing => String::new(),
        }
    }
}

/// An algorithm table keyed by canonical `(first, second)` letters.
///
/// When two cells share a canonical pair, the one earlier in table order is
/// kept.
#[derive(Debug, Clone)]
pub struct AlgIndex {
    name: String,
    by_pair: HashMap<(char, char), String>,
}

impl AlgIndex {
    pub fn build(name: impl Into<String>, pairs: &[LetterPair]) -> Self {
        let name = name.into();
        let mut by_pair = HashMap::with_capacity(pairs.len());

        for pair in pairs {
            let key = match (
                primary_code(&pair.first_letter),
                primary_code(&pair.second_letter),
            ) {
                (Ok(first), Ok(second)) => (first, second),
                _ => {
                    warn!(
                        table = %name,
                        first = %pair.first_letter,
                        second = %pair.second_letter,
                        "skipping entry with empty label"
                    );
                    continue;
                }
            };

            match by_pair.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(pair.data.clone());
                }
                Entry::Occupied(kept) => {
                    debug!(
                        table = %name,
                        first = %key.0,
                        second = %key.1,
                        kept = %kept.get(),
                        ignored = %pair.data,
                        "duplicate canonical pair"
                    );
                }
            }
        }

        Self { name, by_pair }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.by_pair.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_pair.is_empty()
    }

    pub fn get(&self, first: char, second: char) -> Option<&str> {
        self.by_pair.get(&(first, second)).map(String::as_str)
    }

    /// Direct match first, then the inverse of the reversed pair.
    pub fn lookup(&self, first: char, second: char) -> Result<Lookup, NotationError> {
        if let Some(alg) = self.get(first, second) {
            return Ok(Lookup::Direct(alg.to_string()));
        }
        match self.get(second, first) {
            Some(alg) => Ok(Lookup::Inverted(notation::invert(alg)?)),
            None => Ok(Lookup::Missing),
        }
    }
}
