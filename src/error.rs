// src/error.rs

use thiserror::Error;

/// A sheet could not be retrieved or decoded. Fatal for the run.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("requesting sheet `{sheet}`")]
    Http {
        sheet: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("reading saved sheet `{sheet}` from {path}")]
    Io {
        sheet: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("sheet `{sheet}` response is not a gviz payload: {reason}")]
    Envelope { sheet: String, reason: String },

    #[error("decoding sheet `{sheet}` JSON")]
    Json {
        sheet: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("sheet `{sheet}` returned an error: {message}")]
    Sheet { sheet: String, message: String },

    #[error("building URL for sheet `{sheet}`")]
    Url {
        sheet: String,
        #[source]
        source: url::ParseError,
    },
}

/// A row or column label that has no primary letter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("label is empty")]
    Empty,
}

/// Malformed move notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("unexpected character `{found}` at byte {pos}")]
    Unexpected { found: char, pos: usize },

    #[error("unexpected end of notation, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("amount `{0}` is out of range")]
    Amount(String),
}

/// A single audio record that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("audio pair ({first:?}, {second:?}) has an empty label")]
    EmptyLabel {
        first: String,
        second: String,
        #[source]
        source: LabelError,
    },

    #[error("{table} entry for audio pair ({first:?}, {second:?}) cannot be inverted")]
    Notation {
        table: String,
        first: String,
        second: String,
        #[source]
        source: NotationError,
    },
}
