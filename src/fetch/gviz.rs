// src/fetch/gviz.rs

use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

use crate::error::RetrievalError;
use crate::table::{Grid, RawCell};

const RESPONSE_CALLBACK: &str = "setResponse";

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    errors: Vec<ResponseError>,
    #[serde(default)]
    table: Option<Table>,
}

#[derive(Debug, Deserialize)]
struct ResponseError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detailed_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Table {
    #[serde(default)]
    rows: Vec<Row>,
}

#[derive(Debug, Deserialize)]
struct Row {
    #[serde(default)]
    c: Vec<Option<Cell>>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    #[serde(default)]
    v: Value,
}

/// Pull the JSON object out of a `google.visualization.Query.setResponse(...)`
/// wrapper. The body usually starts with a `/*O_o*/` line, which is skipped.
fn unwrap_envelope<'a>(sheet: &str, body: &'a str) -> Result<&'a str, RetrievalError> {
    let envelope = |reason: &str| RetrievalError::Envelope {
        sheet: sheet.to_string(),
        reason: reason.to_string(),
    };

    let call = body
        .find(RESPONSE_CALLBACK)
        .ok_or_else(|| envelope("missing setResponse call"))?;
    let rest = &body[call + RESPONSE_CALLBACK.len()..];
    let open = rest
        .find('(')
        .ok_or_else(|| envelope("missing `(` after setResponse"))?;
    let close = rest
        .rfind(')')
        .filter(|&close| close > open)
        .ok_or_else(|| envelope("missing closing `)`"))?;
    Ok(rest[open + 1..close].trim())
}

fn cell_text(value: Value) -> RawCell {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", f as i64)),
            _ => Some(n.to_string()),
        },
        other => Some(other.to_string()),
    }
}

/// Decode a gviz response body into a grid of cell values.
pub fn decode_response(sheet: &str, body: &str) -> Result<Grid, RetrievalError> {
    let json = unwrap_envelope(sheet, body)?;
    let response: Response =
        serde_json::from_str(json).map_err(|source| RetrievalError::Json {
            sheet: sheet.to_string(),
            source,
        })?;

    if response.status.as_deref() == Some("error") {
        let message = response
            .errors
            .iter()
            .filter_map(|e| e.detailed_message.as_deref().or(e.message.as_deref()))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(RetrievalError::Sheet {
            sheet: sheet.to_string(),
            message: if message.is_empty() {
                "unknown error".to_string()
            } else {
                message
            },
        });
    }

    let table = response.table.ok_or_else(|| RetrievalError::Envelope {
        sheet: sheet.to_string(),
        reason: "response has no table".to_string(),
    })?;

    let grid: Grid = table
        .rows
        .into_iter()
        .map(|row| {
            row.c
                .into_iter()
                .map(|cell| cell.and_then(|c| cell_text(c.v)))
                .collect()
        })
        .collect();
    trace!(sheet, rows = grid.len(), "decoded gviz table");
    Ok(grid)
}

#[cfg(test)]
pub(crate) fn encode_response(grid: &[&[&str]]) -> String {
    let rows: Vec<Value> = grid
        .iter()
        .map(|row| {
            let cells: Vec<Value> = row
                .iter()
                .map(|s| {
                    if s.is_empty() {
                        Value::Null
                    } else {
                        serde_json::json!({ "v": s })
                    }
                })
                .collect();
            serde_json::json!({ "c": cells })
        })
        .collect();
    let payload = serde_json::json!({
        "version": "0.6",
        "status": "ok",
        "table": { "cols": [], "rows": rows },
    });
    format!(
        "/*O_o*/\ngoogle.visualization.Query.setResponse({});",
        payload
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_wrapped_table() {
        let body = r#"/*O_o*/
google.visualization.Query.setResponse({"version":"0.6","reqId":"0","status":"ok","sig":"1","table":{"cols":[],"rows":[{"c":[null,{"v":"A"},{"v":"B (BEE)"}]},{"c":[{"v":"A"},null,{"v":"R U R'"}]},{"c":[{"v":"C"},{"v":""},{"v":3.0}]}]}});"#;
        let grid = decode_response("Audio", body).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0], vec![None, Some("A".into()), Some("B (BEE)".into())]);
        assert_eq!(grid[1][2].as_deref(), Some("R U R'"));
        assert_eq!(grid[2][1], None);
        assert_eq!(grid[2][2].as_deref(), Some("3"));
    }

    #[test]
    fn text_containing_parentheses_survives_unwrapping() {
        let body = encode_response(&[&["", "A (CH)"], &["B", "(R U)2"]]);
        let grid = decode_response("Audio", &body).unwrap();
        assert_eq!(grid[0][1].as_deref(), Some("A (CH)"));
        assert_eq!(grid[1][1].as_deref(), Some("(R U)2"));
    }

    #[test]
    fn error_status_is_reported_with_sheet_name() {
        let body = r#"/*O_o*/
google.visualization.Query.setResponse({"version":"0.6","status":"error","errors":[{"reason":"invalid_query","message":"INVALID_QUERY","detailed_message":"Invalid sheet Nope"}]});"#;
        let err = decode_response("Nope", body).unwrap_err();
        match &err {
            RetrievalError::Sheet { sheet, message } => {
                assert_eq!(sheet, "Nope");
                assert_eq!(message, "Invalid sheet Nope");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn rejects_non_gviz_bodies() {
        assert!(matches!(
            decode_response("Audio", "<html>sign in</html>"),
            Err(RetrievalError::Envelope { .. })
        ));
        assert!(matches!(
            decode_response("Audio", "google.visualization.Query.setResponse({nope});"),
            Err(RetrievalError::Json { .. })
        ));
    }
}
