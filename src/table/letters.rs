use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::LabelError;

static ALTERNATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((.+)\)").expect("alternate label regex should compile"));

/// The primary letter of a raw label: its first character.
///
/// `"A (CH)"` → `'A'`. An empty label has no primary letter.
pub fn primary_code(label: &str) -> Result<char, LabelError> {
    label.chars().next().ok_or(LabelError::Empty)
}

/// The alias written in parentheses, e.g. `"A (CH)"` → `"CH"`.
///
/// A label without a parenthetical is returned unchanged, so the result is
/// not necessarily a distinct alias.
pub fn alternate_label(label: &str) -> String {
    ALTERNATE_RE
        .captures(label)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_primary_and_alternate() {
        assert_eq!(primary_code("A (CH)"), Ok('A'));
        assert_eq!(alternate_label("A (CH)"), "CH");
    }

    #[test]
    fn label_without_parenthetical_is_its_own_alternate() {
        assert_eq!(primary_code("A"), Ok('A'));
        assert_eq!(alternate_label("A"), "A");
    }

    #[test]
    fn empty_label_has_no_primary_code() {
        assert_eq!(primary_code(""), Err(LabelError::Empty));
        assert_eq!(alternate_label(""), "");
    }

    #[test]
    fn multibyte_first_character() {
        assert_eq!(primary_code("Ö (OE)"), Ok('Ö'));
    }

    #[test]
    fn greedy_parenthetical_spans_to_last_close() {
        assert_eq!(alternate_label("A (B) (C)"), "B) (C");
        // "()" has nothing for `.+` to match
        assert_eq!(alternate_label("A ()"), "A ()");
    }
}
