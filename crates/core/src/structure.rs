//! Row classification and the fold that builds the reading stream.
//!
//! Each normalized row is classified once by [`classify_row`], which walks an
//! ordered rule table and returns the first matching [`RowKind`]. The fold in
//! [`fold_rows`] only looks one row back: it decides which pause punctuation
//! the stream needs before the next row is appended.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowKind {
    /// A numbered question, section heading, lettered section or specimen label.
    NewQuestion,
    /// A sub-item or multiple-choice option of the current question.
    SubQuestion,
    /// Same sentence as the previous row.
    Continuation,
}

/// Rules in evaluation order. Options and sub-items come first so that `(a)`
/// and `1)` never reach the question-numbering rules.
const RULES: &[(&str, RowKind)] = &[
    (r"^\s*\([a-dA-D]\)", RowKind::SubQuestion),
    (r"^\s*\([0-9]{1,2}\)", RowKind::SubQuestion),
    (
        r"(?i)^\s*\(?(?:xi{0,2}|ix|iv|vi{0,3}|i{1,3})[.)](?:\s|$)",
        RowKind::SubQuestion,
    ),
    (r"^\s*[0-9]\)", RowKind::SubQuestion),
    (r"^\s*[A-D]:\s", RowKind::SubQuestion),
    (r"(?i)^\s*question\s+[0-9]+", RowKind::NewQuestion),
    (r"^\s*[0-9]+[.):]", RowKind::NewQuestion),
    (
        r"^\s*(?:SECTION\b|(?i:section)\s+(?:[A-Z]|[0-9]+|[IVX]+)\b)",
        RowKind::NewQuestion,
    ),
    (r"(?i)^\s*[a-z][.)](?:\s|$)", RowKind::NewQuestion),
    (r"(?i)^\s*specimen\s+[a-z]\b", RowKind::NewQuestion),
];

fn rules() -> &'static [(Regex, RowKind)] {
    static COMPILED: OnceLock<Vec<(Regex, RowKind)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        RULES
            .iter()
            .map(|(pattern, kind)| (Regex::new(pattern).unwrap(), *kind))
            .collect()
    })
}

/// Classify a single row.
pub fn classify_row(row: &str) -> RowKind {
    rules()
        .iter()
        .find(|(re, _)| re.is_match(row))
        .map(|(_, kind)| *kind)
        .unwrap_or(RowKind::Continuation)
}

/// Classify every non-empty row, trimming it.
pub fn classify_rows(rows: &[String]) -> Vec<(RowKind, String)> {
    rows.iter()
        .map(|row| row.trim())
        .filter(|row| !row.is_empty())
        .map(|row| (classify_row(row), row.to_string()))
        .collect()
}

const BOUNDARY: [char; 6] = ['.', '!', '?', ':', ';', ','];

/// Append `pause` unless the stream already ends in boundary punctuation.
fn ensure_boundary(stream: &mut String, pause: char) {
    if !stream.trim_end().ends_with(BOUNDARY) {
        let len = stream.trim_end().len();
        stream.truncate(len);
        stream.push(pause);
    }
}

/// Fold rows into one reading stream with pause punctuation between them.
///
/// A sub-item that follows question text closes that sentence with `.`;
/// consecutive sub-items are separated with `,`. The result ends in `.`, `!`
/// or `?`; a trailing `,`, `;` or `:` is turned into `.`. An empty row list
/// yields an empty stream.
pub fn fold_rows(rows: &[String]) -> String {
    let mut stream = String::new();
    let mut previous: Option<RowKind> = None;

    for (kind, row) in classify_rows(rows) {
        if previous.is_some() {
            match kind {
                RowKind::NewQuestion => ensure_boundary(&mut stream, '.'),
                RowKind::SubQuestion if previous == Some(RowKind::SubQuestion) => {
                    ensure_boundary(&mut stream, ',')
                }
                RowKind::SubQuestion => ensure_boundary(&mut stream, '.'),
                // After a trailing ':' the row opens a new segment; the colon
                // is already the pause, so both cases join with a space.
                RowKind::Continuation => {}
            }
            stream.push(' ');
        }
        stream.push_str(&row);
        previous = Some(kind);
    }

    terminate(stream)
}

fn terminate(stream: String) -> String {
    let trimmed = stream.trim_end();
    if trimmed.is_empty() || trimmed.ends_with(['.', '!', '?']) {
        return trimmed.to_string();
    }
    let base = trimmed.trim_end_matches([',', ';', ':']).trim_end();
    format!("{base}.")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classify_numbered_question() {
        assert_eq!(classify_row("27. Explain soil types"), RowKind::NewQuestion);
        assert_eq!(classify_row("3: Name two gases"), RowKind::NewQuestion);
        assert_eq!(classify_row("Question 4 Define osmosis"), RowKind::NewQuestion);
        assert_eq!(classify_row("12) Draw the cell"), RowKind::NewQuestion);
    }

    #[test]
    fn test_classify_section_and_specimen() {
        assert_eq!(classify_row("SECTION B"), RowKind::NewQuestion);
        assert_eq!(classify_row("Section 2 Genetics"), RowKind::NewQuestion);
        assert_eq!(classify_row("section C"), RowKind::NewQuestion);
        assert_eq!(classify_row("Specimen C: a dry leaf"), RowKind::NewQuestion);
    }

    #[test]
    fn test_classify_lettered_section() {
        assert_eq!(classify_row("a) Describe the root"), RowKind::NewQuestion);
        assert_eq!(classify_row("b. Describe the stem"), RowKind::NewQuestion);
    }

    #[test]
    fn test_bracketed_option_is_not_a_new_question() {
        assert_eq!(classify_row("(a) sandy"), RowKind::SubQuestion);
        assert_eq!(classify_row("(D) loam"), RowKind::SubQuestion);
    }

    #[test]
    fn test_classify_sub_items() {
        assert_eq!(classify_row("(2) name the parts"), RowKind::SubQuestion);
        assert_eq!(classify_row("ii. label it"), RowKind::SubQuestion);
        assert_eq!(classify_row("iv) explain"), RowKind::SubQuestion);
        assert_eq!(classify_row("1) first part"), RowKind::SubQuestion);
        assert_eq!(classify_row("B: clay."), RowKind::SubQuestion);
    }

    #[test]
    fn test_classify_continuation() {
        assert_eq!(classify_row("of the plant and its roots"), RowKind::Continuation);
        assert_eq!(classify_row("in 1990 the"), RowKind::Continuation);
        assert_eq!(
            classify_row("Section of a leaf shows the veins"),
            RowKind::Continuation
        );
    }

    #[test]
    fn test_structural_punctuation() {
        let stream = fold_rows(&rows(&["27. Explain soil types", "(a) sandy", "(b) clay"]));
        assert_eq!(stream, "27. Explain soil types. (a) sandy, (b) clay.");
    }

    #[test]
    fn test_continuation_joins_without_pause() {
        let stream = fold_rows(&rows(&["1. Describe the structure", "of a leaf"]));
        assert_eq!(stream, "1. Describe the structure of a leaf.");
    }

    #[test]
    fn test_existing_punctuation_kept() {
        let stream = fold_rows(&rows(&["What is soil?", "2. Name a gas"]));
        assert_eq!(stream, "What is soil? 2. Name a gas.");
    }

    #[test]
    fn test_colon_introduces_list() {
        let stream = fold_rows(&rows(&["Study the list:", "roots stems leaves"]));
        assert_eq!(stream, "Study the list: roots stems leaves.");
    }

    #[test]
    fn test_trailing_pause_becomes_period() {
        let stream = fold_rows(&rows(&["1. Choose", "(a) yes", "(b) no,"]));
        assert_eq!(stream, "1. Choose. (a) yes, (b) no.");
    }

    #[test]
    fn test_empty_rows() {
        assert_eq!(fold_rows(&[]), "");
        assert_eq!(fold_rows(&rows(&["  ", ""])), "");
    }
}
