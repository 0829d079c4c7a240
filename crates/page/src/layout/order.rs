//! Reading order: lines into rows, rows top to bottom.
//!
//! Block grouping from the recognizer is advisory and discarded. Lines are
//! sorted by `top` (then `left`); a row is anchored at its first line's `top`
//! and takes every following line within [`PipelineConfig::row_threshold`]
//! pixels of that anchor. Members of a row read left to right.

use std::cmp::Ordering;

use readaloud_core::{Lexicon, PipelineConfig};

use super::words::reconstruct_line;
use super::{CLOSING, OPENING};
use crate::types::{Block, BoundingBox, Line};

fn by_top_then_left(a: &BoundingBox, b: &BoundingBox) -> Ordering {
    a.top
        .partial_cmp(&b.top)
        .unwrap_or(Ordering::Equal)
        .then(a.left.partial_cmp(&b.left).unwrap_or(Ordering::Equal))
}

/// Every line of every block, ignoring block boundaries.
pub fn flatten_lines(blocks: &[Block]) -> Vec<&Line> {
    blocks.iter().flat_map(|b| b.lines.iter()).collect()
}

/// Group lines into rows. Lines without elements are skipped.
pub fn group_rows(lines: Vec<&Line>, threshold: f32) -> Vec<Vec<&Line>> {
    let mut placed: Vec<(BoundingBox, &Line)> = lines
        .into_iter()
        .filter_map(|line| line.bbox().map(|bbox| (bbox, line)))
        .collect();
    if placed.is_empty() {
        return Vec::new();
    }
    placed.sort_by(|(a, _), (b, _)| by_top_then_left(a, b));

    let mut rows: Vec<Vec<(BoundingBox, &Line)>> = Vec::new();
    let mut anchor = placed[0].0.top;
    let mut current: Vec<(BoundingBox, &Line)> = Vec::new();

    for (bbox, line) in placed {
        if !current.is_empty() && (bbox.top - anchor).abs() >= threshold {
            rows.push(std::mem::take(&mut current));
            anchor = bbox.top;
        }
        current.push((bbox, line));
    }
    if !current.is_empty() {
        rows.push(current);
    }

    rows.into_iter()
        .map(|mut row| {
            row.sort_by(|(a, _), (b, _)| {
                a.left.partial_cmp(&b.left).unwrap_or(Ordering::Equal)
            });
            row.into_iter().map(|(_, line)| line).collect()
        })
        .collect()
}

/// Join parts with single spaces, but never directly after an opening
/// bracket or directly before a closing one.
pub fn join_row_parts<S: AsRef<str>>(parts: &[S]) -> String {
    let mut joined = String::new();
    for part in parts.iter().map(|p| p.as_ref().trim()) {
        if part.is_empty() {
            continue;
        }
        if !joined.is_empty() && !joined.ends_with(OPENING) && !part.starts_with(CLOSING) {
            joined.push(' ');
        }
        joined.push_str(part);
    }
    joined
}

fn order_refs(lines: Vec<&Line>, config: &PipelineConfig, lexicon: &Lexicon) -> Vec<String> {
    group_rows(lines, config.row_threshold)
        .into_iter()
        .map(|row| {
            let parts: Vec<String> = row
                .into_iter()
                .map(|line| reconstruct_line(line, config, lexicon))
                .collect();
            join_row_parts(&parts)
        })
        .filter(|row| !row.is_empty())
        .collect()
}

/// Ordered row strings for a set of lines.
pub fn order_lines(lines: &[Line], config: &PipelineConfig, lexicon: &Lexicon) -> Vec<String> {
    order_refs(lines.iter().collect(), config, lexicon)
}

/// Ordered row strings for a page's blocks.
pub fn order_blocks(blocks: &[Block], config: &PipelineConfig, lexicon: &Lexicon) -> Vec<String> {
    let rows = order_refs(flatten_lines(blocks), config, lexicon);
    log::debug!("ordered {} blocks into {} rows", blocks.len(), rows.len());
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Element;

    fn make_line(text: &str, left: f32, top: f32) -> Line {
        let width = text.chars().count() as f32 * 10.0;
        Line::new(vec![Element::new(
            text,
            BoundingBox::new(left, top, left + width, top + 12.0),
        )])
    }

    fn order(lines: Vec<Line>) -> Vec<String> {
        order_lines(&lines, &PipelineConfig::default(), Lexicon::builtin())
    }

    #[test]
    fn test_row_merge() {
        let rows = order(vec![
            make_line("world", 300.0, 100.0),
            make_line("Hello", 0.0, 105.0),
            make_line("Next", 0.0, 140.0),
        ]);
        assert_eq!(rows, vec!["Hello world", "Next"]);
    }

    #[test]
    fn test_rows_top_to_bottom() {
        let rows = order(vec![
            make_line("third", 0.0, 300.0),
            make_line("first", 0.0, 10.0),
            make_line("second", 0.0, 150.0),
        ]);
        assert_eq!(rows, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_row_anchor_does_not_drift() {
        // 100 -> 115 -> 130: the third line is 30px from the anchor.
        let rows = order(vec![
            make_line("a1", 0.0, 100.0),
            make_line("a2", 100.0, 115.0),
            make_line("b", 0.0, 130.0),
        ]);
        assert_eq!(rows, vec!["a1 a2", "b"]);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let lines = vec![make_line("left", 0.0, 100.0), make_line("right", 200.0, 125.0)];
        let config = PipelineConfig {
            row_threshold: 30.0,
            ..PipelineConfig::default()
        };
        assert_eq!(
            order_lines(&lines, &config, Lexicon::builtin()),
            vec!["left right"]
        );
        assert_eq!(order(lines), vec!["left", "right"]);
    }

    #[test]
    fn test_join_row_parts_brackets() {
        assert_eq!(join_row_parts(&["(", "a", ")", "sandy"]), "(a) sandy");
        assert_eq!(join_row_parts(&["Name", "", "it"]), "Name it");
    }

    #[test]
    fn test_blocks_are_flattened() {
        let blocks = vec![
            Block {
                lines: vec![make_line("right", 300.0, 50.0)],
            },
            Block {
                lines: vec![make_line("left", 0.0, 52.0), Line::default()],
            },
        ];
        assert_eq!(flatten_lines(&blocks).len(), 3);
        assert_eq!(
            order_blocks(&blocks, &PipelineConfig::default(), Lexicon::builtin()),
            vec!["left right"]
        );
    }

    #[test]
    fn test_empty_block() {
        assert!(order(Vec::new()).is_empty());
        assert!(group_rows(vec![&Line::default()], 20.0).is_empty());
    }
}
