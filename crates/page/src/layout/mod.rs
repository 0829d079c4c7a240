//! Spatial stages: word reconstruction within a line and reading order
//! across lines.
//!
//! # Pipeline
//!
//! ```text
//! Block[] -> Line[]      -> row groups -> row strings
//!            flatten_lines  group_rows    reconstruct_line + join_row_parts
//! ```

pub mod order;
pub mod words;

/// Characters after which no space is inserted.
pub(crate) const OPENING: [char; 3] = ['(', '[', '{'];

/// Characters before which no space is inserted.
pub(crate) const CLOSING: [char; 3] = [')', ']', '}'];
