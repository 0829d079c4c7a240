//! Core library for readaloud
//!
//! This crate implements the **Functional Core** of the readaloud pipeline: the
//! text transforms that turn spatially ordered recognizer output into a
//! speech-ready reading stream.
//!
//! # Architecture Overview
//!
//! The workspace follows the Functional Core - Imperative Shell pattern:
//!
//! - **`readaloud_core`** (this crate): pure text transforms, no I/O beyond
//!   loading configuration and lookup tables on request
//! - **`page`**: the recognizer data model and the spatial stages (word
//!   reconstruction, reading order)
//! - **`readaloud`**: the CLI shell (file I/O, concurrency, rendering)
//!
//! # Module Organization
//!
//! - [`tables`]: lookup tables (common words, misreads, Roman numerals,
//!   number words) and their compiled [`Lexicon`]
//! - [`fallback`]: the never-regress combinator every text stage runs through
//! - [`normalize`]: the lexical correction chain (clean pass and speech pass)
//! - [`structure`]: row classification and pause punctuation between rows
//! - [`questions`]: question and option segmentation
//! - [`aggregate`]: merging several captures of the same page
//! - [`config`]: tunable pipeline parameters
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use readaloud_core::{fold_rows, segment, Lexicon, Normalizer};
//!
//! let normalizer = Normalizer::new(Lexicon::builtin());
//! let rows = normalizer.clean_rows(&["27. Explain the sod types".into(), "(a) sandy".into()]);
//! let stream = fold_rows(&rows);
//! let questions = segment(&stream, normalizer.lexicon());
//! let speech = normalizer.speak(&stream);
//! ```

use thiserror::Error;

pub mod aggregate;
pub mod config;
pub mod fallback;
pub mod normalize;
pub mod questions;
pub mod structure;
pub mod tables;

pub use aggregate::{aggregate, line_similarity, most_complete_frame};
pub use config::PipelineConfig;
pub use normalize::Normalizer;
pub use questions::{format_for_speech, segment, Question, MAX_OPTIONS};
pub use structure::{classify_row, classify_rows, fold_rows, RowKind};
pub use tables::{Lexicon, LookupTables};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Frame set is empty")]
    EmptyFrameSet,
    #[error("Invalid lookup tables: {0}")]
    InvalidTables(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
