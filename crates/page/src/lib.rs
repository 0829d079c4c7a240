use readaloud_core::questions::format_for_speech;
use readaloud_core::{fold_rows, segment, Lexicon, Normalizer, PipelineConfig, Question};
use serde::Serialize;
use thiserror::Error;

pub mod layout;
pub mod recognition;
pub mod types;

pub use layout::order::{flatten_lines, group_rows, join_row_parts, order_blocks, order_lines};
pub use layout::words::{fuse_letters, reconstruct_line};
pub use recognition::{CloudAnnotations, Recognition};
pub use types::*;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("Invalid recognizer annotation: {0}")]
    InvalidAnnotation(String),
    #[error(transparent)]
    Core(#[from] readaloud_core::Error),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// A page run through the whole reading pipeline.
///
/// Constructed via [`ReadPage::from_page`] for recognizer output or
/// [`ReadPage::from_rows`] for text that is already in reading order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadPage {
    /// Row strings in reading order, before normalization.
    pub rows: Vec<String>,
    /// Cleaned rows folded into one stream with pause punctuation.
    pub stream: String,
    /// The stream rendered for the speech engine.
    pub speech: String,
    pub questions: Vec<Question>,
}

impl ReadPage {
    /// Order, reconstruct and normalize a recognized page.
    pub fn from_page(page: &Page, config: &PipelineConfig, lexicon: &Lexicon) -> Self {
        let rows = order_blocks(&page.blocks, config, lexicon);
        ReadPage::from_rows(rows, lexicon)
    }

    /// Normalize rows that are already in reading order.
    pub fn from_rows(rows: Vec<String>, lexicon: &Lexicon) -> Self {
        let normalizer = Normalizer::new(lexicon);
        let cleaned = normalizer.clean_rows(&rows);
        let stream = fold_rows(&cleaned);
        let questions = segment(&stream, lexicon);
        let speech = if stream.is_empty() {
            String::new()
        } else {
            normalizer.speak(&stream)
        };
        log::debug!(
            "read {} rows into {} questions ({} chars of speech)",
            rows.len(),
            questions.len(),
            speech.len()
        );

        ReadPage {
            rows,
            stream,
            speech,
            questions,
        }
    }

    /// Nothing readable was detected.
    pub fn is_empty(&self) -> bool {
        self.stream.is_empty()
    }

    /// One speech-ready string per question.
    pub fn question_speech(&self, lexicon: &Lexicon) -> Vec<String> {
        let normalizer = Normalizer::new(lexicon);
        self.questions
            .iter()
            .map(|q| normalizer.speak(&format_for_speech(q, lexicon)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Convenience free functions
// ---------------------------------------------------------------------------

/// Run any supported recognizer output through the pipeline.
pub fn read(
    recognition: Recognition,
    config: &PipelineConfig,
    lexicon: &Lexicon,
) -> Result<ReadPage, PageError> {
    let page = recognition.into_page()?;
    Ok(ReadPage::from_page(&page, config, lexicon))
}

/// Merge several captures of the same page and run the composite through
/// the pipeline as plain text rows.
pub fn read_frames(
    frames: &[String],
    config: &PipelineConfig,
    lexicon: &Lexicon,
) -> Result<ReadPage, PageError> {
    let composite = readaloud_core::aggregate(frames, config)?;
    let rows = composite.lines().map(str::to_string).collect();
    Ok(ReadPage::from_rows(rows, lexicon))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_line(text: &str, left: f32, top: f32) -> Line {
        let width = text.chars().count() as f32 * 10.0;
        Line::new(vec![Element::new(
            text,
            BoundingBox::new(left, top, left + width, top + 12.0),
        )])
    }

    fn spelled_line(word: &str, left: f32, top: f32) -> Line {
        Line::new(
            word.chars()
                .enumerate()
                .map(|(i, c)| {
                    let x = left + i as f32 * 11.0;
                    Element::new(c.to_string(), BoundingBox::new(x, top, x + 10.0, top + 12.0))
                })
                .collect(),
        )
    }

    fn exam_page() -> Page {
        Page {
            blocks: vec![
                Block {
                    lines: vec![
                        make_line("(b) clay", 0.0, 80.0),
                        make_line("27. Explain the sod types", 0.0, 10.0),
                    ],
                },
                Block {
                    lines: vec![make_line("(a) sandy", 0.0, 45.0)],
                },
            ],
        }
    }

    #[test]
    fn test_read_page_end_to_end() {
        let read = ReadPage::from_page(&exam_page(), &PipelineConfig::default(), Lexicon::builtin());
        assert_eq!(
            read.rows,
            vec!["27. Explain the sod types", "(a) sandy", "(b) clay"]
        );
        assert_eq!(read.stream, "27. Explain the soil types. (a) sandy, (b) clay.");
        assert_eq!(read.speech, "Twenty-seven. Explain the soil types. A: sandy. B: clay.");
        assert_eq!(read.questions.len(), 1);
        assert_eq!(read.questions[0].number, 27);
        assert_eq!(read.questions[0].options, vec!["sandy", "clay"]);
    }

    #[test]
    fn test_question_speech() {
        let read = ReadPage::from_page(&exam_page(), &PipelineConfig::default(), Lexicon::builtin());
        assert_eq!(
            read.question_speech(Lexicon::builtin()),
            vec!["Question twenty-seven. Explain the soil types. Option a, sandy. Option b, clay."]
        );
    }

    #[test]
    fn test_fragmented_line_in_pipeline() {
        let page = Page {
            blocks: vec![Block {
                lines: vec![spelled_line("ARE", 0.0, 10.0)],
            }],
        };
        let read = ReadPage::from_page(&page, &PipelineConfig::default(), Lexicon::builtin());
        assert_eq!(read.rows, vec!["are"]);
        assert_eq!(read.speech, "are.");
    }

    #[test]
    fn test_bare_options_on_separate_rows() {
        let rows = ["1. Pick one", "a) red", "b) blue"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let read = ReadPage::from_rows(rows, Lexicon::builtin());
        assert_eq!(read.stream, "1. Pick one. (a) red, (b) blue.");
        assert_eq!(read.speech, "One. Pick one. A: red. B: blue.");
        assert_eq!(read.questions[0].options, vec!["red", "blue"]);
    }

    #[test]
    fn test_empty_page() {
        let read = ReadPage::from_page(&Page::default(), &PipelineConfig::default(), Lexicon::builtin());
        assert!(read.is_empty());
        assert!(read.speech.is_empty());
        assert!(read.questions.is_empty());
    }

    #[test]
    fn test_read_frames() {
        let frames = vec!["Hello world.".to_string(), "Hello world".to_string()];
        let read = read_frames(&frames, &PipelineConfig::default(), Lexicon::builtin()).unwrap();
        assert_eq!(read.stream, "Hello world.");
    }

    #[test]
    fn test_read_frames_rejects_empty_set() {
        assert!(matches!(
            read_frames(&[], &PipelineConfig::default(), Lexicon::builtin()),
            Err(PageError::Core(readaloud_core::Error::EmptyFrameSet))
        ));
    }
}
