//! Regrouping recognition elements into words.
//!
//! Recognizers often report one element per character. When a line is
//! fragmented that way, the elements are scanned left to right and a gap
//! wider than [`PipelineConfig::word_gap_factor`] times the mean character
//! width starts a new word. Lines that already carry word-level elements are
//! joined by position.

use std::cmp::Ordering;

use readaloud_core::fallback::never_regress;
use readaloud_core::{Lexicon, PipelineConfig};

use super::order::join_row_parts;
use super::OPENING;
use crate::types::{Element, Line};

/// Punctuation that attaches to the word before it.
const TRAILING: [char; 9] = [')', ']', '}', '.', ',', ';', ':', '!', '?'];

/// Letter runs longer than this are left spaced unless they form a word.
const MAX_FUSED_RUN: usize = 5;

struct Word {
    text: String,
    fragments: usize,
}

/// Non-blank elements, minus those under the confidence floor. A line whose
/// elements all fall under the floor is kept whole.
fn confident_elements(line: &Line, min_confidence: Option<f32>) -> Vec<&Element> {
    let present: Vec<&Element> = line
        .elements
        .iter()
        .filter(|e| !e.text.trim().is_empty())
        .collect();
    let Some(floor) = min_confidence else {
        return present;
    };

    let kept: Vec<&Element> = present
        .iter()
        .copied()
        .filter(|e| e.confidence.is_none_or(|c| c >= floor))
        .collect();
    if kept.is_empty() && !present.is_empty() {
        log::debug!("all elements below confidence {floor}; keeping the line");
        return present;
    }
    kept
}

fn is_fragmented(elements: &[&Element], ratio: f32) -> bool {
    if elements.is_empty() {
        return false;
    }
    let singles = elements.iter().filter(|e| e.is_single_char()).count();
    singles as f32 / elements.len() as f32 >= ratio
}

fn mean_char_width(elements: &[&Element]) -> f32 {
    let widths: Vec<f32> = elements
        .iter()
        .filter(|e| e.char_count() > 0)
        .map(|e| e.bbox.width() / e.char_count() as f32)
        .collect();
    if widths.is_empty() {
        return 0.0;
    }
    widths.iter().sum::<f32>() / widths.len() as f32
}

/// Title case (`The`) is kept, anything else is lowercased.
fn dictionary_case(word: &str) -> String {
    let mut rest = word.chars();
    let title = rest.next().is_some_and(char::is_uppercase)
        && !rest.as_str().is_empty()
        && rest.all(char::is_lowercase);
    if title {
        word.to_string()
    } else {
        word.to_lowercase()
    }
}

/// A word assembled from several fragments is emitted in dictionary form when
/// it is a known common word (`A` `R` `E` -> `are`, `T` `h` `e` -> `The`).
fn dictionary_form(word: &Word, lexicon: &Lexicon) -> String {
    if word.fragments < 2 {
        return word.text.clone();
    }
    let core = word.text.trim_end_matches(|c: char| !c.is_alphanumeric());
    if !core.is_empty() && core.chars().all(char::is_alphabetic) && lexicon.is_common_word(core)
    {
        return format!("{}{}", dictionary_case(core), &word.text[core.len()..]);
    }
    word.text.clone()
}

fn scan_words(elements: &[&Element], gap_factor: f32, lexicon: &Lexicon) -> Vec<String> {
    let threshold = gap_factor * mean_char_width(elements);
    let mut words: Vec<Word> = Vec::new();
    let mut prev_right: Option<f32> = None;

    for element in elements {
        let text = element.text.trim();
        let attaches = text.chars().all(|c| TRAILING.contains(&c));
        let opens = text.starts_with(OPENING);

        let joins = prev_right
            .is_some_and(|right| attaches || (!opens && element.bbox.left - right <= threshold));

        match words.last_mut() {
            Some(word) if joins => {
                word.text.push_str(text);
                word.fragments += 1;
            }
            _ => words.push(Word {
                text: text.to_string(),
                fragments: 1,
            }),
        }
        prev_right = Some(prev_right.map_or(element.bbox.right, |r| r.max(element.bbox.right)));
    }

    words.iter().map(|w| dictionary_form(w, lexicon)).collect()
}

/// Collapse whitespace and drop spaces before closing punctuation.
fn tidy_words(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for token in text.split_whitespace() {
        let tight = result.is_empty()
            || result.ends_with(OPENING)
            || token.starts_with(TRAILING);
        if !tight {
            result.push(' ');
        }
        result.push_str(token);
    }
    result
}

fn is_letter(token: &str) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic())
}

/// Fuse runs of single-letter tokens: into a common word when the letters
/// spell one, otherwise into a plain join for runs of up to five letters.
pub fn fuse_letters(text: &str, lexicon: &Lexicon) -> String {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut out: Vec<String> = Vec::with_capacity(tokens.len());

    let mut i = 0;
    while i < tokens.len() {
        let run = tokens[i..].iter().take_while(|t| is_letter(t)).count();
        if run < 2 {
            out.push(tokens[i].to_string());
            i += 1;
            continue;
        }

        let letters = &tokens[i..i + run];
        let joined = letters.concat();
        if lexicon.is_common_word(&joined) {
            out.push(dictionary_case(&joined));
        } else if run <= MAX_FUSED_RUN {
            out.push(joined);
        } else {
            out.extend(letters.iter().map(|t| t.to_string()));
        }
        i += run;
    }

    out.join(" ")
}

/// Rebuild one line of words from its elements.
///
/// A single-element line yields its element text unchanged. When the
/// reconstruction comes out empty the recognizer's own line text is kept.
pub fn reconstruct_line(line: &Line, config: &PipelineConfig, lexicon: &Lexicon) -> String {
    if let [only] = line.elements.as_slice() {
        return only.text.clone();
    }

    let original = line.text();
    never_regress("words", &original, |_| {
        let mut elements = confident_elements(line, config.min_confidence);
        elements.sort_by(|a, b| {
            a.bbox
                .left
                .partial_cmp(&b.bbox.left)
                .unwrap_or(Ordering::Equal)
        });

        let words: Vec<String> = if is_fragmented(&elements, config.fragment_ratio) {
            scan_words(&elements, config.word_gap_factor, lexicon)
        } else {
            elements.iter().map(|e| e.text.trim().to_string()).collect()
        };
        fuse_letters(&tidy_words(&join_row_parts(&words)), lexicon)
    })
}
