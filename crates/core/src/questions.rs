//! Question and option segmentation over a folded reading stream.
//!
//! Question markers (`27.`, `3)`, `Question 4`) are only recognized at the
//! start of the text or of a sentence. Options are the canonical `(a)`..`(d)`
//! markers produced by the clean pass; when a body has none, a looser pattern
//! picks up corrupted markers such as `$1`, `$b` or a bare `c)`.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::tables::Lexicon;

pub const MAX_OPTIONS: usize = 4;

const OPTION_LABELS: [char; MAX_OPTIONS] = ['a', 'b', 'c', 'd'];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub number: u32,
    pub text: String,
    /// Option texts in label order; the first is option `a`.
    pub options: Vec<String>,
}

impl Question {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.options.is_empty()
    }

    /// Options paired with their `a`..`d` labels.
    pub fn labelled_options(&self) -> impl Iterator<Item = (char, &str)> {
        OPTION_LABELS
            .iter()
            .copied()
            .zip(self.options.iter().map(String::as_str))
    }
}

/// Byte span of a marker and the value it carries (question number or option
/// label index).
#[derive(Debug, Clone, Copy)]
struct Marker {
    start: usize,
    end: usize,
    value: u32,
}

/// True when a marker starting right after `prefix` opens a sentence.
fn opens_sentence(prefix: &str, pauses: &[char]) -> bool {
    if prefix.chars().next_back().is_some_and(|c| !c.is_whitespace()) {
        return false;
    }
    let trimmed = prefix.trim_end();
    trimmed.is_empty() || trimmed.ends_with(pauses) || prefix[trimmed.len()..].contains('\n')
}

fn closes_marker(rest: &str) -> bool {
    rest.chars().next().is_none_or(char::is_whitespace)
}

fn question_markers(text: &str) -> Vec<Marker> {
    static RE_QUESTION: OnceLock<Regex> = OnceLock::new();
    let re = RE_QUESTION.get_or_init(|| {
        Regex::new(r"(?i)\bquestion\s+([0-9]{1,3})[.):]?|([0-9]{1,3})[.):]").unwrap()
    });

    re.captures_iter(text)
        .filter_map(|caps| {
            let m = caps.get(0)?;
            let digits = caps.get(1).or_else(|| caps.get(2))?;
            if !opens_sentence(&text[..m.start()], &['.', '!', '?', ';'])
                || !closes_marker(&text[m.end()..])
            {
                return None;
            }
            Some(Marker {
                start: m.start(),
                end: m.end(),
                value: digits.as_str().parse().ok()?,
            })
        })
        .collect()
}

/// Parenthesized numbers and Roman numerals, used when a stream carries no
/// question numbers at all.
fn sub_item_markers(text: &str, lexicon: &Lexicon) -> Vec<Marker> {
    static RE_SUB_ITEM: OnceLock<Regex> = OnceLock::new();
    let re = RE_SUB_ITEM.get_or_init(|| {
        Regex::new(r"(?i)\(([0-9]{1,2})\)|\(?\b(xi{0,2}|ix|iv|vi{0,3}|i{1,3})[.)]").unwrap()
    });

    re.captures_iter(text)
        .filter_map(|caps| {
            let m = caps.get(0)?;
            if !opens_sentence(&text[..m.start()], &['.', '!', '?', ';', ':', ','])
                || !closes_marker(&text[m.end()..])
            {
                return None;
            }
            let value = match (caps.get(1), caps.get(2)) {
                (Some(digits), _) => digits.as_str().parse().ok()?,
                (None, Some(numeral)) => lexicon.roman_value(numeral.as_str())?,
                (None, None) => return None,
            };
            Some(Marker {
                start: m.start(),
                end: m.end(),
                value,
            })
        })
        .collect()
}

fn label_index(label: char) -> Option<u32> {
    match label.to_ascii_lowercase() {
        c @ 'a'..='d' => Some(c as u32 - 'a' as u32),
        c @ '1'..='4' => Some(c as u32 - '1' as u32),
        _ => None,
    }
}

fn option_marker(caps: &Captures, body: &str) -> Option<Marker> {
    let m = caps.get(0)?;
    let label = caps.get(1).or_else(|| caps.get(2))?;
    if !closes_marker(&body[m.end()..]) {
        return None;
    }
    Some(Marker {
        start: m.start(),
        end: m.end(),
        value: label_index(label.as_str().chars().next()?)?,
    })
}

fn canonical_option_markers(body: &str) -> Vec<Marker> {
    static RE_CANONICAL: OnceLock<Regex> = OnceLock::new();
    let re = RE_CANONICAL.get_or_init(|| Regex::new(r"\(([a-d])\)").unwrap());
    re.captures_iter(body)
        .filter_map(|caps| option_marker(&caps, body))
        .collect()
}

fn loose_option_markers(body: &str) -> Vec<Marker> {
    static RE_LOOSE: OnceLock<Regex> = OnceLock::new();
    let re = RE_LOOSE
        .get_or_init(|| Regex::new(r"\$([1-4a-dA-D])\)?|(?:^|\s)([a-dA-D])\)").unwrap());
    re.captures_iter(body)
        .filter_map(|caps| option_marker(&caps, body))
        .collect()
}

/// Keep markers whose labels strictly increase, at most [`MAX_OPTIONS`].
fn ascending(markers: Vec<Marker>) -> Vec<Marker> {
    let mut picked: Vec<Marker> = Vec::new();
    for marker in markers {
        if picked.len() == MAX_OPTIONS {
            break;
        }
        if picked.last().is_none_or(|last| marker.value > last.value) {
            picked.push(marker);
        }
    }
    picked
}

/// Strip marker remnants, residual currency glyphs and orphan punctuation.
fn tidy_fragment(fragment: &str) -> String {
    static RE_CURRENCY: OnceLock<Regex> = OnceLock::new();
    let re = RE_CURRENCY.get_or_init(|| Regex::new(r"\$([0-9]*)").unwrap());

    let without_glyphs = re.replace_all(fragment, |caps: &Captures| {
        if caps[1].len() <= 1 {
            String::new()
        } else {
            caps[0].to_string()
        }
    });
    let collapsed = without_glyphs.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_start_matches(|c: char| matches!(c, ')' | '.' | ':' | ',' | ';' | '-') || c.is_whitespace())
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '-') || c.is_whitespace())
        .to_string()
}

fn split_body(body: &str) -> (String, Vec<String>) {
    let mut markers = ascending(canonical_option_markers(body));
    if markers.is_empty() {
        markers = ascending(loose_option_markers(body));
    }
    let Some(first) = markers.first() else {
        return (tidy_fragment(body), Vec::new());
    };

    let text = tidy_fragment(&body[..first.start]);
    let options = markers
        .iter()
        .enumerate()
        .map(|(i, marker)| {
            let stop = markers.get(i + 1).map_or(body.len(), |next| next.start);
            tidy_fragment(&body[marker.end..stop])
        })
        .collect();
    (text, options)
}

fn build(number: u32, body: &str) -> Option<Question> {
    let (text, options) = split_body(body);
    let question = Question {
        number,
        text,
        options,
    };
    if question.is_empty() {
        log::debug!("dropping empty question {number}");
        return None;
    }
    Some(question)
}

/// Split a reading stream into questions.
///
/// Text before the first marker belongs to no question. A stream without any
/// marker is a single question numbered 1.
pub fn segment(text: &str, lexicon: &Lexicon) -> Vec<Question> {
    let mut markers = question_markers(text);
    if markers.is_empty() {
        markers = sub_item_markers(text, lexicon);
    }
    if markers.is_empty() {
        log::debug!("no question markers; reading the stream as one question");
        return build(1, text).into_iter().collect();
    }

    let preamble = text[..markers[0].start].trim();
    if !preamble.is_empty() {
        log::debug!("skipping {} bytes before the first question", preamble.len());
    }

    markers
        .iter()
        .enumerate()
        .filter_map(|(i, marker)| {
            let stop = markers.get(i + 1).map_or(text.len(), |next| next.start);
            build(marker.value, &text[marker.end..stop])
        })
        .collect()
}

fn sentence(text: &str) -> String {
    if text.ends_with(['.', '!', '?']) {
        text.to_string()
    } else {
        format!("{text}.")
    }
}

/// `Question twenty-seven. <text>. Option a, <text>. Option b, <text>.`
pub fn format_for_speech(question: &Question, lexicon: &Lexicon) -> String {
    let number = lexicon
        .number_to_words(question.number)
        .unwrap_or_else(|| question.number.to_string());

    let mut parts = vec![format!("Question {number}.")];
    if !question.text.is_empty() {
        parts.push(sentence(&question.text));
    }
    for (label, option) in question.labelled_options() {
        if option.is_empty() {
            parts.push(format!("Option {label}."));
        } else {
            parts.push(sentence(&format!("Option {label}, {option}")));
        }
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Normalizer;

    fn lex() -> &'static Lexicon {
        Lexicon::builtin()
    }

    fn question(number: u32, text: &str, options: &[&str]) -> Question {
        Question {
            number,
            text: text.to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_question_with_options() {
        let questions = segment("27. Explain soil types. (a) sandy, (b) clay.", lex());
        assert_eq!(
            questions,
            vec![question(27, "Explain soil types", &["sandy", "clay"])]
        );
    }

    #[test]
    fn test_two_questions() {
        let questions = segment("1. What is soil? 2. Name a gas.", lex());
        assert_eq!(
            questions,
            vec![
                question(1, "What is soil?", &[]),
                question(2, "Name a gas", &[]),
            ]
        );
    }

    #[test]
    fn test_question_keyword_marker() {
        let questions = segment("Question 4 Define osmosis.", lex());
        assert_eq!(questions, vec![question(4, "Define osmosis", &[])]);
    }

    #[test]
    fn test_numbers_inside_sentences_are_not_markers() {
        let questions = segment("1. In 1990 about 3. 5 tonnes fell.", lex());
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].number, 1);
    }

    #[test]
    fn test_option_canonicalization_end_to_end() {
        let cleaned = Normalizer::default().clean("(a) cat $2 dog (c) bird");
        assert_eq!(cleaned, "(a) cat (b) dog (c) bird");
        let questions = segment(&cleaned, lex());
        assert_eq!(questions, vec![question(1, "", &["cat", "dog", "bird"])]);
    }

    #[test]
    fn test_loose_markers_when_no_canonical_ones() {
        let questions = segment("Pick one $1 red $2 blue", lex());
        assert_eq!(questions, vec![question(1, "Pick one", &["red", "blue"])]);
    }

    #[test]
    fn test_at_most_four_options() {
        let questions = segment("1. Pick (a) w (b) x (c) y (d) z (a) again", lex());
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].options, vec!["w", "x", "y", "z (a) again"]);
    }

    #[test]
    fn test_no_markers_is_question_one() {
        let questions = segment("Describe the water cycle.", lex());
        assert_eq!(questions, vec![question(1, "Describe the water cycle", &[])]);
    }

    #[test]
    fn test_empty_body_dropped() {
        let questions = segment("1. 2. Name a gas.", lex());
        assert_eq!(questions, vec![question(2, "Name a gas", &[])]);
    }

    #[test]
    fn test_preamble_is_not_a_question() {
        let questions = segment("Answer all questions. 1. Name a gas.", lex());
        assert_eq!(questions, vec![question(1, "Name a gas", &[])]);
    }

    #[test]
    fn test_sub_item_markers_as_fallback() {
        let questions = segment("(1) Name the parts, (2) Draw it.", lex());
        assert_eq!(
            questions,
            vec![question(1, "Name the parts", &[]), question(2, "Draw it", &[])]
        );

        let questions = segment("i) Name the parts. ii) Draw it.", lex());
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].number, 2);
    }

    #[test]
    fn test_empty_stream() {
        assert!(segment("", lex()).is_empty());
        assert!(segment("  .  ", lex()).is_empty());
    }

    #[test]
    fn test_format_for_speech() {
        let q = question(27, "Explain soil types", &["sandy", "clay"]);
        assert_eq!(
            format_for_speech(&q, lex()),
            "Question twenty-seven. Explain soil types. Option a, sandy. Option b, clay."
        );
    }

    #[test]
    fn test_format_keeps_question_mark_and_large_numbers() {
        assert_eq!(
            format_for_speech(&question(1, "What is soil?", &[]), lex()),
            "Question one. What is soil?"
        );
        assert_eq!(
            format_for_speech(&question(250, "Name it", &[]), lex()),
            "Question 250. Name it."
        );
    }
}
