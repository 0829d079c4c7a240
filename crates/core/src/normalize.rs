//! Lexical normalization: raw recognized text to speech-ready text.
//!
//! The correction chain runs in two passes so that structure-bearing tokens
//! survive until the classifier and the segmenter have seen them:
//!
//! ```text
//! clean:  unicode -> misreads -> de-spacing -> specimen labels -> whitespace
//!         -> punctuation -> symbols -> roman markers -> option markers
//!         -> currency glyphs
//! speak:  bracket markers -> option phrasing -> hostile tokens
//!         -> terminal punctuation -> number words
//! ```
//!
//! Every stage is a pure `fn(&str, &Lexicon) -> String` run through
//! [`run_stages`], so none of them can turn non-empty text into nothing.

use std::sync::OnceLock;

use regex::{Captures, NoExpand, Regex};
use unicode_normalization::UnicodeNormalization;

use crate::fallback::{never_regress, run_stages, Stage};
use crate::tables::Lexicon;

/// Digit to letter mapping for misread option markers (`$1` -> `(a)`).
const OPTION_DIGITS: [(char, char); 4] = [('1', 'a'), ('2', 'b'), ('3', 'c'), ('4', 'd')];

pub const CLEAN_STAGES: &[Stage<Lexicon>] = &[
    Stage {
        name: "unicode",
        apply: unicode_cleanup,
    },
    Stage {
        name: "misreads",
        apply: correct_misreads,
    },
    Stage {
        name: "despace",
        apply: despace_words,
    },
    Stage {
        name: "specimen",
        apply: label_specimens,
    },
    Stage {
        name: "whitespace",
        apply: normalize_whitespace,
    },
    Stage {
        name: "punctuation",
        apply: repair_punctuation,
    },
    Stage {
        name: "symbols",
        apply: expand_symbols,
    },
    Stage {
        name: "roman",
        apply: expand_roman_markers,
    },
    Stage {
        name: "options",
        apply: canonicalize_options,
    },
    Stage {
        name: "currency",
        apply: suppress_currency,
    },
];

pub const SPEECH_STAGES: &[Stage<Lexicon>] = &[
    Stage {
        name: "brackets",
        apply: unwrap_bracket_markers,
    },
    Stage {
        name: "option-phrasing",
        apply: phrase_options,
    },
    Stage {
        name: "hostile",
        apply: strip_hostile_tokens,
    },
    Stage {
        name: "terminal",
        apply: ensure_terminal_punctuation,
    },
    // Last: the stages above add the periods that make a number spoken.
    Stage {
        name: "numbers",
        apply: spell_numbers,
    },
];

/// Runs the correction chain against a [`Lexicon`].
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    lexicon: &'a Lexicon,
}

impl<'a> Normalizer<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Normalizer { lexicon }
    }

    pub fn lexicon(&self) -> &'a Lexicon {
        self.lexicon
    }

    /// Structure-preserving pass. Question numbers stay digits and option
    /// markers end up in the canonical `(a)`..`(d)` form.
    pub fn clean(&self, text: &str) -> String {
        run_stages(text, self.lexicon, CLEAN_STAGES)
    }

    /// Clean each row, splitting rows that gained a line break (specimen
    /// labels) and dropping rows that are empty.
    ///
    /// Option context is also decided across rows, so bare `a)` / `b)`
    /// markers written one per row are canonicalized together.
    pub fn clean_rows(&self, rows: &[String]) -> Vec<String> {
        let cleaned: Vec<String> = rows
            .iter()
            .flat_map(|row| {
                self.clean(row)
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();

        if !has_option_context(&cleaned.join("\n")) {
            return cleaned;
        }
        cleaned
            .iter()
            .map(|row| never_regress("options", row, expand_loose_options))
            .collect()
    }

    /// Rendering pass for the speech engine.
    pub fn speak(&self, text: &str) -> String {
        run_stages(text, self.lexicon, SPEECH_STAGES)
    }

    /// The full chain. Idempotent: `normalize(normalize(x)) == normalize(x)`.
    pub fn normalize(&self, text: &str) -> String {
        self.speak(&self.clean(text))
    }
}

impl Default for Normalizer<'static> {
    fn default() -> Self {
        Normalizer::new(Lexicon::builtin())
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Collapse space runs, drop spaces before punctuation, trim every line.
fn tidy_spaces(text: &str) -> String {
    static RE_RUNS: OnceLock<Regex> = OnceLock::new();
    let re_runs = RE_RUNS.get_or_init(|| Regex::new(r"[ \t]{2,}").unwrap());
    static RE_BEFORE_PUNCT: OnceLock<Regex> = OnceLock::new();
    let re_before = RE_BEFORE_PUNCT.get_or_init(|| Regex::new(r"[ \t]+([.,!?;:])").unwrap());

    let collapsed = re_runs.replace_all(text, " ");
    let tightened = re_before.replace_all(&collapsed, "$1");
    tightened
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Give `replacement` the capitalization of `found`.
fn match_case(found: &str, replacement: &str) -> String {
    let letters: Vec<char> = found.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        return replacement.to_uppercase();
    }
    if found.chars().next().is_some_and(char::is_uppercase) {
        return capitalize(replacement);
    }
    replacement.to_string()
}

pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// True when `prefix` ends at a sentence or line start.
fn at_sentence_start(prefix: &str) -> bool {
    let trimmed = prefix.trim_end_matches([' ', '\t']);
    match trimmed.chars().next_back() {
        None => true,
        Some(c) => matches!(c, '\n' | '.' | '!' | '?' | ':'),
    }
}

// ---------------------------------------------------------------------------
// Clean pass
// ---------------------------------------------------------------------------

/// Unicode NFC normalization, ligature repair and typographic quote folding.
fn unicode_cleanup(text: &str, _lexicon: &Lexicon) -> String {
    let mut result: String = text.nfc().collect();

    let replacements = [
        ("\u{FB00}", "ff"),
        ("\u{FB01}", "fi"),
        ("\u{FB02}", "fl"),
        ("\u{FB03}", "ffi"),
        ("\u{FB04}", "ffl"),
        ("\u{2018}", "'"),
        ("\u{2019}", "'"),
        ("\u{201C}", "\""),
        ("\u{201D}", "\""),
        ("\u{FFFD}", ""),
    ];
    for (from, to) in &replacements {
        result = result.replace(from, to);
    }
    result
}

fn correct_misreads(text: &str, lexicon: &Lexicon) -> String {
    let Some(re) = lexicon.corrections_regex() else {
        return text.to_string();
    };
    re.replace_all(text, |caps: &Captures| {
        let found = &caps[0];
        match lexicon.correction(found) {
            Some(replacement) => match_case(found, replacement),
            None => found.to_string(),
        }
    })
    .into_owned()
}

/// Collapse spaced-out vocabulary words ("s t i c k y" -> "sticky").
fn despace_words(text: &str, lexicon: &Lexicon) -> String {
    lexicon
        .despacers()
        .iter()
        .fold(text.to_string(), |acc, (re, word)| {
            re.replace_all(&acc, NoExpand(word)).into_owned()
        })
}

/// `specimen c -` becomes a line break followed by `Specimen C: `.
fn label_specimens(text: &str, _lexicon: &Lexicon) -> String {
    static RE_SPECIMEN: OnceLock<Regex> = OnceLock::new();
    let re = RE_SPECIMEN.get_or_init(|| {
        Regex::new(r"(?i)\s*\bspecimen[ \t]+([a-z])[ \t]*[-\u{2013}:][ \t]*").unwrap()
    });
    re.replace_all(text, |caps: &Captures| {
        format!("\nSpecimen {}: ", caps[1].to_uppercase())
    })
    .into_owned()
}

fn normalize_whitespace(text: &str, _lexicon: &Lexicon) -> String {
    static RE_SPACES: OnceLock<Regex> = OnceLock::new();
    let re_spaces = RE_SPACES.get_or_init(|| Regex::new(r"[ \t\u{00A0}]+").unwrap());
    static RE_BLANKS: OnceLock<Regex> = OnceLock::new();
    let re_blanks = RE_BLANKS.get_or_init(|| Regex::new(r"\n{3,}").unwrap());

    let collapsed = re_spaces.replace_all(text, " ");
    let lines = collapsed
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    re_blanks.replace_all(&lines, "\n\n").trim().to_string()
}

fn repair_punctuation(text: &str, _lexicon: &Lexicon) -> String {
    static RE_DOTS: OnceLock<Regex> = OnceLock::new();
    let re_dots = RE_DOTS.get_or_init(|| Regex::new(r"\.{2,}").unwrap());
    static RE_COMMAS: OnceLock<Regex> = OnceLock::new();
    let re_commas = RE_COMMAS.get_or_init(|| Regex::new(r",{2,}").unwrap());
    static RE_BANGS: OnceLock<Regex> = OnceLock::new();
    let re_bangs = RE_BANGS.get_or_init(|| Regex::new(r"([!?])[!?]+").unwrap());
    static RE_BEFORE: OnceLock<Regex> = OnceLock::new();
    let re_before = RE_BEFORE.get_or_init(|| Regex::new(r"[ \t]+([.,!?;:])").unwrap());
    static RE_PAUSE_DOT: OnceLock<Regex> = OnceLock::new();
    let re_pause_dot = RE_PAUSE_DOT.get_or_init(|| Regex::new(r"[,;:]+\.|\.[,;:]+").unwrap());
    static RE_AFTER: OnceLock<Regex> = OnceLock::new();
    let re_after = RE_AFTER.get_or_init(|| Regex::new(r"([.!?,;:])([A-Za-z])").unwrap());

    let mut result = re_dots.replace_all(text, ".").into_owned();
    result = re_commas.replace_all(&result, ",").into_owned();
    result = re_bangs.replace_all(&result, "$1").into_owned();
    result = re_before.replace_all(&result, "$1").into_owned();
    result = re_pause_dot.replace_all(&result, ".").into_owned();
    re_after
        .replace_all(&result, |caps: &Captures| {
            let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
            if &caps[1] == "." && is_letter_abbreviation(&result, start) {
                caps[0].to_string()
            } else {
                format!("{} {}", &caps[1], &caps[2])
            }
        })
        .into_owned()
}

/// `i.e.`, `e.g.` and initials: a lone letter, the dot at `dot`, a letter, a dot.
fn is_letter_abbreviation(text: &str, dot: usize) -> bool {
    let mut before = text[..dot].chars().rev();
    let lone_letter = before.next().is_some_and(char::is_alphabetic)
        && before.next().is_none_or(|c| !c.is_alphanumeric());
    let mut after = text[dot + 1..].chars();
    lone_letter && after.next().is_some_and(char::is_alphabetic) && after.next() == Some('.')
}

fn expand_symbols(text: &str, _lexicon: &Lexicon) -> String {
    static RE_BLANK: OnceLock<Regex> = OnceLock::new();
    let re_blank = RE_BLANK.get_or_init(|| Regex::new(r"_{2,}").unwrap());

    let result = text
        .replace('&', " and ")
        .replace('%', " percent")
        .replace('@', " at ");
    let result = re_blank.replace_all(&result, " blank ");
    tidy_spaces(&result)
}

/// Line-leading Roman list markers (`(ii)`, `ii)`, `ii.`) become `(2)`.
fn expand_roman_markers(text: &str, lexicon: &Lexicon) -> String {
    static RE_ROMAN: OnceLock<Regex> = OnceLock::new();
    let re = RE_ROMAN.get_or_init(|| {
        Regex::new(r"(?im)^[ \t]*\(?(xi{0,2}|ix|iv|vi{0,3}|i{1,3})[.)](?:[ \t]+|$)").unwrap()
    });
    if !re.is_match(text) {
        return text.to_string();
    }
    let replaced = re.replace_all(text, |caps: &Captures| match lexicon.roman_value(&caps[1]) {
        Some(value) => format!("({value}) "),
        None => caps[0].to_string(),
    });
    tidy_spaces(&replaced)
}

fn has_option_context(text: &str) -> bool {
    static RE_CANON: OnceLock<Regex> = OnceLock::new();
    let re_canon = RE_CANON.get_or_init(|| Regex::new(r"\([a-d]\)").unwrap());
    static RE_LOOSE: OnceLock<Regex> = OnceLock::new();
    let re_loose = RE_LOOSE
        .get_or_init(|| Regex::new(r"(?m)\$[1-4](?:\)|\b)|(?:^|[ \t])[a-dA-D]\)").unwrap());
    static RE_LEADING: OnceLock<Regex> = OnceLock::new();
    let re_leading = RE_LEADING.get_or_init(|| Regex::new(r"(?m)^[ \t]*\$[1-4]\b").unwrap());

    re_canon.is_match(text) || re_loose.find_iter(text).count() >= 2 || re_leading.is_match(text)
}

fn option_letter(digit: char) -> Option<char> {
    OPTION_DIGITS
        .iter()
        .find(|(d, _)| *d == digit)
        .map(|(_, letter)| *letter)
}

/// Bring option markers into the canonical `(a)`..`(d)` form.
fn canonicalize_options(text: &str, _lexicon: &Lexicon) -> String {
    static RE_PAREN: OnceLock<Regex> = OnceLock::new();
    let re_paren = RE_PAREN.get_or_init(|| Regex::new(r"\(([a-dA-D])\)").unwrap());
    static RE_DOLLAR_LETTER: OnceLock<Regex> = OnceLock::new();
    let re_dollar_letter =
        RE_DOLLAR_LETTER.get_or_init(|| Regex::new(r"\$([a-dA-D])(?:\)|\b)").unwrap());

    let lower = |caps: &Captures, group: usize| format!("({})", caps[group].to_lowercase());

    let mut result = re_paren
        .replace_all(text, |caps: &Captures| lower(caps, 1))
        .into_owned();
    result = re_dollar_letter
        .replace_all(&result, |caps: &Captures| lower(caps, 1))
        .into_owned();

    if !has_option_context(&result) {
        return result;
    }
    expand_loose_options(&result)
}

/// `$1`..`$4` and bare `a)`..`d)` to `(a)`..`(d)`. Only valid in option context.
fn expand_loose_options(text: &str) -> String {
    static RE_DOLLAR_DIGIT: OnceLock<Regex> = OnceLock::new();
    let re_dollar_digit =
        RE_DOLLAR_DIGIT.get_or_init(|| Regex::new(r"\$([1-4])(?:\)|\b)").unwrap());
    static RE_BARE: OnceLock<Regex> = OnceLock::new();
    let re_bare = RE_BARE.get_or_init(|| Regex::new(r"(?m)(^|[ \t])([a-dA-D])\)").unwrap());

    let result = re_dollar_digit
        .replace_all(text, |caps: &Captures| {
            let digit = caps[1].chars().next().and_then(option_letter);
            match digit {
                Some(letter) => format!("({letter})"),
                None => caps[0].to_string(),
            }
        })
        .into_owned();
    re_bare
        .replace_all(&result, |caps: &Captures| {
            format!("{}({})", &caps[1], caps[2].to_lowercase())
        })
        .into_owned()
}

/// Strip single-digit `$N` glyphs left outside option context.
fn suppress_currency(text: &str, _lexicon: &Lexicon) -> String {
    static RE_MONEY: OnceLock<Regex> = OnceLock::new();
    let re = RE_MONEY.get_or_init(|| Regex::new(r"\$([0-9]+)([.,][0-9]+)?").unwrap());
    if !re.is_match(text) {
        return text.to_string();
    }
    let stripped = re.replace_all(text, |caps: &Captures| {
        if caps[1].len() == 1 && caps.get(2).is_none() {
            String::new()
        } else {
            caps[0].to_string()
        }
    });
    tidy_spaces(&stripped)
}

// ---------------------------------------------------------------------------
// Speech pass
// ---------------------------------------------------------------------------

/// Leftover numeric sub-item markers: `(2) name` -> `2. name`.
fn unwrap_bracket_markers(text: &str, _lexicon: &Lexicon) -> String {
    static RE_NUMBERED: OnceLock<Regex> = OnceLock::new();
    let re = RE_NUMBERED.get_or_init(|| Regex::new(r"\(([0-9]{1,3})\)[ \t]*").unwrap());
    if !re.is_match(text) {
        return text.to_string();
    }
    tidy_spaces(&re.replace_all(text, "${1}. "))
}

/// Spell out 0..=100 when used as a question number or right before a period.
fn spell_numbers(text: &str, lexicon: &Lexicon) -> String {
    static RE_NUMBER: OnceLock<Regex> = OnceLock::new();
    let re = RE_NUMBER.get_or_init(|| Regex::new(r"\b([0-9]{1,3})([.):])").unwrap());

    re.replace_all(text, |caps: &Captures| {
        let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((0, 0));
        let original = caps[0].to_string();
        let prefix = &text[..whole.0];
        let next = text[whole.1..].chars().next();
        let prev = prefix.chars().next_back();

        let standalone_before = prev.is_none_or(|c| c.is_whitespace() || c == '(');
        let standalone_after = next.is_none_or(char::is_whitespace);
        if !standalone_before || !standalone_after {
            return original;
        }
        let is_period = &caps[2] == ".";
        let starts_sentence = at_sentence_start(prefix.trim_end_matches('('));
        if !is_period && !starts_sentence {
            return original;
        }

        let Ok(value) = caps[1].parse::<u32>() else {
            return original;
        };
        match lexicon.number_to_words(value) {
            Some(words) if starts_sentence => format!("{}.", capitalize(&words)),
            Some(words) => format!("{words}."),
            None => original,
        }
    })
    .into_owned()
}

/// `(a) sandy, (b) clay` -> `A: sandy. B: clay.`
fn phrase_options(text: &str, _lexicon: &Lexicon) -> String {
    static RE_MARKER: OnceLock<Regex> = OnceLock::new();
    let re = RE_MARKER.get_or_init(|| Regex::new(r"\(([a-d])\)").unwrap());

    let markers: Vec<(usize, usize, String)> = re
        .captures_iter(text)
        .filter_map(|caps| {
            let m = caps.get(0)?;
            Some((m.start(), m.end(), caps[1].to_uppercase()))
        })
        .collect();
    if markers.is_empty() {
        return text.to_string();
    }

    let mut parts: Vec<String> = Vec::with_capacity(markers.len() + 1);
    let preamble = text[..markers[0].0].trim();
    if !preamble.is_empty() {
        let mut preamble = preamble.to_string();
        if !preamble.ends_with(['.', '!', '?', ':', ';', ',']) {
            preamble.push('.');
        }
        parts.push(preamble);
    }

    for (i, (_, end, label)) in markers.iter().enumerate() {
        let stop = markers.get(i + 1).map(|m| m.0).unwrap_or(text.len());
        let content = text[*end..stop]
            .trim()
            .trim_end_matches([',', ';', ' '])
            .trim();
        if content.is_empty() {
            parts.push(format!("{label}."));
            continue;
        }
        let mut option = format!("{label}: {content}");
        if !option.ends_with(['.', '!', '?']) {
            option.push('.');
        }
        parts.push(option);
    }

    parts.join(" ")
}

/// Remove tokens a speech engine reads literally: bare `$`, bare `_`,
/// empty brackets.
fn strip_hostile_tokens(text: &str, _lexicon: &Lexicon) -> String {
    static RE_DOLLAR: OnceLock<Regex> = OnceLock::new();
    let re_dollar = RE_DOLLAR.get_or_init(|| Regex::new(r"\$+").unwrap());
    static RE_UNDERSCORE: OnceLock<Regex> = OnceLock::new();
    let re_underscore = RE_UNDERSCORE.get_or_init(|| Regex::new(r"_+").unwrap());
    static RE_EMPTY: OnceLock<Regex> = OnceLock::new();
    let re_empty =
        RE_EMPTY.get_or_init(|| Regex::new(r"\([ \t]*\)|\[[ \t]*\]|\{[ \t]*\}").unwrap());

    let without_dollars = re_dollar.replace_all(text, |caps: &Captures| {
        let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
        match text[end..].chars().next() {
            Some(c) if c.is_ascii_digit() => "$".to_string(),
            _ => " ".to_string(),
        }
    });
    let result = re_underscore.replace_all(&without_dollars, " ");
    let result = re_empty.replace_all(&result, " ");
    tidy_spaces(&result)
}

fn ensure_terminal_punctuation(text: &str, _lexicon: &Lexicon) -> String {
    let trimmed = text.trim_end();
    if trimmed.is_empty() || trimmed.ends_with(['.', '!', '?']) {
        return trimmed.to_string();
    }
    let base = trimmed.trim_end_matches([',', ';', ':']).trim_end();
    format!("{base}.")
}
