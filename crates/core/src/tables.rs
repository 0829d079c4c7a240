//! Static lookup tables shared by every pipeline stage.
//!
//! The tables are plain data ([`LookupTables`]) deserialized from TOML. A
//! built-in copy is embedded in the binary; callers may load a replacement
//! file to localize dictionaries. [`Lexicon`] is the compiled form: the data
//! plus the regexes derived from it, built once and shared read-only.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Error;

const BUILTIN_TABLES: &str = include_str!("tables.toml");

/// Raw dictionary data as it appears in a tables file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupTables {
    pub common_words: Vec<String>,
    #[serde(default)]
    pub despace_vocabulary: Vec<String>,
    #[serde(default)]
    pub ocr_corrections: BTreeMap<String, String>,
    pub roman_numerals: BTreeMap<String, u32>,
    pub number_words: NumberWords,
}

/// Spelled-out numbers: `units` covers 0..=19, `tens` is indexed by the tens
/// digit (entries 0 and 1 are unused).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberWords {
    pub units: Vec<String>,
    pub tens: Vec<String>,
    pub hundred: String,
}

impl LookupTables {
    /// The raw TOML of the built-in tables.
    pub fn builtin_toml() -> &'static str {
        BUILTIN_TABLES
    }

    pub fn from_toml_str(s: &str) -> Result<Self, Error> {
        let tables: LookupTables =
            toml::from_str(s).map_err(|e| Error::InvalidTables(e.to_string()))?;
        tables.validate()?;
        Ok(tables)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.number_words.units.len() != 20 {
            return Err(Error::InvalidTables(format!(
                "number_words.units must have 20 entries, found {}",
                self.number_words.units.len()
            )));
        }
        if self.number_words.tens.len() != 10 {
            return Err(Error::InvalidTables(format!(
                "number_words.tens must have 10 entries, found {}",
                self.number_words.tens.len()
            )));
        }
        Ok(())
    }
}

/// Compiled, immutable view over a [`LookupTables`].
#[derive(Debug)]
pub struct Lexicon {
    tables: LookupTables,
    common: HashSet<String>,
    corrections: BTreeMap<String, String>,
    corrections_re: Option<Regex>,
    despacers: Vec<(Regex, String)>,
}

impl Lexicon {
    pub fn new(tables: LookupTables) -> Result<Self, Error> {
        tables.validate()?;

        let common = tables
            .common_words
            .iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        let corrections: BTreeMap<String, String> = tables
            .ocr_corrections
            .iter()
            .map(|(from, to)| (from.to_lowercase(), to.clone()))
            .collect();

        // Longest keys first so the alternation prefers the most specific misread.
        let mut keys: Vec<&String> = corrections.keys().collect();
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let corrections_re = if keys.is_empty() {
            None
        } else {
            let alternation = keys
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            Some(compile(&format!(r"(?i)\b(?:{alternation})\b"))?)
        };

        let mut despacers = Vec::new();
        for word in &tables.despace_vocabulary {
            let letters: Vec<String> = word
                .trim()
                .chars()
                .map(|c| regex::escape(&c.to_string()))
                .collect();
            if letters.len() < 2 {
                log::warn!("skipping de-spacing entry {word:?}: too short");
                continue;
            }
            let pattern = format!(r"(?i)\b{}\b", letters.join(r"[ \t]+"));
            despacers.push((compile(&pattern)?, word.trim().to_lowercase()));
        }

        Ok(Lexicon {
            tables,
            common,
            corrections,
            corrections_re,
            despacers,
        })
    }

    pub fn from_toml_str(s: &str) -> Result<Self, Error> {
        Lexicon::new(LookupTables::from_toml_str(s)?)
    }

    /// Load a tables file from disk.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)?;
        Lexicon::from_toml_str(&raw)
    }

    /// The process-wide built-in lexicon, compiled on first use.
    pub fn builtin() -> &'static Lexicon {
        builtin_shared()
    }

    /// A shared handle to [`Lexicon::builtin`] for owners that also accept
    /// custom tables.
    pub fn shared() -> Arc<Lexicon> {
        Arc::clone(builtin_shared())
    }

    pub fn tables(&self) -> &LookupTables {
        &self.tables
    }

    pub fn is_common_word(&self, word: &str) -> bool {
        self.common.contains(&word.to_lowercase())
    }

    /// Replacement for a known misread, looked up case-insensitively.
    pub fn correction(&self, token: &str) -> Option<&str> {
        self.corrections
            .get(&token.to_lowercase())
            .map(String::as_str)
    }

    pub(crate) fn corrections_regex(&self) -> Option<&Regex> {
        self.corrections_re.as_ref()
    }

    pub(crate) fn despacers(&self) -> &[(Regex, String)] {
        &self.despacers
    }

    /// Arabic value of a Roman numeral in the table (case-insensitive).
    pub fn roman_value(&self, numeral: &str) -> Option<u32> {
        self.tables
            .roman_numerals
            .get(&numeral.to_lowercase())
            .copied()
    }

    /// Spell out `n` for speech. Only 0..=100 are in the table.
    pub fn number_to_words(&self, n: u32) -> Option<String> {
        let words = &self.tables.number_words;
        match n {
            0..=19 => words.units.get(n as usize).cloned(),
            20..=99 => {
                let tens = words.tens.get((n / 10) as usize)?;
                match n % 10 {
                    0 => Some(tens.clone()),
                    unit => Some(format!("{}-{}", tens, words.units.get(unit as usize)?)),
                }
            }
            100 => Some(words.hundred.clone()),
            _ => None,
        }
    }
}

fn compile(pattern: &str) -> Result<Regex, Error> {
    Regex::new(pattern).map_err(|e| Error::InvalidTables(e.to_string()))
}

fn builtin_shared() -> &'static Arc<Lexicon> {
    static BUILTIN: OnceLock<Arc<Lexicon>> = OnceLock::new();
    BUILTIN.get_or_init(|| {
        Arc::new(Lexicon::from_toml_str(BUILTIN_TABLES).expect("embedded tables.toml is valid"))
    })
}
