use std::io::Read;

use page::Recognition;

use crate::prelude::*;

/// Source name that reads standard input.
pub const STDIN: &str = "-";

/// What an input file turned out to hold.
#[derive(Debug)]
pub enum Source {
    /// Recognizer output with positions.
    Recognition(Recognition),
    /// Text already in reading order, one row per line.
    Text(Vec<String>),
}

pub fn read_source(source: &str) -> Result<String> {
    if source == STDIN {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read standard input")?;
        return Ok(buffer);
    }
    std::fs::read_to_string(source).with_context(|| f!("Failed to read {source}"))
}

/// JSON objects are recognizer output; anything else is plain text rows.
pub fn parse_source(source_name: &str, raw: &str) -> Result<Source> {
    if !raw.trim_start().starts_with('{') {
        return Ok(Source::Text(text_rows(raw)));
    }
    let recognition = serde_json::from_str(raw).map_err(|e| Error::InvalidRecognition {
        source_name: source_name.to_string(),
        reason: e.to_string(),
    })?;
    log::debug!("{source_name}: recognizer output");
    Ok(Source::Recognition(recognition))
}

pub fn text_rows(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
