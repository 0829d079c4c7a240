//! Tunable pipeline parameters.
//!
//! The row threshold in particular is a fixed pixel value that depends on the
//! capture resolution, so it is configuration rather than a constant.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Lines whose `top` differs by less than this many pixels share a row.
    pub row_threshold: f32,
    /// Multiple of the mean character width that separates two words.
    pub word_gap_factor: f32,
    /// Share of single-character elements above which a line is treated as
    /// fragmented and regrouped into words.
    pub fragment_ratio: f32,
    /// Drop elements whose recognizer confidence is below this value.
    /// Ignored for elements that carry no confidence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_confidence: Option<f32>,
    /// Two frame lines at or above this similarity are duplicates.
    pub similarity_threshold: f32,
    /// Word recovery only runs while the composite is shorter than this.
    pub recovery_max_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            row_threshold: 20.0,
            word_gap_factor: 1.5,
            fragment_ratio: 0.5,
            min_confidence: None,
            similarity_threshold: 0.85,
            recovery_max_chars: 500,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, Error> {
        let config: PipelineConfig =
            toml::from_str(s).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)?;
        PipelineConfig::from_toml_str(&raw)
    }

    fn validate(&self) -> Result<(), Error> {
        if !(self.row_threshold > 0.0) {
            return Err(Error::InvalidConfig(
                "row_threshold must be positive".to_string(),
            ));
        }
        if !(self.word_gap_factor > 0.0) {
            return Err(Error::InvalidConfig(
                "word_gap_factor must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(Error::InvalidConfig(
                "similarity_threshold must be within 0..=1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.row_threshold, 20.0);
        assert_eq!(config.word_gap_factor, 1.5);
        assert!(config.min_confidence.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml_str("row_threshold = 30.0").unwrap();
        assert_eq!(config.row_threshold, 30.0);
        assert_eq!(config.similarity_threshold, 0.85);
        assert_eq!(config.recovery_max_chars, 500);
    }

    #[test]
    fn test_rejects_non_positive_threshold() {
        assert!(matches!(
            PipelineConfig::from_toml_str("row_threshold = 0.0"),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_bad_similarity() {
        assert!(PipelineConfig::from_toml_str("similarity_threshold = 1.5").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"min_confidence = 0.4\n").unwrap();
        let config = PipelineConfig::load(file.path()).unwrap();
        assert_eq!(config.min_confidence, Some(0.4));
    }
}
