use std::path::Path;
use std::sync::Arc;

use readaloud_core::{Lexicon, PipelineConfig};

use crate::prelude::{eprintln, *};

/// Pipeline configuration and lexicon resolved from the global flags.
///
/// Cheap to clone so each blocking worker can own a copy.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: PipelineConfig,
    pub lexicon: Arc<Lexicon>,
    /// True when `--tables` replaced the built-in dictionaries.
    pub custom_tables: bool,
}

impl Settings {
    pub fn from_global(global: &crate::Global) -> Result<Self> {
        let config = match &global.config {
            Some(path) => PipelineConfig::load(path).map_err(|e| load_error(path, e))?,
            None => PipelineConfig::default(),
        };
        let lexicon = match &global.tables {
            Some(path) => Arc::new(Lexicon::load(path).map_err(|e| load_error(path, e))?),
            None => Lexicon::shared(),
        };

        if global.verbose {
            eprintln!(
                "Row threshold {}px, similarity threshold {}",
                config.row_threshold, config.similarity_threshold
            );
        }
        log::debug!("pipeline configuration: {config:?}");

        Ok(Settings {
            config,
            lexicon,
            custom_tables: global.tables.is_some(),
        })
    }
}

fn load_error(path: &Path, err: readaloud_core::Error) -> color_eyre::eyre::Report {
    Error::Settings {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn global(config: Option<&Path>, tables: Option<&Path>) -> crate::Global {
        crate::Global {
            config: config.map(Path::to_path_buf),
            tables: tables.map(Path::to_path_buf),
            verbose: false,
        }
    }

    #[test]
    fn test_defaults_without_flags() {
        let settings = Settings::from_global(&global(None, None)).unwrap();
        assert_eq!(settings.config, PipelineConfig::default());
        assert!(settings.lexicon.is_common_word("are"));
        assert!(!settings.custom_tables);
    }

    #[test]
    fn test_builtin_lexicon_is_shared() {
        let first = Settings::from_global(&global(None, None)).unwrap();
        let second = Settings::from_global(&global(None, None)).unwrap();
        assert!(Arc::ptr_eq(&first.lexicon, &second.lexicon));
        assert!(std::ptr::eq(first.lexicon.as_ref(), Lexicon::builtin()));
    }

    #[test]
    fn test_config_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "row_threshold = 35.0").unwrap();
        let settings = Settings::from_global(&global(Some(file.path()), None)).unwrap();
        assert_eq!(settings.config.row_threshold, 35.0);
    }

    #[test]
    fn test_bad_tables_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "common_words = 3").unwrap();
        let err = Settings::from_global(&global(None, Some(file.path()))).unwrap_err();
        assert!(err.to_string().contains("Could not load"));
    }
}
