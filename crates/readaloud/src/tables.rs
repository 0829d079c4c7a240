use crate::prelude::{println, *};
use readaloud_core::LookupTables;

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct TablesOptions {
    /// Print the pipeline configuration instead of the lookup tables
    #[arg(long)]
    pub pipeline: bool,
}

pub async fn run(options: TablesOptions, global: crate::Global) -> Result<()> {
    let settings = Settings::from_global(&global)?;
    println!("{}", render(options.pipeline, &settings)?);
    Ok(())
}

/// The effective tables or configuration as TOML. Without a `--tables`
/// override the embedded file is printed verbatim, comments included.
pub fn render(pipeline: bool, settings: &Settings) -> Result<String> {
    if pipeline {
        return toml::to_string_pretty(&settings.config)
            .context("Failed to serialize the pipeline configuration");
    }
    if !settings.custom_tables {
        return Ok(LookupTables::builtin_toml().to_string());
    }
    toml::to_string_pretty(settings.lexicon.tables()).context("Failed to serialize the lookup tables")
}
