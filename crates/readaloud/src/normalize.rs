use crate::input::read_source;
use crate::prelude::{println, *};
use readaloud_core::{Lexicon, Normalizer};

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct NormalizeOptions {
    /// Text file to normalize; `-` reads stdin
    #[arg(value_name = "INPUT", default_value = "-")]
    pub input: String,

    /// Stop after the structure-preserving clean pass
    #[arg(long)]
    pub clean: bool,
}

pub async fn run(options: NormalizeOptions, global: crate::Global) -> Result<()> {
    let settings = Settings::from_global(&global)?;
    let raw = read_source(&options.input)?;
    println!("{}", normalize_text(&raw, options.clean, &settings.lexicon));
    Ok(())
}

pub fn normalize_text(raw: &str, clean_only: bool, lexicon: &Lexicon) -> String {
    let normalizer = Normalizer::new(lexicon);
    if clean_only {
        normalizer.clean(raw)
    } else {
        normalizer.normalize(raw)
    }
}
