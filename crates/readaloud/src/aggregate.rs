use crate::input::read_source;
use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use futures::future::try_join_all;

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct AggregateOptions {
    /// Text captures of the same page, in capture order
    #[arg(value_name = "FRAME", required = true)]
    pub frames: Vec<String>,

    /// Run the composite through the reading pipeline and print speech
    #[arg(long)]
    pub speech: bool,
}

pub async fn run(options: AggregateOptions, global: crate::Global) -> Result<()> {
    let settings = Settings::from_global(&global)?;

    if global.verbose {
        eprintln!("Merging {} frame(s)...", options.frames.len());
    }

    let frames = read_frames(&options.frames).await?;
    let output = merge(&frames, options.speech, &settings)?;

    if output.is_empty() {
        eprintln!("{}: no text detected", "warning".yellow().bold());
    } else {
        println!("{}", output);
    }

    Ok(())
}

async fn read_frames(sources: &[String]) -> Result<Vec<String>> {
    let tasks = sources.iter().cloned().map(|source| {
        tokio::task::spawn_blocking(move || read_source(&source))
    });
    try_join_all(tasks).await?.into_iter().collect()
}

/// The composite text, or its speech rendering when `speech` is set.
pub fn merge(frames: &[String], speech: bool, settings: &Settings) -> Result<String> {
    if speech {
        let read = page::read_frames(frames, &settings.config, &settings.lexicon)?;
        return Ok(read.speech);
    }
    Ok(readaloud_core::aggregate(frames, &settings.config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::from_global(&crate::Global {
            config: None,
            tables: None,
            verbose: false,
        })
        .unwrap()
    }

    fn frames(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_composite() {
        let merged = merge(&frames(&["Hello world.", "Hello world"]), false, &settings()).unwrap();
        assert_eq!(merged, "Hello world.");
    }

    #[test]
    fn test_merge_speech() {
        let input = frames(&["27. Explain the sod types", "27. Explain the sod types."]);
        let merged = merge(&input, true, &settings()).unwrap();
        assert_eq!(merged, "Twenty-seven. Explain the soil types.");
    }

    #[test]
    fn test_merge_requires_frames() {
        assert!(merge(&[], false, &settings()).is_err());
    }
}
