use crate::input::{parse_source, read_source, Source};
use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use futures::future::try_join_all;
use page::ReadPage;
use readaloud_core::Question;
use serde::Serialize;

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ReadOptions {
    /// Recognizer output (JSON) or ordered text files; `-` reads stdin
    #[arg(value_name = "INPUT", default_value = "-")]
    pub inputs: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Read question by question instead of the whole stream
    #[arg(long)]
    pub questions: bool,
}

/// What gets handed to the speech engine and persisted for one input.
#[derive(Debug, Serialize)]
pub struct Transcript {
    pub created_at: String,
    pub source: String,
    pub stream: String,
    pub speech: String,
    pub questions: Vec<Question>,
    pub question_speech: Vec<String>,
}

impl Transcript {
    pub fn new(source: &str, page: ReadPage, settings: &Settings) -> Self {
        let question_speech = page.question_speech(&settings.lexicon);
        Transcript {
            created_at: chrono::Utc::now().to_rfc3339(),
            source: source.to_string(),
            stream: page.stream,
            speech: page.speech,
            questions: page.questions,
            question_speech,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stream.is_empty()
    }
}

pub async fn run(options: ReadOptions, global: crate::Global) -> Result<()> {
    let settings = Settings::from_global(&global)?;

    if global.verbose {
        eprintln!("Reading {} input(s)...", options.inputs.len());
    }

    let transcripts = read_all(&options.inputs, &settings).await?;

    if options.json {
        output_json(&transcripts)?;
    } else {
        output_formatted(&transcripts, &options);
    }

    Ok(())
}

/// Read every input on the blocking pool. Output order follows input order.
pub async fn read_all(inputs: &[String], settings: &Settings) -> Result<Vec<Transcript>> {
    let tasks = inputs.iter().cloned().map(|input| {
        let settings = settings.clone();
        tokio::task::spawn_blocking(move || read_input(&input, &settings))
    });

    try_join_all(tasks).await?.into_iter().collect()
}

/// Run one input through the pipeline.
pub fn read_input(source: &str, settings: &Settings) -> Result<Transcript> {
    let raw = read_source(source)?;
    let page = match parse_source(source, &raw)? {
        Source::Recognition(recognition) => {
            page::read(recognition, &settings.config, &settings.lexicon)?
        }
        Source::Text(rows) => ReadPage::from_rows(rows, &settings.lexicon),
    };
    Ok(Transcript::new(source, page, settings))
}

fn output_json(transcripts: &[Transcript]) -> Result<()> {
    let json = match transcripts {
        [single] => serde_json::to_string_pretty(single)?,
        many => serde_json::to_string_pretty(many)?,
    };
    println!("{}", json);
    Ok(())
}

fn output_formatted(transcripts: &[Transcript], options: &ReadOptions) {
    let many = transcripts.len() > 1;

    for transcript in transcripts {
        if many {
            eprintln!("\n{}", transcript.source.bright_cyan().bold());
        }

        if transcript.is_empty() {
            eprintln!(
                "{}: no text detected in {}",
                "warning".yellow().bold(),
                transcript.source
            );
            continue;
        }

        if options.questions && !transcript.question_speech.is_empty() {
            for line in &transcript.question_speech {
                println!("{}", line);
            }
        } else {
            println!("{}", transcript.speech);
        }
    }
}
