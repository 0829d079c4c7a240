use crate::prelude::{eprintln, println, *};
use crate::read::read_input;
use colored::Colorize;
use readaloud_core::Question;

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct QuestionsOptions {
    /// Recognizer output (JSON) or ordered text; `-` reads stdin
    #[arg(value_name = "INPUT", default_value = "-")]
    pub input: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Print one speech-ready line per question
    #[arg(long)]
    pub speech: bool,
}

pub async fn run(options: QuestionsOptions, global: crate::Global) -> Result<()> {
    let settings = Settings::from_global(&global)?;

    let transcript = tokio::task::spawn_blocking({
        let input = options.input.clone();
        move || read_input(&input, &settings)
    })
    .await??;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&transcript.questions)?);
        return Ok(());
    }

    if transcript.questions.is_empty() {
        eprintln!("{}: no questions found", "warning".yellow().bold());
        return Ok(());
    }

    if options.speech {
        for line in &transcript.question_speech {
            println!("{}", line);
        }
        return Ok(());
    }

    let mut table = crate::prelude::new_table();
    table.add_row(prettytable::row!["#", "Question", "Options"]);
    for question in &transcript.questions {
        table.add_row(prettytable::row![
            question.number,
            question.text,
            option_lines(question)
        ]);
    }
    table.printstd();

    Ok(())
}

/// One `(a) text` line per option.
fn option_lines(question: &Question) -> String {
    question
        .labelled_options()
        .map(|(label, text)| f!("({label}) {text}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_lines() {
        let question = Question {
            number: 3,
            text: "Pick one".to_string(),
            options: vec!["red".to_string(), "blue".to_string()],
        };
        assert_eq!(option_lines(&question), "(a) red\n(b) blue");
    }

    #[test]
    fn test_option_lines_without_options() {
        let question = Question {
            number: 1,
            text: "Describe it".to_string(),
            options: Vec::new(),
        };
        assert_eq!(option_lines(&question), "");
    }
}
