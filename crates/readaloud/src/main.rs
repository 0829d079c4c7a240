use crate::prelude::*;
use clap::Parser;

mod aggregate;
mod error;
mod input;
mod normalize;
mod prelude;
mod questions;
mod read;
mod settings;
mod tables;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Turn recognized document text into a speech-ready reading stream"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Pipeline configuration file (TOML)
    #[clap(long, env = "READALOUD_CONFIG", global = true)]
    config: Option<std::path::PathBuf>,

    /// Lookup tables file replacing the built-in dictionaries (TOML)
    #[clap(long, env = "READALOUD_TABLES", global = true)]
    tables: Option<std::path::PathBuf>,

    /// Whether to display additional information.
    #[clap(long, env = "READALOUD_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Read recognizer output (JSON) or ordered text into a speech-ready stream
    Page(crate::read::ReadOptions),

    /// Run the lexical correction chain over plain text
    Normalize(crate::normalize::NormalizeOptions),

    /// Split text into questions and options
    Questions(crate::questions::QuestionsOptions),

    /// Merge several captures of the same page
    Aggregate(crate::aggregate::AggregateOptions),

    /// Print the built-in lookup tables or default configuration
    Tables(crate::tables::TablesOptions),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Page(options) => crate::read::run(options, app.global).await,
        SubCommands::Normalize(options) => crate::normalize::run(options, app.global).await,
        SubCommands::Questions(options) => crate::questions::run(options, app.global).await,
        SubCommands::Aggregate(options) => crate::aggregate::run(options, app.global).await,
        SubCommands::Tables(options) => crate::tables::run(options, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
