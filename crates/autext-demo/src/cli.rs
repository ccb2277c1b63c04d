use autext_core::Language;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "autext")]
#[command(
    author,
    version,
    about = "Detect AI-generated paragraphs in English, Spanish, Portuguese, Galician, Basque and Catalan"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Configuration file path (defaults to ./autext.yaml when present)
    #[arg(short, long, global = true, env = "AUTEXT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding word2idx_<code>.json vocabularies
    #[arg(long, global = true, env = "AUTEXT_VOCAB_DIR")]
    pub vocab_dir: Option<PathBuf>,

    /// Directory for downloaded model artifacts
    #[arg(long, global = true, env = "AUTEXT_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Restrict detection to these languages (comma-separated codes)
    #[arg(long, global = true, value_delimiter = ',', value_parser = parse_language)]
    pub languages: Option<Vec<Language>>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a text file (or stdin) and print the paragraph report
    Detect {
        /// Read text from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Show the AI probability of every paragraph
        #[arg(short, long)]
        details: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Download and load models ahead of time
    Fetch {
        /// Languages to fetch (all configured languages when empty)
        #[arg(value_parser = parse_language)]
        languages: Vec<Language>,
    },

    /// List supported languages and their configured model sources
    Languages,

    /// Start the demo web page and JSON API
    Serve {
        /// Listen port
        #[arg(short, long, default_value = "3000", env = "AUTEXT_PORT")]
        port: u16,

        /// Listen address
        #[arg(short, long, default_value = "127.0.0.1", env = "AUTEXT_ADDRESS")]
        address: String,

        /// Load every configured model before accepting requests
        #[arg(long)]
        preload: bool,
    },
}

fn parse_language(s: &str) -> Result<Language, String> {
    s.parse::<Language>().map_err(|e| e.to_string())
}
