//! Command-line interface definitions.
//!
//! Global options can be given as flags or environment variables and
//! override values read from the YAML config file.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for emociones_farandula.
///
/// # Examples
///
/// ```sh
/// # Analyze a single article
/// emociones_farandula analyze https://example.com/nota
///
/// # Batch over a URL file
/// emociones_farandula batch urls.txt -o results.json
///
/// # Batch over an RSS feed, with a trained model
/// emociones_farandula --model-path model.json batch --feed https://example.com/rss -o results.json
///
/// # HTTP API
/// emociones_farandula serve 0.0.0.0 8080
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long, global = true, env = "EMOCIONES_CONFIG")]
    pub config: Option<PathBuf>,

    /// HTTP timeout in seconds for article downloads
    #[arg(long, global = true, env = "EMOCIONES_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Path to a naive Bayes emotion model (JSON)
    #[arg(long, global = true, env = "EMOCIONES_MODEL_PATH")]
    pub model_path: Option<PathBuf>,

    /// Never load the probabilistic model; score with the lexicon only
    #[arg(long, global = true)]
    pub lexicon_only: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Fetch one article and print its text, dominant emotion and scores
    Analyze {
        /// Article URL
        url: String,
    },

    /// Analyze every URL of a list file or feed and write a JSON report
    Batch {
        /// File with one URL per line (`#` starts a comment)
        #[arg(required_unless_present = "feed", conflicts_with = "feed")]
        urls_file: Option<PathBuf>,

        /// RSS or Atom feed to read article URLs from
        #[arg(long)]
        feed: Option<String>,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Serve the HTTP API
    Serve {
        /// Address to bind
        #[arg(default_value = "127.0.0.1")]
        host: String,

        /// Port to bind
        #[arg(default_value_t = 8000)]
        port: u16,
    },
}
