//! # Emociones Farándula
//!
//! Fetches Spanish-language news articles and scores the emotions they convey
//! (`anger`, `fear`, `joy`, `sadness`).
//!
//! ## Features
//!
//! - Article extraction with a Readability pass and a paragraph-selection fallback
//! - Emotion scoring with an optional naive Bayes model and a lexicon fallback
//! - Single-URL command, batch runs over URL files or RSS/Atom feeds, and an HTTP API
//!
//! ## Usage
//!
//! ```sh
//! emociones_farandula analyze https://example.com/nota
//! emociones_farandula batch urls.txt -o results.json
//! emociones_farandula serve 127.0.0.1 8000
//! ```
//!
//! ## Architecture
//!
//! 1. **Extraction**: [`scrapers::ContentExtractor`] turns a URL into an article
//! 2. **Classification**: [`analyzer::EmotionClassifier`] scores title + body
//! 3. **Surfaces**: [`cli`], [`crawler`] and [`api`] drive the [`pipeline::Pipeline`]

use clap::Parser;
use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod analyzer;
mod api;
mod cli;
mod config;
mod crawler;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

use cli::{Cli, Command};
use config::AppConfig;
use outputs::json;
use pipeline::Pipeline;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = AppConfig::resolve(&args)?;
    let extractor = config.build_extractor()?;
    let classifier = config.build_classifier();
    let pipeline = Pipeline::new(extractor, classifier);
    info!(
        timeout_secs = config.timeout_secs,
        strategies = ?pipeline.extractor.strategies(),
        model_path = ?config.model_path,
        use_model = config.use_model,
        "Pipeline ready"
    );

    let code = match args.command {
        Command::Analyze { url } => run_analyze(&pipeline, &url).await,
        Command::Batch {
            urls_file,
            feed,
            output,
        } => {
            let urls = match (urls_file, feed) {
                (_, Some(feed_url)) => {
                    scrapers::rss::index_feed(pipeline.extractor.client(), &feed_url).await?
                }
                (Some(path), None) => crawler::read_urls_file(&path).await?,
                (None, None) => Vec::new(),
            };
            let entries = crawler::process_urls(&pipeline, urls).await;
            if let Err(e) = json::write_results(&entries, &output).await {
                error!(path = %output.display(), error = %e, "Failed to write results");
                return Err(e);
            }
            println!("Guardados {} resultados en {}", entries.len(), output.display());
            ExitCode::SUCCESS
        }
        Command::Serve { host, port } => {
            api::serve(Arc::new(pipeline), &host, port).await?;
            ExitCode::SUCCESS
        }
    };

    let elapsed = start_time.elapsed();
    info!(?elapsed, "Execution complete");
    Ok(code)
}

/// Fetch one article and print it with its emotion analysis.
#[instrument(level = "info", skip(pipeline))]
async fn run_analyze(pipeline: &Pipeline, url: &str) -> ExitCode {
    let Some(result) = pipeline.analyze_url(url).await else {
        error!("Could not fetch article");
        println!("No se pudo obtener el artículo.");
        return ExitCode::from(2);
    };

    let dominant = result
        .dominant
        .map(|e| e.to_string())
        .unwrap_or_else(|| "ninguna".to_string());
    let scores = serde_json::to_string(&result.scores).unwrap_or_default();

    println!("Título: {}", result.title);
    println!("\n--- TEXTO ---");
    println!("{}", result.text);
    println!("--- FIN TEXTO ---\n");
    println!("Emoción dominante: {dominant}");
    println!("Scores: {scores}");
    ExitCode::SUCCESS
}
