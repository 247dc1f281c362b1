use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use lexigap::config::Config;
use lexigap::engine::{self, GapPolicy, IngestOptions};
use lexigap::export;
use lexigap::services::{
    HttpClassifier, HttpDetector, HttpTranscriber, HttpTranslator, ServiceSet,
};
use lexigap::store::Dictionary;
use lexigap::SourceLanguage;

#[derive(Parser)]
#[command(name = "lexigap", version, about = "Multilingual vocabulary dictionary")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a single word with translations into the given targets
    Add {
        word: String,
        /// Source language code, or `auto` to detect it
        #[arg(long, default_value = "auto")]
        source: SourceLanguage,
        /// Target language codes, comma-separated
        #[arg(long, value_delimiter = ',', required = true)]
        targets: Vec<String>,
    },
    /// Add words in bulk from a file, one word per line
    Bulk {
        file: PathBuf,
        /// Source language code, or `auto` to detect it per word
        #[arg(long, default_value = "auto")]
        source: SourceLanguage,
        /// Target language codes, comma-separated
        #[arg(long, value_delimiter = ',', required = true)]
        targets: Vec<String>,
        /// Skip words that fail instead of aborting the whole run
        #[arg(long)]
        keep_going: bool,
    },
    /// Translate every word into every known target language
    Fill {
        /// Treat present-but-empty translations as filled
        #[arg(long)]
        keep_empty: bool,
    },
    /// Export the dictionary as a Markdown table
    Export { dest: PathBuf },
    /// Print every word record
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored where the environment is injected directly)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lexigap=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration from environment
    let config = Config::from_env()?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;
    let services = build_services(&config, client);

    let mut dictionary = Dictionary::load(&config.store_path)?;

    match cli.command {
        Command::Add {
            word,
            source,
            targets,
        } => {
            engine::add_word(&services, &mut dictionary, &word, &source, &targets, true).await?;
            info!(
                "Added '{}' with translations into {}",
                lexigap::normalize_word(&word),
                targets.join(", ")
            );
        }
        Command::Bulk {
            file,
            source,
            targets,
            keep_going,
        } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read word list at {}", file.display()))?;
            let report = engine::ingest(
                &services,
                &mut dictionary,
                content.lines(),
                &source,
                &targets,
                IngestOptions { keep_going },
            )
            .await?;

            if !report.failed.is_empty() {
                info!("Words skipped: {}", report.failed.join(", "));
            }
        }
        Command::Fill { keep_empty } => {
            let policy = if keep_empty {
                GapPolicy::KeepEmpty
            } else {
                GapPolicy::RetryEmpty
            };
            let written = engine::fill_gaps(&services, &mut dictionary, policy).await?;
            info!("Gap-filling pass complete: {} translations written", written);
        }
        Command::Export { dest } => {
            export::export_markdown(&dictionary, &dest)?;
        }
        Command::Show => print!("{}", dictionary),
    }

    Ok(())
}

fn build_services(config: &Config, client: reqwest::Client) -> ServiceSet {
    ServiceSet {
        translator: Box::new(HttpTranslator::new(
            client.clone(),
            config.translator_url.clone(),
            config.translator_api_key.clone(),
        )),
        detector: Box::new(HttpDetector::new(
            client.clone(),
            config.detector_url.clone(),
        )),
        classifier: Box::new(HttpClassifier::new(
            client.clone(),
            config.classifier_url.clone(),
            config.classifier_lang.clone(),
            Duration::from_millis(config.classifier_timeout_ms),
        )),
        transcriber: Box::new(HttpTranscriber::new(client, config.transcriber_url.clone())),
        classifier_failure: config.classifier_on_failure,
        transcriber_failure: config.transcriber_on_failure,
    }
}
