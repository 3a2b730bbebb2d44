//! Command-line interface for postcheck.
//!
//! Thin plumbing over the pipeline: the CLI is not part of the core
//! contract, it exists so the pipeline and its stages can be driven by
//! hand. The post source and reply submission live in an external
//! automation layer.

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use crate::adapters::{
    CompletionClient, ContentExtractor, HttpCompletionBackend, HttpSearchProvider, ModelRoster,
    SearchGateway,
};
use crate::config::{self, Config};
use crate::core::{headline, FactCheckPipeline};
use crate::domain::{dedupe_by_url, Register};

#[derive(Debug, Parser)]
#[command(name = "postcheck", about = "Fact-check a social media post and draft a reply")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Explicit config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the full pipeline: queries, search, extraction, verdict, reply
    Check {
        /// Post text; read from stdin when omitted
        text: Option<String>,

        /// Reply register: plain, light (joking), or sharp (sarcastic)
        #[arg(long, default_value = "plain")]
        register: String,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate search queries for a post without searching
    Headlines {
        /// Post text; read from stdin when omitted
        text: Option<String>,
    },

    /// Run one search query and print deduplicated hits
    Search {
        /// Query text
        query: String,
    },
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => config::load_from_path(path)?,
            None => Config::load()?,
        };

        match self.command {
            Commands::Check {
                text,
                register,
                json,
            } => check(&config, text, &register, json).await,
            Commands::Headlines { text } => headlines(&config, text).await,
            Commands::Search { query } => search(&config, &query).await,
        }
    }
}

/// Build the completion client from config
fn build_client(config: &Config) -> Result<CompletionClient<HttpCompletionBackend>> {
    let completion = &config.completion;

    if completion.api_key.is_empty() {
        warn!("No API key configured (POSTCHECK_API_KEY); live completion calls will fail over to fallback generation");
    }

    let backend = HttpCompletionBackend::new(
        completion.api_url.clone(),
        completion.api_key.clone(),
        Duration::from_secs(completion.timeout_seconds),
    )?;

    let roster = ModelRoster::new(completion.model.clone(), completion.backup_models.clone());

    Ok(CompletionClient::new(backend, roster).with_retry_policy(
        completion.max_retries,
        Duration::from_secs(completion.backoff_seconds),
    ))
}

/// Build the search gateway from config
fn build_gateway(config: &Config) -> SearchGateway<HttpSearchProvider> {
    SearchGateway::new(HttpSearchProvider::new(config.search.endpoint.clone()))
        .with_max_results(config.search.max_results)
        .with_recency_qualifier(config.search.recency_qualifier.clone())
}

/// Post text from the argument or stdin
fn read_source_text(text: Option<String>) -> Result<String> {
    match text {
        Some(t) => Ok(t),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read post text from stdin")?;
            Ok(buffer)
        }
    }
}

async fn check(config: &Config, text: Option<String>, register: &str, json: bool) -> Result<()> {
    let source_text = read_source_text(text)?;
    let register: Register = register.parse()?;

    let client = build_client(config)?;
    let gateway = build_gateway(config);
    let extractor = ContentExtractor::new(Duration::from_secs(config.extract.timeout_seconds))?
        .with_max_chars(config.extract.max_chars);

    let mut pipeline = FactCheckPipeline::new(client, gateway, extractor);
    let report = pipeline.run(&source_text, register).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Verdict: {}", report.verdict);
    println!();
    println!("Narrative:");
    println!("{}", report.narrative);
    println!();
    match &report.reply {
        Some(draft) => {
            println!("Reply ({} chars):", draft.text.chars().count());
            println!("{}", draft.text);
        }
        None => println!("No reply drafted (insufficient evidence)."),
    }
    if !report.degraded_stages.is_empty() {
        println!();
        println!("Degraded stages: {}", report.degraded_stages.join(", "));
    }

    Ok(())
}

async fn headlines(config: &Config, text: Option<String>) -> Result<()> {
    let source_text = read_source_text(text)?;
    let mut client = build_client(config)?;

    let plan = headline::generate_queries(&mut client, source_text.trim()).await;

    for (i, query) in plan.queries.iter().enumerate() {
        println!("{}. {}", i + 1, query);
    }
    if plan.degraded {
        println!("(deterministic fallback)");
    }

    Ok(())
}

async fn search(config: &Config, query: &str) -> Result<()> {
    let gateway = build_gateway(config);
    let hits = dedupe_by_url(gateway.search(query).await);

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        println!("Result {}:", i + 1);
        println!("  Title: {}", hit.title);
        println!("  URL: {}", hit.url);
        println!("  Snippet: {}", hit.snippet);
    }

    Ok(())
}
