mod cache;
mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod server;
mod services;
#[cfg(test)]
mod testing;
mod workflow;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::enrich::{self, EnrichCommandArgs};
use crate::cmd::serve;
use crate::config::{AppConfig, LlmProvider, LogFormat};
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::github::GithubClient;
use crate::infra::linear::LinearClient;
use crate::infra::llm::AnthropicClient;
use crate::services::LanguageModelService;

#[derive(Parser)]
#[command(
    name = "ticket-enricher",
    author,
    version,
    about = "Enriches Linear tickets with an LLM and retrieved context"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the webhook and trigger HTTP server.
    Serve(ServeArgs),
    /// Enrich a single ticket and wait for the result.
    Enrich(EnrichArgs),
    /// Inspect configuration.
    Config(ConfigArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Override the port from the environment.
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Args)]
struct EnrichArgs {
    /// Linear issue id or identifier (e.g. ENG-12).
    issue_id: String,
    /// Post progress comments on the ticket.
    #[arg(long)]
    feedback: bool,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config(args) => {
            config_cmd::run(args.command)?;
            Ok(())
        }
        Commands::Serve(args) => {
            let mut config = AppConfig::load()?;
            if let Some(port) = args.port {
                config.port = port;
            }
            init_tracing(&config);
            serve::run(build_context(config)).await
        }
        Commands::Enrich(args) => {
            let config = AppConfig::load()?;
            init_tracing(&config);
            let context = build_context(config);
            let outcome = enrich::run(
                &context,
                EnrichCommandArgs {
                    issue_id: args.issue_id,
                    feedback: args.feedback,
                },
            )
            .await?;

            println!(
                "Ticket {} enriched: {}",
                outcome.identifier, outcome.result.title
            );
            for source in &outcome.sources {
                println!("  source: {source}");
            }
            Ok(())
        }
    }
}

fn init_tracing(config: &AppConfig) {
    // RUST_LOG wins over LOG_LEVEL when both are set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

fn build_context(config: AppConfig) -> AppContext {
    if config.linear_api_key.is_none() {
        warn!("Linear API key not configured; ticket fetch and updates will fail.");
    }
    if config.anthropic_api_key.is_none() {
        warn!("Anthropic API key not configured; enrichment will fail.");
    }
    if config.github_token.is_none() {
        info!("GitHub token not configured; code search disabled.");
    }

    let language_model: Arc<dyn LanguageModelService> = match &config.llm_provider {
        LlmProvider::Anthropic => Arc::new(AnthropicClient::new(
            config.anthropic_api_key.clone(),
            config.anthropic_model.clone(),
        )),
        LlmProvider::Custom(provider) => {
            warn!("custom LLM provider '{provider}' not yet implemented, using Anthropic fallback.");
            Arc::new(AnthropicClient::new(
                config.anthropic_api_key.clone(),
                config.anthropic_model.clone(),
            ))
        }
    };

    let issue_tracker = Arc::new(LinearClient::new(config.linear_api_key.clone()));
    let code_host = Arc::new(GithubClient::new(
        config.github_token.clone(),
        config.github_org.clone(),
    ));

    AppContext::new(config, issue_tracker, code_host, language_model)
}
