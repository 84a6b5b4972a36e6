use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use termi::config::Config;
use termi::dialogue::Outcome;
use termi::{llm, runner, tui};

#[derive(Parser)]
#[command(name = "termi")]
#[command(author, version, about = "Turn natural language into a runnable shell command", long_about = None)]
struct Cli {
    /// What you want done, in plain language
    #[arg(required = true, trailing_var_arg = true)]
    query: Vec<String>,

    /// LLM provider to use (openai, azure-openai, gemini, claude, llama-cpp)
    #[arg(short, long)]
    provider: Option<String>,

    /// Model override for the selected provider
    #[arg(short, long)]
    model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they never corrupt the TUI.
    let filter = if cli.verbose { "termi=debug" } else { "termi=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let query = cli.query.join(" ");

    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("failed to load config: {e}; falling back to environment");
        Config::from_env()
    });
    if let Some(provider) = cli.provider {
        config.llm.provider = provider;
    }
    if let Some(model) = cli.model {
        apply_model_override(&mut config, model);
    }
    if let Err(e) = config.validate() {
        // Not fatal here: the dialogue reports the missing credential as a
        // classified auth error instead of a startup crash.
        tracing::debug!("provider configuration incomplete: {e}");
    }

    let provider: Arc<dyn llm::LlmProvider> = Arc::from(llm::create_provider(&config)?);
    tracing::info!("using provider: {}", provider.name());

    let outcome = tui::run_dialogue(query, provider, config.dialogue.max_clarify_turns).await?;

    match outcome {
        Outcome::Run(command) => {
            println!("\n{} {}\n", "Executing:".green().bold(), command);
            let status = runner::run(&command)?;
            if !status.success() {
                std::process::exit(status.code().unwrap_or(1));
            }
            Ok(())
        }
        Outcome::Copied(command) => {
            println!("{} {}", "Copied to clipboard:".green().bold(), command);
            Ok(())
        }
        Outcome::Canceled => {
            println!("Canceled.");
            Ok(())
        }
        Outcome::Failed(error) => {
            tracing::debug!("run failed: {error:?}");
            anyhow::bail!("{}", error.user_message());
        }
    }
}

fn apply_model_override(config: &mut Config, model: String) {
    match config.llm.provider.as_str() {
        "openai" | "gpt" => config.llm.openai.model = model,
        "azure-openai" | "azure" => config.llm.azure_openai.deployment_id = model,
        "gemini" | "google" => config.llm.gemini.model = model,
        "claude" | "anthropic" => config.llm.claude.model = model,
        // llama.cpp serves one model; there is nothing to override
        _ => {}
    }
}
