//! chat-proxy CLI
//!
//! Commands:
//!   serve - Start the HTTP proxy (default)
//!   check - Show resolved configuration and verify the system prompt

use anyhow::{bail, Result};
use chat_proxy::{server, Config, FilePromptLoader, PromptLoader};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chat-proxy")]
#[command(about = "Forward chat messages to an LLM completion API")]
#[command(version)]
struct Cli {
    /// Optional TOML config file (environment variables still override it)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// System prompt file (overrides SYSTEM_PROMPT_PATH)
        #[arg(long)]
        prompt: Option<PathBuf>,
    },

    /// Print the resolved configuration and check the system prompt is readable
    Check,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Serve {
        port: None,
        prompt: None,
    }) {
        Commands::Serve { port, prompt } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(prompt) = prompt {
                config.system_prompt_path = prompt;
            }
            server::run(&config).await?;
        }

        Commands::Check => {
            println!("API key:        {}", config.redacted_api_key());
            println!("Model:          {}", config.model);
            println!("API base URL:   {}", config.api_base_url);
            println!("Port:           {}", config.port);
            println!("Timeout:        {}s", config.request_timeout_secs);
            let loader = FilePromptLoader::new(config.system_prompt_path.clone());
            println!("System prompt:  {}", loader.path().display());
            let prompt = match loader.load().await {
                Ok(prompt) => prompt,
                Err(e) => bail!("System prompt is not readable: {}", e),
            };
            if prompt.is_empty() {
                bail!("System prompt is empty");
            }
            info!(chars = prompt.chars().count(), "System prompt OK");

            if config.api_key().is_none() {
                bail!("OPENAI_API_KEY is not configured");
            }
            println!("\n\x1b[32m✓\x1b[0m Configuration looks good.");
        }
    }

    Ok(())
}
