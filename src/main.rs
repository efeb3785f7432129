mod cli;
mod conversation_state;
mod openrouter_client;

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use eyre::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use crate::cli::chat::ChatContext;
use crate::cli::interview::{self, InterviewContext};
use crate::openrouter_client::{CompletionService, OpenRouterClient, OpenRouterConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input to send to the chat
    #[arg(short, long)]
    input: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a chat session
    Chat {
        /// Input to send to the chat
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Run the two-role job interview simulation
    Interview {
        /// Number of model turns before the interview ends
        #[arg(long, default_value_t = interview::DEFAULT_MAX_TURNS)]
        max_turns: u32,

        /// Model identifier used for both roles
        #[arg(long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("Starting OpenRouter Chat CLI");

    match cli.command {
        Some(Commands::Chat { input }) => run_chat(input).await,
        Some(Commands::Interview { max_turns, model }) => run_interview(max_turns, model).await,
        // Default to chat if no subcommand is provided
        None => run_chat(cli.input).await,
    }
}

async fn run_chat(input: Option<String>) -> Result<ExitCode> {
    let config = OpenRouterConfig::from_env()?;
    let service: Arc<dyn CompletionService> = Arc::new(OpenRouterClient::new(config)?);

    let interactive = input.is_none();
    let mut chat_context = ChatContext::new(Box::new(io::stdout()), input, interactive, service);
    chat_context.run().await
}

async fn run_interview(max_turns: u32, model: Option<String>) -> Result<ExitCode> {
    let mut config = OpenRouterConfig::from_env()?.with_temperature(0.0);
    if let Some(model) = model {
        config = config.with_model(model);
    }

    // One client per role, sharing the same configuration.
    let interviewer = Arc::new(OpenRouterClient::new(config.clone())?);
    let interviewee = Arc::new(OpenRouterClient::new(config)?);

    let mut interview_context =
        InterviewContext::new(Box::new(io::stdout()), interviewer, interviewee, max_turns);
    interview_context.run().await
}
