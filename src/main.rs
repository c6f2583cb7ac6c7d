use anyhow::Result;
use clap::{Parser, Subcommand};

use distill::config::{Overrides, Settings};
use distill::repl;

#[derive(Parser)]
#[command(name = "distill")]
#[command(version, about = "Chat agent with bounded context via summary compaction")]
pub struct Cli {
    /// Enable debug-level diagnostics
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Main conversation model id
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Summarizer model id (defaults to the main model)
    #[arg(long, global = true)]
    pub summarizer_model: Option<String>,

    /// Sampling temperature for the main model, 0..=1
    #[arg(long, global = true)]
    pub temperature: Option<f32>,

    /// Number of most-recent messages kept verbatim
    #[arg(long, global = true)]
    pub keep_count: Option<usize>,

    /// Messages per summary turn in chunked mode
    #[arg(long, global = true)]
    pub chunk_size: Option<usize>,

    /// Compaction granularity: single-shot or chunked
    #[arg(long, global = true)]
    pub granularity: Option<String>,

    /// Per-request timeout for remote model calls, in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat session
    Chat,
    /// View the effective configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            model: self.model.clone(),
            summarizer_model: self.summarizer_model.clone(),
            temperature: self.temperature,
            keep_count: self.keep_count,
            chunk_size: self.chunk_size,
            granularity: self.granularity.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "distill=debug" } else { "distill=info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = Settings::resolve(&cli.overrides())?;

    match &cli.command {
        Commands::Chat => {
            repl::run(&settings).await?;
        }
        Commands::Config { command } => match command.clone().unwrap_or(ConfigCommands::Show) {
            ConfigCommands::Show => {
                println!("{}", settings.describe());
            }
        },
    }

    Ok(())
}
