use anyhow::Result;
use clap::{Parser, Subcommand};

use pinna_dash::cli::{self, OutputFormat};
use pinna_dash::config;

#[derive(Debug, Parser)]
#[command(name = "pinna-dash")]
#[command(about = "Terminal dashboard for a tweet archive's JSON endpoints")]
struct App {
    /// Backend origin, e.g. http://127.0.0.1:5000 (overrides config and PINNA_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Live dashboard: hashtags, collection counter, storage, statistics
    Watch,
    /// Fetch every widget once and print the result
    Snapshot {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Page through hashtag counts
    Hashtags {
        /// Stop after this many pages (default: until the backend runs out)
        #[arg(long)]
        pages: Option<u32>,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Probe every backend endpoint
    Check,
    /// Show or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Show the most recent fetch events
    Log {
        /// Number of events to show
        #[arg(long, default_value = "10")]
        tail: usize,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective (merged) configuration
    Show,
    /// Write the default config to ~/.pinna/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let app = App::parse();

    let mut cfg = config::load();
    if let Some(url) = app.url {
        cfg.backend.base_url = url;
    }

    match app.command.unwrap_or(Commands::Watch) {
        Commands::Watch => cli::run_watch(&cfg),
        Commands::Snapshot { format } => {
            cli::run_snapshot(&cfg, OutputFormat::from_str_opt(Some(&format)))
        }
        Commands::Hashtags { pages, format } => {
            cli::run_hashtags(&cfg, pages, OutputFormat::from_str_opt(Some(&format)))
        }
        Commands::Check => cli::run_check(&cfg),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(&cfg),
            ConfigAction::Init { force } => cli::run_config_init(force),
        },
        Commands::Log { tail } => cli::run_log(&cfg, tail),
    }
}
