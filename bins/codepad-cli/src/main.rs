mod commands;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use codepad_common::config::ClientConfig;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "codepad")]
#[command(about = "Codepad CLI - Browse problems and run solutions against their test cases", long_about = None)]
struct Cli {
    /// API base URL (overrides CODEPAD_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Delay between job status checks in milliseconds
    #[arg(long, global = true)]
    poll_interval_ms: Option<u64>,

    /// Give up on a job after this many status checks
    #[arg(long, global = true)]
    max_polls: Option<u32>,

    /// Emit logs as JSON
    #[arg(long, global = true, default_value = "false")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available problems
    Problems,

    /// Show a problem and its visible test cases
    Problem {
        /// Problem id
        id: i64,
    },

    /// Run a solution against a problem's test cases
    Submit {
        /// Problem id
        #[arg(short, long)]
        problem: i64,

        /// Source file (reads stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Submission language (overrides CODEPAD_LANGUAGE)
        #[arg(short, long)]
        language: Option<String>,
    },
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(url) = &self.api_url {
            config.api_base_url = url.clone();
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval_ms = ms;
        }
        if let Some(max) = self.max_polls {
            config.max_polls = max;
        }
        if let Commands::Submit {
            language: Some(language),
            ..
        } = &self.command
        {
            config.language = language.to_lowercase();
        }
        config
    }
}

fn init_tracing(json: bool) {
    // Logs go to stderr; stdout carries the rendered output
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = cli.client_config();
    debug!(api = %config.api_base_url, language = %config.language, "Configuration loaded");

    let ok = match cli.command {
        Commands::Problems => commands::list_problems(&config).await?,
        Commands::Problem { id } => commands::show_problem(&config, id).await?,
        Commands::Submit { problem, file, .. } => {
            commands::submit(&config, problem, file.as_deref()).await?
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
