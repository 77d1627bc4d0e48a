//! Actor Bridge CLI
//!
//! Prints the JSON envelope of each operation on stdout; logs go to stderr.

use std::path::{Path, PathBuf};

use actor_bridge::{ActorBridge, SchemaOverrides, cancel_signal};
use actor_structs::{Record, RunRequestOptions};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Discover, describe and run actors on a remote platform
#[derive(Parser)]
#[command(name = "actor-bridge")]
#[command(about = "Discover, describe and run actors on a remote platform")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Platform API token
    #[arg(long, global = true, env = "PLATFORM_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the API token is accepted
    Validate,

    /// List owned, accessible and curated actors
    Actors,

    /// Print the input schema of an actor
    Schema {
        /// Actor id or `username~name`
        #[arg(short, long)]
        actor: String,
    },

    /// Run an actor and wait for its results
    Run {
        /// Actor id or `username~name`
        #[arg(short, long)]
        actor: String,

        /// Input as an inline JSON object
        #[arg(short, long, conflicts_with = "input_file")]
        input: Option<String>,

        /// Path to a JSON file holding the input object
        #[arg(long)]
        input_file: Option<PathBuf>,

        /// Build tag or number to run
        #[arg(short, long)]
        build: Option<String>,

        /// Run timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Memory limit in megabytes
        #[arg(long)]
        memory: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Loads .env before clap reads PLATFORM_API_TOKEN
    let config = Config::from_env()?;
    let cli = Cli::parse();

    // Initialize tracing subscriber
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let overrides = match &config.schema_overrides_path {
        Some(path) => SchemaOverrides::from_file(path)?,
        None => SchemaOverrides::builtin()?,
    };
    info!(
        overrides = overrides.len(),
        base_url = %config.api_base_url,
        "Actor bridge starting"
    );

    let bridge = ActorBridge::from_config(&config, overrides);
    let token = cli.token.as_deref();

    let output = match cli.command {
        Commands::Validate => {
            serde_json::to_string_pretty(&bridge.validate_credential(token).await)?
        }
        Commands::Actors => serde_json::to_string_pretty(&bridge.list_actors(token).await)?,
        Commands::Schema { actor } => {
            serde_json::to_string_pretty(&bridge.get_schema(token, &actor).await)?
        }
        Commands::Run {
            actor,
            input,
            input_file,
            build,
            timeout,
            memory,
        } => {
            let input = read_input(input.as_deref(), input_file.as_deref())?;
            let options = RunRequestOptions {
                build,
                timeout_secs: timeout,
                memory_mbytes: memory,
            };

            let (stop, cancel) = cancel_signal();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Interrupted, no longer waiting for the run");
                    stop.send_replace(true);
                }
            });

            let response = bridge
                .execute(token, &actor, &input, &options, &cancel)
                .await;
            serde_json::to_string_pretty(&response)?
        }
    };

    println!("{output}");

    Ok(())
}

/// Reads the run input from the command line or a file.
fn read_input(inline: Option<&str>, file: Option<&Path>) -> Result<Record> {
    let raw = match (inline, file) {
        (Some(json), _) => json.to_owned(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path.display()))?,
        (None, None) => return Ok(Record::new()),
    };

    serde_json::from_str(&raw).context("Run input must be a JSON object")
}
