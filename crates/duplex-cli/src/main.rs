//! duplex: operator CLI for cross-region DR automation.
//!
//! Every subcommand maps to one orchestrator operation: a precondition
//! check, one submitted control-plane action, and a wait for the
//! resulting task. Connection settings come from a TOML config file
//! (see `duplex-client`), with the API token optionally supplied via
//! `DUPLEX_API_TOKEN`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use duplex_client::{ClientConfig, HttpClient};
use duplex_dr::{DrOrchestrator, StorageConfigChoice};
use duplex_task::{DEFAULT_POLL_INTERVAL, PollOptions};

mod commands;

#[derive(Parser)]
#[command(
    name = "duplex",
    about = "Cross-region DR automation for control-plane managed clusters",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to the connection config file.
    #[arg(long, default_value = "duplex.toml", global = true)]
    config: PathBuf,

    /// Seconds between task status polls.
    #[arg(long, global = true)]
    poll_interval: Option<u64>,

    /// Abort a wait after this many seconds (default: wait forever).
    #[arg(long, global = true)]
    deadline: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a DR config between two universes.
    Create {
        /// Friendly name of the universe that becomes the primary.
        #[arg(long)]
        source: String,
        /// Friendly name of the universe that becomes the replica.
        #[arg(long)]
        target: String,
        /// Database name to replicate (repeatable).
        #[arg(long = "db", required = true)]
        dbs: Vec<String>,
        /// Storage config name for bootstrap backup/restore.
        /// Required when more than one storage config exists.
        #[arg(long)]
        storage_config: Option<String>,
        /// Bootstrap backup/restore parallelism.
        #[arg(long, default_value_t = duplex_dr::DEFAULT_PARALLELISM)]
        parallelism: u32,
        /// Validate and submit without applying.
        #[arg(long)]
        dry_run: bool,
    },
    /// Delete the DR config of a source universe.
    Delete {
        #[arg(long)]
        source: String,
        /// Force deletion even if the replica is unreachable.
        #[arg(long)]
        force: bool,
    },
    /// Inspect or change the replicated table set.
    Tables {
        #[command(subcommand)]
        action: TablesAction,
    },
    /// Planned role exchange (zero data loss).
    Switchover {
        #[arg(long)]
        source: String,
    },
    /// Unplanned promotion of the replica (bounded data loss).
    Failover {
        #[arg(long)]
        source: String,
    },
    /// Post-failover restart, re-bootstrapping the failed primary as the
    /// new replica.
    Repair {
        #[arg(long)]
        source: String,
    },
    /// Reconcile DR state with out-of-band changes (e.g. index DDL).
    Sync {
        #[arg(long)]
        source: String,
    },
    /// Pause the underlying replication stream.
    Pause {
        #[arg(long)]
        source: String,
    },
    /// Resume a paused replication stream.
    Resume {
        #[arg(long)]
        source: String,
    },
}

#[derive(Subcommand)]
enum TablesAction {
    /// List tables that could be added to replication.
    Available {
        #[arg(long)]
        source: String,
    },
    /// Add tables to replication by table id.
    Add {
        #[arg(long)]
        source: String,
        /// Table id to add (repeatable).
        #[arg(long = "table", required = true)]
        tables: Vec<String>,
    },
    /// Remove tables from replication by table id.
    Remove {
        #[arg(long)]
        source: String,
        /// Table id to remove (repeatable).
        #[arg(long = "table", required = true)]
        tables: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("duplex_task=info".parse()?)
                .add_directive("duplex_dr=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let config = ClientConfig::from_file(&cli.config)?;
    let client = HttpClient::connect(&config).await?;

    let poll = PollOptions {
        interval: cli
            .poll_interval
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL),
        deadline: cli.deadline.map(Duration::from_secs),
    };
    let orchestrator = DrOrchestrator::new(client).with_poll_options(poll);

    match cli.command {
        Commands::Create {
            source,
            target,
            dbs,
            storage_config,
            parallelism,
            dry_run,
        } => {
            let storage = match storage_config {
                Some(name) => StorageConfigChoice::Named(name),
                None => StorageConfigChoice::Sole,
            };
            commands::create(&orchestrator, source, target, dbs, storage, parallelism, dry_run)
                .await
        }
        Commands::Delete { source, force } => {
            commands::delete(&orchestrator, &source, force).await
        }
        Commands::Tables { action } => match action {
            TablesAction::Available { source } => {
                commands::available_tables(&orchestrator, &source).await
            }
            TablesAction::Add { source, tables } => {
                commands::add_tables(&orchestrator, &source, tables).await
            }
            TablesAction::Remove { source, tables } => {
                commands::remove_tables(&orchestrator, &source, tables).await
            }
        },
        Commands::Switchover { source } => commands::switchover(&orchestrator, &source).await,
        Commands::Failover { source } => commands::failover(&orchestrator, &source).await,
        Commands::Repair { source } => commands::repair(&orchestrator, &source).await,
        Commands::Sync { source } => commands::sync(&orchestrator, &source).await,
        Commands::Pause { source } => commands::pause(&orchestrator, &source).await,
        Commands::Resume { source } => commands::resume(&orchestrator, &source).await,
    }
}
