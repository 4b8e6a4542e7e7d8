use crate::core::OrchestratorConfig;
use crate::logging::LogFormat;
use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Run account-to-account transfers against a seeded ledger
#[derive(Parser, Debug)]
#[command(name = "transfer-orchestrator")]
#[command(about = "Run account-to-account transfers against a seeded ledger", long_about = None)]
pub struct CliArgs {
    /// Transfer requests CSV (source,destination,amount)
    #[arg(value_name = "TRANSFERS", help = "Path to the transfer requests CSV file")]
    pub transfers_file: PathBuf,

    /// Accounts seed CSV (account,balance)
    #[arg(
        long = "accounts",
        value_name = "FILE",
        help = "Path to the accounts CSV file used to seed the ledger"
    )]
    pub accounts_file: PathBuf,

    /// Processing strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Processing strategy: 'sync' for sequential or 'async' for concurrent batches"
    )]
    pub strategy: StrategyType,

    /// Number of transfer requests per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of transfer requests per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Number of worker threads (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Number of worker threads driving transfers (default: CPU cores)"
    )]
    pub max_concurrent: Option<usize>,

    /// Upper bound on one event record attempt
    #[arg(long = "event-timeout-ms", value_name = "MS", default_value_t = 2000)]
    pub event_timeout_ms: u64,

    /// Upper bound on the account fetch
    #[arg(long = "fetch-timeout-ms", value_name = "MS", default_value_t = 5000)]
    pub fetch_timeout_ms: u64,

    /// Record events on detached tasks
    #[arg(
        long = "detach-events",
        help = "Record events in the background instead of before each transfer returns"
    )]
    pub detach_events: bool,

    /// Where to write per-request outcomes
    #[arg(long = "outcomes", value_name = "FILE")]
    pub outcomes_file: Option<PathBuf>,

    /// Where to write recorded events
    #[arg(long = "events", value_name = "FILE")]
    pub events_file: Option<PathBuf>,

    /// Log line format
    #[arg(long = "log-format", value_name = "FORMAT", default_value = "text")]
    pub log_format: LogFormat,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Available processing strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values take the defaults; zero values fall back to the
    /// defaults with a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent.unwrap_or(default.max_concurrent),
            )
        } else {
            BatchConfig::default()
        }
    }

    /// Create an OrchestratorConfig from CLI arguments
    pub fn to_orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            event_timeout: Duration::from_millis(self.event_timeout_ms),
            fetch_timeout: Duration::from_millis(self.fetch_timeout_ms),
            detach_event_recording: self.detach_events,
        }
    }
}
