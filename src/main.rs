//! Transfer Orchestrator CLI
//!
//! Seeds an in-process ledger from an accounts CSV, runs every transfer
//! request of a second CSV through the orchestrator, and prints the final
//! balances to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --accounts accounts.csv transfers.csv > balances.csv
//! cargo run -- --accounts accounts.csv --strategy async --batch-size 2000 transfers.csv
//! cargo run -- --accounts accounts.csv --outcomes outcomes.csv --events events.csv transfers.csv
//! ```
//!
//! Logs go to stderr; `RUST_LOG` overrides the default filter.
//!
//! # Exit Codes
//!
//! - 0: Success (individual transfers may still have failed; see `--outcomes`)
//! - 1: Error (missing file, bad accounts file, unwritable report, etc.)

use rust_transfer_orchestrator::cli::{self, CliArgs, StrategyType};
use rust_transfer_orchestrator::io::load_ledger;
use rust_transfer_orchestrator::ledger::InMemoryEventStore;
use rust_transfer_orchestrator::logging::init_logging;
use rust_transfer_orchestrator::strategy::{self, TransferPipeline};
use rust_transfer_orchestrator::types::TransferError;
use std::fs::File;
use std::process;
use std::sync::Arc;
use tracing::error;

fn run(args: &CliArgs) -> Result<(), TransferError> {
    let ledger = load_ledger(&args.accounts_file)?;
    let pipeline = TransferPipeline::new(
        Arc::new(ledger),
        Arc::new(InMemoryEventStore::new()),
        args.to_orchestrator_config(),
    );

    let strategy = {
        let config = if matches!(args.strategy, StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config)
    };

    let report = strategy.process(&args.transfers_file, &pipeline)?;

    report.write_balances(&mut std::io::stdout())?;
    if let Some(path) = &args.outcomes_file {
        report.write_outcomes(&mut File::create(path)?)?;
    }
    if let Some(path) = &args.events_file {
        report.write_events(&mut File::create(path)?)?;
    }

    Ok(())
}

fn main() {
    let args = cli::parse_args();
    init_logging(args.log_format, args.verbose);

    if let Err(e) = run(&args) {
        error!(error = %e, "Transfer run failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
