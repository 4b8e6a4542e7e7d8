//! Tracing subscriber setup for the CLI
//!
//! Logs go to stderr so stdout carries only the balances CSV. `RUST_LOG`
//! overrides the default filter when set.

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::core::RECONCILIATION_TARGET;

/// Output format of log lines
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Default filter directives
///
/// The reconciliation target stays enabled at `error` whatever the crate
/// level is, since it is the only record of an unrecorded event.
pub fn default_directives(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!(
        "warn,rust_transfer_orchestrator={},{}=error",
        level, RECONCILIATION_TARGET
    )
}

/// Install the global subscriber
///
/// Must be called at most once per process.
pub fn init_logging(format: LogFormat, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::quiet(false, "rust_transfer_orchestrator=info")]
    #[case::verbose(true, "rust_transfer_orchestrator=debug")]
    fn test_default_directives(#[case] verbose: bool, #[case] expected: &str) {
        let directives = default_directives(verbose);

        assert!(directives.contains(expected));
        assert!(directives.contains("transfer_orchestrator::reconciliation=error"));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }
}
