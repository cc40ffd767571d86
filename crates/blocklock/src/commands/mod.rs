//! Command handlers that bridge between `clap` and the coordinator

mod init;
mod import;
mod lock;
mod output;
mod query;

use anyhow::Result;
use blocklock_core::Config;
use clap::ArgMatches;

pub use output::OutputMode;

/// Run the selected subcommand.
pub async fn dispatch(matches: &ArgMatches, config: Config) -> Result<()> {
    let mode = OutputMode::from_matches(matches);

    match matches.subcommand() {
        Some(("init", _)) => init::run(config, mode).await,
        Some(("import", sub)) => import::run(sub, config, mode).await,
        Some(("lock", sub)) => lock::run_lock(sub, config, mode).await,
        Some(("unlock", sub)) => lock::run_unlock(sub, config, mode).await,
        Some(("status", sub)) => query::run_status(sub, config, mode).await,
        Some(("locks", sub)) => query::run_locks(sub, config, mode).await,
        _ => anyhow::bail!("Unknown command. Run 'blocklock --help' for usage."),
    }
}

/// A required string argument, already enforced by clap.
fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("missing required argument <{name}>"))
}
