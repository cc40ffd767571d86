//! `blocklock status` / `blocklock locks`

#![allow(clippy::print_stdout)]

use anyhow::Result;
use blocklock_core::{BlockId, Config, Error, ReleaseId};
use clap::ArgMatches;

use super::{
    output::{describe_lock, print_lock},
    required, OutputMode,
};
use crate::context::AppContext;

pub async fn run_status(matches: &ArgMatches, config: Config, mode: OutputMode) -> Result<()> {
    let block = BlockId::parse(required(matches, "block")?).map_err(Error::from)?;
    let context = AppContext::open(config).await?;

    match context.coordinator.status(&block).await? {
        Some(view) => print_lock(mode, &view),
        None if mode.json => mode.json_line(&serde_json::Value::Null),
        None => {
            println!("{block} is not locked");
            Ok(())
        }
    }
}

pub async fn run_locks(matches: &ArgMatches, config: Config, mode: OutputMode) -> Result<()> {
    let release = ReleaseId::parse(required(matches, "release")?).map_err(Error::from)?;
    let context = AppContext::open(config).await?;
    let views = context.coordinator.release_locks(&release).await?;

    if mode.json {
        return mode.json_line(&views);
    }
    if views.is_empty() {
        println!("No live locks in {release}");
    }
    for view in &views {
        println!("{}", describe_lock(view));
    }
    Ok(())
}
