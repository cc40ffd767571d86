//! `blocklock import <fixture>`

#![allow(clippy::print_stdout)]

use std::path::Path;

use anyhow::Result;
use blocklock_core::Config;
use clap::ArgMatches;

use super::{required, OutputMode};
use crate::{context::AppContext, fixture::Fixture};

pub async fn run(matches: &ArgMatches, config: Config, mode: OutputMode) -> Result<()> {
    let fixture = Fixture::load(Path::new(required(matches, "fixture")?))?;
    let context = AppContext::open(config).await?;
    let summary = fixture.apply(&context.store).await?;

    if mode.json {
        mode.json_line(&summary)
    } else {
        println!(
            "Imported {} users, {} releases, {} sections, {} blocks",
            summary.users, summary.releases, summary.sections, summary.blocks
        );
        Ok(())
    }
}
