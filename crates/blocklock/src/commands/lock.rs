//! `blocklock lock` / `blocklock unlock`

use anyhow::Result;
use blocklock_core::{BlockId, BlockStore, Config, Error, RoomSubscription, UserId};
use clap::ArgMatches;

use super::{
    output::{print_events, print_lock, print_unlock},
    required, OutputMode,
};
use crate::context::AppContext;

struct LockArgs {
    block: BlockId,
    user: UserId,
    force: bool,
}

impl LockArgs {
    fn parse(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            block: BlockId::parse(required(matches, "block")?).map_err(Error::from)?,
            user: UserId::parse(required(matches, "user")?).map_err(Error::from)?,
            force: matches.get_flag("force"),
        })
    }
}

pub async fn run_lock(matches: &ArgMatches, config: Config, mode: OutputMode) -> Result<()> {
    let args = LockArgs::parse(matches)?;
    let context = AppContext::open(config).await?;
    let room = join_room(&context, mode, &args.block).await?;

    let view = context
        .coordinator
        .lock(&args.block, &args.user, args.force)
        .await?;

    print_lock(mode, &view)?;
    print_events(mode, room)
}

pub async fn run_unlock(matches: &ArgMatches, config: Config, mode: OutputMode) -> Result<()> {
    let args = LockArgs::parse(matches)?;
    let context = AppContext::open(config).await?;
    let room = join_room(&context, mode, &args.block).await?;

    let view = context
        .coordinator
        .unlock(&args.block, &args.user, args.force)
        .await?;

    print_unlock(mode, &view)?;
    print_events(mode, room)
}

/// Subscribe to the block's release room before mutating, when `--events` is set.
async fn join_room(
    context: &AppContext,
    mode: OutputMode,
    block: &BlockId,
) -> Result<Option<RoomSubscription>> {
    if !mode.events {
        return Ok(None);
    }
    let release = context
        .store
        .load(block)
        .await?
        .and_then(|record| record.release_id);
    Ok(release.map(|release| context.hub.join(&release)))
}
