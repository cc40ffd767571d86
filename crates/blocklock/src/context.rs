//! Wiring from configuration to a ready coordinator.

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use blocklock_core::{config::load_config, Config, LockCoordinator, RoomHub, SqliteStore};
use clap::ArgMatches;

/// Layered config with CLI flags applied on top.
pub fn load_cli_config(matches: &ArgMatches) -> Result<Config> {
    let mut config = load_config()?;
    if let Some(database) = matches.get_one::<String>("database") {
        config.database.clone_from(database);
    }
    config.validate()?;
    Ok(config)
}

/// Everything a command needs.
pub struct AppContext {
    pub config: Config,
    pub store: SqliteStore,
    pub hub: Arc<RoomHub>,
    pub coordinator: LockCoordinator,
}

impl AppContext {
    /// Open (creating if needed) the configured database.
    pub async fn open(config: Config) -> Result<Self> {
        let store = SqliteStore::open(&database_path(&config)).await?;
        let hub = Arc::new(RoomHub::with_capacity(config.broadcast.room_capacity));
        let coordinator = LockCoordinator::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::clone(&hub) as Arc<dyn blocklock_core::Publisher>,
        )
        .with_settings(config.coordinator_settings());

        tracing::debug!(database = %config.database, "context ready");
        Ok(Self {
            config,
            store,
            hub,
            coordinator,
        })
    }
}

pub fn database_path(config: &Config) -> PathBuf {
    PathBuf::from(&config.database)
}
