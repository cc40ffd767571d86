//! `blocklock init`

#![allow(clippy::print_stdout)]

use anyhow::Result;
use blocklock_core::Config;
use serde_json::json;

use super::OutputMode;
use crate::context::{database_path, AppContext};

pub async fn run(config: Config, mode: OutputMode) -> Result<()> {
    let path = database_path(&config);
    let context = AppContext::open(config).await?;
    context.store.pool().close().await;

    if mode.json {
        mode.json_line(&json!({ "database": path.display().to_string(), "initialized": true }))
    } else {
        println!("Initialized lock database at {}", path.display());
        Ok(())
    }
}
