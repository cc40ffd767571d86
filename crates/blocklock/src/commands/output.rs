//! Text and JSON rendering

#![allow(clippy::print_stdout)]

use anyhow::Result;
use blocklock_core::{LockEvent, LockView, RoomSubscription, UnlockView};
use clap::ArgMatches;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputMode {
    pub json: bool,
    pub events: bool,
}

impl OutputMode {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            json: matches.get_flag("json"),
            events: matches.get_flag("events"),
        }
    }

    pub fn json_line<T: Serialize>(self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string(value)?);
        Ok(())
    }
}

pub fn describe_lock(view: &LockView) -> String {
    let email = if view.locked_by.email.is_empty() {
        String::new()
    } else {
        format!(" <{}>", view.locked_by.email)
    };
    format!(
        "{} locked by {}{} until {}",
        view.id,
        view.locked_by.display_name,
        email,
        view.locked_until.to_rfc3339()
    )
}

pub fn describe_unlock(view: &UnlockView) -> String {
    format!("{} unlocked", view.id)
}

pub fn print_lock(mode: OutputMode, view: &LockView) -> Result<()> {
    if mode.json {
        mode.json_line(view)
    } else {
        println!("{}", describe_lock(view));
        Ok(())
    }
}

pub fn print_unlock(mode: OutputMode, view: &UnlockView) -> Result<()> {
    if mode.json {
        mode.json_line(view)
    } else {
        println!("{}", describe_unlock(view));
        Ok(())
    }
}

/// Print whatever the command published to `room`.
pub fn print_events(mode: OutputMode, room: Option<RoomSubscription>) -> Result<()> {
    let Some(mut room) = room else {
        return Ok(());
    };
    while let Some(event) = room.try_recv() {
        if mode.json {
            mode.json_line(&*event)?;
        } else {
            let detail = match &*event {
                LockEvent::ContentBlockLocked(view) => describe_lock(view),
                LockEvent::ContentBlockUnlocked(view) => describe_unlock(view),
            };
            println!("event {} on {}: {detail}", event.name(), room.room());
        }
    }
    Ok(())
}
