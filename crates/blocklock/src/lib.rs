//! Blocklock CLI - edit locks for release content blocks
//!
//! Binary name: `blocklock`

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod context;
pub mod fixture;
