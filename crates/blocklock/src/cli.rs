//! CLI command definitions using `clap`

use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("blocklock")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Exclusive edit locks for the content blocks of a release")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("database")
                .long("database")
                .global(true)
                .value_name("PATH")
                .help("SQLite database file (overrides config and BLOCKLOCK_DATABASE)"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print results as JSON"),
        )
        .arg(
            Arg::new("events")
                .long("events")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Also print the events this command published to the release room"),
        )
        .subcommand(cmd_init())
        .subcommand(cmd_import())
        .subcommand(cmd_lock())
        .subcommand(cmd_unlock())
        .subcommand(cmd_status())
        .subcommand(cmd_locks())
}

fn cmd_init() -> Command {
    Command::new("init").about("Create the database and its schema")
}

fn cmd_import() -> Command {
    Command::new("import")
        .about("Load users, releases, sections and blocks from a TOML fixture")
        .arg(
            Arg::new("fixture")
                .required(true)
                .value_name("FILE")
                .help("Fixture file"),
        )
}

fn block_arg() -> Arg {
    Arg::new("block")
        .required(true)
        .value_name("BLOCK_ID")
        .help("Content block id")
}

fn user_arg(help: &'static str) -> Arg {
    Arg::new("user")
        .long("user")
        .short('u')
        .required(true)
        .value_name("USER_ID")
        .help(help)
}

fn force_arg(help: &'static str) -> Arg {
    Arg::new("force")
        .long("force")
        .short('f')
        .action(ArgAction::SetTrue)
        .help(help)
}

fn cmd_lock() -> Command {
    Command::new("lock")
        .about("Take or refresh the edit lock on a block")
        .arg(block_arg())
        .arg(user_arg("User requesting the lock"))
        .arg(force_arg("Take the lock even if someone else holds it"))
}

fn cmd_unlock() -> Command {
    Command::new("unlock")
        .about("Release the edit lock on a block")
        .arg(block_arg())
        .arg(user_arg("User releasing the lock"))
        .arg(force_arg("Release the lock even if someone else holds it"))
}

fn cmd_status() -> Command {
    Command::new("status")
        .about("Show the live lock on a block")
        .arg(block_arg())
}

fn cmd_locks() -> Command {
    Command::new("locks")
        .about("List live locks across a release")
        .arg(
            Arg::new("release")
                .required(true)
                .value_name("RELEASE_ID")
                .help("Release id"),
        )
}
