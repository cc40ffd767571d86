//! Blocklock CLI entry point
//!
//! Binary name: `blocklock`

use std::process;

use blocklock::{cli::build_cli, commands::dispatch, context::load_cli_config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();

    let result = match load_cli_config(&matches) {
        Ok(config) => {
            init_tracing(&config.log_level);
            dispatch(&matches, config).await
        }
        Err(e) => Err(e),
    };

    if let Err(err) = result {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("Error: {err:#}");
        }

        let code = err
            .downcast_ref::<blocklock_core::Error>()
            .map_or(1, blocklock_core::Error::exit_code);

        #[allow(clippy::exit)]
        process::exit(code);
    }
}

/// `RUST_LOG` wins; otherwise the configured level.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
