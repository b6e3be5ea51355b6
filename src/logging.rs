//! Diagnostic logging through `tracing`, written to stderr.
//!
//! User-facing status lines stay on the colored `eprintln!` path; these events
//! are for `-v` runs and `RUST_LOG`.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Map `-q` / `-v` counts to a level.
///
/// - `-q`: errors only
/// - default: warnings
/// - `-v`: info (batch progress, files written)
/// - `-vv`: debug (configuration)
/// - `-vvv`: trace (every normalized record)
pub fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the flags.
pub fn init(verbosity: u8, quiet: bool) {
    let level = level_for(verbosity, quiet);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
