pub mod commands;
pub mod handlers;
pub mod output;

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Install the log subscriber. `RUST_LOG` wins over the flags.
///
/// Logs go to stderr so `--json` output on stdout stays clean.
pub fn init_tracing(verbose: u8, quiet: u8) -> Result<(), String> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| format!("invalid RUST_LOG / log filter: {e}"))?;

    // a subscriber may already be installed (tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    Ok(())
}
