pub mod commands;

use tracing_subscriber::EnvFilter;

pub use commands::run;

/// Install the stderr log subscriber
///
/// `RUST_LOG` wins when set; otherwise only warnings and errors are shown, or progress too
/// with `--verbose`.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second call (e.g. from a test harness) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
