//! Logging initialization

use tracing_subscriber::EnvFilter;

/// Initialize logging to stderr
///
/// `RUST_LOG` wins over everything; otherwise `--debug` selects `debug` and
/// the configured level applies. Stdout is left to the rendered output.
pub fn init_logging(debug: bool, level: &str) {
    let default_level = if debug { "debug" } else { level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(default_level).unwrap_or_else(|_| EnvFilter::new("info"))
    });

    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(debug)
        .with_file(debug)
        .with_line_number(debug)
        .try_init();
}
