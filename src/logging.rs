//! Diagnostic output for the binaries.
//!
//! Everything goes to stderr so stdout only carries results.

use tracing_subscriber::{fmt, EnvFilter};

/// Level used when `RUST_LOG` is not set.
pub fn default_level(verbose: bool, debug: bool) -> &'static str {
    if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over the flags. Calling it
/// twice is harmless.
pub fn init_logging(verbose: bool, debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose, debug)));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
