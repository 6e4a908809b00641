//! Logging set-up for the command-line tools.
//!
//! Records go to stderr so stdout stays clean newline-delimited JSON.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive for the given flags. `silent` wins over `verbose`.
pub fn filter_directive(verbose: bool, silent: bool) -> String {
    let level = if silent {
        "off"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    format!("sndg_etl={level}")
}

/// Install the global subscriber. `RUST_LOG` overrides the flags.
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init(verbose: bool, silent: bool) {
    let filter = if silent {
        EnvFilter::new("off")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbose, silent)))
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true),
        )
        .try_init();
}
