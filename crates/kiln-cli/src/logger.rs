//! Logging setup for the kiln binary.
//!
//! The library emits plain tracing events; this installs the subscriber
//! that renders them.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// Filter precedence: `--verbose` > `--quiet` > `RUST_LOG` > info default.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new("kiln_build=debug,kiln_cli=debug")
    } else if quiet {
        EnvFilter::new("kiln_build=error,kiln_cli=error")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("kiln_build=info,kiln_cli=info"))
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    // The subscriber is global and can only be installed once per process,
    // so these only exercise filter construction.

    #[test]
    fn verbose_filter_parses() {
        let _filter = EnvFilter::new("kiln_build=debug,kiln_cli=debug");
    }

    #[test]
    fn quiet_filter_parses() {
        let _filter = EnvFilter::new("kiln_build=error,kiln_cli=error");
    }
}
