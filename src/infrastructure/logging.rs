//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Install the global subscriber, writing to stderr.
///
/// Reads `TCG_LOG` for directives (`TCG_LOG=ts_callgraph=debug`), falling back
/// to `ts_callgraph=info`. Safe to call more than once.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env("TCG_LOG").unwrap_or_else(|_| EnvFilter::new("ts_callgraph=info"));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .with(filter)
            .init();
    });
}
