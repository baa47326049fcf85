//! Logging setup for calproxy binaries and tests.
//!
//! Everything logs through `tracing`; this module only installs the
//! subscriber. `RUST_LOG` is honoured, with a `calproxy=<level>` directive
//! added on top.

use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber at INFO.
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
///
/// Safe to call more than once: later calls leave the first subscriber in place.
pub fn init_with_level(level: Level) {
    // Directive targets match by prefix, so this covers every calproxy_* crate.
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("calproxy={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_thread_names(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}
