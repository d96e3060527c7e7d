//! Tracing subscriber setup.
//!
//! The daemon installs the process-global subscriber once, straight from
//! [`NodeConfig`]: `log_format = "json"` emits newline-delimited JSON with
//! event fields flattened for log shippers, anything else emits plain
//! lines for a terminal. `log_level` seeds the filter; a `RUST_LOG`
//! environment variable, when present, wins over it.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::NodeConfig;

/// Install the global subscriber described by the node config.
///
/// # Panics
///
/// Panics if a global subscriber has already been set (i.e. this function
/// was called twice in the same process).
pub fn init_logging(config: &NodeConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    let lines = fmt::layer().with_target(true);

    if config.log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(lines.json().flatten_event(true))
            .init();
    } else {
        tracing_subscriber::registry().with(filter).with(lines).init();
    }
}
