//! Tracing bootstrap shared by clients and workers.

use crate::config::Configuration;
use tracing_subscriber::{fmt, EnvFilter};

/// Install a global `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level comes from
/// [`Configuration::log_level`]. Calling this more than once is harmless:
/// later calls leave the first subscriber in place.
pub fn init_tracing(config: &Configuration) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level()));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init();
}
