//! tracing subscriber setup shared by the binaries.

use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_FILTER_ENV: &str = "SHOWCASE_LOG";

/// Installs a stderr fmt subscriber filtered by `SHOWCASE_LOG`, or by
/// `default_filter` when that variable is unset or invalid. Calling it again
/// after a subscriber exists is a no-op.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init_tracing("debug");
        init_tracing("info");
        tracing::info!("still logging");
    }
}
