use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "photool=info";

/// Installs the global fmt subscriber. `RUST_LOG` overrides the default
/// filter. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let result = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
