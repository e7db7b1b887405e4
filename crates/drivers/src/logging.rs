use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,lite_market=debug";

/// Installs the global subscriber once; `RUST_LOG` replaces the default filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
