use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber.
///
/// `RUST_LOG` wins when set; otherwise `-v` raises the default `warn` level.
pub fn init(verbose: u8) {
    let default_level = if verbose > 0 { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
