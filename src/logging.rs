use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber shared by all binaries. `RUST_LOG` wins over
/// `default_level`. stdout stays free for the console protocol.
pub fn init(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (tests, repeated calls) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
