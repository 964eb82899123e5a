use tracing::Subscriber;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging to stderr.
///
/// The log level can be controlled via the `level` parameter or the `RUST_LOG`
/// environment variable. Fails if a global subscriber is already installed.
pub fn init_logging(level: &str) -> Result<(), TryInitError> {
    // Build filter from RUST_LOG env var or use provided level
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level));

    subscriber(env_filter).try_init()?;

    tracing::info!(level, "perturb_core logging initialized");
    Ok(())
}

fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("perturb_core={level}"))
}

fn subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true),
    )
}
