//! Tracing initialization for the CLI.

/// Initialize the tracing subscriber.
///
/// Respects `RUST_LOG` when set, defaulting to `info`. Events go to
/// stderr so piped stdout stays clean.
pub fn init() {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}
