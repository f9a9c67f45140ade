use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

/// Initializes the global tracing subscriber the way all Hopper binaries do.
///
/// The effective filter is taken from `log_level_env_var` if set, falling back to
/// `default_log_level` otherwise.
pub fn setup_subscriber(log_level_env_var: &str, default_log_level: LevelFilter) {
    let filter: EnvFilter =
        EnvFilter::builder().with_env_var(log_level_env_var).with_default_directive(default_log_level.into()).from_env_lossy();
    tracing_subscriber::registry().with(tracing_subscriber::fmt::layer()).with(filter).init();

    info!("Logger initiated with log level {}", std::env::var(log_level_env_var).unwrap_or_else(|_| default_log_level.to_string()));
}
