use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test tracing
///
/// Safe to call from every test; only the first call installs the subscriber.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cms_fixtures_core=debug"));
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_test_writer()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
