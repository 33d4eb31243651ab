use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` directives apply on top of `info` for this crate and the store.
pub fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("hydro_api=info".parse().unwrap_or_else(|_| "info".parse().unwrap()))
        .add_directive("hydro_store=info".parse().unwrap_or_else(|_| "info".parse().unwrap()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
