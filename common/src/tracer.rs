use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt};

/// This object initialises the stdout tracer.
pub struct TracerEngine;

impl TracerEngine {
    /// Initialises the stdout tracer for the crate.
    /// #Arguments
    /// * `level` - The level used when `RUST_LOG` does not specify one.
    /// #Returns
    /// An instance of TracerEngine
    pub fn new(level: LevelFilter) -> Self {
        let stdout_tracer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

        // This filter is applied to the stdout tracer
        let log_filter = EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy();

        let subscriber =
            tracing_subscriber::Registry::default().with(stdout_tracer.with_filter(log_filter));

        //  This is only called once, so will never panic
        tracing::subscriber::set_global_default(subscriber)
            .expect("tracing::subscriber::set_global_default should only be called once");

        Self
    }
}
