use std::sync::Arc;

use crate::cache::CapabilityCache;
use crate::config::ProbeConfig;
use crate::error::Result;

pub static APP_NAME: &str = "envcaps";

// Initialize tracing subsystem based on feature flags
pub fn init_tracing() {
    #[cfg(feature = "otel_spans")]
    {
        use tracing_subscriber::{fmt, EnvFilter};
        let _ = fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .try_init();
        tracing::debug!(target = "envcaps", "tracing initialized");
    }
}

/// Builds the process cache from the environment. Owners pass the `Arc` to consumers.
pub fn bootstrap() -> Result<Arc<CapabilityCache>> {
    bootstrap_with(ProbeConfig::from_env())
}

pub fn bootstrap_with(config: ProbeConfig) -> Result<Arc<CapabilityCache>> {
    tracing::debug!(target = "envcaps", ?config, "bootstrapping capability cache");
    Ok(Arc::new(CapabilityCache::new(config)?))
}
