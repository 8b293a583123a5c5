//! Compute-once store for discovered environment facts.
//!
//! One `CapabilityCache` is built by whatever bootstraps the process and shared
//! by reference (`Arc`). Each probe runs at most once per cache; concurrent
//! first callers block on the same initialization. A failed limit probe leaves
//! the cell empty so the next caller retries.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use anyhow::Context;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::capabilities::{CapabilitySet, FeatureProbe};
use crate::config::ProbeConfig;
use crate::error::Result;
use crate::limit_probe::{discover_parameter_limit, ParameterLimit, ProbeDriver, ProbeReport, SqliteDriver};

pub struct CapabilityCache {
    config: ProbeConfig,
    driver: Box<dyn ProbeDriver>,
    features: FeatureProbe,
    capabilities: OnceCell<CapabilitySet>,
    limit: OnceCell<ProbeReport>,
    limit_probe_runs: AtomicUsize,
    last_failure: Mutex<Option<String>>,
}

impl CapabilityCache {
    /// Cache backed by the bundled SQLite driver and the default feature checks.
    pub fn new(config: ProbeConfig) -> Result<Self> {
        let features = FeatureProbe::from_config(&config);
        Self::with_parts(config, Box::new(SqliteDriver::new()), features)
    }

    pub fn with_parts(
        config: ProbeConfig,
        driver: Box<dyn ProbeDriver>,
        features: FeatureProbe,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            driver,
            features,
            capabilities: OnceCell::new(),
            limit: OnceCell::new(),
            limit_probe_runs: AtomicUsize::new(0),
            last_failure: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        self.capabilities
            .get_or_init(|| self.features.detect_capabilities())
    }

    pub fn parameter_limit(&self) -> Result<ParameterLimit> {
        self.probe_report().map(|report| report.limit)
    }

    pub fn probe_report(&self) -> Result<ProbeReport> {
        self.limit
            .get_or_try_init(|| {
                self.limit_probe_runs.fetch_add(1, Ordering::SeqCst);
                match discover_parameter_limit(self.driver.as_ref(), self.config.parameter_ceiling) {
                    Ok(report) => {
                        *self.last_failure.lock() = None;
                        Ok(report)
                    }
                    Err(err) => {
                        if err.is_probe_failure() {
                            tracing::warn!(target = "envcaps", error = %err, "parameter limit probe failed; will retry on next access");
                        }
                        *self.last_failure.lock() = Some(err.to_string());
                        Err(err)
                    }
                }
            })
            .copied()
    }

    /// Cached value without triggering discovery.
    pub fn cached_parameter_limit(&self) -> Option<ParameterLimit> {
        self.limit.get().map(|report| report.limit)
    }

    /// Number of times the limit search has actually run.
    pub fn limit_probe_runs(&self) -> usize {
        self.limit_probe_runs.load(Ordering::SeqCst)
    }

    pub fn last_failure(&self) -> Option<String> {
        self.last_failure.lock().clone()
    }

    /// Runs discovery on the blocking pool so async callers never stall a worker.
    pub async fn parameter_limit_async(self: &Arc<Self>) -> anyhow::Result<ParameterLimit> {
        if let Some(limit) = self.cached_parameter_limit() {
            return Ok(limit);
        }
        let cache = Arc::clone(self);
        let limit = tokio::task::spawn_blocking(move || cache.parameter_limit())
            .await
            .context("join parameter limit probe")??;
        Ok(limit)
    }
}
