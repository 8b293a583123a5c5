//! Optional capability detection and the capability set exchanged with peers.
//!
//! A capability is an opaque identifier. Its presence in a [`CapabilitySet`]
//! is the only thing callers can observe. The [`FeatureProbe`] runs one
//! independent check per registered capability; a failing check simply leaves
//! the identifier out.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::ProbeConfig;

/// Buffers may be posted gzip-compressed.
pub const GZIP_BUFFER_POST: &str = "GZIP_BUFFER_POST";
/// Certificates may be pushed to the peer.
pub const ALLOW_CERTIFICATE_PUSHING: &str = "ALLOW_CERTIFICATE_PUSHING";
/// Long-running operations may be scheduled asynchronously.
pub const ASYNC_OPERATIONS: &str = "ASYNC_OPERATIONS";

/// Request header that carries the client's capabilities.
pub const CAPABILITIES_HEADER: &str = "X-Envcaps-Capabilities";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<String>);

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, capability: &str) -> bool {
        self.0.contains(capability)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Capabilities both sides support. A feature is only used when it survives this.
    pub fn negotiate(&self, peer: &CapabilitySet) -> CapabilitySet {
        CapabilitySet(self.0.intersection(&peer.0).cloned().collect())
    }

    /// Space separated, sorted.
    pub fn to_header_value(&self) -> String {
        self.iter().collect::<Vec<_>>().join(" ")
    }

    pub fn from_header_value(value: &str) -> Self {
        value.split_whitespace().map(str::to_string).collect()
    }

    fn insert(&mut self, capability: &str) {
        self.0.insert(capability.to_string());
    }
}

impl FromIterator<String> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        CapabilitySet(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}

type CheckFn = Box<dyn Fn() -> Result<(), String> + Send + Sync>;

struct CapabilityCheck {
    id: &'static str,
    check: CheckFn,
}

/// Registry of optional capability checks.
pub struct FeatureProbe {
    checks: Vec<CapabilityCheck>,
}

impl FeatureProbe {
    pub fn empty() -> Self {
        Self { checks: Vec::new() }
    }

    /// The checks this build knows about, with settings-driven ones taken from `config`.
    pub fn from_config(config: &ProbeConfig) -> Self {
        let allow_pushing = config.allow_certificate_pushing;
        let allow_async = !config.disallow_async_operations;
        Self::empty()
            .register(GZIP_BUFFER_POST, gzip_round_trip)
            .register(ALLOW_CERTIFICATE_PUSHING, move || {
                enabled_by_setting(allow_pushing, "ALLOW_CERTIFICATE_PUSHING")
            })
            .register(ASYNC_OPERATIONS, move || {
                enabled_by_setting(allow_async, "DISALLOW_ASYNC_OPERATIONS")
            })
    }

    /// Adds one more independent check. Later registrations for the same id are tried too.
    pub fn register<F>(mut self, id: &'static str, check: F) -> Self
    where
        F: Fn() -> Result<(), String> + Send + Sync + 'static,
    {
        self.checks.push(CapabilityCheck {
            id,
            check: Box::new(check),
        });
        self
    }

    pub fn detect_capabilities(&self) -> CapabilitySet {
        let mut found = CapabilitySet::new();
        for CapabilityCheck { id, check } in &self.checks {
            match check() {
                Ok(()) => found.insert(id),
                Err(reason) => {
                    tracing::debug!(target = "envcaps", capability = *id, %reason, "capability not available");
                }
            }
        }
        tracing::info!(target = "envcaps", capabilities = %found.to_header_value(), "capabilities detected");
        found
    }
}

fn enabled_by_setting(enabled: bool, setting: &str) -> Result<(), String> {
    if enabled {
        Ok(())
    } else {
        Err(format!("{setting} setting excludes it"))
    }
}

#[cfg(feature = "gzip")]
fn gzip_round_trip() -> Result<(), String> {
    use std::io::{Read, Write};

    use flate2::{read::GzDecoder, write::GzEncoder, Compression};

    const SAMPLE: &[u8] = b"envcaps gzip probe";
    let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(SAMPLE).map_err(|e| e.to_string())?;
    let compressed = encoder.finish().map_err(|e| e.to_string())?;

    let mut decoded = Vec::with_capacity(SAMPLE.len());
    GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut decoded)
        .map_err(|e| e.to_string())?;
    if decoded != SAMPLE {
        return Err("gzip round trip altered the payload".into());
    }
    Ok(())
}

#[cfg(not(feature = "gzip"))]
fn gzip_round_trip() -> Result<(), String> {
    Err("built without the gzip feature".into())
}
