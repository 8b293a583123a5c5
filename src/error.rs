use thiserror::Error;

use crate::config::errors::{ERR_CONFIGURATION, ERR_DRIVER_UNAVAILABLE, ERR_PROBE_EXECUTION};

#[derive(Debug, Error)]
pub enum Error {
    /// The embedded database could not be opened at all. Not retried by the probe.
    #[error("E-ENVCAPS-0100: embedded database unavailable: {0}")]
    DriverUnavailable(String),
    /// A probe query failed for a reason other than bind-parameter overflow.
    #[error("E-ENVCAPS-0101: probe failed at arity {arity}: {message}")]
    ProbeExecution { arity: usize, message: String },
    #[error("E-ENVCAPS-0200: {0}")]
    Configuration(String),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::DriverUnavailable(_) => ERR_DRIVER_UNAVAILABLE,
            Error::ProbeExecution { .. } => ERR_PROBE_EXECUTION,
            Error::Configuration(_) => ERR_CONFIGURATION,
        }
    }

    /// Environmental failures that a later discovery attempt may not hit again.
    pub fn is_probe_failure(&self) -> bool {
        matches!(
            self,
            Error::DriverUnavailable(_) | Error::ProbeExecution { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
