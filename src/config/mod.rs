//! Configuration constants and structures for capability discovery
//!
//! Defaults live in `limits`, error codes in `errors`. `ProbeConfig` is the
//! runtime view, loaded from the environment at bootstrap.

pub mod errors;
pub mod limits;

use crate::error::{Error, Result};

use self::limits::{DEFAULT_PARAMETER_CEILING, MIN_PARAMETER_CEILING};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Upper bound of the parameter search. Never itself reported as accepted.
    pub parameter_ceiling: usize,
    pub allow_certificate_pushing: bool,
    pub disallow_async_operations: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            parameter_ceiling: DEFAULT_PARAMETER_CEILING,
            allow_certificate_pushing: false,
            disallow_async_operations: false,
        }
    }
}

impl ProbeConfig {
    /// Load configuration from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - ENVCAPS_PARAM_CEILING: search ceiling for the bind-parameter probe (default: 1000)
    /// - ENVCAPS_ALLOW_CERTIFICATE_PUSHING: advertise certificate pushing (default: false)
    /// - ENVCAPS_DISALLOW_ASYNC_OPERATIONS: withhold async operations (default: false)
    pub fn from_env() -> Self {
        let parameter_ceiling = std::env::var("ENVCAPS_PARAM_CEILING")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_PARAMETER_CEILING);

        Self {
            parameter_ceiling,
            allow_certificate_pushing: env_flag("ENVCAPS_ALLOW_CERTIFICATE_PUSHING"),
            disallow_async_operations: env_flag("ENVCAPS_DISALLOW_ASYNC_OPERATIONS"),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.parameter_ceiling < MIN_PARAMETER_CEILING {
            return Err(Error::Configuration(format!(
                "parameter ceiling must be at least {MIN_PARAMETER_CEILING}, got {}",
                self.parameter_ceiling
            )));
        }
        Ok(())
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
