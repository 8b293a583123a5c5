//! Error code constants

/// Limit probe error codes (0100-0199)
pub const ERR_DRIVER_UNAVAILABLE: &str = "E-ENVCAPS-0100";
pub const ERR_PROBE_EXECUTION: &str = "E-ENVCAPS-0101";

/// Caller and configuration error codes (0200-0299)
pub const ERR_CONFIGURATION: &str = "E-ENVCAPS-0200";

/// CLI error codes (0600-0699)
pub const ERR_CLI_MISSING_COMMAND: &str = "E-ENVCAPS-0640";
pub const ERR_CLI_UNKNOWN_COMMAND: &str = "E-ENVCAPS-0641";
pub const ERR_CLI_BAD_ARGUMENT: &str = "E-ENVCAPS-0642";
