//! Probe bounds and capacity defaults

/// Search ceiling for the bind-parameter probe. Legacy SQLite builds cap at 999.
pub const DEFAULT_PARAMETER_CEILING: usize = 1000;

/// Every real build accepts a single bound parameter.
pub const PARAMETER_FLOOR: usize = 1;

/// The search needs at least one untested value above the floor.
pub const MIN_PARAMETER_CEILING: usize = PARAMETER_FLOOR + 1;

/// Single-column scratch table created inside the in-memory probe database.
pub const PROBE_TABLE: &str = "envcaps_probe";

/// Upper bound when scanning `sqlite_compileoption_get` indexes.
pub const MAX_COMPILE_OPTIONS: i64 = 500;
