//! Empirical discovery of the bind-parameter limit of the embedded database.
//!
//! The probe binary-searches the statement arity against a throwaway
//! in-memory database. Invariant for every iteration: `low` has been accepted
//! (or is the floor) and `high` is rejected (or is the ceiling).

use std::fmt;

use rusqlite::{limits::Limit, params_from_iter, Connection, ErrorCode};
use serde::Serialize;

use crate::config::limits::{MAX_COMPILE_OPTIONS, PARAMETER_FLOOR, PROBE_TABLE};
use crate::error::{Error, Result};

/// Largest number of bound parameters one prepared statement may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ParameterLimit(usize);

impl ParameterLimit {
    pub fn new(value: usize) -> Result<Self> {
        if value < PARAMETER_FLOOR {
            return Err(Error::Configuration(format!(
                "parameter limit must be at least {PARAMETER_FLOOR}"
            )));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for ParameterLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Result of running one statement with a given number of bound parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    Accepted,
    TooManyParameters,
}

/// One open, isolated probe database. Dropping it releases the connection.
pub trait ProbeSession {
    /// Executes a query binding `arity` parameters. Failures other than overflow are `Err`.
    fn bind(&mut self, arity: usize) -> Result<BindOutcome>;
}

pub trait ProbeDriver: Send + Sync {
    /// Opens a fresh isolated instance with its single-column table in place.
    fn open(&self) -> Result<Box<dyn ProbeSession + '_>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    pub limit: ParameterLimit,
    pub ceiling: usize,
    pub iterations: u32,
    /// False when the ceiling itself was accepted, so `limit` is a cap rather than the build's limit.
    pub ceiling_rejected: bool,
}

/// Binary search over statement arity in `[1, ceiling)`.
pub fn discover_parameter_limit(driver: &dyn ProbeDriver, ceiling: usize) -> Result<ProbeReport> {
    if ceiling <= PARAMETER_FLOOR {
        return Err(Error::Configuration(format!(
            "probe ceiling {ceiling} leaves nothing to search"
        )));
    }
    let mut session = driver.open()?;

    let mut low = PARAMETER_FLOOR;
    let mut high = ceiling;
    let mut iterations = 0u32;
    let mut any_rejected = false;
    while high - low > 1 {
        let guess = (low + high) / 2;
        iterations += 1;
        match session.bind(guess)? {
            BindOutcome::Accepted => low = guess,
            BindOutcome::TooManyParameters => {
                high = guess;
                any_rejected = true;
            }
        }
        tracing::debug!(target = "envcaps", guess, low, high, "parameter probe step");
    }
    // Every guess passed: only binding the ceiling tells an exact `ceiling - 1` from a larger build.
    let ceiling_rejected =
        any_rejected || session.bind(ceiling)? == BindOutcome::TooManyParameters;
    drop(session);

    if !ceiling_rejected {
        tracing::warn!(
            target = "envcaps",
            ceiling,
            "ceiling was accepted; reported limit is capped by the ceiling"
        );
    }
    let limit = ParameterLimit(low);
    tracing::info!(target = "envcaps", %limit, iterations, "bind-parameter limit discovered");
    Ok(ProbeReport {
        limit,
        ceiling,
        iterations,
        ceiling_rejected,
    })
}

// ----------------------------------------------------------------------------
// SQLite
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct SqliteDriver {
    variable_limit: Option<usize>,
}

impl SqliteDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowers the throwaway connection's variable limit, emulating a build compiled
    /// with a smaller `MAX_VARIABLE_NUMBER`. SQLite never raises it past the compiled cap.
    pub fn with_variable_limit(limit: usize) -> Result<Self> {
        if limit < PARAMETER_FLOOR {
            return Err(Error::Configuration(format!(
                "emulated variable limit must be at least {PARAMETER_FLOOR}, got {limit}"
            )));
        }
        Ok(Self {
            variable_limit: Some(limit),
        })
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open_in_memory().map_err(|e| Error::DriverUnavailable(e.to_string()))?;
        if let Some(limit) = self.variable_limit {
            let limit = i32::try_from(limit).unwrap_or(i32::MAX);
            let _ = conn.set_limit(Limit::SQLITE_LIMIT_VARIABLE_NUMBER, limit);
        }
        Ok(conn)
    }

    /// Reads `MAX_VARIABLE_NUMBER=` from the compile options when the build declares it.
    pub fn compiled_variable_limit(&self) -> Result<Option<usize>> {
        let conn = self.connect()?;
        let defined: bool = conn
            .query_row(
                "SELECT sqlite_compileoption_used('MAX_VARIABLE_NUMBER')",
                [],
                |row| row.get(0),
            )
            .map_err(|e| probe_error(0, e))?;
        if !defined {
            return Ok(None);
        }
        for idx in 0..MAX_COMPILE_OPTIONS {
            let option: Option<String> = conn
                .query_row("SELECT sqlite_compileoption_get(?1)", [idx], |row| row.get(0))
                .map_err(|e| probe_error(0, e))?;
            let Some(option) = option else { break };
            if let Some(value) = option.strip_prefix("MAX_VARIABLE_NUMBER=") {
                return Ok(value.trim().parse().ok());
            }
        }
        Ok(None)
    }
}

impl ProbeDriver for SqliteDriver {
    fn open(&self) -> Result<Box<dyn ProbeSession + '_>> {
        let conn = self.connect()?;
        conn.execute_batch(&format!("CREATE TABLE {PROBE_TABLE} (value INTEGER)"))
            .map_err(|e| probe_error(0, e))?;
        tracing::trace!(target = "envcaps", "probe connection opened");
        Ok(Box::new(SqliteSession { conn }))
    }
}

struct SqliteSession {
    conn: Connection,
}

impl ProbeSession for SqliteSession {
    fn bind(&mut self, arity: usize) -> Result<BindOutcome> {
        let placeholders = vec!["?"; arity].join(", ");
        let sql = format!("SELECT value FROM {PROBE_TABLE} WHERE value IN ({placeholders})");
        let mut stmt = match self.conn.prepare(&sql) {
            Ok(stmt) => stmt,
            Err(err) if is_variable_overflow(&err) => return Ok(BindOutcome::TooManyParameters),
            Err(err) => return Err(probe_error(arity, err)),
        };
        let values = (0..arity).map(|v| v as i64);
        stmt.exists(params_from_iter(values))
            .map_err(|e| probe_error(arity, e))?;
        Ok(BindOutcome::Accepted)
    }
}

impl Drop for SqliteSession {
    fn drop(&mut self) {
        tracing::trace!(target = "envcaps", "probe connection released");
    }
}

/// SQLite reports overflow as a plain SQLITE_ERROR; the message is the only discriminator.
/// `prepare` surfaces it as `SqlInputError` on modern builds, `SqliteFailure` otherwise.
fn is_variable_overflow(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqlInputError { error, msg, .. } => {
            error.code == ErrorCode::Unknown && msg.contains("too many SQL variables")
        }
        rusqlite::Error::SqliteFailure(e, Some(msg)) => {
            e.code == ErrorCode::Unknown && msg.contains("too many SQL variables")
        }
        _ => false,
    }
}

fn probe_error(arity: usize, err: rusqlite::Error) -> Error {
    Error::ProbeExecution {
        arity,
        message: err.to_string(),
    }
}
