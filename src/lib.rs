pub mod bulk;
pub mod cache;
pub mod capabilities;
pub mod chunking;
pub mod config;
pub mod core;
pub mod error;
pub mod limit_probe;

pub use bulk::{BatchStatement, BulkReplace};
pub use cache::CapabilityCache;
pub use capabilities::{
    CapabilitySet, FeatureProbe, ALLOW_CERTIFICATE_PUSHING, ASYNC_OPERATIONS, CAPABILITIES_HEADER,
    GZIP_BUFFER_POST,
};
pub use chunking::{chunk_rows, plan_chunks, ChunkPlan, ChunkRanges};
pub use config::ProbeConfig;
pub use crate::core::{bootstrap, bootstrap_with, init_tracing, APP_NAME};
pub use error::{Error, Result};
pub use limit_probe::{
    discover_parameter_limit, BindOutcome, ParameterLimit, ProbeDriver, ProbeReport, ProbeSession,
    SqliteDriver,
};
