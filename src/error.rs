use thiserror::Error;

/// Errors surfaced to the hosting pipeline from the frame-processing path.
///
/// Transient misses (no region found, undecodable region, search deadline
/// elapsed) are not errors and never appear here.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The frame's pixel depth does not map to a supported packing order.
    #[error("unsupported pixel depth: {0} bpp")]
    UnsupportedDepth(u32),
    /// Asynchronous dispatch was requested but the decode worker is not
    /// running (never started, failed to start, or already shut down).
    #[error("decode worker is not running")]
    WorkerUnavailable,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Failure inside the decode engine while building its contexts.
#[derive(Debug, Error)]
#[error("decode engine: {0}")]
pub struct EngineError(String);

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Rejected configuration value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}
