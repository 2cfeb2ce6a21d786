//! Engine error types.

use crate::assembly::AssemblyError;
use thiserror::Error;

/// Errors surfaced by the engine API.
///
/// Only assembly can fail in normal operation; projection and overlap always
/// produce a raster. `Task` covers a CPU worker that panicked or was
/// cancelled by the runtime.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    /// Cancelled after assembly, while neighbors were being fetched.
    #[error("Cancelled while resolving neighbors")]
    Cancelled,

    #[error("Worker task failed: {0}")]
    Task(String),
}

impl EngineError {
    /// True if the caller cancelled the operation.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            EngineError::Cancelled | EngineError::Assembly(AssemblyError::Cancelled { .. })
        )
    }
}

impl From<tokio::task::JoinError> for EngineError {
    fn from(e: tokio::task::JoinError) -> Self {
        EngineError::Task(e.to_string())
    }
}
