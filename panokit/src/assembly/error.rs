//! Assembly error types.

use thiserror::Error;

/// Errors that abort a tile grid assembly.
///
/// Individual tile failures are not errors; they are replaced with the
/// placeholder and counted in the assembly report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    /// Every tile failed at the transport level: the endpoint is unreachable.
    #[error("Tile endpoint unreachable: all {total} tiles failed to connect (last error: {last_error})")]
    Transport { total: usize, last_error: String },

    /// The caller cancelled the assembly.
    #[error("Assembly cancelled after {completed} of {total} tiles")]
    Cancelled { completed: usize, total: usize },

    /// The blocking compose task failed.
    #[error("Assembly task failed: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = AssemblyError::Cancelled {
            completed: 3,
            total: 8,
        };
        assert_eq!(err.to_string(), "Assembly cancelled after 3 of 8 tiles");
    }
}
