//! Progress reporting for tile assembly.

use crate::tile::TileCoord;

/// Progress after one tile has been resolved (fetched or given up on).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyProgress {
    /// Tiles resolved so far, including this one.
    pub completed: usize,
    pub total: usize,
    pub tile: TileCoord,
    /// False when the tile will be a placeholder.
    pub succeeded: bool,
}

impl AssemblyProgress {
    /// Completed fraction in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Receives progress updates from the assembler.
///
/// Calls are fire-and-forget from the collection loop; implementations must
/// not block.
pub trait ProgressSink: Send + Sync {
    fn tile_completed(&self, progress: AssemblyProgress);
}

impl<F> ProgressSink for F
where
    F: Fn(AssemblyProgress) + Send + Sync,
{
    fn tile_completed(&self, progress: AssemblyProgress) {
        self(progress)
    }
}

/// Progress sink that discards updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn tile_completed(&self, _progress: AssemblyProgress) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_closure_sink() {
        let seen = AtomicUsize::new(0);
        let sink = |p: AssemblyProgress| {
            seen.store(p.completed, Ordering::SeqCst);
        };
        sink.tile_completed(AssemblyProgress {
            completed: 3,
            total: 4,
            tile: TileCoord::new(0, 0),
            succeeded: true,
        });
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_fraction() {
        let p = AssemblyProgress {
            completed: 1,
            total: 4,
            tile: TileCoord::new(1, 0),
            succeeded: false,
        };
        assert!((p.fraction() - 0.25).abs() < f64::EPSILON);
    }
}
