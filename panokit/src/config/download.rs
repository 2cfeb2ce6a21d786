//! Tile download configuration.

use super::defaults::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_PARALLEL_DOWNLOADS, DEFAULT_RETRY_DELAY_MS, DEFAULT_TIMEOUT_SECS,
};
use std::time::Duration;

/// Configuration for tile fetching.
///
/// Groups the retry and concurrency parameters used by the tile grid
/// assembler, providing sensible defaults while allowing customization.
///
/// # Example
///
/// ```
/// use panokit::config::DownloadConfig;
/// use std::time::Duration;
///
/// // Using defaults
/// let config = DownloadConfig::default();
/// assert_eq!(config.timeout(), Duration::from_secs(10));
/// assert_eq!(config.max_attempts(), 3);
///
/// // Custom configuration
/// let config = DownloadConfig::new()
///     .with_timeout(Duration::from_secs(20))
///     .with_max_attempts(5)
///     .with_parallel_downloads(16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadConfig {
    /// Deadline for a single tile attempt
    timeout: Duration,
    /// Attempts per tile, including the first
    max_attempts: u32,
    /// Fixed pause between attempts of one tile
    retry_delay: Duration,
    /// Maximum number of concurrent tile requests
    parallel_downloads: usize,
}

impl DownloadConfig {
    /// Create a new download configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-attempt timeout.
    ///
    /// Each attempt gets its own deadline; a slow attempt does not shorten
    /// the next one. Default: 10 seconds.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the number of attempts per tile.
    ///
    /// Values below 1 are raised to 1. Default: 3 attempts.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the fixed delay between attempts. Default: 1 second.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the maximum number of parallel tile requests.
    ///
    /// Values below 1 are raised to 1. Default: 8.
    pub fn with_parallel_downloads(mut self, parallel: usize) -> Self {
        self.parallel_downloads = parallel.max(1);
        self
    }

    /// Get the per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the number of attempts per tile.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Get the delay between attempts.
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Get the maximum number of parallel tile requests.
    pub fn parallel_downloads(&self) -> usize {
        self.parallel_downloads
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            parallel_downloads: DEFAULT_PARALLEL_DOWNLOADS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DownloadConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.max_attempts(), DEFAULT_MAX_ATTEMPTS);
        assert_eq!(
            config.retry_delay(),
            Duration::from_millis(DEFAULT_RETRY_DELAY_MS)
        );
        assert_eq!(config.parallel_downloads(), DEFAULT_PARALLEL_DOWNLOADS);
    }

    #[test]
    fn test_new_equals_default() {
        assert_eq!(DownloadConfig::new(), DownloadConfig::default());
    }

    #[test]
    fn test_builder_chain() {
        let config = DownloadConfig::new()
            .with_timeout(Duration::from_secs(45))
            .with_max_attempts(2)
            .with_retry_delay(Duration::from_millis(10))
            .with_parallel_downloads(64);

        assert_eq!(config.timeout(), Duration::from_secs(45));
        assert_eq!(config.max_attempts(), 2);
        assert_eq!(config.retry_delay(), Duration::from_millis(10));
        assert_eq!(config.parallel_downloads(), 64);
    }

    #[test]
    fn test_zero_values_raised_to_one() {
        let config = DownloadConfig::new()
            .with_max_attempts(0)
            .with_parallel_downloads(0);
        assert_eq!(config.max_attempts(), 1);
        assert_eq!(config.parallel_downloads(), 1);
    }

    #[test]
    fn test_with_timeout_leaves_others() {
        let config = DownloadConfig::new().with_timeout(Duration::from_secs(60));
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.max_attempts(), DEFAULT_MAX_ATTEMPTS);
        assert_eq!(config.parallel_downloads(), DEFAULT_PARALLEL_DOWNLOADS);
    }
}
