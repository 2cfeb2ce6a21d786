//! Single-tile fetch with retry, timeout and cancellation.

use super::results::{TileFailure, TileSuccess};
use crate::config::DownloadConfig;
use crate::provider::{FailureKind, ProviderError, TileSource};
use crate::raster::Raster;
use crate::tile::{TileCoord, ZoomLevel};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Why a tile task ended without an image.
#[derive(Debug)]
pub(super) enum TileAbort {
    /// All attempts failed.
    Exhausted(TileFailure),
    /// The assembly was cancelled; the tile is neither success nor failure.
    Cancelled,
}

/// Decodes an encoded tile into an RGB raster.
pub(super) fn decode_tile(bytes: &[u8]) -> Result<Raster, ProviderError> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgb8())
        .map_err(|e| ProviderError::InvalidResponse(format!("image decode error: {}", e)))
}

/// Fetches and decodes one tile.
///
/// Each attempt acquires a permit from `limiter`, is bounded by the configured
/// per-attempt timeout, and is followed (on failure) by the fixed retry delay.
/// A malformed body counts as a failed attempt exactly like a bad status.
/// Cancellation is observed while waiting for a permit, during the request
/// and during the retry delay.
pub(super) async fn fetch_tile_cancellable<S: TileSource>(
    source: Arc<S>,
    panorama_id: Arc<str>,
    tile: TileCoord,
    zoom: ZoomLevel,
    config: DownloadConfig,
    limiter: Arc<Semaphore>,
    cancellation_token: CancellationToken,
) -> Result<TileSuccess, TileAbort> {
    let max_attempts = config.max_attempts();
    let mut last_kind = FailureKind::Transport;
    let mut last_error = String::new();

    for attempt in 1..=max_attempts {
        if cancellation_token.is_cancelled() {
            return Err(TileAbort::Cancelled);
        }

        let permit = tokio::select! {
            biased;
            _ = cancellation_token.cancelled() => return Err(TileAbort::Cancelled),
            permit = limiter.acquire() => permit,
        };
        // A closed limiter only happens when the assembly is torn down.
        let Ok(permit) = permit else {
            return Err(TileAbort::Cancelled);
        };

        let outcome = tokio::select! {
            biased;
            _ = cancellation_token.cancelled() => return Err(TileAbort::Cancelled),
            result = tokio::time::timeout(
                config.timeout(),
                source.fetch_tile(&panorama_id, tile, zoom),
            ) => result,
        };
        drop(permit);

        let error = match outcome {
            Ok(Ok(bytes)) => match decode_tile(&bytes) {
                Ok(image) => {
                    trace!(
                        tile_x = tile.x,
                        tile_y = tile.y,
                        attempt,
                        bytes = bytes.len(),
                        "Tile fetched"
                    );
                    return Ok(TileSuccess {
                        tile,
                        image,
                        attempts: attempt,
                    });
                }
                Err(e) => e,
            },
            Ok(Err(e)) => e,
            Err(_) => ProviderError::Timeout(format!(
                "no response within {}ms",
                config.timeout().as_millis()
            )),
        };

        last_kind = error.kind();
        last_error = error.to_string();
        debug!(
            tile_x = tile.x,
            tile_y = tile.y,
            attempt,
            max_attempts,
            kind = last_kind.as_str(),
            error = %last_error,
            "Tile attempt failed"
        );

        if attempt < max_attempts {
            tokio::select! {
                biased;
                _ = cancellation_token.cancelled() => return Err(TileAbort::Cancelled),
                _ = tokio::time::sleep(config.retry_delay()) => {}
            }
        }
    }

    Err(TileAbort::Exhausted(TileFailure {
        tile,
        attempts: max_attempts,
        kind: last_kind,
        last_error,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn png_tile() -> Vec<u8> {
        let img = RgbImage::from_pixel(8, 8, Rgb([1, 2, 3]));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    /// Fails a fixed number of times with the given error, then serves a tile.
    struct FlakySource {
        failures_before_success: u32,
        error: ProviderError,
        calls: AtomicU32,
    }

    impl TileSource for FlakySource {
        async fn fetch_tile(
            &self,
            _panorama_id: &str,
            _tile: TileCoord,
            _zoom: ZoomLevel,
        ) -> Result<Vec<u8>, ProviderError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                Err(self.error.clone())
            } else {
                Ok(png_tile())
            }
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    fn fast_config() -> DownloadConfig {
        DownloadConfig::new()
            .with_retry_delay(Duration::from_millis(1))
            .with_timeout(Duration::from_secs(2))
    }

    async fn run(source: Arc<FlakySource>, token: CancellationToken) -> Result<TileSuccess, TileAbort> {
        fetch_tile_cancellable(
            source,
            Arc::from("pano"),
            TileCoord::new(0, 0),
            ZoomLevel::new(0),
            fast_config(),
            Arc::new(Semaphore::new(1)),
            token,
        )
        .await
    }

    #[tokio::test]
    async fn test_succeeds_after_retries() {
        let source = Arc::new(FlakySource {
            failures_before_success: 2,
            error: ProviderError::HttpStatus {
                status: 500,
                url: String::new(),
            },
            calls: AtomicU32::new(0),
        });
        let success = run(Arc::clone(&source), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(success.attempts, 3);
        assert_eq!(success.image.dimensions(), (8, 8));
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_attempts() {
        let source = Arc::new(FlakySource {
            failures_before_success: u32::MAX,
            error: ProviderError::Transport("refused".into()),
            calls: AtomicU32::new(0),
        });
        match run(Arc::clone(&source), CancellationToken::new()).await {
            Err(TileAbort::Exhausted(failure)) => {
                assert_eq!(failure.attempts, 3);
                assert_eq!(failure.kind, FailureKind::Transport);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let source = Arc::new(FlakySource {
            failures_before_success: 0,
            error: ProviderError::Transport(String::new()),
            calls: AtomicU32::new(0),
        });
        let token = CancellationToken::new();
        token.cancel();
        assert!(matches!(
            run(Arc::clone(&source), token).await,
            Err(TileAbort::Cancelled)
        ));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_tile(b"not an image").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Decode);
        assert!(decode_tile(&png_tile()).is_ok());
    }
}
