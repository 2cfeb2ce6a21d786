//! Tile grid assembler.

use super::error::AssemblyError;
use super::fetch::{fetch_tile_cancellable, TileAbort};
use super::progress::{AssemblyProgress, NoProgress, ProgressSink};
use super::results::{compose, AssembledPanorama, TileResults};
use crate::config::DownloadConfig;
use crate::diagnostics::AssemblyReport;
use crate::provider::TileSource;
use crate::tile::ZoomLevel;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Assembles a panorama from its tile grid.
///
/// Every tile of the grid is attempted exactly once per assembly, as its own
/// task. Tasks share a semaphore that bounds requests in flight, so one
/// tile's retries never hold up another tile's fetch. Results are collected
/// as they complete; each tile writes a disjoint cell of the output, so the
/// raster does not depend on completion order.
///
/// # Example
///
/// ```ignore
/// use panokit::assembly::TileGridAssembler;
/// use panokit::config::DownloadConfig;
/// use panokit::provider::{AsyncReqwestClient, StreetViewTileSource};
/// use panokit::tile::ZoomLevel;
///
/// let source = StreetViewTileSource::new(AsyncReqwestClient::new()?);
/// let assembler = TileGridAssembler::new(source, DownloadConfig::default());
/// let panorama = assembler.assemble("PANORAMA_ID", ZoomLevel::new(3)).await?;
/// println!("{}", panorama.report);
/// ```
pub struct TileGridAssembler<S: TileSource> {
    source: Arc<S>,
    config: DownloadConfig,
}

impl<S: TileSource> Clone for TileGridAssembler<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            config: self.config,
        }
    }
}

impl<S: TileSource> TileGridAssembler<S> {
    pub fn new(source: S, config: DownloadConfig) -> Self {
        Self::from_arc(Arc::new(source), config)
    }

    /// Creates an assembler sharing an existing source.
    pub fn from_arc(source: Arc<S>, config: DownloadConfig) -> Self {
        Self { source, config }
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Assembles a panorama without progress reporting or cancellation.
    pub async fn assemble(
        &self,
        panorama_id: &str,
        zoom: ZoomLevel,
    ) -> Result<AssembledPanorama, AssemblyError> {
        self.assemble_cancellable(panorama_id, zoom, &NoProgress, CancellationToken::new())
            .await
    }

    /// Assembles a panorama, reporting progress and honoring cancellation.
    ///
    /// Failed tiles become gray placeholders and are counted in the report.
    /// The call only fails when every tile failed at the transport level, or
    /// when `cancellation_token` fires; in-flight tile tasks are aborted then.
    #[instrument(
        skip(self, progress, cancellation_token),
        fields(panorama_id = %panorama_id, zoom = zoom.level(), source = self.source.name())
    )]
    pub async fn assemble_cancellable<P>(
        &self,
        panorama_id: &str,
        zoom: ZoomLevel,
        progress: &P,
        cancellation_token: CancellationToken,
    ) -> Result<AssembledPanorama, AssemblyError>
    where
        P: ProgressSink + ?Sized,
    {
        let start = Instant::now();
        let total = zoom.tile_count();
        let (tiles_x, tiles_y) = zoom.grid();
        debug!(tiles_x, tiles_y, total, "Starting tile assembly");

        if cancellation_token.is_cancelled() {
            return Err(AssemblyError::Cancelled {
                completed: 0,
                total,
            });
        }

        let id: Arc<str> = Arc::from(panorama_id);
        let limiter = Arc::new(Semaphore::new(self.config.parallel_downloads()));
        let mut results = TileResults::with_capacity(total);
        let mut downloads = JoinSet::new();

        for tile in zoom.tiles() {
            let source = Arc::clone(&self.source);
            let id = Arc::clone(&id);
            let limiter = Arc::clone(&limiter);
            let token = cancellation_token.clone();
            let config = self.config;

            downloads.spawn(async move {
                let outcome =
                    fetch_tile_cancellable(source, id, tile, zoom, config, limiter, token).await;
                (tile, outcome)
            });
        }

        loop {
            tokio::select! {
                biased;

                _ = cancellation_token.cancelled() => {
                    downloads.abort_all();
                    info!(
                        completed = results.total_count(),
                        total,
                        "Assembly cancelled, aborting remaining tiles"
                    );
                    return Err(AssemblyError::Cancelled {
                        completed: results.total_count(),
                        total,
                    });
                }

                joined = downloads.join_next() => {
                    let (tile, succeeded) = match joined {
                        Some(Ok((_, Ok(success)))) => {
                            let tile = success.tile;
                            results.add_success(success);
                            (tile, true)
                        }
                        Some(Ok((tile, Err(TileAbort::Exhausted(failure))))) => {
                            warn!(
                                tile_x = failure.tile.x,
                                tile_y = failure.tile.y,
                                attempts = failure.attempts,
                                kind = failure.kind.as_str(),
                                error = %failure.last_error,
                                "Tile failed, using placeholder"
                            );
                            results.add_failure(failure);
                            (tile, false)
                        }
                        Some(Ok((_, Err(TileAbort::Cancelled)))) => continue,
                        Some(Err(join_err)) => {
                            if !join_err.is_cancelled() {
                                warn!(error = %join_err, "Tile task panicked");
                            }
                            continue;
                        }
                        None => break,
                    };

                    progress.tile_completed(AssemblyProgress {
                        completed: results.total_count(),
                        total,
                        tile,
                        succeeded,
                    });
                }
            }
        }

        if results.is_transport_outage() && results.failure_count() == total {
            let last_error = results
                .failures
                .last()
                .map(|f| f.last_error.clone())
                .unwrap_or_default();
            warn!(total, error = %last_error, "Tile endpoint unreachable");
            return Err(AssemblyError::Transport { total, last_error });
        }

        let report = AssemblyReport {
            panorama_id: panorama_id.to_string(),
            zoom,
            tiles_total: total,
            tile_failures: total - results.success_count(),
            failures: results.failure_counts(),
            retries: results.retries(),
            elapsed: start.elapsed(),
        };

        let raster = tokio::task::spawn_blocking(move || compose(zoom, &results))
            .await
            .map_err(|e| AssemblyError::Internal(e.to_string()))?;

        info!(
            fetched = report.tiles_fetched(),
            failed = report.tile_failures,
            retries = report.retries,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Tile assembly complete"
        );

        Ok(AssembledPanorama { raster, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{FailureKind, ProviderError};
    use crate::raster::NEUTRAL_GRAY;
    use crate::tile::TileCoord;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn tile_color(tile: TileCoord) -> Rgb<u8> {
        Rgb([(tile.x * 60) as u8, (tile.y * 90) as u8, 200])
    }

    fn encode(img: &RgbImage) -> Vec<u8> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn fast_config() -> DownloadConfig {
        DownloadConfig::new()
            .with_retry_delay(Duration::from_millis(1))
            .with_timeout(Duration::from_secs(5))
    }

    /// Serves a solid tile per coordinate and tracks concurrency.
    #[derive(Default)]
    struct ColorSource {
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        delay: Option<Duration>,
    }

    impl TileSource for ColorSource {
        async fn fetch_tile(
            &self,
            _panorama_id: &str,
            tile: TileCoord,
            _zoom: ZoomLevel,
        ) -> Result<Vec<u8>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(encode(&RgbImage::from_pixel(512, 512, tile_color(tile))))
        }

        fn name(&self) -> &str {
            "color"
        }
    }

    /// Fails every request with a fixed error.
    struct FailingSource {
        error: ProviderError,
        calls: AtomicUsize,
    }

    impl FailingSource {
        fn new(error: ProviderError) -> Self {
            Self {
                error,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl TileSource for FailingSource {
        async fn fetch_tile(
            &self,
            _panorama_id: &str,
            _tile: TileCoord,
            _zoom: ZoomLevel,
        ) -> Result<Vec<u8>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(self.error.clone())
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    /// Never answers.
    struct HangingSource;

    impl TileSource for HangingSource {
        async fn fetch_tile(
            &self,
            _panorama_id: &str,
            _tile: TileCoord,
            _zoom: ZoomLevel,
        ) -> Result<Vec<u8>, ProviderError> {
            std::future::pending().await
        }

        fn name(&self) -> &str {
            "hanging"
        }
    }

    #[tokio::test]
    async fn test_assembles_full_grid() {
        let assembler = TileGridAssembler::new(ColorSource::default(), fast_config());
        let panorama = assembler.assemble("pano", ZoomLevel::new(2)).await.unwrap();

        assert_eq!(panorama.raster.dimensions(), (2048, 1024));
        assert!(panorama.report.is_complete());
        assert_eq!(panorama.report.tiles_total, 8);
        assert_eq!(
            *panorama.raster.get_pixel(3 * 512 + 10, 512 + 10),
            tile_color(TileCoord::new(3, 1))
        );
        assert_eq!(assembler.source().calls.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn test_all_status_failures_yield_placeholder() {
        let assembler = TileGridAssembler::new(
            FailingSource::new(ProviderError::HttpStatus {
                status: 404,
                url: String::new(),
            }),
            fast_config(),
        );
        let panorama = assembler.assemble("pano", ZoomLevel::new(1)).await.unwrap();

        assert_eq!(panorama.raster.dimensions(), (1024, 512));
        assert!(panorama.raster.pixels().all(|p| *p == NEUTRAL_GRAY));
        assert_eq!(panorama.report.tile_failures, 2);
        assert_eq!(panorama.report.failures.status, 2);
        assert_eq!(panorama.report.retries, 4);
        assert_eq!(assembler.source().calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_all_transport_failures_is_error() {
        let assembler = TileGridAssembler::new(
            FailingSource::new(ProviderError::Transport("connection refused".into())),
            fast_config(),
        );
        let err = assembler
            .assemble("pano", ZoomLevel::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AssemblyError::Transport { total: 2, .. }));
    }

    #[tokio::test]
    async fn test_decode_failures_are_counted() {
        struct GarbageSource;
        impl TileSource for GarbageSource {
            async fn fetch_tile(
                &self,
                _panorama_id: &str,
                _tile: TileCoord,
                _zoom: ZoomLevel,
            ) -> Result<Vec<u8>, ProviderError> {
                Ok(b"<html>rate limited</html>".to_vec())
            }
            fn name(&self) -> &str {
                "garbage"
            }
        }

        let assembler = TileGridAssembler::new(GarbageSource, fast_config());
        let panorama = assembler.assemble("pano", ZoomLevel::new(0)).await.unwrap();
        assert_eq!(panorama.report.tile_failures, 1);
        assert_eq!(panorama.report.failures.decode, 1);
        assert_eq!(
            FailureKind::Decode,
            ProviderError::InvalidResponse(String::new()).kind()
        );
    }

    #[tokio::test]
    async fn test_progress_reported_per_tile() {
        let seen = Mutex::new(Vec::new());
        let sink = |p: AssemblyProgress| seen.lock().unwrap().push(p);
        let assembler = TileGridAssembler::new(ColorSource::default(), fast_config());
        assembler
            .assemble_cancellable("pano", ZoomLevel::new(2), &sink, CancellationToken::new())
            .await
            .unwrap();

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 8);
        assert_eq!(seen.last().map(|p| p.completed), Some(8));
        assert!(seen.iter().all(|p| p.total == 8 && p.succeeded));
    }

    #[tokio::test]
    async fn test_parallelism_is_bounded() {
        let source = ColorSource {
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        };
        let assembler =
            TileGridAssembler::new(source, fast_config().with_parallel_downloads(2));
        assembler.assemble("pano", ZoomLevel::new(2)).await.unwrap();
        assert!(assembler.source().max_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let assembler = TileGridAssembler::new(ColorSource::default(), fast_config());
        let err = assembler
            .assemble_cancellable("pano", ZoomLevel::new(1), &NoProgress, token)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AssemblyError::Cancelled {
                completed: 0,
                total: 2
            }
        );
        assert_eq!(assembler.source().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_aborts_hanging_fetches() {
        let token = CancellationToken::new();
        let assembler = TileGridAssembler::new(
            HangingSource,
            fast_config().with_timeout(Duration::from_secs(60)),
        );

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let started = Instant::now();
        let err = assembler
            .assemble_cancellable("pano", ZoomLevel::new(3), &NoProgress, token)
            .await
            .unwrap_err();
        assert!(matches!(err, AssemblyError::Cancelled { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
