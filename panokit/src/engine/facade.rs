//! The panorama engine facade.

use super::{EngineConfig, EngineError};
use crate::assembly::{AssembledPanorama, NoProgress, ProgressSink, TileGridAssembler};
use crate::cubemap::{Cubemap, CubemapConverter, ProjectedCubemap, ProjectedEquirect};
use crate::diagnostics::Diagnostics;
use crate::neighbor::{Neighbor, NeighborRequest, NeighborResolver};
use crate::overlap::{
    DisabledAligner, ExpandedPanorama, FeatureAligner, OverlapSynthesizer, PatchFeatureAligner,
};
use crate::provider::TileSource;
use crate::raster::Raster;
use crate::tile::ZoomLevel;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// A finished download: the (possibly expanded) panorama and what happened
/// along the way.
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    pub raster: Raster,
    pub diagnostics: Diagnostics,
}

/// Entry point for assembly, projection and overlap.
///
/// The engine holds no mutable state; it can be cloned cheaply and shared
/// between tasks. The synchronous conversion methods run on the calling
/// thread (parallelized internally with rayon); the `*_async` variants move
/// that work onto Tokio's blocking pool.
pub struct PanoramaEngine<S: TileSource> {
    assembler: TileGridAssembler<S>,
    converter: CubemapConverter,
    synthesizer: OverlapSynthesizer,
    config: EngineConfig,
}

impl<S: TileSource> Clone for PanoramaEngine<S> {
    fn clone(&self) -> Self {
        Self {
            assembler: self.assembler.clone(),
            converter: self.converter,
            synthesizer: self.synthesizer.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S: TileSource> PanoramaEngine<S> {
    /// Creates an engine, choosing the feature aligner from `config`.
    pub fn new(source: S, config: EngineConfig) -> Self {
        let aligner: Arc<dyn FeatureAligner> = if config.alignment() {
            Arc::new(PatchFeatureAligner::new())
        } else {
            Arc::new(DisabledAligner)
        };
        Self::with_aligner(source, config, aligner)
    }

    /// Creates an engine with a caller-supplied feature aligner.
    pub fn with_aligner(source: S, config: EngineConfig, aligner: Arc<dyn FeatureAligner>) -> Self {
        let synthesizer = OverlapSynthesizer::new(aligner).with_layout(config.overlap_layout());
        Self {
            assembler: TileGridAssembler::new(source, *config.download()),
            converter: CubemapConverter::new(),
            synthesizer,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn assembler(&self) -> &TileGridAssembler<S> {
        &self.assembler
    }

    /// Assembles a panorama from its tile grid.
    pub async fn assemble(
        &self,
        panorama_id: &str,
        zoom: ZoomLevel,
    ) -> Result<AssembledPanorama, EngineError> {
        Ok(self.assembler.assemble(panorama_id, zoom).await?)
    }

    /// Assembles a panorama with progress reporting and cancellation.
    pub async fn assemble_cancellable<P>(
        &self,
        panorama_id: &str,
        zoom: ZoomLevel,
        progress: &P,
        cancellation_token: CancellationToken,
    ) -> Result<AssembledPanorama, EngineError>
    where
        P: ProgressSink + ?Sized,
    {
        Ok(self
            .assembler
            .assemble_cancellable(panorama_id, zoom, progress, cancellation_token)
            .await?)
    }

    /// Splits an equirectangular panorama into cube faces.
    ///
    /// `face_size` overrides the configured size; both unset means half the
    /// source height.
    pub fn to_cubemap(&self, equirect: &Raster, face_size: Option<u32>) -> ProjectedCubemap {
        let face_size = face_size.filter(|&s| s > 0).or(self.config.face_size());
        self.converter.to_cubemap(equirect, face_size)
    }

    /// Reprojects cube faces into an equirectangular panorama.
    pub fn to_equirect(&self, cubemap: &Cubemap, width: u32, height: u32) -> ProjectedEquirect {
        self.converter.to_equirect(cubemap, width, height)
    }

    /// Expands a panorama's canvas with overlap borders.
    pub fn expand(&self, base: &Raster, percent: u32, neighbors: Vec<Neighbor>) -> ExpandedPanorama {
        self.synthesizer.expand(base, percent, neighbors)
    }

    /// [`Self::to_cubemap`] on the blocking pool.
    pub async fn to_cubemap_async(
        &self,
        equirect: Raster,
        face_size: Option<u32>,
    ) -> Result<ProjectedCubemap, EngineError> {
        let converter = self.converter;
        let face_size = face_size.filter(|&s| s > 0).or(self.config.face_size());
        Ok(
            tokio::task::spawn_blocking(move || converter.to_cubemap(&equirect, face_size))
                .await?,
        )
    }

    /// [`Self::to_equirect`] on the blocking pool.
    pub async fn to_equirect_async(
        &self,
        cubemap: Cubemap,
        width: u32,
        height: u32,
    ) -> Result<ProjectedEquirect, EngineError> {
        let converter = self.converter;
        Ok(
            tokio::task::spawn_blocking(move || converter.to_equirect(&cubemap, width, height))
                .await?,
        )
    }

    /// [`Self::expand`] on the blocking pool.
    pub async fn expand_async(
        &self,
        base: Raster,
        percent: u32,
        neighbors: Vec<Neighbor>,
    ) -> Result<ExpandedPanorama, EngineError> {
        let synthesizer = self.synthesizer.clone();
        Ok(
            tokio::task::spawn_blocking(move || synthesizer.expand(&base, percent, neighbors))
                .await?,
        )
    }

    /// Resolves neighbors for `base` and expands it.
    ///
    /// Returns [`EngineError::Cancelled`] if `cancellation_token` fires while
    /// neighbors are being resolved.
    pub async fn expand_with<R: NeighborResolver>(
        &self,
        resolver: &R,
        panorama_id: &str,
        zoom: ZoomLevel,
        base: Raster,
        percent: u32,
        cancellation_token: CancellationToken,
    ) -> Result<ExpandedPanorama, EngineError> {
        let neighbors = if percent == 0 {
            Vec::new()
        } else {
            resolver
                .resolve(NeighborRequest {
                    panorama_id,
                    zoom,
                    base: &base,
                    cancellation: &cancellation_token,
                })
                .await
        };
        if cancellation_token.is_cancelled() {
            info!(panorama_id, "Expansion cancelled");
            return Err(EngineError::Cancelled);
        }
        self.expand_async(base, percent, neighbors).await
    }

    /// Assembles a panorama and, when `overlap_percent > 0`, expands it with
    /// neighbors from `resolver`.
    #[instrument(
        skip(self, resolver, progress, cancellation_token),
        fields(panorama_id = %panorama_id, zoom = zoom.level(), resolver = resolver.name())
    )]
    pub async fn download<R, P>(
        &self,
        panorama_id: &str,
        zoom: ZoomLevel,
        overlap_percent: u32,
        resolver: &R,
        progress: &P,
        cancellation_token: CancellationToken,
    ) -> Result<DownloadOutcome, EngineError>
    where
        R: NeighborResolver,
        P: ProgressSink + ?Sized,
    {
        let assembled = self
            .assemble_cancellable(panorama_id, zoom, progress, cancellation_token.clone())
            .await?;
        let mut diagnostics = Diagnostics {
            assembly: Some(assembled.report.clone()),
            ..Diagnostics::default()
        };

        if overlap_percent == 0 {
            return Ok(DownloadOutcome {
                raster: assembled.raster,
                diagnostics,
            });
        }

        let expanded = self
            .expand_with(
                resolver,
                panorama_id,
                assembled.report.zoom,
                assembled.raster,
                overlap_percent,
                cancellation_token,
            )
            .await?;
        info!(overlap = %expanded.report, "Download expanded");
        diagnostics.overlap = Some(expanded.report);

        Ok(DownloadOutcome {
            raster: expanded.raster,
            diagnostics,
        })
    }

    /// Assembles without progress or cancellation and without overlap.
    pub async fn download_plain(&self, panorama_id: &str, zoom: ZoomLevel) -> Result<DownloadOutcome, EngineError> {
        self.download(
            panorama_id,
            zoom,
            0,
            &crate::neighbor::NoNeighbors,
            &NoProgress,
            CancellationToken::new(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::AssemblyError;
    use crate::config::DownloadConfig;
    use crate::diagnostics::BorderStrategy;
    use crate::neighbor::{MetadataNeighborResolver, ShiftNeighborResolver};
    use crate::projection::CubeFace;
    use crate::provider::{MetadataSource, PanoramaLink, ProviderError};
    use crate::raster;
    use crate::tile::TileCoord;
    use image::codecs::jpeg::JpegEncoder;
    use image::{ExtendedColorType, Rgb};
    use std::time::{Duration, Instant};

    struct SolidSource;

    impl TileSource for SolidSource {
        async fn fetch_tile(
            &self,
            _panorama_id: &str,
            _tile: TileCoord,
            _zoom: ZoomLevel,
        ) -> Result<Vec<u8>, ProviderError> {
            let tile = raster::solid(512, 512, Rgb([60, 120, 180]));
            let mut out = Vec::new();
            JpegEncoder::new_with_quality(&mut out, 95)
                .encode(tile.as_raw(), 512, 512, ExtendedColorType::Rgb8)
                .unwrap();
            Ok(out)
        }

        fn name(&self) -> &str {
            "solid"
        }
    }

    struct Unreachable;

    impl TileSource for Unreachable {
        async fn fetch_tile(
            &self,
            _panorama_id: &str,
            _tile: TileCoord,
            _zoom: ZoomLevel,
        ) -> Result<Vec<u8>, ProviderError> {
            Err(ProviderError::Transport("connection refused".into()))
        }

        fn name(&self) -> &str {
            "unreachable"
        }
    }

    /// Serves `base` and never answers for any other panorama, firing
    /// `neighbor_started` on the first such request.
    #[derive(Clone)]
    struct StallingNeighbors {
        neighbor_started: CancellationToken,
    }

    impl TileSource for StallingNeighbors {
        async fn fetch_tile(
            &self,
            panorama_id: &str,
            tile: TileCoord,
            zoom: ZoomLevel,
        ) -> Result<Vec<u8>, ProviderError> {
            if panorama_id != "base" {
                self.neighbor_started.cancel();
                std::future::pending::<()>().await;
            }
            SolidSource.fetch_tile(panorama_id, tile, zoom).await
        }

        fn name(&self) -> &str {
            "stalling"
        }
    }

    struct OneLink;

    impl MetadataSource for OneLink {
        async fn fetch_links(&self, _panorama_id: &str) -> Result<Vec<PanoramaLink>, ProviderError> {
            Ok(vec![PanoramaLink {
                panorama_id: "n1".to_string(),
                yaw_degrees: Some(90.0),
            }])
        }
    }

    fn config() -> EngineConfig {
        EngineConfig::builder()
            .download(
                DownloadConfig::default()
                    .with_max_attempts(1)
                    .with_retry_delay(Duration::from_millis(1)),
            )
            .build()
    }

    #[tokio::test]
    async fn test_download_without_overlap() {
        let engine = PanoramaEngine::new(SolidSource, config());
        let outcome = engine.download_plain("pano", ZoomLevel::new(1)).await.unwrap();
        assert_eq!(outcome.raster.dimensions(), (1024, 512));
        assert!(outcome.diagnostics.overlap.is_none());
        assert!(outcome.diagnostics.is_clean());
    }

    #[tokio::test]
    async fn test_download_with_shift_overlap() {
        let engine = PanoramaEngine::new(SolidSource, config());
        let outcome = engine
            .download(
                "pano",
                ZoomLevel::new(1),
                20,
                &ShiftNeighborResolver::new(),
                &NoProgress,
                CancellationToken::new(),
            )
            .await
            .unwrap();
        let overlap = outcome.diagnostics.overlap.unwrap();
        assert_eq!(outcome.raster.width(), 2 * outcome.raster.height());
        assert_ne!(overlap.left, BorderStrategy::Wrap);
        assert_ne!(overlap.right, BorderStrategy::Wrap);
    }

    #[tokio::test]
    async fn test_cancel_during_neighbor_assembly() {
        let download = DownloadConfig::default()
            .with_max_attempts(3)
            .with_timeout(Duration::from_secs(3))
            .with_retry_delay(Duration::from_millis(1));
        let source = StallingNeighbors {
            neighbor_started: CancellationToken::new(),
        };
        let neighbor_started = source.neighbor_started.clone();
        let engine = PanoramaEngine::new(
            source.clone(),
            EngineConfig::builder().download(download).build(),
        );
        let resolver =
            MetadataNeighborResolver::new(OneLink, TileGridAssembler::new(source, download));

        let token = CancellationToken::new();
        let canceller = token.clone();
        let cancelled_at = tokio::spawn(async move {
            neighbor_started.cancelled().await;
            tokio::time::sleep(Duration::from_millis(200)).await;
            canceller.cancel();
            Instant::now()
        });

        let err = engine
            .download("base", ZoomLevel::new(1), 20, &resolver, &NoProgress, token)
            .await
            .unwrap_err();
        let cancelled_at = cancelled_at.await.unwrap();
        assert!(matches!(err, EngineError::Cancelled));
        assert!(err.is_cancelled());
        assert!(cancelled_at.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_expand_with_honours_prior_cancellation() {
        let engine = PanoramaEngine::new(SolidSource, config());
        let token = CancellationToken::new();
        token.cancel();
        let base = raster::solid(64, 32, Rgb([1, 2, 3]));
        let err = engine
            .expand_with(&ShiftNeighborResolver::new(), "pano", ZoomLevel::new(0), base, 20, token)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_transport_outage_propagates() {
        let engine = PanoramaEngine::new(Unreachable, config());
        let err = engine.assemble("pano", ZoomLevel::new(0)).await.unwrap_err();
        assert!(matches!(err, EngineError::Assembly(AssemblyError::Transport { .. })));
        assert!(!err.is_cancelled());
    }

    #[tokio::test]
    async fn test_async_conversions() {
        let engine = PanoramaEngine::new(SolidSource, EngineConfig::builder().face_size(32).build());
        let equirect = raster::solid(128, 64, Rgb([10, 10, 10]));

        let projected = engine.to_cubemap_async(equirect, None).await.unwrap();
        assert_eq!(projected.face_size, 32);
        assert_eq!(projected.cubemap.get(CubeFace::Up).unwrap().dimensions(), (32, 32));

        let back = engine.to_equirect_async(projected.cubemap, 128, 64).await.unwrap();
        assert_eq!(back.raster.dimensions(), (128, 64));
        assert_eq!(back.report.projection_fallbacks, 0);
    }

    #[test]
    fn test_explicit_face_size_overrides_config() {
        let engine = PanoramaEngine::new(SolidSource, EngineConfig::builder().face_size(32).build());
        let equirect = raster::solid(128, 64, Rgb([10, 10, 10]));
        assert_eq!(engine.to_cubemap(&equirect, Some(16)).face_size, 16);
        assert_eq!(engine.to_cubemap(&equirect, Some(0)).face_size, 32);
    }
}
