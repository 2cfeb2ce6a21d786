//! Folder conversion between equirectangular images and cube face sets.
//!
//! Face files are named `{stem}_{face}.jpg` (`pano_front.jpg`,
//! `pano_up.jpg`, ...). Reassembled panoramas are written as
//! `{stem}_equirect.jpg`. A file that fails to convert is recorded in the
//! [`BatchReport`] and the batch moves on.

use crate::cubemap::{Cubemap, CubemapConverter};
use crate::projection::CubeFace;
use crate::raster::{self, Raster};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Extensions treated as images, compared case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Faces a set needs before it is reassembled.
pub const MIN_FACES_FOR_REASSEMBLY: usize = 4;

/// Equirectangular output size when none is requested.
pub const DEFAULT_EQUIRECT_SIZE: (u32, u32) = (2048, 1024);

/// Errors that stop a batch before it starts.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Image error on {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("No usable faces for '{0}'")]
    IncompleteFaceSet(String),
}

/// Conversion direction for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    ToCubemap,
    ToEquirect,
}

impl BatchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            BatchMode::ToCubemap => "to-cubemap",
            BatchMode::ToEquirect => "to-equirect",
        }
    }
}

impl fmt::Display for BatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "to-cubemap" | "cubemap" => Ok(BatchMode::ToCubemap),
            "to-equirect" | "equirect" => Ok(BatchMode::ToEquirect),
            _ => Err(format!("unknown batch mode '{}'", s)),
        }
    }
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Inputs considered (files or face sets).
    pub total: usize,
    /// Files written.
    pub written: Vec<PathBuf>,
    /// Inputs that failed, with the reason.
    pub failures: Vec<(PathBuf, String)>,
    /// Faces or regions filled with gray across the batch.
    pub projection_fallbacks: usize,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.total - self.failures.len()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} converted, {} files written, {} failed",
            self.succeeded(),
            self.total,
            self.written.len(),
            self.failures.len()
        )
    }
}

/// Batch converter settings.
#[derive(Debug, Clone, Copy)]
pub struct BatchConverter {
    converter: CubemapConverter,
    face_size: Option<u32>,
    equirect_size: (u32, u32),
    jpeg_quality: u8,
}

impl Default for BatchConverter {
    fn default() -> Self {
        Self {
            converter: CubemapConverter::new(),
            face_size: None,
            equirect_size: DEFAULT_EQUIRECT_SIZE,
            jpeg_quality: raster::DEFAULT_JPEG_QUALITY,
        }
    }
}

impl BatchConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_face_size(mut self, face_size: Option<u32>) -> Self {
        self.face_size = face_size.filter(|&s| s > 0);
        self
    }

    pub fn with_equirect_size(mut self, width: u32, height: u32) -> Self {
        self.equirect_size = (width.max(1), height.max(1));
        self
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Runs `mode` over every input in `input_dir`, writing to `output_dir`.
    ///
    /// `progress` is called before each input with `(index, total, path)`.
    pub fn run<F>(
        &self,
        mode: BatchMode,
        input_dir: &Path,
        output_dir: &Path,
        progress: F,
    ) -> Result<BatchReport, BatchError>
    where
        F: Fn(usize, usize, &Path),
    {
        match mode {
            BatchMode::ToCubemap => self.folder_to_cubemaps(input_dir, output_dir, progress),
            BatchMode::ToEquirect => self.folder_to_equirects(input_dir, output_dir, progress),
        }
    }

    /// Splits every image in `input_dir` into six face files.
    pub fn folder_to_cubemaps<F>(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        progress: F,
    ) -> Result<BatchReport, BatchError>
    where
        F: Fn(usize, usize, &Path),
    {
        let images = list_images(input_dir)?;
        ensure_dir(output_dir)?;

        let mut report = BatchReport {
            total: images.len(),
            ..BatchReport::default()
        };
        for (index, path) in images.iter().enumerate() {
            progress(index, images.len(), path);
            match self.image_to_cubemap(path, output_dir) {
                Ok((written, fallbacks)) => {
                    report.written.extend(written);
                    report.projection_fallbacks += fallbacks;
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Cubemap conversion failed");
                    report.failures.push((path.clone(), e.to_string()));
                }
            }
        }

        info!(input = %input_dir.display(), %report, "Cubemap batch complete");
        Ok(report)
    }

    /// Reassembles every face set in `input_dir` into an equirectangular
    /// image.
    pub fn folder_to_equirects<F>(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        progress: F,
    ) -> Result<BatchReport, BatchError>
    where
        F: Fn(usize, usize, &Path),
    {
        let images = list_images(input_dir)?;
        let stems: BTreeSet<String> = images
            .iter()
            .filter_map(|p| split_face_name(p).map(|(stem, _)| stem))
            .collect();
        ensure_dir(output_dir)?;

        let mut report = BatchReport {
            total: stems.len(),
            ..BatchReport::default()
        };
        for (index, stem) in stems.iter().enumerate() {
            let label = input_dir.join(stem);
            progress(index, stems.len(), &label);
            match self.face_set_to_equirect(input_dir, stem, output_dir) {
                Ok((written, fallbacks)) => {
                    report.written.push(written);
                    report.projection_fallbacks += fallbacks;
                }
                Err(e) => {
                    warn!(stem = %stem, error = %e, "Equirect reassembly failed");
                    report.failures.push((label, e.to_string()));
                }
            }
        }

        info!(input = %input_dir.display(), %report, "Equirect batch complete");
        Ok(report)
    }

    fn image_to_cubemap(&self, path: &Path, output_dir: &Path) -> Result<(Vec<PathBuf>, usize), BatchError> {
        let equirect = raster::open_rgb(path).map_err(|source| BatchError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let projected = self.converter.to_cubemap(&equirect, self.face_size);
        let stem = file_stem(path);
        let written = save_cubemap(&projected.cubemap, output_dir, &stem, self.jpeg_quality)?;
        debug!(file = %path.display(), faces = written.len(), "Cubemap written");
        Ok((written, projected.report.projection_fallbacks))
    }

    fn face_set_to_equirect(
        &self,
        input_dir: &Path,
        stem: &str,
        output_dir: &Path,
    ) -> Result<(PathBuf, usize), BatchError> {
        let cubemap = load_cubemap(input_dir, stem)?;
        if cubemap.len() < MIN_FACES_FOR_REASSEMBLY {
            return Err(BatchError::IncompleteFaceSet(stem.to_string()));
        }
        let (width, height) = self.equirect_size;
        let projected = self.converter.to_equirect(&cubemap, width, height);
        let out = output_dir.join(format!("{}_equirect.jpg", stem));
        save(&projected.raster, &out, self.jpeg_quality)?;
        Ok((out, projected.report.projection_fallbacks))
    }
}

/// File name of one face: `{stem}_{face}.jpg`.
pub fn face_file_name(stem: &str, face: CubeFace) -> String {
    format!("{}_{}.jpg", stem, face.name())
}

/// Writes all faces of `cubemap` to `dir`, returning the written paths.
pub fn save_cubemap(cubemap: &Cubemap, dir: &Path, stem: &str, quality: u8) -> Result<Vec<PathBuf>, BatchError> {
    ensure_dir(dir)?;
    cubemap
        .iter()
        .map(|(face, raster)| {
            let path = dir.join(face_file_name(stem, face));
            save(raster, &path, quality).map(|_| path)
        })
        .collect()
}

/// Loads the faces of `stem` found in `dir`.
///
/// For each face the first existing `{stem}_{face}.{jpg,jpeg,png}` is used;
/// missing faces are left out of the cubemap.
pub fn load_cubemap(dir: &Path, stem: &str) -> Result<Cubemap, BatchError> {
    let mut cubemap = Cubemap::new();
    for face in CubeFace::ALL {
        let found = IMAGE_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{}_{}.{}", stem, face.name(), ext)))
            .find(|p| p.is_file());
        if let Some(path) = found {
            let raster = raster::open_rgb(&path).map_err(|source| BatchError::Image {
                path: path.clone(),
                source,
            })?;
            cubemap.insert(face, raster);
        }
    }
    if cubemap.is_empty() {
        return Err(BatchError::IncompleteFaceSet(stem.to_string()));
    }
    Ok(cubemap)
}

fn save(raster: &Raster, path: &Path, quality: u8) -> Result<(), BatchError> {
    raster::save_jpeg(raster, path, quality).map_err(|source| BatchError::Image {
        path: path.to_path_buf(),
        source,
    })
}

fn ensure_dir(dir: &Path) -> Result<(), BatchError> {
    fs::create_dir_all(dir).map_err(|source| BatchError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "panorama".to_string())
}

/// Splits `pano_front.jpg` into `("pano", Front)`.
fn split_face_name(path: &Path) -> Option<(String, CubeFace)> {
    let stem = path.file_stem()?.to_str()?;
    let (base, face) = stem.rsplit_once('_')?;
    let face = CubeFace::from_str(face).ok()?;
    (!base.is_empty() && face.name() == stem[base.len() + 1..].to_lowercase())
        .then(|| (base.to_string(), face))
}

/// Image files directly inside `dir`, sorted by path.
fn list_images(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    if !dir.is_dir() {
        return Err(BatchError::NotADirectory(dir.to_path_buf()));
    }
    let entries = fs::read_dir(dir).map_err(|source| BatchError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut images: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_image(p))
        .collect();
    images.sort();
    Ok(images)
}
