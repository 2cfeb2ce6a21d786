//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::defaults::{clamp_parallel_downloads, MAX_ATTEMPTS_LIMIT, MAX_OVERLAP_PERCENT};
use super::file::ConfigFileError;
use super::settings::ConfigFile;

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [download] section
    if let Some(section) = ini.section(Some("download")) {
        if let Some(v) = section.get("timeout") {
            config.download.timeout = parse_timeout(v)?;
        }
        if let Some(v) = section.get("max_attempts") {
            config.download.max_attempts = parse_max_attempts(v)?;
        }
        if let Some(v) = section.get("retry_delay_ms") {
            config.download.retry_delay_ms = v.trim().parse().map_err(|_| {
                invalid(
                    "download",
                    "retry_delay_ms",
                    v,
                    "must be a non-negative integer (milliseconds)",
                )
            })?;
        }
        if let Some(v) = section.get("parallel") {
            let parallel: usize = v.trim().parse().map_err(|_| {
                invalid("download", "parallel", v, "must be a positive integer")
            })?;
            config.download.parallel = clamp_parallel_downloads(parallel);
        }
        if let Some(v) = section.get("tile_url") {
            let v = v.trim();
            if !v.is_empty() {
                config.download.tile_url = parse_url("download", "tile_url", v)?;
            }
        }
        if let Some(v) = section.get("metadata_url") {
            let v = v.trim();
            config.download.metadata_url = if v.is_empty() {
                None
            } else {
                Some(parse_url("download", "metadata_url", v)?)
            };
        }
    }

    // [cubemap] section
    if let Some(section) = ini.section(Some("cubemap")) {
        if let Some(v) = section.get("face_size") {
            config.cubemap.face_size = v.trim().parse().map_err(|_| {
                invalid(
                    "cubemap",
                    "face_size",
                    v,
                    "must be a non-negative integer (0 = half the source height)",
                )
            })?;
        }
    }

    // [overlap] section
    if let Some(section) = ini.section(Some("overlap")) {
        if let Some(v) = section.get("percent") {
            config.overlap.percent = parse_overlap_percent(v)?;
        }
        if let Some(v) = section.get("layout") {
            config.overlap.layout = v
                .parse()
                .map_err(|_| invalid("overlap", "layout", v, "must be 'symmetric' or 'legacy'"))?;
        }
        if let Some(v) = section.get("neighbors") {
            config.overlap.neighbors = v.parse().map_err(|_| {
                invalid(
                    "overlap",
                    "neighbors",
                    v,
                    "must be one of: none, shift, metadata",
                )
            })?;
        }
        if let Some(v) = section.get("alignment") {
            config.overlap.alignment = parse_bool(v);
        }
    }

    // [output] section
    if let Some(section) = ini.section(Some("output")) {
        if let Some(v) = section.get("jpeg_quality") {
            config.output.jpeg_quality = parse_jpeg_quality(v)?;
        }
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            config.output.directory = if v.is_empty() {
                None
            } else {
                Some(expand_tilde(v))
            };
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

pub(super) fn parse_timeout(v: &str) -> Result<u64, ConfigFileError> {
    match v.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(invalid(
            "download",
            "timeout",
            v,
            "must be a positive integer (seconds)",
        )),
    }
}

pub(super) fn parse_max_attempts(v: &str) -> Result<u32, ConfigFileError> {
    match v.trim().parse::<u32>() {
        Ok(n) if (1..=MAX_ATTEMPTS_LIMIT).contains(&n) => Ok(n),
        _ => Err(invalid(
            "download",
            "max_attempts",
            v,
            "must be an integer between 1 and 10",
        )),
    }
}

pub(super) fn parse_overlap_percent(v: &str) -> Result<u32, ConfigFileError> {
    match v.trim().parse::<u32>() {
        Ok(p) if p <= MAX_OVERLAP_PERCENT => Ok(p),
        _ => Err(invalid(
            "overlap",
            "percent",
            v,
            "must be an integer between 0 and 50",
        )),
    }
}

pub(super) fn parse_jpeg_quality(v: &str) -> Result<u8, ConfigFileError> {
    match v.trim().parse::<u8>() {
        Ok(q) if (1..=100).contains(&q) => Ok(q),
        _ => Err(invalid(
            "output",
            "jpeg_quality",
            v,
            "must be an integer between 1 and 100",
        )),
    }
}

pub(super) fn parse_url(section: &str, key: &str, v: &str) -> Result<String, ConfigFileError> {
    if v.starts_with("http://") || v.starts_with("https://") {
        Ok(v.to_string())
    } else {
        Err(invalid(section, key, v, "must start with http:// or https://"))
    }
}

/// Parse a boolean value from config.
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
