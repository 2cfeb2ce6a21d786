//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let metadata_url = config.download.metadata_url.as_deref().unwrap_or("");
    let output_directory = config
        .output
        .directory
        .as_ref()
        .map(|p| path_to_string(p))
        .unwrap_or_default();

    format!(
        r#"[download]
; Per-attempt timeout in seconds for a single tile request (default: 10)
timeout = {}
; Attempts per tile before a gray placeholder is used (1-10, default: 3)
max_attempts = {}
; Fixed pause between attempts of the same tile, in milliseconds (default: 1000)
retry_delay_ms = {}
; Tile requests in flight at once (1-64, default: 8)
parallel = {}
; Tile endpoint. Tile parameters (panoid, x, y, zoom) are appended.
tile_url = {}
; Metadata endpoint used to find neighboring panoramas. {{panoid}} is replaced
; by the panorama ID. Leave empty to disable metadata neighbors.
metadata_url = {}

[cubemap]
; Cube face edge length in pixels. 0 uses half the source height.
face_size = {}

[overlap]
; Border expansion in percent (0-50). 0 disables expansion.
percent = {}
; Canvas layout:
;   symmetric - equal borders on every side, keeps 2:1 exactly
;   legacy    - canvas grows by percent/100 x percent/200, borders split unevenly
layout = {}
; Neighbor source for the left/right borders:
;   none     - wrap-around fill only
;   shift    - synthesize neighbors by shifting the panorama itself
;   metadata - fetch linked panoramas from metadata_url
neighbors = {}
; Feature-align neighbor strips before feathering (true/false)
alignment = {}

[output]
; JPEG quality for written images (1-100, default: 95)
jpeg_quality = {}
; Default output directory. Empty uses the current directory.
directory = {}

[logging]
; Log file location
file = {}
"#,
        config.download.timeout,
        config.download.max_attempts,
        config.download.retry_delay_ms,
        config.download.parallel,
        config.download.tile_url,
        metadata_url,
        config.cubemap.face_size,
        config.overlap.percent,
        config.overlap.layout.as_str(),
        config.overlap.neighbors.as_str(),
        config.overlap.alignment,
        config.output.jpeg_quality,
        output_directory,
        path_to_string(&config.logging.file),
    )
}

/// Renders a path with the home directory collapsed to `~`.
pub(super) fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_string_has_all_sections() {
        let content = to_config_string(&ConfigFile::default());
        for section in ["[download]", "[cubemap]", "[overlap]", "[output]", "[logging]"] {
            assert!(content.contains(section), "missing {section}");
        }
        assert!(content.contains("timeout = 10"));
        assert!(content.contains("layout = symmetric"));
        assert!(content.contains("{panoid}"));
    }

    #[test]
    fn test_written_string_parses_back() {
        let mut config = ConfigFile::default();
        config.overlap.percent = 40;
        let ini = ini::Ini::load_from_str(&to_config_string(&config)).unwrap();
        let parsed = super::super::parser::parse_ini(&ini).unwrap();
        assert_eq!(parsed.overlap.percent, 40);
        assert_eq!(parsed.download.tile_url, config.download.tile_url);
    }
}
