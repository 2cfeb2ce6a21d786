//! Canvas geometry for overlap expansion.

use std::fmt;
use std::str::FromStr;

/// Largest accepted overlap percentage.
pub const MAX_OVERLAP_PERCENT: u32 = 50;

/// How border sizes are derived from the overlap percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapLayout {
    /// Equal borders on opposite sides, sized so a 2:1 input stays 2:1.
    #[default]
    Symmetric,
    /// Widen by `p%` and heighten by `p/2 %` overall, base offset by half of
    /// each. Right and bottom borders absorb rounding.
    Legacy,
}

impl OverlapLayout {
    pub fn as_str(self) -> &'static str {
        match self {
            OverlapLayout::Symmetric => "symmetric",
            OverlapLayout::Legacy => "legacy",
        }
    }

    /// Computes the expanded canvas for a `width × height` base.
    ///
    /// `percent` is clamped to `[0, 50]`.
    pub fn geometry(self, width: u32, height: u32, percent: u32) -> OverlapGeometry {
        let p = clamp_percent(percent);
        if p == 0 || width == 0 || height == 0 {
            return OverlapGeometry::identity(width, height);
        }

        let (w, h, pf) = (f64::from(width), f64::from(height), f64::from(p));
        match self {
            OverlapLayout::Symmetric => {
                let bh = height * p / 200;
                let bw = (f64::from(bh) * w / h).round() as u32;
                OverlapGeometry {
                    canvas_width: width + 2 * bw,
                    canvas_height: height + 2 * bh,
                    left: bw,
                    right: bw,
                    top: bh,
                    bottom: bh,
                }
            }
            OverlapLayout::Legacy => {
                let canvas_width = (w * (1.0 + pf / 100.0)).round() as u32;
                let canvas_height = (h * (1.0 + pf / 200.0)).round() as u32;
                let left = width * p / 200;
                let top = height * p / 400;
                OverlapGeometry {
                    canvas_width,
                    canvas_height,
                    left,
                    right: canvas_width - width - left,
                    top,
                    bottom: canvas_height - height - top,
                }
            }
        }
    }
}

impl fmt::Display for OverlapLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverlapLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "symmetric" => Ok(OverlapLayout::Symmetric),
            "legacy" => Ok(OverlapLayout::Legacy),
            _ => Err(format!("unknown overlap layout '{}'", s)),
        }
    }
}

/// Clamps an overlap percentage into the accepted range.
pub fn clamp_percent(percent: u32) -> u32 {
    percent.min(MAX_OVERLAP_PERCENT)
}

/// Border sizes of an expanded canvas.
///
/// The base sits at `(left, top)`; the canvas is
/// `left + base + right` wide and `top + base + bottom` tall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapGeometry {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl OverlapGeometry {
    fn identity(width: u32, height: u32) -> Self {
        Self {
            canvas_width: width,
            canvas_height: height,
            left: 0,
            right: 0,
            top: 0,
            bottom: 0,
        }
    }

    pub fn base_offset(&self) -> (u32, u32) {
        (self.left, self.top)
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.canvas_width, self.canvas_height)
    }

    pub fn is_identity(&self) -> bool {
        self.left == 0 && self.right == 0 && self.top == 0 && self.bottom == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_matches_reference_scenario() {
        let g = OverlapLayout::Legacy.geometry(1024, 512, 30);
        assert_eq!(g.canvas_size(), (1331, 589));
        assert_eq!(g.base_offset(), (153, 38));
        assert_eq!(g.left + g.right, 307);
        assert_eq!(g.top + g.bottom, 77);
    }

    #[test]
    fn test_symmetric_preserves_aspect() {
        for p in 1..=50 {
            let g = OverlapLayout::Symmetric.geometry(1024, 512, p);
            assert_eq!(g.canvas_width, 2 * g.canvas_height, "p = {p}");
            assert_eq!(g.left, g.right);
            assert_eq!(g.top, g.bottom);
        }
        let g = OverlapLayout::Symmetric.geometry(1024, 512, 30);
        assert_eq!((g.left, g.top), (152, 76));
    }

    #[test]
    fn test_zero_percent_is_identity() {
        for layout in [OverlapLayout::Symmetric, OverlapLayout::Legacy] {
            let g = layout.geometry(640, 320, 0);
            assert!(g.is_identity());
            assert_eq!(g.canvas_size(), (640, 320));
        }
    }

    #[test]
    fn test_percent_is_clamped() {
        let over = OverlapLayout::Symmetric.geometry(1024, 512, 90);
        let max = OverlapLayout::Symmetric.geometry(1024, 512, 50);
        assert_eq!(over, max);
        assert_eq!(clamp_percent(75), 50);
    }

    #[test]
    fn test_layout_parse() {
        assert_eq!("Legacy".parse::<OverlapLayout>().unwrap(), OverlapLayout::Legacy);
        assert_eq!(OverlapLayout::default(), OverlapLayout::Symmetric);
        assert!("wide".parse::<OverlapLayout>().is_err());
    }
}
