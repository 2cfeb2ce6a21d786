//! Cube face identifiers.

use std::fmt;
use std::str::FromStr;

/// One face of a cubemap.
///
/// Faces are named from the viewer's position at the panorama center, with
/// `front` looking at the middle column of the equirectangular image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CubeFace {
    /// +X, equirectangular center
    Front = 0,
    /// +Z, 90° to the right of front
    Right = 1,
    /// -X, across the 180° wrap seam
    Back = 2,
    /// -Z, 90° to the left of front
    Left = 3,
    /// +Y, zenith
    Up = 4,
    /// -Y, nadir
    Down = 5,
}

impl CubeFace {
    /// All six faces in index order.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::Front,
        CubeFace::Right,
        CubeFace::Back,
        CubeFace::Left,
        CubeFace::Up,
        CubeFace::Down,
    ];

    /// Returns the face index (0-5).
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Creates a face from an index (0-5).
    pub const fn from_index(index: usize) -> Option<CubeFace> {
        match index {
            0 => Some(CubeFace::Front),
            1 => Some(CubeFace::Right),
            2 => Some(CubeFace::Back),
            3 => Some(CubeFace::Left),
            4 => Some(CubeFace::Up),
            5 => Some(CubeFace::Down),
            _ => None,
        }
    }

    /// Lowercase name used in file names (`pano_front.jpg`).
    pub const fn name(self) -> &'static str {
        match self {
            CubeFace::Front => "front",
            CubeFace::Right => "right",
            CubeFace::Back => "back",
            CubeFace::Left => "left",
            CubeFace::Up => "up",
            CubeFace::Down => "down",
        }
    }

    /// True for the four faces around the horizon.
    pub const fn is_horizontal(self) -> bool {
        !matches!(self, CubeFace::Up | CubeFace::Down)
    }
}

impl fmt::Display for CubeFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CubeFace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "front" => Ok(CubeFace::Front),
            "right" => Ok(CubeFace::Right),
            "back" => Ok(CubeFace::Back),
            "left" => Ok(CubeFace::Left),
            "up" | "top" => Ok(CubeFace::Up),
            "down" | "bottom" => Ok(CubeFace::Down),
            _ => Err(format!("unknown cube face '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        for face in CubeFace::ALL {
            assert_eq!(CubeFace::from_index(face.index()), Some(face));
        }
        assert_eq!(CubeFace::from_index(6), None);
    }

    #[test]
    fn test_name_parse_roundtrip() {
        for face in CubeFace::ALL {
            assert_eq!(face.name().parse::<CubeFace>().unwrap(), face);
        }
        assert_eq!("top".parse::<CubeFace>().unwrap(), CubeFace::Up);
        assert!("side".parse::<CubeFace>().is_err());
    }

    #[test]
    fn test_horizontal_faces() {
        let horizontal = CubeFace::ALL.iter().filter(|f| f.is_horizontal()).count();
        assert_eq!(horizontal, 4);
    }
}
