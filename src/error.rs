use std::path::PathBuf;
use std::{error, fmt, io};

/// Error type for level loading.
#[derive(Debug)]
pub enum MapError {
    /// The level document or a collision flag file could not be opened or read
    Io {
        /// Path of the file that failed
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
    /// The level document is not valid JSON
    Json {
        /// Path of the document that failed
        path: PathBuf,
        /// Underlying parse error
        source: serde_json::Error,
    },
    /// Tile size must be a positive number of pixels
    InvalidTileSize(i32),
    /// A collision flag file ended before `grid_width * grid_height` flags
    CollisionTooShort {
        /// Collision layer name
        layer: String,
        /// Flags required by the level's grid dimensions
        expected: usize,
        /// Flags actually present
        found: usize,
    },
    /// A collision flag file contained something other than a digit or separator
    BadCollisionFlag {
        /// Collision layer name
        layer: String,
        /// The offending character
        found: char,
        /// Offset into the stripped flag data
        offset: usize,
    },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Io { path, source } => {
                write!(f, "I/O error reading {}: {}", path.display(), source)
            }
            MapError::Json { path, source } => {
                write!(f, "Failed to parse {}: {}", path.display(), source)
            }
            MapError::InvalidTileSize(size) => write!(f, "Invalid tile size: {}", size),
            MapError::CollisionTooShort {
                layer,
                expected,
                found,
            } => write!(
                f,
                "Collision layer '{}' has {} flags, grid needs {}",
                layer, found, expected
            ),
            MapError::BadCollisionFlag {
                layer,
                found,
                offset,
            } => write!(
                f,
                "Collision layer '{}' has unexpected character '{}' at offset {}",
                layer, found, offset
            ),
        }
    }
}

impl error::Error for MapError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            MapError::Io { source, .. } => Some(source),
            MapError::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}
