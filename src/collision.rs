use std::cell::RefCell;
use std::rc::Rc;

use crate::error::MapError;
use crate::scene::{Sprite, SpriteRef};

/// A per-tile solid/empty flag grid plus the invisible collision volumes
/// derived from it.
///
/// Flags are stored row-major, one integer per cell. Only a flag of exactly 1
/// produces a volume; other values are kept raw so callers with multi-valued
/// terrain can re-scan [`CollisionGrid::flags`] themselves.
pub struct CollisionGrid {
    /// Name of the collision layer this grid was rasterized from
    pub name: String,
    /// Cells per row
    pub width: usize,
    /// Number of rows
    pub height: usize,
    flags: Vec<i32>,
    volumes: Vec<SpriteRef>,
}

impl std::fmt::Debug for CollisionGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionGrid")
            .field("name", &self.name)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

impl CollisionGrid {
    /// Rasterize raw flag-file contents into a grid.
    ///
    /// Strips line endings, then scans exactly `width * height` single-digit
    /// flags in row-major order, skipping `,` separators. Every solid cell
    /// (flag == 1) gets one invisible, collision-enabled volume of one tile
    /// at `(col * tile_size, row * tile_size)`. Input that runs out before
    /// the grid is full is an error; trailing characters are ignored.
    pub fn parse(
        name: &str,
        raw: &str,
        width: usize,
        height: usize,
        tile_size: i32,
    ) -> Result<CollisionGrid, MapError> {
        let mut data = raw.to_owned();
        data.retain(|c| c != '\n' && c != '\r');

        let expected = width * height;
        let mut flags = Vec::with_capacity(expected);
        let mut volumes = Vec::new();

        for (offset, c) in data.chars().enumerate() {
            if flags.len() == expected {
                break;
            }
            if c == ',' {
                continue;
            }

            let flag = match c.to_digit(10) {
                Some(d) => d as i32,
                None => {
                    return Err(MapError::BadCollisionFlag {
                        layer: name.to_owned(),
                        found: c,
                        offset,
                    })
                }
            };

            if flag == 1 {
                let col = flags.len() % width;
                let row = flags.len() / width;
                volumes.push(new_volume(col, row, tile_size));
            }

            flags.push(flag);
        }

        if flags.len() < expected {
            return Err(MapError::CollisionTooShort {
                layer: name.to_owned(),
                expected,
                found: flags.len(),
            });
        }

        Ok(CollisionGrid {
            name: name.to_owned(),
            width,
            height,
            flags,
            volumes,
        })
    }

    /// The raw flag value at `(col, row)`, or `None` outside the grid.
    pub fn flag(&self, col: usize, row: usize) -> Option<i32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        Some(self.flags[row * self.width + col])
    }

    /// The whole flag grid, row-major.
    pub fn flags(&self) -> &[i32] {
        &self.flags
    }

    /// The collision volumes, one per solid cell in row-major scan order.
    pub fn volumes(&self) -> &[SpriteRef] {
        &self.volumes
    }
}

fn new_volume(col: usize, row: usize, tile_size: i32) -> SpriteRef {
    Rc::new(RefCell::new(Sprite {
        x: (col as i32 * tile_size) as f32,
        y: (row as i32 * tile_size) as f32,
        width: tile_size as f32,
        height: tile_size as f32,
        visible: false,
        collisions_enabled: true,
        ..Sprite::new()
    }))
}
