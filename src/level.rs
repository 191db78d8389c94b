use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use macroquad::logging::{error, warn};
use macroquad::prelude::*;

use crate::collision::CollisionGrid;
use crate::decoder::builder::decode_document;
use crate::error::MapError;
use crate::scene::{Scene, Sprite, SpriteRef};

/// One pre-rendered image plane of a level, drawn in decode order.
pub struct Layer {
    /// Image filename as written in the level document
    pub filename: String,
    /// Draw priority: the layer's position in the document's `layers` array
    pub z_index: i32,
    /// Decoded image, or `None` when loading failed (logged at decode time)
    pub image: Option<Texture2D>,
    sprite: Option<SpriteRef>,
}

impl Layer {
    /// A layer that has not been projected onto a scene yet.
    pub fn new(filename: String, z_index: i32, image: Option<Texture2D>) -> Self {
        Layer {
            filename,
            z_index,
            image,
            sprite: None,
        }
    }
}

/// One placed entity instance.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Entity definition identifier
    pub id: String,
    /// Unique instance id
    pub iid: String,
    /// Name of the layer the entity was placed on
    pub layer: String,
    /// World x position in pixels
    pub x: i32,
    /// World y position in pixels
    pub y: i32,
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

/// All entities of one type, named by their key in the document's `entities`
/// object.
#[derive(Default, Debug, Clone)]
pub struct EntityGroup {
    /// Group type name
    pub kind: String,
    /// Instances in decode order
    pub entities: Vec<Entity>,
}

/// Link to an adjacent level. Read-only metadata; nothing is resolved until
/// the game decides to load the neighbour.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct NeighborRef {
    /// The neighbouring level's unique id
    pub level_iid: String,
    /// Relative direction tag as exported (`n`, `e`, `s`, `w`, ...)
    pub dir: String,
}

/// The in-memory model of one exported level.
pub struct Level {
    /// Human-readable identifier
    pub id: String,
    /// Stable unique id
    pub iid: String,
    /// World x offset in pixels
    pub world_x: i32,
    /// World y offset in pixels
    pub world_y: i32,
    /// Pixel width
    pub width: i32,
    /// Pixel height
    pub height: i32,
    /// Size of one tile in pixels
    pub tile_size: i32,
    /// `width / tile_size`, fixed once the document has decoded
    pub grid_width: i32,
    /// `height / tile_size`, fixed once the document has decoded
    pub grid_height: i32,
    /// Image planes in draw order
    pub layers: Vec<Layer>,
    /// Links to adjacent levels
    pub neighbor_levels: Vec<NeighborRef>,
    /// Entity groups in document key order
    pub entities: Vec<EntityGroup>,
    /// Collision grids, one per requested collision layer
    pub collision: Vec<CollisionGrid>,
    /// Invoked by the manager when this level becomes current
    pub on_enter: Option<Box<dyn FnMut()>>,
    /// Invoked by the manager when another level takes over
    pub on_exit: Option<Box<dyn FnMut()>>,
    path: PathBuf,
}

impl std::fmt::Debug for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Level")
            .field("id", &self.id)
            .field("iid", &self.iid)
            .field("world_x", &self.world_x)
            .field("world_y", &self.world_y)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("tile_size", &self.tile_size)
            .field("grid_width", &self.grid_width)
            .field("grid_height", &self.grid_height)
            .field("neighbor_levels", &self.neighbor_levels)
            .field("entities", &self.entities)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::with_source(PathBuf::new(), 1)
    }
}

impl Level {
    /// An empty level rooted at `path`. [`Level::load`] starts here; tests
    /// and tools can too.
    pub fn with_source(path: PathBuf, tile_size: i32) -> Self {
        Level {
            id: String::new(),
            iid: String::new(),
            world_x: 0,
            world_y: 0,
            width: 0,
            height: 0,
            tile_size,
            grid_width: 0,
            grid_height: 0,
            layers: Vec::new(),
            neighbor_levels: Vec::new(),
            entities: Vec::new(),
            collision: Vec::new(),
            on_enter: None,
            on_exit: None,
            path,
        }
    }

    /// Load a level from an LDtk simple-export directory.
    ///
    /// `path` is the export directory containing `data.json` and the level's
    /// images; `collision_layers` names the csv flag files to rasterize
    /// (empty names are skipped). A missing document or a missing requested
    /// collision file fails the whole load; a malformed document is logged
    /// and produces a partially populated level.
    pub fn load(path: &str, tile_size: i32, collision_layers: &[&str]) -> Result<Level, MapError> {
        if tile_size <= 0 {
            return Err(MapError::InvalidTileSize(tile_size));
        }

        let dir = PathBuf::from(path.trim_end_matches('/'));
        let data_path = dir.join("data.json");
        let text = fs::read_to_string(&data_path).map_err(|source| MapError::Io {
            path: data_path.clone(),
            source,
        })?;

        let mut level = Level::with_source(dir, tile_size);
        // decode errors are not fatal; the level keeps whatever decoded
        if let Err(err) = decode_document(&text, &data_path, &mut level) {
            error!("{}", err);
        }

        // grid dimensions must be final before any collision file is read
        level.grid_width = level.width / level.tile_size;
        level.grid_height = level.height / level.tile_size;

        for name in collision_layers {
            if name.is_empty() {
                continue;
            }
            if level.grid(name).is_some() {
                warn!("Collision layer '{}' requested twice, skipping", name);
                continue;
            }

            let csv_path = level.path.join(format!("{name}.csv"));
            let raw = fs::read_to_string(&csv_path).map_err(|source| MapError::Io {
                path: csv_path.clone(),
                source,
            })?;

            let grid = CollisionGrid::parse(
                name,
                &raw,
                level.grid_width as usize,
                level.grid_height as usize,
                level.tile_size,
            )?;
            level.collision.push(grid);
        }

        Ok(level)
    }

    /// The export directory this level was loaded from.
    pub fn source_dir(&self) -> &Path {
        &self.path
    }

    /// Look up a collision grid by its layer name.
    pub fn grid(&self, name: &str) -> Option<&CollisionGrid> {
        self.collision.iter().find(|g| g.name == name)
    }

    /// Assign `tag` to every collision volume of the named grid, for
    /// collision-response dispatch. No-op when the grid is absent or empty.
    pub fn tag_collision(&self, name: &str, tag: u8) {
        let Some(grid) = self.grid(name) else {
            return;
        };
        for volume in grid.volumes() {
            volume.borrow_mut().tag = tag;
        }
    }

    /// Put every layer sprite and collision volume onto the scene.
    ///
    /// Layer sprites are created the first time the level is projected and
    /// reused afterwards, so an inactive level keeps its screen state for
    /// fast re-entry.
    pub fn project(&mut self, scene: &mut Scene) {
        let (x, y) = (self.world_x as f32, self.world_y as f32);
        let (w, h) = (self.width as f32, self.height as f32);

        for layer in &mut self.layers {
            let sprite = layer.sprite.get_or_insert_with(|| {
                Rc::new(RefCell::new(Sprite {
                    texture: layer.image.clone(),
                    x,
                    y,
                    width: w,
                    height: h,
                    z_index: layer.z_index,
                    ..Sprite::new()
                }))
            });
            scene.project(sprite);
        }

        for grid in &self.collision {
            for volume in grid.volumes() {
                scene.project(volume);
            }
        }
    }

    /// Take every layer sprite and collision volume off the scene.
    pub fn withdraw(&self, scene: &mut Scene) {
        for layer in &self.layers {
            if let Some(sprite) = &layer.sprite {
                scene.withdraw(sprite);
            }
        }

        for grid in &self.collision {
            for volume in grid.volumes() {
                scene.withdraw(volume);
            }
        }
    }

    /// Immediate-mode draw of the layer images in z order, bypassing any
    /// scene. Useful for tools and quick previews.
    pub fn draw(&self) {
        for layer in &self.layers {
            if let Some(texture) = &layer.image {
                draw_texture_ex(
                    texture,
                    self.world_x as f32,
                    self.world_y as f32,
                    WHITE,
                    DrawTextureParams {
                        dest_size: Some(vec2(self.width as f32, self.height as f32)),
                        ..Default::default()
                    },
                );
            }
        }
    }
}

pub(crate) fn load_layer_image(path: &Path) -> Result<Texture2D, MapError> {
    let bytes = fs::read(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Texture2D::from_file_with_format(&bytes, None))
}
