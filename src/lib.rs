#![warn(missing_docs)]

//! LDtk simple-export level loader, collision builder & level manager for Macroquad.
//!
//! Point [`Level::load`] at an LDtk "super simple export" directory and it
//! decodes `data.json` into a [`Level`], loads the pre-rendered layer images,
//! and rasterizes any requested collision csv files into per-tile collision
//! volumes. A [`LevelManager`] keeps track of which level is live and moves
//! layer sprites and collision volumes on and off a [`Scene`] as the game
//! switches between levels.

mod collision;
mod decoder {
    pub mod builder;
    pub mod scope;
}
mod error;
mod level;
mod manager;
mod scene;

pub use collision::CollisionGrid;
pub use decoder::scope::{
    DecodeEvent, Descend, DocumentEvents, ScopeHandler, ScopeKind, ScopeMachine, Slot,
};
pub use error::MapError;
pub use level::{Entity, EntityGroup, Layer, Level, NeighborRef};
pub use manager::{LevelId, LevelManager};
pub use scene::{Scene, Sprite, SpriteRef};
