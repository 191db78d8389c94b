//! Scope handlers that assemble a [`Level`] from decode events.
//!
//! The document has a fixed shape: scalar level fields at the root, a
//! `layers` array of image filenames, a `neighbourLevels` array of reference
//! objects, and an `entities` object mapping group names to entity arrays.
//! Each region gets its own handler, installed on entry and popped on exit.

use std::path::Path;

use macroquad::logging::error;
use serde_json::Value;

use crate::decoder::scope::{
    Descend, DocumentEvents, ScopeHandler, ScopeKind, ScopeMachine, Slot,
};
use crate::error::MapError;
use crate::level::{load_layer_image, Entity, EntityGroup, Layer, Level, NeighborRef};

/// Decode a level document into `level`, best-effort.
///
/// Whatever decoded before an error stays on the level; the caller decides
/// whether a partially populated result is usable or the error is fatal.
pub(crate) fn decode_document(text: &str, path: &Path, level: &mut Level) -> Result<(), MapError> {
    let doc: Value = serde_json::from_str(text).map_err(|source| MapError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let mut machine: ScopeMachine<Level> = ScopeMachine::new(Box::new(RootHandler));
    machine.run(DocumentEvents::new(&doc), level);
    Ok(())
}

fn int_value(value: &Value) -> i32 {
    match value.as_i64() {
        Some(n) => n as i32,
        None => value.as_f64().map(|f| f as i32).unwrap_or(0),
    }
}

struct RootHandler;

impl ScopeHandler<Level> for RootHandler {
    fn should_decode_key(&mut self, _level: &mut Level, key: &str) -> bool {
        key != "bgColor" && key != "customFields"
    }

    fn key_value(&mut self, level: &mut Level, key: &str, value: &Value) {
        match key {
            "identifier" => {
                if let Some(id) = value.as_str() {
                    level.id = id.to_owned();
                }
            }
            // LDtk writes this key with the typo
            "uniqueIdentifer" => {
                if let Some(iid) = value.as_str() {
                    level.iid = iid.to_owned();
                }
            }
            "x" => level.world_x = int_value(value),
            "y" => level.world_y = int_value(value),
            "width" => level.width = int_value(value),
            "height" => level.height = int_value(value),
            _ => {}
        }
    }

    fn enter_scope(&mut self, _level: &mut Level, slot: Slot<'_>, kind: ScopeKind) -> Descend<Level> {
        match (slot, kind) {
            (Slot::Key("layers"), ScopeKind::Array) => Descend::Child(Box::new(LayersHandler)),
            (Slot::Key("neighbourLevels"), ScopeKind::Array) => {
                Descend::Child(Box::new(NeighborListHandler))
            }
            (Slot::Key("entities"), ScopeKind::Object) => {
                Descend::Child(Box::new(EntityGroupsHandler))
            }
            _ => Descend::Stay,
        }
    }
}

/// Elements of the `layers` array: pre-rendered image filenames, in draw order.
struct LayersHandler;

impl ScopeHandler<Level> for LayersHandler {
    fn index_value(&mut self, level: &mut Level, index: usize, value: &Value) {
        let Some(filename) = value.as_str() else {
            return;
        };

        let image_path = level.source_dir().join(filename);
        let image = match load_layer_image(&image_path) {
            Ok(texture) => Some(texture),
            Err(err) => {
                // keep the layer so decode order stays aligned with z order
                error!("Layer image could not be loaded: {}", err);
                None
            }
        };

        level
            .layers
            .push(Layer::new(filename.to_owned(), index as i32, image));
    }

    fn enter_scope(&mut self, _level: &mut Level, _slot: Slot<'_>, _kind: ScopeKind) -> Descend<Level> {
        // layer entries are plain filename strings
        Descend::Skip
    }
}

/// Elements of the `neighbourLevels` array.
struct NeighborListHandler;

impl ScopeHandler<Level> for NeighborListHandler {
    fn enter_scope(&mut self, level: &mut Level, slot: Slot<'_>, kind: ScopeKind) -> Descend<Level> {
        match (slot, kind) {
            (Slot::Index(_), ScopeKind::Object) => {
                level.neighbor_levels.push(NeighborRef::default());
                Descend::Stay
            }
            _ => Descend::Skip,
        }
    }

    fn key_value(&mut self, level: &mut Level, key: &str, value: &Value) {
        let Some(neighbor) = level.neighbor_levels.last_mut() else {
            return;
        };
        let Some(text) = value.as_str() else {
            return;
        };

        match key {
            "levelIid" => neighbor.level_iid = text.to_owned(),
            "dir" => neighbor.dir = text.to_owned(),
            _ => {}
        }
    }
}

/// The `entities` object: each key is a group type name, each value an array
/// of entity objects.
struct EntityGroupsHandler;

impl ScopeHandler<Level> for EntityGroupsHandler {
    fn enter_scope(&mut self, level: &mut Level, slot: Slot<'_>, kind: ScopeKind) -> Descend<Level> {
        match (slot, kind) {
            (Slot::Key(name), ScopeKind::Array) => {
                level.entities.push(EntityGroup {
                    kind: name.to_owned(),
                    entities: Vec::new(),
                });
                Descend::Child(Box::new(EntityListHandler))
            }
            _ => Descend::Skip,
        }
    }
}

/// One group's entity array.
struct EntityListHandler;

impl ScopeHandler<Level> for EntityListHandler {
    fn enter_scope(&mut self, level: &mut Level, slot: Slot<'_>, kind: ScopeKind) -> Descend<Level> {
        match (slot, kind) {
            (Slot::Index(_), ScopeKind::Object) => match level.entities.last_mut() {
                Some(group) => {
                    group.entities.push(Entity::default());
                    Descend::Stay
                }
                None => Descend::Skip,
            },
            _ => Descend::Skip,
        }
    }

    fn should_decode_key(&mut self, _level: &mut Level, key: &str) -> bool {
        key != "customFields"
    }

    fn key_value(&mut self, level: &mut Level, key: &str, value: &Value) {
        let Some(entity) = level
            .entities
            .last_mut()
            .and_then(|group| group.entities.last_mut())
        else {
            return;
        };

        match key {
            "id" => {
                if let Some(id) = value.as_str() {
                    entity.id = id.to_owned();
                }
            }
            "iid" => {
                if let Some(iid) = value.as_str() {
                    entity.iid = iid.to_owned();
                }
            }
            "layer" => {
                if let Some(layer) = value.as_str() {
                    entity.layer = layer.to_owned();
                }
            }
            "x" => entity.x = int_value(value),
            "y" => entity.y = int_value(value),
            "width" => entity.width = int_value(value),
            "height" => entity.height = int_value(value),
            _ => {}
        }
    }
}
