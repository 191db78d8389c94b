use macroquad::logging::{error, info};

use crate::level::Level;
use crate::scene::Scene;

/// Stable, non-owning handle to a level registered with a [`LevelManager`].
///
/// Ids are never reused; a handle to a removed level simply stops resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LevelId(u64);

struct Registered {
    id: LevelId,
    level: Level,
}

/// Owns every loaded [`Level`] and tracks which one is live.
///
/// At most one level is current at a time, and the current level cannot be
/// removed. Changing levels withdraws the outgoing level's sprites and
/// collision volumes from the scene, projects the incoming level's, and fires
/// the respective exit/enter hooks.
#[derive(Default)]
pub struct LevelManager {
    levels: Vec<Registered>,
    next_id: u64,
    current: Option<LevelId>,
    previous: Option<LevelId>,
    default_level: Option<LevelId>,
}

impl LevelManager {
    /// An empty manager.
    pub fn new() -> Self {
        LevelManager::default()
    }

    /// Register a level and take ownership of it.
    ///
    /// Adding is idempotent: a level whose iid (or identifier, when it has no
    /// iid) is already registered is dropped and the existing handle is
    /// returned.
    pub fn add(&mut self, level: Level) -> LevelId {
        if let Some(existing) = self.find_registered(&level) {
            info!("Level '{}' is already registered, skipping", level.id);
            return existing;
        }

        let id = LevelId(self.next_id);
        self.next_id += 1;
        self.levels.push(Registered { id, level });
        id
    }

    /// Number of registered levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// True when no level is registered.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The level registered under `id`.
    pub fn level(&self, id: LevelId) -> Option<&Level> {
        self.levels.iter().find(|r| r.id == id).map(|r| &r.level)
    }

    /// Mutable access to the level registered under `id`.
    pub fn level_mut(&mut self, id: LevelId) -> Option<&mut Level> {
        self.levels
            .iter_mut()
            .find(|r| r.id == id)
            .map(|r| &mut r.level)
    }

    /// Find a level by identifier or iid.
    pub fn get(&self, name: &str) -> Option<&Level> {
        self.id_of(name).and_then(|id| self.level(id))
    }

    /// Find a level by identifier or iid, mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Level> {
        self.id_of(name).and_then(|id| self.level_mut(id))
    }

    /// The handle of the level named `name` (identifier or iid).
    pub fn id_of(&self, name: &str) -> Option<LevelId> {
        if name.is_empty() {
            return None;
        }
        self.levels
            .iter()
            .find(|r| r.level.id == name || r.level.iid == name)
            .map(|r| r.id)
    }

    /// The current level, if any.
    pub fn current(&self) -> Option<&Level> {
        self.current.and_then(|id| self.level(id))
    }

    /// Handle of the current level.
    pub fn current_id(&self) -> Option<LevelId> {
        self.current
    }

    /// Handle of the level that was current before the last change.
    pub fn previous_id(&self) -> Option<LevelId> {
        self.previous
    }

    /// Mark a registered level as the fallback for [`LevelManager::change_to_default`].
    pub fn set_default(&mut self, id: LevelId) {
        if self.level(id).is_none() {
            info!("Cannot set an unregistered level as default");
            return;
        }
        self.default_level = Some(id);
    }

    /// Unregister a level and hand it back to the caller.
    ///
    /// The current level is never removed; that case is logged and `None` is
    /// returned. Removing does not touch the scene, and a removed level's
    /// resources live on until the caller drops it.
    pub fn remove(&mut self, id: LevelId) -> Option<Level> {
        if self.current == Some(id) {
            info!("Cannot remove the current level; change away from it first");
            return None;
        }

        let pos = match self.levels.iter().position(|r| r.id == id) {
            Some(pos) => pos,
            None => {
                info!("Level to remove was not found in the manager");
                return None;
            }
        };

        if self.previous == Some(id) {
            self.previous = None;
        }
        if self.default_level == Some(id) {
            self.default_level = None;
        }

        Some(self.levels.remove(pos).level)
    }

    /// Unregister the level named `name` (identifier or iid).
    pub fn remove_by_name(&mut self, name: &str) -> Option<Level> {
        match self.id_of(name) {
            Some(id) => self.remove(id),
            None => {
                info!("Level '{}' was not found in the manager", name);
                None
            }
        }
    }

    /// Register `level` if needed, then make it current.
    pub fn change_to(&mut self, level: Level, scene: &mut Scene) -> LevelId {
        let id = self.add(level);
        self.activate(id, scene);
        id
    }

    /// Make the registered level named `name` (identifier or iid) current.
    pub fn change_by_name(&mut self, name: &str, scene: &mut Scene) -> bool {
        match self.id_of(name) {
            Some(id) => {
                self.activate(id, scene);
                true
            }
            None => {
                info!("Level '{}' was not found in the manager", name);
                false
            }
        }
    }

    /// Return to the level that was current before the last change, or to
    /// the default level when no previous level is recorded.
    pub fn change_to_previous(&mut self, scene: &mut Scene) {
        match self.previous {
            Some(id) => self.activate(id, scene),
            None => self.change_to_default(scene),
        }
    }

    /// Make the default level current.
    pub fn change_to_default(&mut self, scene: &mut Scene) {
        match self.default_level {
            Some(id) => self.activate(id, scene),
            None => info!("No default level is set"),
        }
    }

    /// Withdraw the current level from the scene and drop the manager,
    /// freeing every registered level.
    pub fn destroy(mut self, scene: &mut Scene) {
        if let Some(id) = self.current.take() {
            if let Some(level) = self.level_mut(id) {
                level.withdraw(scene);
            }
        }
    }

    fn activate(&mut self, id: LevelId, scene: &mut Scene) {
        if self.current == Some(id) {
            info!("Level is already current");
            return;
        }
        if self.level(id).is_none() {
            error!("Cannot change to an unregistered level");
            return;
        }

        if let Some(current_id) = self.current {
            if let Some(outgoing) = self.level_mut(current_id) {
                if let Some(hook) = outgoing.on_exit.as_mut() {
                    hook();
                }
                outgoing.withdraw(scene);
            }
            self.previous = Some(current_id);
        }

        self.current = Some(id);
        if let Some(incoming) = self.level_mut(id) {
            incoming.project(scene);
            if let Some(hook) = incoming.on_enter.as_mut() {
                hook();
            }
        }
    }

    fn find_registered(&self, level: &Level) -> Option<LevelId> {
        if !level.iid.is_empty() {
            return self
                .levels
                .iter()
                .find(|r| r.level.iid == level.iid)
                .map(|r| r.id);
        }
        if !level.id.is_empty() {
            return self
                .levels
                .iter()
                .find(|r| r.level.id == level.id)
                .map(|r| r.id);
        }
        None
    }
}
