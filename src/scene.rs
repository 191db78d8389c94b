use std::cell::RefCell;
use std::rc::Rc;

use macroquad::prelude::*;

/// A drawable (or invisible collision-only) rectangle on the screen.
///
/// Levels share their sprites with the [`Scene`]: projecting a level clones
/// the references, not the sprites, so tagging a collision volume through the
/// level is visible to anything holding the scene.
pub struct Sprite {
    /// Image drawn for this sprite, if any. Collision volumes carry none.
    pub texture: Option<Texture2D>,
    /// World x position of the top-left corner
    pub x: f32,
    /// World y position of the top-left corner
    pub y: f32,
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
    /// Draw priority, lowest first
    pub z_index: i32,
    /// Invisible sprites are skipped when the scene draws
    pub visible: bool,
    /// Whether collision queries consider this sprite
    pub collisions_enabled: bool,
    /// Caller-defined category used for collision-response dispatch
    pub tag: u8,
}

impl Sprite {
    /// A visible, collision-less sprite with no image at the origin.
    pub fn new() -> Self {
        Sprite {
            texture: None,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            z_index: 0,
            visible: true,
            collisions_enabled: false,
            tag: 0,
        }
    }
}

impl Default for Sprite {
    fn default() -> Self {
        Sprite::new()
    }
}

/// Shared handle to a [`Sprite`]. Single-threaded by design.
pub type SpriteRef = Rc<RefCell<Sprite>>;

/// The retained display/collision list levels are projected onto.
#[derive(Default)]
pub struct Scene {
    sprites: Vec<SpriteRef>,
}

impl Scene {
    /// An empty scene.
    pub fn new() -> Self {
        Scene::default()
    }

    /// Add a sprite to the scene. A sprite already present is not added twice.
    pub fn project(&mut self, sprite: &SpriteRef) {
        if self.sprites.iter().any(|s| Rc::ptr_eq(s, sprite)) {
            return;
        }
        self.sprites.push(Rc::clone(sprite));
    }

    /// Remove a sprite from the scene. Unknown sprites are ignored.
    pub fn withdraw(&mut self, sprite: &SpriteRef) {
        self.sprites.retain(|s| !Rc::ptr_eq(s, sprite));
    }

    /// Number of sprites currently projected.
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    /// True when nothing is projected.
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Drop every projected sprite reference.
    pub fn clear(&mut self) {
        self.sprites.clear();
    }

    /// Draw every visible sprite, lowest z first.
    pub fn draw(&self) {
        let mut order: Vec<&SpriteRef> = self.sprites.iter().collect();
        order.sort_by_key(|s| s.borrow().z_index);

        for sprite in order {
            let sprite = sprite.borrow();
            if !sprite.visible {
                continue;
            }
            if let Some(texture) = &sprite.texture {
                draw_texture_ex(
                    texture,
                    sprite.x,
                    sprite.y,
                    WHITE,
                    DrawTextureParams {
                        dest_size: Some(vec2(sprite.width, sprite.height)),
                        ..Default::default()
                    },
                );
            }
        }
    }

    /// Collision-enabled sprites overlapping the given rectangle.
    pub fn collisions_in(&self, x: f32, y: f32, width: f32, height: f32) -> Vec<SpriteRef> {
        self.sprites
            .iter()
            .filter(|s| {
                let s = s.borrow();
                s.collisions_enabled
                    && x < s.x + s.width
                    && s.x < x + width
                    && y < s.y + s.height
                    && s.y < y + height
            })
            .map(Rc::clone)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume(x: f32, y: f32, size: f32) -> SpriteRef {
        Rc::new(RefCell::new(Sprite {
            x,
            y,
            width: size,
            height: size,
            visible: false,
            collisions_enabled: true,
            ..Sprite::new()
        }))
    }

    #[test]
    fn project_is_idempotent_per_sprite() {
        let mut scene = Scene::new();
        let sprite = volume(0.0, 0.0, 16.0);

        scene.project(&sprite);
        scene.project(&sprite);

        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn withdraw_removes_only_the_given_sprite() {
        let mut scene = Scene::new();
        let a = volume(0.0, 0.0, 16.0);
        let b = volume(16.0, 0.0, 16.0);

        scene.project(&a);
        scene.project(&b);
        scene.withdraw(&a);

        assert_eq!(scene.len(), 1);
        assert_eq!(scene.collisions_in(16.0, 0.0, 1.0, 1.0).len(), 1);
    }

    #[test]
    fn collisions_in_only_reports_overlapping_enabled_sprites() {
        let mut scene = Scene::new();
        let near = volume(0.0, 0.0, 16.0);
        let far = volume(100.0, 100.0, 16.0);
        let disabled = volume(4.0, 4.0, 16.0);
        disabled.borrow_mut().collisions_enabled = false;

        scene.project(&near);
        scene.project(&far);
        scene.project(&disabled);

        let hits = scene.collisions_in(8.0, 8.0, 16.0, 16.0);
        assert_eq!(hits.len(), 1);
        assert!(Rc::ptr_eq(&hits[0], &near));
    }
}
