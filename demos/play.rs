use anyhow::Context;
use macroquad::prelude::*;
use macroquad_ldtk::{Level, LevelManager, Scene};

const TILE_SIZE: i32 = 16;

#[derive(Clone, Copy)]
#[repr(u8)]
enum CollisionType {
    Floor = 1,
    Wall = 2,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "macroquad_ldtk demo".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

fn load_level_0() -> anyhow::Result<Level> {
    let level = Level::load("assets/maps/Level_0", TILE_SIZE, &["Collision", "Floor"])
        .context("Loading Level_0")?;

    level.tag_collision("Collision", CollisionType::Wall as u8);
    level.tag_collision("Floor", CollisionType::Floor as u8);

    Ok(level)
}

#[macroquad::main(window_conf)]
async fn main() {
    let level = load_level_0().expect("Failed to load level");

    let mut scene = Scene::new();
    let mut manager = LevelManager::new();
    let id = manager.change_to(level, &mut scene);
    manager.set_default(id);

    loop {
        clear_background(BLACK);

        scene.draw();

        draw_text(
            &format!("FPS: {}", get_fps()),
            screen_width() - 135.0,
            55.0,
            30.0,
            RED,
        );

        next_frame().await;
    }
}
