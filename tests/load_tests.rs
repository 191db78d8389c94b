// tests/load_tests.rs

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use macroquad_ldtk::{Level, MapError};

fn temp_dir() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("mq_ldtk_load_{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn write_level(dir: &PathBuf, data_json: &str) {
    fs::write(dir.join("data.json"), data_json).expect("failed to write data.json");
}

#[test]
fn minimal_document_yields_grid_dimensions_and_nothing_else() {
    let dir = temp_dir();
    write_level(
        &dir,
        r#"{ "identifier": "Level_0", "x": 0, "y": 0, "width": 256, "height": 256 }"#,
    );

    let level = Level::load(dir.to_str().unwrap(), 16, &[]).expect("load");

    assert_eq!(level.id, "Level_0");
    assert_eq!(level.grid_width, 16);
    assert_eq!(level.grid_height, 16);
    assert!(level.layers.is_empty());
    assert!(level.entities.is_empty());
    assert!(level.neighbor_levels.is_empty());
    assert!(level.collision.is_empty());
}

#[test]
fn full_document_round_trip() {
    let dir = temp_dir();
    write_level(
        &dir,
        r##"{
            "identifier": "Level_0",
            "uniqueIdentifer": "9dc2d0d0-66b0-11ec-8f2c-1f9f069c9611",
            "x": 32, "y": 64, "width": 128, "height": 96,
            "bgColor": "#181425",
            "customFields": { "music": "cave", "width": 9999 },
            "layers": ["bg.png", "fg.png"],
            "neighbourLevels": [ { "levelIid": "other-level", "dir": "w" } ],
            "entities": {
                "PlayerSpawn": [
                    { "id": "PlayerSpawn", "iid": "spawn-1", "layer": "Entities",
                      "x": 48, "y": 16, "width": 16, "height": 16 }
                ]
            }
        }"##,
    );

    let level = Level::load(dir.to_str().unwrap(), 16, &[]).expect("load");

    assert_eq!(level.iid, "9dc2d0d0-66b0-11ec-8f2c-1f9f069c9611");
    assert_eq!((level.world_x, level.world_y), (32, 64));
    assert_eq!((level.width, level.height), (128, 96));
    assert_eq!((level.grid_width, level.grid_height), (8, 6));

    // ["bg", "fg"] decodes into z priorities 0 and 1, in that order
    assert_eq!(level.layers.len(), 2);
    assert_eq!(level.layers[0].filename, "bg.png");
    assert_eq!(level.layers[0].z_index, 0);
    assert_eq!(level.layers[1].filename, "fg.png");
    assert_eq!(level.layers[1].z_index, 1);

    assert_eq!(level.neighbor_levels.len(), 1);
    assert_eq!(level.neighbor_levels[0].level_iid, "other-level");
    assert_eq!(level.neighbor_levels[0].dir, "w");

    assert_eq!(level.entities.len(), 1);
    assert_eq!(level.entities[0].kind, "PlayerSpawn");
    assert_eq!(level.entities[0].entities[0].layer, "Entities");
}

#[test]
fn missing_document_fails_the_load() {
    let dir = temp_dir();

    let err = Level::load(dir.to_str().unwrap(), 16, &[]).unwrap_err();
    assert!(matches!(err, MapError::Io { .. }));
}

#[test]
fn malformed_document_is_best_effort() {
    let dir = temp_dir();
    write_level(&dir, "{ this is not json");

    let level = Level::load(dir.to_str().unwrap(), 16, &[]).expect("load");

    assert_eq!(level.id, "");
    assert_eq!(level.grid_width, 0);
    assert_eq!(level.grid_height, 0);
}

#[test]
fn zero_tile_size_is_rejected() {
    let dir = temp_dir();
    write_level(&dir, r#"{ "width": 64, "height": 64 }"#);

    let err = Level::load(dir.to_str().unwrap(), 0, &[]).unwrap_err();
    assert!(matches!(err, MapError::InvalidTileSize(0)));
}

#[test]
fn trailing_slash_in_path_is_tolerated() {
    let dir = temp_dir();
    write_level(&dir, r#"{ "identifier": "Level_0", "width": 32, "height": 32 }"#);

    let path = format!("{}/", dir.to_str().unwrap());
    let level = Level::load(&path, 16, &[]).expect("load");

    assert_eq!(level.id, "Level_0");
    assert_eq!(level.grid_width, 2);
}

#[test]
fn missing_layer_image_keeps_the_layer_slot() {
    // neither image exists on disk: both layers decode without an image and
    // z order still matches the document
    let dir = temp_dir();
    write_level(
        &dir,
        r#"{ "width": 32, "height": 32, "layers": ["bg.png", "fg.png"] }"#,
    );

    let level = Level::load(dir.to_str().unwrap(), 16, &[]).expect("load");

    assert_eq!(level.layers.len(), 2);
    assert!(level.layers[0].image.is_none());
    assert!(level.layers[1].image.is_none());
    assert_eq!(level.layers[1].z_index, 1);
}
