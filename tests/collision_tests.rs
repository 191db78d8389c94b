// tests/collision_tests.rs

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use macroquad_ldtk::{CollisionGrid, Level, MapError};

fn temp_dir() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("mq_ldtk_collision_{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

const DATA_4X4: &str = r#"{ "identifier": "Level_0", "width": 64, "height": 64 }"#;

fn write_level(dir: &PathBuf, csvs: &[(&str, &str)]) {
    fs::write(dir.join("data.json"), DATA_4X4).expect("failed to write data.json");
    for (name, body) in csvs {
        fs::write(dir.join(format!("{name}.csv")), body).expect("failed to write csv");
    }
}

#[test]
fn all_zeros_yields_an_empty_grid() {
    let dir = temp_dir();
    write_level(
        &dir,
        &[("Collision", "0,0,0,0\n0,0,0,0\n0,0,0,0\n0,0,0,0\n")],
    );

    let level = Level::load(dir.to_str().unwrap(), 16, &["Collision"]).expect("load");

    let grid = level.grid("Collision").expect("grid");
    assert_eq!(grid.volumes().len(), 0);
    assert!(grid.flags().iter().all(|f| *f == 0));
}

#[test]
fn all_ones_yields_one_volume_per_cell() {
    let dir = temp_dir();
    write_level(
        &dir,
        &[("Collision", "1,1,1,1\n1,1,1,1\n1,1,1,1\n1,1,1,1\n")],
    );

    let level = Level::load(dir.to_str().unwrap(), 16, &["Collision"]).expect("load");

    let grid = level.grid("Collision").expect("grid");
    assert_eq!(grid.volumes().len(), 16);
}

#[test]
fn volume_count_matches_solid_cells_and_positions_match_the_scan() {
    let dir = temp_dir();
    write_level(&dir, &[("Collision", "1,0,0,0\n0,0,1,0\n0,0,0,0\n0,0,0,1\n")]);

    let level = Level::load(dir.to_str().unwrap(), 16, &["Collision"]).expect("load");
    let grid = level.grid("Collision").expect("grid");

    let solid = grid.flags().iter().filter(|f| **f == 1).count();
    assert_eq!(grid.volumes().len(), solid);

    // row-major scan order: (0,0), (2,1), (3,3)
    let positions: Vec<(f32, f32)> = grid
        .volumes()
        .iter()
        .map(|v| (v.borrow().x, v.borrow().y))
        .collect();
    assert_eq!(positions, vec![(0.0, 0.0), (32.0, 16.0), (48.0, 48.0)]);

    for volume in grid.volumes() {
        let v = volume.borrow();
        assert_eq!((v.width, v.height), (16.0, 16.0));
        assert!(v.collisions_enabled);
        assert!(!v.visible);
    }
}

#[test]
fn missing_collision_file_fails_the_whole_load() {
    let dir = temp_dir();
    write_level(&dir, &[("Collision", "1,1,1,1\n1,1,1,1\n1,1,1,1\n1,1,1,1\n")]);

    let err = Level::load(dir.to_str().unwrap(), 16, &["Collision", "Floor"]).unwrap_err();
    assert!(matches!(err, MapError::Io { .. }));
}

#[test]
fn short_collision_file_is_fatal() {
    let dir = temp_dir();
    write_level(&dir, &[("Collision", "1,1,1,1\n1,1,1,1\n")]);

    let err = Level::load(dir.to_str().unwrap(), 16, &["Collision"]).unwrap_err();
    assert!(matches!(
        err,
        MapError::CollisionTooShort {
            expected: 16,
            found: 8,
            ..
        }
    ));
}

#[test]
fn empty_layer_names_are_skipped() {
    let dir = temp_dir();
    write_level(&dir, &[("Collision", "0,0,0,0\n0,0,0,0\n0,0,0,0\n0,0,0,0\n")]);

    let level = Level::load(dir.to_str().unwrap(), 16, &["", "Collision"]).expect("load");

    assert_eq!(level.collision.len(), 1);
}

#[test]
fn duplicate_layer_names_keep_the_first_grid() {
    let dir = temp_dir();
    write_level(&dir, &[("Collision", "0,0,0,0\n0,0,0,0\n0,0,0,0\n0,0,0,0\n")]);

    let level =
        Level::load(dir.to_str().unwrap(), 16, &["Collision", "Collision"]).expect("load");

    assert_eq!(level.collision.len(), 1);
}

#[test]
fn multiple_collision_layers_load_independently() {
    let dir = temp_dir();
    write_level(
        &dir,
        &[
            ("Collision", "1,0,0,0\n0,0,0,0\n0,0,0,0\n0,0,0,0\n"),
            ("Floor", "0,0,0,0\n0,0,0,0\n0,0,0,0\n2,2,1,1\n"),
        ],
    );

    let level = Level::load(dir.to_str().unwrap(), 16, &["Collision", "Floor"]).expect("load");

    assert_eq!(level.grid("Collision").unwrap().volumes().len(), 1);
    assert_eq!(level.grid("Floor").unwrap().volumes().len(), 2);
    assert_eq!(level.grid("Floor").unwrap().flag(0, 3), Some(2));
}

#[test]
fn tag_collision_tags_every_volume_of_the_named_grid() {
    let dir = temp_dir();
    write_level(
        &dir,
        &[
            ("Collision", "1,1,0,0\n0,0,0,0\n0,0,0,0\n0,0,0,0\n"),
            ("Floor", "0,0,0,0\n0,0,0,0\n0,0,0,0\n0,0,1,1\n"),
        ],
    );

    let level = Level::load(dir.to_str().unwrap(), 16, &["Collision", "Floor"]).expect("load");
    level.tag_collision("Collision", 2);
    level.tag_collision("Floor", 1);
    // absent grid: no-op
    level.tag_collision("Lava", 9);

    for volume in level.grid("Collision").unwrap().volumes() {
        assert_eq!(volume.borrow().tag, 2);
    }
    for volume in level.grid("Floor").unwrap().volumes() {
        assert_eq!(volume.borrow().tag, 1);
    }
}

#[test]
fn parse_exposes_raw_flags_for_multi_valued_terrain() {
    let grid = CollisionGrid::parse("Terrain", "0,2,3\n1,0,2\n", 3, 2, 8).expect("parse");

    assert_eq!(grid.flags(), &[0, 2, 3, 1, 0, 2]);
    assert_eq!(grid.volumes().len(), 1);
    assert_eq!(grid.flag(1, 0), Some(2));
    assert_eq!(grid.flag(0, 1), Some(1));
}
