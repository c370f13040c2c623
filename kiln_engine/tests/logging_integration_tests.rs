//! Integration tests for loader diagnostics
//!
//! These tests swap the process-wide logger, so they run serially.
//! No GPU required.
//!
//! Run with: cargo test --test logging_integration_tests


use kiln_engine::kiln::device::MockGraphicsDevice;
use kiln_engine::kiln::log::{reset_logger, set_logger, LogSeverity};
use kiln_engine::kiln::resource::ResourceManager;
use kiln_engine::kiln::scene::{SceneLoader, SceneNode, SceneTree};
use serial_test::serial;
use std::cell::Cell;
use std::rc::Rc;
use test_utils::{count_entries, fixed_importer, material, triangle, write_png, CaptureLogger};

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_missing_shininess_warns_once() {
    let (logger, entries) = CaptureLogger::new();
    set_logger(logger);

    let scene = SceneTree {
        root: SceneNode::new("root").with_mesh(0).with_mesh(1),
        meshes: vec![triangle(Some(0)), triangle(Some(0))],
        materials: vec![material("plain", &[], None)],
    };
    let (_mock, device) = MockGraphicsDevice::shared();
    let mut rm = ResourceManager::new(device);
    let loader = SceneLoader::new(fixed_importer(scene, Rc::new(Cell::new(0))));

    let root = loader.load_model(&mut rm, "plain.gltf").unwrap();
    loader.load_model(&mut rm, "plain.gltf").unwrap();

    assert_eq!(root.meshes()[0].material().shininess(), 64.0);
    assert_eq!(count_entries(&entries, LogSeverity::Warn, "has no shininess"), 1);

    drop(root);
    drop(rm);
    reset_logger();
}

#[test]
#[serial]
fn test_integration_corrupt_texture_is_logged() {
    let (logger, entries) = CaptureLogger::new();
    set_logger(logger);

    let dir = tempfile::tempdir().unwrap();
    write_png(dir.path(), "good.png");
    std::fs::write(dir.path().join("broken.png"), b"\x89PNG truncated").unwrap();
    let scene = SceneTree {
        root: SceneNode::new("root").with_mesh(0),
        meshes: vec![triangle(Some(0))],
        materials: vec![material("mixed", &["good.png", "broken.png"], Some(16.0))],
    };
    let (_mock, device) = MockGraphicsDevice::shared();
    let mut rm = ResourceManager::new(device);
    let loader = SceneLoader::new(fixed_importer(scene, Rc::new(Cell::new(0))));

    loader.load_model(&mut rm, dir.path().join("m.gltf")).unwrap();

    assert_eq!(count_entries(&entries, LogSeverity::Error, "broken.png"), 1);
    assert_eq!(count_entries(&entries, LogSeverity::Error, "good.png"), 0);
    assert_eq!(count_entries(&entries, LogSeverity::Warn, "placeholder"), 1);

    drop(rm);
    reset_logger();
}

#[test]
#[serial]
fn test_integration_failed_import_is_logged() {
    let (logger, entries) = CaptureLogger::new();
    set_logger(logger);

    let scene = SceneTree {
        root: SceneNode::new("root").with_mesh(3),
        meshes: Vec::new(),
        materials: Vec::new(),
    };
    let (_mock, device) = MockGraphicsDevice::shared();
    let mut rm = ResourceManager::new(device);
    let loader = SceneLoader::new(fixed_importer(scene, Rc::new(Cell::new(0))));

    assert!(loader.load_model(&mut rm, "dangling.gltf").is_err());
    assert_eq!(count_entries(&entries, LogSeverity::Error, "dangling.gltf"), 1);

    drop(rm);
    reset_logger();
}
