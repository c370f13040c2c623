/// Tests for Shader

use super::*;
use crate::graphics_device::mock_graphics_device::{HandleKind, MockGraphicsDevice};
use glam::Mat4;

#[test]
fn test_from_source_creates_program() {
    let (mock, device) = MockGraphicsDevice::shared();
    let shader = Shader::from_source(&device, "void main() {}", "void main() {}").unwrap();
    assert!(mock.lock().unwrap().is_live(shader.handle()));
    assert!(shader.source_paths().is_none());
}

#[test]
fn test_compile_error_propagates() {
    let (mock, device) = MockGraphicsDevice::shared();
    let result = Shader::from_source(&device, "void main() {}", "#error nope");
    assert!(matches!(result, Err(Error::BackendError(_))));
    assert_eq!(mock.lock().unwrap().live_count(HandleKind::Program), 0);
}

#[test]
fn test_from_files_reads_both_stages() {
    let dir = tempfile::tempdir().unwrap();
    let vs = dir.path().join("phong.vert");
    let fs = dir.path().join("phong.frag");
    std::fs::write(&vs, "void main() {}").unwrap();
    std::fs::write(&fs, "void main() {}").unwrap();
    let (_mock, device) = MockGraphicsDevice::shared();

    let shader = Shader::from_files(&device, &vs, &fs).unwrap();
    assert_eq!(shader.source_paths(), Some((vs.as_path(), fs.as_path())));
}

#[test]
fn test_from_files_missing_stage_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let vs = dir.path().join("phong.vert");
    std::fs::write(&vs, "void main() {}").unwrap();
    let (mock, device) = MockGraphicsDevice::shared();

    let result = Shader::from_files(&device, &vs, dir.path().join("missing.frag"));
    assert!(matches!(result, Err(Error::Io(_))));
    assert_eq!(mock.lock().unwrap().total_live(), 0);
}

#[test]
fn test_use_and_set_uniform() {
    let (mock, device) = MockGraphicsDevice::shared();
    let shader = Shader::from_source(&device, "vs", "fs").unwrap();
    shader.use_program().unwrap();
    shader.set_uniform("model", Mat4::IDENTITY).unwrap();
    shader.set_uniform("material.texture_diffuse0", 0i32).unwrap();

    let mock = mock.lock().unwrap();
    assert_eq!(mock.current_program(), Some(shader.handle()));
    assert_eq!(mock.uniform(shader.handle(), "model"), Some(UniformValue::Mat4(Mat4::IDENTITY)));
    assert_eq!(mock.uniform(shader.handle(), "material.texture_diffuse0"), Some(UniformValue::Int(0)));
}

#[test]
fn test_drop_deletes_program() {
    let (mock, device) = MockGraphicsDevice::shared();
    let shader = Shader::from_source(&device, "vs", "fs").unwrap();
    let handle = shader.handle();
    drop(shader);
    assert!(!mock.lock().unwrap().is_live(handle));
}
