/// Tests for Mesh

use super::*;
use crate::graphics_device::mock_graphics_device::{HandleKind, MockCommand, MockGraphicsDevice};
use crate::resource::{Texture, TextureSettings};

fn triangle() -> (Vec<Vertex>, Vec<u32>) {
    let vertex = |x: f32, y: f32| Vertex {
        position: [x, y, 0.0],
        normal: [0.0, 0.0, 1.0],
        tex_coords: [x, y],
    };
    (vec![vertex(0.0, 0.0), vertex(1.0, 0.0), vertex(0.0, 1.0)], vec![0, 1, 2])
}

#[test]
fn test_vertex_layout_matches_struct() {
    let layout = Vertex::layout();
    assert_eq!(layout.stride() as usize, std::mem::size_of::<Vertex>());
    let offsets: Vec<u32> = layout.attribute_pointers().iter().map(|(_, p)| p.offset).collect();
    assert_eq!(offsets, vec![0, 12, 24]);
}

#[test]
fn test_new_uploads_vertices_and_indices() {
    let (mock, device) = MockGraphicsDevice::shared();
    let (vertices, indices) = triangle();
    let mesh = Mesh::new(&device, vertices, indices, Arc::new(Material::untextured(64.0))).unwrap();

    let draw_object = mesh.draw_object();
    let vertex_buffer = &draw_object.vertex_buffers()[0].0;
    let index_buffer = draw_object.index_buffer().unwrap();
    assert_eq!(vertex_buffer.size(), 3 * 32);
    assert_eq!(index_buffer.size(), 3 * 4);
    assert_eq!(mesh.index_count(), 3);

    let mock = mock.lock().unwrap();
    assert_eq!(mock.live_count(HandleKind::VertexArray), 1);
    assert_eq!(mock.live_count(HandleKind::Buffer), 2);
}

#[test]
fn test_draw_issues_one_indexed_draw() {
    let (mock, device) = MockGraphicsDevice::shared();
    let (vertices, indices) = triangle();
    let diffuse = Arc::new(Texture::placeholder(&device, "wood.png", &TextureSettings::default()).unwrap());
    let material = Arc::new(Material::new(16.0, vec![diffuse.clone()], vec![]));
    let mesh = Mesh::new(&device, vertices, indices, material).unwrap();
    let shader = Shader::from_source(&device, "vs", "fs").unwrap();

    mesh.draw(&shader).unwrap();

    let mock = mock.lock().unwrap();
    assert_eq!(mock.draw_count(), 1);
    assert!(mock.commands().contains(&MockCommand::DrawElements {
        index_count: 3,
        index_type: IndexType::U32,
    }));
    assert_eq!(mock.bound_texture(0), Some(diffuse.handle()));
}

#[test]
fn test_empty_mesh_draws_nothing() {
    let (mock, device) = MockGraphicsDevice::shared();
    let mesh = Mesh::new(&device, Vec::new(), Vec::new(), Arc::new(Material::untextured(64.0))).unwrap();
    let shader = Shader::from_source(&device, "vs", "fs").unwrap();

    mesh.draw(&shader).unwrap();

    assert_eq!(mock.lock().unwrap().draw_count(), 0);
    assert!(mesh.vertices().is_empty());
}

#[test]
fn test_drop_releases_gpu_objects_but_not_material() {
    let (mock, device) = MockGraphicsDevice::shared();
    let (vertices, indices) = triangle();
    let material = Arc::new(Material::untextured(64.0));
    let mesh = Mesh::new(&device, vertices, indices, material.clone()).unwrap();
    assert_eq!(Arc::strong_count(&material), 2);

    drop(mesh);

    assert_eq!(Arc::strong_count(&material), 1);
    let mock = mock.lock().unwrap();
    assert_eq!(mock.total_live(), 0);
    assert_eq!(mock.invalid_delete_count(), 0);
}

#[test]
fn test_creation_failure_releases_partial_state() {
    let (mock, device) = MockGraphicsDevice::shared();
    let (vertices, indices) = triangle();
    // Vertex array and vertex buffer succeed, the index buffer fails
    mock.lock().unwrap().fail_creation_after(2);

    let result = Mesh::new(&device, vertices, indices, Arc::new(Material::untextured(1.0)));
    assert!(matches!(result, Err(crate::error::Error::OutOfMemory)));

    let mock = mock.lock().unwrap();
    assert_eq!(mock.created_count(HandleKind::Buffer), 1);
    assert_eq!(mock.total_live(), 0);
    assert_eq!(mock.invalid_delete_count(), 0);
}
