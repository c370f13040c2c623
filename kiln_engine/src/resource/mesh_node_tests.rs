/// Tests for MeshNode

use super::*;
use crate::graphics_device::mock_graphics_device::{MockCommand, MockGraphicsDevice};
use crate::graphics_device::{SharedDevice, UniformValue};
use crate::resource::{Material, Vertex};
use glam::Vec3;

fn quad(device: &SharedDevice) -> Arc<Mesh> {
    let vertices = vec![Vertex::default(); 4];
    let indices = vec![0, 1, 2, 2, 3, 0];
    Arc::new(Mesh::new(device, vertices, indices, Arc::new(Material::untextured(64.0))).unwrap())
}

fn leaf(offset: Mat4) -> Arc<MeshNode> {
    Arc::new(MeshNode::new(Vec::new(), Vec::new(), offset))
}

#[test]
fn test_depth_first_is_pre_order() {
    let a1 = leaf(Mat4::from_translation(Vec3::X));
    let a = Arc::new(MeshNode::new(Vec::new(), vec![a1.clone()], Mat4::IDENTITY));
    let b = leaf(Mat4::from_translation(Vec3::Y));
    let root = MeshNode::new(Vec::new(), vec![a.clone(), b.clone()], Mat4::IDENTITY);

    let order: Vec<*const MeshNode> = root.depth_first().map(|n| n as *const MeshNode).collect();
    assert_eq!(
        order,
        vec![
            &root as *const MeshNode,
            Arc::as_ptr(&a),
            Arc::as_ptr(&a1),
            Arc::as_ptr(&b),
        ]
    );
    assert_eq!(root.node_count(), 4);
}

#[test]
fn test_mesh_count_counts_shared_meshes_per_reference() {
    let (_mock, device) = MockGraphicsDevice::shared();
    let mesh = quad(&device);
    let child = Arc::new(MeshNode::new(vec![mesh.clone()], Vec::new(), Mat4::IDENTITY));
    let root = MeshNode::new(vec![mesh.clone(), mesh.clone()], vec![child], Mat4::IDENTITY);

    assert_eq!(root.mesh_count(), 3);
    assert_eq!(Arc::strong_count(&mesh), 4);
}

#[test]
fn test_draw_composes_transforms() {
    let (mock, device) = MockGraphicsDevice::shared();
    let shader = Shader::from_source(&device, "vs", "fs").unwrap();
    let child_offset = Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0));
    let child = Arc::new(MeshNode::new(vec![quad(&device)], Vec::new(), child_offset));
    let root_offset = Mat4::from_scale(Vec3::splat(3.0));
    let root = MeshNode::new(vec![quad(&device)], vec![child], root_offset);
    let parent = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));

    root.draw(&shader, parent).unwrap();

    let mock = mock.lock().unwrap();
    assert_eq!(mock.draw_count(), 2);
    let models: Vec<UniformValue> = mock
        .commands()
        .iter()
        .filter_map(|c| match c {
            MockCommand::SetUniform { name, value, .. } if name == "model" => Some(*value),
            _ => None,
        })
        .collect();
    assert_eq!(
        models,
        vec![
            UniformValue::Mat4(parent * root_offset),
            UniformValue::Mat4(parent * root_offset * child_offset),
        ]
    );
}

#[test]
fn test_empty_node() {
    let node = MeshNode::new(Vec::new(), Vec::new(), Mat4::IDENTITY);
    assert_eq!(node.node_count(), 1);
    assert_eq!(node.mesh_count(), 0);
    assert!(node.children().is_empty());
    assert!(node.meshes().is_empty());
    assert_eq!(node.offset(), Mat4::IDENTITY);
}
