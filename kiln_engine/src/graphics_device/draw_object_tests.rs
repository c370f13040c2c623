/// Tests for DrawObject

use super::*;
use crate::error::Error;
use crate::graphics_device::mock_graphics_device::{HandleKind, MockCommand, MockGraphicsDevice};
use crate::graphics_device::{AttributeType, BufferUsage};

fn position_normal_uv() -> VertexLayout {
    let mut layout = VertexLayout::new();
    layout
        .push(AttributeType::Float, 3, false)
        .push(AttributeType::Float, 3, false)
        .push(AttributeType::Float, 2, false);
    layout
}

#[test]
fn test_add_buffer_declares_every_attribute() {
    let (mock, device) = MockGraphicsDevice::shared();
    let mut draw_object = DrawObject::new(&device).unwrap();
    let vbo = Buffer::with_data(&device, BufferTarget::Vertex, &[0u8; 96], BufferUsage::StaticDraw).unwrap();

    draw_object.add_buffer(vbo, position_normal_uv()).unwrap();

    let mock = mock.lock().unwrap();
    let pointers: Vec<(u32, u32)> = mock
        .commands()
        .iter()
        .filter_map(|c| match c {
            MockCommand::VertexAttribute { location, pointer } => Some((*location, pointer.offset)),
            _ => None,
        })
        .collect();
    assert_eq!(pointers, vec![(0, 0), (1, 12), (2, 24)]);
    assert_eq!(draw_object.vertex_buffers().len(), 1);
}

#[test]
fn test_add_buffer_rejects_index_target() {
    let (mock, device) = MockGraphicsDevice::shared();
    let mut draw_object = DrawObject::new(&device).unwrap();
    let ebo = Buffer::new(&device, BufferTarget::Index).unwrap();

    let result = draw_object.add_buffer(ebo, position_normal_uv());
    assert!(matches!(result, Err(Error::BackendError(_))));
    assert!(draw_object.vertex_buffers().is_empty());
    // The rejected buffer was released with the call
    assert_eq!(mock.lock().unwrap().live_count(HandleKind::Buffer), 0);
}

#[test]
fn test_add_buffer_rejects_empty_layout() {
    let (_mock, device) = MockGraphicsDevice::shared();
    let mut draw_object = DrawObject::new(&device).unwrap();
    let vbo = Buffer::new(&device, BufferTarget::Vertex).unwrap();

    assert!(draw_object.add_buffer(vbo, VertexLayout::new()).is_err());
}

#[test]
fn test_set_index_buffer_replaces_previous() {
    let (mock, device) = MockGraphicsDevice::shared();
    let mut draw_object = DrawObject::new(&device).unwrap();

    let first = Buffer::new(&device, BufferTarget::Index).unwrap();
    let first_handle = first.handle();
    draw_object.set_index_buffer(first).unwrap();
    draw_object.set_index_buffer(Buffer::new(&device, BufferTarget::Index).unwrap()).unwrap();

    let mock = mock.lock().unwrap();
    assert!(!mock.is_live(first_handle));
    assert_eq!(mock.live_count(HandleKind::Buffer), 1);
    assert!(draw_object.index_buffer().is_some());
}

#[test]
fn test_set_index_buffer_rejects_vertex_target() {
    let (_mock, device) = MockGraphicsDevice::shared();
    let mut draw_object = DrawObject::new(&device).unwrap();
    let vbo = Buffer::new(&device, BufferTarget::Vertex).unwrap();
    assert!(draw_object.set_index_buffer(vbo).is_err());
    assert!(draw_object.index_buffer().is_none());
}

#[test]
fn test_drop_releases_vertex_array_before_buffers() {
    let (mock, device) = MockGraphicsDevice::shared();
    let mut draw_object = DrawObject::new(&device).unwrap();
    let vao = draw_object.handle();
    let vbo = Buffer::with_data(&device, BufferTarget::Vertex, &[0u8; 32], BufferUsage::StaticDraw).unwrap();
    let ebo = Buffer::with_data(&device, BufferTarget::Index, &[0u8; 12], BufferUsage::StaticDraw).unwrap();
    draw_object.add_buffer(vbo, position_normal_uv()).unwrap();
    draw_object.set_index_buffer(ebo).unwrap();

    mock.lock().unwrap().clear_commands();
    drop(draw_object);

    let mock = mock.lock().unwrap();
    let deletes: Vec<HandleKind> = mock
        .commands()
        .iter()
        .filter_map(|c| match c {
            MockCommand::Delete(kind, _) => Some(*kind),
            _ => None,
        })
        .collect();
    assert_eq!(deletes, vec![HandleKind::VertexArray, HandleKind::Buffer, HandleKind::Buffer]);
    assert!(!mock.is_live(vao));
    assert_eq!(mock.total_live(), 0);
    assert_eq!(mock.invalid_delete_count(), 0);
}

#[test]
fn test_bind_and_unbind() {
    let (mock, device) = MockGraphicsDevice::shared();
    let draw_object = DrawObject::new(&device).unwrap();
    draw_object.bind().unwrap();
    draw_object.unbind().unwrap();

    let mock = mock.lock().unwrap();
    let commands = mock.commands();
    assert!(commands.contains(&MockCommand::BindVertexArray(Some(draw_object.handle()))));
    assert_eq!(commands.last(), Some(&MockCommand::BindVertexArray(None)));
}
