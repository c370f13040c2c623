/// Tests for Buffer
///
/// These tests use MockGraphicsDevice to check handle ownership without a GPU.

use super::*;
use crate::error::Error;
use crate::graphics_device::mock_graphics_device::{HandleKind, MockGraphicsDevice};

#[test]
fn test_new_buffer_is_allocated_and_empty() {
    let (mock, device) = MockGraphicsDevice::shared();
    let buffer = Buffer::new(&device, BufferTarget::Vertex).unwrap();

    assert_eq!(buffer.state(), BufferState::Allocated);
    assert_eq!(buffer.size(), 0);
    assert_eq!(buffer.target(), BufferTarget::Vertex);
    assert!(mock.lock().unwrap().is_live(buffer.handle()));
}

#[test]
fn test_assign_data_populates() {
    let (mock, device) = MockGraphicsDevice::shared();
    let mut buffer = Buffer::new(&device, BufferTarget::Index).unwrap();
    buffer.assign_data(&[0u8; 24], BufferUsage::StaticDraw).unwrap();

    assert_eq!(buffer.state(), BufferState::Populated);
    assert_eq!(buffer.size(), 24);
    assert_eq!(mock.lock().unwrap().buffer_size(buffer.handle()), Some(24));

    buffer.assign_data(&[0u8; 8], BufferUsage::DynamicDraw).unwrap();
    assert_eq!(buffer.size(), 8);
}

#[test]
fn test_drop_releases_handle_once() {
    let (mock, device) = MockGraphicsDevice::shared();
    let buffer = Buffer::with_data(&device, BufferTarget::Vertex, &[1, 2, 3], BufferUsage::StaticDraw).unwrap();
    let handle = buffer.handle();

    drop(buffer);

    let mock = mock.lock().unwrap();
    assert!(!mock.is_live(handle));
    assert_eq!(mock.deleted_count(HandleKind::Buffer), 1);
    assert_eq!(mock.invalid_delete_count(), 0);
}

#[test]
fn test_move_then_drop_releases_once() {
    let (mock, device) = MockGraphicsDevice::shared();
    let buffer = Buffer::new(&device, BufferTarget::Uniform).unwrap();
    let handle = buffer.handle();

    let moved = buffer;
    let owners = vec![moved];
    assert_eq!(owners[0].handle(), handle);
    drop(owners);

    let mock = mock.lock().unwrap();
    assert_eq!(mock.deleted_count(HandleKind::Buffer), 1);
    assert_eq!(mock.invalid_delete_count(), 0);
}

#[test]
fn test_replacing_by_assignment_releases_old_handle() {
    let (mock, device) = MockGraphicsDevice::shared();
    let mut buffer = Buffer::new(&device, BufferTarget::Vertex).unwrap();
    let first = buffer.handle();

    buffer = Buffer::new(&device, BufferTarget::Vertex).unwrap();
    let second = buffer.handle();

    {
        let mock = mock.lock().unwrap();
        assert!(!mock.is_live(first));
        assert!(mock.is_live(second));
    }

    drop(buffer);
    let mock = mock.lock().unwrap();
    assert_eq!(mock.live_count(HandleKind::Buffer), 0);
    assert_eq!(mock.deleted_count(HandleKind::Buffer), 2);
    assert_eq!(mock.invalid_delete_count(), 0);
}

#[test]
fn test_bind_and_unbind() {
    let (mock, device) = MockGraphicsDevice::shared();
    let buffer = Buffer::new(&device, BufferTarget::Index).unwrap();
    buffer.bind().unwrap();
    buffer.unbind().unwrap();

    let mock = mock.lock().unwrap();
    let commands = mock.commands();
    let handle = buffer.handle();
    assert!(commands.contains(&crate::graphics_device::mock_graphics_device::MockCommand::BindBuffer(
        BufferTarget::Index,
        Some(handle)
    )));
    assert!(commands.contains(&crate::graphics_device::mock_graphics_device::MockCommand::BindBuffer(
        BufferTarget::Index,
        None
    )));
}

#[test]
fn test_creation_failure_propagates() {
    let (mock, device) = MockGraphicsDevice::shared();
    mock.lock().unwrap().fail_next_creations(1);

    let result = Buffer::new(&device, BufferTarget::Vertex);
    assert!(matches!(result, Err(Error::OutOfMemory)));
    assert_eq!(mock.lock().unwrap().total_live(), 0);
}
