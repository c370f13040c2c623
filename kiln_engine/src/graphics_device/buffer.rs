/// GPU buffer with single ownership of its handle
///
/// One type covers vertex, index and uniform buffers; the binding target is
/// a construction-time tag rather than a subtype.
///
/// Lifetime:
///
/// ```text
/// Buffer::new ──► Allocated ──assign_data──► Populated ──drop──► Released
/// ```
///
/// A Buffer is not `Clone`. Moving it moves the handle; the moved-from
/// binding can no longer be used, so the handle is deleted exactly once.

use std::fmt;
use crate::error::Result;
use crate::graphics_device::{
    lock_device, release_on, BufferTarget, BufferUsage, GpuHandle, SharedDevice,
};

/// Observable state of a live buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// Handle exists, no data uploaded yet
    Allocated,
    /// Data has been uploaded at least once
    Populated,
}

/// Owned GPU buffer
pub struct Buffer {
    device: SharedDevice,
    handle: GpuHandle,
    target: BufferTarget,
    size: u64,
    state: BufferState,
}

impl Buffer {
    /// Create an empty buffer for `target`
    pub fn new(device: &SharedDevice, target: BufferTarget) -> Result<Self> {
        let handle = lock_device(device)?.create_buffer(target)?;
        crate::engine_trace!("kiln::Buffer", "Created {:?} buffer {}", target, handle);
        Ok(Self {
            device: device.clone(),
            handle,
            target,
            size: 0,
            state: BufferState::Allocated,
        })
    }

    /// Create a buffer and upload `data` in one go
    pub fn with_data(
        device: &SharedDevice,
        target: BufferTarget,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<Self> {
        let mut buffer = Self::new(device, target)?;
        buffer.assign_data(data, usage)?;
        Ok(buffer)
    }

    /// Replace the buffer contents
    pub fn assign_data(&mut self, data: &[u8], usage: BufferUsage) -> Result<()> {
        lock_device(&self.device)?.buffer_data(self.handle, self.target, data, usage)?;
        self.size = data.len() as u64;
        self.state = BufferState::Populated;
        Ok(())
    }

    /// Bind this buffer to its target
    pub fn bind(&self) -> Result<()> {
        lock_device(&self.device)?.bind_buffer(self.target, Some(self.handle));
        Ok(())
    }

    /// Clear the binding of this buffer's target
    pub fn unbind(&self) -> Result<()> {
        lock_device(&self.device)?.bind_buffer(self.target, None);
        Ok(())
    }

    // ===== ACCESSORS =====

    /// GPU handle owned by this buffer
    pub fn handle(&self) -> GpuHandle { self.handle }

    /// Binding target
    pub fn target(&self) -> BufferTarget { self.target }

    /// Size in bytes of the last upload (0 while Allocated)
    pub fn size(&self) -> u64 { self.size }

    /// Current state
    pub fn state(&self) -> BufferState { self.state }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        let handle = self.handle;
        release_on(&self.device, |device| device.delete_buffer(handle));
        crate::engine_trace!("kiln::Buffer", "Released {:?} buffer {}", self.target, handle);
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("handle", &self.handle)
            .field("target", &self.target)
            .field("size", &self.size)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
