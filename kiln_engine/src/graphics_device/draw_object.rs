/// Draw object (vertex array state plus the buffers it references)
///
/// A DrawObject owns one vertex-array handle, every vertex buffer attached
/// to it and at most one index buffer. Attaching a buffer moves it in, so the
/// buffers are released together with the vertex array and never outlive it.

use std::fmt;
use crate::error::Result;
use crate::graphics_device::{
    lock_device, release_on, Buffer, BufferTarget, GpuHandle, SharedDevice, VertexLayout,
};

pub struct DrawObject {
    device: SharedDevice,
    handle: GpuHandle,
    vertex_buffers: Vec<(Buffer, VertexLayout)>,
    index_buffer: Option<Buffer>,
}

impl DrawObject {
    /// Create an empty draw object
    pub fn new(device: &SharedDevice) -> Result<Self> {
        let handle = lock_device(device)?.create_vertex_array()?;
        crate::engine_trace!("kiln::DrawObject", "Created vertex array {}", handle);
        Ok(Self {
            device: device.clone(),
            handle,
            vertex_buffers: Vec::new(),
            index_buffer: None,
        })
    }

    /// Attach a vertex buffer described by `layout`
    ///
    /// The layout's locations are enabled on this draw object and read from
    /// `buffer`. On error the buffer is released with the call.
    pub fn add_buffer(&mut self, buffer: Buffer, layout: VertexLayout) -> Result<()> {
        if buffer.target() != BufferTarget::Vertex {
            crate::engine_bail!(
                "kiln::DrawObject",
                "Cannot attach {:?} buffer {} as vertex data",
                buffer.target(),
                buffer.handle()
            );
        }
        if layout.is_empty() {
            crate::engine_bail!(
                "kiln::DrawObject",
                "Vertex buffer {} attached with an empty layout",
                buffer.handle()
            );
        }

        {
            let mut device = lock_device(&self.device)?;
            device.bind_vertex_array(Some(self.handle));
            device.bind_buffer(BufferTarget::Vertex, Some(buffer.handle()));
            for (location, pointer) in layout.attribute_pointers() {
                device.vertex_attribute(location, &pointer)?;
            }
            device.bind_vertex_array(None);
        }

        self.vertex_buffers.push((buffer, layout));
        Ok(())
    }

    /// Attach the index buffer, replacing (and releasing) any previous one
    pub fn set_index_buffer(&mut self, buffer: Buffer) -> Result<()> {
        if buffer.target() != BufferTarget::Index {
            crate::engine_bail!(
                "kiln::DrawObject",
                "Cannot attach {:?} buffer {} as index data",
                buffer.target(),
                buffer.handle()
            );
        }

        {
            let mut device = lock_device(&self.device)?;
            device.bind_vertex_array(Some(self.handle));
            device.bind_buffer(BufferTarget::Index, Some(buffer.handle()));
            device.bind_vertex_array(None);
        }

        self.index_buffer = Some(buffer);
        Ok(())
    }

    /// Bind for drawing
    pub fn bind(&self) -> Result<()> {
        lock_device(&self.device)?.bind_vertex_array(Some(self.handle));
        Ok(())
    }

    pub fn unbind(&self) -> Result<()> {
        lock_device(&self.device)?.bind_vertex_array(None);
        Ok(())
    }

    // ===== ACCESSORS =====

    pub fn handle(&self) -> GpuHandle { self.handle }

    /// Attached vertex buffers with their layouts, in attach order
    pub fn vertex_buffers(&self) -> &[(Buffer, VertexLayout)] {
        &self.vertex_buffers
    }

    pub fn index_buffer(&self) -> Option<&Buffer> {
        self.index_buffer.as_ref()
    }
}

impl Drop for DrawObject {
    fn drop(&mut self) {
        // The vertex array goes first, the buffers follow as fields drop
        let handle = self.handle;
        release_on(&self.device, |device| device.delete_vertex_array(handle));
        crate::engine_trace!("kiln::DrawObject", "Released vertex array {}", handle);
    }
}

impl fmt::Debug for DrawObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawObject")
            .field("handle", &self.handle)
            .field("vertex_buffers", &self.vertex_buffers.len())
            .field("index_buffer", &self.index_buffer)
            .finish()
    }
}

#[cfg(test)]
#[path = "draw_object_tests.rs"]
mod tests;
