/// Mesh resource
///
/// Interleaved vertices, u32 indices, a shared material and the draw object
/// holding the uploaded copies. GPU state is built once in `Mesh::new` and
/// only released on drop.

use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use crate::error::Result;
use crate::graphics_device::{
    lock_device, AttributeType, Buffer, BufferTarget, BufferUsage, DrawObject, IndexType,
    SharedDevice, VertexLayout,
};
use crate::resource::{Material, Shader};

/// One vertex as uploaded to the GPU
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex {
    /// position (location 0), normal (1), tex_coords (2)
    pub fn layout() -> VertexLayout {
        let mut layout = VertexLayout::new();
        layout
            .push(AttributeType::Float, 3, false)
            .push(AttributeType::Float, 3, false)
            .push(AttributeType::Float, 2, false);
        layout
    }
}

pub struct Mesh {
    device: SharedDevice,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    material: Arc<Material>,
    draw_object: DrawObject,
}

impl Mesh {
    /// Upload vertices and indices and keep them with the material
    ///
    /// Empty vertex or index lists are accepted; such a mesh draws nothing.
    pub fn new(
        device: &SharedDevice,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        material: Arc<Material>,
    ) -> Result<Self> {
        let mut draw_object = DrawObject::new(device)?;

        let vertex_buffer = Buffer::with_data(
            device,
            BufferTarget::Vertex,
            bytemuck::cast_slice(&vertices),
            BufferUsage::StaticDraw,
        )?;
        draw_object.add_buffer(vertex_buffer, Vertex::layout())?;

        let index_buffer = Buffer::with_data(
            device,
            BufferTarget::Index,
            bytemuck::cast_slice(&indices),
            BufferUsage::StaticDraw,
        )?;
        draw_object.set_index_buffer(index_buffer)?;

        Ok(Self {
            device: device.clone(),
            vertices,
            indices,
            material,
            draw_object,
        })
    }

    /// Draw with `shader`, binding the material first
    ///
    /// The caller sets per-node uniforms (`model`) beforehand.
    pub fn draw(&self, shader: &Shader) -> Result<()> {
        if self.indices.is_empty() {
            return Ok(());
        }

        shader.use_program()?;
        self.draw_object.bind()?;
        self.material.apply(shader)?;
        lock_device(&self.device)?.draw_elements(self.index_count(), IndexType::U32)?;
        self.draw_object.unbind()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    pub fn draw_object(&self) -> &DrawObject {
        &self.draw_object
    }
}

impl std::fmt::Debug for Mesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mesh")
            .field("vertices", &self.vertices.len())
            .field("indices", &self.indices.len())
            .field("draw_object", &self.draw_object)
            .finish()
    }
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
