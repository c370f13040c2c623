/// Mock graphics device (no GPU required)
///
/// Hands out sequential handles and keeps enough state to check that
/// resources are created, bound and released correctly: live handles per
/// kind, creation/deletion counters, a command log, uploaded data sizes and
/// uniform values.
///
/// Failures can be injected with `fail_next_creations` or
/// `fail_creation_after`, and a shader source
/// containing `#error` fails to compile, so error paths are testable too.

use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex};
use crate::error::{Error, Result};
use crate::graphics_device::{
    BufferTarget, BufferUsage, GpuHandle, GraphicsDevice, IndexType, SamplerSettings,
    SharedDevice, TextureImage, TextureTarget, UniformValue, VertexAttributePointer,
};

/// Kind of object a handle names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Buffer,
    VertexArray,
    Texture,
    Program,
}

/// One recorded device call
#[derive(Debug, Clone, PartialEq)]
pub enum MockCommand {
    Create(HandleKind, GpuHandle),
    Delete(HandleKind, GpuHandle),
    BufferData { buffer: GpuHandle, len: usize },
    BindBuffer(BufferTarget, Option<GpuHandle>),
    BindVertexArray(Option<GpuHandle>),
    VertexAttribute { location: u32, pointer: VertexAttributePointer },
    UploadTexture { texture: GpuHandle, width: u32, height: u32 },
    GenerateMipmaps(GpuHandle),
    BindTexture { unit: u32, texture: Option<GpuHandle> },
    UseProgram(Option<GpuHandle>),
    SetUniform { program: GpuHandle, name: String, value: UniformValue },
    DrawElements { index_count: u32, index_type: IndexType },
}

#[derive(Debug, Default, Clone, Copy)]
struct KindCounters {
    created: usize,
    deleted: usize,
}

/// Headless implementation of `GraphicsDevice`
#[derive(Debug, Default)]
pub struct MockGraphicsDevice {
    next_handle: u32,
    live: FxHashMap<GpuHandle, HandleKind>,
    counters: FxHashMap<HandleKind, KindCounters>,
    invalid_delete_count: usize,
    pending_failures: u32,
    fail_after: Option<u32>,
    commands: Vec<MockCommand>,

    buffer_sizes: FxHashMap<GpuHandle, usize>,
    bound_buffers: FxHashMap<BufferTarget, GpuHandle>,
    bound_vertex_array: Option<GpuHandle>,
    vertex_array_indices: FxHashMap<GpuHandle, GpuHandle>,
    texture_sizes: FxHashMap<GpuHandle, (u32, u32)>,
    sampler_state: FxHashMap<GpuHandle, SamplerSettings>,
    bound_textures: FxHashMap<u32, GpuHandle>,
    current_program: Option<GpuHandle>,
    uniforms: FxHashMap<(GpuHandle, String), UniformValue>,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mock and return it both as itself (for inspection) and as a
    /// `SharedDevice` (for the engine)
    pub fn shared() -> (Arc<Mutex<MockGraphicsDevice>>, SharedDevice) {
        let mock = Arc::new(Mutex::new(Self::new()));
        let device: SharedDevice = mock.clone();
        (mock, device)
    }

    /// Make the next `count` create calls fail with `OutOfMemory`
    pub fn fail_next_creations(&mut self, count: u32) {
        self.pending_failures = count;
    }

    /// Let `successes` more create calls through, then fail one with `OutOfMemory`
    pub fn fail_creation_after(&mut self, successes: u32) {
        self.fail_after = Some(successes);
    }

    // ===== INSPECTION =====

    /// Number of live handles of a kind
    pub fn live_count(&self, kind: HandleKind) -> usize {
        self.live.values().filter(|k| **k == kind).count()
    }

    /// Number of live handles of every kind
    pub fn total_live(&self) -> usize {
        self.live.len()
    }

    /// Whether a handle is currently live
    pub fn is_live(&self, handle: GpuHandle) -> bool {
        self.live.contains_key(&handle)
    }

    /// Handles of a kind created so far
    pub fn created_count(&self, kind: HandleKind) -> usize {
        self.counters.get(&kind).map_or(0, |c| c.created)
    }

    /// Handles of a kind deleted so far
    pub fn deleted_count(&self, kind: HandleKind) -> usize {
        self.counters.get(&kind).map_or(0, |c| c.deleted)
    }

    /// Deletes of unknown, already deleted or wrongly typed handles
    pub fn invalid_delete_count(&self) -> usize {
        self.invalid_delete_count
    }

    /// Every call recorded so far
    pub fn commands(&self) -> &[MockCommand] {
        &self.commands
    }

    /// Forget recorded calls (state and counters are kept)
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Number of recorded draw calls
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, MockCommand::DrawElements { .. }))
            .count()
    }

    /// Size of the last upload to a buffer
    pub fn buffer_size(&self, buffer: GpuHandle) -> Option<usize> {
        self.buffer_sizes.get(&buffer).copied()
    }

    /// Dimensions of the last upload to a texture
    pub fn texture_size(&self, texture: GpuHandle) -> Option<(u32, u32)> {
        self.texture_sizes.get(&texture).copied()
    }

    /// Sampler state applied to a texture
    pub fn sampler(&self, texture: GpuHandle) -> Option<SamplerSettings> {
        self.sampler_state.get(&texture).copied()
    }

    /// Texture bound to a unit
    pub fn bound_texture(&self, unit: u32) -> Option<GpuHandle> {
        self.bound_textures.get(&unit).copied()
    }

    /// Last value written to a uniform
    pub fn uniform(&self, program: GpuHandle, name: &str) -> Option<UniformValue> {
        self.uniforms.get(&(program, name.to_string())).copied()
    }

    /// Program currently in use
    pub fn current_program(&self) -> Option<GpuHandle> {
        self.current_program
    }

    // ===== INTERNALS =====

    fn allocate(&mut self, kind: HandleKind) -> Result<GpuHandle> {
        if self.pending_failures > 0 {
            self.pending_failures -= 1;
            return Err(Error::OutOfMemory);
        }
        match self.fail_after {
            Some(0) => {
                self.fail_after = None;
                return Err(Error::OutOfMemory);
            }
            Some(remaining) => self.fail_after = Some(remaining - 1),
            None => {}
        }
        self.next_handle += 1;
        let handle = GpuHandle::new(self.next_handle)
            .ok_or_else(|| Error::BackendError("Mock handle space exhausted".to_string()))?;
        self.live.insert(handle, kind);
        self.counters.entry(kind).or_default().created += 1;
        self.commands.push(MockCommand::Create(kind, handle));
        Ok(handle)
    }

    fn release(&mut self, handle: GpuHandle, kind: HandleKind) -> bool {
        match self.live.get(&handle) {
            Some(live_kind) if *live_kind == kind => {
                self.live.remove(&handle);
                self.counters.entry(kind).or_default().deleted += 1;
                self.commands.push(MockCommand::Delete(kind, handle));
                true
            }
            _ => {
                self.invalid_delete_count += 1;
                false
            }
        }
    }

    fn expect_live(&self, handle: GpuHandle, kind: HandleKind) -> Result<()> {
        match self.live.get(&handle) {
            Some(live_kind) if *live_kind == kind => Ok(()),
            _ => Err(Error::InvalidResource(format!("{:?} {} is not live", kind, handle))),
        }
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_buffer(&mut self, _target: BufferTarget) -> Result<GpuHandle> {
        self.allocate(HandleKind::Buffer)
    }

    fn buffer_data(
        &mut self,
        buffer: GpuHandle,
        _target: BufferTarget,
        data: &[u8],
        _usage: BufferUsage,
    ) -> Result<()> {
        self.expect_live(buffer, HandleKind::Buffer)?;
        self.buffer_sizes.insert(buffer, data.len());
        self.commands.push(MockCommand::BufferData { buffer, len: data.len() });
        Ok(())
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<GpuHandle>) {
        match buffer {
            Some(handle) => {
                self.bound_buffers.insert(target, handle);
                // Index bindings are recorded in the bound vertex array
                if target == BufferTarget::Index {
                    if let Some(vao) = self.bound_vertex_array {
                        self.vertex_array_indices.insert(vao, handle);
                    }
                }
            }
            None => {
                self.bound_buffers.remove(&target);
            }
        }
        self.commands.push(MockCommand::BindBuffer(target, buffer));
    }

    fn delete_buffer(&mut self, buffer: GpuHandle) {
        if self.release(buffer, HandleKind::Buffer) {
            self.buffer_sizes.remove(&buffer);
            self.bound_buffers.retain(|_, bound| *bound != buffer);
        }
    }

    fn create_vertex_array(&mut self) -> Result<GpuHandle> {
        self.allocate(HandleKind::VertexArray)
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<GpuHandle>) {
        self.bound_vertex_array = vertex_array;
        self.commands.push(MockCommand::BindVertexArray(vertex_array));
    }

    fn vertex_attribute(&mut self, location: u32, pointer: &VertexAttributePointer) -> Result<()> {
        if self.bound_vertex_array.is_none() {
            return Err(Error::BackendError("vertex_attribute without a bound vertex array".to_string()));
        }
        if !self.bound_buffers.contains_key(&BufferTarget::Vertex) {
            return Err(Error::BackendError("vertex_attribute without a bound vertex buffer".to_string()));
        }
        self.commands.push(MockCommand::VertexAttribute { location, pointer: *pointer });
        Ok(())
    }

    fn delete_vertex_array(&mut self, vertex_array: GpuHandle) {
        if self.release(vertex_array, HandleKind::VertexArray) {
            self.vertex_array_indices.remove(&vertex_array);
            if self.bound_vertex_array == Some(vertex_array) {
                self.bound_vertex_array = None;
            }
        }
    }

    fn create_texture(&mut self, _target: TextureTarget) -> Result<GpuHandle> {
        self.allocate(HandleKind::Texture)
    }

    fn texture_parameters(
        &mut self,
        texture: GpuHandle,
        _target: TextureTarget,
        sampler: &SamplerSettings,
    ) -> Result<()> {
        self.expect_live(texture, HandleKind::Texture)?;
        self.sampler_state.insert(texture, *sampler);
        Ok(())
    }

    fn upload_texture(
        &mut self,
        texture: GpuHandle,
        _target: TextureTarget,
        image: &TextureImage,
    ) -> Result<()> {
        self.expect_live(texture, HandleKind::Texture)?;
        if image.width == 0 || image.height == 0 {
            return Err(Error::InvalidResource(format!(
                "Texture {} upload has zero size {}x{}",
                texture, image.width, image.height
            )));
        }
        if image.pixels.len() != image.expected_len() {
            return Err(Error::InvalidResource(format!(
                "Texture {} upload has {} bytes, expected {}",
                texture,
                image.pixels.len(),
                image.expected_len()
            )));
        }
        self.texture_sizes.insert(texture, (image.width, image.height));
        self.commands.push(MockCommand::UploadTexture {
            texture,
            width: image.width,
            height: image.height,
        });
        Ok(())
    }

    fn generate_mipmaps(&mut self, texture: GpuHandle, _target: TextureTarget) -> Result<()> {
        self.expect_live(texture, HandleKind::Texture)?;
        if !self.texture_sizes.contains_key(&texture) {
            return Err(Error::BackendError(format!(
                "Texture {} has no level 0 to build mipmaps from",
                texture
            )));
        }
        self.commands.push(MockCommand::GenerateMipmaps(texture));
        Ok(())
    }

    fn bind_texture(&mut self, unit: u32, _target: TextureTarget, texture: Option<GpuHandle>) {
        match texture {
            Some(handle) => { self.bound_textures.insert(unit, handle); }
            None => { self.bound_textures.remove(&unit); }
        }
        self.commands.push(MockCommand::BindTexture { unit, texture });
    }

    fn delete_texture(&mut self, texture: GpuHandle) {
        if self.release(texture, HandleKind::Texture) {
            self.texture_sizes.remove(&texture);
            self.sampler_state.remove(&texture);
            self.bound_textures.retain(|_, bound| *bound != texture);
        }
    }

    fn create_program(&mut self, vertex_source: &str, fragment_source: &str) -> Result<GpuHandle> {
        for (stage, source) in [("vertex", vertex_source), ("fragment", fragment_source)] {
            if source.contains("#error") {
                return Err(Error::BackendError(format!("Failed to compile {} shader", stage)));
            }
        }
        self.allocate(HandleKind::Program)
    }

    fn use_program(&mut self, program: Option<GpuHandle>) {
        self.current_program = program;
        self.commands.push(MockCommand::UseProgram(program));
    }

    fn set_uniform(&mut self, program: GpuHandle, name: &str, value: &UniformValue) -> Result<()> {
        self.expect_live(program, HandleKind::Program)?;
        self.uniforms.insert((program, name.to_string()), *value);
        self.commands.push(MockCommand::SetUniform {
            program,
            name: name.to_string(),
            value: *value,
        });
        Ok(())
    }

    fn delete_program(&mut self, program: GpuHandle) {
        if self.release(program, HandleKind::Program) {
            self.uniforms.retain(|(owner, _), _| *owner != program);
            if self.current_program == Some(program) {
                self.current_program = None;
            }
        }
    }

    fn draw_elements(&mut self, index_count: u32, index_type: IndexType) -> Result<()> {
        let vao = self
            .bound_vertex_array
            .ok_or_else(|| Error::BackendError("draw_elements without a bound vertex array".to_string()))?;
        if self.current_program.is_none() {
            return Err(Error::BackendError("draw_elements without a current program".to_string()));
        }
        let index_buffer = self
            .vertex_array_indices
            .get(&vao)
            .copied()
            .ok_or_else(|| Error::BackendError(format!("Vertex array {} has no index buffer", vao)))?;

        let index_size = match index_type {
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        };
        let available = self.buffer_sizes.get(&index_buffer).copied().unwrap_or(0);
        if index_count as usize * index_size > available {
            return Err(Error::BackendError(format!(
                "draw_elements reads {} indices past the end of buffer {}",
                index_count, index_buffer
            )));
        }

        self.commands.push(MockCommand::DrawElements { index_count, index_type });
        Ok(())
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
