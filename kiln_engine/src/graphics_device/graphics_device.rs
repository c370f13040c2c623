/// GraphicsDevice trait - handle-based GPU backend interface
///
/// The device creates, binds and deletes GPU objects identified by opaque
/// integer handles. Engine-side RAII wrappers (`Buffer`, `DrawObject`,
/// `Texture`, `Shader`) own exactly one handle each and give it back to the
/// device from their `Drop` implementation.
///
/// All calls happen on the thread that owns the graphics context; the
/// `Mutex` in `SharedDevice` only serializes access, it does not make handles
/// transferable between contexts.

use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, MutexGuard};
use glam::{Mat3, Mat4, Vec3};
use crate::error::{Error, Result};

// ============================================================================
// Handles
// ============================================================================

/// Opaque GPU object handle (never zero, zero is the backend's "no object")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GpuHandle(NonZeroU32);

impl GpuHandle {
    /// Wrap a raw backend handle, returns None for 0
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// Raw backend value
    pub fn raw(self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for GpuHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Device shared by every GPU-backed resource
pub type SharedDevice = Arc<Mutex<dyn GraphicsDevice>>;

/// Lock the device, mapping a poisoned lock to a backend error
pub fn lock_device(device: &SharedDevice) -> Result<MutexGuard<'_, dyn GraphicsDevice + 'static>> {
    device
        .lock()
        .map_err(|_| Error::BackendError("Graphics device lock poisoned".to_string()))
}

/// Run a release call on the device from a `Drop` implementation.
///
/// Drops cannot fail, so a poisoned lock is recovered instead of skipped:
/// leaking the handle would be worse than touching a device whose previous
/// user panicked.
pub(crate) fn release_on(device: &SharedDevice, release: impl FnOnce(&mut dyn GraphicsDevice)) {
    let mut guard = match device.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    release(&mut *guard);
}

// ============================================================================
// Buffers
// ============================================================================

/// Binding target of a buffer, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Per-vertex attribute data
    Vertex,
    /// Element indices
    Index,
    /// Uniform block data
    Uniform,
}

/// Expected update frequency of buffer contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferUsage {
    /// Written once, drawn many times
    #[default]
    StaticDraw,
    /// Rewritten occasionally
    DynamicDraw,
    /// Rewritten every frame
    StreamDraw,
}

/// Element type of an index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    U16,
    U32,
}

// ============================================================================
// Vertex attributes
// ============================================================================

/// Scalar type of a vertex attribute component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Float,
    Int,
    UnsignedInt,
    UnsignedByte,
}

impl AttributeType {
    /// Size of one component in bytes
    pub fn size_bytes(&self) -> u32 {
        match self {
            AttributeType::Float => 4,
            AttributeType::Int => 4,
            AttributeType::UnsignedInt => 4,
            AttributeType::UnsignedByte => 1,
        }
    }
}

/// Fully resolved attribute pointer handed to the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttributePointer {
    /// Number of components (1..=4)
    pub count: u32,
    /// Component type
    pub ty: AttributeType,
    /// Integer data is normalized to [0, 1] / [-1, 1]
    pub normalized: bool,
    /// Distance in bytes between two consecutive vertices
    pub stride: u32,
    /// Offset in bytes of this attribute inside a vertex
    pub offset: u32,
}

// ============================================================================
// Textures
// ============================================================================

/// Texture binding target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureTarget {
    #[default]
    Texture2D,
    CubeMap,
}

/// Pixel layout of uploaded image data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    Rgb8,
    Rgba8,
}

impl TextureFormat {
    /// Bytes per pixel
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            TextureFormat::Rgb8 => 3,
            TextureFormat::Rgba8 => 4,
        }
    }
}

/// Texture coordinate wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
}

/// Texture sampling filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
    /// Only meaningful as a minification filter
    LinearMipmapLinear,
}

/// Sampler state applied to a texture at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerSettings {
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            wrap_s: WrapMode::Repeat,
            wrap_t: WrapMode::Repeat,
            min_filter: FilterMode::LinearMipmapLinear,
            mag_filter: FilterMode::Linear,
        }
    }
}

/// CPU-side image ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    /// Byte length `pixels` must have for the declared size and format
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }
}

// ============================================================================
// Shader uniforms
// ============================================================================

/// Value written to a shader uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Float(f32),
    Vec3(Vec3),
    Mat3(Mat3),
    Mat4(Mat4),
}

impl From<bool> for UniformValue {
    fn from(value: bool) -> Self { UniformValue::Bool(value) }
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self { UniformValue::Int(value) }
}

impl From<u32> for UniformValue {
    fn from(value: u32) -> Self { UniformValue::UInt(value) }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self { UniformValue::Float(value) }
}

impl From<Vec3> for UniformValue {
    fn from(value: Vec3) -> Self { UniformValue::Vec3(value) }
}

impl From<Mat3> for UniformValue {
    fn from(value: Mat3) -> Self { UniformValue::Mat3(value) }
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self { UniformValue::Mat4(value) }
}

// ============================================================================
// GraphicsDevice trait
// ============================================================================

/// Handle-based GPU backend
///
/// Implemented by concrete backends (an OpenGL context, a headless mock, ...).
/// `create_*` calls may fail; `delete_*` and `bind_*` calls cannot, a backend
/// that sees an unknown handle there should log and ignore it.
pub trait GraphicsDevice: Send {
    // ===== BUFFERS =====

    /// Create an empty buffer object for the given target
    fn create_buffer(&mut self, target: BufferTarget) -> Result<GpuHandle>;

    /// Replace the whole contents of a buffer
    fn buffer_data(
        &mut self,
        buffer: GpuHandle,
        target: BufferTarget,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<()>;

    /// Bind a buffer to its target (None unbinds)
    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<GpuHandle>);

    /// Delete a buffer object
    fn delete_buffer(&mut self, buffer: GpuHandle);

    // ===== VERTEX ARRAYS =====

    /// Create a vertex array object
    fn create_vertex_array(&mut self) -> Result<GpuHandle>;

    /// Bind a vertex array (None unbinds)
    fn bind_vertex_array(&mut self, vertex_array: Option<GpuHandle>);

    /// Describe one attribute of the vertex buffer bound to the bound vertex array
    fn vertex_attribute(&mut self, location: u32, pointer: &VertexAttributePointer) -> Result<()>;

    /// Delete a vertex array object
    fn delete_vertex_array(&mut self, vertex_array: GpuHandle);

    // ===== TEXTURES =====

    /// Create an empty texture object
    fn create_texture(&mut self, target: TextureTarget) -> Result<GpuHandle>;

    /// Apply sampler state to a texture
    fn texture_parameters(
        &mut self,
        texture: GpuHandle,
        target: TextureTarget,
        sampler: &SamplerSettings,
    ) -> Result<()>;

    /// Upload level 0 of a texture
    fn upload_texture(
        &mut self,
        texture: GpuHandle,
        target: TextureTarget,
        image: &TextureImage,
    ) -> Result<()>;

    /// Build the mip chain from level 0
    fn generate_mipmaps(&mut self, texture: GpuHandle, target: TextureTarget) -> Result<()>;

    /// Bind a texture to a texture unit (None unbinds the unit)
    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: Option<GpuHandle>);

    /// Delete a texture object
    fn delete_texture(&mut self, texture: GpuHandle);

    // ===== PROGRAMS =====

    /// Compile and link a shader program
    fn create_program(&mut self, vertex_source: &str, fragment_source: &str) -> Result<GpuHandle>;

    /// Make a program current (None clears it)
    fn use_program(&mut self, program: Option<GpuHandle>);

    /// Write a uniform of a program
    fn set_uniform(&mut self, program: GpuHandle, name: &str, value: &UniformValue) -> Result<()>;

    /// Delete a shader program
    fn delete_program(&mut self, program: GpuHandle);

    // ===== DRAW =====

    /// Draw indexed triangles from the bound vertex array and index buffer
    fn draw_elements(&mut self, index_count: u32, index_type: IndexType) -> Result<()>;
}
