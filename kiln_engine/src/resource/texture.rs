/// Texture resource
///
/// Owns one GPU texture handle. Textures are created from image files,
/// decoded to RGBA8 with the `image` crate, uploaded, and optionally
/// mipmapped. A file that cannot be decoded still produces a texture: a 1x1
/// zeroed placeholder, so materials that reference it stay drawable.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use crate::error::{Error, Result};
use crate::graphics_device::{
    lock_device, release_on, GpuHandle, SamplerSettings, SharedDevice, TextureFormat,
    TextureImage, TextureTarget,
};

/// How textures are sampled and whether a mip chain is built
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureSettings {
    pub sampler: SamplerSettings,
    pub generate_mipmaps: bool,
}

impl Default for TextureSettings {
    fn default() -> Self {
        Self {
            sampler: SamplerSettings::default(),
            generate_mipmaps: true,
        }
    }
}

pub struct Texture {
    device: SharedDevice,
    handle: GpuHandle,
    target: TextureTarget,
    /// Unit of the last bind
    unit: AtomicU32,
    width: u32,
    height: u32,
    path: PathBuf,
    placeholder: bool,
}

impl Texture {
    /// Load an image file into a new texture
    ///
    /// Decode failures are logged and produce a placeholder; only GPU
    /// failures are returned as errors.
    pub fn from_file(
        device: &SharedDevice,
        path: impl AsRef<Path>,
        settings: &TextureSettings,
    ) -> Result<Self> {
        let path = path.as_ref();
        match decode_rgba8(path) {
            Ok(image) => Self::create(device, path, &image, settings, false),
            Err(err) => {
                crate::engine_error!(
                    "kiln::Texture",
                    "Failed to decode '{}', using a placeholder: {}",
                    path.display(),
                    err
                );
                Self::create(device, path, &placeholder_image(), settings, true)
            }
        }
    }

    /// Upload an in-memory image
    pub fn from_image(
        device: &SharedDevice,
        path: impl Into<PathBuf>,
        image: &TextureImage,
        settings: &TextureSettings,
    ) -> Result<Self> {
        if image.pixels.len() != image.expected_len() {
            return Err(Error::InvalidResource(format!(
                "Texture image is {}x{} but carries {} bytes (expected {})",
                image.width,
                image.height,
                image.pixels.len(),
                image.expected_len()
            )));
        }
        Self::create(device, &path.into(), image, settings, false)
    }

    /// Create a placeholder texture directly
    pub fn placeholder(
        device: &SharedDevice,
        path: impl Into<PathBuf>,
        settings: &TextureSettings,
    ) -> Result<Self> {
        Self::create(device, &path.into(), &placeholder_image(), settings, true)
    }

    fn create(
        device: &SharedDevice,
        path: &Path,
        image: &TextureImage,
        settings: &TextureSettings,
        placeholder: bool,
    ) -> Result<Self> {
        let target = TextureTarget::Texture2D;
        let handle = lock_device(device)?.create_texture(target)?;

        // From here on, Drop gives the handle back if an upload step fails
        let texture = Self {
            device: device.clone(),
            handle,
            target,
            unit: AtomicU32::new(0),
            width: image.width,
            height: image.height,
            path: path.to_path_buf(),
            placeholder,
        };

        {
            let mut gpu = lock_device(&texture.device)?;
            gpu.texture_parameters(handle, target, &settings.sampler)?;
            gpu.upload_texture(handle, target, image)?;
            if settings.generate_mipmaps {
                gpu.generate_mipmaps(handle, target)?;
            }
        }

        crate::engine_trace!(
            "kiln::Texture",
            "Created texture {} ({}x{}) from '{}'",
            handle,
            image.width,
            image.height,
            path.display()
        );
        Ok(texture)
    }

    /// Bind to a texture unit
    pub fn bind(&self, unit: u32) -> Result<()> {
        lock_device(&self.device)?.bind_texture(unit, self.target, Some(self.handle));
        self.unit.store(unit, Ordering::Relaxed);
        Ok(())
    }

    // ===== ACCESSORS =====

    pub fn handle(&self) -> GpuHandle { self.handle }

    pub fn target(&self) -> TextureTarget { self.target }

    /// Texture unit of the last `bind` (0 before any bind)
    pub fn unit(&self) -> u32 {
        self.unit.load(Ordering::Relaxed)
    }

    /// (width, height) in pixels
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Source file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when the source could not be decoded
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        let handle = self.handle;
        release_on(&self.device, |device| device.delete_texture(handle));
        crate::engine_trace!("kiln::Texture", "Released texture {}", handle);
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("handle", &self.handle)
            .field("path", &self.path)
            .field("dimensions", &(self.width, self.height))
            .field("placeholder", &self.placeholder)
            .finish()
    }
}

/// Decode any supported image file to tightly packed RGBA8
fn decode_rgba8(path: &Path) -> std::result::Result<TextureImage, image::ImageError> {
    let rgba = image::open(path)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(TextureImage {
        width,
        height,
        format: TextureFormat::Rgba8,
        pixels: rgba.into_raw(),
    })
}

fn placeholder_image() -> TextureImage {
    TextureImage {
        width: 1,
        height: 1,
        format: TextureFormat::Rgba8,
        pixels: vec![0; 4],
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
