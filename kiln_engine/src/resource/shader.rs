/// Shader program resource
///
/// Owns one linked program handle. Meshes and mesh nodes draw through a
/// borrowed `&Shader`; they never own it.

use std::fmt;
use std::path::{Path, PathBuf};
use crate::error::{Error, Result};
use crate::graphics_device::{lock_device, release_on, GpuHandle, SharedDevice, UniformValue};

pub struct Shader {
    device: SharedDevice,
    handle: GpuHandle,
    sources: Option<(PathBuf, PathBuf)>,
}

impl Shader {
    /// Compile and link a program from source strings
    pub fn from_source(device: &SharedDevice, vertex_source: &str, fragment_source: &str) -> Result<Self> {
        let handle = lock_device(device)?.create_program(vertex_source, fragment_source)?;
        crate::engine_trace!("kiln::Shader", "Created program {}", handle);
        Ok(Self {
            device: device.clone(),
            handle,
            sources: None,
        })
    }

    /// Read both stages from disk, then compile and link
    pub fn from_files(
        device: &SharedDevice,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let vertex_path = vertex_path.as_ref();
        let fragment_path = fragment_path.as_ref();
        let vertex_source = read_source(vertex_path)?;
        let fragment_source = read_source(fragment_path)?;

        let mut shader = Self::from_source(device, &vertex_source, &fragment_source)?;
        shader.sources = Some((vertex_path.to_path_buf(), fragment_path.to_path_buf()));
        Ok(shader)
    }

    /// Make this program current
    pub fn use_program(&self) -> Result<()> {
        lock_device(&self.device)?.use_program(Some(self.handle));
        Ok(())
    }

    /// Write a uniform of this program
    pub fn set_uniform(&self, name: &str, value: impl Into<UniformValue>) -> Result<()> {
        lock_device(&self.device)?.set_uniform(self.handle, name, &value.into())
    }

    pub fn handle(&self) -> GpuHandle { self.handle }

    /// Source files, for programs built with `from_files`
    pub fn source_paths(&self) -> Option<(&Path, &Path)> {
        self.sources
            .as_ref()
            .map(|(vertex, fragment)| (vertex.as_path(), fragment.as_path()))
    }
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|err| {
        crate::engine_error!("kiln::Shader", "Cannot read '{}': {}", path.display(), err);
        Error::Io(format!("{}: {}", path.display(), err))
    })
}

impl Drop for Shader {
    fn drop(&mut self) {
        let handle = self.handle;
        release_on(&self.device, |device| device.delete_program(handle));
        crate::engine_trace!("kiln::Shader", "Released program {}", handle);
    }
}

impl fmt::Debug for Shader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shader")
            .field("handle", &self.handle)
            .field("sources", &self.sources)
            .finish()
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
