/// Central resource manager for the engine.
///
/// Owns one cache per resource kind plus the device every GPU-backed
/// resource is created on. There is no global instance: create one at
/// startup, hand it to the scene loader and the renderer by reference, drop
/// it at shutdown.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::SharedDevice;
use crate::resource::{
    Material, Mesh, MeshNode, ResourceCache, ResourceKey, Shader, Texture, DEFAULT_SHININESS,
};

/// Entry count of every cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceStats {
    pub shaders: usize,
    pub textures: usize,
    pub materials: usize,
    pub meshes: usize,
    pub mesh_nodes: usize,
}

impl fmt::Display for ResourceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} mesh nodes, {} meshes, {} materials, {} textures, {} shaders",
            self.mesh_nodes, self.meshes, self.materials, self.textures, self.shaders
        )
    }
}

pub struct ResourceManager {
    device: SharedDevice,
    shaders: ResourceCache<Shader>,
    textures: ResourceCache<Texture>,
    materials: ResourceCache<Material>,
    meshes: ResourceCache<Mesh>,
    mesh_nodes: ResourceCache<MeshNode>,
}

impl ResourceManager {
    /// Create a resource manager with empty caches
    pub fn new(device: SharedDevice) -> Self {
        Self {
            device,
            shaders: ResourceCache::new("shader"),
            textures: ResourceCache::new("texture"),
            materials: ResourceCache::new("material"),
            meshes: ResourceCache::new("mesh"),
            mesh_nodes: ResourceCache::new("mesh node"),
        }
    }

    /// Device resources are created on
    pub fn device(&self) -> &SharedDevice {
        &self.device
    }

    // ===== SHADERS =====

    /// Load a shader program from two source files, once
    pub fn load_shader(
        &mut self,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Arc<Shader>> {
        let vertex_path = vertex_path.as_ref();
        let fragment_path = fragment_path.as_ref();
        let key = ResourceKey::shader(vertex_path, fragment_path);
        if self.shaders.contains(&key) {
            return self.shaders.get(&key);
        }
        let device = self.device.clone();
        self.shaders
            .load(key, || Shader::from_files(&device, vertex_path, fragment_path))
    }

    /// Shader by key
    pub fn shader(&self, key: impl AsRef<str>) -> Result<Arc<Shader>> {
        self.shaders.get(key)
    }

    // ===== MATERIALS =====

    /// Sentinel material for meshes without one (registered on first use)
    pub fn default_material(&mut self) -> Result<Arc<Material>> {
        self.materials.load_or_get(ResourceKey::default_material(), || {
            Ok(Material::untextured(DEFAULT_SHININESS))
        })
    }

    // ===== LOOKUPS =====

    pub fn texture(&self, key: impl AsRef<str>) -> Result<Arc<Texture>> {
        self.textures.get(key)
    }

    pub fn material(&self, key: impl AsRef<str>) -> Result<Arc<Material>> {
        self.materials.get(key)
    }

    pub fn mesh(&self, key: impl AsRef<str>) -> Result<Arc<Mesh>> {
        self.meshes.get(key)
    }

    pub fn mesh_node(&self, key: impl AsRef<str>) -> Result<Arc<MeshNode>> {
        self.mesh_nodes.get(key)
    }

    // ===== CACHES =====

    pub fn shaders(&self) -> &ResourceCache<Shader> { &self.shaders }
    pub fn shaders_mut(&mut self) -> &mut ResourceCache<Shader> { &mut self.shaders }

    pub fn textures(&self) -> &ResourceCache<Texture> { &self.textures }
    pub fn textures_mut(&mut self) -> &mut ResourceCache<Texture> { &mut self.textures }

    pub fn materials(&self) -> &ResourceCache<Material> { &self.materials }
    pub fn materials_mut(&mut self) -> &mut ResourceCache<Material> { &mut self.materials }

    pub fn meshes(&self) -> &ResourceCache<Mesh> { &self.meshes }
    pub fn meshes_mut(&mut self) -> &mut ResourceCache<Mesh> { &mut self.meshes }

    pub fn mesh_nodes(&self) -> &ResourceCache<MeshNode> { &self.mesh_nodes }
    pub fn mesh_nodes_mut(&mut self) -> &mut ResourceCache<MeshNode> { &mut self.mesh_nodes }

    // ===== COUNTS =====

    pub fn shader_count(&self) -> usize { self.shaders.len() }
    pub fn texture_count(&self) -> usize { self.textures.len() }
    pub fn material_count(&self) -> usize { self.materials.len() }
    pub fn mesh_count(&self) -> usize { self.meshes.len() }
    pub fn mesh_node_count(&self) -> usize { self.mesh_nodes.len() }

    /// Entry count of every cache
    pub fn stats(&self) -> ResourceStats {
        ResourceStats {
            shaders: self.shaders.len(),
            textures: self.textures.len(),
            materials: self.materials.len(),
            meshes: self.meshes.len(),
            mesh_nodes: self.mesh_nodes.len(),
        }
    }

    /// Whether every cache is empty
    pub fn is_empty(&self) -> bool {
        self.stats() == ResourceStats::default()
    }

    /// Drop every cached resource, users before the resources they use
    ///
    /// Mesh nodes go first, then meshes, materials, textures and shaders.
    /// Resources still held outside the manager survive until released.
    pub fn clear(&mut self) {
        self.mesh_nodes.clear();
        self.meshes.clear();
        self.materials.clear();
        self.textures.clear();
        self.shaders.clear();
    }
}

impl Drop for ResourceManager {
    fn drop(&mut self) {
        if !self.is_empty() {
            crate::engine_info!("kiln::ResourceManager", "Releasing {}", self.stats());
        }
        self.clear();
    }
}

#[cfg(test)]
#[path = "resource_manager_tests.rs"]
mod tests;
