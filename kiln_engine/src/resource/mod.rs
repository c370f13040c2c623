//! Resource management module
//!
//! Keyed caches of shared, GPU-backed resources and the manager that owns
//! them.

pub mod resource_key;
pub mod resource_cache;
pub mod texture;
pub mod material;
pub mod mesh;
pub mod mesh_node;
pub mod shader;
mod resource_manager;

pub use resource_key::{ResourceId, ResourceKey};
pub use resource_cache::{CacheEntry, EntryKey, ResourceCache};
pub use texture::{Texture, TextureSettings};
pub use material::{Material, DEFAULT_SHININESS};
pub use mesh::{Mesh, Vertex};
pub use mesh_node::{DepthFirst, MeshNode};
pub use shader::Shader;
pub use resource_manager::{ResourceManager, ResourceStats};
