//! Scene loading module
//!
//! Importer interface, the glTF importer, and the loader that turns an
//! imported scene into cached `MeshNode` trees.

mod scene_tree;
mod gltf_importer;
mod loader_config;
mod scene_loader;

pub use scene_tree::{
    ImportFlags, SceneImporter, SceneMaterial, SceneMesh, SceneNode, SceneTree, TextureKind,
    IDENTITY_TRANSFORM,
};
pub use gltf_importer::GltfImporter;
pub use loader_config::{LoaderConfig, MaterialKeying};
pub use scene_loader::SceneLoader;
