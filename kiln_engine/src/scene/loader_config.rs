/// Scene loader configuration

use crate::resource::{TextureSettings, DEFAULT_SHININESS};
use crate::scene::ImportFlags;

/// How material cache keys are derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaterialKeying {
    /// By model path and material index: identical materials in different
    /// places are loaded separately
    #[default]
    Structural,
    /// By shininess and resolved texture keys: identical materials share
    /// one instance across nodes and models
    Content,
}

/// Configuration for `SceneLoader`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoaderConfig {
    /// Post-processing requested from the importer
    pub import_flags: ImportFlags,

    /// Shininess for materials that do not define one
    pub default_shininess: f32,

    pub material_keying: MaterialKeying,

    /// Deepest node accepted from the importer (root is depth 0)
    pub max_depth: usize,

    /// Sampler state and mipmapping for loaded textures
    pub texture: TextureSettings,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            import_flags: ImportFlags::default(),
            default_shininess: DEFAULT_SHININESS,
            material_keying: MaterialKeying::Structural,
            max_depth: 256,
            texture: TextureSettings::default(),
        }
    }
}
