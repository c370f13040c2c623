/// Resource keys and the ids they hash to
///
/// A key names where a resource came from (model path plus structural
/// position, texture file, shader sources). Key derivation must be
/// deterministic: loading the same model twice has to produce the same keys,
/// otherwise the caches stop deduplicating.
///
/// Key shapes:
///
/// ```text
/// mesh_node/<model path>                     root node of a model
/// <node key>/children/<i>                    i-th child of a node
/// <node key>/meshes/<i>                      i-th mesh of a node
/// material/<model path>/<material index>     material, structural keying
/// material/content/<bits>/d:<..>/s:<..>      material, content keying (length-prefixed texture keys)
/// material/default                           sentinel material
/// texture/<dir>/<file>                       texture file
/// shader/<vertex path>|<fragment path>       shader program
/// ```
///
/// Paths are normalized lexically (`.` dropped, `..` folded into its parent,
/// backslashes turned into slashes) so one file reached two ways gets one key.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Component, Path};
use rustc_hash::FxHasher;

/// Fixed-width id a key hashes to (the actual cache index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl ResourceId {
    /// Hash a key string (FxHasher, unseeded, so stable across runs)
    pub fn of(key: &str) -> Self {
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        Self(hasher.finish())
    }

    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// String key identifying a cached resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey(String);

impl ResourceKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Id used to index the caches
    pub fn id(&self) -> ResourceId {
        ResourceId::of(&self.0)
    }

    // ===== DERIVATION =====

    /// Root node of the model at `model_path`
    pub fn mesh_node_root(model_path: &Path) -> Self {
        Self(format!("mesh_node/{}", normalize(model_path)))
    }

    /// Key of the `index`-th child of this node
    pub fn child(&self, index: usize) -> Self {
        Self(format!("{}/children/{}", self.0, index))
    }

    /// Key of the `index`-th mesh of this node
    pub fn mesh(&self, index: usize) -> Self {
        Self(format!("{}/meshes/{}", self.0, index))
    }

    /// Material by structural position inside a model
    pub fn material(model_path: &Path, material_index: usize) -> Self {
        Self(format!("material/{}/{}", normalize(model_path), material_index))
    }

    /// Material by content: same shininess and same texture keys give the same key
    pub fn material_content(
        shininess: f32,
        diffuse: &[ResourceKey],
        specular: &[ResourceKey],
    ) -> Self {
        // Each key as <byte length>:<key>, so no file name can fake a boundary
        let join = |keys: &[ResourceKey]| {
            keys.iter()
                .map(|key| format!("{}:{}", key.0.len(), key.0))
                .collect::<String>()
        };
        Self(format!(
            "material/content/{:08x}/d:{}/s:{}",
            shininess.to_bits(),
            join(diffuse),
            join(specular)
        ))
    }

    /// Sentinel material for meshes without one
    pub fn default_material() -> Self {
        Self::new("material/default")
    }

    /// Texture file `file` relative to the model directory `dir`
    pub fn texture(dir: &Path, file: &str) -> Self {
        Self(format!("texture/{}", normalize(&dir.join(file))))
    }

    /// Shader program built from two source files
    pub fn shader(vertex_path: &Path, fragment_path: &Path) -> Self {
        Self(format!(
            "shader/{}|{}",
            normalize(vertex_path),
            normalize(fragment_path)
        ))
    }
}

/// Path as a key segment: lexically normalized, forward slashes on every platform
fn normalize(path: &Path) -> String {
    let unified = path.to_string_lossy().replace('\\', "/");
    let mut root = String::new();
    let mut parts: Vec<String> = Vec::new();
    for component in Path::new(&unified).components() {
        match component {
            Component::Prefix(prefix) => root.push_str(&prefix.as_os_str().to_string_lossy()),
            Component::RootDir => root.push('/'),
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.last().is_some_and(|last| last != "..") {
                    parts.pop();
                } else if root.is_empty() {
                    // Nothing left to fold into; above an absolute root `..` is dropped
                    parts.push("..".to_string());
                }
            }
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
        }
    }
    format!("{}{}", root, parts.join("/"))
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ResourceKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&ResourceKey> for ResourceKey {
    fn from(key: &ResourceKey) -> Self {
        key.clone()
    }
}

#[cfg(test)]
#[path = "resource_key_tests.rs"]
mod tests;
