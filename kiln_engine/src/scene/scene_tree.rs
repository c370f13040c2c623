/// Importer-facing scene description
///
/// A `SceneTree` is what an importer hands to the scene loader: a node tree
/// plus flat mesh and material tables that nodes refer to by index. Nodes own
/// their children, so a tree built from these types cannot contain a cycle.
///
/// Importers are expected to deliver triangle lists; `validate` checks the
/// indices and array lengths the loader relies on, not the topology.

use std::path::Path;
use bitflags::bitflags;
use crate::error::{Error, Result};

bitflags! {
    /// Post-processing requested from an importer
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImportFlags: u32 {
        /// Convert every face to triangles
        const TRIANGULATE = 1 << 0;
        /// Map texture coordinate `v` to `1 - v`
        const FLIP_UVS = 1 << 1;
        /// Merge vertices whose attributes are identical
        const JOIN_IDENTICAL_VERTICES = 1 << 2;
    }
}

impl Default for ImportFlags {
    fn default() -> Self {
        ImportFlags::TRIANGULATE | ImportFlags::FLIP_UVS | ImportFlags::JOIN_IDENTICAL_VERTICES
    }
}

/// Parses a model file into a `SceneTree`
///
/// Any `Fn(&Path, ImportFlags) -> Result<SceneTree>` is an importer, which
/// keeps in-memory scenes and tests cheap to set up.
pub trait SceneImporter {
    fn import(&self, path: &Path, flags: ImportFlags) -> Result<SceneTree>;
}

impl<F> SceneImporter for F
where
    F: Fn(&Path, ImportFlags) -> Result<SceneTree>,
{
    fn import(&self, path: &Path, flags: ImportFlags) -> Result<SceneTree> {
        self(path, flags)
    }
}

/// Row-major identity
pub const IDENTITY_TRANSFORM: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    /// Local transform, row-major (`transform[row][column]`)
    pub transform: [[f32; 4]; 4],
    /// Indices into `SceneTree::meshes`
    pub meshes: Vec<usize>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Node with an identity transform and nothing attached
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: IDENTITY_TRANSFORM,
            meshes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: [[f32; 4]; 4]) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_mesh(mut self, mesh_index: usize) -> Self {
        self.meshes.push(mesh_index);
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }
}

/// Triangulated mesh data
///
/// `normals` and `tex_coords` are either empty (attribute absent) or as long
/// as `positions`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    /// Triangle list
    pub indices: Vec<u32>,
    /// Index into `SceneTree::materials`
    pub material: Option<usize>,
}

/// Usage of a material texture slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    Diffuse,
    Specular,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneMaterial {
    pub name: String,
    /// Diffuse texture files, relative to the model directory
    pub diffuse: Vec<String>,
    /// Specular texture files, relative to the model directory
    pub specular: Vec<String>,
    /// None when the source does not define one
    pub shininess: Option<f32>,
}

impl SceneMaterial {
    /// Texture files of one slot kind, in slot order
    pub fn textures(&self, kind: TextureKind) -> &[String] {
        match kind {
            TextureKind::Diffuse => &self.diffuse,
            TextureKind::Specular => &self.specular,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneTree {
    pub root: SceneNode,
    pub meshes: Vec<SceneMesh>,
    pub materials: Vec<SceneMaterial>,
}

impl SceneTree {
    /// Check every cross reference the loader follows
    ///
    /// Fails with `ImportFailed` on a mesh or material index out of range, an
    /// attribute array whose length disagrees with `positions`, a vertex
    /// index past the vertex count, a non-finite transform, or a node deeper
    /// than `max_depth` (the root has depth 0).
    pub fn validate(&self, max_depth: usize) -> Result<()> {
        let mut stack: Vec<(&SceneNode, usize)> = vec![(&self.root, 0)];
        while let Some((node, depth)) = stack.pop() {
            if depth > max_depth {
                return Err(Error::ImportFailed(format!(
                    "node '{}' is nested deeper than {} levels",
                    node.name, max_depth
                )));
            }
            if node.transform.iter().flatten().any(|v| !v.is_finite()) {
                return Err(Error::ImportFailed(format!(
                    "node '{}' has a non-finite transform",
                    node.name
                )));
            }
            if let Some(&bad) = node.meshes.iter().find(|&&m| m >= self.meshes.len()) {
                return Err(Error::ImportFailed(format!(
                    "node '{}' references mesh {} of {}",
                    node.name,
                    bad,
                    self.meshes.len()
                )));
            }
            stack.extend(node.children.iter().map(|child| (child, depth + 1)));
        }

        for (index, mesh) in self.meshes.iter().enumerate() {
            self.validate_mesh(index, mesh)?;
        }
        Ok(())
    }

    fn validate_mesh(&self, index: usize, mesh: &SceneMesh) -> Result<()> {
        let vertex_count = mesh.positions.len();
        if !mesh.normals.is_empty() && mesh.normals.len() != vertex_count {
            return Err(Error::ImportFailed(format!(
                "mesh {} has {} normals for {} vertices",
                index,
                mesh.normals.len(),
                vertex_count
            )));
        }
        if !mesh.tex_coords.is_empty() && mesh.tex_coords.len() != vertex_count {
            return Err(Error::ImportFailed(format!(
                "mesh {} has {} texture coordinates for {} vertices",
                index,
                mesh.tex_coords.len(),
                vertex_count
            )));
        }
        if let Some(&bad) = mesh.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(Error::ImportFailed(format!(
                "mesh {} indexes vertex {} of {}",
                index, bad, vertex_count
            )));
        }
        if let Some(material) = mesh.material {
            if material >= self.materials.len() {
                return Err(Error::ImportFailed(format!(
                    "mesh {} references material {} of {}",
                    index,
                    material,
                    self.materials.len()
                )));
            }
        }
        Ok(())
    }

    /// Number of nodes, root included
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

#[cfg(test)]
#[path = "scene_tree_tests.rs"]
mod tests;
