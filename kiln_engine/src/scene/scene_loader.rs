/// Scene loader (importer output -> cached resource graph)
///
/// `load_model` imports a file once and turns its node tree into shared
/// `MeshNode`s, registering every mesh, material and texture in the
/// `ResourceManager` under a key derived from its structural position:
///
/// ```text
/// mesh_node/<path>                      root MeshNode
///  ├─ .../meshes/<i>                    Mesh ── material/<path>/<m> ── texture/<dir>/<file>
///  └─ .../children/<i>                  child MeshNode (same shape, recursively)
/// ```
///
/// Registration is bottom-up: textures before their material, materials
/// before their mesh, meshes and children before their node. Holding a
/// MeshNode therefore means every resource below it is fully built.
///
/// Every step is check-then-load, so loading a model twice returns the same
/// root without importing again or touching the device.

use std::path::Path;
use std::sync::Arc;
use glam::Mat4;
use crate::error::{Error, Result};
use crate::resource::{
    Material, Mesh, MeshNode, ResourceKey, ResourceManager, Texture, Vertex,
};
use crate::scene::{
    LoaderConfig, MaterialKeying, SceneImporter, SceneMaterial, SceneMesh, SceneNode, SceneTree,
    TextureKind,
};

/// What one `load_model` call built (cache hits are not counted)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct LoadCounters {
    nodes: usize,
    meshes: usize,
    materials: usize,
    textures: usize,
    placeholders: usize,
}

/// State shared by the recursive steps of one load
struct LoadContext<'a> {
    resources: &'a mut ResourceManager,
    scene: &'a SceneTree,
    model_path: &'a Path,
    dir: &'a Path,
    counters: LoadCounters,
}

pub struct SceneLoader<I: SceneImporter> {
    importer: I,
    config: LoaderConfig,
}

impl<I: SceneImporter> SceneLoader<I> {
    /// Loader with the default configuration
    pub fn new(importer: I) -> Self {
        Self::with_config(importer, LoaderConfig::default())
    }

    pub fn with_config(importer: I, config: LoaderConfig) -> Self {
        Self { importer, config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn importer(&self) -> &I {
        &self.importer
    }

    /// Load the model at `path`, or return it if it is already loaded
    ///
    /// Import and validation failures return `ImportFailed` and leave every
    /// cache untouched. Undecodable textures become placeholders and missing
    /// shininess values fall back to the configured default; neither fails
    /// the load. Device errors propagate.
    pub fn load_model(
        &self,
        resources: &mut ResourceManager,
        path: impl AsRef<Path>,
    ) -> Result<Arc<MeshNode>> {
        let path = path.as_ref();
        let root_key = ResourceKey::mesh_node_root(path);
        if resources.mesh_nodes().contains(&root_key) {
            crate::engine_debug!("kiln::SceneLoader", "'{}' is already loaded", path.display());
            return resources.mesh_node(&root_key);
        }

        crate::engine_info!("kiln::SceneLoader", "Importing '{}'", path.display());
        let scene = self
            .importer
            .import(path, self.config.import_flags)
            .and_then(|scene| {
                scene.validate(self.config.max_depth)?;
                Ok(scene)
            })
            .map_err(|err| {
                let err = match err {
                    Error::ImportFailed(message) => {
                        Error::ImportFailed(format!("'{}': {}", path.display(), message))
                    }
                    other => Error::ImportFailed(format!("'{}': {}", path.display(), other)),
                };
                crate::engine_error!("kiln::SceneLoader", "{}", err);
                err
            })?;

        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        let mut context = LoadContext {
            resources,
            scene: &scene,
            model_path: path,
            dir,
            counters: LoadCounters::default(),
        };
        let root = self.process_node(&mut context, &root_key, &scene.root)?;

        let counters = context.counters;
        crate::engine_info!(
            "kiln::SceneLoader",
            "Loaded '{}': {} nodes, {} meshes, {} materials, {} textures",
            path.display(),
            counters.nodes,
            counters.meshes,
            counters.materials,
            counters.textures
        );
        if counters.placeholders > 0 {
            crate::engine_warn!(
                "kiln::SceneLoader",
                "'{}' uses {} placeholder texture(s)",
                path.display(),
                counters.placeholders
            );
        }
        Ok(root)
    }

    fn process_node(
        &self,
        context: &mut LoadContext<'_>,
        key: &ResourceKey,
        node: &SceneNode,
    ) -> Result<Arc<MeshNode>> {
        if context.resources.mesh_nodes().contains(key) {
            return context.resources.mesh_node(key);
        }
        let scene = context.scene;

        let mut meshes = Vec::with_capacity(node.meshes.len());
        for (i, &mesh_index) in node.meshes.iter().enumerate() {
            let mesh = scene.meshes.get(mesh_index).ok_or_else(|| {
                Error::ImportFailed(format!("node '{}' references mesh {}", node.name, mesh_index))
            })?;
            meshes.push(self.process_mesh(context, &key.mesh(i), mesh)?);
        }

        let mut children = Vec::with_capacity(node.children.len());
        for (i, child) in node.children.iter().enumerate() {
            children.push(self.process_node(context, &key.child(i), child)?);
        }

        // Importer matrices are row-major, glam is column-major
        let offset = Mat4::from_cols_array_2d(&node.transform).transpose();

        context.counters.nodes += 1;
        context
            .resources
            .mesh_nodes_mut()
            .insert(key.clone(), MeshNode::new(meshes, children, offset))
    }

    fn process_mesh(
        &self,
        context: &mut LoadContext<'_>,
        key: &ResourceKey,
        mesh: &SceneMesh,
    ) -> Result<Arc<Mesh>> {
        if context.resources.meshes().contains(key) {
            return context.resources.mesh(key);
        }

        let vertices: Vec<Vertex> = mesh
            .positions
            .iter()
            .enumerate()
            .map(|(i, position)| Vertex {
                position: *position,
                normal: mesh.normals.get(i).copied().unwrap_or_default(),
                tex_coords: mesh.tex_coords.get(i).copied().unwrap_or_default(),
            })
            .collect();

        let material = match mesh.material {
            Some(index) => self.process_material(context, index)?,
            None => context.resources.default_material()?,
        };

        let device = context.resources.device().clone();
        let indices = mesh.indices.clone();
        let mesh = context
            .resources
            .meshes_mut()
            .load(key.clone(), || Mesh::new(&device, vertices, indices, material))?;
        context.counters.meshes += 1;
        Ok(mesh)
    }

    fn process_material(&self, context: &mut LoadContext<'_>, index: usize) -> Result<Arc<Material>> {
        let scene = context.scene;
        let source: &SceneMaterial = scene
            .materials
            .get(index)
            .ok_or_else(|| Error::ImportFailed(format!("material {} does not exist", index)))?;
        let shininess = source.shininess.unwrap_or(self.config.default_shininess);

        let key = match self.config.material_keying {
            MaterialKeying::Structural => ResourceKey::material(context.model_path, index),
            MaterialKeying::Content => {
                let texture_keys = |kind: TextureKind| -> Vec<ResourceKey> {
                    source
                        .textures(kind)
                        .iter()
                        .map(|file| ResourceKey::texture(context.dir, file))
                        .collect()
                };
                ResourceKey::material_content(
                    shininess,
                    &texture_keys(TextureKind::Diffuse),
                    &texture_keys(TextureKind::Specular),
                )
            }
        };
        if context.resources.materials().contains(&key) {
            return context.resources.material(&key);
        }

        if source.shininess.is_none() {
            crate::engine_warn!(
                "kiln::SceneLoader",
                "Material '{}' ({}) has no shininess, using {}",
                source.name,
                key,
                shininess
            );
        }

        let mut diffuse_maps = Vec::with_capacity(source.diffuse.len());
        for file in source.textures(TextureKind::Diffuse) {
            diffuse_maps.push(self.process_texture(context, file)?);
        }
        let mut specular_maps = Vec::with_capacity(source.specular.len());
        for file in source.textures(TextureKind::Specular) {
            specular_maps.push(self.process_texture(context, file)?);
        }

        let material = context
            .resources
            .materials_mut()
            .insert(key, Material::new(shininess, diffuse_maps, specular_maps))?;
        context.counters.materials += 1;
        Ok(material)
    }

    fn process_texture(&self, context: &mut LoadContext<'_>, file: &str) -> Result<Arc<Texture>> {
        let key = ResourceKey::texture(context.dir, file);
        if context.resources.textures().contains(&key) {
            return context.resources.texture(&key);
        }

        let path = context.dir.join(file);
        let device = context.resources.device().clone();
        let settings = self.config.texture;
        let texture = context
            .resources
            .textures_mut()
            .load(key, || Texture::from_file(&device, &path, &settings))?;

        context.counters.textures += 1;
        if texture.is_placeholder() {
            context.counters.placeholders += 1;
        }
        Ok(texture)
    }
}

#[cfg(test)]
#[path = "scene_loader_tests.rs"]
mod tests;
