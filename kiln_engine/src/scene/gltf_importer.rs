/// glTF 2.0 importer
///
/// Reads `.gltf` and `.glb` files with the `gltf` crate. Only buffers are
/// loaded here; images stay file names and are decoded by the scene loader.

use std::path::Path;
use gltf::mesh::Mode;
use rustc_hash::{FxHashMap, FxHashSet};
use crate::error::{Error, Result};
use crate::scene::{
    ImportFlags, SceneImporter, SceneMaterial, SceneMesh, SceneNode, SceneTree,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct GltfImporter;

impl GltfImporter {
    pub fn new() -> Self {
        Self
    }
}

impl SceneImporter for GltfImporter {
    fn import(&self, path: &Path, flags: ImportFlags) -> Result<SceneTree> {
        let gltf::Gltf { document, blob } = gltf::Gltf::open(path)
            .map_err(|err| Error::ImportFailed(format!("cannot parse glTF: {}", err)))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let buffers = gltf::import_buffers(&document, Some(base_dir), blob)
            .map_err(|err| Error::ImportFailed(format!("cannot load buffers: {}", err)))?;

        let materials = document.materials().map(|m| read_material(&m)).collect();

        // Scene mesh indices produced by each glTF mesh, one per kept primitive
        let mut meshes = Vec::new();
        let mut primitives_of = Vec::with_capacity(document.meshes().len());
        for mesh in document.meshes() {
            let mut produced = Vec::new();
            for primitive in mesh.primitives() {
                if let Some(scene_mesh) = read_primitive(&mesh, &primitive, &buffers, flags)? {
                    produced.push(meshes.len());
                    meshes.push(scene_mesh);
                }
            }
            primitives_of.push(produced);
        }

        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| Error::ImportFailed("file contains no scene".to_string()))?;

        let mut root = SceneNode::new("root");
        let mut on_path = FxHashSet::default();
        for node in scene.nodes() {
            root.children.push(read_node(&node, &primitives_of, &mut on_path)?);
        }

        crate::engine_debug!(
            "kiln::GltfImporter",
            "'{}': {} meshes, {} materials",
            path.display(),
            meshes.len(),
            document.materials().len()
        );
        Ok(SceneTree { root, meshes, materials })
    }
}

fn read_node(
    node: &gltf::Node,
    primitives_of: &[Vec<usize>],
    on_path: &mut FxHashSet<usize>,
) -> Result<SceneNode> {
    if !on_path.insert(node.index()) {
        return Err(Error::ImportFailed(format!(
            "node {} is its own ancestor",
            node.index()
        )));
    }

    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node{}", node.index()));
    // glTF matrices are column-major, SceneNode transforms row-major
    let columns = node.transform().matrix();
    let mut transform = [[0.0f32; 4]; 4];
    for (c, column) in columns.iter().enumerate() {
        for (r, value) in column.iter().enumerate() {
            transform[r][c] = *value;
        }
    }

    let mut scene_node = SceneNode::new(name).with_transform(transform);
    if let Some(mesh) = node.mesh() {
        if let Some(produced) = primitives_of.get(mesh.index()) {
            scene_node.meshes.extend_from_slice(produced);
        }
    }
    for child in node.children() {
        scene_node.children.push(read_node(&child, primitives_of, on_path)?);
    }

    on_path.remove(&node.index());
    Ok(scene_node)
}

fn read_material(material: &gltf::Material) -> SceneMaterial {
    let name = material.name().unwrap_or("").to_string();

    let mut diffuse = Vec::new();
    if let Some(info) = material.pbr_metallic_roughness().base_color_texture() {
        match info.texture().source().source() {
            gltf::image::Source::Uri { uri, .. } if !uri.starts_with("data:") => {
                // URIs are percent-encoded; keep the raw text if it does not decode
                let file = urlencoding::decode(uri)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| uri.to_string());
                diffuse.push(file);
            }
            _ => {
                crate::engine_warn!(
                    "kiln::GltfImporter",
                    "Material '{}': embedded base color texture is not supported, skipped",
                    name
                );
            }
        }
    }

    let shininess = material
        .extras()
        .as_ref()
        .and_then(|raw| serde_json::from_str::<serde_json::Value>(raw.get()).ok())
        .and_then(|extras| extras.get("shininess").and_then(serde_json::Value::as_f64))
        .map(|value| value as f32);

    SceneMaterial {
        name,
        diffuse,
        specular: Vec::new(),
        shininess,
    }
}

fn read_primitive(
    mesh: &gltf::Mesh,
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    flags: ImportFlags,
) -> Result<Option<SceneMesh>> {
    let mode = primitive.mode();
    let label = format!(
        "mesh '{}' primitive {}",
        mesh.name().unwrap_or(""),
        primitive.index()
    );
    match mode {
        Mode::Triangles => {}
        Mode::TriangleStrip | Mode::TriangleFan if flags.contains(ImportFlags::TRIANGULATE) => {}
        _ => {
            crate::engine_warn!(
                "kiln::GltfImporter",
                "{}: {:?} primitives are not triangle lists, skipped",
                label,
                mode
            );
            return Ok(None);
        }
    }

    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));
    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or_else(|| Error::ImportFailed(format!("{} has no positions", label)))?
        .collect();
    let normals: Vec<[f32; 3]> = reader
        .read_normals()
        .map(|iter| iter.collect())
        .unwrap_or_default();
    let mut tex_coords: Vec<[f32; 2]> = reader
        .read_tex_coords(0)
        .map(|iter| iter.into_f32().collect())
        .unwrap_or_default();
    for (attribute, len) in [("NORMAL", normals.len()), ("TEXCOORD_0", tex_coords.len())] {
        if len != 0 && len != positions.len() {
            return Err(Error::ImportFailed(format!(
                "{} has {} {} values for {} positions",
                label,
                len,
                attribute,
                positions.len()
            )));
        }
    }

    let indices: Vec<u32> = reader
        .read_indices()
        .map(|iter| iter.into_u32().collect())
        .unwrap_or_else(|| (0..positions.len() as u32).collect());

    let indices = match mode {
        Mode::TriangleStrip => strip_to_list(&indices),
        Mode::TriangleFan => fan_to_list(&indices),
        _ => indices,
    };

    if flags.contains(ImportFlags::FLIP_UVS) {
        for uv in &mut tex_coords {
            uv[1] = 1.0 - uv[1];
        }
    }

    let mut scene_mesh = SceneMesh {
        positions,
        normals,
        tex_coords,
        indices,
        material: primitive.material().index(),
    };
    if flags.contains(ImportFlags::JOIN_IDENTICAL_VERTICES) {
        join_identical_vertices(&mut scene_mesh);
    }
    Ok(Some(scene_mesh))
}

pub(crate) fn strip_to_list(strip: &[u32]) -> Vec<u32> {
    let mut list = Vec::with_capacity(strip.len().saturating_sub(2) * 3);
    for (i, window) in strip.windows(3).enumerate() {
        // Every other triangle is wound the other way
        if i % 2 == 0 {
            list.extend_from_slice(&[window[0], window[1], window[2]]);
        } else {
            list.extend_from_slice(&[window[1], window[0], window[2]]);
        }
    }
    list
}

pub(crate) fn fan_to_list(fan: &[u32]) -> Vec<u32> {
    let Some((&center, rest)) = fan.split_first() else {
        return Vec::new();
    };
    rest.windows(2)
        .flat_map(|pair| [center, pair[0], pair[1]])
        .collect()
}

/// Merge vertices whose attributes are bit-identical and remap the indices
pub(crate) fn join_identical_vertices(mesh: &mut SceneMesh) {
    let has_normals = !mesh.normals.is_empty();
    let has_tex_coords = !mesh.tex_coords.is_empty();

    let mut seen: FxHashMap<[u32; 8], u32> = FxHashMap::default();
    let mut remap = Vec::with_capacity(mesh.positions.len());
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut tex_coords = Vec::new();

    for i in 0..mesh.positions.len() {
        let p = mesh.positions[i];
        let n = mesh.normals.get(i).copied().unwrap_or([0.0; 3]);
        let t = mesh.tex_coords.get(i).copied().unwrap_or([0.0; 2]);
        let bits = [
            p[0].to_bits(), p[1].to_bits(), p[2].to_bits(),
            n[0].to_bits(), n[1].to_bits(), n[2].to_bits(),
            t[0].to_bits(), t[1].to_bits(),
        ];
        let index = *seen.entry(bits).or_insert_with(|| {
            positions.push(p);
            if has_normals {
                normals.push(n);
            }
            if has_tex_coords {
                tex_coords.push(t);
            }
            (positions.len() - 1) as u32
        });
        remap.push(index);
    }

    for index in &mut mesh.indices {
        if let Some(&new_index) = remap.get(*index as usize) {
            *index = new_index;
        }
    }
    mesh.positions = positions;
    mesh.normals = normals;
    mesh.tex_coords = tex_coords;
}

#[cfg(test)]
#[path = "gltf_importer_tests.rs"]
mod tests;
