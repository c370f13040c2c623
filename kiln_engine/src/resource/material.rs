/// Material resource
///
/// A shininess value plus ordered diffuse and specular texture lists. The
/// textures are shared references into the texture cache; a material never
/// owns GPU state of its own.

use std::sync::Arc;
use crate::error::Result;
use crate::resource::{Shader, Texture};

/// Shininess used when a source material does not specify one
pub const DEFAULT_SHININESS: f32 = 64.0;

#[derive(Debug)]
pub struct Material {
    shininess: f32,
    diffuse_maps: Vec<Arc<Texture>>,
    specular_maps: Vec<Arc<Texture>>,
}

impl Material {
    pub fn new(shininess: f32, diffuse_maps: Vec<Arc<Texture>>, specular_maps: Vec<Arc<Texture>>) -> Self {
        Self {
            shininess,
            diffuse_maps,
            specular_maps,
        }
    }

    /// Material without textures
    pub fn untextured(shininess: f32) -> Self {
        Self::new(shininess, Vec::new(), Vec::new())
    }

    pub fn shininess(&self) -> f32 {
        self.shininess
    }

    pub fn diffuse_maps(&self) -> &[Arc<Texture>] {
        &self.diffuse_maps
    }

    pub fn specular_maps(&self) -> &[Arc<Texture>] {
        &self.specular_maps
    }

    /// Diffuse maps then specular maps, in texture-unit order
    pub fn textures(&self) -> impl Iterator<Item = &Arc<Texture>> {
        self.diffuse_maps.iter().chain(self.specular_maps.iter())
    }

    /// Bind every texture and write the material uniforms of `shader`
    ///
    /// Diffuse map `i` goes to unit `i` (`material.texture_diffuse{i}`),
    /// specular map `i` to unit `diffuse count + i`
    /// (`material.texture_specular{i}`).
    pub fn apply(&self, shader: &Shader) -> Result<()> {
        let diffuse_count = self.diffuse_maps.len();
        for (i, texture) in self.diffuse_maps.iter().enumerate() {
            let unit = i as u32;
            texture.bind(unit)?;
            shader.set_uniform(&format!("material.texture_diffuse{}", i), unit as i32)?;
        }
        for (i, texture) in self.specular_maps.iter().enumerate() {
            let unit = (diffuse_count + i) as u32;
            texture.bind(unit)?;
            shader.set_uniform(&format!("material.texture_specular{}", i), unit as i32)?;
        }
        shader.set_uniform("material.shininess", self.shininess)
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
