/// Mesh node resource
///
/// One node of a loaded model: shared meshes, shared child nodes and a
/// local transform relative to the parent. Nodes only point down the tree,
/// so a loaded hierarchy cannot contain a cycle.

use std::sync::Arc;
use glam::Mat4;
use crate::error::Result;
use crate::resource::{Mesh, Shader};

#[derive(Debug)]
pub struct MeshNode {
    meshes: Vec<Arc<Mesh>>,
    children: Vec<Arc<MeshNode>>,
    offset: Mat4,
}

impl MeshNode {
    pub fn new(meshes: Vec<Arc<Mesh>>, children: Vec<Arc<MeshNode>>, offset: Mat4) -> Self {
        Self {
            meshes,
            children,
            offset,
        }
    }

    pub fn meshes(&self) -> &[Arc<Mesh>] {
        &self.meshes
    }

    pub fn children(&self) -> &[Arc<MeshNode>] {
        &self.children
    }

    /// Local transform relative to the parent
    pub fn offset(&self) -> Mat4 {
        self.offset
    }

    /// Draw this node and its subtree
    ///
    /// `model` is set to `parent * offset` before this node's meshes are
    /// drawn; children receive that product as their parent transform.
    pub fn draw(&self, shader: &Shader, parent: Mat4) -> Result<()> {
        let model = parent * self.offset;
        shader.use_program()?;
        shader.set_uniform("model", model)?;
        for mesh in &self.meshes {
            mesh.draw(shader)?;
        }
        for child in &self.children {
            child.draw(shader, model)?;
        }
        Ok(())
    }

    /// Pre-order traversal of this node and every descendant
    pub fn depth_first(&self) -> DepthFirst<'_> {
        DepthFirst { stack: vec![self] }
    }

    /// Nodes in this subtree, this one included
    pub fn node_count(&self) -> usize {
        self.depth_first().count()
    }

    /// Mesh references in this subtree (a shared mesh counts once per reference)
    pub fn mesh_count(&self) -> usize {
        self.depth_first().map(|node| node.meshes.len()).sum()
    }
}

/// Iterator returned by `MeshNode::depth_first`
pub struct DepthFirst<'a> {
    stack: Vec<&'a MeshNode>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = &'a MeshNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev().map(|child| child.as_ref()));
        Some(node)
    }
}

#[cfg(test)]
#[path = "mesh_node_tests.rs"]
mod tests;
