/// Vertex layout descriptor
///
/// Pure data describing how the bytes of one interleaved vertex map to shader
/// input locations. Offsets and stride are implicit: attributes are packed
/// back to back in ascending location order.

use std::collections::BTreeMap;
use crate::graphics_device::{AttributeType, VertexAttributePointer};

/// One attribute of a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexElement {
    /// Component type
    pub ty: AttributeType,
    /// Number of components
    pub count: u32,
    /// Total size in bytes (component size * count)
    pub size_bytes: u32,
    /// Integer data is normalized when read by the shader
    pub normalized: bool,
}

impl VertexElement {
    pub fn new(ty: AttributeType, count: u32, normalized: bool) -> Self {
        Self {
            ty,
            count,
            size_bytes: ty.size_bytes() * count,
            normalized,
        }
    }
}

/// Ordered set of vertex attributes keyed by shader location
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexLayout {
    elements: BTreeMap<u32, VertexElement>,
}

impl VertexLayout {
    /// Create an empty layout
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute at the location after the highest one in use
    pub fn push(&mut self, ty: AttributeType, count: u32, normalized: bool) -> &mut Self {
        let location = self
            .elements
            .keys()
            .next_back()
            .map_or(0, |last| last + 1);
        self.add_attribute(location, ty, count, normalized)
    }

    /// Place an attribute at an explicit location, replacing any previous one
    pub fn add_attribute(
        &mut self,
        location: u32,
        ty: AttributeType,
        count: u32,
        normalized: bool,
    ) -> &mut Self {
        self.elements.insert(location, VertexElement::new(ty, count, normalized));
        self
    }

    /// Size in bytes of one vertex
    pub fn stride(&self) -> u32 {
        self.elements.values().map(|e| e.size_bytes).sum()
    }

    /// Attributes in location order
    pub fn elements(&self) -> impl Iterator<Item = (u32, &VertexElement)> {
        self.elements.iter().map(|(location, element)| (*location, element))
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Resolve every attribute into a device pointer (location, pointer)
    pub fn attribute_pointers(&self) -> Vec<(u32, VertexAttributePointer)> {
        let stride = self.stride();
        let mut offset = 0;
        self.elements
            .iter()
            .map(|(location, element)| {
                let pointer = VertexAttributePointer {
                    count: element.count,
                    ty: element.ty,
                    normalized: element.normalized,
                    stride,
                    offset,
                };
                offset += element.size_bytes;
                (*location, pointer)
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "vertex_layout_tests.rs"]
mod tests;
