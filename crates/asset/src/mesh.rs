//! CPU-side mesh representation used by loaders.

use corelib::Vec3;

/// Up to four bone influences for a skinned vertex.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VertexSkin {
    pub bones: [u16; 4],
    pub weights: [f32; 4],
}

/// Vertex with position/normal/uv. Values are in object space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub skin: Option<VertexSkin>,
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
            skin: None,
        }
    }

    pub fn with_skin(mut self, skin: VertexSkin) -> Self {
        self.skin = Some(skin);
        self
    }
}

/// Indexed triangle mesh with tightly-packed vertices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// Object or group name the mesh came from, if any.
    pub name: Option<String>,
    /// Index into the owning model's material list.
    pub material: Option<usize>,
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        Self {
            name: None,
            material: None,
            vertices,
            indices,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns `true` if both buffers are non-empty, indices form whole
    /// triangles and every index is in bounds.
    pub fn is_valid(&self) -> bool {
        !self.vertices.is_empty()
            && !self.indices.is_empty()
            && self.indices.len() % 3 == 0
            && self
                .indices
                .iter()
                .all(|&i| (i as usize) < self.vertices.len())
    }

    /// Axis-aligned bounds of the vertex positions as `(min, max)`.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut positions = self.vertices.iter().map(|v| Vec3::from(v.position));
        let first = positions.next()?;
        Some(positions.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }
}
