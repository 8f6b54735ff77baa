//! Triangle-mesh collision shapes derived from generated meshes

use super::surface::TerrainMesh;
use crate::core::types::Vec3;
use crate::math::Aabb;

/// Concave collision shape: a flat triangle soup across all surfaces.
#[derive(Clone, Debug, PartialEq)]
pub struct TrimeshShape {
    pub vertices: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl TrimeshShape {
    /// Gather every triangle of `mesh`. Returns `None` for a mesh without
    /// triangles, which leaves any existing collision untouched.
    pub fn from_mesh(mesh: &TerrainMesh) -> Option<Self> {
        if mesh.is_empty() {
            return None;
        }

        let mut vertices = Vec::with_capacity(mesh.triangle_count() * 3);
        for triangle in mesh.triangles() {
            vertices.extend(triangle);
        }
        let indices = (0..vertices.len() as u32).collect();

        Some(Self { vertices, indices })
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().copied())
    }
}
