//! Triangle surfaces handed to the host's mesh sink

use bytemuck::{Pod, Zeroable};

use crate::core::types::{Vec2, Vec3, Vec4};
use crate::math::Aabb;

/// Host-side material handle
pub type MaterialId = u32;

/// What a surface represents; the host picks materials by role
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceRole {
    /// Terrain faces whose normal points mostly up
    Tops,
    /// Every other terrain face
    Sides,
    /// Per-voxel debug cubes
    Debug,
    /// Cable tube
    Tube,
    /// Heightfield tiles
    Landscape,
}

/// Interleaved vertex for GPU upload (48 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    // -- 32 bytes --
    pub color: [f32; 4],
    // -- 16 bytes --
}

/// One indexed triangle list with its own material slot.
///
/// `colors`, when present, has one entry per vertex.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshSurface {
    pub role: SurfaceRole,
    pub material: Option<MaterialId>,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub colors: Option<Vec<Vec4>>,
    pub indices: Vec<u32>,
}

impl MeshSurface {
    /// Empty surface without vertex colors
    pub fn new(role: SurfaceRole) -> Self {
        Self {
            role,
            material: None,
            positions: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
            colors: None,
            indices: Vec::new(),
        }
    }

    /// Empty surface carrying a color per vertex
    pub fn with_colors(role: SurfaceRole) -> Self {
        Self {
            colors: Some(Vec::new()),
            ..Self::new(role)
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append a vertex and return its index. `color` is ignored when the
    /// surface has no color channel; missing colors default to white.
    pub fn push_vertex(&mut self, position: Vec3, normal: Vec3, uv: Vec2, color: Option<Vec4>) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.normals.push(normal);
        self.uvs.push(uv);
        if let Some(colors) = self.colors.as_mut() {
            colors.push(color.unwrap_or(Vec4::ONE));
        }
        index
    }

    /// Append a flat-shaded triangle with unshared vertices.
    pub fn push_triangle(&mut self, corners: [Vec3; 3], normal: Vec3, color: Option<Vec4>) {
        for corner in corners {
            let index = self.push_vertex(corner, normal, Vec2::ZERO, color);
            self.indices.push(index);
        }
    }

    /// Move every triangle of `other` into this surface.
    pub fn append(&mut self, other: MeshSurface) {
        let base = self.positions.len() as u32;
        let other_count = other.positions.len();

        self.positions.extend(other.positions);
        self.normals.extend(other.normals);
        self.uvs.extend(other.uvs);
        if let Some(colors) = self.colors.as_mut() {
            match other.colors {
                Some(c) => colors.extend(c),
                None => colors.extend(std::iter::repeat_n(Vec4::ONE, other_count)),
            }
        }
        self.indices.extend(other.indices.into_iter().map(|i| i + base));
    }

    /// Bounds of all vertex positions
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().copied())
    }

    /// Iterate the triangles as position triples
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| {
            [
                self.positions[t[0] as usize],
                self.positions[t[1] as usize],
                self.positions[t[2] as usize],
            ]
        })
    }

    /// Interleave the vertex streams
    pub fn vertices(&self) -> Vec<Vertex> {
        (0..self.positions.len())
            .map(|i| Vertex {
                position: self.positions[i].to_array(),
                normal: self.normals[i].to_array(),
                uv: self.uvs[i].to_array(),
                color: self
                    .colors
                    .as_ref()
                    .map_or(Vec4::ONE, |c| c[i])
                    .to_array(),
            })
            .collect()
    }

    /// Vertex buffer bytes ready for upload
    pub fn vertex_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.vertices()).to_vec()
    }
}

/// A generated mesh: one or more surfaces, replaced wholesale on rebuild.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TerrainMesh {
    pub surfaces: Vec<MeshSurface>,
}

impl TerrainMesh {
    pub fn new(surfaces: Vec<MeshSurface>) -> Self {
        Self { surfaces }
    }

    /// First surface with the given role
    pub fn surface(&self, role: SurfaceRole) -> Option<&MeshSurface> {
        self.surfaces.iter().find(|s| s.role == role)
    }

    pub fn triangle_count(&self) -> usize {
        self.surfaces.iter().map(MeshSurface::triangle_count).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.surfaces.iter().map(MeshSurface::vertex_count).sum()
    }

    /// True when no surface holds a triangle
    pub fn is_empty(&self) -> bool {
        self.surfaces.iter().all(MeshSurface::is_empty)
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.surfaces
            .iter()
            .filter_map(MeshSurface::bounds)
            .reduce(|a, b| a.merged(&b))
    }

    /// Every triangle of every surface
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.surfaces.iter().flat_map(MeshSurface::triangles)
    }

    /// Mean of the per-surface vertex averages. Empty surfaces are skipped.
    pub fn surface_midpoint(&self) -> Vec3 {
        let averages: Vec<Vec3> = self
            .surfaces
            .iter()
            .filter(|s| !s.positions.is_empty())
            .map(|s| s.positions.iter().copied().sum::<Vec3>() / s.positions.len() as f32)
            .collect();

        if averages.is_empty() {
            return Vec3::ZERO;
        }
        averages.iter().copied().sum::<Vec3>() / averages.len() as f32
    }

    /// Copy of the mesh with every vertex moved so the surface midpoint sits
    /// at the origin. Returns the copy and the offset that was subtracted.
    pub fn recentred(&self) -> (TerrainMesh, Vec3) {
        let midpoint = self.surface_midpoint();
        let mut baked = self.clone();
        for surface in &mut baked.surfaces {
            surface.positions.iter_mut().for_each(|p| *p -= midpoint);
        }
        (baked, midpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_surface(role: SurfaceRole, offset: Vec3) -> MeshSurface {
        let mut surface = MeshSurface::new(role);
        surface.push_triangle(
            [offset, offset + Vec3::X, offset + Vec3::Z],
            Vec3::Y,
            None,
        );
        surface
    }

    #[test]
    fn test_vertex_size() {
        assert_eq!(std::mem::size_of::<Vertex>(), 48);
    }

    #[test]
    fn test_push_triangle() {
        let surface = triangle_surface(SurfaceRole::Tops, Vec3::ZERO);
        assert_eq!(surface.vertex_count(), 3);
        assert_eq!(surface.triangle_count(), 1);
        assert_eq!(surface.indices, vec![0, 1, 2]);
        assert!(surface.normals.iter().all(|&n| n == Vec3::Y));
    }

    #[test]
    fn test_colors_follow_vertices() {
        let mut surface = MeshSurface::with_colors(SurfaceRole::Sides);
        let red = Vec4::new(1.0, 0.0, 0.0, 1.0);
        surface.push_triangle([Vec3::ZERO, Vec3::X, Vec3::Y], Vec3::Z, Some(red));
        surface.push_vertex(Vec3::ONE, Vec3::Z, Vec2::ZERO, None);

        let colors = surface.colors.as_ref().expect("colors");
        assert_eq!(colors.len(), surface.vertex_count());
        assert_eq!(colors[0], red);
        assert_eq!(colors[3], Vec4::ONE);
    }

    #[test]
    fn test_append_offsets_indices() {
        let mut a = triangle_surface(SurfaceRole::Sides, Vec3::ZERO);
        let b = triangle_surface(SurfaceRole::Sides, Vec3::ONE);
        a.append(b);
        assert_eq!(a.triangle_count(), 2);
        assert_eq!(&a.indices[3..], &[3, 4, 5]);
        assert_eq!(a.triangles().nth(1).expect("second")[0], Vec3::ONE);
    }

    #[test]
    fn test_vertex_bytes() {
        let surface = triangle_surface(SurfaceRole::Tops, Vec3::ZERO);
        let bytes = surface.vertex_bytes();
        assert_eq!(bytes.len(), 3 * 48);

        let second: Vertex = bytemuck::pod_read_unaligned(&bytes[48..96]);
        assert_eq!(second.position, [1.0, 0.0, 0.0]);
        assert_eq!(second.color, [1.0; 4]);
    }

    #[test]
    fn test_mesh_counts_and_bounds() {
        let mesh = TerrainMesh::new(vec![
            triangle_surface(SurfaceRole::Tops, Vec3::ZERO),
            triangle_surface(SurfaceRole::Sides, Vec3::splat(2.0)),
            MeshSurface::new(SurfaceRole::Debug),
        ]);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(!mesh.is_empty());

        let bounds = mesh.bounds().expect("bounds");
        assert_eq!(bounds.min, Vec3::ZERO);
        assert_eq!(bounds.max, Vec3::new(3.0, 2.0, 3.0));
        assert!(mesh.surface(SurfaceRole::Sides).is_some());
    }

    #[test]
    fn test_recentred_moves_midpoint_to_origin() {
        let mesh = TerrainMesh::new(vec![
            triangle_surface(SurfaceRole::Tops, Vec3::splat(3.0)),
            triangle_surface(SurfaceRole::Sides, Vec3::splat(9.0)),
            MeshSurface::new(SurfaceRole::Debug),
        ]);
        let (baked, offset) = mesh.recentred();

        // Per-surface averages (3.33, 3, 3.33) and (9.33, 9, 9.33)
        let expected = Vec3::new(6.0 + 1.0 / 3.0, 6.0, 6.0 + 1.0 / 3.0);
        assert!((offset - expected).length() < 1e-5);
        assert!(baked.surface_midpoint().length() < 1e-5);
        assert_eq!(baked.triangle_count(), mesh.triangle_count());
    }

    #[test]
    fn test_recentred_empty_mesh() {
        let (baked, offset) = TerrainMesh::default().recentred();
        assert_eq!(offset, Vec3::ZERO);
        assert!(baked.is_empty());
    }
}
