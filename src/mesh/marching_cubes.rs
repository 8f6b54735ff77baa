//! Marching cubes polygonization of a voxel field
//!
//! Every cell `(x, y, z)` in `[0, w) x [0, h) x [0, d)` is bounded by the
//! corners `cell + CORNER_OFFSETS[i]`. Corners on the far faces lie outside
//! the stored data and read as 0.0, so the surface closes against them.
//!
//! Emitted triangles face the negative side of the field: the face normal
//! `(b - a) x (c - a)` points from solid (positive) into empty (negative)
//! space.

use rayon::prelude::*;

use super::surface::{MeshSurface, SurfaceRole, TerrainMesh};
use super::tables::{CORNER_OFFSETS, EDGE_CONNECTIONS, EDGE_TABLE, TRI_TABLE};
use crate::core::types::{IVec3, Rgba, UP, Vec3, Vec4, WHITE};
use crate::terrain::config::DEFAULT_TOPS_THRESHOLD;
use crate::terrain::field::VoxelField;

/// Corner values closer to zero than this count as on the surface
pub const SURFACE_EPSILON: f32 = 1e-5;

/// Triangles with a smaller squared cross product are dropped
const MIN_CROSS_SQ: f32 = 1e-12;

/// The eight corners of one cell
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridCell {
    pub positions: [Vec3; 8],
    pub values: [f32; 8],
    pub colors: [Rgba; 8],
}

impl GridCell {
    /// Gather the corners of the cell whose minimum corner is `cell`.
    pub fn from_field(field: &VoxelField, cell: IVec3) -> Self {
        let mut positions = [Vec3::ZERO; 8];
        let mut values = [0.0; 8];
        let mut colors = [WHITE; 8];

        for (i, offset) in CORNER_OFFSETS.iter().enumerate() {
            let coord = cell + IVec3::new(offset[0] as i32, offset[1] as i32, offset[2] as i32);
            positions[i] = coord.as_vec3();
            (values[i], colors[i]) = corner_sample(field, coord);
        }

        Self { positions, values, colors }
    }

    /// True unless the cell holds a strictly negative and a strictly positive
    /// corner.
    pub fn is_degenerate(&self) -> bool {
        let has_negative = self.values.iter().any(|&v| v < -SURFACE_EPSILON);
        let has_positive = self.values.iter().any(|&v| v > SURFACE_EPSILON);
        !(has_negative && has_positive)
    }

    /// Mean of the eight corner colors
    pub fn average_color(&self) -> Vec4 {
        self.colors.iter().map(|&c| Vec4::from_array(c)).sum::<Vec4>() / 8.0
    }

    /// Gradient of the trilinear interpolant at `p`.
    fn gradient_at(&self, p: Vec3) -> Vec3 {
        let local = p - self.positions[0];
        let mut gradient = Vec3::ZERO;

        for (i, offset) in CORNER_OFFSETS.iter().enumerate() {
            let weight = |axis: usize| if offset[axis] == 1 { local[axis] } else { 1.0 - local[axis] };
            let sign = |axis: usize| if offset[axis] == 1 { 1.0 } else { -1.0 };
            let v = self.values[i];

            gradient.x += v * sign(0) * weight(1) * weight(2);
            gradient.y += v * sign(1) * weight(0) * weight(2);
            gradient.z += v * sign(2) * weight(0) * weight(1);
        }

        gradient
    }
}

/// Value and color of a corner. Corners outside the stored voxels read as 0.0
/// with palette entry 0 (white without a palette); stored voxels with an
/// unknown color index are white.
fn corner_sample(field: &VoxelField, coord: IVec3) -> (f32, Rgba) {
    match field.coord_to_index(coord) {
        None => {
            let color = if field.use_color() {
                field.palette.first().copied().unwrap_or(WHITE)
            } else {
                WHITE
            };
            (0.0, color)
        }
        Some(index) => {
            let value = field.values().get(index).copied().unwrap_or(0.0);
            let color = if field.use_color() {
                field
                    .color_indices()
                    .get(index)
                    .and_then(|&c| field.palette.get(c as usize))
                    .copied()
                    .unwrap_or(WHITE)
            } else {
                WHITE
            };
            (value, color)
        }
    }
}

/// Point on the edge `p1 -> p2` where the field crosses zero.
fn interpolate_vertex(p1: Vec3, p2: Vec3, v1: f32, v2: f32) -> Vec3 {
    if v1.abs() < SURFACE_EPSILON {
        return p1;
    }
    if v2.abs() < SURFACE_EPSILON {
        return p2;
    }
    if (v1 - v2).abs() < SURFACE_EPSILON {
        return p1;
    }
    let t = v1 / (v1 - v2);
    p1 + (p2 - p1) * t
}

/// Triangulate one cell into `out`, returning the number of triangles added
/// (at most five).
///
/// Triangles are wound so that `(b - a) x (c - a)` points toward increasing
/// field values. Degenerate cells and zero-area triangles produce nothing.
pub fn polygonise(cell: &GridCell, out: &mut Vec<[Vec3; 3]>) -> usize {
    if cell.is_degenerate() {
        return 0;
    }

    let mut cube_index = 0;
    for (i, &v) in cell.values.iter().enumerate() {
        if v < 0.0 {
            cube_index |= 1 << i;
        }
    }

    let edges = EDGE_TABLE[cube_index];
    if edges == 0 {
        return 0;
    }

    let mut edge_vertices = [Vec3::ZERO; 12];
    for (i, &[c0, c1]) in EDGE_CONNECTIONS.iter().enumerate() {
        if edges & (1 << i) != 0 {
            edge_vertices[i] = interpolate_vertex(
                cell.positions[c0],
                cell.positions[c1],
                cell.values[c0],
                cell.values[c1],
            );
        }
    }

    let before = out.len();
    for tri in TRI_TABLE[cube_index].chunks_exact(3) {
        if tri[0] < 0 {
            break;
        }
        let a = edge_vertices[tri[0] as usize];
        let mut b = edge_vertices[tri[1] as usize];
        let mut c = edge_vertices[tri[2] as usize];

        let cross = (b - a).cross(c - a);
        if !(cross.length_squared() > MIN_CROSS_SQ) {
            continue;
        }

        let centroid = (a + b + c) / 3.0;
        if cross.dot(cell.gradient_at(centroid)) < 0.0 {
            std::mem::swap(&mut b, &mut c);
        }
        out.push([a, b, c]);
    }

    out.len() - before
}

/// Builds the two-surface terrain mesh from a voxel field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarchingCubesMesher {
    /// World units per voxel
    pub scale: f32,
    /// Minimum normal · up for a face to go into the tops surface
    pub tops_threshold: f32,
}

impl Default for MarchingCubesMesher {
    fn default() -> Self {
        Self {
            scale: 1.0,
            tops_threshold: DEFAULT_TOPS_THRESHOLD,
        }
    }
}

impl MarchingCubesMesher {
    pub fn new(scale: f32) -> Self {
        Self {
            scale,
            ..Default::default()
        }
    }

    pub fn with_tops_threshold(mut self, threshold: f32) -> Self {
        self.tops_threshold = threshold;
        self
    }

    /// Full rebuild. Slabs along x are polygonized in parallel and joined in
    /// x order, so the output matches a sequential x, y, z scan.
    pub fn generate(&self, field: &VoxelField) -> TerrainMesh {
        let start = std::time::Instant::now();

        let slabs: Vec<(MeshSurface, MeshSurface)> = (0..field.width() as i32)
            .into_par_iter()
            .map(|x| self.polygonise_slab(field, x))
            .collect();

        let mut tops = new_surface(SurfaceRole::Tops, field.use_color());
        let mut sides = new_surface(SurfaceRole::Sides, field.use_color());
        for (slab_tops, slab_sides) in slabs {
            tops.append(slab_tops);
            sides.append(slab_sides);
        }

        log::debug!(
            "Meshed {}x{}x{} field: {} tops + {} sides triangles in {:.2}ms",
            field.width(),
            field.height(),
            field.depth(),
            tops.triangle_count(),
            sides.triangle_count(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        TerrainMesh::new(vec![tops, sides])
    }

    fn polygonise_slab(&self, field: &VoxelField, x: i32) -> (MeshSurface, MeshSurface) {
        let use_color = field.use_color();
        let mut tops = new_surface(SurfaceRole::Tops, use_color);
        let mut sides = new_surface(SurfaceRole::Sides, use_color);
        let mut triangles = Vec::with_capacity(5);

        for y in 0..field.height() as i32 {
            for z in 0..field.depth() as i32 {
                let cell = GridCell::from_field(field, IVec3::new(x, y, z));
                triangles.clear();
                if polygonise(&cell, &mut triangles) == 0 {
                    continue;
                }

                let color = use_color.then(|| cell.average_color());
                for &[a, b, c] in &triangles {
                    // Emit 0, 2, 1 so faces turn toward empty space
                    let (a, b, c) = (a * self.scale, c * self.scale, b * self.scale);
                    let normal = (b - a).cross(c - a).normalize_or_zero();

                    let target = if normal.dot(UP) > self.tops_threshold { &mut tops } else { &mut sides };
                    target.push_triangle([a, b, c], normal, color);
                }
            }
        }

        (tops, sides)
    }
}

fn new_surface(role: SurfaceRole, use_color: bool) -> MeshSurface {
    if use_color {
        MeshSurface::with_colors(role)
    } else {
        MeshSurface::new(role)
    }
}
