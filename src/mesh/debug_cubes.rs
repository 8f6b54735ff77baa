//! Per-voxel cube visualization of a field

use super::surface::{MeshSurface, SurfaceRole, TerrainMesh};
use crate::core::types::{Vec3, Vec4};
use crate::terrain::field::VoxelField;

/// Voxels with a smaller magnitude are not drawn
pub const DEBUG_MIN_MAGNITUDE: f32 = 0.05;

const POSITIVE_COLOR: Vec4 = Vec4::new(0.0, 1.0, 0.0, 1.0);
const NEGATIVE_COLOR: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);

/// Outward normal and the four corners (counter-clockwise seen from outside)
/// of each face of a unit cube centred on the origin.
const FACES: [(Vec3, [Vec3; 4]); 6] = [
    (Vec3::NEG_Z, [Vec3::new(-1.0, -1.0, -1.0), Vec3::new(-1.0, 1.0, -1.0), Vec3::new(1.0, 1.0, -1.0), Vec3::new(1.0, -1.0, -1.0)]),
    (Vec3::Z, [Vec3::new(-1.0, -1.0, 1.0), Vec3::new(1.0, -1.0, 1.0), Vec3::new(1.0, 1.0, 1.0), Vec3::new(-1.0, 1.0, 1.0)]),
    (Vec3::NEG_X, [Vec3::new(-1.0, -1.0, -1.0), Vec3::new(-1.0, -1.0, 1.0), Vec3::new(-1.0, 1.0, 1.0), Vec3::new(-1.0, 1.0, -1.0)]),
    (Vec3::X, [Vec3::new(1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, -1.0), Vec3::new(1.0, 1.0, 1.0), Vec3::new(1.0, -1.0, 1.0)]),
    (Vec3::NEG_Y, [Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, -1.0, -1.0), Vec3::new(1.0, -1.0, 1.0), Vec3::new(-1.0, -1.0, 1.0)]),
    (Vec3::Y, [Vec3::new(-1.0, 1.0, -1.0), Vec3::new(-1.0, 1.0, 1.0), Vec3::new(1.0, 1.0, 1.0), Vec3::new(1.0, 1.0, -1.0)]),
];

fn push_cube(surface: &mut MeshSurface, center: Vec3, half_extent: f32, color: Vec4) {
    for (normal, corners) in FACES {
        let [a, b, c, d] = corners.map(|corner| center + corner * half_extent);
        surface.push_triangle([a, b, c], normal, Some(color));
        surface.push_triangle([a, c, d], normal, Some(color));
    }
}

/// One cube per voxel with `|v| >= 0.05`: centred at `coord * scale`, half
/// extent `|v| * 0.5`, green for positive values and red otherwise.
pub fn generate_debug_mesh(field: &VoxelField, scale: f32) -> TerrainMesh {
    let mut surface = MeshSurface::with_colors(SurfaceRole::Debug);

    for (index, &value) in field.values().iter().enumerate() {
        if value.abs() < DEBUG_MIN_MAGNITUDE {
            continue;
        }
        let center = field.index_to_coord(index).as_vec3() * scale;
        let color = if value > 0.0 { POSITIVE_COLOR } else { NEGATIVE_COLOR };
        push_cube(&mut surface, center, value.abs() * 0.5, color);
    }

    log::debug!("Debug mesh: {} cubes", surface.triangle_count() / 12);
    TerrainMesh::new(vec![surface])
}
