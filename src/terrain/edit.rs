//! Sculpting operations on a voxel field
//!
//! Every brush scans the integer cube of cells within `ceil(radius / cell_size)`
//! of its center and checks each grid coordinate before touching the field.
//! Nothing is atomic: a brush writes voxel by voxel, and coordinates outside
//! the grid are skipped rather than reported.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::field::VoxelField;
use super::grid::GridMapping;

/// Baseline value written by [`clear`]
pub const CLEAR_VALUE: f32 = 0.0;

/// Editing tool selected by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToolKind {
    #[default]
    Cube,
    Sphere,
    Paint,
    Flatten,
    Ruffle,
}

/// One brush application in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EditCommand {
    pub tool: ToolKind,
    pub center: Vec3,
    pub radius: f32,
    /// Brush strength; sign chooses raise/lower for cube and sphere
    pub power: f32,
    /// Add `power` to the current value instead of replacing it
    pub additive: bool,
    /// Palette index used by [`ToolKind::Paint`]
    pub color: u8,
}

impl EditCommand {
    pub fn new(tool: ToolKind, center: Vec3, radius: f32, power: f32) -> Self {
        Self {
            tool,
            center,
            radius,
            power,
            additive: true,
            color: 0,
        }
    }

    /// Set additive mode (builder pattern)
    pub fn with_additive(mut self, additive: bool) -> Self {
        self.additive = additive;
        self
    }

    /// Set paint color (builder pattern)
    pub fn with_color(mut self, color: u8) -> Self {
        self.color = color;
        self
    }

    /// Apply this command to `field`.
    pub fn apply<R: Rng>(&self, field: &mut VoxelField, mapping: &GridMapping, rng: &mut R) {
        crate::fail_cond!(!mapping.is_valid());
        match self.tool {
            ToolKind::Cube => brush_cube(field, mapping, self.center, self.radius, self.power, self.additive),
            ToolKind::Sphere => brush_sphere(field, mapping, self.center, self.radius, self.power, self.additive),
            ToolKind::Paint => paint_sphere(field, mapping, self.center, self.radius, self.color),
            ToolKind::Flatten => flatten_cube(field, mapping, self.center, self.radius, self.power),
            ToolKind::Ruffle => ruffle_cube(field, mapping, self.center, self.radius, self.power, rng),
        }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Set every voxel in the cube to `power`, or add `power` when additive.
pub fn brush_cube(field: &mut VoxelField, mapping: &GridMapping, center: Vec3, radius: f32, power: f32, additive: bool) {
    for (_, coord) in mapping.scan(center, radius) {
        if !field.are_grid_coordinates_valid(coord) {
            continue;
        }
        let current = field.get(coord);
        let target = if additive { current + power } else { power };
        field.set(coord, target);
    }
}

/// Blend toward `power` (or `current + power`) with a weight of
/// `clamp(|offset| / radius, 0, 1)`.
///
/// The weight grows with distance from the center, so the rim of the brush
/// takes the full effect while the center is untouched.
pub fn brush_sphere(field: &mut VoxelField, mapping: &GridMapping, center: Vec3, radius: f32, power: f32, additive: bool) {
    crate::fail_cond!(radius <= 0.0);
    for (offset, coord) in mapping.scan(center, radius) {
        if !field.are_grid_coordinates_valid(coord) {
            continue;
        }
        let current = field.get(coord);
        let target = if additive { current + power } else { power };
        let alpha = (offset.length() / radius).clamp(0.0, 1.0);
        field.set(coord, lerp(current, target, alpha));
    }
}

/// Set the palette index of every voxel within `radius` of the center.
pub fn paint_sphere(field: &mut VoxelField, mapping: &GridMapping, center: Vec3, radius: f32, color: u8) {
    crate::fail_cond!(!field.use_color());
    for (offset, coord) in mapping.scan(center, radius) {
        if offset.length() > radius || !field.are_grid_coordinates_valid(coord) {
            continue;
        }
        field.set_color_index(coord, color);
    }
}

/// Blend every voxel in the cube toward the value at the exact center by
/// factor `power`.
pub fn flatten_cube(field: &mut VoxelField, mapping: &GridMapping, center: Vec3, radius: f32, power: f32) {
    let target = field.get(mapping.grid_from_world(center));
    for (_, coord) in mapping.scan(center, radius) {
        if !field.are_grid_coordinates_valid(coord) {
            continue;
        }
        let current = field.get(coord);
        field.set(coord, lerp(current, target, power));
    }
}

/// Perturb every voxel by an independent uniform offset in `[-power, +power]`,
/// weighted by `|offset| / radius`.
///
/// The weight is not clamped: cube corners beyond the radius overshoot the
/// perturbed value.
pub fn ruffle_cube<R: Rng>(field: &mut VoxelField, mapping: &GridMapping, center: Vec3, radius: f32, power: f32, rng: &mut R) {
    crate::fail_cond!(radius <= 0.0);
    let amplitude = power.abs();
    for (offset, coord) in mapping.scan(center, radius) {
        if !field.are_grid_coordinates_valid(coord) {
            continue;
        }
        let current = field.get(coord);
        let target = current + rng.random_range(-amplitude..=amplitude);
        let alpha = offset.length() / radius;
        field.set(coord, lerp(current, target, alpha));
    }
}

/// Reset every voxel to [`CLEAR_VALUE`].
pub fn clear(field: &mut VoxelField) {
    field.fill(CLEAR_VALUE);
}

/// Negate every voxel.
pub fn invert_sign(field: &mut VoxelField) {
    field.invert_sign();
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn mapping() -> GridMapping {
        GridMapping::new(Vec3::ZERO, 1.0)
    }

    #[test]
    fn test_cube_replace() {
        let mut field = VoxelField::new(8, 8, 8);
        brush_cube(&mut field, &mapping(), Vec3::splat(4.0), 1.0, 0.75, false);

        assert_eq!(field.get(IVec3::splat(4)), 0.75);
        assert_eq!(field.get(IVec3::new(3, 5, 4)), 0.75);
        assert_eq!(field.get(IVec3::new(6, 4, 4)), 0.0);
        let touched = field.values().iter().filter(|&&v| v != 0.0).count();
        assert_eq!(touched, 27);
    }

    #[test]
    fn test_cube_additive_accumulates_and_clamps() {
        let mut field = VoxelField::new(4, 4, 4);
        let m = mapping();
        brush_cube(&mut field, &m, Vec3::splat(1.0), 0.5, 0.4, true);
        brush_cube(&mut field, &m, Vec3::splat(1.0), 0.5, 0.4, true);
        assert!((field.get(IVec3::ONE) - 0.8).abs() < 1e-6);
        brush_cube(&mut field, &m, Vec3::splat(1.0), 0.5, 0.4, true);
        assert_eq!(field.get(IVec3::ONE), 1.0);
    }

    #[test]
    fn test_cube_near_edge_stays_in_bounds() {
        let mut field = VoxelField::new(3, 3, 3);
        brush_cube(&mut field, &mapping(), Vec3::ZERO, 4.0, -1.0, false);
        assert_eq!(field.values().len(), 27);
        assert!(field.values().iter().all(|&v| v == -1.0));
    }

    #[test]
    fn test_sphere_falloff_grows_outward() {
        let mut field = VoxelField::new(9, 9, 9);
        brush_sphere(&mut field, &mapping(), Vec3::splat(4.0), 2.0, 1.0, false);

        // Center: alpha = 0, untouched
        assert_eq!(field.get(IVec3::splat(4)), 0.0);
        // One cell out: alpha = 0.5
        assert!((field.get(IVec3::new(5, 4, 4)) - 0.5).abs() < 1e-6);
        // On the radius: full effect
        assert_eq!(field.get(IVec3::new(6, 4, 4)), 1.0);
        // Cube corner beyond radius: clamped to full effect
        assert_eq!(field.get(IVec3::new(6, 6, 6)), 1.0);
    }

    #[test]
    fn test_paint_is_spherical() {
        let mut field = VoxelField::new(8, 8, 8);
        field.set_use_color(true);
        paint_sphere(&mut field, &mapping(), Vec3::splat(4.0), 2.0, 5);

        assert_eq!(field.get_color_index(IVec3::splat(4)), 5);
        assert_eq!(field.get_color_index(IVec3::new(6, 4, 4)), 5);
        assert_eq!(field.get_color_index(IVec3::new(6, 6, 6)), 0);
    }

    #[test]
    fn test_paint_without_color_is_noop() {
        let mut field = VoxelField::new(4, 4, 4);
        paint_sphere(&mut field, &mapping(), Vec3::splat(2.0), 2.0, 5);
        assert!(field.color_indices().is_empty());
    }

    #[test]
    fn test_flatten_blends_toward_center_value() {
        let mut field = VoxelField::new(5, 5, 5);
        field.set(IVec3::splat(2), 1.0);
        field.set(IVec3::new(3, 2, 2), -1.0);

        flatten_cube(&mut field, &mapping(), Vec3::splat(2.0), 1.0, 0.5);
        assert_eq!(field.get(IVec3::splat(2)), 1.0);
        assert!((field.get(IVec3::new(3, 2, 2)) - 0.0).abs() < 1e-6);
        assert!((field.get(IVec3::new(1, 1, 1)) - 0.5).abs() < 1e-6);
        assert_eq!(field.get(IVec3::new(4, 4, 4)), 0.0);
    }

    #[test]
    fn test_ruffle_is_deterministic_with_seeded_rng() {
        let m = mapping();
        let mut a = VoxelField::new(6, 6, 6);
        let mut b = VoxelField::new(6, 6, 6);
        ruffle_cube(&mut a, &m, Vec3::splat(3.0), 2.0, 0.3, &mut ChaCha8Rng::seed_from_u64(7));
        ruffle_cube(&mut b, &m, Vec3::splat(3.0), 2.0, 0.3, &mut ChaCha8Rng::seed_from_u64(7));
        assert_eq!(a, b);

        // Center has zero weight
        assert_eq!(a.get(IVec3::splat(3)), 0.0);
        // Corner weight sqrt(12)/2 overshoots but the perturbation stays bounded
        let corner = a.get(IVec3::splat(5));
        assert!(corner.abs() <= 0.3 * 12f32.sqrt() / 2.0 + 1e-5);
    }

    #[test]
    fn test_ruffle_zero_power_is_identity() {
        let mut field = VoxelField::filled(4, 4, 4, 0.25);
        let before = field.clone();
        ruffle_cube(&mut field, &mapping(), Vec3::splat(2.0), 1.0, 0.0, &mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(field, before);
    }

    #[test]
    fn test_clear_and_invert() {
        let mut field = VoxelField::filled(2, 2, 2, 0.5);
        invert_sign(&mut field);
        assert!(field.values().iter().all(|&v| v == -0.5));
        clear(&mut field);
        assert!(field.values().iter().all(|&v| v == CLEAR_VALUE));
    }

    #[test]
    fn test_command_dispatch() {
        let mut field = VoxelField::new(4, 4, 4);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        EditCommand::new(ToolKind::Cube, Vec3::splat(2.0), 0.5, 0.6)
            .with_additive(false)
            .apply(&mut field, &mapping(), &mut rng);
        assert_eq!(field.get(IVec3::splat(2)), 0.6);
    }

    #[test]
    fn test_brush_respects_cell_size() {
        let mut field = VoxelField::new(8, 8, 8);
        let m = GridMapping::new(Vec3::new(-1.0, 0.0, 0.0), 0.5);
        // World (0.5, 1, 1) is grid (3, 2, 2)
        brush_cube(&mut field, &m, Vec3::new(0.5, 1.0, 1.0), 0.5, 1.0, false);
        assert_eq!(field.get(IVec3::new(3, 2, 2)), 1.0);
        assert_eq!(field.get(IVec3::new(4, 3, 3)), 1.0);
        assert_eq!(field.get(IVec3::new(5, 2, 2)), 0.0);
        assert_eq!(field.values().iter().filter(|&&v| v == 1.0).count(), 27);
    }

    #[test]
    fn test_zero_cell_size_is_noop() {
        let mut field = VoxelField::new(4, 4, 4);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for tool in [ToolKind::Cube, ToolKind::Sphere, ToolKind::Flatten, ToolKind::Ruffle] {
            EditCommand::new(tool, Vec3::splat(2.0), 1.0, 0.5)
                .apply(&mut field, &GridMapping::new(Vec3::ZERO, 0.0), &mut rng);
        }
        brush_cube(&mut field, &GridMapping::new(Vec3::ZERO, 0.0), Vec3::ZERO, 1.0, 1.0, false);
        assert!(field.values().iter().all(|&v| v == 0.0));
    }
}
