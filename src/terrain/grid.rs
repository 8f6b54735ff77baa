//! World <-> grid coordinate mapping

use glam::{IVec3, Vec3};

/// Maps world positions onto the corner grid of a voxel field.
///
/// The controller builds one from its origin and mesh scale and hands it to
/// the edit operations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridMapping {
    /// World position of grid coordinate (0, 0, 0)
    pub origin: Vec3,
    /// World units per voxel
    pub cell_size: f32,
}

impl Default for GridMapping {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            cell_size: 1.0,
        }
    }
}

impl GridMapping {
    pub fn new(origin: Vec3, cell_size: f32) -> Self {
        Self { origin, cell_size }
    }

    /// `round((p - origin) / cell_size)`. The result may lie outside the grid;
    /// callers check validity against the field.
    pub fn grid_from_world(&self, world: Vec3) -> IVec3 {
        ((world - self.origin) / self.cell_size).round().as_ivec3()
    }

    /// `coord * cell_size + origin`
    pub fn world_from_grid(&self, coord: IVec3) -> Vec3 {
        coord.as_vec3() * self.cell_size + self.origin
    }

    /// True for a finite, positive cell size
    pub fn is_valid(&self) -> bool {
        self.cell_size.is_finite() && self.cell_size > 0.0 && self.origin.is_finite()
    }

    /// Half edge length, in cells, of the cube scanned by a brush of `radius`.
    /// Zero for an invalid mapping or a non-finite radius.
    pub fn half_range(&self, radius: f32) -> i32 {
        if !self.is_valid() || !radius.is_finite() {
            return 0;
        }
        (radius / self.cell_size).ceil().max(0.0) as i32
    }

    /// World-space offsets of every cell in the brush cube around the center,
    /// paired with the grid coordinate they land on.
    pub fn scan(&self, center: Vec3, radius: f32) -> impl Iterator<Item = (Vec3, IVec3)> + '_ {
        // An invalid mapping scans nothing
        let h = if self.is_valid() { self.half_range(radius) } else { -1 };
        (-h..=h).flat_map(move |x| {
            (-h..=h).flat_map(move |y| {
                (-h..=h).map(move |z| {
                    let offset = IVec3::new(x, y, z).as_vec3() * self.cell_size;
                    (offset, self.grid_from_world(center + offset))
                })
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_with_origin_and_scale() {
        let mapping = GridMapping::new(Vec3::new(10.0, -2.0, 0.5), 0.5);
        let coord = IVec3::new(3, 4, 5);
        let world = mapping.world_from_grid(coord);
        assert_eq!(world, Vec3::new(11.5, 0.0, 3.0));
        assert_eq!(mapping.grid_from_world(world), coord);
    }

    #[test]
    fn test_grid_from_world_rounds() {
        let mapping = GridMapping::default();
        assert_eq!(mapping.grid_from_world(Vec3::new(0.4, 0.6, 2.49)), IVec3::new(0, 1, 2));
        assert_eq!(mapping.grid_from_world(Vec3::new(-0.6, 0.0, 0.0)), IVec3::new(-1, 0, 0));
    }

    #[test]
    fn test_scan_covers_cube() {
        let mapping = GridMapping::new(Vec3::ZERO, 1.0);
        let cells: Vec<_> = mapping.scan(Vec3::splat(5.0), 1.5).collect();
        // ceil(1.5) = 2 -> 5x5x5 offsets
        assert_eq!(cells.len(), 125);
        assert!(cells.iter().any(|&(_, c)| c == IVec3::new(3, 3, 3)));
        assert!(cells.iter().any(|&(_, c)| c == IVec3::new(7, 7, 7)));
    }

    #[test]
    fn test_half_range_uses_cell_size() {
        let mapping = GridMapping::new(Vec3::ZERO, 0.25);
        assert_eq!(mapping.half_range(1.0), 4);
        assert_eq!(mapping.half_range(0.1), 1);
        assert_eq!(mapping.half_range(0.0), 0);
        assert_eq!(mapping.half_range(f32::INFINITY), 0);
    }

    #[test]
    fn test_degenerate_cell_size_scans_nothing() {
        for cell_size in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let mapping = GridMapping::new(Vec3::ZERO, cell_size);
            assert!(!mapping.is_valid());
            assert_eq!(mapping.half_range(1.0), 0);
            assert_eq!(mapping.scan(Vec3::ZERO, 1.0).count(), 0);
        }
        assert!(GridMapping::default().is_valid());
    }
}
