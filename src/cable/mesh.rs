//! Tube extrusion along the particle chain

use std::f32::consts::TAU;

use glam::{Affine3A, Vec2, Vec3};

use super::config::CableConfig;
use super::sim::CableParticle;
use crate::mesh::{MeshSurface, SurfaceRole};

/// Ring basis at one point: `(up, right)`, both unit length and perpendicular
/// to `along`.
///
/// The up reference is world Y unless the tangent is mostly vertical, in which
/// case it is crossed from the dominant horizontal axis.
pub fn ring_basis(along: Vec3) -> (Vec3, Vec3) {
    let reference = if along.y.abs() > along.x.abs().max(along.z.abs()) {
        if along.x.abs() > along.z.abs() {
            along.cross(Vec3::NEG_Z)
        } else {
            along.cross(Vec3::X)
        }
    } else {
        Vec3::Y
    };

    let right = along.cross(reference).normalize_or(Vec3::X);
    let up = right.cross(along).normalize_or(Vec3::Y);
    (up, right)
}

/// Index of the vertex `around` on ring `along`
fn vertex_index(along: usize, around: usize, sides: usize) -> u32 {
    (along * (sides + 1) + around) as u32
}

/// Extrude a tube of diameter `config.width` through the particles.
///
/// Each ring has `sides + 1` vertices; the first and last share a position but
/// carry different UVs (`u` along the cable, `v` around it). Positions are
/// mapped through `to_local`.
pub fn build_tube(particles: &[CableParticle], config: &CableConfig, to_local: &Affine3A) -> MeshSurface {
    let mut surface = MeshSurface::new(SurfaceRole::Tube);
    if particles.len() < 2 {
        return surface;
    }

    let sides = config.side_count();
    let radius = config.width * 0.5;
    let winding = if config.reverse_winding { -1.0 } else { 1.0 };
    let last = particles.len() - 1;
    let mut previous_along = Vec3::X;

    for (point, particle) in particles.iter().enumerate() {
        let (from, to) = if point == last { (point - 1, point) } else { (point, point + 1) };
        let along = (particles[to].position - particles[from].position).normalize_or(previous_along);
        previous_along = along;

        let (up, right) = ring_basis(along);
        let along_frac = point as f32 / last as f32;

        for around in 0..=sides {
            let around_frac = around as f32 / sides as f32;
            let angle = TAU * around_frac;
            let out = up * angle.cos() + right * (winding * angle.sin());

            surface.push_vertex(
                to_local.transform_point3(particle.position + out * radius),
                to_local.transform_vector3(out).normalize_or_zero(),
                Vec2::new(along_frac, around_frac),
                None,
            );
        }
    }

    for segment in 0..last {
        for side in 0..sides {
            let tl = vertex_index(segment, side, sides);
            let bl = vertex_index(segment, side + 1, sides);
            let tr = vertex_index(segment + 1, side, sides);
            let br = vertex_index(segment + 1, side + 1, sides);
            surface.indices.extend_from_slice(&[tl, bl, tr, bl, br, tr]);
        }
    }

    surface
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_chain(count: usize, direction: Vec3) -> Vec<CableParticle> {
        (0..count)
            .map(|i| CableParticle {
                position: direction * i as f32,
                previous_position: direction * i as f32,
                is_pinned: false,
            })
            .collect()
    }

    #[test]
    fn test_ring_basis_orthonormal() {
        for along in [Vec3::X, Vec3::Y, Vec3::NEG_Y, Vec3::new(0.6, 0.8, 0.0), Vec3::new(0.1, -0.9, 0.3).normalize()] {
            let (up, right) = ring_basis(along);
            assert!((up.length() - 1.0).abs() < 1e-5);
            assert!((right.length() - 1.0).abs() < 1e-5);
            assert!(up.dot(along).abs() < 1e-5, "{:?}", along);
            assert!(right.dot(along).abs() < 1e-5);
            assert!(up.dot(right).abs() < 1e-5);
        }
    }

    #[test]
    fn test_horizontal_cable_keeps_world_up() {
        let (up, _) = ring_basis(Vec3::Z);
        assert!((up - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_tube_topology() {
        let config = CableConfig {
            segments: 4,
            sides: 6,
            ..Default::default()
        };
        let particles = straight_chain(5, Vec3::X);
        let surface = build_tube(&particles, &config, &Affine3A::IDENTITY);

        assert_eq!(surface.vertex_count(), 5 * 7);
        assert_eq!(surface.triangle_count(), 2 * 4 * 6);
        assert!(surface.indices.iter().all(|&i| (i as usize) < surface.vertex_count()));
    }

    #[test]
    fn test_ring_radius_and_uvs() {
        let config = CableConfig {
            segments: 2,
            sides: 4,
            width: 0.5,
            ..Default::default()
        };
        let particles = straight_chain(3, Vec3::X);
        let surface = build_tube(&particles, &config, &Affine3A::IDENTITY);

        for (i, p) in surface.positions.iter().enumerate() {
            let center = particles[i / 5].position;
            assert!(((*p - center).length() - 0.25).abs() < 1e-5);
        }
        // Seam vertices share a position but not a UV
        assert!((surface.positions[0] - surface.positions[4]).length() < 1e-5);
        assert_eq!(surface.uvs[0], Vec2::new(0.0, 0.0));
        assert_eq!(surface.uvs[4], Vec2::new(0.0, 1.0));
        assert_eq!(surface.uvs[14], Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_normals_point_outward() {
        let config = CableConfig::default();
        let particles = straight_chain(9, Vec3::new(0.0, -0.5, 0.1));
        let surface = build_tube(&particles, &config, &Affine3A::IDENTITY);
        for (i, (p, n)) in surface.positions.iter().zip(&surface.normals).enumerate() {
            let center = particles[i / 9].position;
            assert!(n.dot(*p - center) > 0.0);
        }
    }

    #[test]
    fn test_reverse_winding_mirrors_ring() {
        let particles = straight_chain(2, Vec3::X);
        let forward = build_tube(&particles, &CableConfig { segments: 1, ..Default::default() }, &Affine3A::IDENTITY);
        let reversed = build_tube(
            &particles,
            &CableConfig { segments: 1, reverse_winding: true, ..Default::default() },
            &Affine3A::IDENTITY,
        );

        let (up, _) = ring_basis(Vec3::X);
        // Quarter turn goes to opposite sides of the up axis
        let a = forward.positions[2] - particles[0].position;
        let b = reversed.positions[2] - particles[0].position;
        assert!((a + b).dot(up).abs() < 1e-5 || (a + b).length() < 1e-5);
        assert!((a - b).length() > 0.1);
    }

    #[test]
    fn test_local_space_output() {
        let particles = straight_chain(2, Vec3::X);
        let to_local = Affine3A::from_translation(Vec3::new(0.0, -10.0, 0.0));
        let surface = build_tube(&particles, &CableConfig { segments: 1, ..Default::default() }, &to_local);
        let bounds = surface.bounds().expect("bounds");
        assert!(bounds.center().y < -9.0);
    }

    #[test]
    fn test_single_particle_is_empty() {
        let particles = straight_chain(1, Vec3::X);
        assert!(build_tube(&particles, &CableConfig::default(), &Affine3A::IDENTITY).is_empty());
    }
}
