//! Verlet particle chain with distance constraints

use glam::{Affine3A, Vec3};

use super::config::CableConfig;
use super::mesh::build_tube;
use crate::mesh::TerrainMesh;
use crate::scene::MeshSink;

/// Fixed simulation substep in seconds
pub const SUBSTEP: f32 = 0.02;

/// Gravity used when the host has no opinion
pub const DEFAULT_GRAVITY: Vec3 = Vec3::new(0.0, -9.8, 0.0);

/// Shorter particle separations are left alone by the solver
const MIN_DISTANCE: f32 = 1e-6;

/// One simulated point, in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CableParticle {
    pub position: Vec3,
    pub previous_position: Vec3,
    pub is_pinned: bool,
}

impl CableParticle {
    fn at(position: Vec3) -> Self {
        Self {
            position,
            previous_position: position,
            is_pinned: false,
        }
    }
}

/// Move one or both particles so they sit `rest_length` apart. Pinned
/// particles never move.
pub fn solve_distance_constraint(a: &mut CableParticle, b: &mut CableParticle, rest_length: f32) {
    let delta = b.position - a.position;
    let distance = delta.length();
    if distance < MIN_DISTANCE {
        return;
    }
    let error = (distance - rest_length) / distance;

    match (a.is_pinned, b.is_pinned) {
        (false, false) => {
            a.position += delta * error * 0.5;
            b.position -= delta * error * 0.5;
        }
        (false, true) => a.position += delta * error,
        (true, false) => b.position -= delta * error,
        (true, true) => {}
    }
}

/// A hanging cable: `segments + 1` particles between two optional
/// attachment points.
#[derive(Clone, Debug)]
pub struct CableSim {
    pub config: CableConfig,
    /// Host transform mapping local attachment locations to world space
    pub transform: Affine3A,
    particles: Vec<CableParticle>,
    time_remainder: f32,
}

impl CableSim {
    pub fn new(config: CableConfig) -> Self {
        Self::with_transform(config, Affine3A::IDENTITY)
    }

    pub fn with_transform(config: CableConfig, transform: Affine3A) -> Self {
        let mut sim = Self {
            config,
            transform,
            particles: Vec::new(),
            time_remainder: 0.0,
        };
        sim.reset();
        sim
    }

    pub fn particles(&self) -> &[CableParticle] {
        &self.particles
    }

    /// Direct access for hosts that perturb the chain (impulses, teleports)
    pub fn particles_mut(&mut self) -> &mut [CableParticle] {
        &mut self.particles
    }

    pub fn to_global(&self, local: Vec3) -> Vec3 {
        self.transform.transform_point3(local)
    }

    pub fn to_local(&self, global: Vec3) -> Vec3 {
        self.transform.inverse().transform_point3(global)
    }

    /// Lay the particles out evenly on the straight line between the two
    /// attachment points, all free and at rest.
    pub fn reset(&mut self) {
        let segments = self.config.segment_count();
        let start = self.to_global(self.config.start_location);
        let end = self.to_global(self.config.end_location);

        self.particles = (0..=segments)
            .map(|i| CableParticle::at(start.lerp(end, i as f32 / segments as f32)))
            .collect();
        self.time_remainder = 0.0;
    }

    fn sync_endpoints(&mut self) {
        if self.particles.len() != self.config.segment_count() + 1 {
            log::debug!("Cable segment count changed to {}, rebuilding", self.config.segment_count());
            self.reset();
        }

        let start = self.to_global(self.config.start_location);
        let end = self.to_global(self.config.end_location);
        let (start_attached, end_attached) = (self.config.start_attached, self.config.end_attached);

        if let Some(first) = self.particles.first_mut() {
            pin(first, start_attached, start);
        }
        if let Some(last) = self.particles.last_mut() {
            pin(last, end_attached, end);
        }
    }

    /// Advance the simulation by `dt` seconds in fixed substeps. Returns the
    /// number of substeps taken; leftover time carries to the next call.
    pub fn step(&mut self, dt: f32, gravity: Vec3) -> u32 {
        self.sync_endpoints();

        self.time_remainder += dt.max(0.0);
        let mut substeps = 0;
        while self.time_remainder >= SUBSTEP {
            self.integrate(SUBSTEP, gravity);
            self.solve_constraints();
            self.time_remainder -= SUBSTEP;
            substeps += 1;
        }

        // Free endpoints drag their attachment locations along
        if !self.config.start_attached {
            if let Some(first) = self.particles.first() {
                self.config.start_location = self.to_local(first.position);
            }
        }
        if !self.config.end_attached {
            if let Some(last) = self.particles.last() {
                self.config.end_location = self.to_local(last.position);
            }
        }

        substeps
    }

    /// Verlet integration of every free particle.
    pub fn integrate(&mut self, substep: f32, gravity: Vec3) {
        let acceleration = gravity * substep * substep;
        for particle in self.particles.iter_mut().filter(|p| !p.is_pinned) {
            let velocity = particle.position - particle.previous_position;
            particle.previous_position = particle.position;
            particle.position += velocity + acceleration;
        }
    }

    /// One pass over the segment constraints, then the skip-one bending
    /// constraints when the stiffness coefficient exceeds 1. Bending pairs
    /// rest at `stiffness_coefficient * segment_length`, capped at a straight
    /// run of two segments.
    pub fn solve_constraints(&mut self) {
        let rest = self.config.segment_length();

        for i in 0..self.particles.len().saturating_sub(1) {
            let (head, tail) = self.particles.split_at_mut(i + 1);
            solve_distance_constraint(&mut head[i], &mut tail[0], rest);
        }

        if self.config.stiffness_coefficient > 1.0 {
            let bend_rest = self.config.stiffness_coefficient.min(2.0) * rest;
            for i in 0..self.particles.len().saturating_sub(2) {
                let (head, tail) = self.particles.split_at_mut(i + 2);
                solve_distance_constraint(&mut head[i], &mut tail[0], bend_rest);
            }
        }
    }

    /// Point at fraction `alpha` of the chain, interpolated between
    /// neighbouring particles. `alpha` is clamped to [0, 1].
    pub fn position_on_cable(&self, alpha: f32) -> Vec3 {
        let last = self.particles.len().saturating_sub(1);
        let along = alpha.clamp(0.0, 1.0) * last as f32;
        let index = (along.floor() as usize).min(last);
        let t = along - index as f32;

        match (self.particles.get(index), self.particles.get((index + 1).min(last))) {
            (Some(a), Some(b)) => a.position.lerp(b.position, t),
            _ => self.to_global(self.config.start_location),
        }
    }

    /// Sum of squared segment length errors
    pub fn constraint_error(&self) -> f32 {
        let rest = self.config.segment_length();
        self.particles
            .windows(2)
            .map(|w| {
                let e = w[0].position.distance(w[1].position) - rest;
                e * e
            })
            .sum()
    }

    /// Tube mesh in the host's local space
    pub fn mesh(&self) -> TerrainMesh {
        let mut surface = build_tube(&self.particles, &self.config, &self.transform.inverse());
        surface.material = self.config.material;
        TerrainMesh::new(vec![surface])
    }

    /// Entering the scene
    pub fn on_attach(&mut self) {
        self.reset();
    }

    /// Per-frame update: simulate, then hand the tube to the host.
    pub fn on_frame(&mut self, dt: f32, gravity: Vec3, sink: &mut dyn MeshSink) {
        self.step(dt, gravity);
        sink.commit_mesh(&self.mesh());
    }
}

fn pin(particle: &mut CableParticle, attached: bool, location: Vec3) {
    particle.is_pinned = attached;
    if attached {
        particle.position = location;
        particle.previous_position = location;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::LocalScene;

    fn spacings(sim: &CableSim) -> Vec<f32> {
        sim.particles()
            .windows(2)
            .map(|w| w[0].position.distance(w[1].position))
            .collect()
    }

    fn both_pinned(segments: u32, length: f32, end: Vec3) -> CableConfig {
        CableConfig {
            start_attached: true,
            start_location: Vec3::ZERO,
            end_attached: true,
            end_location: end,
            segments,
            length,
            ..Default::default()
        }
    }

    #[test]
    fn test_reset_spacing() {
        let sim = CableSim::new(both_pinned(4, 1.0, Vec3::new(4.0, 0.0, 0.0)));
        assert_eq!(sim.particles().len(), 5);
        for (i, p) in sim.particles().iter().enumerate() {
            assert_eq!(p.position, Vec3::new(i as f32, 0.0, 0.0));
            assert_eq!(p.position, p.previous_position);
            assert!(!p.is_pinned);
        }
    }

    #[test]
    fn test_constraint_split() {
        let mut a = CableParticle::at(Vec3::ZERO);
        let mut b = CableParticle::at(Vec3::new(2.0, 0.0, 0.0));
        solve_distance_constraint(&mut a, &mut b, 1.0);
        assert_eq!(a.position, Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(b.position, Vec3::new(1.5, 0.0, 0.0));

        let mut a = CableParticle::at(Vec3::ZERO);
        a.is_pinned = true;
        let mut b = CableParticle::at(Vec3::new(2.0, 0.0, 0.0));
        solve_distance_constraint(&mut a, &mut b, 1.0);
        assert_eq!(a.position, Vec3::ZERO);
        assert_eq!(b.position, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_coincident_particles_untouched() {
        let mut a = CableParticle::at(Vec3::ONE);
        let mut b = CableParticle::at(Vec3::ONE);
        solve_distance_constraint(&mut a, &mut b, 1.0);
        assert!(a.position.is_finite() && b.position.is_finite());
    }

    #[test]
    fn test_constraint_convergence() {
        let end = Vec3::new(2.0, 0.0, 0.0);
        let mut sim = CableSim::new(both_pinned(8, 2.0, end));
        sim.sync_endpoints();

        // Zig-zag the interior across the line
        for (i, p) in sim.particles_mut().iter_mut().enumerate().skip(1).take(7) {
            let side = if i % 2 == 0 { 0.1 } else { -0.1 };
            p.position = Vec3::new(0.25 * i as f32, side, 0.0);
        }

        let mut errors = vec![sim.constraint_error()];
        for _ in 0..500 {
            sim.solve_constraints();
            errors.push(sim.constraint_error());
        }
        for pair in errors.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-9, "error grew: {:?}", errors);
        }
        for spacing in spacings(&sim) {
            assert!((spacing - 0.25).abs() < 1e-3, "spacing {}", spacing);
        }
    }

    #[test]
    fn test_endpoint_pin_exact() {
        let transform = Affine3A::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let config = CableConfig {
            start_location: Vec3::new(0.5, 0.0, 0.0),
            ..Default::default()
        };
        let mut sim = CableSim::with_transform(config, transform);

        for _ in 0..10 {
            sim.step(0.05, DEFAULT_GRAVITY);
            let first = sim.particles()[0];
            assert_eq!(first.position, Vec3::new(1.5, 2.0, 3.0));
            assert!(first.is_pinned);
        }
    }

    #[test]
    fn test_eight_segment_scenario() {
        let mut sim = CableSim::new(both_pinned(8, 2.0, Vec3::new(2.0, 0.0, 0.0)));
        for _ in 0..200 {
            sim.step(1.0 / 60.0, Vec3::ZERO);
        }
        for spacing in spacings(&sim) {
            assert!((spacing - 0.25).abs() < 1e-4, "spacing {}", spacing);
        }
    }

    #[test]
    fn test_substep_accumulator() {
        let mut sim = CableSim::new(CableConfig::default());
        assert_eq!(sim.step(0.01, DEFAULT_GRAVITY), 0);
        assert_eq!(sim.step(0.015, DEFAULT_GRAVITY), 1);
        assert_eq!(sim.step(0.1, DEFAULT_GRAVITY), 5);
    }

    #[test]
    fn test_free_end_falls_and_copies_back() {
        let config = CableConfig {
            end_location: Vec3::new(1.0, 0.0, 0.0),
            ..Default::default()
        };
        let mut sim = CableSim::new(config);
        for _ in 0..30 {
            sim.step(1.0 / 30.0, DEFAULT_GRAVITY);
        }
        let last = *sim.particles().last().expect("particles");
        assert!(last.position.y < 0.0);
        assert_eq!(sim.config.end_location, last.position);
        assert_eq!(sim.particles()[0].position, Vec3::ZERO);
    }

    #[test]
    fn test_segment_change_rebuilds() {
        let mut sim = CableSim::new(CableConfig::default());
        sim.config.segments = 3;
        sim.step(0.0, DEFAULT_GRAVITY);
        assert_eq!(sim.particles().len(), 4);
    }

    #[test]
    fn test_stiffness_pass() {
        let bent = |stiffness: f32| {
            let config = CableConfig {
                start_attached: false,
                segments: 2,
                length: 2.0,
                stiffness_coefficient: stiffness,
                ..Default::default()
            };
            let mut sim = CableSim::new(config);
            let corners = [Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0)];
            for (p, corner) in sim.particles_mut().iter_mut().zip(corners) {
                p.position = corner;
            }
            sim.solve_constraints();
            sim.particles()[0].position.distance(sim.particles()[2].position)
        };

        // Segments already at rest length: only the bending pass moves anything
        assert!((bent(0.0) - 2.0_f32.sqrt()).abs() < 1e-6);
        assert!((bent(1.5) - 1.5).abs() < 1e-5);
        assert!((bent(2.0) - 2.0).abs() < 1e-5);
        // Past a straight run the bend rest length stops growing
        assert!((bent(3.0) - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_position_on_cable() {
        let sim = CableSim::new(both_pinned(4, 4.0, Vec3::new(4.0, 0.0, 0.0)));
        assert_eq!(sim.position_on_cable(0.0), Vec3::ZERO);
        assert_eq!(sim.position_on_cable(1.0), Vec3::new(4.0, 0.0, 0.0));
        assert!((sim.position_on_cable(0.375) - Vec3::new(1.5, 0.0, 0.0)).length() < 1e-6);
        assert_eq!(sim.position_on_cable(7.0), Vec3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn test_on_frame_commits_tube() {
        let mut sim = CableSim::new(CableConfig::default());
        let mut scene = LocalScene::default();
        sim.on_attach();
        sim.on_frame(0.1, DEFAULT_GRAVITY, &mut scene);

        let mesh = scene.mesh.as_ref().expect("mesh");
        // 8 segments * 8 sides * 2 triangles
        assert_eq!(mesh.triangle_count(), 128);
    }
}
