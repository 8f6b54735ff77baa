//! Perlin heightfield landscape
//!
//! A flat-shaded square patch of tiles centred on the node origin. Heights
//! come from 3D Perlin noise sampled at integer grid coordinates, with the
//! seed as the third axis.

pub mod config;

pub use config::LandscapeConfig;

use glam::Vec3;
use noise::{NoiseFn, Perlin};

use crate::mesh::{MeshSurface, SurfaceRole, TerrainMesh};
use crate::scene::MeshSink;

/// Generator node for a [`LandscapeConfig`] patch.
pub struct PerlinLandscape {
    pub config: LandscapeConfig,
    /// Rebuild on the next frame
    pub needs_generation: bool,
    noise: Perlin,
    mesh: Option<TerrainMesh>,
}

impl PerlinLandscape {
    pub fn new(config: LandscapeConfig) -> Self {
        Self {
            config,
            needs_generation: true,
            noise: Perlin::new(0),
            mesh: None,
        }
    }

    pub fn mesh(&self) -> Option<&TerrainMesh> {
        self.mesh.as_ref()
    }

    /// Height at grid coordinate `(x, y)`
    pub fn height_at(&self, x: u32, y: u32) -> f32 {
        let c = &self.config;
        let raw = self.noise.get([
            (x as f32 * c.scale_factor) as f64,
            (y as f32 * c.scale_factor) as f64,
            c.seed as f64,
        ]) as f32;
        raw.clamp(c.bottom.min(c.top), c.top) * c.height
    }

    /// Build the tile mesh: two triangles per tile, each with its own face normal.
    pub fn build_mesh(&self) -> TerrainMesh {
        let resolution = self.config.resolution();
        let tile = self.config.tile_size;
        let half = self.config.chunk_size * 0.5;

        let mut surface = MeshSurface::new(SurfaceRole::Landscape);
        surface.material = self.config.material;

        for x in 0..resolution {
            for y in 0..resolution {
                let start_x = x as f32 * tile - half;
                let start_z = y as f32 * tile - half;

                let tl = Vec3::new(start_x, self.height_at(x, y), start_z);
                let bl = Vec3::new(start_x, self.height_at(x, y + 1), start_z + tile);
                let br = Vec3::new(start_x + tile, self.height_at(x + 1, y + 1), start_z + tile);
                let tr = Vec3::new(start_x + tile, self.height_at(x + 1, y), start_z);

                push_face(&mut surface, [bl, br, tl]);
                push_face(&mut surface, [tl, br, tr]);
            }
        }

        log::debug!(
            "Landscape: {}x{} tiles, {} triangles",
            resolution,
            resolution,
            surface.triangle_count()
        );
        TerrainMesh::new(vec![surface])
    }

    /// Per-frame update: rebuild and commit once after each request.
    pub fn on_frame(&mut self, sink: &mut dyn MeshSink) {
        if !self.needs_generation {
            return;
        }
        self.needs_generation = false;

        let mesh = self.build_mesh();
        sink.commit_mesh(&mesh);
        self.mesh = Some(mesh);
    }
}

impl Default for PerlinLandscape {
    fn default() -> Self {
        Self::new(LandscapeConfig::default())
    }
}

fn push_face(surface: &mut MeshSurface, corners: [Vec3; 3]) {
    let [a, b, c] = corners;
    let normal = (b - a).cross(c - a).normalize_or_zero();
    surface.push_triangle(corners, normal, None);
}
