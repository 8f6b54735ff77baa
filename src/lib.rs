//! Procedural geometry for a game scene: sculptable marching-cubes voxel
//! terrain, a Verlet cable and a Perlin heightfield patch.
//!
//! Generators hand finished meshes to a host through the traits in
//! [`scene`]. [`scene::LocalScene`] is an in-memory host for tools and tests.

pub mod core;
pub mod math;
pub mod mesh;
pub mod terrain;
pub mod scene;
pub mod cable;
pub mod landscape;
