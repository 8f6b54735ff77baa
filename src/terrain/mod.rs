//! Editable voxel terrain: field storage, sculpting, noise fill, persistence
//! and the controller that ties them to a host scene.

pub mod field;
pub mod grid;
pub mod generator;
pub mod edit;
pub mod persist;
pub mod config;
pub mod controller;

pub use field::VoxelField;
pub use grid::GridMapping;
pub use generator::{FieldNoise, NoiseFillParams, fill_with_noise};
pub use edit::{EditCommand, ToolKind};
pub use config::TerrainConfig;
pub use controller::TerrainController;
