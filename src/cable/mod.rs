//! Verlet rope simulation rendered as an extruded tube

pub mod config;
pub mod sim;
pub mod mesh;

pub use config::CableConfig;
pub use sim::{CableParticle, CableSim, DEFAULT_GRAVITY, SUBSTEP, solve_distance_constraint};
pub use mesh::build_tube;
