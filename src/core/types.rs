//! Core type aliases and re-exports

pub use glam::{
    Vec2, Vec3, Vec4,
    IVec3,
    Affine3A,
};

/// Standard Result type for the crate
pub type Result<T> = std::result::Result<T, crate::core::error::Error>;

/// Linear RGBA color, components in [0, 1]
pub type Rgba = [f32; 4];

/// Opaque white, the fallback color for uncolored or unknown voxels
pub const WHITE: Rgba = [1.0, 1.0, 1.0, 1.0];

/// World-space up axis
pub const UP: Vec3 = Vec3::Y;
