//! Terrain controller settings

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::generator::NoiseFillParams;
use crate::core::config::{load_json, save_json};
use crate::core::Result;

/// Minimum face normal · up for a triangle to land in the tops surface
pub const DEFAULT_TOPS_THRESHOLD: f32 = 0.55;

/// Settings for a [`TerrainController`](super::TerrainController)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// World units per voxel
    pub mesh_scale: f32,
    /// Build a trimesh collision shape after every rebuild
    pub generate_collision: bool,
    /// Emit one cube per voxel instead of the marching-cubes surface
    pub debug_mode: bool,
    /// Accept edits at runtime (outside the editor)
    pub is_destructible: bool,
    pub tops_threshold: f32,
    /// Noise fill used by `randomise`
    pub noise: NoiseFillParams,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            mesh_scale: 1.0,
            generate_collision: true,
            debug_mode: false,
            is_destructible: false,
            tops_threshold: DEFAULT_TOPS_THRESHOLD,
            noise: NoiseFillParams::default(),
        }
    }
}

impl TerrainConfig {
    /// Set the mesh scale. Zero, negative and non-finite scales are ignored.
    pub fn set_mesh_scale(&mut self, scale: f32) {
        crate::fail_cond!(!scale.is_finite() || scale <= 0.0);
        self.mesh_scale = scale;
    }

    /// Copy with a usable mesh scale; a bad one falls back to the default.
    pub fn validated(mut self) -> Self {
        if !self.mesh_scale.is_finite() || self.mesh_scale <= 0.0 {
            log::warn!("Invalid mesh scale {}, using 1.0", self.mesh_scale);
            self.mesh_scale = Self::default().mesh_scale;
        }
        self
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        load_json::<Self>(path).map(Self::validated)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        save_json(path, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TerrainConfig::default();
        assert_eq!(config.mesh_scale, 1.0);
        assert!(config.generate_collision);
        assert!(!config.debug_mode);
        assert_eq!(config.tops_threshold, 0.55);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TerrainConfig = serde_json::from_str(r#"{ "mesh_scale": 0.5 }"#).expect("parse");
        assert_eq!(config.mesh_scale, 0.5);
        assert!(config.generate_collision);
        assert_eq!(config.noise, NoiseFillParams::default());
    }

    #[test]
    fn test_json_file_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("terrain.json");
        let config = TerrainConfig {
            debug_mode: true,
            ..Default::default()
        };

        config.save_json(&path).expect("save");
        assert_eq!(TerrainConfig::load_json(&path).expect("load"), config);
    }

    #[test]
    fn test_mesh_scale_setter_rejects_degenerate() {
        let mut config = TerrainConfig::default();
        config.set_mesh_scale(0.25);
        assert_eq!(config.mesh_scale, 0.25);
        for bad in [0.0, -2.0, f32::NAN, f32::INFINITY] {
            config.set_mesh_scale(bad);
            assert_eq!(config.mesh_scale, 0.25);
        }
    }

    #[test]
    fn test_loaded_zero_scale_falls_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("terrain.json");
        std::fs::write(&path, r#"{ "mesh_scale": 0.0, "debug_mode": true }"#).expect("write");

        let config = TerrainConfig::load_json(&path).expect("load");
        assert_eq!(config.mesh_scale, 1.0);
        assert!(config.debug_mode);
    }
}
