//! Heightfield landscape settings

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::config::{load_json, save_json};
use crate::core::Result;
use crate::mesh::MaterialId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandscapeConfig {
    /// Side length of the square patch, in world units
    pub chunk_size: f32,
    pub tile_size: f32,
    /// Grid coordinate to noise space
    pub scale_factor: f32,
    /// Third noise coordinate
    pub seed: f32,
    pub height: f32,
    /// Raw noise is clamped to `[bottom, top]` before scaling by `height`
    pub bottom: f32,
    pub top: f32,
    pub material: Option<MaterialId>,
}

impl Default for LandscapeConfig {
    fn default() -> Self {
        Self {
            chunk_size: 3.0,
            tile_size: 0.25,
            scale_factor: 0.4,
            seed: 10.0,
            height: 0.14,
            bottom: -1.0,
            top: 1.0,
            material: None,
        }
    }
}

impl LandscapeConfig {
    /// Tiles along each side
    pub fn resolution(&self) -> u32 {
        if self.tile_size <= 0.0 || self.chunk_size <= 0.0 {
            return 0;
        }
        (self.chunk_size / self.tile_size) as u32
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        load_json(path)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        save_json(path, self)
    }
}
