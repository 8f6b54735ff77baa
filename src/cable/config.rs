//! Cable settings

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::config::{load_json, save_json};
use crate::core::Result;
use crate::mesh::MaterialId;

/// Settings for a [`CableSim`](super::CableSim). Locations are in the local
/// space of the cable's host transform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CableConfig {
    pub start_attached: bool,
    pub start_location: Vec3,
    pub end_attached: bool,
    pub end_location: Vec3,
    /// Values above 1.0 enable the skip-one bending pass, which holds every
    /// other particle `stiffness_coefficient` segments apart (at most 2.0)
    pub stiffness_coefficient: f32,
    /// Rest length of the whole cable
    pub length: f32,
    /// Tube diameter
    pub width: f32,
    pub segments: u32,
    /// Vertices around the tube (one more is emitted for the UV seam)
    pub sides: u32,
    pub reverse_winding: bool,
    pub material: Option<MaterialId>,
}

impl Default for CableConfig {
    fn default() -> Self {
        Self {
            start_attached: true,
            start_location: Vec3::ZERO,
            end_attached: false,
            end_location: Vec3::ZERO,
            stiffness_coefficient: 0.0,
            length: 1.0,
            width: 0.2,
            segments: 8,
            sides: 8,
            reverse_winding: false,
            material: None,
        }
    }
}

impl CableConfig {
    /// Segment count, at least one
    pub fn segment_count(&self) -> usize {
        self.segments.max(1) as usize
    }

    /// Side count, at least three
    pub fn side_count(&self) -> usize {
        self.sides.max(3) as usize
    }

    /// Rest length of one segment
    pub fn segment_length(&self) -> f32 {
        self.length / self.segment_count() as f32
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        load_json(path)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        save_json(path, self)
    }
}
