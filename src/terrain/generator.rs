//! Coherent-noise fill for voxel fields

use noise::{Fbm, MultiFractal, NoiseFn, OpenSimplex};
use serde::{Deserialize, Serialize};

use super::field::VoxelField;

/// Parameters controlling the noise fill
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseFillParams {
    pub octaves: u32,      // FBM octaves (detail levels)
    pub period: f32,       // Voxels per base noise period
    pub persistence: f32,  // Amplitude falloff per octave
    pub lacunarity: f32,   // Frequency growth per octave
    pub bias: f32,         // Added to every sample; positive grows solid space
}

impl Default for NoiseFillParams {
    fn default() -> Self {
        Self {
            octaves: 4,
            period: 20.0,
            persistence: 0.8,
            lacunarity: 2.0,
            bias: 0.2,
        }
    }
}

/// Fractal OpenSimplex sampler seeded per field
pub struct FieldNoise {
    params: NoiseFillParams,
    noise: Fbm<OpenSimplex>,
}

impl FieldNoise {
    /// Create a sampler for the given seed
    pub fn new(seed: u32, params: NoiseFillParams) -> Self {
        let noise = Fbm::<OpenSimplex>::new(seed)
            .set_octaves(params.octaves.max(1) as usize)
            .set_frequency(1.0 / params.period.max(f32::EPSILON) as f64)
            .set_persistence(params.persistence as f64)
            .set_lacunarity(params.lacunarity as f64);

        Self { params, noise }
    }

    pub fn params(&self) -> &NoiseFillParams {
        &self.params
    }

    /// Biased noise value at a grid position (not clamped)
    pub fn sample(&self, x: f32, y: f32, z: f32) -> f32 {
        self.noise.get([x as f64, y as f64, z as f64]) as f32 + self.params.bias
    }

    /// Overwrite every voxel of `field`, independent of its prior contents.
    pub fn fill(&self, field: &mut VoxelField) {
        let (w, h, d) = (field.width(), field.height(), field.depth());
        field.reallocate(w, h, d);

        for index in 0..field.len() {
            let coord = field.index_to_coord(index);
            let value = self.sample(coord.x as f32, coord.y as f32, coord.z as f32);
            field.set(coord, value);
        }
    }
}

/// Fill `field` from its own `random_seed` with the default parameters.
pub fn fill_with_noise(field: &mut VoxelField) {
    FieldNoise::new(field.random_seed, NoiseFillParams::default()).fill(field);
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;

    #[test]
    fn test_noise_params_default() {
        let params = NoiseFillParams::default();
        assert_eq!(params.octaves, 4);
        assert_eq!(params.period, 20.0);
        assert_eq!(params.persistence, 0.8);
        assert_eq!(params.bias, 0.2);
    }

    #[test]
    fn test_fill_is_deterministic_per_seed() {
        let mut a = VoxelField::new(6, 6, 6);
        let mut b = VoxelField::new(6, 6, 6);
        fill_with_noise(&mut a);
        fill_with_noise(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fill_ignores_prior_contents() {
        let mut a = VoxelField::filled(5, 5, 5, 1.0);
        let mut b = VoxelField::filled(5, 5, 5, -1.0);
        fill_with_noise(&mut a);
        fill_with_noise(&mut b);
        assert_eq!(a.values(), b.values());
    }

    #[test]
    fn test_fill_values_clamped() {
        let mut field = VoxelField::new(10, 10, 10);
        field.random_seed = 99;
        fill_with_noise(&mut field);
        assert!(field.values().iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut a = VoxelField::new(8, 8, 8);
        let mut b = VoxelField::new(8, 8, 8);
        a.random_seed = 1;
        b.random_seed = 2;
        fill_with_noise(&mut a);
        fill_with_noise(&mut b);
        assert_ne!(a.values(), b.values());
    }

    #[test]
    fn test_sample_matches_field() {
        let mut field = VoxelField::new(4, 4, 4);
        let noise = FieldNoise::new(field.random_seed, NoiseFillParams::default());
        noise.fill(&mut field);
        let expected = noise.sample(1.0, 2.0, 3.0).clamp(-1.0, 1.0);
        assert_eq!(field.get(IVec3::new(1, 2, 3)), expected);
    }
}
