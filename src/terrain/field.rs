//! Dense scalar voxel field with optional per-voxel palette colors

use glam::IVec3;

use crate::core::types::{Rgba, WHITE};

/// Default edge length of a freshly created field
pub const DEFAULT_DIMENSION: u32 = 8;

/// Default noise seed of a freshly created field
pub const DEFAULT_SEED: u32 = 8;

/// Dense 3D grid of signed values in [-1, +1].
///
/// Values are stored row-major: `index = z * (width * height) + y * width + x`.
/// Grid coordinates address cell corners and run over `[0, dimension]`
/// inclusive; only `[0, dimension)` maps to stored voxels. The extra corner
/// layer reads as 0.0, which lets boundary cells close against a virtual
/// outside value.
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelField {
    width: u32,
    height: u32,
    depth: u32,
    /// Seed used by the noise fill
    pub random_seed: u32,
    values: Vec<f32>,
    use_color: bool,
    color_indices: Vec<u8>,
    /// Ordered colors; index 0 is the fallback
    pub palette: Vec<Rgba>,
}

impl Default for VoxelField {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION, DEFAULT_DIMENSION, DEFAULT_DIMENSION)
    }
}

impl VoxelField {
    /// Create a zero-filled field. Dimensions are clamped to at least 1.
    pub fn new(width: u32, height: u32, depth: u32) -> Self {
        let mut field = Self {
            width: width.max(1),
            height: height.max(1),
            depth: depth.max(1),
            random_seed: DEFAULT_SEED,
            values: Vec::new(),
            use_color: false,
            color_indices: Vec::new(),
            palette: Vec::new(),
        };
        field.reallocate(field.width, field.height, field.depth);
        field
    }

    /// Create a field with every voxel set to `value` (clamped).
    pub fn filled(width: u32, height: u32, depth: u32, value: f32) -> Self {
        let mut field = Self::new(width, height, depth);
        field.fill(value);
        field
    }

    /// Rebuild a field from raw parts, repairing lengths that do not match.
    pub fn from_parts(
        dimensions: (u32, u32, u32),
        random_seed: u32,
        values: Vec<f32>,
        use_color: bool,
        color_indices: Vec<u8>,
        palette: Vec<Rgba>,
    ) -> Self {
        let (width, height, depth) = dimensions;
        let mut field = Self {
            width: width.max(1),
            height: height.max(1),
            depth: depth.max(1),
            random_seed,
            values,
            use_color,
            color_indices,
            palette,
        };
        field.values.iter_mut().for_each(|v| *v = v.clamp(-1.0, 1.0));
        field.reallocate(field.width, field.height, field.depth);
        field
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Dimensions as an integer vector
    pub fn dimensions(&self) -> IVec3 {
        IVec3::new(self.width as i32, self.height as i32, self.depth as i32)
    }

    /// Voxel count of a `width * height * depth` field, `None` on overflow
    pub fn checked_len(width: u32, height: u32, depth: u32) -> Option<usize> {
        (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(depth as usize)
    }

    /// Number of voxels the dimensions describe (saturating)
    pub fn len(&self) -> usize {
        Self::checked_len(self.width, self.height, self.depth).unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw values in storage order
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Raw color indices in storage order (empty unless coloring is enabled)
    pub fn color_indices(&self) -> &[u8] {
        &self.color_indices
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Toggle per-voxel colors and resize the color storage to match.
    pub fn set_use_color(&mut self, use_color: bool) {
        self.use_color = use_color;
        self.reallocate(self.width, self.height, self.depth);
    }

    /// Validated dimension setter: clamps each axis to at least 1 and reallocates.
    pub fn set_dimensions(&mut self, width: u32, height: u32, depth: u32) {
        self.reallocate(width.max(1), height.max(1), depth.max(1));
    }

    /// Resize storage to exactly `width * height * depth`.
    ///
    /// Growing zero-fills the new tail, shrinking truncates the flat storage.
    /// Color indices follow the same policy while coloring is enabled and are
    /// dropped otherwise.
    pub fn reallocate(&mut self, width: u32, height: u32, depth: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.depth = depth.max(1);

        let size = self.len();
        if self.values.len() != size {
            self.values.resize(size, 0.0);
        }

        if self.use_color {
            if self.color_indices.len() != size {
                self.color_indices.resize(size, 0);
            }
            if self.palette.is_empty() {
                self.palette.push(WHITE);
            }
        } else {
            self.color_indices.clear();
        }
    }

    /// Grid coordinate validity: every axis in `[0, dimension]` inclusive.
    pub fn are_grid_coordinates_valid(&self, coord: IVec3) -> bool {
        let dims = self.dimensions();
        coord.cmpge(IVec3::ZERO).all() && coord.cmple(dims).all()
    }

    /// Flat storage index, or `None` when any axis is outside `[0, dimension)`.
    pub fn coord_to_index(&self, coord: IVec3) -> Option<usize> {
        let dims = self.dimensions();
        if coord.cmplt(IVec3::ZERO).any() || coord.cmpge(dims).any() {
            return None;
        }
        let (w, h) = (self.width as usize, self.height as usize);
        Some(coord.z as usize * (w * h) + coord.y as usize * w + coord.x as usize)
    }

    /// Inverse of [`coord_to_index`](Self::coord_to_index).
    pub fn index_to_coord(&self, index: usize) -> IVec3 {
        let (w, h) = (self.width as usize, self.height as usize);
        let z = index / (w * h);
        let rem = index - z * (w * h);
        let y = rem / w;
        let x = rem - y * w;
        IVec3::new(x as i32, y as i32, z as i32)
    }

    /// Value at a grid coordinate; 0.0 for anything that is not a stored voxel.
    pub fn get(&self, coord: IVec3) -> f32 {
        crate::fail_cond!(!self.are_grid_coordinates_valid(coord), 0.0);
        self.coord_to_index(coord)
            .and_then(|i| self.values.get(i).copied())
            .unwrap_or(0.0)
    }

    /// Store `value` clamped to [-1, +1]. Out-of-range coordinates are ignored.
    pub fn set(&mut self, coord: IVec3, value: f32) {
        crate::fail_cond!(!self.are_grid_coordinates_valid(coord));
        if let Some(slot) = self.coord_to_index(coord).and_then(|i| self.values.get_mut(i)) {
            *slot = value.clamp(-1.0, 1.0);
        }
    }

    /// Palette index at a grid coordinate; 0 when coloring is off or out of range.
    pub fn get_color_index(&self, coord: IVec3) -> u8 {
        crate::fail_cond!(!self.are_grid_coordinates_valid(coord), 0);
        crate::fail_cond!(!self.use_color, 0);
        self.coord_to_index(coord)
            .and_then(|i| self.color_indices.get(i).copied())
            .unwrap_or(0)
    }

    /// Set the palette index of a voxel. Ignored unless coloring is enabled.
    pub fn set_color_index(&mut self, coord: IVec3, color: u8) {
        crate::fail_cond!(!self.are_grid_coordinates_valid(coord));
        crate::fail_cond!(!self.use_color);
        if let Some(slot) = self.coord_to_index(coord).and_then(|i| self.color_indices.get_mut(i)) {
            *slot = color;
        }
    }

    /// Palette lookup with fallback to entry 0, then white.
    pub fn palette_color(&self, index: u8) -> Rgba {
        self.palette
            .get(index as usize)
            .or_else(|| self.palette.first())
            .copied()
            .unwrap_or(WHITE)
    }

    /// Set every voxel to `value` (clamped).
    pub fn fill(&mut self, value: f32) {
        let value = value.clamp(-1.0, 1.0);
        self.values.iter_mut().for_each(|v| *v = value);
    }

    /// Negate every value in place.
    pub fn invert_sign(&mut self) {
        self.values.iter_mut().for_each(|v| *v = -*v);
    }

    /// Shift the whole volume by one step: each voxel takes the contents of
    /// the voxel at `coord + direction`. Sources outside the grid read as 0.0
    /// and color index 0.
    pub fn shift(&mut self, direction: IVec3) {
        let mut values = vec![0.0; self.values.len()];
        let mut colors = vec![0u8; self.color_indices.len()];

        for (index, value) in values.iter_mut().enumerate() {
            let source = self.index_to_coord(index) + direction;
            if let Some(src) = self.coord_to_index(source) {
                *value = self.values[src];
                if let Some(color) = colors.get_mut(index) {
                    *color = self.color_indices.get(src).copied().unwrap_or(0);
                }
            }
        }

        self.values = values;
        self.color_indices = colors;
    }
}
