//! Terrain controller: owns a voxel field and keeps its mesh and collision
//! in sync with every edit.

use glam::{IVec3, Vec3};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::config::TerrainConfig;
use super::edit::{self, EditCommand};
use super::field::VoxelField;
use super::generator::FieldNoise;
use super::grid::GridMapping;
use crate::mesh::{MarchingCubesMesher, MaterialId, SurfaceRole, TerrainMesh, TrimeshShape, generate_debug_mesh};
use crate::scene::TerrainHost;

/// Returned by [`TerrainController::configuration_warning`] without a field
pub const MISSING_FIELD_WARNING: &str = "No terrain data specified!";

/// Seed of the ruffle RNG until the host reseeds it
const DEFAULT_RNG_SEED: u64 = 0;

/// Runtime-editable marching-cubes terrain.
///
/// Every operation that needs the field is a logged no-op while none is set.
/// Edits regenerate the mesh immediately, replacing the previous one
/// wholesale.
pub struct TerrainController {
    pub name: String,
    pub config: TerrainConfig,
    pub tops_material: Option<MaterialId>,
    pub sides_material: Option<MaterialId>,
    field: Option<VoxelField>,
    origin: Vec3,
    mesh: Option<TerrainMesh>,
    rng: ChaCha8Rng,
    old_debug_mode: bool,
}

impl TerrainController {
    pub fn new(name: impl Into<String>, config: TerrainConfig) -> Self {
        let old_debug_mode = config.debug_mode;
        Self {
            name: name.into(),
            config,
            tops_material: None,
            sides_material: None,
            field: None,
            origin: Vec3::ZERO,
            mesh: None,
            rng: ChaCha8Rng::seed_from_u64(DEFAULT_RNG_SEED),
            old_debug_mode,
        }
    }

    /// Attach a field (builder pattern)
    pub fn with_field(mut self, field: VoxelField) -> Self {
        self.field = Some(field);
        self
    }

    pub fn field(&self) -> Option<&VoxelField> {
        self.field.as_ref()
    }

    pub fn field_mut(&mut self) -> Option<&mut VoxelField> {
        self.field.as_mut()
    }

    pub fn set_field(&mut self, field: Option<VoxelField>) {
        self.field = field;
    }

    /// Last generated mesh
    pub fn mesh(&self) -> Option<&TerrainMesh> {
        self.mesh.as_ref()
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Vec3) {
        self.origin = origin;
    }

    /// Reseed the RNG handle used by ruffle edits.
    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Mapping between world space and grid coordinates
    pub fn mapping(&self) -> GridMapping {
        GridMapping::new(self.origin, self.config.mesh_scale)
    }

    fn require_field(&self) -> Option<&VoxelField> {
        crate::fail_cond!(self.field.is_none(), None);
        self.field.as_ref()
    }

    fn require_field_mut(&mut self) -> Option<&mut VoxelField> {
        crate::fail_cond!(self.field.is_none(), None);
        self.field.as_mut()
    }

    /// Grid coordinate under a world position, if it lies on the grid.
    pub fn grid_from_world(&self, world: Vec3) -> Option<IVec3> {
        let field = self.require_field()?;
        let coord = self.mapping().grid_from_world(world);
        crate::fail_cond!(!field.are_grid_coordinates_valid(coord), None);
        Some(coord)
    }

    /// World position of a valid grid coordinate.
    pub fn world_from_grid(&self, coord: IVec3) -> Option<Vec3> {
        let field = self.require_field()?;
        crate::fail_cond!(!field.are_grid_coordinates_valid(coord), None);
        Some(self.mapping().world_from_grid(coord))
    }

    /// Flat storage index; `None` outside `[0, dimension)`.
    pub fn coord_to_flat_index(&self, coord: IVec3) -> Option<usize> {
        self.require_field()?.coord_to_index(coord)
    }

    pub fn get_value_at(&self, coord: IVec3) -> f32 {
        self.require_field().map_or(0.0, |field| field.get(coord))
    }

    pub fn set_value_at(&mut self, coord: IVec3, value: f32) {
        if let Some(field) = self.require_field_mut() {
            field.set(coord, value);
        }
    }

    pub fn get_color_at(&self, coord: IVec3) -> u8 {
        self.require_field().map_or(0, |field| field.get_color_index(coord))
    }

    pub fn set_color_at(&mut self, coord: IVec3, color: u8) {
        if let Some(field) = self.require_field_mut() {
            field.set_color_index(coord, color);
        }
    }

    /// Apply one brush stroke and rebuild.
    pub fn apply_edit(&mut self, command: &EditCommand, host: &mut dyn TerrainHost) {
        crate::fail_cond!(self.field.is_none());
        let mapping = self.mapping();
        let Some(field) = self.field.as_mut() else { return };
        command.apply(field, &mapping, &mut self.rng);
        self.generate_mesh(host);
    }

    /// Apply a stroke coming from gameplay rather than the editor. Ignored
    /// unless the terrain is destructible; returns whether it was applied.
    pub fn apply_runtime_edit(&mut self, command: &EditCommand, host: &mut dyn TerrainHost) -> bool {
        if !self.config.is_destructible || self.field.is_none() {
            return false;
        }
        self.apply_edit(command, host);
        true
    }

    /// Repair storage to the current dimensions and rebuild.
    pub fn regenerate(&mut self, host: &mut dyn TerrainHost) {
        let Some(field) = self.require_field_mut() else { return };
        let (w, h, d) = (field.width(), field.height(), field.depth());
        field.reallocate(w, h, d);
        self.generate_mesh(host);
    }

    /// Overwrite the field with seeded noise and rebuild.
    pub fn randomise(&mut self, host: &mut dyn TerrainHost) {
        let params = self.config.noise.clone();
        let Some(field) = self.require_field_mut() else { return };
        FieldNoise::new(field.random_seed, params).fill(field);
        self.regenerate(host);
    }

    pub fn invert(&mut self, host: &mut dyn TerrainHost) {
        let Some(field) = self.require_field_mut() else { return };
        edit::invert_sign(field);
        self.regenerate(host);
    }

    pub fn clear(&mut self, host: &mut dyn TerrainHost) {
        let Some(field) = self.require_field_mut() else { return };
        edit::clear(field);
        self.regenerate(host);
    }

    /// Move the whole volume one step; see [`VoxelField::shift`].
    pub fn shift(&mut self, direction: IVec3, host: &mut dyn TerrainHost) {
        let Some(field) = self.require_field_mut() else { return };
        field.shift(direction);
        self.regenerate(host);
    }

    /// Rebuild, then add a recentred copy of the mesh to the scene as a
    /// standalone sibling. Returns the offset that was subtracted.
    pub fn bake(&mut self, host: &mut dyn TerrainHost) -> Option<Vec3> {
        self.generate_mesh(host);
        let (baked, offset) = self.mesh.as_ref()?.recentred();
        host.add_mesh_sibling(&format!("{} (Baked)", self.name), baked);
        log::info!("Baked '{}' with offset {:?}", self.name, offset);
        Some(offset)
    }

    /// Rebuild the mesh from the field, commit it to the host and refresh the
    /// collision sibling.
    pub fn generate_mesh(&mut self, host: &mut dyn TerrainHost) {
        self.origin = host.global_origin();
        let scale = self.config.mesh_scale;
        let debug_mode = self.config.debug_mode;
        let tops_threshold = self.config.tops_threshold;

        let Some(field) = self.require_field() else { return };

        if debug_mode {
            let mesh = generate_debug_mesh(field, scale);
            host.commit_mesh(&mesh);
            self.mesh = Some(mesh);
            return;
        }

        let mut mesh = MarchingCubesMesher::new(scale)
            .with_tops_threshold(tops_threshold)
            .generate(field);

        for surface in &mut mesh.surfaces {
            surface.material = match surface.role {
                SurfaceRole::Tops => self.tops_material,
                SurfaceRole::Sides => self.sides_material,
                _ => None,
            };
        }

        host.commit_mesh(&mesh);

        if self.config.generate_collision {
            let shape = TrimeshShape::from_mesh(&mesh);
            if let Some(node) = host.collision_sibling() {
                match shape {
                    Some(shape) => node.set_shape(shape),
                    // Nothing left to collide with
                    None => node.clear_shape(),
                }
            } else if let Some(shape) = shape {
                host.add_collision_sibling(&format!("{}_Collision", self.name), shape);
            }
        }

        log::debug!("Regenerated '{}': {} triangles", self.name, mesh.triangle_count());
        self.mesh = Some(mesh);
    }

    /// Entering the scene: make sure a field exists, then build.
    pub fn on_attach(&mut self, host: &mut dyn TerrainHost) {
        if self.field.is_none() {
            log::info!("'{}' has no terrain data, creating a default field", self.name);
            self.field = Some(VoxelField::default());
        }
        self.old_debug_mode = self.config.debug_mode;
        self.generate_mesh(host);
    }

    /// Per-frame update: rebuild when the debug view was toggled.
    pub fn on_frame(&mut self, _dt: f32, host: &mut dyn TerrainHost) {
        if self.old_debug_mode != self.config.debug_mode {
            self.old_debug_mode = self.config.debug_mode;
            self.generate_mesh(host);
        }
    }

    pub fn configuration_warning(&self) -> Option<&'static str> {
        self.field.is_none().then_some(MISSING_FIELD_WARNING)
    }
}
