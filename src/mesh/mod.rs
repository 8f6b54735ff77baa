//! Mesh generation: marching cubes, debug cubes, collision shapes, OBJ export

mod tables;

pub mod surface;
pub mod marching_cubes;
pub mod debug_cubes;
pub mod collision;
pub mod obj;

pub use surface::{MaterialId, MeshSurface, SurfaceRole, TerrainMesh, Vertex};
pub use marching_cubes::{GridCell, MarchingCubesMesher, polygonise};
pub use debug_cubes::generate_debug_mesh;
pub use collision::TrimeshShape;
pub use obj::{save_obj, write_obj};
