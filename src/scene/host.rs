//! Host-side services the generators call into
//!
//! The embedding engine owns the scene. Generators only hand it finished
//! meshes and, for terrain, keep one sibling collision node up to date.
//! [`LocalScene`] is a self-contained implementation used by the tools and
//! tests.

use crate::core::types::Vec3;
use crate::mesh::{TerrainMesh, TrimeshShape};

/// Unique identifier for a scene node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SceneNodeId(pub u64);

/// A collision node holding a concave shape.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollisionNode {
    pub shape: Option<TrimeshShape>,
}

impl CollisionNode {
    pub fn set_shape(&mut self, shape: TrimeshShape) {
        self.shape = Some(shape);
    }

    /// Drop the shape so the node no longer collides.
    pub fn clear_shape(&mut self) {
        self.shape = None;
    }
}

/// What a scene node contains.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeContent {
    /// A grouping node with no geometry of its own.
    Group,
    /// A rendered mesh, e.g. a baked terrain copy.
    Mesh(TerrainMesh),
    Collision(CollisionNode),
}

/// A single node among the siblings of a generator.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub id: SceneNodeId,
    pub name: String,
    pub content: NodeContent,
}

/// Receives finished meshes.
pub trait MeshSink {
    /// Replace the displayed mesh wholesale.
    fn commit_mesh(&mut self, mesh: &TerrainMesh);
}

/// Everything a terrain controller needs from its scene.
pub trait TerrainHost: MeshSink {
    /// World position of the terrain node
    fn global_origin(&self) -> Vec3;

    /// First sibling collision node, found by a scan over sibling types.
    fn collision_sibling(&mut self) -> Option<&mut CollisionNode>;

    /// Add a new collision sibling holding `shape`.
    fn add_collision_sibling(&mut self, name: &str, shape: TrimeshShape);

    /// Add a sibling holding a baked mesh.
    fn add_mesh_sibling(&mut self, name: &str, mesh: TerrainMesh);
}

/// In-memory scene: one generator node plus its siblings.
#[derive(Debug, Default)]
pub struct LocalScene {
    pub origin: Vec3,
    /// Last mesh committed by the generator
    pub mesh: Option<TerrainMesh>,
    pub commit_count: usize,
    siblings: Vec<SceneNode>,
    next_id: u64,
}

impl LocalScene {
    pub fn new(origin: Vec3) -> Self {
        Self {
            origin,
            ..Default::default()
        }
    }

    pub fn siblings(&self) -> &[SceneNode] {
        &self.siblings
    }

    /// Add a sibling node and return its id.
    pub fn add_sibling(&mut self, name: impl Into<String>, content: NodeContent) -> SceneNodeId {
        let id = SceneNodeId(self.next_id);
        self.next_id += 1;
        self.siblings.push(SceneNode {
            id,
            name: name.into(),
            content,
        });
        id
    }

    pub fn collision_count(&self) -> usize {
        self.siblings
            .iter()
            .filter(|n| matches!(n.content, NodeContent::Collision(_)))
            .count()
    }
}

impl MeshSink for LocalScene {
    fn commit_mesh(&mut self, mesh: &TerrainMesh) {
        self.mesh = Some(mesh.clone());
        self.commit_count += 1;
    }
}

impl TerrainHost for LocalScene {
    fn global_origin(&self) -> Vec3 {
        self.origin
    }

    fn collision_sibling(&mut self) -> Option<&mut CollisionNode> {
        self.siblings.iter_mut().find_map(|node| match &mut node.content {
            NodeContent::Collision(collision) => Some(collision),
            _ => None,
        })
    }

    fn add_collision_sibling(&mut self, name: &str, shape: TrimeshShape) {
        log::info!("Adding collision sibling '{}'", name);
        self.add_sibling(name, NodeContent::Collision(CollisionNode { shape: Some(shape) }));
    }

    fn add_mesh_sibling(&mut self, name: &str, mesh: TerrainMesh) {
        self.add_sibling(name, NodeContent::Mesh(mesh));
    }
}
