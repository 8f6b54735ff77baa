//! Scene-side collaborators of the generators

pub mod host;

pub use host::{CollisionNode, LocalScene, MeshSink, NodeContent, SceneNode, SceneNodeId, TerrainHost};
