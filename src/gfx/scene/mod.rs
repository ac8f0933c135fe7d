//! # Scene Management Module
//!
//! This module provides the scene hierarchy for the Parlor engine: a node
//! arena with stable handles and parent links, plus the registry of draggable
//! roots that the picking and drag subsystems operate on.
//!
//! ## Key Components
//!
//! - [`Scene`] - The main scene container that owns the node arena, the
//!   draggable-root registry, and the camera
//! - [`Node`] - A single hierarchy node with meshes and a local transform
//! - [`NodeId`] - Stable handle into the arena; parent links are handles,
//!   never back-pointers
//! - [`Vertex3D`] - GPU-compatible vertex data
//!
//! ## Hierarchy and registration
//!
//! Loaded models become a root group node with one child node per mesh
//! primitive. Registering the root with [`Scene::register_draggable`] marks
//! the whole subtree as pickable; a hit on any child resolves upward to the
//! registered root. The registry is a non-owning set of handles - removing a
//! node from the arena drops its registration with it.

pub mod node;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use node::{DrawNode, Mesh, Node, NodeId};
pub use scene::{Scene, SceneError};
pub use vertex::Vertex3D;
