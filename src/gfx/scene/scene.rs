use cgmath::{Matrix4, SquareMatrix};
use thiserror::Error;
use wgpu::Device;

use crate::gfx::{camera::camera_utils::CameraManager, geometry::GeometryData};

use super::node::{Mesh, Node, NodeId};

/// Errors raised while populating the scene
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to load model '{path}'")]
    ModelLoad {
        path: String,
        #[source]
        source: tobj::LoadError,
    },
}

/// Main scene: the node arena, the draggable-root registry, and the camera.
///
/// Nodes live in a slot arena indexed by [`NodeId`]; removing a node leaves a
/// vacant slot so surviving handles stay valid. The registry holds handles
/// only - the arena owns every node.
pub struct Scene {
    pub camera_manager: CameraManager,
    nodes: Vec<Option<Node>>,
    draggable: Vec<NodeId>,
}

impl Scene {
    /// Creates a new empty scene with the given camera manager
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            nodes: Vec::new(),
            draggable: Vec::new(),
        }
    }

    /// Updates the scene (camera matrices, etc.)
    pub fn update(&mut self) {
        self.camera_manager.camera.update_view_proj();
    }

    /// Inserts a node into the arena, optionally under a parent
    pub fn add_node(&mut self, mut node: Node, parent: Option<NodeId>) -> NodeId {
        node.parent = parent;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(node));
        id
    }

    /// Inserts a leaf node built from procedural geometry
    pub fn add_shape(&mut self, name: &str, data: &GeometryData) -> NodeId {
        let positions: Vec<f32> = data.vertices.iter().flatten().copied().collect();
        let normals: Vec<f32> = data.normals.iter().flatten().copied().collect();
        let mesh = Mesh::new(positions, normals, data.indices.clone());
        self.add_node(Node::new(name, vec![mesh]), None)
    }

    /// Loads a 3D model from an OBJ file into a group node.
    ///
    /// The returned id names a root node without meshes; each OBJ model
    /// becomes a child node under it, so the hierarchy mirrors what a
    /// multi-primitive asset looks like after import. The root is what
    /// callers register as draggable.
    pub fn add_model(&mut self, path: &str) -> Result<NodeId, SceneError> {
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|source| SceneError::ModelLoad {
            path: path.to_string(),
            source,
        })?;

        let root_name = std::path::Path::new(path)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());
        let root = self.add_node(Node::new(root_name, Vec::new()), None);

        for (i, m) in models.iter().enumerate() {
            let mesh = &m.mesh;

            // Use normals from the OBJ if present, otherwise compute them
            let normals = if !mesh.normals.is_empty() && mesh.normals.len() == mesh.positions.len()
            {
                mesh.normals.clone()
            } else {
                Mesh::calculate_face_normals(&mesh.positions, &mesh.indices)
            };

            let name = if m.name.is_empty() {
                format!("primitive_{}", i)
            } else {
                m.name.clone()
            };
            let child = Node::new(
                name,
                vec![Mesh::new(mesh.positions.clone(), normals, mesh.indices.clone())],
            );
            self.add_node(child, Some(root));
        }

        log::info!(
            "loaded model '{}' with {} primitive(s)",
            path,
            models.len()
        );
        Ok(root)
    }

    /// Gets a reference to a node by handle
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(|slot| slot.as_ref())
    }

    /// Gets a mutable reference to a node by handle
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    /// Iterates over all live nodes
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|node| (NodeId(i), node)))
    }

    /// Removes a node and its whole subtree, dropping any registrations
    pub fn remove_node(&mut self, id: NodeId) {
        let doomed = self.descendants(id);
        for gone in &doomed {
            self.draggable.retain(|d| d != gone);
            if let Some(slot) = self.nodes.get_mut(gone.0) {
                *slot = None;
            }
        }
    }

    /// Marks a root node as draggable.
    ///
    /// Registration is a non-owning handle; registering a dead or duplicate
    /// handle is a no-op.
    pub fn register_draggable(&mut self, id: NodeId) {
        if self.node(id).is_some() && !self.draggable.contains(&id) {
            self.draggable.push(id);
        }
    }

    pub fn unregister_draggable(&mut self, id: NodeId) {
        self.draggable.retain(|d| *d != id);
    }

    /// The registered draggable roots, in registration order
    pub fn draggable_roots(&self) -> &[NodeId] {
        &self.draggable
    }

    pub fn is_draggable(&self, id: NodeId) -> bool {
        self.draggable.contains(&id)
    }

    /// Ascends the parent chain from `id` (inclusive) until a registered
    /// root is found. Returns None when no ancestor is registered.
    pub fn draggable_root_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if self.is_draggable(node_id) {
                return Some(node_id);
            }
            current = self.node(node_id).and_then(|node| node.parent);
        }
        None
    }

    /// All live nodes whose ancestor chain (inclusive) contains `root`
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        self.iter()
            .filter(|(id, _)| {
                let mut current = Some(*id);
                while let Some(node_id) = current {
                    if node_id == root {
                        return true;
                    }
                    current = self.node(node_id).and_then(|node| node.parent);
                }
                false
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// World transform of a node: the product of local matrices up the chain
    pub fn world_transform(&self, id: NodeId) -> Matrix4<f32> {
        let mut world = Matrix4::identity();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.node(node_id) else {
                break;
            };
            world = node.local_matrix() * world;
            current = node.parent;
        }
        world
    }

    /// Initializes GPU resources for all nodes.
    ///
    /// Must be called after the GPU context is available and before rendering.
    pub fn init_gpu_resources(&mut self, device: &Device) {
        for slot in self.nodes.iter_mut() {
            if let Some(node) = slot {
                node.init_gpu_resources(device);
            }
        }
    }

    /// Recomputes every node's world matrix and syncs it to the GPU
    pub fn update_all_transforms(&self, queue: &wgpu::Queue) {
        for (id, node) in self.iter() {
            if node.gpu_resources.is_some() {
                node.update_transform(queue, self.world_transform(id));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::{CameraController, CameraManager, OrbitCamera};
    use cgmath::{Vector3, Zero};

    fn empty_scene() -> Scene {
        let camera = OrbitCamera::new(5.0, 0.4, 0.2, Vector3::zero(), 1.0);
        let controller = CameraController::new(0.005, 0.1);
        Scene::new(CameraManager::new(camera, controller))
    }

    #[test]
    fn ascension_stops_at_registered_root() {
        let mut scene = empty_scene();
        let root = scene.add_node(Node::new("root", Vec::new()), None);
        let child = scene.add_node(Node::new("child", Vec::new()), Some(root));
        let grandchild = scene.add_node(Node::new("grandchild", Vec::new()), Some(child));

        assert_eq!(scene.draggable_root_of(grandchild), None);
        scene.register_draggable(root);
        assert_eq!(scene.draggable_root_of(grandchild), Some(root));
        assert_eq!(scene.draggable_root_of(root), Some(root));
    }

    #[test]
    fn removal_drops_subtree_and_registration() {
        let mut scene = empty_scene();
        let root = scene.add_node(Node::new("root", Vec::new()), None);
        let child = scene.add_node(Node::new("child", Vec::new()), Some(root));
        let other = scene.add_node(Node::new("other", Vec::new()), None);
        scene.register_draggable(root);
        scene.register_draggable(other);

        scene.remove_node(root);
        assert!(scene.node(root).is_none());
        assert!(scene.node(child).is_none());
        assert_eq!(scene.draggable_roots(), &[other]);
        // The surviving handle still resolves
        assert!(scene.node(other).is_some());
    }

    #[test]
    fn world_transform_composes_parent_chain() {
        let mut scene = empty_scene();
        let root = scene.add_node(Node::new("root", Vec::new()), None);
        let child = scene.add_node(Node::new("child", Vec::new()), Some(root));
        scene.node_mut(root).unwrap().position = Vector3::new(1.0, 0.0, 0.0);
        scene.node_mut(child).unwrap().position = Vector3::new(0.0, 2.0, 0.0);

        let world = scene.world_transform(child);
        assert_eq!(world.w.x, 1.0);
        assert_eq!(world.w.y, 2.0);
    }

    #[test]
    fn duplicate_registration_is_a_noop() {
        let mut scene = empty_scene();
        let root = scene.add_node(Node::new("root", Vec::new()), None);
        scene.register_draggable(root);
        scene.register_draggable(root);
        assert_eq!(scene.draggable_roots().len(), 1);
    }
}
