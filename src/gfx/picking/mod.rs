//! # Object Picking System
//!
//! This module provides 3D object picking using mouse ray-casting, plus the
//! ground-plane projection that drives dragging.
//!
//! ## How it works
//!
//! 1. **Mouse to Ray**: Convert mouse coordinates to a 3D ray in world space
//! 2. **Ray-Object Intersection**: Test the ray against the bounding boxes of
//!    every node under every registered draggable root
//! 3. **Resolution**: Ascend from the struck leaf to its registered root and
//!    return the closest one
//!
//! The geometric hit names a leaf primitive; the result names the semantic
//! object the user grabbed. A hit whose ancestor chain contains no registered
//! root indicates a registration defect in the caller - it is logged and
//! treated as no hit.

use cgmath::{
    ElementWise, EuclideanSpace, InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4, Zero,
};

use crate::gfx::{
    camera::orbit_camera::OrbitCamera,
    scene::{NodeId, Scene},
};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Create a new ray
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }
}

/// Converts screen coordinates to normalized device coordinates.
///
/// Both axes land in [-1, 1]; the vertical axis is flipped so device-space
/// up is positive. A zero-sized viewport is the caller's bug - the viewport
/// is always non-zero once the window exists.
pub fn screen_to_ndc(screen_pos: (f32, f32), viewport: (f32, f32)) -> (f32, f32) {
    (
        (2.0 * screen_pos.0) / viewport.0 - 1.0,
        1.0 - (2.0 * screen_pos.1) / viewport.1,
    )
}

/// Converts screen coordinates to a world-space ray through that pixel.
///
/// The ray originates at the camera eye; the direction comes from
/// unprojecting the near and far NDC points through the inverse
/// view-projection matrix. Pure function, recomputed per pointer sample.
pub fn screen_to_ray(
    screen_pos: (f32, f32),
    viewport: (f32, f32),
    camera: &OrbitCamera,
) -> Ray {
    let (ndc_x, ndc_y) = screen_to_ndc(screen_pos, viewport);

    let eye = cgmath::Point3::from_vec(camera.eye);
    let target = cgmath::Point3::from_vec(camera.target);
    let view_matrix = Matrix4::look_at_rh(eye, target, camera.up);
    let proj_matrix = cgmath::perspective(camera.fovy, camera.aspect, camera.znear, camera.zfar);

    let view_proj_matrix = proj_matrix * view_matrix;
    let inv_view_proj = view_proj_matrix.invert().unwrap_or(Matrix4::from_scale(1.0));

    // Unproject the near and far planes through this screen point
    let near_point = Vector4::new(ndc_x, ndc_y, -1.0, 1.0);
    let far_point = Vector4::new(ndc_x, ndc_y, 1.0, 1.0);

    let world_near = inv_view_proj * near_point;
    let world_far = inv_view_proj * far_point;

    let near_3d = world_near.truncate() / world_near.w;
    let far_3d = world_far.truncate() / world_far.w;

    Ray::new(camera.eye, far_3d - near_3d)
}

/// The fixed plane pointer motion is projected onto while dragging.
///
/// Defined by a unit normal and a signed constant so that a point `p` lies on
/// the plane when `normal . p + constant == 0`. Immutable for the lifetime of
/// the scene.
#[derive(Debug, Clone, Copy)]
pub struct GroundPlane {
    pub normal: Vector3<f32>,
    pub constant: f32,
}

impl GroundPlane {
    /// A horizontal plane through the given height
    pub fn horizontal(height: f32) -> Self {
        Self {
            normal: Vector3::unit_y(),
            constant: -height,
        }
    }

    /// Intersects a ray with the plane.
    ///
    /// Returns None when the ray is parallel to the plane or points away from
    /// it. Callers must skip their position update for that tick; the
    /// alternative is a position at infinity or NaN.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<Vector3<f32>> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() < f32::EPSILON {
            return None;
        }

        let t = -(self.normal.dot(ray.origin) + self.constant) / denom;
        if t < 0.0 {
            return None;
        }
        Some(ray.point_at(t))
    }
}

impl Default for GroundPlane {
    fn default() -> Self {
        Self::horizontal(0.0)
    }
}

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl AABB {
    /// Create a new AABB
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Create AABB from a set of vertices
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        if vertices.is_empty() {
            return Self::new(Vector3::zero(), Vector3::zero());
        }

        let mut min = Vector3::new(vertices[0][0], vertices[0][1], vertices[0][2]);
        let mut max = min;

        for vertex in vertices.iter().skip(1) {
            let v = Vector3::new(vertex[0], vertex[1], vertex[2]);
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            min.z = min.z.min(v.z);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
            max.z = max.z.max(v.z);
        }

        Self::new(min, max)
    }

    /// Test ray-AABB intersection
    /// Returns the distance to intersection point, or None if no intersection
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t1 = Vector3::new(
            t_min.x.min(t_max.x),
            t_min.y.min(t_max.y),
            t_min.z.min(t_max.z),
        );
        let t2 = Vector3::new(
            t_min.x.max(t_max.x),
            t_min.y.max(t_max.y),
            t_min.z.max(t_max.z),
        );

        let t_near = t1.x.max(t1.y.max(t1.z));
        let t_far = t2.x.min(t2.y.min(t2.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }

    /// Apply a transformation matrix to the AABB
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        // Transform all 8 corners of the AABB and compute new bounds
        let corners = [
            Vector3::new(self.min.x, self.min.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.min.z),
            Vector3::new(self.min.x, self.max.y, self.min.z),
            Vector3::new(self.min.x, self.min.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.max.z),
            Vector3::new(self.min.x, self.max.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.max.z),
        ];

        let mut transformed_corners = Vec::with_capacity(8);
        for corner in &corners {
            let homogeneous = Vector4::new(corner.x, corner.y, corner.z, 1.0);
            let transformed = matrix * homogeneous;
            transformed_corners.push([
                transformed.x / transformed.w,
                transformed.y / transformed.w,
                transformed.z / transformed.w,
            ]);
        }

        Self::from_vertices(&transformed_corners)
    }
}

/// Result of an object picking operation
#[derive(Debug, Clone)]
pub struct PickResult {
    /// The registered draggable root the hit resolved to
    pub root: NodeId,
    /// Distance from the ray origin to the intersection point
    pub distance: f32,
    /// World space intersection point
    pub intersection_point: Vector3<f32>,
}

/// Object picker for 3D mouse selection
pub struct ObjectPicker {
    /// Cache of local-space bounding boxes, keyed by arena index
    cached_aabbs: Vec<Option<AABB>>,
}

impl ObjectPicker {
    /// Create a new object picker
    pub fn new() -> Self {
        Self {
            cached_aabbs: Vec::new(),
        }
    }

    /// Picks the draggable root under the given mouse position.
    ///
    /// Tests the pick ray against every mesh-bearing node in the subtree of
    /// every registered root, keeps the nearest hit, then ascends the parent
    /// chain to the registered root. Registration order never affects the
    /// result; only ray distance does. An empty registry yields None.
    pub fn pick_root(
        &mut self,
        screen_pos: (f32, f32),
        viewport: (f32, f32),
        camera: &OrbitCamera,
        scene: &Scene,
    ) -> Option<PickResult> {
        let ray = screen_to_ray(screen_pos, viewport, camera);

        let mut closest: Option<(NodeId, f32)> = None;

        for &root in scene.draggable_roots() {
            for id in scene.descendants(root) {
                let Some(node) = scene.node(id) else {
                    continue;
                };
                if node.meshes.is_empty() {
                    continue;
                }

                let aabb = self.local_aabb(id, scene);
                let world_aabb = aabb.transform(&scene.world_transform(id));

                if let Some(distance) = world_aabb.intersect_ray(&ray) {
                    if closest.map_or(true, |(_, best)| distance < best) {
                        closest = Some((id, distance));
                    }
                }
            }
        }

        let (leaf, distance) = closest?;
        match scene.draggable_root_of(leaf) {
            Some(root) => Some(PickResult {
                root,
                distance,
                intersection_point: ray.point_at(distance),
            }),
            None => {
                // A struck primitive without a registered ancestor means the
                // registry and the hierarchy disagree; recover as a miss.
                log::warn!("picked node {:?} has no registered draggable ancestor", leaf);
                None
            }
        }
    }

    /// Get or compute the local-space AABB of a node's meshes
    fn local_aabb(&mut self, id: NodeId, scene: &Scene) -> AABB {
        while self.cached_aabbs.len() <= id.index() {
            self.cached_aabbs.push(None);
        }

        if let Some(cached) = self.cached_aabbs[id.index()] {
            return cached;
        }

        let mut all_vertices = Vec::new();
        if let Some(node) = scene.node(id) {
            for mesh in &node.meshes {
                for vertex in mesh.vertices() {
                    all_vertices.push(vertex.position);
                }
            }
        }

        let aabb = if all_vertices.is_empty() {
            // Fallback to unit cube if no vertices
            AABB::new(Vector3::new(-0.5, -0.5, -0.5), Vector3::new(0.5, 0.5, 0.5))
        } else {
            AABB::from_vertices(&all_vertices)
        };

        self.cached_aabbs[id.index()] = Some(aabb);
        aabb
    }

    /// Invalidate cached AABBs (call when mesh data changes)
    pub fn invalidate_cache(&mut self) {
        self.cached_aabbs.clear();
    }

    /// Invalidate the AABB for a specific node
    pub fn invalidate_node(&mut self, id: NodeId) {
        if id.index() < self.cached_aabbs.len() {
            self.cached_aabbs[id.index()] = None;
        }
    }
}

impl Default for ObjectPicker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::{CameraController, CameraManager, OrbitCamera};
    use crate::gfx::geometry::generate_box;
    use crate::gfx::scene::{Mesh, Node};

    fn cube_mesh() -> Mesh {
        let data = generate_box(1.0, 1.0, 1.0);
        Mesh::new(
            data.vertices.iter().flatten().copied().collect(),
            data.normals.iter().flatten().copied().collect(),
            data.indices.clone(),
        )
    }

    fn test_scene() -> Scene {
        let camera = OrbitCamera::new(8.0, 0.6, 0.0, Vector3::new(0.0, 0.0, 0.0), 1.5);
        let controller = CameraController::new(0.005, 0.1);
        Scene::new(CameraManager::new(camera, controller))
    }

    /// Projects a world point into screen space with the same matrices the
    /// ray caster uses, so tests can aim the pointer at scene content.
    fn project(world: Vector3<f32>, camera: &OrbitCamera, viewport: (f32, f32)) -> (f32, f32) {
        let eye = cgmath::Point3::from_vec(camera.eye);
        let target = cgmath::Point3::from_vec(camera.target);
        let view = Matrix4::look_at_rh(eye, target, camera.up);
        let proj = cgmath::perspective(camera.fovy, camera.aspect, camera.znear, camera.zfar);
        let clip = proj * view * Vector4::new(world.x, world.y, world.z, 1.0);
        let ndc = clip.truncate() / clip.w;
        (
            (ndc.x + 1.0) / 2.0 * viewport.0,
            (1.0 - ndc.y) / 2.0 * viewport.1,
        )
    }

    #[test]
    fn test_aabb_creation() {
        let vertices = vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [-1.0, -1.0, -1.0]];
        let aabb = AABB::from_vertices(&vertices);

        assert_eq!(aabb.min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(aabb.max, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_ray_aabb_intersection() {
        let aabb = AABB::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));

        // Ray hitting the box
        let ray = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&ray).is_some());

        // Ray missing the box
        let ray_miss = Ray::new(Vector3::new(5.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&ray_miss).is_none());
    }

    #[test]
    fn ndc_mapping_covers_the_viewport() {
        let viewport = (800.0, 600.0);
        assert_eq!(screen_to_ndc((0.0, 0.0), viewport), (-1.0, 1.0));
        assert_eq!(screen_to_ndc((800.0, 600.0), viewport), (1.0, -1.0));
        assert_eq!(screen_to_ndc((400.0, 300.0), viewport), (0.0, 0.0));
    }

    #[test]
    fn center_ray_points_at_the_target() {
        let camera = OrbitCamera::new(8.0, 0.6, 0.3, Vector3::new(0.0, 0.75, 0.0), 1.5);
        let ray = screen_to_ray((400.0, 300.0), (800.0, 600.0), &camera);

        assert!((ray.origin - camera.eye).magnitude() < 1e-4);
        let to_target = (camera.target - camera.eye).normalize();
        assert!((ray.direction - to_target).magnitude() < 1e-3);
    }

    #[test]
    fn ground_plane_intersection_point() {
        let plane = GroundPlane::horizontal(0.0);
        let ray = Ray::new(Vector3::new(0.0, 4.0, 0.0), Vector3::new(0.0, -1.0, 1.0));

        let point = plane.intersect_ray(&ray).unwrap();
        assert!((point - Vector3::new(0.0, 0.0, 4.0)).magnitude() < 1e-5);
    }

    #[test]
    fn parallel_ray_misses_ground_plane() {
        let plane = GroundPlane::horizontal(0.0);
        let ray = Ray::new(Vector3::new(0.0, 2.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        assert!(plane.intersect_ray(&ray).is_none());
    }

    #[test]
    fn plane_behind_ray_origin_misses() {
        let plane = GroundPlane::horizontal(0.0);
        let ray = Ray::new(Vector3::new(0.0, 2.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
        assert!(plane.intersect_ray(&ray).is_none());
    }

    #[test]
    fn hit_on_child_resolves_to_registered_root() {
        let mut scene = test_scene();
        let root = scene.add_node(Node::new("model", Vec::new()), None);
        let _left = scene.add_node(
            {
                let mut n = Node::new("left", vec![cube_mesh()]);
                n.position = Vector3::new(-0.6, 0.0, 0.0);
                n
            },
            Some(root),
        );
        let _right = scene.add_node(
            {
                let mut n = Node::new("right", vec![cube_mesh()]);
                n.position = Vector3::new(0.6, 0.0, 0.0);
                n
            },
            Some(root),
        );
        scene.register_draggable(root);

        let viewport = (800.0, 600.0);
        let camera = scene.camera_manager.camera;
        let screen = project(Vector3::new(0.6, 0.0, 0.0), &camera, viewport);

        let mut picker = ObjectPicker::new();
        let result = picker.pick_root(screen, viewport, &camera, &scene).unwrap();
        assert_eq!(result.root, root);
    }

    #[test]
    fn nearest_object_wins_regardless_of_registration_order() {
        let viewport = (800.0, 600.0);

        for swap in [false, true] {
            let mut scene = test_scene();
            let near = scene.add_node(Node::new("near", vec![cube_mesh()]), None);
            let far = scene.add_node(
                {
                    let mut n = Node::new("far", vec![cube_mesh()]);
                    n.position = scene.camera_manager.camera.eye * -0.5;
                    n
                },
                None,
            );
            if swap {
                scene.register_draggable(far);
                scene.register_draggable(near);
            } else {
                scene.register_draggable(near);
                scene.register_draggable(far);
            }

            // Both cubes sit on the eye-to-origin line; the one at the origin
            // is closer to the camera than the one behind it.
            let camera = scene.camera_manager.camera;
            let screen = project(Vector3::new(0.0, 0.0, 0.0), &camera, viewport);

            let mut picker = ObjectPicker::new();
            let result = picker.pick_root(screen, viewport, &camera, &scene).unwrap();
            assert_eq!(result.root, near, "swap = {}", swap);
        }
    }

    #[test]
    fn empty_registry_never_hits() {
        let mut scene = test_scene();
        let unregistered = scene.add_node(Node::new("cube", vec![cube_mesh()]), None);
        assert!(scene.node(unregistered).is_some());

        let viewport = (800.0, 600.0);
        let camera = scene.camera_manager.camera;
        let screen = project(Vector3::new(0.0, 0.0, 0.0), &camera, viewport);

        let mut picker = ObjectPicker::new();
        assert!(picker.pick_root(screen, viewport, &camera, &scene).is_none());
    }
}
