//! # Drag Session
//!
//! The pointer-driven drag state machine. A [`DragSession`] owns the only
//! persistent mutable state of the manipulation subsystem: which draggable
//! root is selected and the grab offset between that root's position and the
//! point on the ground plane where the drag started.
//!
//! ## Event flow
//!
//! The session never touches the window, the GPU, or the camera controller
//! directly. The event loop feeds it [`PointerEvent`]s and applies the
//! [`DragEffect`]s it returns:
//!
//! - pointer-down over a registered object starts a drag and disables the
//!   camera controller, so the same mouse motion cannot orbit the camera and
//!   translate the object at once
//! - pointer-move while dragging projects the pick ray onto the ground plane
//!   and emits the new object position, offset by the grab point
//! - pointer-up ends the drag and re-enables the camera controller
//!
//! Events arrive in down/move/up order on one thread; a second pointer-down
//! during an active drag is ignored (single-pointer model).
//!
//! ## The grab offset
//!
//! Without the offset the object would snap so that its origin lands under
//! the pointer, discarding where on the object the user actually grabbed it.
//! Storing `ground_point - position` at pointer-down and subtracting it on
//! every move keeps the grab point fixed under the pointer for the whole drag.

use cgmath::{Vector3, Zero};

use crate::gfx::{
    camera::orbit_camera::OrbitCamera,
    picking::{screen_to_ray, GroundPlane, ObjectPicker},
    scene::{NodeId, Scene},
};

/// A pointer input sample, consumed immediately and never stored
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up,
}

/// Effects for the event loop to apply after a transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEffect {
    /// Set the world position of a draggable root
    MoveNode {
        node: NodeId,
        position: Vector3<f32>,
    },
    /// Toggle the camera controller; false for the duration of a drag
    SetCameraEnabled(bool),
}

/// The drag state machine: Idle when `selected` is None, Dragging otherwise.
///
/// Invariant: the camera controller is enabled exactly when the session is
/// Idle. The effects returned by [`DragSession::transition`] maintain this as
/// long as the caller applies them all.
pub struct DragSession {
    selected: Option<NodeId>,
    grab_offset: Vector3<f32>,
    plane: GroundPlane,
    picker: ObjectPicker,
}

impl DragSession {
    pub fn new(plane: GroundPlane) -> Self {
        Self {
            selected: None,
            grab_offset: Vector3::zero(),
            plane,
            picker: ObjectPicker::new(),
        }
    }

    /// The currently dragged root, if any
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn is_dragging(&self) -> bool {
        self.selected.is_some()
    }

    /// Access to the picker, e.g. to invalidate AABBs after mesh edits
    pub fn picker_mut(&mut self) -> &mut ObjectPicker {
        &mut self.picker
    }

    /// Advances the state machine by one pointer event.
    ///
    /// Reads the scene, never writes it; position updates come back as
    /// effects so the machine stays testable without a live renderer. A
    /// failed ground projection (ray parallel to the plane) produces no
    /// effect for that tick - the object keeps its previous position.
    pub fn transition(
        &mut self,
        event: PointerEvent,
        camera: &OrbitCamera,
        viewport: (f32, f32),
        scene: &Scene,
    ) -> Vec<DragEffect> {
        match event {
            PointerEvent::Down { x, y } => {
                if self.selected.is_some() {
                    // Single-pointer model: a second down mid-drag is ignored.
                    return Vec::new();
                }

                let Some(hit) = self.picker.pick_root((x, y), viewport, camera, scene) else {
                    return Vec::new();
                };
                let Some(node) = scene.node(hit.root) else {
                    return Vec::new();
                };

                let ray = screen_to_ray((x, y), viewport, camera);
                let Some(ground_point) = self.plane.intersect_ray(&ray) else {
                    // No usable grab point on the plane; stay Idle.
                    return Vec::new();
                };

                self.grab_offset = ground_point - node.position;
                self.selected = Some(hit.root);
                log::debug!("drag start on node {:?}", hit.root);
                vec![DragEffect::SetCameraEnabled(false)]
            }
            PointerEvent::Move { x, y } => {
                let Some(id) = self.selected else {
                    return Vec::new();
                };

                let ray = screen_to_ray((x, y), viewport, camera);
                match self.plane.intersect_ray(&ray) {
                    Some(ground_point) => vec![DragEffect::MoveNode {
                        node: id,
                        position: ground_point - self.grab_offset,
                    }],
                    // Degenerate ray this tick; skip the update, keep dragging.
                    None => Vec::new(),
                }
            }
            PointerEvent::Up => {
                if self.selected.take().is_some() {
                    log::debug!("drag end");
                    vec![DragEffect::SetCameraEnabled(true)]
                } else {
                    Vec::new()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::{CameraController, CameraManager, OrbitCamera};
    use crate::gfx::geometry::generate_box;
    use crate::gfx::scene::{Mesh, Node};
    use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Vector4};

    const VIEWPORT: (f32, f32) = (800.0, 600.0);

    fn cube_mesh() -> Mesh {
        let data = generate_box(1.0, 1.0, 1.0);
        Mesh::new(
            data.vertices.iter().flatten().copied().collect(),
            data.normals.iter().flatten().copied().collect(),
            data.indices.clone(),
        )
    }

    fn scene_with_cube(position: Vector3<f32>) -> (Scene, NodeId) {
        let camera = OrbitCamera::new(8.0, 0.6, 0.0, Vector3::zero(), VIEWPORT.0 / VIEWPORT.1);
        let controller = CameraController::new(0.005, 0.1);
        let mut scene = Scene::new(CameraManager::new(camera, controller));

        let root = scene.add_node(Node::new("model", Vec::new()), None);
        let _body = scene.add_node(Node::new("body", vec![cube_mesh()]), Some(root));
        scene.node_mut(root).unwrap().position = position;
        scene.register_draggable(root);
        (scene, root)
    }

    fn project(world: Vector3<f32>, camera: &OrbitCamera) -> (f32, f32) {
        let eye = cgmath::Point3::from_vec(camera.eye);
        let target = cgmath::Point3::from_vec(camera.target);
        let view = Matrix4::look_at_rh(eye, target, camera.up);
        let proj = cgmath::perspective(camera.fovy, camera.aspect, camera.znear, camera.zfar);
        let clip = proj * view * Vector4::new(world.x, world.y, world.z, 1.0);
        let ndc = clip.truncate() / clip.w;
        (
            (ndc.x + 1.0) / 2.0 * VIEWPORT.0,
            (1.0 - ndc.y) / 2.0 * VIEWPORT.1,
        )
    }

    /// Applies effects the way the event loop does, tracking the camera flag
    fn apply(scene: &mut Scene, enabled: &mut bool, effects: &[DragEffect]) {
        for effect in effects {
            match *effect {
                DragEffect::MoveNode { node, position } => {
                    scene.node_mut(node).unwrap().position = position;
                }
                DragEffect::SetCameraEnabled(e) => *enabled = e,
            }
        }
    }

    fn ground_point_under(screen: (f32, f32), camera: &OrbitCamera) -> Vector3<f32> {
        let ray = screen_to_ray(screen, VIEWPORT, camera);
        GroundPlane::horizontal(0.0).intersect_ray(&ray).unwrap()
    }

    #[test]
    fn down_on_child_selects_the_root_and_disables_camera() {
        let (scene, root) = scene_with_cube(Vector3::zero());
        let camera = scene.camera_manager.camera;
        let mut session = DragSession::new(GroundPlane::horizontal(0.0));

        let (x, y) = project(Vector3::zero(), &camera);
        let effects = session.transition(PointerEvent::Down { x, y }, &camera, VIEWPORT, &scene);

        assert_eq!(session.selected(), Some(root));
        assert_eq!(effects, vec![DragEffect::SetCameraEnabled(false)]);
    }

    #[test]
    fn grab_offset_is_preserved_across_moves() {
        let start = Vector3::new(1.0, 0.0, 1.0);
        let (mut scene, root) = scene_with_cube(start);
        let camera = scene.camera_manager.camera;
        let mut session = DragSession::new(GroundPlane::horizontal(0.0));
        let mut enabled = true;

        let down = project(start, &camera);
        let grab = ground_point_under(down, &camera);
        let effects = session.transition(
            PointerEvent::Down {
                x: down.0,
                y: down.1,
            },
            &camera,
            VIEWPORT,
            &scene,
        );
        apply(&mut scene, &mut enabled, &effects);

        // Drag through a few pointer positions; after each move the object
        // must satisfy (position - ground_point) == (start - grab) exactly.
        for target in [
            Vector3::new(2.0, 0.0, -1.0),
            Vector3::new(-3.0, 0.0, 2.0),
            Vector3::new(0.5, 0.0, 0.5),
        ] {
            let screen = project(target, &camera);
            let ground = ground_point_under(screen, &camera);
            let effects = session.transition(
                PointerEvent::Move {
                    x: screen.0,
                    y: screen.1,
                },
                &camera,
                VIEWPORT,
                &scene,
            );
            apply(&mut scene, &mut enabled, &effects);

            let position = scene.node(root).unwrap().position;
            let drift = (position - ground) - (start - grab);
            assert!(drift.magnitude() < 1e-4, "drift = {:?}", drift);
        }
    }

    #[test]
    fn parallel_move_ray_keeps_previous_position() {
        let (mut scene, root) = scene_with_cube(Vector3::zero());
        let camera = scene.camera_manager.camera;
        let mut session = DragSession::new(GroundPlane::horizontal(0.0));
        let mut enabled = true;

        let (x, y) = project(Vector3::zero(), &camera);
        let effects = session.transition(PointerEvent::Down { x, y }, &camera, VIEWPORT, &scene);
        apply(&mut scene, &mut enabled, &effects);
        let before = scene.node(root).unwrap().position;

        // A camera at plane height looking along the horizon casts a center
        // ray exactly parallel to the ground plane.
        let mut level_camera = camera;
        level_camera.bounds.min_pitch = 0.0;
        level_camera.set_pitch(0.0);
        level_camera.target.y = level_camera.eye.y;
        let center_ray = screen_to_ray(
            (VIEWPORT.0 / 2.0, VIEWPORT.1 / 2.0),
            VIEWPORT,
            &level_camera,
        );
        assert!(center_ray.direction.y.abs() < f32::EPSILON);

        let effects = session.transition(
            PointerEvent::Move {
                x: VIEWPORT.0 / 2.0,
                y: VIEWPORT.1 / 2.0,
            },
            &level_camera,
            VIEWPORT,
            &scene,
        );
        assert!(effects.is_empty());

        apply(&mut scene, &mut enabled, &effects);
        let after = scene.node(root).unwrap().position;
        assert_eq!(before, after);
        assert!(after.x.is_finite() && after.y.is_finite() && after.z.is_finite());
        assert!(session.is_dragging());
    }

    #[test]
    fn camera_enabled_iff_session_idle() {
        let (mut scene, _root) = scene_with_cube(Vector3::zero());
        let camera = scene.camera_manager.camera;
        let mut session = DragSession::new(GroundPlane::horizontal(0.0));
        let mut enabled = true;

        let (x, y) = project(Vector3::zero(), &camera);
        let script = [
            PointerEvent::Down { x, y },
            PointerEvent::Move { x: x + 20.0, y },
            PointerEvent::Move { x: x - 40.0, y: y + 10.0 },
            PointerEvent::Up,
        ];

        for event in script {
            let effects = session.transition(event, &camera, VIEWPORT, &scene);
            apply(&mut scene, &mut enabled, &effects);
            assert_eq!(enabled, !session.is_dragging(), "after {:?}", event);
        }
        assert!(enabled);
    }

    #[test]
    fn second_down_during_drag_is_ignored() {
        let (scene, root) = scene_with_cube(Vector3::zero());
        let camera = scene.camera_manager.camera;
        let mut session = DragSession::new(GroundPlane::horizontal(0.0));

        let (x, y) = project(Vector3::zero(), &camera);
        session.transition(PointerEvent::Down { x, y }, &camera, VIEWPORT, &scene);
        let effects = session.transition(PointerEvent::Down { x, y }, &camera, VIEWPORT, &scene);

        assert!(effects.is_empty());
        assert_eq!(session.selected(), Some(root));
    }

    #[test]
    fn events_with_empty_registry_are_noops() {
        let camera = OrbitCamera::new(8.0, 0.6, 0.0, Vector3::zero(), VIEWPORT.0 / VIEWPORT.1);
        let controller = CameraController::new(0.005, 0.1);
        let mut scene = Scene::new(CameraManager::new(camera, controller));
        scene.add_node(Node::new("unregistered", vec![cube_mesh()]), None);

        let camera = scene.camera_manager.camera;
        let mut session = DragSession::new(GroundPlane::horizontal(0.0));

        for event in [
            PointerEvent::Down { x: 400.0, y: 300.0 },
            PointerEvent::Move { x: 410.0, y: 300.0 },
            PointerEvent::Up,
        ] {
            let effects = session.transition(event, &camera, VIEWPORT, &scene);
            assert!(effects.is_empty());
            assert!(!session.is_dragging());
        }
    }
}
