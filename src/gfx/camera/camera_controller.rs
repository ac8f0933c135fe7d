use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, MouseScrollDelta},
};

use super::orbit_camera::OrbitCamera;

/// Orbit/zoom controller for the camera.
///
/// The `enabled` flag is the mutual-exclusion point with object dragging: the
/// drag session disables the controller for the duration of a drag so that
/// moving the pointer translates the selected object instead of orbiting the
/// camera. Nothing else may toggle the flag while a drag is active.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    enabled: bool,
    is_mouse_pressed: bool,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            enabled: true,
            is_mouse_pressed: false,
        }
    }

    /// Processes a raw device event, mutating the camera.
    ///
    /// Returns true when the camera changed and a redraw is warranted.
    pub fn process_events(&mut self, event: &DeviceEvent, camera: &mut OrbitCamera) -> bool {
        match event {
            DeviceEvent::Button {
                button: 0, // Left Mouse Button
                state,
            } => {
                // Button state is tracked even while disabled so a drag that
                // ends mid-press leaves the controller consistent.
                self.is_mouse_pressed = *state == ElementState::Pressed;
                false
            }
            DeviceEvent::MouseWheel { delta, .. } => {
                if !self.enabled {
                    return false;
                }
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32
                    }
                };
                camera.add_distance(scroll_amount * self.zoom_speed);
                true
            }
            DeviceEvent::MouseMotion { delta } => {
                if self.enabled && self.is_mouse_pressed {
                    camera.add_yaw(-delta.0 as f32 * self.rotate_speed);
                    camera.add_pitch(delta.1 as f32 * self.rotate_speed);
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector3, Zero};

    fn press_and_move(controller: &mut CameraController, camera: &mut OrbitCamera) {
        controller.process_events(
            &DeviceEvent::Button {
                button: 0,
                state: ElementState::Pressed,
            },
            camera,
        );
        controller.process_events(&DeviceEvent::MouseMotion { delta: (10.0, 0.0) }, camera);
    }

    #[test]
    fn drag_rotates_when_enabled() {
        let mut camera = OrbitCamera::new(5.0, 0.4, 0.2, Vector3::zero(), 1.0);
        let mut controller = CameraController::new(0.005, 0.1);
        let yaw = camera.yaw;
        press_and_move(&mut controller, &mut camera);
        assert_ne!(camera.yaw, yaw);
    }

    #[test]
    fn disabled_controller_ignores_input() {
        let mut camera = OrbitCamera::new(5.0, 0.4, 0.2, Vector3::zero(), 1.0);
        let mut controller = CameraController::new(0.005, 0.1);
        controller.set_enabled(false);
        let yaw = camera.yaw;
        let distance = camera.distance;
        press_and_move(&mut controller, &mut camera);
        controller.process_events(
            &DeviceEvent::MouseWheel {
                delta: MouseScrollDelta::LineDelta(0.0, 1.0),
            },
            &mut camera,
        );
        assert_eq!(camera.yaw, yaw);
        assert_eq!(camera.distance, distance);
    }
}
