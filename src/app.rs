use cgmath::Vector3;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes},
};

use crate::gfx::{
    camera::{
        camera_controller::CameraController, camera_utils::CameraManager, orbit_camera::OrbitCamera,
    },
    drag::{DragEffect, DragSession, PointerEvent},
    picking::GroundPlane,
    rendering::render_engine::RenderEngine,
    scene::Scene,
};

pub struct ParlorApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    scene: Scene,
    drag_session: DragSession,
    cursor_position: (f32, f32),
}

impl ParlorApp {
    /// Create a new Parlor application with default settings
    pub async fn new() -> Self {
        let event_loop = EventLoop::new().expect("Failed to create event loop");

        let camera = OrbitCamera::new(5.0, 0.6, 0.3, Vector3::new(0.0, 0.75, 0.0), 1.0);
        let controller = CameraController::new(0.005, 0.1);

        let camera_manager = CameraManager::new(camera, controller);
        let scene = Scene::new(camera_manager);

        Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window: None,
                render_engine: None,
                scene,
                drag_session: DragSession::new(GroundPlane::horizontal(0.0)),
                cursor_position: (0.0, 0.0),
            },
        }
    }

    /// Access to the scene for setup before `run`
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.app_state.scene
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(mut self) {
        let event_loop = self.event_loop.take().expect("Event loop already consumed");
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .expect("Failed to run event loop");
    }
}

impl AppState {
    fn viewport(&self) -> (f32, f32) {
        self.window
            .as_ref()
            .map(|window| {
                let size = window.inner_size();
                (size.width as f32, size.height as f32)
            })
            .unwrap_or((1.0, 1.0))
    }

    /// Feeds one pointer event through the drag state machine and applies
    /// whatever effects come back. This is the single writer of both object
    /// positions during a drag and the camera controller's enabled flag.
    fn dispatch_pointer_event(&mut self, event: PointerEvent) {
        let viewport = self.viewport();
        let camera = self.scene.camera_manager.camera;
        let effects = self
            .drag_session
            .transition(event, &camera, viewport, &self.scene);

        for effect in effects {
            match effect {
                DragEffect::MoveNode { node, position } => {
                    if let Some(node) = self.scene.node_mut(node) {
                        node.position = position;
                    }
                }
                DragEffect::SetCameraEnabled(enabled) => {
                    self.scene.camera_manager.controller.set_enabled(enabled);
                }
            }
        }

        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Ok(window) = event_loop.create_window(
            WindowAttributes::default().with_inner_size(winit::dpi::LogicalSize::new(1200, 800)),
        ) {
            let window_handle = Arc::new(window);
            self.window = Some(window_handle.clone());

            let (width, height) = window_handle.inner_size().into();
            self.scene
                .camera_manager
                .camera
                .resize_projection(width, height);

            let window_clone = window_handle.clone();
            let renderer = pollster::block_on(async move {
                RenderEngine::new(window_clone, width, height).await
            })
            .expect("Failed to initialize the render engine");

            self.scene.init_gpu_resources(renderer.device());
            self.render_engine = Some(renderer);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: winit::event::WindowEvent,
    ) {
        if self.render_engine.is_none() || self.window.is_none() {
            return;
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: winit::keyboard::PhysicalKey::Code(key_code),
                        ..
                    },
                ..
            } => {
                if matches!(key_code, winit::keyboard::KeyCode::Escape) {
                    event_loop.exit();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_position = (position.x as f32, position.y as f32);
                let (x, y) = self.cursor_position;
                self.dispatch_pointer_event(PointerEvent::Move { x, y });
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                let (x, y) = self.cursor_position;
                let pointer_event = match state {
                    ElementState::Pressed => PointerEvent::Down { x, y },
                    ElementState::Released => PointerEvent::Up,
                };
                self.dispatch_pointer_event(pointer_event);
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.scene
                    .camera_manager
                    .camera
                    .resize_projection(width, height);
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                self.scene.update();
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.update(self.scene.camera_manager.camera.uniform);
                    self.scene.update_all_transforms(render_engine.queue());
                    render_engine.render_frame(&self.scene);
                }
                if let Some(window) = self.window.as_ref() {
                    window.request_redraw();
                }
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: winit::event::DeviceEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };

        if self.scene.camera_manager.process_event(&event) {
            window.request_redraw();
        }
    }
}
