// src/lib.rs
//! Parlor 3D Room-Layout Engine
//!
//! A small scene engine built on wgpu and winit: an orbit camera over a room,
//! with mouse-driven dragging of registered objects across the ground plane.

pub mod app;
pub mod gfx;

// Re-export main types for convenience
pub use app::ParlorApp;
pub use gfx::drag::{DragEffect, DragSession, PointerEvent};
pub use gfx::picking::GroundPlane;
pub use gfx::scene::NodeId;

/// Creates a default Parlor application instance
pub fn default() -> ParlorApp {
    pollster::block_on(ParlorApp::new())
}
