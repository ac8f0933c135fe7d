//! # Graphics Module
//!
//! This module contains all graphics-related functionality for the Parlor engine,
//! including the camera system, the scene arena, picking, dragging, procedural
//! geometry, and the forward renderer.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Orbit camera with an enable/disable gate
//! - **Scene Management** ([`scene`]) - Node arena with parent links and a
//!   draggable-root registry
//! - **Picking** ([`picking`]) - Screen-to-ray casting, AABB intersection and
//!   ground-plane projection
//! - **Dragging** ([`drag`]) - The pointer-driven drag state machine
//! - **Geometry** ([`geometry`]) - Procedural plane and box primitives
//! - **Rendering Pipeline** ([`rendering`]) - Forward rendering with a depth buffer
//!
//! The picking and drag modules are pure geometry and state over the scene
//! arena; they never touch the GPU and are exercised headless by their tests.

pub mod camera;
pub mod drag;
pub mod geometry;
pub mod picking;
pub mod rendering;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
