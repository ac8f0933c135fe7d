//! # Rendering Pipeline
//!
//! Forward renderer for the Parlor engine: one pipeline, a depth buffer, the
//! camera uniform at bind group 0 and the per-node world transform at bind
//! group 1. Shading is a fixed directional light - the room scene needs
//! nothing fancier.

pub mod render_engine;

pub use render_engine::RenderEngine;
