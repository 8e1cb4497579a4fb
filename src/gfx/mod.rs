//! # Graphics Module
//!
//! Everything that touches the GPU or raw window input.
//!
//! - **Camera** ([`camera`]): damped orbit camera and its mouse controller
//! - **Colour** ([`color`]): one-time surface format and anisotropy negotiation
//! - **Geometry** ([`geometry`]): procedural panel box and outline edges
//! - **Rendering** ([`rendering`]): pipelines and the per-frame panel pass
//! - **Resources** ([`resources`]): decoded images and GPU textures

pub mod camera;
pub mod color;
pub mod geometry;
pub mod rendering;
pub mod resources;

pub use camera::orbit_camera::OrbitCamera;
pub use color::{ColorPipeline, RenderCapabilities};
pub use rendering::render_engine::RenderEngine;
