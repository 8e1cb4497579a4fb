//! # User Interface Module
//!
//! Dear ImGui drawn on top of the 3D scene. The gallery has no windows or
//! widgets; the UI layer exists to draw the lightbox overlay.
//!
//! - [`UiManager`] - ImGui integration with winit and wgpu, plus the textures
//!   the overlay shows
//! - [`LightboxOverlay`] - backdrop, framed image and close button, reporting
//!   which dismissal trigger a click fired

pub mod lightbox_overlay;
pub mod manager;

pub use lightbox_overlay::LightboxOverlay;
pub use manager::UiManager;
