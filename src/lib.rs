// src/lib.rs
//! artgrid
//!
//! A 3D gallery of image panels built on wgpu and winit: orbit around a
//! slowly turning grid of artworks, click one to open it in a lightbox, and
//! the first click starts the background music.

pub mod app;
pub mod config;
pub mod error;
pub mod gallery;
pub mod gfx;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::GalleryApp;
pub use config::GalleryConfig;
pub use error::{GalleryError, Result};
