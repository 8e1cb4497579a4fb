//! GPU resource management

pub mod texture_resource;

pub use texture_resource::{DecodedImage, TextureResource};
