//! # Procedural Geometry
//!
//! Panel meshes are generated in code; there are no model files.
//!
//! - [`generate_panel`]: a textured box, every face carrying the full image
//! - [`generate_box_edges`]: the twelve edges of the same box as a line list

pub mod primitives;

pub use primitives::*;

use crate::gfx::rendering::vertex::{LineVertex, PanelVertex};

/// Generated geometry ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v), v = 0 at the top of the image
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleaves the attribute streams into the renderer's vertex format.
    pub fn to_panel_vertices(&self) -> Vec<PanelVertex> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, position)| PanelVertex {
                position: *position,
                normal: self.normals.get(i).copied().unwrap_or([0.0, 0.0, 1.0]),
                uv: self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect()
    }
}

/// Converts a line-list position stream to vertices.
pub fn to_line_vertices(positions: &[[f32; 3]]) -> Vec<LineVertex> {
    positions
        .iter()
        .map(|position| LineVertex {
            position: *position,
        })
        .collect()
}
