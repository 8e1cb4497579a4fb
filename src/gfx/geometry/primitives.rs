//! # Primitive Shape Generation

use super::GeometryData;

/// Generate a box of the given extents centred at the origin
///
/// Each face has its own four vertices so that normals stay flat and every
/// face maps the whole image, upright when viewed from outside.
pub fn generate_panel(width: f32, height: f32, depth: f32) -> GeometryData {
    let (x, y, z) = (width / 2.0, height / 2.0, depth / 2.0);
    let mut data = GeometryData::new();

    // Corners listed bottom-left, bottom-right, top-right, top-left as seen
    // from outside the face.
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        // Front (+Z)
        ([0.0, 0.0, 1.0], [[-x, -y, z], [x, -y, z], [x, y, z], [-x, y, z]]),
        // Back (-Z)
        ([0.0, 0.0, -1.0], [[x, -y, -z], [-x, -y, -z], [-x, y, -z], [x, y, -z]]),
        // Left (-X)
        ([-1.0, 0.0, 0.0], [[-x, -y, -z], [-x, -y, z], [-x, y, z], [-x, y, -z]]),
        // Right (+X)
        ([1.0, 0.0, 0.0], [[x, -y, z], [x, -y, -z], [x, y, -z], [x, y, z]]),
        // Top (+Y)
        ([0.0, 1.0, 0.0], [[-x, y, z], [x, y, z], [x, y, -z], [-x, y, -z]]),
        // Bottom (-Y)
        ([0.0, -1.0, 0.0], [[-x, -y, -z], [x, -y, -z], [x, -y, z], [-x, -y, z]]),
    ];
    let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

    for (normal, corners) in faces {
        let base = data.vertices.len() as u32;
        for (corner, uv) in corners.iter().zip(uvs) {
            data.vertices.push(*corner);
            data.normals.push(normal);
            data.tex_coords.push(uv);
        }
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

/// The twelve edges of a centred box as line-list endpoint pairs.
pub fn generate_box_edges(width: f32, height: f32, depth: f32) -> Vec<[f32; 3]> {
    let (x, y, z) = (width / 2.0, height / 2.0, depth / 2.0);
    let corner = |i: usize| {
        [
            if i & 1 == 0 { -x } else { x },
            if i & 2 == 0 { -y } else { y },
            if i & 4 == 0 { -z } else { z },
        ]
    };

    // Corners differing in exactly one bit share an edge.
    let mut lines = Vec::with_capacity(24);
    for a in 0..8usize {
        for bit in [1usize, 2, 4] {
            let b = a | bit;
            if b != a {
                lines.push(corner(a));
                lines.push(corner(b));
            }
        }
    }
    lines
}
