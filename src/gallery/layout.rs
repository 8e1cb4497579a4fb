//! Scene builder: lays the artworks out on a centred, row-major grid.

use cgmath::Vector3;

use crate::config::{GridLayout, PanelSize};
use crate::gallery::picking::AABB;
use crate::gallery::registry::{GalleryScene, InteractiveObject, NodeKind, NodeTransform};

/// Extra reach of an outline's pick volume beyond its panel, in world units.
pub const OUTLINE_PICK_MARGIN: f32 = 0.02;

/// Row and column of grid slot `index`.
pub fn grid_cell(index: usize, columns: usize) -> (usize, usize) {
    let columns = columns.max(1);
    (index / columns, index % columns)
}

/// World position of grid slot `index`.
///
/// Columns are centred on x = 0; rows start at `top_y` and step down.
pub fn grid_position(index: usize, layout: &GridLayout) -> Vector3<f32> {
    let (row, col) = grid_cell(index, layout.columns);
    let start_x = -((layout.columns.max(1) - 1) as f32 * layout.spacing_x) / 2.0;
    Vector3::new(
        start_x + col as f32 * layout.spacing_x,
        layout.top_y - row as f32 * layout.spacing_y,
        layout.z,
    )
}

/// Builds one panel (with its outline child) per identifier, registered in order.
pub fn build_scene(images: &[String], layout: &GridLayout, panel: &PanelSize) -> GalleryScene {
    let mut scene = GalleryScene::new();
    let panel_bounds = AABB::centered(panel.width, panel.height, panel.depth);

    for (index, image) in images.iter().enumerate() {
        let (row, col) = grid_cell(index, layout.columns);
        let node = scene.graph.add_node(
            NodeKind::Panel,
            None,
            NodeTransform::at(grid_position(index, layout)),
            panel_bounds,
        );
        let outline = scene.graph.add_node(
            NodeKind::Outline,
            Some(node),
            NodeTransform::identity(),
            panel_bounds.inflated(OUTLINE_PICK_MARGIN),
        );
        scene.register(InteractiveObject {
            node,
            outline,
            image: image.clone(),
            row,
            col,
        });
    }

    log::info!(
        "Built gallery grid: {} panels in {} columns",
        scene.len(),
        layout.columns
    );
    scene
}
