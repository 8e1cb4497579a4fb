//! Scene graph of gallery panels and the registry of clickable objects.
//!
//! Each artwork is a panel node with an outline node parented to it. The
//! registry lists the panel nodes in grid order; picking resolves hits on an
//! outline back to its panel by walking parents until it meets a registered
//! node or runs off the root.

use cgmath::{Matrix4, Rad, Vector3, Zero};

use crate::gallery::picking::AABB;

pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Textured box carrying the artwork.
    Panel,
    /// Edge lines drawn around a panel.
    Outline,
}

/// Translation followed by a rotation about the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    pub translation: Vector3<f32>,
    pub rotation_y: Rad<f32>,
}

impl NodeTransform {
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zero(),
            rotation_y: Rad(0.0),
        }
    }

    pub fn at(translation: Vector3<f32>) -> Self {
        Self {
            translation,
            rotation_y: Rad(0.0),
        }
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.translation) * Matrix4::from_angle_y(self.rotation_y)
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub transform: NodeTransform,
    /// Bounds in the node's local space.
    pub bounds: AABB,
}

#[derive(Debug, Default, Clone)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(
        &mut self,
        kind: NodeKind,
        parent: Option<NodeId>,
        transform: NodeTransform,
        bounds: AABB,
    ) -> NodeId {
        self.nodes.push(SceneNode {
            kind,
            parent,
            transform,
            bounds,
        });
        self.nodes.len() - 1
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().enumerate()
    }

    /// Composes local transforms from the root down to `id`.
    pub fn world_transform(&self, id: NodeId) -> Matrix4<f32> {
        let mut matrix = Matrix4::from_scale(1.0);
        let mut current = Some(id);
        // Parents always precede children, so the walk is bounded by `id`.
        while let Some(node_id) = current {
            let Some(node) = self.nodes.get(node_id) else {
                break;
            };
            matrix = node.transform.matrix() * matrix;
            current = node.parent.filter(|parent| *parent < node_id);
        }
        matrix
    }
}

/// A clickable artwork: a panel node tagged with its image identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractiveObject {
    pub node: NodeId,
    pub outline: NodeId,
    pub image: String,
    pub row: usize,
    pub col: usize,
}

/// Registered objects in grid order plus the graph they live in.
#[derive(Debug, Default, Clone)]
pub struct GalleryScene {
    pub graph: SceneGraph,
    objects: Vec<InteractiveObject>,
}

impl GalleryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an object; identifiers are validated non-empty upstream.
    pub fn register(&mut self, object: InteractiveObject) -> usize {
        debug_assert!(!object.image.is_empty());
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn objects(&self) -> &[InteractiveObject] {
        &self.objects
    }

    pub fn object(&self, index: usize) -> Option<&InteractiveObject> {
        self.objects.get(index)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Registry index of the object whose panel is `node`.
    pub fn registry_index(&self, node: NodeId) -> Option<usize> {
        self.objects.iter().position(|object| object.node == node)
    }

    /// Walks from `node` towards the root and returns the first registered ancestor.
    pub fn owning_object(&self, node: NodeId) -> Option<usize> {
        let mut current = Some(node);
        let mut steps = 0;
        while let Some(node_id) = current {
            if let Some(index) = self.registry_index(node_id) {
                return Some(index);
            }
            current = self.graph.parent(node_id);
            steps += 1;
            if steps > self.graph.len() {
                return None;
            }
        }
        None
    }

    pub fn position(&self, index: usize) -> Option<Vector3<f32>> {
        let object = self.objects.get(index)?;
        self.graph.node(object.node).map(|node| node.transform.translation)
    }

    pub fn rotation(&self, index: usize) -> Option<f32> {
        let object = self.objects.get(index)?;
        self.graph.node(object.node).map(|node| node.transform.rotation_y.0)
    }

    /// Adds `delta` radians about the vertical axis to every registered panel.
    pub fn rotate_all(&mut self, delta: f32) {
        for object in &self.objects {
            if let Some(node) = self.graph.node_mut(object.node) {
                node.transform.rotation_y.0 += delta;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_bounds() -> AABB {
        AABB::new(Vector3::new(-0.5, -0.5, -0.5), Vector3::new(0.5, 0.5, 0.5))
    }

    fn scene_with_one_panel() -> GalleryScene {
        let mut scene = GalleryScene::new();
        let node = scene.graph.add_node(
            NodeKind::Panel,
            None,
            NodeTransform::at(Vector3::new(1.0, 2.0, 0.0)),
            unit_bounds(),
        );
        let outline = scene.graph.add_node(
            NodeKind::Outline,
            Some(node),
            NodeTransform::identity(),
            unit_bounds(),
        );
        scene.register(InteractiveObject {
            node,
            outline,
            image: "/art1.jpeg".into(),
            row: 0,
            col: 0,
        });
        scene
    }

    #[test]
    fn test_outline_resolves_to_owning_panel() {
        let scene = scene_with_one_panel();
        let outline = scene.objects()[0].outline;
        assert_eq!(scene.owning_object(outline), Some(0));
        assert_eq!(scene.owning_object(scene.objects()[0].node), Some(0));
    }

    #[test]
    fn test_unregistered_chain_ends_at_root() {
        let mut scene = scene_with_one_panel();
        let stray = scene.graph.add_node(
            NodeKind::Outline,
            None,
            NodeTransform::identity(),
            unit_bounds(),
        );
        assert_eq!(scene.owning_object(stray), None);
        assert_eq!(scene.owning_object(999), None);
    }

    #[test]
    fn test_child_world_transform_follows_parent() {
        let scene = scene_with_one_panel();
        let outline = scene.objects()[0].outline;
        let world = scene.graph.world_transform(outline);
        assert_eq!(world.w.x, 1.0);
        assert_eq!(world.w.y, 2.0);
    }

    #[test]
    fn test_rotate_all_only_touches_panels() {
        let mut scene = scene_with_one_panel();
        scene.rotate_all(0.25);
        scene.rotate_all(0.25);
        assert_eq!(scene.rotation(0), Some(0.5));
        let outline = scene.objects()[0].outline;
        assert_eq!(scene.graph.node(outline).unwrap().transform.rotation_y, Rad(0.0));
    }
}
