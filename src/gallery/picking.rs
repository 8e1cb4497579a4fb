//! # Object Picking
//!
//! Maps a pointer position to the gallery panel under it.
//!
//! ## How it works
//!
//! 1. **Pointer to NDC**: normalize the pointer against the viewport rectangle
//!    into [-1, 1] on both axes, Y flipped
//! 2. **NDC to Ray**: unproject the near and far points through the camera
//! 3. **Ray-Node Intersection**: test every node of the scene graph (panels and
//!    their outline decorations) as an oriented box
//! 4. **Ownership**: take the nearest hit and walk its parents up to the first
//!    registered panel
//!
//! ## Usage
//!
//! ```no_run
//! use artgrid::gallery::picking::{Picker, ViewportRect};
//! # fn demo(camera: &artgrid::gfx::OrbitCamera, scene: &artgrid::gallery::registry::GalleryScene) {
//! let viewport = ViewportRect::new(0.0, 0.0, 1200.0, 800.0);
//! let sample = viewport.normalize(600.0, 400.0);
//! if let Some(hit) = Picker::new().pick(sample, camera, scene).hit() {
//!     println!("clicked {}", scene.objects()[hit.object_index].image);
//! }
//! # }
//! ```

use cgmath::{ElementWise, InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4, Zero};

use crate::gallery::registry::{GalleryScene, NodeId};
use crate::gfx::camera::orbit_camera::OrbitCamera;

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Create a new ray
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// Expresses the ray in the space described by `inverse`.
    ///
    /// The direction is not renormalized so that `t` keeps its world meaning
    /// under rigid transforms.
    fn transformed(&self, inverse: &Matrix4<f32>) -> Self {
        let origin = inverse * self.origin.extend(1.0);
        let direction = inverse * self.direction.extend(0.0);
        Self {
            origin: origin.truncate() / origin.w,
            direction: direction.truncate(),
        }
    }
}

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl AABB {
    /// Create a new AABB
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Box of the given extents centred on the origin.
    pub fn centered(width: f32, height: f32, depth: f32) -> Self {
        let half = Vector3::new(width, height, depth) * 0.5;
        Self::new(-half, half)
    }

    /// Create AABB from a set of vertices
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        if vertices.is_empty() {
            return Self::new(Vector3::zero(), Vector3::zero());
        }

        let mut min = Vector3::new(vertices[0][0], vertices[0][1], vertices[0][2]);
        let mut max = min;

        for vertex in vertices.iter().skip(1) {
            let v = Vector3::new(vertex[0], vertex[1], vertex[2]);
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            min.z = min.z.min(v.z);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
            max.z = max.z.max(v.z);
        }

        Self::new(min, max)
    }

    /// Grows the box by `margin` on every side.
    pub fn inflated(&self, margin: f32) -> Self {
        let m = Vector3::new(margin, margin, margin);
        Self::new(self.min - m, self.max + m)
    }

    /// Test ray-AABB intersection
    /// Returns the distance to intersection point, or None if no intersection
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t1 = Vector3::new(
            t_min.x.min(t_max.x),
            t_min.y.min(t_max.y),
            t_min.z.min(t_max.z),
        );
        let t2 = Vector3::new(
            t_min.x.max(t_max.x),
            t_min.y.max(t_max.y),
            t_min.z.max(t_max.z),
        );

        let t_near = t1.x.max(t1.y.max(t1.z));
        let t_far = t2.x.min(t2.y.min(t2.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }

    /// Intersects a world-space ray with this box placed by `world`.
    pub fn intersect_oriented(&self, ray: &Ray, world: &Matrix4<f32>) -> Option<f32> {
        let inverse = world.invert()?;
        self.intersect_ray(&ray.transformed(&inverse))
    }
}

/// Pointer position in normalized device coordinates, both axes in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
}

/// The render viewport's bounding rectangle in window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewportRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }

    /// Converts window coordinates to NDC, flipping Y so that up is positive.
    pub fn normalize(&self, client_x: f32, client_y: f32) -> PointerSample {
        let width = self.width.max(1.0);
        let height = self.height.max(1.0);
        PointerSample {
            x: ((client_x - self.left) / width) * 2.0 - 1.0,
            y: -((client_y - self.top) / height) * 2.0 + 1.0,
        }
    }
}

/// One ray hit against a scene node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub node: NodeId,
    pub distance: f32,
}

/// Result of an object picking operation
#[derive(Debug, Clone)]
pub struct PickResult {
    /// Index of the picked object in the registry
    pub object_index: usize,
    /// Node the ray actually hit; may be a decoration of the object
    pub node: NodeId,
    /// Distance from camera to intersection point
    pub distance: f32,
    /// World space intersection point
    pub intersection_point: Vector3<f32>,
}

/// What a pointer-down found.
#[derive(Debug, Clone)]
pub enum PickOutcome {
    /// The nearest hit belongs to a registered object.
    Hit(PickResult),
    /// Something was hit, but its parent chain reached the root without
    /// meeting a registered object.
    Unclaimed { node: NodeId },
    /// The ray crossed nothing.
    Miss,
}

impl PickOutcome {
    pub fn hit(self) -> Option<PickResult> {
        match self {
            PickOutcome::Hit(result) => Some(result),
            _ => None,
        }
    }
}

/// Stateless ray picker over a [`GalleryScene`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Picker;

impl Picker {
    pub fn new() -> Self {
        Self
    }

    /// Convert a normalized pointer sample to a world-space ray
    pub fn screen_to_ray(&self, sample: PointerSample, camera: &OrbitCamera) -> Ray {
        let inv_view_proj = camera
            .gl_view_projection()
            .invert()
            .unwrap_or(Matrix4::from_scale(1.0));

        let unproject = |ndc_z: f32| {
            let world = inv_view_proj * Vector4::new(sample.x, sample.y, ndc_z, 1.0);
            world.truncate() / world.w
        };

        let near_3d = unproject(-1.0);
        let far_3d = unproject(1.0);
        Ray::new(near_3d, far_3d - near_3d)
    }

    /// Every node the ray crosses, nearest first.
    pub fn intersect_all(&self, ray: &Ray, scene: &GalleryScene) -> Vec<Intersection> {
        let mut hits: Vec<Intersection> = scene
            .graph
            .iter()
            .filter_map(|(node, scene_node)| {
                let world = scene.graph.world_transform(node);
                scene_node
                    .bounds
                    .intersect_oriented(ray, &world)
                    .map(|distance| Intersection { node, distance })
            })
            .collect();
        // Stable sort: exact ties keep traversal order.
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Pick the registered object under the pointer, if any
    pub fn pick(
        &self,
        sample: PointerSample,
        camera: &OrbitCamera,
        scene: &GalleryScene,
    ) -> PickOutcome {
        let ray = self.screen_to_ray(sample, camera);
        let Some(nearest) = self.intersect_all(&ray, scene).into_iter().next() else {
            return PickOutcome::Miss;
        };
        let Some(object_index) = scene.owning_object(nearest.node) else {
            return PickOutcome::Unclaimed { node: nearest.node };
        };

        PickOutcome::Hit(PickResult {
            object_index,
            node: nearest.node,
            distance: nearest.distance,
            intersection_point: ray.point_at(nearest.distance),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GridLayout, PanelSize};
    use crate::gallery::layout::build_scene;
    use crate::gallery::registry::{NodeKind, NodeTransform};

    fn camera(aspect: f32) -> OrbitCamera {
        OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), aspect).with_fov(cgmath::Deg(75.0))
    }

    fn images(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("/art{i}.jpeg")).collect()
    }

    #[test]
    fn test_aabb_creation() {
        let vertices = vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [-1.0, -1.0, -1.0]];
        let aabb = AABB::from_vertices(&vertices);

        assert_eq!(aabb.min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(aabb.max, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_ray_aabb_intersection() {
        let aabb = AABB::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));

        // Ray hitting the box
        let ray = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));

        assert_eq!(aabb.intersect_ray(&ray), Some(4.0));

        // Ray missing the box
        let ray_miss = Ray::new(Vector3::new(5.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));

        assert!(aabb.intersect_ray(&ray_miss).is_none());
    }

    #[test]
    fn test_oriented_box_follows_rotation() {
        // A thin slab seen edge-on after a quarter turn.
        let slab = AABB::centered(2.0, 2.0, 0.1);
        let ray = Ray::new(Vector3::new(0.8, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));

        let facing = Matrix4::from_scale(1.0);
        assert!(slab.intersect_oriented(&ray, &facing).is_some());

        let edge_on = Matrix4::from_angle_y(cgmath::Rad(std::f32::consts::FRAC_PI_2));
        assert!(slab.intersect_oriented(&ray, &edge_on).is_none());
    }

    #[test]
    fn test_viewport_normalization_flips_y() {
        let viewport = ViewportRect::new(100.0, 50.0, 800.0, 600.0);
        assert_eq!(viewport.normalize(500.0, 350.0), PointerSample { x: 0.0, y: 0.0 });
        assert_eq!(viewport.normalize(100.0, 50.0), PointerSample { x: -1.0, y: 1.0 });
        assert_eq!(viewport.normalize(900.0, 650.0), PointerSample { x: 1.0, y: -1.0 });
    }

    #[test]
    fn test_center_ray_points_down_negative_z() {
        let picker = Picker::new();
        let ray = picker.screen_to_ray(PointerSample { x: 0.0, y: 0.0 }, &camera(1.5));
        assert!(ray.direction.x.abs() < 1e-4);
        assert!(ray.direction.y.abs() < 1e-4);
        assert!((ray.direction.z + 1.0).abs() < 1e-4);
        assert!((ray.origin.z - 4.9).abs() < 1e-3);
    }

    #[test]
    fn test_pick_hits_panel_under_pointer() {
        // Single row of three: x = -3, 0, 3.
        let layout = GridLayout {
            columns: 3,
            top_y: 0.0,
            ..GridLayout::default()
        };
        let scene = build_scene(&images(3), &layout, &PanelSize::default());
        let picker = Picker::new();

        let hit = picker
            .pick(PointerSample { x: 0.0, y: 0.0 }, &camera(1.0), &scene)
            .hit()
            .expect("centre panel");
        assert_eq!(hit.object_index, 1);
        assert_eq!(scene.objects()[hit.object_index].image, "/art2.jpeg");
        assert!(hit.distance > 4.0 && hit.distance < 5.0);
    }

    #[test]
    fn test_pick_misses_empty_space() {
        let layout = GridLayout {
            columns: 3,
            top_y: 0.0,
            ..GridLayout::default()
        };
        let scene = build_scene(&images(3), &layout, &PanelSize::default());
        // Between the centre panel (half-width 0.8) and its neighbour at x = 3.
        let miss_x = 1.5 / (5.0 * (75f32.to_radians() / 2.0).tan());
        let result = Picker::new().pick(PointerSample { x: miss_x, y: 0.0 }, &camera(1.0), &scene);
        assert!(matches!(result, PickOutcome::Miss));
    }

    #[test]
    fn test_decoration_hit_resolves_to_owner() {
        let layout = GridLayout {
            columns: 1,
            top_y: 0.0,
            ..GridLayout::default()
        };
        let scene = build_scene(&images(1), &layout, &PanelSize::default());
        let hit = Picker::new()
            .pick(PointerSample { x: 0.0, y: 0.0 }, &camera(1.0), &scene)
            .hit()
            .expect("hit");

        // The outline sits slightly proud of the panel, so it is hit first.
        assert_eq!(
            scene.graph.node(hit.node).map(|n| n.kind),
            Some(NodeKind::Outline)
        );
        assert_eq!(hit.object_index, 0);
    }

    #[test]
    fn test_unowned_nearest_hit_is_unclaimed() {
        let layout = GridLayout {
            columns: 1,
            top_y: 0.0,
            ..GridLayout::default()
        };
        let mut scene = build_scene(&images(1), &layout, &PanelSize::default());
        // A free-standing node in front of the panel, not owned by any object.
        let stray = scene.graph.add_node(
            NodeKind::Outline,
            None,
            NodeTransform::at(Vector3::new(0.0, 0.0, 1.0)),
            AABB::centered(1.0, 1.0, 0.1),
        );
        let result = Picker::new().pick(PointerSample { x: 0.0, y: 0.0 }, &camera(1.0), &scene);
        assert!(matches!(result, PickOutcome::Unclaimed { node } if node == stray));
    }

    #[test]
    fn test_coincident_panels_pick_earlier_registration() {
        use crate::gallery::registry::{GalleryScene, InteractiveObject};

        let mut scene = GalleryScene::new();
        for image in ["/first.jpeg", "/second.jpeg"] {
            let node = scene.graph.add_node(
                NodeKind::Panel,
                None,
                NodeTransform::identity(),
                AABB::centered(1.6, 1.6, 0.12),
            );
            let outline = scene.graph.add_node(
                NodeKind::Outline,
                Some(node),
                NodeTransform::identity(),
                AABB::centered(1.6, 1.6, 0.12),
            );
            scene.register(InteractiveObject {
                node,
                outline,
                image: image.to_string(),
                row: 0,
                col: 0,
            });
        }

        let picker = Picker::new();
        let ray = picker.screen_to_ray(PointerSample { x: 0.0, y: 0.0 }, &camera(1.0));
        let hits = picker.intersect_all(&ray, &scene);
        assert_eq!(hits.len(), 4);
        assert!(hits.iter().all(|hit| hit.distance == hits[0].distance));
        assert_eq!(
            hits.iter().map(|hit| hit.node).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );

        let hit = picker
            .pick(PointerSample { x: 0.0, y: 0.0 }, &camera(1.0), &scene)
            .hit()
            .expect("coincident panels");
        assert_eq!(hit.node, 0);
        assert_eq!(hit.object_index, 0);
        assert_eq!(scene.objects()[hit.object_index].image, "/first.jpeg");
    }
}
