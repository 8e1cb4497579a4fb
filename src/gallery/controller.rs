//! The gallery's single owner of mutable state.
//!
//! Input arrives as [`GalleryEvent`]s; each call to [`GalleryController::handle`]
//! runs to completion and returns the effects the shell must apply to the
//! window, the overlay surface and the audio device. Camera input toggling is
//! applied here directly since the controller owns the camera.

use cgmath::Vector3;

use crate::config::GalleryConfig;
use crate::gallery::animation::AnimationDriver;
use crate::gallery::effect::Effect;
use crate::gallery::layout::build_scene;
use crate::gallery::lightbox::{DismissTrigger, Lightbox, OverlayId};
use crate::gallery::picking::{PickOutcome, Picker, ViewportRect};
use crate::gallery::registry::GalleryScene;
use crate::gfx::camera::CameraManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GalleryEvent {
    /// Primary button pressed over the 3D view, in physical window pixels.
    PointerDown { x: f32, y: f32 },
    /// A completed click anywhere in the window.
    Click,
    KeyDown(Key),
    /// The overlay surface reports one of its dismissal triggers firing.
    OverlayClicked {
        overlay: OverlayId,
        trigger: DismissTrigger,
    },
    Resized { width: u32, height: u32 },
}

pub struct GalleryController {
    scene: GalleryScene,
    lightbox: Lightbox,
    camera: CameraManager,
    viewport: ViewportRect,
    animation: AnimationDriver,
    picker: Picker,
}

impl GalleryController {
    pub fn new(config: &GalleryConfig, width: u32, height: u32) -> Self {
        let scene = build_scene(&config.images, &config.layout, &config.panel);
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        Self {
            scene,
            lightbox: Lightbox::new(),
            camera: CameraManager::from_config(&config.camera, aspect),
            viewport: ViewportRect::from_size(width, height),
            animation: AnimationDriver::from_config(&config.rotation),
            picker: Picker::new(),
        }
    }

    pub fn scene(&self) -> &GalleryScene {
        &self.scene
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    pub fn camera(&self) -> &CameraManager {
        &self.camera
    }

    /// Mutable camera access for raw device input (drag, wheel).
    pub fn camera_mut(&mut self) -> &mut CameraManager {
        &mut self.camera
    }

    pub fn viewport(&self) -> ViewportRect {
        self.viewport
    }

    pub fn handle(&mut self, event: GalleryEvent) -> Vec<Effect> {
        let effects = match event {
            GalleryEvent::PointerDown { x, y } => self.on_pointer_down(x, y),
            GalleryEvent::Click => vec![Effect::StartBackgroundAudio],
            GalleryEvent::KeyDown(Key::Escape) if self.lightbox.is_open() => self.lightbox.close(),
            GalleryEvent::KeyDown(_) => Vec::new(),
            GalleryEvent::OverlayClicked { overlay, trigger } => {
                if self.lightbox.current_overlay() == Some(overlay) {
                    log::debug!("Overlay {overlay} dismissed by {trigger:?}");
                    self.lightbox.close()
                } else {
                    log::debug!("Ignoring {trigger:?} from stale overlay {overlay}");
                    Vec::new()
                }
            }
            GalleryEvent::Resized { width, height } => self.on_resize(width, height),
        };
        self.apply_local(effects)
    }

    /// One display refresh: rotation (unless the lightbox is open) and damping.
    pub fn tick(&mut self) -> bool {
        self.animation
            .tick(&mut self.scene, self.lightbox.is_open(), &mut self.camera)
    }

    fn on_pointer_down(&mut self, x: f32, y: f32) -> Vec<Effect> {
        let sample = self.viewport.normalize(x, y);
        match self.picker.pick(sample, &self.camera.camera, &self.scene) {
            PickOutcome::Hit(hit) => {
                let Some(object) = self.scene.object(hit.object_index) else {
                    return Vec::new();
                };
                log::debug!(
                    "Picked panel {} ({}) at distance {:.3}",
                    hit.object_index,
                    object.image,
                    hit.distance
                );
                let image = object.image.clone();
                self.lightbox.open(&image)
            }
            PickOutcome::Unclaimed { node } => {
                log::debug!("Nearest hit on node {node} has no registered owner");
                Vec::new()
            }
            PickOutcome::Miss if self.lightbox.is_open() => {
                log::debug!("Pointer-down missed every panel; closing lightbox");
                self.lightbox.close()
            }
            PickOutcome::Miss => Vec::new(),
        }
    }

    fn on_resize(&mut self, width: u32, height: u32) -> Vec<Effect> {
        if width == 0 || height == 0 {
            return Vec::new();
        }
        self.viewport = ViewportRect::from_size(width, height);
        self.camera.camera.resize_projection(width, height);
        vec![Effect::ResizeSurface { width, height }]
    }

    /// Applies effects aimed at state the controller owns and passes the rest on.
    fn apply_local(&mut self, effects: Vec<Effect>) -> Vec<Effect> {
        effects
            .into_iter()
            .filter(|effect| match effect {
                Effect::SetCameraInput(enabled) => {
                    self.camera.set_input_enabled(*enabled);
                    false
                }
                _ => true,
            })
            .collect()
    }

    /// World position of a registered panel, as placed by the scene builder.
    pub fn panel_position(&self, index: usize) -> Option<Vector3<f32>> {
        self.scene.position(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridLayout;

    const WIDTH: u32 = 1000;
    const HEIGHT: u32 = 1000;

    /// Three panels in one row at x = -3, 0, 3, viewed head-on.
    fn controller() -> GalleryController {
        let config = GalleryConfig {
            images: vec!["/left.jpeg".into(), "/mid.jpeg".into(), "/right.jpeg".into()],
            layout: GridLayout {
                columns: 3,
                top_y: 0.0,
                ..GridLayout::default()
            },
            ..GalleryConfig::default()
        };
        GalleryController::new(&config, WIDTH, HEIGHT)
    }

    fn centre() -> GalleryEvent {
        GalleryEvent::PointerDown {
            x: WIDTH as f32 / 2.0,
            y: HEIGHT as f32 / 2.0,
        }
    }

    fn empty_space() -> GalleryEvent {
        GalleryEvent::PointerDown { x: 10.0, y: 10.0 }
    }

    fn count(effects: &[Effect], pred: impl Fn(&Effect) -> bool) -> usize {
        effects.iter().filter(|e| pred(e)).count()
    }

    #[test]
    fn test_miss_while_closed_is_noop() {
        let mut gallery = controller();
        assert!(gallery.handle(empty_space()).is_empty());
        assert!(!gallery.lightbox().is_open());
        assert!(gallery.camera().input_enabled());
    }

    #[test]
    fn test_hit_opens_on_picked_image() {
        let mut gallery = controller();
        let effects = gallery.handle(centre());

        assert!(gallery.lightbox().is_open());
        assert_eq!(gallery.lightbox().current_image(), Some("/mid.jpeg"));
        assert!(!gallery.camera().input_enabled());
        assert!(effects
            .iter()
            .any(|e| matches!(e, Effect::ShowOverlay(spec) if spec.image == "/mid.jpeg")));
        assert!(effects.contains(&Effect::SetScrollLocked(true)));
        assert_eq!(count(&effects, |e| matches!(e, Effect::SetCameraInput(_))), 0);
    }

    #[test]
    fn test_miss_while_open_closes_exactly_once() {
        let mut gallery = controller();
        gallery.handle(centre());
        let overlay = gallery.lightbox().current_overlay().unwrap();

        let effects = gallery.handle(empty_space());
        assert!(!gallery.lightbox().is_open());
        assert!(gallery.camera().input_enabled());
        assert_eq!(
            count(&effects, |e| *e == Effect::RemoveOverlay(overlay)),
            1
        );
        assert!(effects.contains(&Effect::SetScrollLocked(false)));

        assert!(gallery.handle(empty_space()).is_empty());
    }

    #[test]
    fn test_second_hit_while_open_keeps_one_overlay() {
        let mut gallery = controller();
        let first = gallery.handle(centre());
        let second = gallery.handle(centre());
        let shown = |e: &Effect| matches!(e, Effect::ShowOverlay(_));
        assert_eq!(count(&first, shown) + count(&second, shown), 1);
    }

    #[test]
    fn test_escape_closes_only_when_open() {
        let mut gallery = controller();
        assert!(gallery.handle(GalleryEvent::KeyDown(Key::Escape)).is_empty());

        gallery.handle(centre());
        assert!(gallery.handle(GalleryEvent::KeyDown(Key::Other)).is_empty());
        assert!(gallery.lightbox().is_open());

        let effects = gallery.handle(GalleryEvent::KeyDown(Key::Escape));
        assert!(!gallery.lightbox().is_open());
        assert!(!effects.is_empty());
    }

    #[test]
    fn test_overlay_triggers_close_only_their_own_overlay() {
        let mut gallery = controller();
        gallery.handle(centre());
        let overlay = gallery.lightbox().current_overlay().unwrap();

        let stale = GalleryEvent::OverlayClicked {
            overlay: overlay + 100,
            trigger: DismissTrigger::Backdrop,
        };
        assert!(gallery.handle(stale).is_empty());
        assert!(gallery.lightbox().is_open());

        gallery.handle(GalleryEvent::OverlayClicked {
            overlay,
            trigger: DismissTrigger::CloseButton,
        });
        assert!(!gallery.lightbox().is_open());
    }

    #[test]
    fn test_click_requests_audio() {
        let mut gallery = controller();
        assert_eq!(
            gallery.handle(GalleryEvent::Click),
            vec![Effect::StartBackgroundAudio]
        );
    }

    #[test]
    fn test_rotation_gated_by_lightbox() {
        let mut gallery = controller();
        gallery.handle(centre());
        for _ in 0..5 {
            gallery.tick();
        }
        assert_eq!(gallery.scene().rotation(0), Some(0.0));

        gallery.handle(GalleryEvent::KeyDown(Key::Escape));
        for _ in 0..5 {
            gallery.tick();
        }
        let angle = gallery.scene().rotation(0).unwrap();
        assert!((angle - 0.025).abs() < 1e-5);
    }

    #[test]
    fn test_resize_updates_aspect_and_surface_only() {
        let mut gallery = controller();
        let positions: Vec<_> = (0..3).map(|i| gallery.panel_position(i)).collect();

        let effects = gallery.handle(GalleryEvent::Resized {
            width: 1600,
            height: 900,
        });
        assert_eq!(
            effects,
            vec![Effect::ResizeSurface {
                width: 1600,
                height: 900
            }]
        );
        assert!((gallery.camera().camera.aspect - 1600.0 / 900.0).abs() < 1e-5);
        assert_eq!(gallery.viewport(), ViewportRect::from_size(1600, 900));
        assert_eq!(gallery.scene().len(), 3);
        for (i, position) in positions.into_iter().enumerate() {
            assert_eq!(gallery.panel_position(i), position);
        }

        assert!(gallery
            .handle(GalleryEvent::Resized { width: 0, height: 0 })
            .is_empty());
    }

    #[test]
    fn test_default_grid_index_seven() {
        let gallery = GalleryController::new(&GalleryConfig::default(), 1200, 800);
        let object = gallery.scene().object(7).unwrap();
        assert_eq!((object.row, object.col), (1, 1));
        assert_eq!(gallery.panel_position(7), Some(Vector3::new(-4.5, 0.0, 0.0)));
    }
}
