//! Per-frame panel rotation, suspended while the lightbox is open.

use crate::config::RotationConfig;
use crate::gallery::registry::GalleryScene;
use crate::gfx::camera::CameraManager;

/// Per-frame update: ambient panel rotation followed by camera damping.
#[derive(Debug, Clone, Copy)]
pub struct AnimationDriver {
    increment: f32,
    enabled: bool,
    ticks: u64,
}

impl AnimationDriver {
    pub fn new(increment: f32, enabled: bool) -> Self {
        Self {
            increment,
            enabled,
            ticks: 0,
        }
    }

    pub fn from_config(config: &RotationConfig) -> Self {
        Self::new(config.increment, config.enabled)
    }

    pub fn set_rotation_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn rotation_enabled(&self) -> bool {
        self.enabled
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advances one display refresh. Rotation is skipped while the lightbox is
    /// open; damping always runs. Returns whether the panels moved.
    pub fn tick(
        &mut self,
        scene: &mut GalleryScene,
        lightbox_open: bool,
        camera: &mut CameraManager,
    ) -> bool {
        self.ticks += 1;
        let rotated = self.enabled && !lightbox_open;
        if rotated {
            scene.rotate_all(self.increment);
        }
        camera.update();
        rotated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CameraConfig, GridLayout, PanelSize};
    use crate::gallery::layout::build_scene;

    fn fixture() -> (GalleryScene, CameraManager) {
        let images: Vec<String> = (1..=4).map(|i| format!("/art{i}.jpeg")).collect();
        let scene = build_scene(&images, &GridLayout::default(), &PanelSize::default());
        let camera = CameraManager::from_config(&CameraConfig::default(), 1.5);
        (scene, camera)
    }

    #[test]
    fn test_rotation_frozen_while_open() {
        let (mut scene, mut camera) = fixture();
        let mut driver = AnimationDriver::new(0.005, true);
        for _ in 0..10 {
            assert!(!driver.tick(&mut scene, true, &mut camera));
        }
        for index in 0..scene.len() {
            assert_eq!(scene.rotation(index), Some(0.0));
        }
        assert_eq!(driver.ticks(), 10);
    }

    #[test]
    fn test_rotation_advances_by_increment_while_closed() {
        let (mut scene, mut camera) = fixture();
        let mut driver = AnimationDriver::new(0.005, true);
        let mut previous = vec![0.0; scene.len()];
        for n in 1..=10 {
            assert!(driver.tick(&mut scene, false, &mut camera));
            for (index, last) in previous.iter_mut().enumerate() {
                let angle = scene.rotation(index).unwrap();
                assert!(angle > *last);
                assert!((angle - 0.005 * n as f32).abs() < 1e-5);
                *last = angle;
            }
        }
    }

    #[test]
    fn test_disabled_rotation_still_updates_camera() {
        let (mut scene, mut camera) = fixture();
        let mut driver = AnimationDriver::new(0.005, false);
        camera.camera.rotate(0.1, 0.0);
        driver.tick(&mut scene, false, &mut camera);
        assert_eq!(scene.rotation(0), Some(0.0));
        assert!(camera.camera.yaw > 0.0);
    }

    #[test]
    fn test_reenabled_rotation_resumes_from_current_angle() {
        let (mut scene, mut camera) = fixture();
        let mut driver = AnimationDriver::new(0.005, true);
        driver.tick(&mut scene, false, &mut camera);
        driver.set_rotation_enabled(false);
        assert!(!driver.rotation_enabled());
        assert!(!driver.tick(&mut scene, false, &mut camera));

        driver.set_rotation_enabled(true);
        assert!(driver.tick(&mut scene, false, &mut camera));
        assert!((scene.rotation(0).unwrap() - 0.01).abs() < 1e-6);
    }
}
