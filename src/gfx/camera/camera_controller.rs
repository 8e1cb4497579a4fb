use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, MouseScrollDelta},
};

use super::orbit_camera::OrbitCamera;

/// Turns raw mouse input into orbit rotation and zoom.
///
/// Panning is intentionally absent: the gallery keeps the grid centred.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    enabled: bool,
    is_mouse_pressed: bool,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            enabled: true,
            is_mouse_pressed: false,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.is_mouse_pressed = false;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn process_events(&mut self, event: &DeviceEvent, camera: &mut OrbitCamera) {
        if !self.enabled {
            return;
        }

        match event {
            DeviceEvent::Button {
                button: 0, // Left Mouse Button
                state,
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
            }
            DeviceEvent::MouseWheel { delta, .. } => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32 * 0.05
                    }
                };
                camera.add_distance(scroll_amount * self.zoom_speed);
            }
            DeviceEvent::MouseMotion { delta } => {
                if self.is_mouse_pressed {
                    camera.rotate(
                        -delta.0 as f32 * self.rotate_speed,
                        delta.1 as f32 * self.rotate_speed,
                    );
                }
            }
            _ => (),
        }
    }

    /// Returns true if currently rotating
    pub fn is_rotating(&self) -> bool {
        self.enabled && self.is_mouse_pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector3, Zero};

    fn camera() -> OrbitCamera {
        OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.0).with_distance_bounds(2.0, 12.0)
    }

    #[test]
    fn test_drag_queues_rotation() {
        let mut controller = CameraController::new(0.01, 0.5);
        let mut camera = camera();

        controller.process_events(
            &DeviceEvent::Button {
                button: 0,
                state: ElementState::Pressed,
            },
            &mut camera,
        );
        controller.process_events(&DeviceEvent::MouseMotion { delta: (10.0, 0.0) }, &mut camera);

        assert!(controller.is_rotating());
        assert!((camera.pending_rotation().0 + 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_motion_without_press_is_ignored() {
        let mut controller = CameraController::new(0.01, 0.5);
        let mut camera = camera();
        controller.process_events(&DeviceEvent::MouseMotion { delta: (10.0, 4.0) }, &mut camera);
        assert_eq!(camera.pending_rotation(), (0.0, 0.0));
    }

    #[test]
    fn test_disabled_controller_ignores_input() {
        let mut controller = CameraController::new(0.01, 0.5);
        let mut camera = camera();
        controller.set_enabled(false);

        controller.process_events(
            &DeviceEvent::Button {
                button: 0,
                state: ElementState::Pressed,
            },
            &mut camera,
        );
        controller.process_events(&DeviceEvent::MouseMotion { delta: (10.0, 4.0) }, &mut camera);
        controller.process_events(
            &DeviceEvent::MouseWheel {
                delta: MouseScrollDelta::LineDelta(0.0, -3.0),
            },
            &mut camera,
        );

        assert!(!controller.is_rotating());
        assert_eq!(camera.pending_rotation(), (0.0, 0.0));
        assert_eq!(camera.distance, 5.0);
    }
}
