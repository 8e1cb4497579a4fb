use cgmath::{Matrix4, SquareMatrix};
use winit::event::DeviceEvent;

use super::{camera_controller::CameraController, orbit_camera::OrbitCamera};
use crate::config::CameraConfig;

/// Orbit camera paired with the input controller that drives it.
pub struct CameraManager {
    pub camera: OrbitCamera,
    pub controller: CameraController,
}

impl CameraManager {
    pub fn new(camera: OrbitCamera, controller: CameraController) -> Self {
        Self { camera, controller }
    }

    /// Builds the gallery camera: eye on +Z looking at the origin, Y up.
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let target = cgmath::Vector3::new(0.0, 0.0, 0.0);
        let camera = OrbitCamera::new(config.distance, 0.0, 0.0, target, aspect)
            .with_fov(cgmath::Deg(config.fov_y_deg))
            .with_distance_bounds(config.min_distance, config.max_distance)
            .with_damping(config.damping_factor);
        let controller = CameraController::new(config.rotate_speed, config.zoom_speed);
        Self::new(camera, controller)
    }

    pub fn process_event(&mut self, event: &DeviceEvent) {
        self.controller.process_events(event, &mut self.camera);
    }

    /// Advances inertia and refreshes the uniform; runs every frame even while
    /// input is disabled so an in-flight glide finishes.
    pub fn update(&mut self) {
        self.camera.update_damping();
        self.camera.update_view_proj();
    }

    pub fn set_input_enabled(&mut self, enabled: bool) {
        self.controller.set_enabled(enabled);
    }

    pub fn input_enabled(&self) -> bool {
        self.controller.is_enabled()
    }
}

pub trait Camera: Sized {
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct CameraUniform {
    /// The eye position of the camera in homogenous coordinates.
    ///
    /// Homogenous coordinates are used to fullfill the 16 byte alignment requirement.
    pub view_position: [f32; 4],

    /// Contains the view projection matrix.
    pub view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    /// Creates a default [CameraUniform].
    fn default() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: convert_matrix4_to_array(Matrix4::identity()),
        }
    }
}

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    let mut result = [[0.0; 4]; 4];

    for (i, column) in result.iter_mut().enumerate() {
        for (j, value) in column.iter_mut().enumerate() {
            *value = matrix4[i][j];
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_uses_gallery_pose() {
        let manager = CameraManager::from_config(&CameraConfig::default(), 1.5);
        assert!((manager.camera.eye.z - 5.0).abs() < 1e-4);
        assert_eq!(manager.camera.bounds.min_distance, Some(2.0));
        assert_eq!(manager.camera.bounds.max_distance, Some(12.0));
        assert!((manager.camera.fovy.0 - 75f32.to_radians()).abs() < 1e-5);
        assert!(manager.input_enabled());
    }

    #[test]
    fn test_disabled_input_still_finishes_glide() {
        let mut manager = CameraManager::from_config(&CameraConfig::default(), 1.0);
        manager.camera.rotate(0.2, 0.0);
        manager.set_input_enabled(false);
        let before = manager.camera.yaw;
        manager.update();
        assert!(manager.camera.yaw > before);
    }
}
