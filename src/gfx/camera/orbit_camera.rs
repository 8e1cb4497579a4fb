use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Below this the pending rotation is treated as settled.
const DAMPING_EPSILON: f32 = 1e-6;

/// Perspective camera orbiting `target` on a sphere of radius `distance`.
///
/// Rotation input is not applied directly: it accumulates in a pending delta
/// that [`OrbitCamera::update_damping`] drains by `damping_factor` each frame,
/// which gives the inertial glide of a damped orbit control.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    /// Fraction of the pending rotation applied per update; 1.0 disables inertia.
    pub damping_factor: f32,
    pending_yaw: f32,
    pending_pitch: f32,
    pub uniform: CameraUniform,
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * self.gl_view_projection()
    }
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: Vector3::zero(), // Will be auto-calculted in `update()` nevertheless.
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: cgmath::Rad(std::f32::consts::PI / 4.0),
            znear: 0.1,
            zfar: 1000.0,
            damping_factor: 1.0,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            uniform: CameraUniform::default(),
        };
        camera.update();
        camera
    }

    pub fn with_fov(mut self, fovy: impl Into<Rad<f32>>) -> Self {
        self.fovy = fovy.into();
        self
    }

    pub fn with_damping(mut self, damping_factor: f32) -> Self {
        self.damping_factor = damping_factor.clamp(f32::EPSILON, 1.0);
        self
    }

    pub fn with_distance_bounds(mut self, min: f32, max: f32) -> Self {
        self.bounds.min_distance = Some(min);
        self.bounds.max_distance = Some(max);
        self.set_distance(self.distance);
        self
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.update();
    }

    pub fn add_distance(&mut self, delta: f32) {
        let corrected_zoom = f32::log10(self.distance.max(1.0 + f32::EPSILON)) * delta;
        self.set_distance(self.distance + corrected_zoom);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        let mut bounded_yaw = yaw;
        if let Some(min_yaw) = self.bounds.min_yaw {
            bounded_yaw = bounded_yaw.clamp(min_yaw, f32::MAX);
        }
        if let Some(max_yaw) = self.bounds.max_yaw {
            bounded_yaw = bounded_yaw.clamp(f32::MIN, max_yaw);
        }
        self.yaw = bounded_yaw;
        self.update();
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }

    /// Queues an orbit rotation to be applied over the next updates.
    pub fn rotate(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.pending_yaw += yaw_delta;
        self.pending_pitch += pitch_delta;
    }

    /// Applies a `damping_factor` share of the pending rotation and decays the rest.
    ///
    /// Returns true while the camera is still moving.
    pub fn update_damping(&mut self) -> bool {
        if self.pending_yaw.abs() < DAMPING_EPSILON && self.pending_pitch.abs() < DAMPING_EPSILON
        {
            self.pending_yaw = 0.0;
            self.pending_pitch = 0.0;
            return false;
        }

        let yaw_step = self.pending_yaw * self.damping_factor;
        let pitch_step = self.pending_pitch * self.damping_factor;
        self.add_yaw(yaw_step);
        self.add_pitch(pitch_step);

        self.pending_yaw *= 1.0 - self.damping_factor;
        self.pending_pitch *= 1.0 - self.damping_factor;
        true
    }

    pub fn pending_rotation(&self) -> (f32, f32) {
        (self.pending_yaw, self.pending_pitch)
    }

    /// Updates the camera after changing `distance`, `pitch` or `yaw`.
    fn update(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = convert_matrix4_to_array(self.build_view_projection_matrix());
    }

    /// View-projection in OpenGL clip space (z in [-1, 1]), used for unprojection.
    pub fn gl_view_projection(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye);
        let target = Point3::from_vec(self.target);
        let view = Matrix4::look_at_rh(eye, target, self.up);
        perspective(self.fovy, self.aspect, self.znear, self.zfar) * view
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub min_yaw: Option<f32>,
    pub max_yaw: Option<f32>,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: None,
            max_distance: Some(16.0),
            min_pitch: -std::f32::consts::PI / 2.0 + f32::EPSILON,
            max_pitch: std::f32::consts::PI / 2.0 - f32::EPSILON,
            min_yaw: None,
            max_yaw: None,
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_default_pose_looks_down_negative_z() {
        let camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.5);
        assert!(approx(camera.eye.x, 0.0));
        assert!(approx(camera.eye.y, 0.0));
        assert!(approx(camera.eye.z, 5.0));
    }

    #[test]
    fn test_distance_bounds_clamp_zoom() {
        let mut camera =
            OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.0).with_distance_bounds(2.0, 12.0);
        camera.set_distance(40.0);
        assert_eq!(camera.distance, 12.0);
        camera.set_distance(0.5);
        assert_eq!(camera.distance, 2.0);
    }

    #[test]
    fn test_damping_glides_and_settles() {
        let mut camera =
            OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.0).with_damping(0.08);
        camera.rotate(0.5, 0.0);

        assert!(camera.update_damping());
        assert!(approx(camera.yaw, 0.04));
        assert!(approx(camera.pending_rotation().0, 0.46));

        for _ in 0..1000 {
            camera.update_damping();
        }
        assert!(approx(camera.yaw, 0.5));
        assert!(!camera.update_damping());
    }

    #[test]
    fn test_resize_updates_aspect_and_ignores_zero_height() {
        let mut camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.0);
        camera.resize_projection(1920, 1080);
        assert!(approx(camera.aspect, 1920.0 / 1080.0));
        camera.resize_projection(800, 0);
        assert!(approx(camera.aspect, 1920.0 / 1080.0));
    }
}
