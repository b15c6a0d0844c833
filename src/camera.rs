use cgmath::prelude::*;
use serde::{Deserialize, Serialize};

/// Maps OpenGL clip space (z in [-1, 1]) to wgpu clip space (z in [0, 1]).
#[rustfmt::skip]
const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    /// Turn about the vertical axis; 0 looks down -Z, -90 looks down -X.
    pub yaw_degrees: f32,
    pub pitch_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 100.0,
            position: [0.0, 0.0, 17.5],
            yaw_degrees: -90.0,
            pitch_degrees: 0.0,
        }
    }
}

pub struct Axes {
    pub forward: cgmath::Vector3<f32>,
    pub right: cgmath::Vector3<f32>,
    pub up: cgmath::Vector3<f32>,
}

#[derive(Clone, Debug)]
pub struct PerspectiveCamera {
    pub position: cgmath::Vector3<f32>,
    pub up: cgmath::Vector3<f32>,
    pub pitch: f32,
    pub yaw: f32,
    fov_y: cgmath::Deg<f32>,
    aspect: f32,
    near: f32,
    far: f32,
    projection: cgmath::Matrix4<f32>,
}

impl PerspectiveCamera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let [x, y, z] = config.position;
        let mut camera = Self {
            position: cgmath::vec3(x, y, z),
            up: cgmath::vec3(0.0, 1.0, 0.0),
            pitch: config.pitch_degrees,
            yaw: config.yaw_degrees,
            fov_y: cgmath::Deg(config.fov_degrees),
            aspect,
            near: config.near,
            far: config.far,
            projection: cgmath::Matrix4::identity(),
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn calculate_axes(&self) -> Axes {
        let yaw_rad = self.yaw.to_radians();
        let pitch_rad = self.pitch.to_radians();

        let forward = cgmath::vec3(
            pitch_rad.cos() * yaw_rad.sin(),
            pitch_rad.sin(),
            -pitch_rad.cos() * yaw_rad.cos(),
        )
        .normalize();

        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward).normalize();

        Axes { forward, right, up }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Takes effect on the next [`update_projection_matrix`](Self::update_projection_matrix).
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection = OPENGL_TO_WGPU_MATRIX
            * cgmath::perspective(cgmath::Rad::from(self.fov_y), self.aspect, self.near, self.far);
    }

    pub fn projection_matrix(&self) -> cgmath::Matrix4<f32> {
        self.projection
    }

    pub fn view_matrix(&self) -> cgmath::Matrix4<f32> {
        let axes = self.calculate_axes();
        cgmath::Matrix4::look_to_rh(
            cgmath::Point3::from_vec(self.position),
            axes.forward,
            axes.up,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera_looks_down_negative_x() {
        let camera = PerspectiveCamera::new(&CameraConfig::default(), 1.0);
        let axes = camera.calculate_axes();
        assert!((axes.forward - cgmath::vec3(-1.0, 0.0, 0.0)).magnitude() < 1e-5);
        assert!((axes.up - cgmath::vec3(0.0, 1.0, 0.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_projection_tracks_aspect() {
        let mut camera = PerspectiveCamera::new(&CameraConfig::default(), 1.0);
        let square = camera.projection_matrix();

        camera.set_aspect(2.0);
        assert_eq!(camera.projection_matrix(), square);

        camera.update_projection_matrix();
        let wide = camera.projection_matrix();
        assert!((wide.x.x * 2.0 - square.x.x).abs() < 1e-5);
        assert_eq!(wide.y.y, square.y.y);
    }

    #[test]
    fn test_view_matrix_moves_camera_to_origin() {
        let camera = PerspectiveCamera::new(&CameraConfig::default(), 1.0);
        let eye = camera.view_matrix() * camera.position.extend(1.0);
        assert!(eye.truncate().magnitude() < 1e-4);
    }
}
