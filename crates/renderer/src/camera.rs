//! Fixed sky-view camera for the dome pass.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

/// Camera looking up and outward from ground level at the dome interior.
/// The view never moves at runtime; only the aspect ratio changes on resize.
#[derive(Debug, Clone)]
pub struct SkyCamera {
    /// Eye position (ground level).
    pub eye: Vec3,
    /// Direction the camera faces. Tilted upward, not straight up, so the
    /// Y-up vector stays valid.
    pub direction: Vec3,
    /// Field of view in degrees. Deliberately exaggerated so the dome fills
    /// the frame with visible curvature.
    pub fov_degrees: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
}

impl Default for SkyCamera {
    fn default() -> Self {
        Self {
            eye: Vec3::ZERO,
            direction: Vec3::new(0.0, 0.45, -1.0),
            fov_degrees: 100.0,
            near: 0.1,
            far: 500.0,
            aspect: 16.0 / 9.0,
        }
    }
}

impl SkyCamera {
    /// Update aspect ratio (call on window resize).
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Get the view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        let target = self.eye + self.direction.normalize();
        Mat4::look_at_rh(self.eye, target, Vec3::Y)
    }

    /// Get the projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    /// Get the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Inverse-transpose of the view matrix, for transforming normals into
    /// view space under non-uniform scale.
    pub fn normal_matrix(&self) -> Mat4 {
        self.view_matrix().inverse().transpose()
    }
}

/// Dome shader uniform (must match skydome.wgsl DomeUniforms).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct DomeUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    /// xyz = sun direction in view space, w = intensity.
    pub sun_direction: [f32; 4],
    /// x = unused, y = cloud alpha gain, zw unused.
    pub sky_params: [f32; 4],
}

impl DomeUniforms {
    /// Build the uniform from the camera and a world-space sun direction.
    /// The sun is moved into view space here so the fragment shader can
    /// light view-space normals directly.
    pub fn new(camera: &SkyCamera, sun_world: Vec3, sun_intensity: f32, alpha_gain: f32) -> Self {
        let view = camera.view_matrix();
        let sun_view = (view * Vec4::from((sun_world.normalize(), 0.0))).truncate();
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            normal_matrix: camera.normal_matrix().to_cols_array_2d(),
            sun_direction: [sun_view.x, sun_view.y, sun_view.z, sun_intensity],
            sky_params: [0.0, alpha_gain, 0.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_matrix_is_inverse_transpose_of_view() {
        let camera = SkyCamera::default();
        let expected = camera.view_matrix().inverse().transpose();
        let got = camera.normal_matrix();
        assert!(got.abs_diff_eq(expected, 1e-6));
    }

    /// For the rigid (rotation + translation) view the normal matrix's
    /// rotation block must agree with the view's, so directions transformed
    /// by either keep unit length.
    #[test]
    fn view_space_directions_keep_unit_length() {
        let camera = SkyCamera::default();
        let nm = camera.normal_matrix();
        for dir in [Vec3::X, Vec3::Y, Vec3::Z, Vec3::new(0.3, 0.8, -0.5).normalize()] {
            let out = (nm * Vec4::from((dir, 0.0))).truncate();
            assert!((out.length() - 1.0).abs() < 1e-4, "length {}", out.length());
        }
    }

    #[test]
    fn projection_honors_aspect_and_fov() {
        let mut camera = SkyCamera::default();
        camera.set_aspect(2048, 1024);
        assert!((camera.aspect - 2.0).abs() < 1e-6);
        let proj = camera.projection_matrix();
        // col0.x = f / aspect, col1.y = f
        let f = 1.0 / (camera.fov_degrees.to_radians() / 2.0).tan();
        assert!((proj.col(0).x - f / 2.0).abs() < 1e-4);
        assert!((proj.col(1).y - f).abs() < 1e-4);
    }

    #[test]
    fn uniform_layout_is_wgsl_compatible() {
        // Three mat4x4 + two vec4: must be a 16-byte multiple for uniform use.
        assert_eq!(std::mem::size_of::<DomeUniforms>(), 3 * 64 + 2 * 16);
        assert_eq!(std::mem::size_of::<DomeUniforms>() % 16, 0);
    }

    #[test]
    fn sun_direction_moves_with_view() {
        let camera = SkyCamera::default();
        let sun = Vec3::new(0.4, 0.8, 0.2);
        let u = DomeUniforms::new(&camera, sun, 1.0, 1.0);
        let len = Vec3::new(u.sun_direction[0], u.sun_direction[1], u.sun_direction[2]).length();
        assert!((len - 1.0).abs() < 1e-4);
    }
}
