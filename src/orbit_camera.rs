use glam::{Mat4, Vec3};

use crate::transform;

/// Where the camera starts before any time has passed.
pub const STARTING_CAMERA_POSITION: Vec3 = Vec3::new(0.0, 1.0, 8.0);

/// The point the camera always looks at: the hub of the blades.
pub const FOCUS_POINT: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// Fixed parameters of a camera circling the scene on a horizontal orbit.
///
/// The camera holds no animation state. Its position at a given time is derived
/// from the elapsed time and the orbit period, so height and distance from the
/// orbit axis never change.
///
/// # Example
/// ```
/// use windmill::OrbitCamera;
///
/// let camera = OrbitCamera::new().radius(8.0).height(1.0).fov(60.0);
/// let eye = camera.position_at(0.0, 10.0);
/// assert_eq!(eye.z, 8.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    /// Point the camera looks at.
    pub focus: Vec3,
    /// Distance from the Y axis.
    pub radius: f32,
    /// Height of the orbit plane.
    pub height: f32,
    /// Up direction for the look-at.
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            focus: FOCUS_POINT,
            radius: STARTING_CAMERA_POSITION.z,
            height: STARTING_CAMERA_POSITION.y,
            up: Vec3::Y,
            fov: 60.0_f32.to_radians(),
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the point to look at.
    pub fn focus(mut self, focus: impl Into<Vec3>) -> Self {
        self.focus = focus.into();
        self
    }

    /// Set the orbit radius. Non-positive values are clamped to a small positive
    /// radius so the eye never coincides with the orbit axis.
    pub fn radius(mut self, radius: f32) -> Self {
        self.radius = radius.max(0.01);
        self
    }

    /// Set the orbit height.
    pub fn height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    /// Set the field of view in degrees.
    pub fn fov(mut self, fov_degrees: f32) -> Self {
        self.fov = fov_degrees.to_radians();
        self
    }

    /// Set near and far clip distances.
    pub fn clip(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Eye position after `elapsed` seconds of an orbit lasting `period` seconds.
    pub fn position_at(&self, elapsed: f64, period: f64) -> Vec3 {
        transform::camera_position(elapsed, period, self.radius, self.height)
    }

    /// View matrix after `elapsed` seconds of an orbit lasting `period` seconds.
    pub fn view_at(&self, elapsed: f64, period: f64) -> Mat4 {
        transform::view_matrix(self.position_at(elapsed, period), self.focus, self.up)
    }

    /// Perspective projection for a viewport of the given size in pixels.
    pub fn projection(&self, width: u32, height: u32) -> Mat4 {
        transform::projection_matrix(width, height, self.fov, self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_orbit_starts_at_starting_position() {
        let camera = OrbitCamera::default();
        let eye = camera.position_at(0.0, 10.0);
        assert!(eye.abs_diff_eq(STARTING_CAMERA_POSITION, 1e-6));
        assert_eq!(camera.focus, FOCUS_POINT);
        assert!((camera.fov - std::f32::consts::FRAC_PI_3).abs() < 1e-6);
    }

    #[test]
    fn builder_sets_fields() {
        let camera = OrbitCamera::new()
            .focus([1.0, 2.0, 3.0])
            .radius(4.0)
            .height(5.0)
            .fov(90.0)
            .clip(0.5, 50.0);
        assert_eq!(camera.focus, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(camera.radius, 4.0);
        assert_eq!(camera.height, 5.0);
        assert!((camera.fov - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!((camera.near, camera.far), (0.5, 50.0));
    }

    #[test]
    fn radius_stays_positive() {
        assert!(OrbitCamera::new().radius(0.0).radius > 0.0);
        assert!(OrbitCamera::new().radius(-3.0).radius > 0.0);
    }

    #[test]
    fn view_maps_focus_onto_the_view_axis() {
        let camera = OrbitCamera::default();
        for step in 0..16 {
            let view = camera.view_at(step as f64 * 0.7, 10.0);
            let focus = view.transform_point3(camera.focus);
            assert!(focus.x.abs() < 1e-4);
            assert!(focus.y.abs() < 1e-4);
            assert!((focus.z + camera.radius).abs() < 1e-4);
        }
    }
}
