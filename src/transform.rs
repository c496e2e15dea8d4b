//! Per-frame transform math.
//!
//! Everything here is a pure function of elapsed time and configuration: the
//! camera has no stored position and blades have no stored angle. Time is in
//! seconds (`f64`), angles are in radians, and matrices are column-major
//! [`Mat4`]s ready for upload.
//!
//! # Composition order
//!
//! Matrices compose by post-multiplication in authoring order, so the factor
//! written last is the first applied to a vertex. A blade's model matrix is
//!
//! ```text
//! model = T(rest) * Rz(phase + angle) * T(pivot)
//! ```
//!
//! which lifts the blade by the pivot offset, spins it about the Z axis through
//! the origin, then moves it to its resting offset. The model-view matrix is
//! always `view * model`.

use std::f64::consts::TAU;

use glam::{Mat4, Vec3};

use crate::config::WindmillConfig;
use crate::orbit_camera::OrbitCamera;

/// Resting offset applied after rotation. Currently the origin.
pub const BLADE_REST_OFFSET: Vec3 = Vec3::ZERO;

/// Offset applied to blade vertices before rotation.
pub const BLADE_PIVOT_OFFSET: Vec3 = Vec3::new(0.0, 0.5, 0.0);

/// Angle swept after `elapsed` seconds by something turning once per `period`
/// seconds, wrapped into `[0, 2π)`.
fn periodic_angle(elapsed: f64, period: f64) -> f64 {
    (elapsed / period).rem_euclid(1.0) * TAU
}

/// Camera eye position on a horizontal circle of radius `orbit_radius` at `height`.
///
/// At `elapsed = 0` the camera sits on the +Z axis; it then sweeps towards +X.
pub fn camera_position(elapsed: f64, camera_period: f64, orbit_radius: f32, height: f32) -> Vec3 {
    let (sin, cos) = periodic_angle(elapsed, camera_period).sin_cos();
    Vec3::new(sin as f32 * orbit_radius, height, cos as f32 * orbit_radius)
}

/// Right-handed look-at view matrix. `eye` must differ from `focus`.
pub fn view_matrix(eye: Vec3, focus: Vec3, up: Vec3) -> Mat4 {
    Mat4::look_at_rh(eye, focus, up)
}

/// Fixed angular offset of blade `index` so that blades are evenly spaced.
pub fn blade_phase(index: u32, blade_count: u32) -> f64 {
    index as f64 * (TAU / blade_count as f64)
}

/// Time-driven rotation shared by every blade.
pub fn blade_angle(elapsed: f64, blade_period: f64) -> f64 {
    periodic_angle(elapsed, blade_period)
}

/// Total rotation of blade `index` about the Z axis.
pub fn blade_rotation(index: u32, blade_count: u32, elapsed: f64, blade_period: f64) -> f64 {
    blade_phase(index, blade_count) + blade_angle(elapsed, blade_period)
}

/// Model matrix for blade `index`.
pub fn blade_model_matrix(index: u32, blade_count: u32, elapsed: f64, blade_period: f64) -> Mat4 {
    let angle = blade_rotation(index, blade_count, elapsed, blade_period).rem_euclid(TAU);
    Mat4::from_translation(BLADE_REST_OFFSET)
        * Mat4::from_rotation_z(angle as f32)
        * Mat4::from_translation(BLADE_PIVOT_OFFSET)
}

/// `view * model`. Not commutative; the order is fixed.
pub fn compose_model_view(view: Mat4, model: Mat4) -> Mat4 {
    view * model
}

/// Right-handed perspective projection for a `width` x `height` viewport.
///
/// A zero height is treated as one pixel so the aspect ratio stays finite.
pub fn projection_matrix(width: u32, height: u32, fov: f32, near: f32, far: f32) -> Mat4 {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    Mat4::perspective_rh(fov, aspect, near, far)
}

/// All matrices needed to draw one frame.
#[derive(Clone, Debug)]
pub struct FrameTransforms {
    pub camera_position: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
    /// Model matrix of each blade, indexed by blade.
    pub blade_models: Vec<Mat4>,
}

impl FrameTransforms {
    pub fn compute(
        config: &WindmillConfig,
        camera: &OrbitCamera,
        elapsed: f64,
        width: u32,
        height: u32,
    ) -> Self {
        let camera_position = camera.position_at(elapsed, config.camera_period());
        let view = camera.view_at(elapsed, config.camera_period());
        let blade_models = (0..config.blade_count())
            .map(|index| {
                blade_model_matrix(index, config.blade_count(), elapsed, config.blade_period())
            })
            .collect();

        Self {
            camera_position,
            view,
            projection: camera.projection(width, height),
            blade_models,
        }
    }

    /// Model-view matrix of the body, whose model matrix is the identity.
    pub fn body_model_view(&self) -> Mat4 {
        compose_model_view(self.view, Mat4::IDENTITY)
    }

    /// Model-view matrices of all blades in index order.
    pub fn blade_model_views(&self) -> impl Iterator<Item = Mat4> + '_ {
        self.blade_models
            .iter()
            .map(|model| compose_model_view(self.view, *model))
    }
}
