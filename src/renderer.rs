//! The per-frame draw sequence.
//!
//! [`FrameRenderer`] knows what to draw and in which order; a [`DrawTarget`]
//! knows how to get it onto a GPU. The sequence for every frame is fixed:
//!
//! 1. clear depth, then color
//! 2. activate the program
//! 3. recompute the projection from the current viewport
//! 4. draw the body once with an identity model matrix
//! 5. draw the blade mesh once per blade, in ascending blade order
//!
//! so a frame always issues exactly `1 + blade_count` draw calls.

use glam::Mat4;

use crate::config::WindmillConfig;
use crate::gpu::RenderError;
use crate::mesh::MeshId;
use crate::orbit_camera::OrbitCamera;
use crate::shader::{DepthCompare, MODEL_VIEW_UNIFORM, PROJECTION_UNIFORM, UniformLocation};
use crate::transform::FrameTransforms;

/// Backend operations a frame is made of.
///
/// Calls arrive in the order a frame issues them. A draw uses the mesh bound
/// and the uniform values uploaded most recently before it.
pub trait DrawTarget {
    /// Clear the depth buffer, then the color buffer.
    fn clear(&mut self);
    /// Make the shader program current.
    fn use_program(&mut self);
    /// Upload a 4x4 matrix to a uniform location.
    fn set_uniform(&mut self, location: UniformLocation, value: Mat4);
    /// Bind a mesh's vertex buffer for subsequent draws.
    fn bind_mesh(&mut self, mesh: MeshId);
    fn enable_depth_test(&mut self, compare: DepthCompare);
    /// Draw `vertex_count` vertices of the bound mesh as a triangle list.
    fn draw_triangles(&mut self, vertex_count: u32);
}

/// Uniform locations of a linked program, resolved once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgramUniforms {
    pub model_view: UniformLocation,
    pub projection: UniformLocation,
}

impl ProgramUniforms {
    /// Resolve both matrix uniforms with `lookup`, failing if either is absent.
    pub fn resolve(
        lookup: impl Fn(&str) -> Option<UniformLocation>,
    ) -> Result<Self, RenderError> {
        Ok(Self {
            model_view: lookup(MODEL_VIEW_UNIFORM)
                .ok_or(RenderError::MissingUniform(MODEL_VIEW_UNIFORM))?,
            projection: lookup(PROJECTION_UNIFORM)
                .ok_or(RenderError::MissingUniform(PROJECTION_UNIFORM))?,
        })
    }
}

/// What one frame issued. Counts saturate instead of wrapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSummary {
    pub draw_calls: u32,
    pub vertices: u32,
}

impl FrameSummary {
    /// Count one draw of `vertex_count` vertices.
    pub fn record_draw(&mut self, vertex_count: u32) {
        self.draw_calls = self.draw_calls.saturating_add(1);
        self.vertices = self.vertices.saturating_add(vertex_count);
    }
}

/// Issues the windmill's draw sequence against a [`DrawTarget`].
#[derive(Clone, Debug)]
pub struct FrameRenderer {
    config: WindmillConfig,
    camera: OrbitCamera,
    uniforms: ProgramUniforms,
}

impl FrameRenderer {
    pub fn new(config: WindmillConfig, camera: OrbitCamera, uniforms: ProgramUniforms) -> Self {
        Self {
            config,
            camera,
            uniforms,
        }
    }

    pub fn config(&self) -> &WindmillConfig {
        &self.config
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    /// Draw one frame `elapsed` seconds into the animation on a
    /// `width` x `height` viewport.
    pub fn render<T: DrawTarget + ?Sized>(
        &self,
        target: &mut T,
        elapsed: f64,
        width: u32,
        height: u32,
    ) -> FrameSummary {
        let mut summary = FrameSummary::default();

        target.clear();
        target.use_program();

        let frame = FrameTransforms::compute(&self.config, &self.camera, elapsed, width, height);

        target.bind_mesh(MeshId::Body);
        self.upload(target, frame.body_model_view(), frame.projection);
        target.enable_depth_test(DepthCompare::LessEqual);
        self.draw(target, MeshId::Body, &mut summary);

        for model_view in frame.blade_model_views() {
            self.upload(target, model_view, frame.projection);
            target.bind_mesh(MeshId::Blade);
            target.enable_depth_test(DepthCompare::LessEqual);
            self.draw(target, MeshId::Blade, &mut summary);
        }

        summary
    }

    fn upload<T: DrawTarget + ?Sized>(&self, target: &mut T, model_view: Mat4, projection: Mat4) {
        target.set_uniform(self.uniforms.model_view, model_view);
        target.set_uniform(self.uniforms.projection, projection);
    }

    fn draw<T: DrawTarget + ?Sized>(&self, target: &mut T, mesh: MeshId, summary: &mut FrameSummary) {
        let vertex_count = mesh.vertex_count();
        target.draw_triangles(vertex_count);
        summary.record_draw(vertex_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::uniform_location;
    use crate::transform::blade_model_matrix;

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        Clear,
        UseProgram,
        SetUniform(UniformLocation, Mat4),
        BindMesh(MeshId),
        DepthTest(DepthCompare),
        Draw(u32),
    }

    #[derive(Default)]
    struct RecordingTarget {
        calls: Vec<Call>,
        bound: Option<MeshId>,
        uniforms: Vec<(UniformLocation, Mat4)>,
        /// (mesh, model-view, projection) captured at each draw.
        draws: Vec<(MeshId, Mat4, Mat4)>,
    }

    impl RecordingTarget {
        fn current(&self, location: UniformLocation) -> Mat4 {
            self.uniforms
                .iter()
                .rev()
                .find(|(loc, _)| *loc == location)
                .map(|(_, value)| *value)
                .unwrap()
        }
    }

    impl DrawTarget for RecordingTarget {
        fn clear(&mut self) {
            self.calls.push(Call::Clear);
        }

        fn use_program(&mut self) {
            self.calls.push(Call::UseProgram);
        }

        fn set_uniform(&mut self, location: UniformLocation, value: Mat4) {
            self.calls.push(Call::SetUniform(location, value));
            self.uniforms.push((location, value));
        }

        fn bind_mesh(&mut self, mesh: MeshId) {
            self.calls.push(Call::BindMesh(mesh));
            self.bound = Some(mesh);
        }

        fn enable_depth_test(&mut self, compare: DepthCompare) {
            self.calls.push(Call::DepthTest(compare));
        }

        fn draw_triangles(&mut self, vertex_count: u32) {
            self.calls.push(Call::Draw(vertex_count));
            let uniforms = uniforms();
            let mesh = self.bound.unwrap();
            self.draws.push((
                mesh,
                self.current(uniforms.model_view),
                self.current(uniforms.projection),
            ));
        }
    }

    fn uniforms() -> ProgramUniforms {
        ProgramUniforms::resolve(uniform_location).unwrap()
    }

    fn renderer(blade_count: u32) -> FrameRenderer {
        let config = WindmillConfig::new(blade_count, 2.0, 10.0).unwrap();
        FrameRenderer::new(config, OrbitCamera::default(), uniforms())
    }

    #[test]
    fn one_draw_for_the_body_and_one_per_blade() {
        for blade_count in [1, 2, 4, 9] {
            let mut target = RecordingTarget::default();
            let summary = renderer(blade_count).render(&mut target, 1.25, 600, 600);
            assert_eq!(summary.draw_calls, 1 + blade_count);
            assert_eq!(summary.vertices, 36 + 3 * blade_count);
            assert_eq!(target.draws.len() as u32, 1 + blade_count);
        }
    }

    #[test]
    fn frame_starts_by_clearing_then_activating_the_program() {
        let mut target = RecordingTarget::default();
        renderer(3).render(&mut target, 0.0, 600, 600);
        assert_eq!(target.calls[0], Call::Clear);
        assert_eq!(target.calls[1], Call::UseProgram);
        assert_eq!(
            target.calls.iter().filter(|c| **c == Call::Clear).count(),
            1
        );
    }

    #[test]
    fn body_is_drawn_first_then_blades() {
        let mut target = RecordingTarget::default();
        renderer(4).render(&mut target, 0.5, 600, 600);

        let meshes: Vec<MeshId> = target.draws.iter().map(|(mesh, _, _)| *mesh).collect();
        assert_eq!(
            meshes,
            vec![MeshId::Body, MeshId::Blade, MeshId::Blade, MeshId::Blade, MeshId::Blade]
        );

        let counts: Vec<u32> = target
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Draw(n) => Some(*n),
                _ => None,
            })
            .collect();
        assert_eq!(counts, vec![36, 3, 3, 3, 3]);
    }

    #[test]
    fn every_draw_is_depth_tested_with_less_equal() {
        let mut target = RecordingTarget::default();
        renderer(2).render(&mut target, 0.0, 600, 600);
        let mut depth_enabled = false;
        for call in &target.calls {
            match call {
                Call::DepthTest(compare) => {
                    assert_eq!(*compare, DepthCompare::LessEqual);
                    depth_enabled = true;
                }
                Call::Draw(_) => {
                    assert!(depth_enabled);
                    depth_enabled = false;
                }
                _ => {}
            }
        }
    }

    #[test]
    fn body_uses_the_view_matrix_and_blades_their_own_model() {
        let renderer = renderer(4);
        let elapsed = 0.8;
        let mut target = RecordingTarget::default();
        renderer.render(&mut target, elapsed, 800, 600);

        let frame = FrameTransforms::compute(renderer.config(), renderer.camera(), elapsed, 800, 600);
        let (_, body_mv, body_p) = target.draws[0];
        assert_eq!(body_mv, frame.view);
        assert_eq!(body_p, frame.projection);

        for (index, (_, mv, p)) in target.draws[1..].iter().enumerate() {
            let model = blade_model_matrix(index as u32, 4, elapsed, 2.0);
            assert_eq!(*mv, frame.view * model);
            assert_eq!(*p, frame.projection);
        }

        // Distinct phases give distinct transforms.
        for pair in target.draws[1..].windows(2) {
            assert_ne!(pair[0].1, pair[1].1);
        }
    }

    #[test]
    fn projection_follows_the_viewport() {
        let renderer = renderer(1);
        let mut square = RecordingTarget::default();
        let mut wide = RecordingTarget::default();
        renderer.render(&mut square, 0.0, 600, 600);
        renderer.render(&mut wide, 0.0, 1200, 600);
        assert_ne!(square.draws[0].2, wide.draws[0].2);
        assert_eq!(square.draws[0].1, wide.draws[0].1);
    }

    #[test]
    fn summary_counts_saturate() {
        let mut summary = FrameSummary {
            draw_calls: u32::MAX - 1,
            vertices: u32::MAX - 10,
        };
        summary.record_draw(3);
        assert_eq!(summary.draw_calls, u32::MAX);
        assert_eq!(summary.vertices, u32::MAX - 7);
        summary.record_draw(36);
        assert_eq!(summary.draw_calls, u32::MAX);
        assert_eq!(summary.vertices, u32::MAX);
    }

    #[test]
    fn largest_windmill_fits_the_summary() {
        let blades = crate::config::MAX_BLADE_COUNT;
        let mut summary = FrameSummary::default();
        summary.record_draw(MeshId::Body.vertex_count());
        for _ in 0..blades {
            summary.record_draw(MeshId::Blade.vertex_count());
        }
        assert_eq!(summary.draw_calls, blades + 1);
        assert_eq!(summary.vertices, 36 + 3 * blades);
    }

    #[test]
    fn missing_uniform_fails_resolution() {
        let result = ProgramUniforms::resolve(|name| {
            (name == MODEL_VIEW_UNIFORM).then(|| uniform_location(name)).flatten()
        });
        assert!(matches!(
            result,
            Err(RenderError::MissingUniform(PROJECTION_UNIFORM))
        ));
    }
}
