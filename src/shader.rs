//! Shader program: a vertex and a fragment WGSL source linked into one pipeline.
//!
//! The program exposes its matrix uniforms by name, so callers resolve a
//! [`UniformLocation`] once and then upload matrices to it every frame.
//!
//! In the shipped shaders both matrices travel as per-draw instance data
//! (see [`DrawSlot`](crate::scene_pass::DrawSlot)), which gives every draw call
//! its own snapshot of the uniform values.

use crate::geometry::Vertex;
use crate::gpu::{GpuContext, RenderError};
use crate::scene_pass::{DEPTH_FORMAT, DrawSlot};

/// Vertex stage of the windmill program.
pub const VERTEX_SHADER: &str = include_str!("shaders/windmill_vertex.wgsl");
/// Fragment stage of the windmill program.
pub const FRAGMENT_SHADER: &str = include_str!("shaders/windmill_fragment.wgsl");

/// Name of the model-view matrix uniform.
pub const MODEL_VIEW_UNIFORM: &str = "mv_matrix";
/// Name of the projection matrix uniform.
pub const PROJECTION_UNIFORM: &str = "p_matrix";

const UNIFORMS: [&str; 2] = [MODEL_VIEW_UNIFORM, PROJECTION_UNIFORM];

const VERTEX_ENTRY: &str = "vs_main";
const FRAGMENT_ENTRY: &str = "fs_main";

/// Opaque handle to a matrix uniform of a linked program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniformLocation(u32);

impl UniformLocation {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Depth comparison used by the depth test.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DepthCompare {
    /// Pass when the incoming depth is less than or equal to the stored depth.
    #[default]
    LessEqual,
}

impl DepthCompare {
    pub fn to_wgpu(self) -> wgpu::CompareFunction {
        match self {
            DepthCompare::LessEqual => wgpu::CompareFunction::LessEqual,
        }
    }
}

/// Look up a matrix uniform by name.
pub fn uniform_location(name: &str) -> Option<UniformLocation> {
    UNIFORMS
        .iter()
        .position(|uniform| *uniform == name)
        .map(|index| UniformLocation(index as u32))
}

/// Check that every matrix uniform is referenced by the vertex source.
fn check_declared_uniforms(vertex_source: &str) -> Result<(), RenderError> {
    match UNIFORMS.iter().find(|name| !vertex_source.contains(**name)) {
        Some(missing) => Err(RenderError::MissingUniform(*missing)),
        None => Ok(()),
    }
}

/// A compiled and linked render pipeline.
pub struct ShaderProgram {
    pipeline: wgpu::RenderPipeline,
    depth_compare: DepthCompare,
}

impl ShaderProgram {
    /// Compile both stages and link them.
    ///
    /// Blocks until the device reports validation results. Any compile or link
    /// error is returned as [`RenderError::ShaderCompile`].
    pub fn compile(
        gpu: &GpuContext,
        vertex_source: &str,
        fragment_source: &str,
        depth_compare: DepthCompare,
    ) -> Result<Self, RenderError> {
        check_declared_uniforms(vertex_source)?;

        let device = &gpu.device;
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Windmill Vertex Shader"),
            source: wgpu::ShaderSource::Wgsl(vertex_source.into()),
        });
        let fragment = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Windmill Fragment Shader"),
            source: wgpu::ShaderSource::Wgsl(fragment_source.into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Windmill Pipeline Layout"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Windmill Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &vertex,
                entry_point: Some(VERTEX_ENTRY),
                buffers: &[Vertex::LAYOUT, DrawSlot::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment,
                entry_point: Some(FRAGMENT_ENTRY),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            // Blades are single triangles seen from both sides, so nothing is culled.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: depth_compare.to_wgpu(),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::ShaderCompile {
                message: error.to_string(),
            });
        }

        tracing::info!("shader program linked");
        Ok(Self {
            pipeline,
            depth_compare,
        })
    }

    /// Compile the built-in windmill shaders.
    pub fn windmill(gpu: &GpuContext) -> Result<Self, RenderError> {
        Self::compile(gpu, VERTEX_SHADER, FRAGMENT_SHADER, DepthCompare::LessEqual)
    }

    /// Resolve a matrix uniform of this program by name.
    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        uniform_location(name)
    }

    pub fn depth_compare(&self) -> DepthCompare {
        self.depth_compare
    }

    /// Make this program current for subsequent draws in `render_pass`.
    pub fn activate(&self, render_pass: &mut wgpu::RenderPass) {
        render_pass.set_pipeline(&self.pipeline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_uniforms() {
        let mv = uniform_location(MODEL_VIEW_UNIFORM).unwrap();
        let p = uniform_location(PROJECTION_UNIFORM).unwrap();
        assert_ne!(mv, p);
        assert_eq!(mv.index(), 0);
        assert_eq!(p.index(), 1);
    }

    #[test]
    fn unknown_uniform_has_no_location() {
        assert_eq!(uniform_location("normal_matrix"), None);
        assert_eq!(uniform_location(""), None);
    }

    #[test]
    fn shipped_vertex_shader_declares_both_matrices() {
        assert!(check_declared_uniforms(VERTEX_SHADER).is_ok());
        assert!(VERTEX_SHADER.contains(VERTEX_ENTRY));
        assert!(FRAGMENT_SHADER.contains(FRAGMENT_ENTRY));
    }

    #[test]
    fn missing_uniform_is_reported() {
        let source = "@vertex fn vs_main() { let mv_matrix = 1.0; }";
        assert!(matches!(
            check_declared_uniforms(source),
            Err(RenderError::MissingUniform("p_matrix"))
        ));
    }

    #[test]
    fn depth_compare_maps_to_wgpu() {
        assert_eq!(DepthCompare::default(), DepthCompare::LessEqual);
        assert_eq!(
            DepthCompare::LessEqual.to_wgpu(),
            wgpu::CompareFunction::LessEqual
        );
    }
}
