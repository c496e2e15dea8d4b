//! wgpu implementation of [`DrawTarget`].
//!
//! A frame is recorded first and encoded afterwards. [`FrameRecorder`] tracks
//! the bound mesh and the current value of every matrix uniform; each
//! `draw_triangles` call snapshots them into a [`DrawSlot`]. On submit, all
//! slots are written into one instance buffer and a single render pass issues
//! one draw per slot, reading that slot as its instance. Every draw therefore
//! sees exactly the uniforms that were current when it was recorded, and the
//! slot buffer is never rewritten while the pass that reads it is pending.
//!
//! # Depth Buffer
//!
//! The pass owns a `Depth32Float` depth texture that follows the surface size.
//! Call [`ScenePass::ensure_depth_size`] before rendering if the window may
//! have been resized.

use glam::Mat4;

use crate::gpu::GpuContext;
use crate::mesh::{Mesh, MeshId};
use crate::renderer::DrawTarget;
use crate::shader::{DepthCompare, ShaderProgram, UniformLocation};

/// Depth buffer format shared by the pass and the pipeline.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

/// Matrix uniforms captured for one draw call, uploaded as instance data.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawSlot {
    pub mv_matrix: [[f32; 4]; 4],
    pub p_matrix: [[f32; 4]; 4],
}

impl DrawSlot {
    const ATTRIBUTES: [wgpu::VertexAttribute; 8] = wgpu::vertex_attr_array![
        1 => Float32x4,
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
        8 => Float32x4,
    ];

    /// Per-instance layout: the model-view columns at locations 1-4, the
    /// projection columns at 5-8.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<DrawSlot>() as u64,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &Self::ATTRIBUTES,
    };

    fn from_uniforms(uniforms: &[Mat4; 2]) -> Self {
        Self {
            mv_matrix: uniforms[0].to_cols_array_2d(),
            p_matrix: uniforms[1].to_cols_array_2d(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct RecordedDraw {
    mesh: MeshId,
    vertex_count: u32,
}

/// Records one frame's draw calls for a [`ScenePass`].
#[derive(Debug, Default)]
pub struct FrameRecorder {
    clear: bool,
    program_active: bool,
    bound: Option<MeshId>,
    depth_test: Option<DepthCompare>,
    uniforms: [Mat4; 2],
    draws: Vec<RecordedDraw>,
    slots: Vec<DrawSlot>,
}

impl FrameRecorder {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            draws: Vec::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            ..Default::default()
        }
    }

    /// Number of draws recorded so far.
    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }

    /// Uniform values captured for each recorded draw.
    pub fn slots(&self) -> &[DrawSlot] {
        &self.slots
    }
}

impl DrawTarget for FrameRecorder {
    fn clear(&mut self) {
        self.clear = true;
    }

    fn use_program(&mut self) {
        self.program_active = true;
    }

    fn set_uniform(&mut self, location: UniformLocation, value: Mat4) {
        if let Some(slot) = self.uniforms.get_mut(location.index()) {
            *slot = value;
        }
    }

    fn bind_mesh(&mut self, mesh: MeshId) {
        self.bound = Some(mesh);
    }

    fn enable_depth_test(&mut self, compare: DepthCompare) {
        self.depth_test = Some(compare);
    }

    fn draw_triangles(&mut self, vertex_count: u32) {
        let Some(mesh) = self.bound else {
            tracing::warn!("draw issued with no mesh bound, skipping");
            return;
        };
        self.draws.push(RecordedDraw { mesh, vertex_count });
        self.slots.push(DrawSlot::from_uniforms(&self.uniforms));
    }
}

/// GPU resources for drawing the windmill: program, meshes, per-draw slots and
/// the depth buffer.
pub struct ScenePass {
    program: ShaderProgram,
    body: Mesh,
    blade: Mesh,
    slot_buffer: wgpu::Buffer,
    slot_capacity: u32,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
}

impl ScenePass {
    /// Upload both meshes and allocate room for `slot_capacity` draws per frame.
    pub fn new(gpu: &GpuContext, program: ShaderProgram, slot_capacity: u32) -> Self {
        let body = Mesh::upload(gpu, MeshId::Body);
        let blade = Mesh::upload(gpu, MeshId::Blade);

        let slot_capacity = slot_capacity.max(1);
        let slot_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw Slot Buffer"),
            size: slot_capacity as u64 * std::mem::size_of::<DrawSlot>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_view = Self::create_depth_view(gpu);

        Self {
            program,
            body,
            blade,
            slot_buffer,
            slot_capacity,
            depth_view,
            depth_size: (gpu.width(), gpu.height()),
        }
    }

    fn create_depth_view(gpu: &GpuContext) -> wgpu::TextureView {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width().max(1),
                height: gpu.height().max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Recreate the depth buffer if the surface size changed.
    pub fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        let size = (gpu.width(), gpu.height());
        if self.depth_size != size {
            self.depth_view = Self::create_depth_view(gpu);
            self.depth_size = size;
            tracing::debug!(width = size.0, height = size.1, "resized depth buffer");
        }
    }

    /// Start recording a frame.
    pub fn begin_frame(&self) -> FrameRecorder {
        FrameRecorder::with_capacity(self.slot_capacity as usize)
    }

    fn mesh(&self, id: MeshId) -> &Mesh {
        match id {
            MeshId::Body => &self.body,
            MeshId::Blade => &self.blade,
        }
    }

    /// Upload the recorded slots and encode the frame into `target`.
    pub fn submit(&self, gpu: &GpuContext, frame: FrameRecorder, target: &wgpu::TextureView) {
        let mut draw_count = frame.draws.len();
        if draw_count > self.slot_capacity as usize {
            tracing::warn!(
                recorded = draw_count,
                capacity = self.slot_capacity,
                "more draws than slots, dropping the excess"
            );
            draw_count = self.slot_capacity as usize;
        }

        if let Some(compare) = frame.depth_test {
            debug_assert_eq!(compare, self.program.depth_compare());
        }

        if draw_count > 0 {
            gpu.queue.write_buffer(
                &self.slot_buffer,
                0,
                bytemuck::cast_slice(&frame.slots[..draw_count]),
            );
        }

        let load = if frame.clear {
            wgpu::LoadOp::Clear(CLEAR_COLOR)
        } else {
            wgpu::LoadOp::Load
        };
        let depth_load = if frame.clear {
            wgpu::LoadOp::Clear(1.0)
        } else {
            wgpu::LoadOp::Load
        };

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Windmill Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Windmill Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if frame.program_active {
                self.program.activate(&mut render_pass);
                render_pass.set_vertex_buffer(1, self.slot_buffer.slice(..));

                for (slot, draw) in frame.draws[..draw_count].iter().enumerate() {
                    let mesh = self.mesh(draw.mesh);
                    let vertex_count = draw.vertex_count.min(mesh.vertex_count());
                    let slot = slot as u32;
                    render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    render_pass.draw(0..vertex_count, slot..slot + 1);
                }
            } else if draw_count > 0 {
                tracing::warn!("draws recorded without an active program, skipping");
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WindmillConfig;
    use crate::orbit_camera::OrbitCamera;
    use crate::renderer::{FrameRenderer, ProgramUniforms};
    use crate::shader::uniform_location;

    #[test]
    fn slot_layout_matches_struct() {
        assert_eq!(std::mem::size_of::<DrawSlot>(), 128);
        assert_eq!(DrawSlot::LAYOUT.array_stride, 128);
        assert_eq!(DrawSlot::ATTRIBUTES[0].shader_location, 1);
        assert_eq!(DrawSlot::ATTRIBUTES[4].offset, 64);
        assert_eq!(DrawSlot::ATTRIBUTES[7].shader_location, 8);
    }

    #[test]
    fn recorder_snapshots_uniforms_per_draw() {
        let config = WindmillConfig::new(3, 2.0, 10.0).unwrap();
        let uniforms = ProgramUniforms::resolve(uniform_location).unwrap();
        let renderer = FrameRenderer::new(config, OrbitCamera::default(), uniforms);

        let mut recorder = FrameRecorder::with_capacity(4);
        let summary = renderer.render(&mut recorder, 0.4, 600, 600);

        assert!(recorder.clear);
        assert!(recorder.program_active);
        assert_eq!(recorder.draw_count(), 4);
        assert_eq!(summary.draw_calls as usize, recorder.draw_count());
        assert_eq!(recorder.draws[0].mesh, MeshId::Body);
        assert!(recorder.draws[1..].iter().all(|d| d.mesh == MeshId::Blade));

        let slots = recorder.slots();
        assert!(slots[1..].iter().all(|s| s.p_matrix == slots[0].p_matrix));
        assert_ne!(slots[1].mv_matrix, slots[2].mv_matrix);
        assert_ne!(slots[2].mv_matrix, slots[3].mv_matrix);
    }

    #[test]
    fn draw_without_mesh_is_ignored() {
        let mut recorder = FrameRecorder::default();
        recorder.draw_triangles(3);
        assert_eq!(recorder.draw_count(), 0);
        assert!(recorder.slots().is_empty());
    }
}
