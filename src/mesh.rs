//! GPU-resident vertex buffers for the windmill meshes.
//!
//! A [`Mesh`] is uploaded once and never written again. Meshes are drawn as
//! non-indexed triangle lists, so the vertex count is the draw size.
//!
//! [`MeshId`] names the two meshes independently of the GPU, which is what the
//! frame renderer works with.

use crate::geometry::{BLADE_VERTICES, BODY_VERTICES, Vertex};
use crate::gpu::GpuContext;

/// The meshes a frame can bind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeshId {
    /// Tower and roof, drawn once per frame.
    Body,
    /// A single blade, drawn once per blade.
    Blade,
}

impl MeshId {
    /// Model-space vertices of this mesh.
    pub fn vertices(self) -> &'static [Vertex] {
        match self {
            MeshId::Body => &BODY_VERTICES,
            MeshId::Blade => &BLADE_VERTICES,
        }
    }

    pub fn vertex_count(self) -> u32 {
        self.vertices().len() as u32
    }

    fn label(self) -> &'static str {
        match self {
            MeshId::Body => "Body Vertex Buffer",
            MeshId::Blade => "Blade Vertex Buffer",
        }
    }
}

/// An immutable vertex buffer on the GPU.
#[derive(Debug)]
pub struct Mesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl Mesh {
    /// Upload `vertices` into a new vertex buffer.
    pub fn new(gpu: &GpuContext, label: &str, vertices: &[Vertex]) -> Self {
        use wgpu::util::DeviceExt;

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        Self {
            vertex_buffer,
            vertex_count: vertices.len() as u32,
        }
    }

    /// Upload one of the built-in meshes.
    pub fn upload(gpu: &GpuContext, id: MeshId) -> Self {
        let mesh = Self::new(gpu, id.label(), id.vertices());
        tracing::debug!(mesh = ?id, vertices = mesh.vertex_count, "uploaded mesh");
        mesh
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}
