//! Literal vertex data for the windmill.
//!
//! Two fixed vertex lists in local model space, uploaded once as
//! non-indexed triangle lists:
//!
//! - [`BODY_VERTICES`]: the tower (a four-sided prism) capped by a four-triangle
//!   pyramid roof. 36 vertices, 12 triangles.
//! - [`BLADE_VERTICES`]: a single blade. 3 vertices, 1 triangle.
//!
//! Only positions are stored. There are no normals or texture coordinates since
//! the windmill is neither lit nor textured.
//!
//! # Vertex Layout
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |

/// A single model-space position, laid out for direct GPU upload.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    /// Per-vertex buffer layout: one `Float32x3` position at location 0.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }],
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: [x, y, z],
        }
    }
}

const fn v(x: f32, y: f32, z: f32) -> Vertex {
    Vertex::new(x, y, z)
}

/// Apex of the roof pyramid, shared by all four roof triangles.
pub const ROOF_APEX: Vertex = Vertex::new(0.0, 2.0, 0.0);

/// Tower and roof. The first 24 vertices are the four walls, the last 12 the roof.
#[rustfmt::skip]
pub const BODY_VERTICES: [Vertex; 36] = [
    // Front wall (Z+)
    v( 0.5, -2.0,  0.5), v( 0.5,  1.5,  0.5), v(-0.5,  1.5,  0.5),
    v(-0.5, -2.0,  0.5), v( 0.5, -2.0,  0.5), v(-0.5,  1.5,  0.5),
    // Right wall (X+)
    v( 0.5, -2.0, -0.5), v( 0.5,  1.5, -0.5), v( 0.5,  1.5,  0.5),
    v( 0.5, -2.0,  0.5), v( 0.5, -2.0, -0.5), v( 0.5,  1.5,  0.5),
    // Back wall (Z-)
    v(-0.5, -2.0, -0.5), v( 0.5, -2.0, -0.5), v(-0.5,  1.5, -0.5),
    v( 0.5, -2.0, -0.5), v(-0.5,  1.5, -0.5), v( 0.5,  1.5, -0.5),
    // Left wall (X-)
    v(-0.5, -2.0,  0.5), v(-0.5,  1.5,  0.5), v(-0.5,  1.5, -0.5),
    v(-0.5, -2.0, -0.5), v(-0.5, -2.0,  0.5), v(-0.5,  1.5, -0.5),
    // Roof
    v(-0.5,  1.5,  0.5), v( 0.5,  1.5,  0.5), ROOF_APEX,
    v( 0.5,  1.5, -0.5), v(-0.5,  1.5, -0.5), ROOF_APEX,
    v( 0.5,  1.5,  0.5), v( 0.5,  1.5, -0.5), ROOF_APEX,
    v(-0.5,  1.5, -0.5), v(-0.5,  1.5,  0.5), ROOF_APEX,
];

/// One blade, lying in the z = 0.5 plane with its root at (0, 1).
#[rustfmt::skip]
pub const BLADE_VERTICES: [Vertex; 3] = [
    v(0.0, 1.0, 0.5),
    v(3.0, 0.8, 0.5),
    v(3.0, 1.2, 0.5),
];
