//! # Windmill
//!
//! **An animated windmill on the GPU, seen from an orbiting camera.**
//!
//! A static body mesh (a square tower with a pyramid roof) is drawn once per
//! frame. A single triangle blade mesh is then drawn once per blade, each
//! rotated about the hub by its own phase. The camera circles the windmill at a
//! fixed height and always looks at the hub.
//!
//! ## Quick Start
//!
//! ```no_run
//! use windmill::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 4 blades, one revolution every 2 s, one orbit every 10 s
//!     let config = WindmillConfig::new(4, 2.0, 10.0)?;
//!     run_with_window(config, WindowConfig::new().title("Windmill").size(600, 600))?;
//!     Ok(())
//! }
//! ```
//!
//! ## Layout
//!
//! - [`transform`] holds the pure math: camera orbit, blade rotation, projection.
//! - [`FrameRenderer`] issues the per-frame draw sequence against a [`DrawTarget`].
//! - [`WindmillDriver`] owns the GPU resources and is driven by the window loop.

mod app;
mod clock;
mod config;
mod driver;
mod geometry;
mod gpu;
mod mesh;
mod orbit_camera;
mod renderer;
mod scene_pass;
mod shader;
pub mod transform;

pub use app::{AppError, run, run_driver, run_with_window};
pub use clock::AnimationClock;
pub use config::{
    Cli, ConfigError, MAX_BLADE_COUNT, Startup, USAGE, USAGE_EXIT_CODE, WindmillConfig,
    WindowConfig,
};
pub use driver::{FrameDriver, FrameStats, WindmillDriver};
pub use geometry::{BLADE_VERTICES, BODY_VERTICES, ROOF_APEX, Vertex};
pub use gpu::{GpuContext, RenderError};
pub use mesh::{Mesh, MeshId};
pub use orbit_camera::{FOCUS_POINT, OrbitCamera, STARTING_CAMERA_POSITION};
pub use renderer::{DrawTarget, FrameRenderer, FrameSummary, ProgramUniforms};
pub use scene_pass::{DEPTH_FORMAT, DrawSlot, FrameRecorder, ScenePass};
pub use shader::{DepthCompare, ShaderProgram, UniformLocation};
pub use transform::FrameTransforms;

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec3};
