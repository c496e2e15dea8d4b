//! Frame driver: the callbacks a windowing host invokes.
//!
//! The host owns the window and the loop. It calls [`FrameDriver::initialize`]
//! once a GPU context exists, [`FrameDriver::render_frame`] once per redraw and
//! [`FrameDriver::on_resize`] whenever the surface changes size.

use std::time::{Duration, Instant};

use crate::clock::AnimationClock;
use crate::config::WindmillConfig;
use crate::gpu::{GpuContext, RenderError};
use crate::orbit_camera::OrbitCamera;
use crate::renderer::{FrameRenderer, FrameSummary, ProgramUniforms};
use crate::scene_pass::ScenePass;
use crate::shader::ShaderProgram;

/// Host-driven rendering callbacks.
pub trait FrameDriver {
    /// Create GPU resources. Called once before the first frame.
    fn initialize(&mut self, gpu: &GpuContext) -> Result<(), RenderError>;

    /// Render and present one frame for a `width` x `height` viewport at `now`.
    ///
    /// Returns `Ok(None)` when the frame was skipped (minimized window, lost
    /// surface) and nothing was presented.
    fn render_frame(
        &mut self,
        gpu: &GpuContext,
        width: u32,
        height: u32,
        now: Instant,
    ) -> Result<Option<FrameSummary>, RenderError>;

    /// The surface was resized; `gpu` is already reconfigured.
    fn on_resize(&mut self, gpu: &GpuContext, width: u32, height: u32);
}

/// Frames-per-second bookkeeping, reported once per interval.
#[derive(Clone, Debug)]
pub struct FrameStats {
    interval: Duration,
    window_start: Option<Instant>,
    frames: u32,
    total_frames: u64,
}

impl FrameStats {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            window_start: None,
            frames: 0,
            total_frames: 0,
        }
    }

    /// Count a presented frame. Returns the frame rate when an interval closes.
    pub fn record(&mut self, now: Instant) -> Option<f64> {
        self.total_frames += 1;
        let Some(start) = self.window_start else {
            self.window_start = Some(now);
            return None;
        };

        self.frames += 1;
        let span = now.saturating_duration_since(start);
        if span < self.interval {
            return None;
        }

        let fps = self.frames as f64 / span.as_secs_f64();
        self.frames = 0;
        self.window_start = Some(now);
        Some(fps)
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }
}

struct DriverState {
    clock: AnimationClock,
    renderer: FrameRenderer,
    pass: ScenePass,
}

/// Drives the windmill scene.
pub struct WindmillDriver {
    config: WindmillConfig,
    camera: OrbitCamera,
    state: Option<DriverState>,
    stats: FrameStats,
}

impl WindmillDriver {
    pub fn new(config: WindmillConfig) -> Self {
        Self::with_camera(config, OrbitCamera::default())
    }

    pub fn with_camera(config: WindmillConfig, camera: OrbitCamera) -> Self {
        Self {
            config,
            camera,
            state: None,
            stats: FrameStats::new(Duration::from_secs(1)),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }
}

impl FrameDriver for WindmillDriver {
    fn initialize(&mut self, gpu: &GpuContext) -> Result<(), RenderError> {
        let program = ShaderProgram::windmill(gpu)?;
        let uniforms = ProgramUniforms::resolve(|name| program.uniform_location(name))?;
        let pass = ScenePass::new(gpu, program, self.config.draws_per_frame());
        let renderer = FrameRenderer::new(self.config, self.camera, uniforms);

        tracing::info!(
            blades = self.config.blade_count(),
            blade_period = self.config.blade_period(),
            camera_period = self.config.camera_period(),
            "windmill initialized"
        );

        self.state = Some(DriverState {
            clock: AnimationClock::start(),
            renderer,
            pass,
        });
        Ok(())
    }

    fn render_frame(
        &mut self,
        gpu: &GpuContext,
        width: u32,
        height: u32,
        now: Instant,
    ) -> Result<Option<FrameSummary>, RenderError> {
        let state = self.state.as_mut().ok_or(RenderError::NotInitialized)?;
        if width == 0 || height == 0 {
            return Ok(None);
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::warn!("surface lost or outdated, reconfiguring");
                gpu.reconfigure();
                return Ok(None);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("timed out waiting for a surface texture, skipping frame");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        state.pass.ensure_depth_size(gpu);

        let elapsed = state.clock.elapsed_secs(now);
        let mut frame = state.pass.begin_frame();
        let summary = state.renderer.render(&mut frame, elapsed, width, height);
        state.pass.submit(gpu, frame, &view);
        output.present();

        if let Some(fps) = self.stats.record(now) {
            tracing::debug!(
                fps,
                frames = self.stats.total_frames(),
                draw_calls = summary.draw_calls,
                "frame stats"
            );
        }

        Ok(Some(summary))
    }

    fn on_resize(&mut self, gpu: &GpuContext, width: u32, height: u32) {
        tracing::debug!(width, height, "viewport resized");
        if let Some(state) = self.state.as_mut() {
            state.pass.ensure_depth_size(gpu);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_only_opens_the_window() {
        let mut stats = FrameStats::new(Duration::from_secs(1));
        assert_eq!(stats.record(Instant::now()), None);
        assert_eq!(stats.total_frames(), 1);
    }

    #[test]
    fn reports_rate_once_per_interval() {
        let start = Instant::now();
        let mut stats = FrameStats::new(Duration::from_secs(1));
        stats.record(start);

        let mut reports = Vec::new();
        for frame in 1..=120u64 {
            let now = start + Duration::from_millis(frame * 1000 / 60);
            if let Some(fps) = stats.record(now) {
                reports.push(fps);
            }
        }

        assert_eq!(reports.len(), 2);
        for fps in reports {
            assert!((fps - 60.0).abs() < 1.0, "fps {fps}");
        }
        assert_eq!(stats.total_frames(), 121);
    }

    #[test]
    fn driver_starts_uninitialized() {
        let config = WindmillConfig::new(4, 2.0, 10.0).unwrap();
        let driver = WindmillDriver::new(config);
        assert!(!driver.is_initialized());
    }
}
