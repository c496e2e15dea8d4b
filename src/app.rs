use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::config::{WindmillConfig, WindowConfig};
use crate::driver::{FrameDriver, WindmillDriver};
use crate::gpu::{GpuContext, RenderError};

/// Errors that end the application.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    CreateWindow(#[from] winit::error::OsError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Open the default window and animate the windmill until it is closed.
///
/// # Example
/// ```no_run
/// let config = windmill::WindmillConfig::new(4, 2.0, 10.0)?;
/// windmill::run(config)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn run(config: WindmillConfig) -> Result<(), AppError> {
    run_with_window(config, WindowConfig::default())
}

/// Run the windmill in a window with custom settings.
pub fn run_with_window(config: WindmillConfig, window: WindowConfig) -> Result<(), AppError> {
    run_driver(window, Box::new(WindmillDriver::new(config)))
}

/// Run any [`FrameDriver`] inside a window.
pub fn run_driver(window: WindowConfig, driver: Box<dyn FrameDriver>) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = WindmillApp::Pending {
        window_config: window,
        driver: Some(driver),
    };
    event_loop.run_app(&mut app)?;

    match app {
        WindmillApp::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

enum WindmillApp {
    Pending {
        window_config: WindowConfig,
        driver: Option<Box<dyn FrameDriver>>,
    },
    Running {
        window: Arc<Window>,
        gpu: GpuContext,
        driver: Box<dyn FrameDriver>,
    },
    Failed(AppError),
}

impl WindmillApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        *self = WindmillApp::Failed(err);
        event_loop.exit();
    }
}

fn start(
    event_loop: &ActiveEventLoop,
    window_config: &WindowConfig,
    mut driver: Box<dyn FrameDriver>,
) -> Result<WindmillApp, AppError> {
    let window_attrs = WindowAttributes::default()
        .with_title(&window_config.title)
        .with_inner_size(winit::dpi::LogicalSize::new(
            window_config.width,
            window_config.height,
        ));

    let window = Arc::new(event_loop.create_window(window_attrs)?);
    let gpu = GpuContext::new(window.clone())?;
    driver.initialize(&gpu)?;
    window.request_redraw();

    Ok(WindmillApp::Running {
        window,
        gpu,
        driver,
    })
}

impl ApplicationHandler for WindmillApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let WindmillApp::Pending {
            window_config,
            driver,
        } = self
        else {
            return;
        };
        let Some(driver) = driver.take() else {
            return;
        };

        match start(event_loop, window_config, driver) {
            Ok(running) => *self = running,
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let WindmillApp::Running {
            window,
            gpu,
            driver,
        } = self
        else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("window closed");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                gpu.resize(size.width, size.height);
                driver.on_resize(gpu, size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                let size = window.inner_size();
                match driver.render_frame(gpu, size.width, size.height, Instant::now()) {
                    Ok(_) => window.request_redraw(),
                    Err(err) => self.fail(event_loop, err.into()),
                }
            }
            _ => {}
        }
    }
}
