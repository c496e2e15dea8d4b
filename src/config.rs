//! Startup configuration.
//!
//! [`WindmillConfig`] holds the three animation parameters and can only be built
//! through validation, so a value of that type is always usable by the render
//! loop. [`Cli`] is the command line surface; its value parsers run the same
//! checks, which means bad input is rejected while arguments are parsed and the
//! window is never opened.

use std::ffi::OsString;
use std::fmt::Display;

use clap::Parser;

use crate::scene_pass::DrawSlot;

/// Exit status used when the startup arguments are missing or invalid.
pub const USAGE_EXIT_CODE: u8 = 9;

/// One-line usage hint printed after an argument error.
pub const USAGE: &str =
    "A positive integer followed by 2 real numbers separated by a space is required.";

/// Byte size of the largest buffer a device accepts under `wgpu::Limits::default()`.
const MAX_SLOT_BUFFER_SIZE: u64 = 1 << 28;

/// Most blades a windmill can have. Every frame needs one [`DrawSlot`] per blade
/// plus one for the body, and all of them live in a single buffer.
pub const MAX_BLADE_COUNT: u32 =
    (MAX_SLOT_BUFFER_SIZE / std::mem::size_of::<DrawSlot>() as u64) as u32 - 1;

/// Errors produced while validating startup arguments.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("blade count must be a positive integer, got {0}")]
    NonPositiveBladeCount(i64),
    #[error("blade count must be a positive integer, got '{0}'")]
    InvalidBladeCount(String),
    #[error("blade count must be at most {max}, got {count}")]
    TooManyBlades { count: i64, max: u32 },
    #[error("{name} must be a positive number of seconds, got {value}")]
    NonPositivePeriod { name: &'static str, value: f64 },
    #[error("{name} must be a positive number of seconds, got '{value}'")]
    InvalidPeriod { name: &'static str, value: String },
}

/// Validated animation parameters. Immutable once built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindmillConfig {
    blade_count: u32,
    blade_period: f64,
    camera_period: f64,
}

impl WindmillConfig {
    /// Build a configuration, rejecting a blade count outside
    /// `1..=MAX_BLADE_COUNT` and any period that is not a finite, strictly
    /// positive number of seconds.
    pub fn new(blade_count: u32, blade_period: f64, camera_period: f64) -> Result<Self, ConfigError> {
        if blade_count == 0 {
            return Err(ConfigError::NonPositiveBladeCount(0));
        }
        if blade_count > MAX_BLADE_COUNT {
            return Err(ConfigError::TooManyBlades {
                count: blade_count.into(),
                max: MAX_BLADE_COUNT,
            });
        }
        Ok(Self {
            blade_count,
            blade_period: validate_period("blade period", blade_period)?,
            camera_period: validate_period("camera period", camera_period)?,
        })
    }

    /// Number of blades, between one and [`MAX_BLADE_COUNT`].
    pub fn blade_count(&self) -> u32 {
        self.blade_count
    }

    /// Seconds per full blade revolution.
    pub fn blade_period(&self) -> f64 {
        self.blade_period
    }

    /// Seconds per full camera orbit.
    pub fn camera_period(&self) -> f64 {
        self.camera_period
    }

    /// Draw calls issued per frame: the body plus one per blade.
    pub fn draws_per_frame(&self) -> u32 {
        self.blade_count + 1
    }
}

fn validate_period(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NonPositivePeriod { name, value })
    }
}

fn parse_blade_count(arg: &str) -> Result<u32, ConfigError> {
    let invalid = || ConfigError::InvalidBladeCount(arg.to_string());
    let count: i64 = arg.trim().parse().map_err(|_| invalid())?;
    if count <= 0 {
        return Err(ConfigError::NonPositiveBladeCount(count));
    }
    if count > i64::from(MAX_BLADE_COUNT) {
        return Err(ConfigError::TooManyBlades {
            count,
            max: MAX_BLADE_COUNT,
        });
    }
    u32::try_from(count).map_err(|_| invalid())
}

fn parse_period(name: &'static str, arg: &str) -> Result<f64, ConfigError> {
    let value: f64 = arg.trim().parse().map_err(|_| ConfigError::InvalidPeriod {
        name,
        value: arg.to_string(),
    })?;
    validate_period(name, value)
}

fn parse_blade_period(arg: &str) -> Result<f64, ConfigError> {
    parse_period("blade period", arg)
}

fn parse_camera_period(arg: &str) -> Result<f64, ConfigError> {
    parse_period("camera period", arg)
}

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "windmill",
    version,
    about = "An animated windmill viewed from an orbiting camera",
    after_help = USAGE
)]
pub struct Cli {
    /// Number of blades (positive integer)
    #[arg(
        value_name = "BLADE_COUNT",
        allow_negative_numbers = true,
        value_parser = parse_blade_count
    )]
    pub blade_count: u32,

    /// Seconds per blade revolution (positive real)
    #[arg(
        value_name = "BLADE_PERIOD",
        allow_negative_numbers = true,
        value_parser = parse_blade_period
    )]
    pub blade_period: f64,

    /// Seconds per camera orbit (positive real)
    #[arg(
        value_name = "CAMERA_PERIOD",
        allow_negative_numbers = true,
        value_parser = parse_camera_period
    )]
    pub camera_period: f64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn config(&self) -> Result<WindmillConfig, ConfigError> {
        WindmillConfig::new(self.blade_count, self.blade_period, self.camera_period)
    }
}

/// What the process does after reading its command line.
#[derive(Debug)]
pub enum Startup {
    /// The arguments are valid.
    Run { config: WindmillConfig, verbose: bool },
    /// Stop with `code` after printing `message`: to stdout for code 0
    /// (`--help`, `--version`), to stderr otherwise.
    Exit { code: u8, message: String },
}

impl Startup {
    /// Parse `args` (program name first) and decide how to proceed. Every
    /// argument error ends with [`USAGE_EXIT_CODE`] and the usage line.
    pub fn from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli = match Cli::try_parse_from(args) {
            Ok(cli) => cli,
            Err(err) if !err.use_stderr() => {
                return Startup::Exit {
                    code: 0,
                    message: err.to_string(),
                };
            }
            Err(err) => return Self::usage_error(err),
        };

        // The value parsers have already validated each argument, but the
        // constructor is the only way to build a config.
        match cli.config() {
            Ok(config) => Startup::Run {
                config,
                verbose: cli.verbose,
            },
            Err(err) => Self::usage_error(err),
        }
    }

    fn usage_error(err: impl Display) -> Self {
        Startup::Exit {
            code: USAGE_EXIT_CODE,
            message: format!("{}\n{USAGE}", err.to_string().trim_end()),
        }
    }
}

/// Window settings for the application shell.
#[derive(Clone, Debug)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Windmill".to_string(),
            width: 600,
            height: 600,
        }
    }
}

impl WindowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}
