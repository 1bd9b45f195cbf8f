use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::analysis::loudness::Calibration;
use crate::cli::Cli;
use crate::error::SpectrogramError;
use crate::render::raster::RenderSettings;

pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,
    #[serde(default = "default_hop_size")]
    pub hop_size: usize,
    /// Fixed dB offset; unset means full-scale calibration.
    #[serde(default)]
    pub reference_offset_db: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Defaults to `sample_count / hop_size` when unset.
    #[serde(default)]
    pub width: Option<usize>,
    #[serde(default = "default_height")]
    pub height: usize,
}

#[derive(Debug, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_sample_rate")]
    pub expected_sample_rate: u32,
}

#[derive(Debug, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fft_size: default_fft_size(),
            hop_size: default_hop_size(),
            reference_offset_db: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: None,
            height: default_height(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            expected_sample_rate: default_sample_rate(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
        }
    }
}

fn default_fft_size() -> usize { 2048 }
fn default_hop_size() -> usize { 880 }
fn default_height() -> usize { 512 }
fn default_sample_rate() -> u32 { DEFAULT_SAMPLE_RATE }
fn default_parallel() -> bool { true }

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(err) => {
            log::warn!("Invalid config {}: {}", path.display(), err);
            None
        }
    }
}

/// Explicit `--config`, then `./sonogram.toml`, then the user config dirs.
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from("sonogram.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("sonogram").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("sonogram").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

/// Everything a run needs once CLI flags and config are merged.
#[derive(Debug, PartialEq)]
pub struct RunSettings {
    pub render: RenderSettings,
    pub width: Option<usize>,
    pub expected_sample_rate: u32,
}

impl RunSettings {
    /// CLI flags win over the config file, which wins over built-in defaults.
    pub fn resolve(cli: &Cli, config: &Config) -> Self {
        let render = RenderSettings {
            fft_size: cli.fft_size.unwrap_or(config.analysis.fft_size),
            hop_size: cli.hop_size.unwrap_or(config.analysis.hop_size),
            height: cli.height.unwrap_or(config.output.height),
            calibration: Calibration::from_offset(
                cli.reference_offset.or(config.analysis.reference_offset_db),
            ),
            parallel: !cli.serial && config.render.parallel,
        };
        Self {
            render,
            width: cli.width.or(config.output.width),
            expected_sample_rate: cli.sample_rate.unwrap_or(config.input.expected_sample_rate),
        }
    }

    /// Requested width, or one column per hop of input. Image dimensions are
    /// `u32`, so anything wider is rejected.
    pub fn width_for(&self, sample_count: usize) -> Result<usize, SpectrogramError> {
        let width = self
            .width
            .unwrap_or(sample_count / self.render.hop_size.max(1));
        match u32::try_from(width) {
            Ok(_) => Ok(width),
            Err(_) => Err(SpectrogramError::TooLarge {
                name: "width",
                value: width,
                max: u32::MAX as usize,
            }),
        }
    }
}
