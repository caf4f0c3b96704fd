use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use super::theme::ThemePreset;
use crate::audio::FftBackend;
use crate::cli::Cli;
use crate::library::RepeatMode;

const CONFIG_FILE: &str = "sonar.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("fft_size must be a power of two of at least 2, got {0}")]
    FftSize(usize),
    #[error("bar_count must be at least 1")]
    NoBars,
    #[error("tick_ms must be at least 1")]
    ZeroTick,
    #[error("gain must be a positive number, got {0}")]
    Gain(f32),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub volume: f32,
    pub theme: ThemePreset,
    pub repeat: RepeatMode,
    pub shuffle: bool,
    pub visualizer: VisualizerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            volume: 0.8,
            theme: ThemePreset::Default,
            repeat: RepeatMode::Off,
            shuffle: false,
            visualizer: VisualizerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    pub enabled: bool,
    /// Analysis window in frames
    pub fft_size: usize,
    pub bar_count: usize,
    pub tick_ms: u64,
    pub gain: f32,
    /// Space between bars, in terminal columns
    pub bar_gap: f32,
    pub backend: FftBackend,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fft_size: 1024,
            bar_count: 64,
            tick_ms: 30,
            gain: 2.0,
            bar_gap: 1.0,
            backend: FftBackend::Radix2,
        }
    }
}

impl VisualizerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl AppConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Explicit path, else `./sonar.toml`, else the platform config dir, else defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return Self::load(&local);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("sonar").join("config.toml");
            if platform.exists() {
                return Self::load(&platform);
            }
        }

        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let vis = &self.visualizer;
        if vis.fft_size < 2 || !vis.fft_size.is_power_of_two() {
            return Err(ConfigError::FftSize(vis.fft_size));
        }
        if vis.bar_count == 0 {
            return Err(ConfigError::NoBars);
        }
        if vis.tick_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }
        if vis.gain.is_nan() || vis.gain <= 0.0 {
            return Err(ConfigError::Gain(vis.gain));
        }
        Ok(())
    }

    /// Command-line flags win over file values
    pub fn apply_cli(&mut self, cli: &Cli) -> Result<(), ConfigError> {
        if let Some(volume) = cli.volume {
            self.volume = volume;
        }
        if let Some(fft_size) = cli.fft_size {
            self.visualizer.fft_size = fft_size;
        }
        if let Some(bars) = cli.bars {
            self.visualizer.bar_count = bars;
        }
        if let Some(tick_ms) = cli.tick_ms {
            self.visualizer.tick_ms = tick_ms;
        }
        if let Some(backend) = cli.backend {
            self.visualizer.backend = backend;
        }
        if cli.no_spectrum {
            self.visualizer.enabled = false;
        }
        self.volume = self.volume.clamp(0.0, 1.0);
        self.validate()
    }
}
