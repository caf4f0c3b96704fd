pub mod settings;
pub mod theme;

pub use settings::{AppConfig, VisualizerConfig};
pub use theme::{Theme, ThemePreset};
