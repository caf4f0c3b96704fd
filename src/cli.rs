use std::path::PathBuf;

use clap::Parser;

use crate::audio::FftBackend;

#[derive(Parser, Debug)]
#[command(name = "sonar", about = "Terminal audio player with a real-time spectrum visualizer")]
pub struct Cli {
    /// Audio files or folders to queue (WAV, MP3, FLAC, OGG, ...)
    pub paths: Vec<PathBuf>,

    /// Config file (defaults to ./sonar.toml, then the platform config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log file (defaults to the platform cache dir)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Initial volume (0.0-1.0)
    #[arg(long)]
    pub volume: Option<f32>,

    /// Analysis window in frames (power of two)
    #[arg(long)]
    pub fft_size: Option<usize>,

    /// Number of spectrum bars
    #[arg(long)]
    pub bars: Option<usize>,

    /// Visualizer refresh period in milliseconds
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// FFT implementation
    #[arg(long, value_enum)]
    pub backend: Option<FftBackend>,

    /// Start with the spectrum visualizer turned off
    #[arg(long)]
    pub no_spectrum: bool,
}
