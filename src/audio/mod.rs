pub mod bars;
pub mod decode;
pub mod fft;
pub mod format;
pub mod player;
pub mod sampler;
pub mod spectrum;
pub mod stream;

pub use bars::Bar;
pub use fft::FftBackend;
pub use format::StreamFormat;
pub use player::{AudioPlayer, PlaybackState, PlayerEvent};
pub use spectrum::{Canvas, SpectrumVisualizer, TickOutcome, VisualizerState};
pub use stream::{PcmBuffer, PcmStream, SharedStream};
