use super::bars::{Bar, BarGeometry, BarMapper};
use super::fft::{Direction, FftError, Transform};
use super::format::{FormatError, StreamFormat};
use super::sampler::SpectrumSampler;
use super::stream::PcmStream;
use crate::config::VisualizerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualizerState {
    /// No track loaded
    Idle,
    /// Track loaded, not playing
    Armed,
    /// Playing; every tick samples, transforms and maps
    Running,
}

/// Drawing surface size, polled every tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_drawable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Rendered,
    Inactive,
    EmptyCanvas,
    /// Sampling failed this tick; the display was cleared
    Skipped,
}

/// Sample -> FFT -> bars pipeline and its lifecycle.
///
/// Everything a tick needs (stream, playing flag, canvas) is passed in explicitly.
/// Any tick that does not render leaves the bar list empty.
pub struct SpectrumVisualizer {
    state: VisualizerState,
    enabled: bool,
    sampler: SpectrumSampler,
    transform: Transform,
    mapper: BarMapper,
    bars: BarGeometry,
    // A fresh window is waiting in the sampler for `render`
    captured: bool,
}

impl SpectrumVisualizer {
    pub fn new(config: &VisualizerConfig) -> Result<Self, FftError> {
        let transform = Transform::new(config.backend, config.fft_size)?;
        Ok(Self {
            state: VisualizerState::Idle,
            enabled: config.enabled,
            sampler: SpectrumSampler::new(transform.len()),
            transform,
            mapper: BarMapper::new(config.bar_count, config.gain, config.bar_gap),
            bars: Vec::new(),
            captured: false,
        })
    }

    pub fn state(&self) -> VisualizerState {
        self.state
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.captured = false;
            self.bars.clear();
        }
    }

    /// Refresh the stream format for a newly loaded track.
    ///
    /// A rejected format unloads the visualizer.
    pub fn load_track(&mut self, format: StreamFormat) -> Result<(), FormatError> {
        if let Err(e) = self.sampler.set_format(format) {
            log::warn!("Visualizer refused stream format {:?}: {}", format, e);
            self.unload();
            return Err(e);
        }
        if self.state == VisualizerState::Idle {
            self.state = VisualizerState::Armed;
        }
        log::info!(
            "Visualizer armed: {} Hz, {} ch, {} window",
            format.sample_rate,
            format.channels,
            self.sampler.len()
        );
        Ok(())
    }

    pub fn unload(&mut self) {
        self.sampler.clear_format();
        self.state = VisualizerState::Idle;
        self.captured = false;
        self.bars.clear();
    }

    /// Returns false when there is no track to visualize
    pub fn play(&mut self) -> bool {
        match self.state {
            VisualizerState::Idle => false,
            VisualizerState::Armed | VisualizerState::Running => {
                self.state = VisualizerState::Running;
                true
            }
        }
    }

    pub fn pause(&mut self) {
        if self.state == VisualizerState::Running {
            self.state = VisualizerState::Armed;
        }
        self.captured = false;
        self.bars.clear();
    }

    pub fn stop(&mut self) {
        self.pause();
    }

    /// Sample, transform and map in one step
    pub fn tick<S>(&mut self, stream: Option<&mut S>, is_playing: bool, canvas: Canvas) -> TickOutcome
    where
        S: PcmStream + ?Sized,
    {
        match self.sample(stream, is_playing, canvas) {
            Ok(()) => self.render(canvas),
            Err(outcome) => outcome,
        }
    }

    /// The part of a tick that touches the stream: activity and canvas checks,
    /// format refresh and window capture.
    ///
    /// `Err` carries the outcome of a tick that ends here, with the bars cleared.
    pub fn sample<S>(&mut self, stream: Option<&mut S>, is_playing: bool, canvas: Canvas) -> Result<(), TickOutcome>
    where
        S: PcmStream + ?Sized,
    {
        self.captured = false;

        let stream = match stream {
            Some(stream) if self.enabled && is_playing && self.state == VisualizerState::Running => {
                stream
            }
            _ => {
                self.bars.clear();
                return Err(TickOutcome::Inactive);
            }
        };

        if !canvas.is_drawable() {
            self.bars.clear();
            return Err(TickOutcome::EmptyCanvas);
        }

        let format = stream.format();
        if self.sampler.format() != Some(format) && self.load_track(format).is_err() {
            return Err(TickOutcome::Skipped);
        }

        if let Err(e) = self.sampler.capture(stream) {
            log::debug!("Skipping spectrum tick: {}", e);
            self.bars.clear();
            return Err(TickOutcome::Skipped);
        }

        self.captured = true;
        Ok(())
    }

    /// Transform the captured window and map it onto `canvas`. Needs no stream.
    pub fn render(&mut self, canvas: Canvas) -> TickOutcome {
        if !std::mem::take(&mut self.captured) {
            self.bars.clear();
            return TickOutcome::Inactive;
        }

        let window = self.sampler.window_mut();
        self.transform.process(window, Direction::Forward);
        self.bars = self.mapper.map(window, canvas.width, canvas.height);

        TickOutcome::Rendered
    }
}
