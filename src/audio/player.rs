use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use tokio::sync::mpsc;

use super::decode::decode_file;
use super::format::StreamFormat;
use super::stream::{PcmStream, SharedStream};

/// Frames pulled from the shared stream per lock
const CHUNK_FRAMES: usize = 1024;

const VOLUME_STEP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Clone)]
pub enum PlayerEvent {
    Loaded(PathBuf),
    Playing,
    Paused,
    Resumed,
    Stopped,
    Error(String),
    VolumeChanged(f32),
}

pub struct AudioPlayer {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    sink: Sink,
    state: PlaybackState,
    volume: f32,
    muted: bool,
    current_path: Option<PathBuf>,
    pcm: Option<SharedStream>,
    event_tx: Option<mpsc::Sender<PlayerEvent>>,
}

impl AudioPlayer {
    pub fn new(volume: f32) -> Result<Self> {
        let (stream, stream_handle) =
            OutputStream::try_default().context("No audio output device available")?;
        let sink = Sink::try_new(&stream_handle)?;

        Ok(Self {
            _stream: stream,
            stream_handle,
            sink,
            state: PlaybackState::Stopped,
            volume: volume.clamp(0.0, 1.0),
            muted: false,
            current_path: None,
            pcm: None,
            event_tx: None,
        })
    }

    /// Receive player events; replaces any previous subscriber
    pub fn subscribe(&mut self) -> mpsc::Receiver<PlayerEvent> {
        let (tx, rx) = mpsc::channel(32);
        self.event_tx = Some(tx);
        rx
    }

    fn send_event(&self, event: PlayerEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.try_send(event);
        }
    }

    /// Decode `path` and queue it paused at the start
    pub fn load(&mut self, path: &Path) -> Result<StreamFormat> {
        self.stop();
        self.pcm = None;
        self.current_path = None;

        let buffer = match decode_file(path) {
            Ok(buffer) => buffer,
            Err(e) => {
                self.send_event(PlayerEvent::Error(e.to_string()));
                return Err(e).with_context(|| format!("Failed to load {}", path.display()));
            }
        };
        let format = buffer.format();
        format
            .validate()
            .with_context(|| format!("Cannot play {}", path.display()))?;

        self.pcm = Some(SharedStream::new(buffer));
        self.current_path = Some(path.to_path_buf());
        self.queue_source();
        self.sink.pause();

        log::info!("Loaded {}", path.display());
        self.send_event(PlayerEvent::Loaded(path.to_path_buf()));
        Ok(format)
    }

    fn queue_source(&mut self) {
        if let Some(pcm) = &self.pcm {
            self.sink.append(StreamSource::new(pcm.clone()));
            self.apply_volume();
        }
    }

    pub fn play(&mut self) {
        if self.pcm.is_none() {
            return;
        }
        if self.sink.empty() {
            self.queue_source();
        }
        self.sink.play();
        self.state = PlaybackState::Playing;
        self.send_event(PlayerEvent::Playing);
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.sink.pause();
            self.state = PlaybackState::Paused;
            self.send_event(PlayerEvent::Paused);
        }
    }

    pub fn resume(&mut self) {
        if self.state == PlaybackState::Paused {
            self.sink.play();
            self.state = PlaybackState::Playing;
            self.send_event(PlayerEvent::Resumed);
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused => self.resume(),
            PlaybackState::Stopped => self.play(),
        }
    }

    /// Stop output and rewind; the track stays loaded
    pub fn stop(&mut self) {
        self.sink.stop();
        // Create a new sink for future playback
        if let Ok(sink) = Sink::try_new(&self.stream_handle) {
            self.sink = sink;
        }
        if let Some(pcm) = &self.pcm {
            if let Err(e) = pcm.seek_to(0) {
                log::warn!("Failed to rewind stream: {}", e);
            }
        }
        let was_stopped = self.state == PlaybackState::Stopped;
        self.state = PlaybackState::Stopped;
        if !was_stopped {
            self.send_event(PlayerEvent::Stopped);
        }
    }

    pub fn seek(&mut self, position: Duration) -> Result<()> {
        if let Some(pcm) = &self.pcm {
            let target = pcm.format().byte_offset_at(position);
            pcm.seek_to(target).context("Seek failed")?;
        }
        Ok(())
    }

    pub fn seek_forward(&mut self, amount: Duration) -> Result<()> {
        let new_pos = self.position() + amount;
        if new_pos < self.duration() {
            self.seek(new_pos)?;
        }
        Ok(())
    }

    pub fn seek_backward(&mut self, amount: Duration) -> Result<()> {
        let new_pos = self.position().saturating_sub(amount);
        self.seek(new_pos)
    }

    fn apply_volume(&self) {
        self.sink
            .set_volume(if self.muted { 0.0 } else { self.volume });
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.muted = false;
        self.apply_volume();
        self.send_event(PlayerEvent::VolumeChanged(self.volume));
    }

    pub fn volume_up(&mut self) {
        self.set_volume(self.volume + VOLUME_STEP);
    }

    pub fn volume_down(&mut self) {
        self.set_volume(self.volume - VOLUME_STEP);
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        self.apply_volume();
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// Shared handle to the loaded track, for the visualizer
    pub fn stream(&self) -> Option<&SharedStream> {
        self.pcm.as_ref()
    }

    pub fn format(&self) -> Option<StreamFormat> {
        self.pcm.as_ref().map(SharedStream::format)
    }

    pub fn position(&self) -> Duration {
        self.pcm
            .as_ref()
            .map(|pcm| pcm.format().duration_at(pcm.position()))
            .unwrap_or(Duration::ZERO)
    }

    pub fn duration(&self) -> Duration {
        self.pcm
            .as_ref()
            .map(|pcm| pcm.format().duration_at(pcm.byte_len()))
            .unwrap_or(Duration::ZERO)
    }

    pub fn is_finished(&self) -> bool {
        self.sink.empty() && self.state == PlaybackState::Playing
    }

    pub fn progress(&self) -> f64 {
        let duration = self.duration();
        if duration.is_zero() {
            0.0
        } else {
            (self.position().as_secs_f64() / duration.as_secs_f64()).min(1.0)
        }
    }
}

/// Output source pulling 16-bit samples from the shared stream in chunks.
///
/// A user seek bumps the stream's generation, which drops whatever this source
/// had already buffered from the old position.
struct StreamSource {
    stream: SharedStream,
    format: StreamFormat,
    raw: Vec<u8>,
    chunk: Vec<i16>,
    cursor: usize,
    generation: u64,
}

impl StreamSource {
    fn new(stream: SharedStream) -> Self {
        let format = stream.format();
        let generation = stream.seek_generation();
        Self {
            raw: vec![0; CHUNK_FRAMES * format.block_align as usize],
            chunk: Vec::with_capacity(CHUNK_FRAMES * format.channels as usize),
            cursor: 0,
            stream,
            format,
            generation,
        }
    }

    fn refill(&mut self) -> bool {
        let read = {
            let mut guard = self.stream.lock();
            // Read under the same lock a seek holds while bumping the generation
            self.generation = self.stream.seek_generation();
            guard.read(&mut self.raw)
        };
        let n = match read {
            Ok(n) => n,
            Err(e) => {
                log::warn!("Playback read failed: {}", e);
                return false;
            }
        };

        self.chunk.clear();
        self.chunk.extend(
            self.raw[..n]
                .chunks_exact(2)
                .map(|b| i16::from_le_bytes([b[0], b[1]])),
        );
        self.cursor = 0;
        !self.chunk.is_empty()
    }
}

impl Iterator for StreamSource {
    type Item = i16;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stream.seek_generation() != self.generation {
            self.chunk.clear();
            self.cursor = 0;
        }

        if self.cursor >= self.chunk.len() && !self.refill() {
            return None;
        }

        let sample = self.chunk[self.cursor];
        self.cursor += 1;
        Some(sample)
    }
}

impl Source for StreamSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        self.format.channels
    }

    fn sample_rate(&self) -> u32 {
        self.format.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(self.format.duration_at(self.stream.byte_len()))
    }
}
