use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::mpsc;

use crate::audio::{
    AudioPlayer, Canvas, PcmBuffer, PlaybackState, PlayerEvent, SpectrumVisualizer, TickOutcome,
};
use crate::config::{AppConfig, Theme};
use crate::events::{Action, TickTimer};
use crate::library::PlayQueue;

const SEEK_STEP: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
}

pub struct App {
    // State
    pub running: bool,
    pub status_message: Option<StatusMessage>,

    // Playback
    pub player: AudioPlayer,
    pub queue: PlayQueue,
    player_events: mpsc::Receiver<PlayerEvent>,

    // Visualizer
    pub visualizer: SpectrumVisualizer,
    pub timer: TickTimer,
    spectrum_canvas: Canvas,

    // Settings
    pub config: AppConfig,
    theme: Theme,
}

impl App {
    pub fn new(config: AppConfig, queue: PlayQueue) -> Result<Self> {
        let mut player = AudioPlayer::new(config.volume)?;
        let player_events = player.subscribe();
        let visualizer = SpectrumVisualizer::new(&config.visualizer)?;
        let timer = TickTimer::new(config.visualizer.tick_interval());

        let mut app = Self {
            running: true,
            status_message: None,

            player,
            queue,
            player_events,

            visualizer,
            timer,
            spectrum_canvas: Canvas::new(0.0, 0.0),

            theme: config.theme.theme(),
            config,
        };

        if app.queue.is_empty() {
            app.set_status("Queue is empty: pass files or folders on the command line");
        } else {
            app.play_current();
        }

        Ok(app)
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.quit(),
            Action::PlayPause => self.toggle_playback(),
            Action::Stop => self.stop_playback(),
            Action::NextTrack => {
                if self.queue.next_track().is_some() {
                    self.play_current();
                } else {
                    self.set_status("End of queue");
                }
            }
            Action::PrevTrack => {
                if self.queue.prev_track().is_some() {
                    self.play_current();
                } else {
                    self.set_status("Start of queue");
                }
            }
            Action::SeekForward => {
                if let Err(e) = self.player.seek_forward(SEEK_STEP) {
                    self.set_error(format!("{:#}", e));
                }
            }
            Action::SeekBackward => {
                if let Err(e) = self.player.seek_backward(SEEK_STEP) {
                    self.set_error(format!("{:#}", e));
                }
            }
            Action::VolumeUp => {
                self.player.volume_up();
                self.config.volume = self.player.volume();
            }
            Action::VolumeDown => {
                self.player.volume_down();
                self.config.volume = self.player.volume();
            }
            Action::ToggleMute => self.player.toggle_mute(),
            Action::ToggleRepeat => {
                let repeat = self.queue.cycle_repeat();
                self.config.repeat = repeat;
                self.set_status(repeat.label());
            }
            Action::ToggleShuffle => {
                let shuffle = self.queue.toggle_shuffle();
                self.config.shuffle = shuffle;
                self.set_status(if shuffle { "Shuffle on" } else { "Shuffle off" });
            }
            Action::ToggleSpectrum => self.toggle_spectrum(),
            Action::None => {}
        }
    }

    /// Load the queue's current track and start it
    fn play_current(&mut self) {
        let Some(path) = self.queue.current().map(|t| t.path.clone()) else {
            return;
        };

        self.timer.stop();
        self.visualizer.stop();

        match self.player.load(&path) {
            Ok(format) => {
                if let Err(e) = self.visualizer.load_track(format) {
                    self.set_error(format!("Spectrum unavailable: {}", e));
                }
                self.player.play();
                self.start_visualizer();
            }
            Err(e) => {
                log::error!("{:#}", e);
                self.visualizer.unload();
                self.set_error(format!("{:#}", e));
            }
        }
    }

    fn toggle_playback(&mut self) {
        match self.player.state() {
            PlaybackState::Playing => {
                self.player.pause();
                self.visualizer.pause();
                self.timer.stop();
            }
            PlaybackState::Paused | PlaybackState::Stopped => {
                if self.player.current_path().is_none() {
                    self.play_current();
                    return;
                }
                self.player.toggle_pause();
                self.start_visualizer();
            }
        }
    }

    fn stop_playback(&mut self) {
        self.player.stop();
        self.visualizer.stop();
        self.timer.stop();
    }

    fn toggle_spectrum(&mut self) {
        let enabled = !self.visualizer.is_enabled();
        self.visualizer.set_enabled(enabled);
        self.config.visualizer.enabled = enabled;
        if enabled && self.player.is_playing() {
            self.start_visualizer();
        } else {
            self.timer.stop();
        }
        self.set_status(if enabled { "Spectrum on" } else { "Spectrum off" });
    }

    fn start_visualizer(&mut self) {
        if self.visualizer.play() && self.visualizer.is_enabled() && !self.timer.is_running() {
            log::debug!("Spectrum timer started ({:?})", self.config.visualizer.tick_interval());
            self.timer.start(Instant::now());
        }
    }

    /// Surface the spectrum will be drawn on, in bar units
    pub fn set_spectrum_canvas(&mut self, canvas: Canvas) {
        self.spectrum_canvas = canvas;
    }

    /// One visualizer refresh. The shared stream is locked only while the window
    /// is captured so playback cannot move the cursor mid-read; the transform and
    /// bar mapping run after the lock is released.
    pub fn on_tick(&mut self) -> TickOutcome {
        let canvas = self.spectrum_canvas;
        let is_playing = self.player.is_playing();

        let sampled = match self.player.stream() {
            Some(stream) => {
                let mut guard = stream.lock();
                self.visualizer.sample(Some(&mut *guard), is_playing, canvas)
            }
            None => self
                .visualizer
                .sample(None::<&mut PcmBuffer>, is_playing, canvas),
        };

        let outcome = match sampled {
            Ok(()) => self.visualizer.render(canvas),
            Err(outcome) => outcome,
        };

        if outcome == TickOutcome::Inactive {
            self.timer.stop();
        }
        outcome
    }

    pub fn process_player_events(&mut self) {
        while let Ok(event) = self.player_events.try_recv() {
            match event {
                PlayerEvent::Loaded(path) => {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    self.set_status(format!("Loaded {}", name));
                }
                PlayerEvent::Error(msg) => self.set_error(msg),
                PlayerEvent::VolumeChanged(volume) => {
                    log::debug!("Volume {:.0}%", volume * 100.0);
                }
                PlayerEvent::Playing
                | PlayerEvent::Paused
                | PlayerEvent::Resumed
                | PlayerEvent::Stopped => {
                    log::debug!("Player: {:?}", event);
                }
            }
        }
    }

    pub fn check_track_ended(&mut self) {
        if !self.player.is_finished() {
            return;
        }

        if self.queue.on_track_end().is_some() {
            self.play_current();
        } else {
            self.stop_playback();
            self.set_status("Queue finished");
        }
    }

    fn set_status(&mut self, text: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            level: StatusLevel::Info,
        });
    }

    fn set_error(&mut self, text: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            level: StatusLevel::Error,
        });
    }

    fn quit(&mut self) {
        self.stop_playback();
        self.visualizer.unload();
        self.running = false;
    }
}
