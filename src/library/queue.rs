use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use serde::Deserialize;

use super::track::{AudioFormat, Track};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    #[default]
    Off,
    One,
    All,
}

impl RepeatMode {
    pub fn next(self) -> Self {
        match self {
            Self::Off => Self::One,
            Self::One => Self::All,
            Self::All => Self::Off,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Off => "─",
            Self::All => "↻",
            Self::One => "↺",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Off => "Repeat off",
            Self::All => "Repeat all",
            Self::One => "Repeat one",
        }
    }
}

/// Ordered tracks with a cursor.
///
/// With shuffle on, next/prev walk a random permutation of the tracks instead of
/// the queue order; stepping back retraces the permutation.
#[derive(Debug, Clone, Default)]
pub struct PlayQueue {
    tracks: Vec<Track>,
    current: Option<usize>,
    repeat: RepeatMode,
    shuffle: Option<ShuffleOrder>,
}

#[derive(Debug, Clone)]
struct ShuffleOrder {
    order: Vec<usize>,
    pos: usize,
}

impl ShuffleOrder {
    /// Random order over `len` tracks that starts at `first`
    fn new(len: usize, first: usize) -> Self {
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(&mut rand::rng());
        if let Some(i) = order.iter().position(|&t| t == first) {
            order.swap(0, i);
        }
        Self { order, pos: 0 }
    }
}

impl PlayQueue {
    pub fn new(tracks: Vec<Track>, repeat: RepeatMode) -> Self {
        let current = if tracks.is_empty() { None } else { Some(0) };
        Self {
            tracks,
            current,
            repeat,
            shuffle: None,
        }
    }

    /// Files are queued as given; folders contribute their supported files, sorted
    pub fn from_paths(paths: &[PathBuf], repeat: RepeatMode) -> Self {
        let mut tracks = Vec::new();
        for path in paths {
            if path.is_dir() {
                tracks.extend(scan_folder(path).into_iter().map(Track::new));
            } else {
                tracks.push(Track::new(path.clone()));
            }
        }
        Self::new(tracks, repeat)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn current(&self) -> Option<&Track> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.repeat = self.repeat.next();
        self.repeat
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffle.is_some()
    }

    /// Turning shuffle on draws a fresh order starting at the current track
    pub fn set_shuffle(&mut self, enabled: bool) {
        let first = self.current.unwrap_or(0);
        self.shuffle = enabled.then(|| ShuffleOrder::new(self.tracks.len(), first));
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        self.set_shuffle(!self.is_shuffled());
        self.is_shuffled()
    }

    /// Advance; wraps only with `RepeatMode::All`
    pub fn next_track(&mut self) -> Option<&Track> {
        let index = self.current?;
        if let Some(shuffle) = self.shuffle.as_mut() {
            if shuffle.pos + 1 < shuffle.order.len() {
                shuffle.pos += 1;
            } else if self.repeat == RepeatMode::All {
                shuffle.pos = 0;
            } else {
                return None;
            }
            self.current = shuffle.order.get(shuffle.pos).copied();
        } else if index + 1 < self.tracks.len() {
            self.current = Some(index + 1);
        } else if self.repeat == RepeatMode::All {
            self.current = Some(0);
        } else {
            return None;
        }
        self.current()
    }

    /// Step back; in shuffle order only as far as the first shuffled track
    pub fn prev_track(&mut self) -> Option<&Track> {
        let index = self.current?;
        if let Some(shuffle) = self.shuffle.as_mut() {
            if shuffle.pos == 0 {
                return None;
            }
            shuffle.pos -= 1;
            self.current = shuffle.order.get(shuffle.pos).copied();
        } else if index > 0 {
            self.current = Some(index - 1);
        } else if self.repeat == RepeatMode::All {
            self.current = Some(self.tracks.len() - 1);
        } else {
            return None;
        }
        self.current()
    }

    /// Track to play after the current one finishes
    pub fn on_track_end(&mut self) -> Option<&Track> {
        match self.repeat {
            RepeatMode::One => self.current(),
            _ => self.next_track(),
        }
    }
}

fn scan_folder(folder: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot read {}: {}", folder.display(), e);
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(AudioFormat::is_supported)
        })
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(names: &[&str], repeat: RepeatMode) -> PlayQueue {
        PlayQueue::new(
            names.iter().map(|n| Track::new(PathBuf::from(n))).collect(),
            repeat,
        )
    }

    fn title(track: Option<&Track>) -> Option<&str> {
        track.map(|t| t.title.as_str())
    }

    #[test]
    fn empty_queue_has_no_current() {
        let mut q = PlayQueue::default();
        assert!(q.current().is_none());
        assert!(q.next_track().is_none());
        assert!(q.prev_track().is_none());
    }

    #[test]
    fn stops_at_ends_without_repeat() {
        let mut q = queue(&["a.mp3", "b.mp3"], RepeatMode::Off);
        assert!(q.prev_track().is_none());
        assert_eq!(title(q.next_track()), Some("b"));
        assert!(q.next_track().is_none());
        assert_eq!(q.current_index(), Some(1));
    }

    #[test]
    fn wraps_with_repeat_all() {
        let mut q = queue(&["a.mp3", "b.mp3"], RepeatMode::All);
        assert_eq!(title(q.prev_track()), Some("b"));
        assert_eq!(title(q.next_track()), Some("a"));
    }

    #[test]
    fn repeat_one_replays_on_track_end() {
        let mut q = queue(&["a.mp3", "b.mp3"], RepeatMode::One);
        assert_eq!(title(q.on_track_end()), Some("a"));
        assert_eq!(title(q.next_track()), Some("b"));
        assert!(q.next_track().is_none());
    }

    #[test]
    fn cycles_repeat_modes() {
        let mut q = PlayQueue::default();
        assert_eq!(q.cycle_repeat(), RepeatMode::One);
        assert_eq!(q.cycle_repeat(), RepeatMode::All);
        assert_eq!(q.cycle_repeat(), RepeatMode::Off);
    }

    fn shuffled(names: &[&str], repeat: RepeatMode) -> PlayQueue {
        let mut q = queue(names, repeat);
        q.set_shuffle(true);
        q
    }

    const FIVE: [&str; 5] = ["a.mp3", "b.mp3", "c.mp3", "d.mp3", "e.mp3"];

    #[test]
    fn shuffle_visits_every_track_once_then_stops() {
        let mut q = shuffled(&FIVE, RepeatMode::Off);
        assert_eq!(title(q.current()), Some("a"));

        let mut seen = vec![q.current_index().unwrap()];
        while q.next_track().is_some() {
            seen.push(q.current_index().unwrap());
        }
        seen.sort();
        assert_eq!(seen, [0, 1, 2, 3, 4]);

        // Stays on the last shuffled track
        let last = q.current_index();
        assert!(q.next_track().is_none());
        assert_eq!(q.current_index(), last);
    }

    #[test]
    fn shuffle_wraps_with_repeat_all() {
        let mut q = shuffled(&FIVE, RepeatMode::All);
        let first = q.current_index();
        for _ in 0..4 {
            assert!(q.next_track().is_some());
        }
        assert_eq!(title(q.next_track()), Some("a"));
        assert_eq!(q.current_index(), first);
    }

    #[test]
    fn shuffle_prev_retraces_history() {
        let mut q = shuffled(&FIVE, RepeatMode::All);
        assert!(q.prev_track().is_none());

        let mut history = vec![q.current_index()];
        for _ in 0..3 {
            q.next_track();
            history.push(q.current_index());
        }
        history.pop();
        while let Some(expected) = history.pop() {
            assert!(q.prev_track().is_some());
            assert_eq!(q.current_index(), expected);
        }
        assert!(q.prev_track().is_none());
    }

    #[test]
    fn shuffle_respects_repeat_one_on_track_end() {
        let mut q = shuffled(&FIVE, RepeatMode::One);
        let current = q.current_index();
        assert!(q.on_track_end().is_some());
        assert_eq!(q.current_index(), current);
    }

    #[test]
    fn shuffle_off_resumes_queue_order() {
        let mut q = shuffled(&FIVE, RepeatMode::Off);
        q.next_track();
        let index = q.current_index().unwrap();
        assert!(!q.toggle_shuffle());
        match q.next_track() {
            Some(_) => assert_eq!(q.current_index(), Some(index + 1)),
            None => assert_eq!(index, 4),
        }
    }

    #[test]
    fn expands_folders_to_supported_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.flac", "a.wav", "cover.jpg", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let single = dir.path().join("notes.txt");

        let q = PlayQueue::from_paths(&[dir.path().to_path_buf(), single], RepeatMode::Off);

        let titles: Vec<&str> = q.tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["a", "b", "notes"]);
    }
}
