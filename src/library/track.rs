use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Flac,
    Wav,
    Alac,
    Aiff,
    Mp3,
    Ogg,
    Unknown,
}

impl AudioFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "flac" => Self::Flac,
            "wav" => Self::Wav,
            "m4a" | "alac" => Self::Alac,
            "aiff" | "aif" => Self::Aiff,
            "mp3" => Self::Mp3,
            "ogg" | "oga" => Self::Ogg,
            _ => Self::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Flac => "FLAC",
            Self::Wav => "WAV",
            Self::Alac => "ALAC",
            Self::Aiff => "AIFF",
            Self::Mp3 => "MP3",
            Self::Ogg => "OGG",
            Self::Unknown => "?",
        }
    }

    pub fn is_supported(ext: &str) -> bool {
        !matches!(Self::from_extension(ext), Self::Unknown)
    }
}

/// A queued file
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub format: AudioFormat,
}

impl Track {
    pub fn new(path: PathBuf) -> Self {
        let title = path
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or("Unknown")
            .to_string();
        let format = AudioFormat::from_path(&path);

        Self {
            path,
            title,
            format,
        }
    }
}

/// `m:ss` clock text
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
