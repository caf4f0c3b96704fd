use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("unsupported format: {0} bits per sample (only 16-bit PCM is supported)")]
    UnsupportedBitsPerSample(u16),
    #[error("unsupported format: stream has no channels")]
    NoChannels,
    #[error("unsupported format: sample rate is zero")]
    ZeroSampleRate,
    #[error("unsupported block alignment {block_align} for {bytes_per_frame}-byte frames")]
    InvalidBlockAlign { block_align: u16, bytes_per_frame: u16 },
}

/// Snapshot of the active stream's layout, read once when a track is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    /// Bytes per aligned frame (all channels)
    pub block_align: u16,
}

impl StreamFormat {
    /// Interleaved signed 16-bit little-endian PCM
    pub fn pcm16(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_sample: 16,
            block_align: channels * 2,
        }
    }

    pub fn bytes_per_frame(&self) -> u16 {
        self.channels * (self.bits_per_sample / 8)
    }

    pub fn average_bytes_per_second(&self) -> u64 {
        self.sample_rate as u64 * self.block_align as u64
    }

    /// Round a byte offset down to the start of its frame
    pub fn align_down(&self, byte_offset: u64) -> u64 {
        if self.block_align == 0 {
            return byte_offset;
        }
        byte_offset - (byte_offset % self.block_align as u64)
    }

    pub fn duration_at(&self, byte_offset: u64) -> Duration {
        let rate = self.average_bytes_per_second();
        if rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(byte_offset as f64 / rate as f64)
    }

    pub fn byte_offset_at(&self, position: Duration) -> u64 {
        let raw = (position.as_secs_f64() * self.average_bytes_per_second() as f64) as u64;
        self.align_down(raw)
    }

    pub fn validate(&self) -> Result<(), FormatError> {
        if self.bits_per_sample != 16 {
            return Err(FormatError::UnsupportedBitsPerSample(self.bits_per_sample));
        }
        if self.channels == 0 {
            return Err(FormatError::NoChannels);
        }
        if self.sample_rate == 0 {
            return Err(FormatError::ZeroSampleRate);
        }
        // Frames must be packed: readers step through the stream in bytes_per_frame
        if self.block_align != self.bytes_per_frame() {
            return Err(FormatError::InvalidBlockAlign {
                block_align: self.block_align,
                bytes_per_frame: self.bytes_per_frame(),
            });
        }
        Ok(())
    }
}
