use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::format::StreamFormat;

/// A readable, randomly seekable PCM byte stream with a known layout.
///
/// Positions are byte offsets into the interleaved PCM data.
pub trait PcmStream {
    fn format(&self) -> StreamFormat;

    fn position(&self) -> u64;

    fn seek(&mut self, byte_offset: u64) -> io::Result<()>;

    /// Read up to `buf.len()` bytes from the current position, returning the count read
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    fn byte_len(&self) -> u64;
}

/// Decoded PCM held in memory
#[derive(Debug, Clone)]
pub struct PcmBuffer {
    cursor: Cursor<Vec<u8>>,
    format: StreamFormat,
}

impl PcmBuffer {
    pub fn new(bytes: Vec<u8>, format: StreamFormat) -> Self {
        Self {
            cursor: Cursor::new(bytes),
            format,
        }
    }

    /// Build a 16-bit buffer from interleaved samples
    pub fn from_samples(samples: &[i16], sample_rate: u32, channels: u16) -> Self {
        let bytes = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        Self::new(bytes, StreamFormat::pcm16(sample_rate, channels))
    }
}

impl PcmStream for PcmBuffer {
    fn format(&self) -> StreamFormat {
        self.format
    }

    fn position(&self) -> u64 {
        self.cursor.position()
    }

    fn seek(&mut self, byte_offset: u64) -> io::Result<()> {
        self.cursor.seek(SeekFrom::Start(byte_offset)).map(|_| ())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(&mut self.cursor, buf)
    }

    fn byte_len(&self) -> u64 {
        self.cursor.get_ref().len() as u64
    }
}

/// Stream handle shared between the output source and the spectrum sampler.
///
/// Whoever holds the lock owns the cursor; the sampler's seek-read-restore runs
/// entirely under it so the output never sees the displaced position.
#[derive(Clone)]
pub struct SharedStream {
    inner: Arc<Mutex<PcmBuffer>>,
    format: StreamFormat,
    byte_len: u64,
    seek_generation: Arc<AtomicU64>,
}

impl SharedStream {
    pub fn new(buffer: PcmBuffer) -> Self {
        let format = buffer.format();
        let byte_len = buffer.byte_len();
        Self {
            inner: Arc::new(Mutex::new(buffer)),
            format,
            byte_len,
            seek_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, PcmBuffer> {
        // The buffer holds no invariant a panicking reader could break
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn format(&self) -> StreamFormat {
        self.format
    }

    pub fn byte_len(&self) -> u64 {
        self.byte_len
    }

    pub fn position(&self) -> u64 {
        self.lock().position()
    }

    /// Move the playback cursor (user seek). Buffered output samples are invalidated.
    pub fn seek_to(&self, byte_offset: u64) -> io::Result<()> {
        let target = self.format.align_down(byte_offset.min(self.byte_len));
        let mut guard = self.lock();
        guard.seek(target)?;
        // Bumped while the cursor is still locked, so a reader that sees the new
        // position under the lock also sees the new generation
        self.seek_generation.fetch_add(1, Ordering::SeqCst);
        drop(guard);
        Ok(())
    }

    pub fn seek_generation(&self) -> u64 {
        self.seek_generation.load(Ordering::SeqCst)
    }
}
