use std::io;

use rustfft::num_complex::Complex;
use thiserror::Error;

use super::format::{FormatError, StreamFormat};
use super::stream::PcmStream;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("no stream format loaded")]
    NoFormat,
    #[error("stream read failed: {0}")]
    Io(#[from] io::Error),
}

/// Signed 16-bit little-endian pair normalized to [-1.0, 1.0)
pub fn decode_sample(lo: u8, hi: u8) -> f32 {
    i16::from_le_bytes([lo, hi]) as f32 / 32768.0
}

/// Captures one analysis window from a live stream without moving its cursor
pub struct SpectrumSampler {
    buffer: Vec<Complex<f32>>,
    scratch: Vec<u8>,
    format: Option<StreamFormat>,
}

impl SpectrumSampler {
    pub fn new(fft_size: usize) -> Self {
        Self {
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch: Vec::new(),
            format: None,
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn format(&self) -> Option<StreamFormat> {
        self.format
    }

    pub fn set_format(&mut self, format: StreamFormat) -> Result<(), FormatError> {
        format.validate()?;
        self.scratch
            .resize(self.buffer.len() * format.bytes_per_frame() as usize, 0);
        self.format = Some(format);
        Ok(())
    }

    /// Last captured window, transformed in place by the caller
    pub fn window_mut(&mut self) -> &mut [Complex<f32>] {
        &mut self.buffer
    }

    pub fn clear_format(&mut self) {
        self.format = None;
    }

    /// Fill the analysis buffer from the window starting at the stream's position.
    ///
    /// Only the first channel is analyzed. Frames past the end of the stream are
    /// zero. The stream position is restored before returning, on error too.
    pub fn capture<S>(&mut self, stream: &mut S) -> Result<&mut [Complex<f32>], SampleError>
    where
        S: PcmStream + ?Sized,
    {
        let format = self.format.ok_or(SampleError::NoFormat)?;
        let position = stream.position();

        let read = Self::read_window(stream, &mut self.scratch, format.align_down(position));
        let restored = stream.seek(position);
        let bytes_read = read?;
        restored?;

        let frame_len = format.bytes_per_frame() as usize;
        let frames = (bytes_read / frame_len).min(self.buffer.len());

        for (slot, frame) in self.buffer.iter_mut().zip(self.scratch.chunks_exact(frame_len)).take(frames) {
            *slot = Complex::new(decode_sample(frame[0], frame[1]), 0.0);
        }
        self.buffer[frames..].fill(Complex::new(0.0, 0.0));

        Ok(&mut self.buffer)
    }

    fn read_window<S>(stream: &mut S, scratch: &mut [u8], start: u64) -> io::Result<usize>
    where
        S: PcmStream + ?Sized,
    {
        stream.seek(start)?;
        let mut filled = 0;
        while filled < scratch.len() {
            match stream.read(&mut scratch[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::PcmBuffer;

    /// Stream that hands out at most a few bytes per read and can fail on demand
    struct Trickle {
        inner: PcmBuffer,
        chunk: usize,
        fail: bool,
    }

    impl PcmStream for Trickle {
        fn format(&self) -> StreamFormat {
            self.inner.format()
        }
        fn position(&self) -> u64 {
            self.inner.position()
        }
        fn seek(&mut self, byte_offset: u64) -> io::Result<()> {
            self.inner.seek(byte_offset)
        }
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::Other, "device hiccup"));
            }
            let n = buf.len().min(self.chunk);
            self.inner.read(&mut buf[..n])
        }
        fn byte_len(&self) -> u64 {
            self.inner.byte_len()
        }
    }

    fn sampler_for(stream: &impl PcmStream, fft_size: usize) -> SpectrumSampler {
        let mut sampler = SpectrumSampler::new(fft_size);
        sampler.set_format(stream.format()).unwrap();
        sampler
    }

    #[test]
    fn decodes_signed_pairs() {
        assert_eq!(decode_sample(0x00, 0x00), 0.0);
        assert_eq!(decode_sample(0x00, 0x80), -1.0);
        assert_eq!(decode_sample(0xff, 0x7f), 32767.0 / 32768.0);
        assert_eq!(decode_sample(0xff, 0xff), -1.0 / 32768.0);
        for (lo, hi) in [(0x12u8, 0x34u8), (0xab, 0xcd), (0x00, 0x40)] {
            let expected = ((lo as u16) | ((hi as u16) << 8)) as i16 as f32 / 32768.0;
            let sample = decode_sample(lo, hi);
            assert_eq!(sample, expected);
            assert!((-1.0..1.0).contains(&sample));
        }
    }

    #[test]
    fn restores_stream_position() {
        let mut stream = PcmBuffer::from_samples(&[100; 64], 8000, 2);
        let mut sampler = sampler_for(&stream, 8);
        stream.seek(22).unwrap();

        sampler.capture(&mut stream).unwrap();

        assert_eq!(stream.position(), 22);
    }

    #[test]
    fn reads_left_channel_from_aligned_frame() {
        let samples: Vec<i16> = (0..32).flat_map(|i| [i * 100, -1]).collect();
        let mut stream = PcmBuffer::from_samples(&samples, 8000, 2);
        let mut sampler = sampler_for(&stream, 4);
        // Mid-frame position: frame 3 starts at byte 12
        stream.seek(14).unwrap();

        let window = sampler.capture(&mut stream).unwrap();

        let expected: Vec<f32> = (3..7).map(|i| (i * 100) as f32 / 32768.0).collect();
        let got: Vec<f32> = window.iter().map(|c| c.re).collect();
        assert_eq!(got, expected);
        assert!(window.iter().all(|c| c.im == 0.0));
    }

    #[test]
    fn zero_fills_past_end_of_stream() {
        let mut stream = PcmBuffer::from_samples(&[i16::MAX; 10], 8000, 1);
        let mut sampler = sampler_for(&stream, 8);
        stream.seek(12).unwrap();

        let window = sampler.capture(&mut stream).unwrap();

        assert!(window[..4].iter().all(|c| c.re > 0.99));
        assert!(window[4..].iter().all(|c| *c == Complex::new(0.0, 0.0)));
    }

    #[test]
    fn stale_data_does_not_survive_short_reads() {
        let mut stream = PcmBuffer::from_samples(&[i16::MAX; 16], 8000, 1);
        let mut sampler = sampler_for(&stream, 8);
        sampler.capture(&mut stream).unwrap();

        stream.seek(28).unwrap();
        let window = sampler.capture(&mut stream).unwrap();

        assert!(window[..2].iter().all(|c| c.re > 0.99));
        assert!(window[2..].iter().all(|c| *c == Complex::new(0.0, 0.0)));
    }

    #[test]
    fn collects_across_partial_reads() {
        let samples: Vec<i16> = (0..16).collect();
        let mut stream = Trickle {
            inner: PcmBuffer::from_samples(&samples, 8000, 1),
            chunk: 3,
            fail: false,
        };
        let mut sampler = sampler_for(&stream, 8);

        let window = sampler.capture(&mut stream).unwrap();

        assert_eq!(window[7].re, 7.0 / 32768.0);
        assert_eq!(stream.position(), 0);
    }

    #[test]
    fn failed_read_still_restores_position() {
        let mut stream = Trickle {
            inner: PcmBuffer::from_samples(&[1; 16], 8000, 1),
            chunk: 4,
            fail: true,
        };
        let mut sampler = sampler_for(&stream, 8);
        stream.seek(6).unwrap();

        let err = sampler.capture(&mut stream).unwrap_err();

        assert!(matches!(err, SampleError::Io(_)));
        assert_eq!(stream.position(), 6);
    }

    #[test]
    fn refuses_without_format() {
        let mut stream = PcmBuffer::from_samples(&[0; 8], 8000, 1);
        let mut sampler = SpectrumSampler::new(8);
        assert!(matches!(
            sampler.capture(&mut stream).unwrap_err(),
            SampleError::NoFormat
        ));
    }

    #[test]
    fn refuses_padded_frames_instead_of_reading_padding() {
        // Mono 16-bit with two bytes of padding per frame
        let bytes: Vec<u8> = (0..8i16)
            .flat_map(|i| {
                let [lo, hi] = (i * 1000).to_le_bytes();
                [lo, hi, 0x7f, 0x7f]
            })
            .collect();
        let format = StreamFormat {
            block_align: 4,
            ..StreamFormat::pcm16(8000, 1)
        };
        let mut stream = PcmBuffer::new(bytes, format);
        let mut sampler = SpectrumSampler::new(4);

        assert!(matches!(
            sampler.set_format(format),
            Err(FormatError::InvalidBlockAlign { .. })
        ));
        assert!(matches!(
            sampler.capture(&mut stream).unwrap_err(),
            SampleError::NoFormat
        ));
        assert_eq!(stream.position(), 0);
    }

    #[test]
    fn rejects_unsupported_format() {
        let mut sampler = SpectrumSampler::new(8);
        let format = StreamFormat {
            bits_per_sample: 8,
            block_align: 1,
            ..StreamFormat::pcm16(8000, 1)
        };
        assert!(sampler.set_format(format).is_err());
        assert!(sampler.format().is_none());
    }
}
