use rustfft::num_complex::Complex;

use super::fft::magnitude;

/// One display bar, in canvas units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

/// Left-to-right bars for a single frame
pub type BarGeometry = Vec<Bar>;

/// Maps an FFT spectrum onto a fixed number of bars.
///
/// Bar `i` reads bin `floor(i^2 / bar_count)`. The quadratic warp is a coarse
/// stand-in for a logarithmic axis: low bars resolve single bins, high bars skip
/// over many.
#[derive(Debug, Clone)]
pub struct BarMapper {
    bar_count: usize,
    gain: f32,
    bar_gap: f32,
}

impl BarMapper {
    pub fn new(bar_count: usize, gain: f32, bar_gap: f32) -> Self {
        Self {
            bar_count,
            gain,
            bar_gap,
        }
    }

    /// Spectrum bin shown by `bar`, kept inside the positive half of an `fft_len` spectrum
    pub fn fft_index(&self, bar: usize, fft_len: usize) -> usize {
        let last = (fft_len / 2).saturating_sub(1);
        (bar * bar / self.bar_count).min(last)
    }

    /// Empty when the canvas has no area
    pub fn map(&self, spectrum: &[Complex<f32>], width: f32, height: f32) -> BarGeometry {
        if width <= 0.0 || height <= 0.0 || spectrum.is_empty() || self.bar_count == 0 {
            return Vec::new();
        }

        let slot = width / self.bar_count as f32;
        let bar_width = (slot - self.bar_gap).max(0.0);

        (0..self.bar_count)
            .map(|i| {
                let amplitude = magnitude(spectrum[self.fft_index(i, spectrum.len())]);
                Bar {
                    left: i as f32 * slot,
                    width: bar_width,
                    height: (amplitude * height * self.gain).min(height),
                }
            })
            .collect()
    }
}

impl Default for BarMapper {
    fn default() -> Self {
        Self::new(64, 2.0, 1.0)
    }
}
