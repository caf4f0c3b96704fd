use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FftError {
    #[error("FFT length {0} is not a non-zero power of two")]
    NotPowerOfTwo(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    #[allow(dead_code)]
    Inverse,
}

/// Magnitude of one frequency bin
pub fn magnitude(bin: Complex<f32>) -> f32 {
    (bin.re * bin.re + bin.im * bin.im).sqrt()
}

/// In-place iterative radix-2 decimation-in-time FFT.
///
/// Twiddle factors are advanced with the trigonometric recurrence
/// `w <- w + w * (cos(theta) - 1 + i sin(theta))` instead of calling sin/cos per
/// butterfly. The recurrence is carried in `f64` so the drift stays well below
/// `f32` resolution at the sizes used for display.
///
/// Forward output is unscaled; the inverse divides by `N`.
#[derive(Debug, Clone)]
pub struct FftEngine {
    len: usize,
    log2_len: u32,
}

impl FftEngine {
    pub fn new(len: usize) -> Result<Self, FftError> {
        if len == 0 || !len.is_power_of_two() {
            return Err(FftError::NotPowerOfTwo(len));
        }
        Ok(Self {
            len,
            log2_len: len.trailing_zeros(),
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn transform(&self, data: &mut [Complex<f32>], direction: Direction) {
        assert_eq!(
            data.len(),
            self.len,
            "buffer length does not match FFT engine length"
        );

        let n = self.len;

        for i in 0..n {
            let j = reverse_bits(i, self.log2_len);
            if j > i {
                data.swap(i, j);
            }
        }

        let sign = match direction {
            Direction::Forward => -1.0,
            Direction::Inverse => 1.0,
        };

        let mut half = 1;
        while half < n {
            let block = half * 2;
            let theta = sign * 2.0 * PI / block as f64;
            let wtemp = (0.5 * theta).sin();
            let wpr = -2.0 * wtemp * wtemp;
            let wpi = theta.sin();

            let mut wr = 1.0f64;
            let mut wi = 0.0f64;

            for k in 0..half {
                let w = Complex::new(wr as f32, wi as f32);
                for start in (k..n).step_by(block) {
                    let t = w * data[start + half];
                    data[start + half] = data[start] - t;
                    data[start] += t;
                }

                let prev = wr;
                wr += prev * wpr - wi * wpi;
                wi += wi * wpr + prev * wpi;
            }

            half = block;
        }

        if direction == Direction::Inverse {
            let scale = 1.0 / n as f32;
            for c in data.iter_mut() {
                *c *= scale;
            }
        }
    }
}

fn reverse_bits(index: usize, bits: u32) -> usize {
    if bits == 0 {
        return 0;
    }
    index.reverse_bits() >> (usize::BITS - bits)
}

/// Which implementation runs the transform stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FftBackend {
    #[default]
    Radix2,
    #[value(name = "rustfft")]
    RustFft,
}

impl fmt::Display for FftBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FftBackend::Radix2 => write!(f, "radix2"),
            FftBackend::RustFft => write!(f, "rustfft"),
        }
    }
}

/// Transform stage with either backend behind the same bin order and scaling
pub enum Transform {
    Radix2(FftEngine),
    Planned {
        forward: Arc<dyn Fft<f32>>,
        inverse: Arc<dyn Fft<f32>>,
        len: usize,
    },
}

impl Transform {
    pub fn new(backend: FftBackend, len: usize) -> Result<Self, FftError> {
        // Validate the length the same way for both backends
        let engine = FftEngine::new(len)?;
        Ok(match backend {
            FftBackend::Radix2 => Transform::Radix2(engine),
            FftBackend::RustFft => {
                let mut planner = FftPlanner::<f32>::new();
                Transform::Planned {
                    forward: planner.plan_fft_forward(len),
                    inverse: planner.plan_fft_inverse(len),
                    len,
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        match self {
            Transform::Radix2(engine) => engine.len(),
            Transform::Planned { len, .. } => *len,
        }
    }

    pub fn process(&self, data: &mut [Complex<f32>], direction: Direction) {
        match self {
            Transform::Radix2(engine) => engine.transform(data, direction),
            Transform::Planned {
                forward, inverse, len,
            } => match direction {
                Direction::Forward => forward.process(data),
                Direction::Inverse => {
                    inverse.process(data);
                    let scale = 1.0 / *len as f32;
                    for c in data.iter_mut() {
                        *c *= scale;
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI as PI32;

    const N: usize = 1024;

    fn sine(freq: f32, sample_rate: f32, amplitude: f32) -> Vec<Complex<f32>> {
        (0..N)
            .map(|i| {
                let t = i as f32 / sample_rate;
                Complex::new(amplitude * (2.0 * PI32 * freq * t).sin(), 0.0)
            })
            .collect()
    }

    fn peak_bin(spectrum: &[Complex<f32>]) -> usize {
        spectrum[..spectrum.len() / 2]
            .iter()
            .enumerate()
            .max_by(|a, b| magnitude(*a.1).total_cmp(&magnitude(*b.1)))
            .map(|(i, _)| i)
            .unwrap()
    }

    #[test]
    fn rejects_non_power_of_two() {
        assert_eq!(FftEngine::new(0).unwrap_err(), FftError::NotPowerOfTwo(0));
        assert_eq!(
            FftEngine::new(1000).unwrap_err(),
            FftError::NotPowerOfTwo(1000)
        );
        assert!(Transform::new(FftBackend::RustFft, 48).is_err());
        assert_eq!(FftEngine::new(1024).unwrap().log2_len, 10);
    }

    #[test]
    fn bit_reversal_over_exact_width() {
        assert_eq!(reverse_bits(1, 10), 512);
        assert_eq!(reverse_bits(0b0000000011, 10), 0b1100000000);
        assert_eq!(reverse_bits(5, 3), 5);
        assert_eq!(reverse_bits(0, 0), 0);
    }

    #[test]
    fn zero_input_stays_zero() {
        let engine = FftEngine::new(N).unwrap();
        let mut data = vec![Complex::new(0.0, 0.0); N];
        engine.transform(&mut data, Direction::Forward);
        assert!(data.iter().all(|c| c.re == 0.0 && c.im == 0.0));
    }

    #[test]
    fn unit_impulse_has_flat_spectrum() {
        let engine = FftEngine::new(N).unwrap();
        let mut data = vec![Complex::new(0.0, 0.0); N];
        data[0] = Complex::new(1.0, 0.0);
        engine.transform(&mut data, Direction::Forward);
        for bin in &data {
            assert!((magnitude(*bin) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn forward_then_inverse_round_trips() {
        let engine = FftEngine::new(N).unwrap();
        let original = sine(440.0, 44100.0, 0.8);
        let mut data = original.clone();

        engine.transform(&mut data, Direction::Forward);
        engine.transform(&mut data, Direction::Inverse);

        for (a, b) in original.iter().zip(&data) {
            assert!((a.re - b.re).abs() <= 1e-4 * a.re.abs().max(1.0));
            assert!(b.im.abs() <= 1e-4);
        }
    }

    #[test]
    fn sine_peaks_at_expected_bin() {
        let engine = FftEngine::new(N).unwrap();
        let (freq, rate) = (1000.0, 44100.0);
        let mut data = sine(freq, rate, 1.0);
        engine.transform(&mut data, Direction::Forward);

        let expected = (freq * N as f32 / rate).round() as i64;
        let peak = peak_bin(&data) as i64;
        assert!((peak - expected).abs() <= 1, "peak {peak}, expected {expected}");
    }

    #[test]
    fn exact_bin_sine_concentrates_energy() {
        let engine = FftEngine::new(N).unwrap();
        // 16 full cycles over the window
        let mut data = sine(16.0, N as f32, 1.0);
        engine.transform(&mut data, Direction::Forward);

        assert_eq!(peak_bin(&data), 16);
        assert!((magnitude(data[16]) - N as f32 / 2.0).abs() < 0.05);
        assert!(magnitude(data[40]) < 0.05);
    }

    #[test]
    fn backends_agree() {
        let radix2 = Transform::new(FftBackend::Radix2, N).unwrap();
        let planned = Transform::new(FftBackend::RustFft, N).unwrap();

        let input: Vec<Complex<f32>> = sine(3000.0, 44100.0, 0.5)
            .into_iter()
            .zip(sine(250.0, 44100.0, 0.3))
            .map(|(a, b)| a + b)
            .collect();

        for direction in [Direction::Forward, Direction::Inverse] {
            let mut a = input.clone();
            let mut b = input.clone();
            radix2.process(&mut a, direction);
            planned.process(&mut b, direction);
            for (x, y) in a.iter().zip(&b) {
                assert!((x - y).norm() < 1e-2, "{x} vs {y}");
            }
        }
    }

    #[test]
    #[should_panic(expected = "does not match")]
    fn mismatched_buffer_is_a_contract_violation() {
        let engine = FftEngine::new(8).unwrap();
        let mut data = vec![Complex::new(0.0, 0.0); 16];
        engine.transform(&mut data, Direction::Forward);
    }
}
