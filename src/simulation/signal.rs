use std::f64::consts::PI;

use crate::bfp::to_pcm;
use crate::constants::WIRE_EXP;

/// A single sample of `amplitude` at `position`, zero elsewhere
pub fn impulse(len: usize, position: usize, amplitude: i32) -> Vec<i32> {
    let mut samples = vec![0; len];
    if let Some(s) = samples.get_mut(position) {
        *s = amplitude;
    }
    samples
}

/// Constant `level`
pub fn dc(len: usize, level: i32) -> Vec<i32> {
    vec![level; len]
}

/// Zero up to `position`, then `level`
pub fn step(len: usize, position: usize, level: i32) -> Vec<i32> {
    (0..len)
        .map(|i| if i < position { 0 } else { level })
        .collect()
}

/// Sine of `amplitude` (full scale is 1.0) and `freq_hz`
pub fn sine(len: usize, sample_rate: u32, freq_hz: f64, amplitude: f64) -> Vec<i32> {
    let w = 2.0 * PI * freq_hz / sample_rate as f64;
    (0..len)
        .map(|i| to_pcm(amplitude * (w * i as f64).sin(), WIRE_EXP))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impulse_position() {
        let x = impulse(8, 3, 100);
        assert_eq!(x, vec![0, 0, 0, 100, 0, 0, 0, 0]);
        assert_eq!(impulse(4, 10, 1), vec![0; 4]);
    }

    #[test]
    fn test_step() {
        assert_eq!(step(5, 2, 7), vec![0, 0, 7, 7, 7]);
    }

    #[test]
    fn test_sine_peak_and_clipping() {
        let x = sine(48, 48000, 1000.0, 0.5);
        assert_eq!(x[0], 0);
        assert_eq!(x[12], 1 << 30);
        let full = sine(48, 48000, 1000.0, 1.0);
        assert_eq!(full[12], i32::MAX);
    }
}
