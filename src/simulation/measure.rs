use crate::bfp::from_pcm;
use crate::constants::WIRE_EXP;

/// Level statistics of a PCM signal, full scale being 1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalStats {
    pub mean: f64,
    pub rms: f64,
    pub peak: f64,
}

pub fn signal_stats(samples: &[i32]) -> SignalStats {
    if samples.is_empty() {
        return SignalStats {
            mean: 0.0,
            rms: 0.0,
            peak: 0.0,
        };
    }
    let n = samples.len() as f64;
    let values = samples.iter().map(|&s| from_pcm(s, WIRE_EXP));
    let (sum, sum_sq, peak) = values.fold((0.0, 0.0, 0.0f64), |(sum, sq, peak), x| {
        (sum + x, sq + x * x, peak.max(x.abs()))
    });
    SignalStats {
        mean: sum / n,
        rms: (sum_sq / n).sqrt(),
        peak,
    }
}

/// Largest sample-wise difference in PCM units, over the common length
pub fn max_abs_difference(a: &[i32], b: &[i32]) -> u32 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| (x as i64 - y as i64).unsigned_abs() as u32)
        .max()
        .unwrap_or(0)
}
