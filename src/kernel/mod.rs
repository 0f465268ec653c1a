//! FIR filter kernels
//!
//! A kernel owns a set of coefficients and computes one output sample from a
//! history window. All backends share the [`FilterKernel`] trait and differ
//! only in how the inner product is evaluated.

mod bfp;
mod fixed;
mod float;
mod vpu;

use std::time::Instant;

use serde::Deserialize;

pub use self::bfp::BfpKernel;
pub use self::fixed::FixedKernel;
pub use self::float::{FloatKernel, FloatSample};
pub use self::vpu::{DotPrepare, VpuKernel, dot_prepare, vpu_dot};

use crate::bfp::{BfpSlice, BfpVector, FloatS64, OverflowPolicy, float_s64_to_fixed};
use crate::coefficients::FilterCoefficients;
use crate::history::SampleHistory;
use crate::timing::TimingSink;

/// Inner-product implementation used by a filter stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum KernelBackend {
    /// Single-precision float accumulation
    Float32,
    /// Double-precision float accumulation
    Float64,
    /// 64-bit integer accumulator, product shift fixed by the taps, one
    /// final conversion
    Fixed,
    /// Headroom-driven per-product shift
    #[default]
    Bfp,
    /// Model of a 32x32->64 multiply-accumulate unit
    Vpu,
}

pub trait FilterKernel: Send {
    fn backend(&self) -> KernelBackend;

    fn tap_count(&self) -> usize;

    /// Inner product of `window` and the coefficients
    ///
    /// `window` must hold exactly [`tap_count`](Self::tap_count) samples.
    fn dot(&self, window: BfpSlice<'_>) -> FloatS64;

    /// Express an inner product at `output_exp`, saturating on overflow
    fn to_output(&self, acc: FloatS64, output_exp: i32) -> i32 {
        float_s64_to_fixed(acc, output_exp, OverflowPolicy::Saturate)
    }

    /// One output sample at `output_exp`
    fn filter_sample(&self, window: BfpSlice<'_>, output_exp: i32) -> i32 {
        self.to_output(self.dot(window), output_exp)
    }
}

/// Create a kernel for `backend` holding a copy of `coefficients`
///
/// # Arguments
/// * `backend` - Inner-product implementation
/// * `coefficients` - Filter taps, in forward order
///
/// # Returns
/// Boxed kernel, ready to be moved into a stage thread
pub fn create_kernel(
    backend: KernelBackend,
    coefficients: &FilterCoefficients,
) -> Box<dyn FilterKernel> {
    match backend {
        KernelBackend::Float32 => Box::new(FloatKernel::<f32>::new(coefficients)),
        KernelBackend::Float64 => Box::new(FloatKernel::<f64>::new(coefficients)),
        KernelBackend::Fixed => Box::new(FixedKernel::new(coefficients)),
        KernelBackend::Bfp => Box::new(BfpKernel::new(coefficients)),
        KernelBackend::Vpu => Box::new(VpuKernel::new(coefficients)),
    }
}

/// Filter one frame, writing each output sample straight at `output_exp`
///
/// Output `s` is computed from history window `s`, so `out` is in forward
/// time order. Only the first `out.len()` samples are computed.
///
/// # Returns
/// Number of samples that saturated
pub fn filter_frame(
    kernel: &dyn FilterKernel,
    history: &SampleHistory,
    out: &mut [i32],
    output_exp: i32,
    timing: &mut dyn TimingSink,
) -> usize {
    debug_assert!(out.len() <= history.frame_size());
    let timed = timing.enabled();
    let mut saturated = 0;

    for (s, y) in out.iter_mut().enumerate() {
        let start = timed.then(Instant::now);
        *y = kernel.filter_sample(history.window(s), output_exp);
        if let Some(start) = start {
            timing.record_sample(start.elapsed());
        }
        if *y == i32::MAX || *y == i32::MIN {
            saturated += 1;
        }
    }
    saturated
}

/// Filter one frame into a block floating-point vector
///
/// The frame exponent is the smallest one at which every inner product of
/// the frame still fits a 32-bit mantissa, capped at `output_exp`. A sample
/// too large for `output_exp` saturates on its own instead of pushing the
/// whole frame to a coarser exponent. An all-zero frame uses `output_exp`.
/// Only the first `count` samples of `out` are computed; the rest are
/// zeroed.
///
/// # Returns
/// The exponent chosen for the frame
pub fn filter_frame_bfp(
    kernel: &dyn FilterKernel,
    history: &SampleHistory,
    out: &mut BfpVector,
    count: usize,
    output_exp: i32,
    timing: &mut dyn TimingSink,
) -> i32 {
    debug_assert!(count <= out.len());
    let timed = timing.enabled();

    let mut acc = Vec::with_capacity(count);
    for s in 0..count {
        let start = timed.then(Instant::now);
        acc.push(kernel.dot(history.window(s)));
        if let Some(start) = start {
            timing.record_sample(start.elapsed());
        }
    }

    let frame_exp = acc
        .iter()
        .filter(|v| v.mant != 0)
        .map(|v| v.min_s32_exponent())
        .max()
        .map_or(output_exp, |exp| exp.min(output_exp));

    out.fill_with(frame_exp, |i| {
        acc.get(i)
            .map_or(0, |&v| kernel.to_output(v, frame_exp))
    });
    frame_exp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_COEF_EXP, WIRE_EXP};
    use crate::timing::NoTiming;

    const ALL_BACKENDS: [KernelBackend; 5] = [
        KernelBackend::Float32,
        KernelBackend::Float64,
        KernelBackend::Fixed,
        KernelBackend::Bfp,
        KernelBackend::Vpu,
    ];

    fn impulse_history(tap_count: usize, frame_size: usize) -> SampleHistory {
        let mut history = SampleHistory::new(tap_count, frame_size, WIRE_EXP).unwrap();
        let mut frame = vec![0; frame_size];
        frame[0] = i32::MAX;
        history.receive_frame(&frame, WIRE_EXP).unwrap();
        history
    }

    #[test]
    fn test_factory_reports_backend() {
        let coefs = FilterCoefficients::boxcar(8, DEFAULT_COEF_EXP).unwrap();
        for backend in ALL_BACKENDS {
            let kernel = create_kernel(backend, &coefs);
            assert_eq!(kernel.backend(), backend);
            assert_eq!(kernel.tap_count(), 8);
        }
    }

    #[test]
    fn test_boxcar_impulse_per_backend() {
        let coefs = FilterCoefficients::boxcar(1024, DEFAULT_COEF_EXP).unwrap();
        let history = impulse_history(1024, 256);

        for backend in ALL_BACKENDS {
            let kernel = create_kernel(backend, &coefs);
            let mut out = vec![0; 256];
            let saturated = filter_frame(kernel.as_ref(), &history, &mut out, WIRE_EXP, &mut NoTiming);
            assert_eq!(saturated, 0);

            let expected = match backend {
                KernelBackend::Float32 | KernelBackend::Float64 => 2_097_152,
                _ => 2_097_151,
            };
            assert!(
                out.iter().all(|&y| y == expected),
                "{backend:?} produced {:?}",
                &out[..4]
            );
        }
    }

    #[test]
    fn test_full_scale_saturates() {
        let coefs = FilterCoefficients::from_fixed(vec![1 << 30; 16], -30).unwrap();
        let mut history = SampleHistory::new(16, 4, WIRE_EXP).unwrap();
        for _ in 0..5 {
            history.receive_frame(&[i32::MAX; 4], WIRE_EXP).unwrap();
            history.advance();
        }
        history.receive_frame(&[i32::MAX; 4], WIRE_EXP).unwrap();

        for backend in ALL_BACKENDS {
            let kernel = create_kernel(backend, &coefs);
            let mut out = vec![0; 4];
            let saturated = filter_frame(kernel.as_ref(), &history, &mut out, WIRE_EXP, &mut NoTiming);
            assert_eq!(out, vec![i32::MAX; 4], "{backend:?}");
            assert_eq!(saturated, 4);
        }
    }

    #[test]
    fn test_bfp_frame_exponent_then_wire() {
        let coefs = FilterCoefficients::boxcar(1024, DEFAULT_COEF_EXP).unwrap();
        let history = impulse_history(1024, 256);

        for backend in ALL_BACKENDS {
            let kernel = create_kernel(backend, &coefs);
            let mut out = BfpVector::zeros(256, WIRE_EXP).unwrap();
            let exp = filter_frame_bfp(kernel.as_ref(), &history, &mut out, 256, WIRE_EXP, &mut NoTiming);
            // 2^-10 is exact in float32, so its frame keeps one more bit
            let expected_exp = match backend {
                KernelBackend::Float32 => -40,
                _ => -41,
            };
            assert_eq!(exp, expected_exp, "{backend:?}");
            assert_eq!(out.exp(), expected_exp);
            assert_eq!(out.headroom(), 0);

            out.rescale(WIRE_EXP, OverflowPolicy::Saturate);
            let expected = match backend {
                KernelBackend::Float32 => 2_097_152,
                _ => 2_097_151,
            };
            assert!(out.data().iter().all(|&y| y == expected), "{backend:?}");
        }
    }

    #[test]
    fn test_bfp_frame_of_silence_uses_output_exponent() {
        let coefs = FilterCoefficients::boxcar(16, DEFAULT_COEF_EXP).unwrap();
        let history = SampleHistory::new(16, 4, WIRE_EXP).unwrap();
        let kernel = create_kernel(KernelBackend::Bfp, &coefs);
        let mut out = BfpVector::zeros(4, -20).unwrap();
        let exp = filter_frame_bfp(kernel.as_ref(), &history, &mut out, 4, WIRE_EXP, &mut NoTiming);
        assert_eq!(exp, WIRE_EXP);
        assert!(out.is_zero());
    }

    #[test]
    fn test_partial_count_zeroes_remainder() {
        let coefs = FilterCoefficients::boxcar(16, DEFAULT_COEF_EXP).unwrap();
        let mut history = SampleHistory::new(16, 4, WIRE_EXP).unwrap();
        history.receive_frame(&[1 << 20; 4], WIRE_EXP).unwrap();
        let kernel = create_kernel(KernelBackend::Fixed, &coefs);
        let mut out = BfpVector::zeros(4, WIRE_EXP).unwrap();
        filter_frame_bfp(kernel.as_ref(), &history, &mut out, 2, WIRE_EXP, &mut NoTiming);
        assert_ne!(out.data()[0], 0);
        assert_ne!(out.data()[1], 0);
        assert_eq!(&out.data()[2..], &[0, 0]);
    }

    #[test]
    fn test_bfp_frame_exponent_capped_by_saturating_sample() {
        let coefs = FilterCoefficients::from_fixed(vec![1 << 30; 2], -30).unwrap();
        let mut history = SampleHistory::new(2, 2, WIRE_EXP).unwrap();
        history.receive_frame(&[3, i32::MAX], WIRE_EXP).unwrap();

        for backend in ALL_BACKENDS {
            let kernel = create_kernel(backend, &coefs);
            let mut out = BfpVector::zeros(2, WIRE_EXP).unwrap();
            let exp = filter_frame_bfp(kernel.as_ref(), &history, &mut out, 2, WIRE_EXP, &mut NoTiming);
            assert_eq!(exp, WIRE_EXP, "{backend:?}");
            // The quiet sample keeps its low bit
            assert_eq!(out.data(), &[3, i32::MAX], "{backend:?}");
        }
    }
}
