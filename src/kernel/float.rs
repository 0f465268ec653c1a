use std::iter::Sum;
use std::ops::Mul;

use super::{FilterKernel, KernelBackend};
use crate::bfp::{BfpSlice, FloatS64, ldexp, to_pcm};
use crate::coefficients::FilterCoefficients;

/// Native float type a [`FloatKernel`] accumulates in
pub trait FloatSample: Copy + Send + Sum + Mul<Output = Self> + 'static {
    const BACKEND: KernelBackend;

    fn from_f64(x: f64) -> Self;

    fn from_i32(x: i32) -> Self;

    fn to_f64(self) -> f64;
}

impl FloatSample for f32 {
    const BACKEND: KernelBackend = KernelBackend::Float32;

    fn from_f64(x: f64) -> Self {
        x as f32
    }

    fn from_i32(x: i32) -> Self {
        x as f32
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl FloatSample for f64 {
    const BACKEND: KernelBackend = KernelBackend::Float64;

    fn from_f64(x: f64) -> Self {
        x
    }

    fn from_i32(x: i32) -> Self {
        x as f64
    }

    fn to_f64(self) -> f64 {
        self
    }
}

/// Inner product in native floating point
///
/// Window mantissas are converted to `T`, summed against the real-valued
/// coefficients and scaled by the window exponent once per sample. The
/// result is rounded to the output exponent rather than truncated.
pub struct FloatKernel<T: FloatSample> {
    taps: Vec<T>,
}

impl<T: FloatSample> FloatKernel<T> {
    pub fn new(coefficients: &FilterCoefficients) -> Self {
        let taps = coefficients
            .to_f64()
            .into_iter()
            .map(T::from_f64)
            .collect();
        Self { taps }
    }

    fn dot_native(&self, window: BfpSlice<'_>) -> f64 {
        let sum: T = window
            .data
            .iter()
            .zip(&self.taps)
            .map(|(&x, &c)| T::from_i32(x) * c)
            .sum();
        ldexp(sum.to_f64(), window.exp)
    }
}

impl<T: FloatSample> FilterKernel for FloatKernel<T> {
    fn backend(&self) -> KernelBackend {
        T::BACKEND
    }

    fn tap_count(&self) -> usize {
        self.taps.len()
    }

    fn dot(&self, window: BfpSlice<'_>) -> FloatS64 {
        debug_assert_eq!(window.len(), self.taps.len());
        FloatS64::from_f64(self.dot_native(window))
    }

    fn to_output(&self, acc: FloatS64, output_exp: i32) -> i32 {
        to_pcm(acc.to_f64(), output_exp)
    }
}
