use super::{FilterKernel, KernelBackend};
use crate::bfp::{BfpSlice, FloatS64, product_shift};
use crate::coefficients::FilterCoefficients;

/// 64-bit multiply-accumulate with saturating adds and a product shift
/// fixed at construction
///
/// Every product is shifted right by the growth bits the taps' own headroom
/// cannot absorb, assuming a full-scale window (the history is always
/// normalized). Growth is therefore bounded by the taps alone, whatever the
/// window holds. The single conversion to the output exponent does the rest
/// of the scaling.
pub struct FixedKernel {
    taps: Vec<i32>,
    exp: i32,
    p_shr: u32,
}

impl FixedKernel {
    pub fn new(coefficients: &FilterCoefficients) -> Self {
        let p_shr = product_shift(0, coefficients.headroom(), coefficients.len());
        Self {
            taps: coefficients.data().to_vec(),
            exp: coefficients.exp(),
            p_shr,
        }
    }

    /// Right shift applied to every product
    pub fn product_shift(&self) -> u32 {
        self.p_shr
    }
}

impl FilterKernel for FixedKernel {
    fn backend(&self) -> KernelBackend {
        KernelBackend::Fixed
    }

    fn tap_count(&self) -> usize {
        self.taps.len()
    }

    fn dot(&self, window: BfpSlice<'_>) -> FloatS64 {
        debug_assert_eq!(window.len(), self.taps.len());
        let p_shr = self.p_shr;
        let mant = window
            .data
            .iter()
            .zip(&self.taps)
            .fold(0i64, |acc, (&x, &c)| {
                acc.saturating_add((x as i64 * c as i64) >> p_shr)
            });
        let exp = window
            .exp
            .saturating_add(self.exp)
            .saturating_add(p_shr as i32);
        FloatS64::new(mant, exp)
    }
}
