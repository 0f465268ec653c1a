use super::{FilterKernel, KernelBackend};
use crate::bfp::{BfpSlice, BfpVector, FloatS64};
use crate::coefficients::FilterCoefficients;

/// Block floating-point inner product
///
/// Delegates to [`BfpSlice::dot`], which shifts every product right by just
/// enough bits, given both operands' headroom, that the 64-bit sum cannot
/// overflow.
pub struct BfpKernel {
    taps: BfpVector,
}

impl BfpKernel {
    pub fn new(coefficients: &FilterCoefficients) -> Self {
        Self {
            taps: coefficients.as_bfp().clone(),
        }
    }
}

impl FilterKernel for BfpKernel {
    fn backend(&self) -> KernelBackend {
        KernelBackend::Bfp
    }

    fn tap_count(&self) -> usize {
        self.taps.len()
    }

    fn dot(&self, window: BfpSlice<'_>) -> FloatS64 {
        debug_assert_eq!(window.len(), self.taps.len());
        window.dot(self.taps.as_slice())
    }
}
