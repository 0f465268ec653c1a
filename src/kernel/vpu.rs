//! Software model of a vector multiply-accumulate unit
//!
//! The unit multiplies 32-bit operands into 64-bit products, shifts every
//! product right by a fixed 30 bits with rounding and sums into a 64-bit
//! accumulator. Operands are pre-shifted so the sum has room for
//! `ceil(log2(len))` bits of growth.

use super::{FilterKernel, KernelBackend};
use crate::bfp::{BfpSlice, FloatS64, OverflowPolicy, ashr32, growth_bits};
use crate::coefficients::FilterCoefficients;
use crate::constants::VPU_PRODUCT_SHR;

/// Operand shifts and result exponent for one inner product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DotPrepare {
    pub acc_exp: i32,
    pub b_shr: i32,
    pub c_shr: i32,
}

/// Choose operand shifts for a `len`-element inner product
///
/// Both operands are first normalized to use all of their headroom. Growth
/// that does not fit above the 30-bit product shift is then split between
/// the two operands as right shifts.
pub fn dot_prepare(b_exp: i32, c_exp: i32, b_hr: u32, c_hr: u32, len: usize) -> DotPrepare {
    let required = growth_bits(len).saturating_sub(VPU_PRODUCT_SHR as u32) as i32;
    let b_total = required / 2;
    let c_total = required - b_total;

    let b_shr = b_total - b_hr.min(31) as i32;
    let c_shr = c_total - c_hr.min(31) as i32;
    DotPrepare {
        acc_exp: b_exp + c_exp + b_shr + c_shr + VPU_PRODUCT_SHR,
        b_shr,
        c_shr,
    }
}

/// Accumulate `b . c` the way the unit does
///
/// Operands are shifted by `b_shr` and `c_shr` with saturation; every product
/// is rounded to nearest before its 30-bit shift.
pub fn vpu_dot(b: &[i32], c: &[i32], b_shr: i32, c_shr: i32) -> i64 {
    const ROUND: i64 = 1 << (VPU_PRODUCT_SHR - 1);

    b.iter().zip(c).fold(0i64, |acc, (&x, &y)| {
        let x = ashr32(x, b_shr, OverflowPolicy::Saturate) as i64;
        let y = ashr32(y, c_shr, OverflowPolicy::Saturate) as i64;
        acc.saturating_add((x * y + ROUND) >> VPU_PRODUCT_SHR)
    })
}

pub struct VpuKernel {
    taps: Vec<i32>,
    exp: i32,
    hr: u32,
}

impl VpuKernel {
    pub fn new(coefficients: &FilterCoefficients) -> Self {
        Self {
            taps: coefficients.data().to_vec(),
            exp: coefficients.exp(),
            hr: coefficients.headroom(),
        }
    }
}

impl FilterKernel for VpuKernel {
    fn backend(&self) -> KernelBackend {
        KernelBackend::Vpu
    }

    fn tap_count(&self) -> usize {
        self.taps.len()
    }

    fn dot(&self, window: BfpSlice<'_>) -> FloatS64 {
        debug_assert_eq!(window.len(), self.taps.len());
        let prep = dot_prepare(window.exp, self.exp, window.hr, self.hr, window.len());
        let mant = vpu_dot(window.data, &self.taps, prep.b_shr, prep.c_shr);
        FloatS64::new(mant, prep.acc_exp)
    }
}
