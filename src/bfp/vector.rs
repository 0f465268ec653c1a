//! Block floating-point vectors
//!
//! A [`BfpVector`] is a buffer of 32-bit mantissas sharing one exponent.
//! Its headroom is kept exact: every operation that changes the data
//! recomputes it before returning, so a stale headroom can never reach a
//! dot product.

use crate::error::{FirError, Result};

use super::fixed::{FloatS64, OverflowPolicy, ashr32, ldexp, shift_slice, to_pcm};
use super::headroom::{growth_bits, min_headroom};

/// Owned block floating-point vector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BfpVector {
    data: Vec<i32>,
    exp: i32,
    hr: u32,
}

/// Borrowed view of a contiguous run of a block floating-point buffer
///
/// `hr` may be smaller than the true headroom of `data` (a window inherits
/// the headroom of the whole buffer it was cut from), which is always safe
/// for overflow avoidance.
#[derive(Debug, Clone, Copy)]
pub struct BfpSlice<'a> {
    pub data: &'a [i32],
    pub exp: i32,
    pub hr: u32,
}

impl BfpVector {
    /// Wrap `data` with exponent `exp`, computing its headroom
    ///
    /// # Errors
    /// Returns `FirError::EmptyVector` for an empty buffer.
    pub fn new(data: Vec<i32>, exp: i32) -> Result<Self> {
        if data.is_empty() {
            return Err(FirError::EmptyVector);
        }
        let hr = min_headroom(&data);
        Ok(Self { data, exp, hr })
    }

    /// All-zero vector of `len` elements
    pub fn zeros(len: usize, exp: i32) -> Result<Self> {
        Self::new(vec![0; len], exp)
    }

    /// Quantize real values at a chosen exponent (round to nearest, saturate)
    pub fn from_f64(values: &[f64], exp: i32) -> Result<Self> {
        Self::new(values.iter().map(|&v| to_pcm(v, exp)).collect(), exp)
    }

    pub fn data(&self) -> &[i32] {
        &self.data
    }

    pub fn exp(&self) -> i32 {
        self.exp
    }

    pub fn headroom(&self) -> u32 {
        self.hr
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false; kept alongside `len` for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Smallest exponent the contents can take without losing bits
    pub fn min_exponent(&self) -> i32 {
        self.exp.saturating_sub(self.hr as i32)
    }

    pub fn is_zero(&self) -> bool {
        self.hr == crate::constants::ZERO_HEADROOM_S32
    }

    pub fn as_slice(&self) -> BfpSlice<'_> {
        BfpSlice {
            data: &self.data,
            exp: self.exp,
            hr: self.hr,
        }
    }

    /// View of `len` elements starting at `start`, inheriting this vector's
    /// exponent and headroom. Panics if the range is out of bounds.
    pub fn window(&self, start: usize, len: usize) -> BfpSlice<'_> {
        BfpSlice {
            data: &self.data[start..start + len],
            exp: self.exp,
            hr: self.hr,
        }
    }

    /// Mutate the mantissas in place, keeping the exponent
    ///
    /// Headroom is recomputed once `f` returns.
    pub fn update<F: FnOnce(&mut [i32])>(&mut self, f: F) {
        f(&mut self.data);
        self.hr = min_headroom(&self.data);
    }

    /// Replace the exponent and mutate the mantissas in one step
    ///
    /// The caller is responsible for making the new mantissas consistent
    /// with `exp`; headroom is recomputed afterwards.
    pub fn update_with_exponent<F: FnOnce(&mut [i32])>(&mut self, exp: i32, f: F) {
        self.exp = exp;
        self.update(f);
    }

    /// Fill from `f(index)` at exponent `exp`
    pub fn fill_with<F: FnMut(usize) -> i32>(&mut self, exp: i32, mut f: F) {
        self.update_with_exponent(exp, |data| {
            for (i, x) in data.iter_mut().enumerate() {
                *x = f(i);
            }
        });
    }

    /// Move the vector to exponent `new_exp`
    ///
    /// A larger exponent right-shifts the mantissas (dropping low bits). A
    /// smaller exponent left-shifts them, which is lossless while
    /// `headroom() >= exp() - new_exp` and otherwise overflows according to
    /// `policy`.
    pub fn rescale(&mut self, new_exp: i32, policy: OverflowPolicy) {
        let shr = new_exp.saturating_sub(self.exp);
        if shr == 0 {
            return;
        }
        if shr < 0 && shr.unsigned_abs() > self.hr && !self.is_zero() {
            log::debug!(
                "Rescale from exponent {} to {} exceeds headroom {} ({:?})",
                self.exp,
                new_exp,
                self.hr,
                policy
            );
        }
        shift_slice(&mut self.data, shr, policy);
        self.exp = new_exp;
        self.hr = min_headroom(&self.data);
    }

    /// Shift mantissas right by `shr` bits (left when negative), adjusting the
    /// exponent so the represented values are unchanged up to truncation.
    pub fn shr(&mut self, shr: i32, policy: OverflowPolicy) {
        self.rescale(self.exp.saturating_add(shr), policy);
    }

    /// Left-shift away all headroom, giving the smallest lossless exponent.
    /// An all-zero vector is left untouched.
    pub fn normalize(&mut self) {
        if !self.is_zero() {
            self.rescale(self.min_exponent(), OverflowPolicy::Saturate);
        }
    }

    /// Bring `a` and `b` to a common exponent and return it
    ///
    /// The common exponent is `max(a.exp - a.hr, b.exp - b.hr)`: the smallest
    /// exponent both can hold. The vector that sets it is left-shifted
    /// losslessly to zero headroom; the other is shifted left within its
    /// headroom or right-shifted, losing only bits below the shared scale.
    pub fn merge_reconcile(a: &mut Self, b: &mut Self) -> i32 {
        let exp = common_exponent(a.as_slice(), b.as_slice());
        a.rescale(exp, OverflowPolicy::Saturate);
        b.rescale(exp, OverflowPolicy::Saturate);
        exp
    }

    /// Inner product with another vector of the same length
    ///
    /// # Errors
    /// Returns `FirError::LengthMismatch` if the lengths differ.
    pub fn dot(&self, other: &Self) -> Result<FloatS64> {
        if self.len() != other.len() {
            return Err(FirError::LengthMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(self.as_slice().dot(other.as_slice()))
    }

    /// Real values represented by the vector
    pub fn to_f64(&self) -> Vec<f64> {
        self.data.iter().map(|&x| ldexp(x as f64, self.exp)).collect()
    }

    /// Mantissas as they would read at exponent `exp`, without modifying
    /// the vector.
    pub fn mantissas_at(&self, exp: i32, policy: OverflowPolicy) -> Vec<i32> {
        let shr = exp.saturating_sub(self.exp);
        self.data.iter().map(|&x| ashr32(x, shr, policy)).collect()
    }
}

impl BfpSlice<'_> {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Inner product, exact up to a headroom-driven per-product shift
    ///
    /// Each 64-bit product is right-shifted by
    /// `p_shr = max(0, ceil(log2(len)) - hr_a - hr_b)` before accumulation,
    /// which reserves enough growth bits that the 64-bit sum cannot overflow.
    /// The result exponent is `exp_a + exp_b + p_shr`.
    pub fn dot(&self, other: BfpSlice<'_>) -> FloatS64 {
        debug_assert_eq!(self.len(), other.len());
        let p_shr = product_shift(self.hr, other.hr, self.len());

        let mant = self
            .data
            .iter()
            .zip(other.data)
            .fold(0i64, |acc, (&b, &c)| {
                acc.saturating_add(((b as i64) * (c as i64)) >> p_shr)
            });

        FloatS64 {
            mant,
            exp: self
                .exp
                .saturating_add(other.exp)
                .saturating_add(p_shr as i32),
        }
    }
}

/// Smallest exponent at which both blocks can be represented without
/// overflow: `max(a.exp - a.hr, b.exp - b.hr)`
pub fn common_exponent(a: BfpSlice<'_>, b: BfpSlice<'_>) -> i32 {
    let a_min = a.exp.saturating_sub(a.hr as i32);
    let b_min = b.exp.saturating_sub(b.hr as i32);
    a_min.max(b_min)
}

/// Per-product right shift needed to sum `len` products of operands with
/// the given headroom in a 64-bit accumulator
pub fn product_shift(b_hr: u32, c_hr: u32, len: usize) -> u32 {
    growth_bits(len).saturating_sub(b_hr + c_hr).min(63)
}
