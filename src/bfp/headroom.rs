use crate::constants::{ZERO_HEADROOM_S32, ZERO_HEADROOM_S64};
use crate::error::{FirError, Result};

/// Number of redundant leading sign bits in a 32-bit value
///
/// This is how far `x` can be shifted left without changing its value's sign
/// or magnitude. `i32::MIN` and `i32::MAX` have no headroom; `-1` has 31.
/// Zero occupies no significant bits and reports 32 by convention.
pub fn headroom_s32(x: i32) -> u32 {
    if x == 0 {
        ZERO_HEADROOM_S32
    } else {
        (x ^ (x >> 31)).leading_zeros() - 1
    }
}

/// Number of redundant leading sign bits in a 64-bit value (zero reports 64)
pub fn headroom_s64(x: i64) -> u32 {
    if x == 0 {
        ZERO_HEADROOM_S64
    } else {
        (x ^ (x >> 63)).leading_zeros() - 1
    }
}

/// Headroom shared by every element of a vector: the minimum over elements
///
/// # Errors
/// Returns `FirError::EmptyVector` if `data` is empty, since an empty block
/// has no meaningful headroom.
pub fn headroom(data: &[i32]) -> Result<u32> {
    if data.is_empty() {
        return Err(FirError::EmptyVector);
    }
    Ok(min_headroom(data))
}

/// Minimum headroom over `data`, folding from the all-zero value.
pub(crate) fn min_headroom(data: &[i32]) -> u32 {
    data.iter()
        .fold(ZERO_HEADROOM_S32, |hr, &x| hr.min(headroom_s32(x)))
}

/// Number of extra accumulator bits needed to sum `len` terms without
/// overflow, i.e. `ceil(log2(len))`.
pub fn growth_bits(len: usize) -> u32 {
    if len <= 1 {
        0
    } else {
        usize::BITS - (len - 1).leading_zeros()
    }
}
