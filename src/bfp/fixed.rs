//! Conversion between floating values and scaled integers
//!
//! Every integer here carries an exponent `e` such that its real value is
//! `mantissa * 2^e`. Moving a value to a new exponent is an arithmetic shift
//! by the exponent difference; what happens when a left shift leaves the
//! integer's range is decided by an explicit [`OverflowPolicy`].

use serde::Deserialize;

use super::headroom::headroom_s64;

/// Behavior when a shift or narrowing leaves the destination range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Clamp to the destination type's minimum or maximum
    #[default]
    Saturate,
    /// Keep the low bits (two's complement truncation)
    Wrap,
}

/// A 32-bit mantissa with its exponent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FloatS32 {
    pub mant: i32,
    pub exp: i32,
}

/// A 64-bit mantissa with its exponent, as produced by an inner product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FloatS64 {
    pub mant: i64,
    pub exp: i32,
}

impl FloatS32 {
    pub fn new(mant: i32, exp: i32) -> Self {
        Self { mant, exp }
    }

    pub fn to_f64(self) -> f64 {
        ldexp(self.mant as f64, self.exp)
    }
}

impl FloatS64 {
    pub fn new(mant: i64, exp: i32) -> Self {
        Self { mant, exp }
    }

    /// Exact representation of a finite `f64`
    ///
    /// The 53-bit significand becomes the mantissa unchanged. NaN maps to
    /// zero and infinities to the largest mantissa at exponent 0, which
    /// saturates any audio-range output exponent.
    pub fn from_f64(x: f64) -> Self {
        if x == 0.0 || x.is_nan() {
            return Self::default();
        }
        if x.is_infinite() {
            let mant = if x > 0.0 { i64::MAX } else { i64::MIN };
            return Self { mant, exp: 0 };
        }

        let bits = x.to_bits();
        let biased = ((bits >> 52) & 0x7ff) as i32;
        let fraction = (bits & ((1u64 << 52) - 1)) as i64;
        let (magnitude, exp) = if biased == 0 {
            (fraction, -1074)
        } else {
            (fraction | (1i64 << 52), biased - 1075)
        };
        let mant = if x.is_sign_negative() {
            -magnitude
        } else {
            magnitude
        };
        Self { mant, exp }
    }

    pub fn to_f64(self) -> f64 {
        ldexp(self.mant as f64, self.exp)
    }

    /// Smallest exponent at which this value still fits a 32-bit mantissa
    /// without losing its most significant bit.
    pub fn min_s32_exponent(self) -> i32 {
        let significant = 63 - headroom_s64(self.mant) as i32;
        self.exp.saturating_add(significant - 31)
    }
}

/// `x * 2^exp`
pub fn ldexp(x: f64, exp: i32) -> f64 {
    x * 2f64.powi(exp)
}

/// Arithmetic shift of a 32-bit value: right for positive `shr`, left for
/// negative `shr`
///
/// Right shifts of 32 bits or more leave only the sign (0 or -1). Left shifts
/// that lose significant bits either saturate or wrap according to `policy`.
pub fn ashr32(x: i32, shr: i32, policy: OverflowPolicy) -> i32 {
    if shr >= 0 {
        return x >> shr.min(31);
    }
    let shl = shr.unsigned_abs();
    if x == 0 {
        return 0;
    }
    match policy {
        OverflowPolicy::Wrap => {
            if shl >= 32 {
                0
            } else {
                ((x as i64) << shl) as i32
            }
        }
        OverflowPolicy::Saturate => {
            if shl >= 32 {
                return saturate_sign_s32(x);
            }
            narrow_i64((x as i64) << shl, OverflowPolicy::Saturate)
        }
    }
}

/// Arithmetic shift of a 64-bit value, same conventions as [`ashr32`]
pub fn ashr64(x: i64, shr: i32, policy: OverflowPolicy) -> i64 {
    if shr >= 0 {
        return x >> shr.min(63);
    }
    let shl = shr.unsigned_abs();
    if x == 0 {
        return 0;
    }
    match policy {
        OverflowPolicy::Wrap => {
            if shl >= 64 {
                0
            } else {
                ((x as i128) << shl) as i64
            }
        }
        OverflowPolicy::Saturate => {
            if shl >= 64 {
                return if x < 0 { i64::MIN } else { i64::MAX };
            }
            let wide = (x as i128) << shl;
            wide.clamp(i64::MIN as i128, i64::MAX as i128) as i64
        }
    }
}

/// Narrow a 64-bit value to 32 bits
pub fn narrow_i64(x: i64, policy: OverflowPolicy) -> i32 {
    match policy {
        OverflowPolicy::Saturate => x.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
        OverflowPolicy::Wrap => x as i32,
    }
}

fn saturate_sign_s32(x: i32) -> i32 {
    if x < 0 { i32::MIN } else { i32::MAX }
}

/// Express a 32-bit float value as a fixed-point integer at `target_exp`
pub fn float_s32_to_fixed(v: FloatS32, target_exp: i32, policy: OverflowPolicy) -> i32 {
    let shr = target_exp.saturating_sub(v.exp);
    ashr32(v.mant, shr, policy)
}

/// Express a 64-bit float value (e.g. an accumulator) as a 32-bit
/// fixed-point integer at `target_exp`
pub fn float_s64_to_fixed(v: FloatS64, target_exp: i32, policy: OverflowPolicy) -> i32 {
    let shr = target_exp.saturating_sub(v.exp);
    narrow_i64(ashr64(v.mant, shr, policy), policy)
}

/// Quantize a native float to a fixed-point integer at `target_exp`,
/// rounding to nearest (half away from zero) and saturating
pub fn float_to_fixed(x: f64, target_exp: i32) -> i32 {
    to_pcm(x, target_exp)
}

/// Real value of a PCM word at `input_exp`
pub fn from_pcm(pcm: i32, input_exp: i32) -> f64 {
    ldexp(pcm as f64, input_exp)
}

/// PCM word representing `value` at `output_exp`
///
/// Rounds to nearest with ties away from zero, then saturates to the 32-bit
/// range. NaN maps to zero.
pub fn to_pcm(value: f64, output_exp: i32) -> i32 {
    let scaled = ldexp(value, -output_exp).round();
    if scaled.is_nan() {
        0
    } else if scaled >= i32::MAX as f64 {
        i32::MAX
    } else if scaled <= i32::MIN as f64 {
        i32::MIN
    } else {
        scaled as i32
    }
}

/// Shift every element of `data` by `shr` bits (see [`ashr32`])
pub fn shift_slice(data: &mut [i32], shr: i32, policy: OverflowPolicy) {
    if shr == 0 {
        return;
    }
    for x in data.iter_mut() {
        *x = ashr32(*x, shr, policy);
    }
}
