//! Numeric constants of the reference filter system
//!
//! These define the frame geometry and the fixed exponents shared by every
//! stage of the pipeline.

/// Number of filter coefficients in the reference box-car filter.
pub const TAP_COUNT: usize = 1024;

/// Number of new samples exchanged between stages per frame.
pub const FRAME_SIZE: usize = 256;

/// Exponent of PCM words on the wire.
/// A 32-bit sample `x` represents `x * 2^-31`, i.e. full scale is `[-1.0, 1.0)`.
pub const WIRE_EXP: i32 = -31;

/// Default exponent of fixed-point filter coefficients (Q2.30).
pub const DEFAULT_COEF_EXP: i32 = -30;

/// Largest exponent magnitude accepted from configuration or coefficients.
/// Keeps every exponent sum on the filter path far from `i32` overflow.
pub const MAX_EXPONENT_MAGNITUDE: i32 = 1 << 20;

/// Right shift the vector unit applies to every 32x32-bit product
/// before accumulation.
pub const VPU_PRODUCT_SHR: i32 = 30;

/// Headroom reported for an all-zero 32-bit value or vector.
pub const ZERO_HEADROOM_S32: u32 = 32;

/// Headroom reported for a zero 64-bit value.
pub const ZERO_HEADROOM_S64: u32 = 64;

/// Number of per-sample timings discarded before statistics are collected,
/// so averages reflect steady-state behavior.
pub const TIMING_WARMUP_SAMPLES: u64 = 2048;
