//! Block floating-point arithmetic: scalar conversion, headroom, vectors

pub mod fixed;
pub mod headroom;
pub mod vector;

pub use fixed::{
    FloatS32, FloatS64, OverflowPolicy, ashr32, ashr64, float_s32_to_fixed, float_s64_to_fixed,
    float_to_fixed, from_pcm, ldexp, shift_slice, to_pcm,
};
pub use headroom::{growth_bits, headroom, headroom_s32, headroom_s64};
pub use vector::{BfpSlice, BfpVector, common_exponent, product_shift};
