//! Synthetic PCM test signals
//!
//! Generators return 32-bit PCM words at the wire exponent, ready to be fed
//! to a filter stage or written with [`crate::wav::save_pcm32_mono`].

mod measure;
mod noise;
mod signal;

pub use measure::{SignalStats, max_abs_difference, signal_stats};
pub use noise::{NoiseConfig, add_noise, white_noise};
pub use signal::{dc, impulse, sine, step};
