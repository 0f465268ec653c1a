//! Configuration for a filter stage
//!
//! Defaults reproduce the reference system: 1024 taps, 256-sample frames,
//! PCM on the wire at exponent -31 and Q2.30 coefficients.
//!
//! A stage can be configured from TOML; missing keys keep their defaults:
//!
//! ```
//! use bfpfir::config::{FilterConfig, FrameExponentMode};
//! use bfpfir::kernel::KernelBackend;
//!
//! let config = FilterConfig::from_toml_str("backend = \"vpu\"\nframe_exponent = \"wire\"").unwrap();
//! assert_eq!(config.backend, KernelBackend::Vpu);
//! assert_eq!(config.frame_exponent, FrameExponentMode::Wire);
//! assert_eq!(config.tap_count, 1024);
//! ```

use serde::Deserialize;

use crate::constants::{DEFAULT_COEF_EXP, FRAME_SIZE, MAX_EXPONENT_MAGNITUDE, TAP_COUNT, WIRE_EXP};
use crate::error::{FirError, Result};
use crate::kernel::KernelBackend;

/// How the exponent of a frame's output block is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FrameExponentMode {
    /// Convert every output sample straight to the output exponent
    Wire,
    /// Hold the frame at the smallest exponent that fits every sample, never
    /// above the output exponent, then rescale the block to the output
    /// exponent
    ///
    /// A sample too large for the output exponent saturates alone. Float
    /// backends round at the frame exponent and the rescale then truncates,
    /// so they may differ from `Wire` by one step.
    #[default]
    Auto,
}

/// Filter stage configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Number of filter coefficients
    pub tap_count: usize,
    /// New samples per frame
    pub frame_size: usize,
    /// Exponent of incoming PCM words
    pub input_exp: i32,
    /// Exponent of outgoing PCM words
    pub output_exp: i32,
    /// Exponent used when generating coefficients
    pub coef_exp: i32,
    /// Inner-product implementation
    pub backend: KernelBackend,
    /// Output block exponent selection
    pub frame_exponent: FrameExponentMode,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            tap_count: TAP_COUNT,
            frame_size: FRAME_SIZE,
            input_exp: WIRE_EXP,
            output_exp: WIRE_EXP,
            coef_exp: DEFAULT_COEF_EXP,
            backend: KernelBackend::default(),
            frame_exponent: FrameExponentMode::default(),
        }
    }
}

impl FilterConfig {
    /// Parse and validate a TOML document
    ///
    /// # Errors
    /// Returns `FirError::Config` if the document is malformed or the
    /// resulting configuration is invalid.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| FirError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the frame geometry and exponent ranges
    pub fn validate(&self) -> Result<()> {
        if self.tap_count == 0 {
            return Err(FirError::Config("tap_count must be at least 1".into()));
        }
        if self.frame_size == 0 {
            return Err(FirError::Config("frame_size must be at least 1".into()));
        }
        check_exponent("input_exp", self.input_exp)?;
        check_exponent("output_exp", self.output_exp)?;
        check_exponent("coef_exp", self.coef_exp)?;
        Ok(())
    }

    pub fn with_backend(mut self, backend: KernelBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_frame_exponent(mut self, mode: FrameExponentMode) -> Self {
        self.frame_exponent = mode;
        self
    }
}

/// Reject exponents whose sums could overflow on the filter path
pub fn check_exponent(name: &str, exp: i32) -> Result<()> {
    if exp.unsigned_abs() > MAX_EXPONENT_MAGNITUDE.unsigned_abs() {
        return Err(FirError::Config(format!(
            "{name} {exp} is outside +/-{MAX_EXPONENT_MAGNITUDE}"
        )));
    }
    Ok(())
}
