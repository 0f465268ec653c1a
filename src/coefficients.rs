use pm_remez::{BandSetting, constant, pm_parameters, pm_remez};

use crate::bfp::{BfpSlice, BfpVector};
use crate::error::{FirError, Result};

/// Lowest normalized frequency accepted for a band edge
const MIN_NORMALIZED_FREQ: f64 = 0.0;

/// Highest normalized frequency (Nyquist)
const MAX_NORMALIZED_FREQ: f64 = 0.5;

/// Immutable FIR filter coefficients
///
/// Stored as a block floating-point vector in forward tap order: tap 0
/// multiplies the most recent sample. The exponent and headroom are fixed
/// for the lifetime of the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCoefficients {
    taps: BfpVector,
}

impl FilterCoefficients {
    /// Box-car (moving average) filter: every tap is `1 / tap_count`
    ///
    /// The tap value is quantized at `exp`; for 1024 taps at exponent -30
    /// (Q2.30) each coefficient is exactly `2^20`.
    pub fn boxcar(tap_count: usize, exp: i32) -> Result<Self> {
        if tap_count == 0 {
            return Err(FirError::Config("box-car filter needs at least one tap".into()));
        }
        Self::from_f64(&vec![1.0 / tap_count as f64; tap_count], exp)
    }

    /// Fixed-point coefficients with an explicit exponent
    pub fn from_fixed(taps: Vec<i32>, exp: i32) -> Result<Self> {
        Ok(Self {
            taps: BfpVector::new(taps, exp)?,
        })
    }

    /// Quantize real-valued taps at `exp` (round to nearest, saturating)
    pub fn from_f64(taps: &[f64], exp: i32) -> Result<Self> {
        Ok(Self {
            taps: BfpVector::from_f64(taps, exp)?,
        })
    }

    /// Quantize real-valued taps at the smallest exponent that holds the
    /// largest tap, maximizing precision
    pub fn quantize(taps: &[f64]) -> Result<Self> {
        let peak = taps.iter().fold(0.0f64, |m, &t| m.max(t.abs()));
        if !peak.is_finite() {
            return Err(FirError::FilterDesign("non-finite filter tap".into()));
        }
        if peak == 0.0 {
            return Self::from_f64(taps, crate::constants::DEFAULT_COEF_EXP);
        }
        // Smallest e with round(peak * 2^-e) < 2^31
        let mut exp = peak.log2().floor() as i32 - 30;
        if crate::bfp::ldexp(peak, -exp) >= i32::MAX as f64 {
            exp += 1;
        }
        Self::from_f64(taps, exp)
    }

    /// Design a linear-phase low-pass filter with the Parks-McClellan
    /// algorithm and quantize it
    ///
    /// # Arguments
    /// * `num_taps` - Number of taps
    /// * `cutoff_hz` - Passband edge in Hz
    /// * `transition_hz` - Width of the transition band in Hz
    /// * `sample_rate` - Sample rate in Hz
    ///
    /// # Errors
    /// Returns `FirError::FilterDesign` if the band edges are invalid or the
    /// design does not converge.
    pub fn lowpass(
        num_taps: usize,
        cutoff_hz: f32,
        transition_hz: f32,
        sample_rate: f32,
    ) -> Result<Self> {
        let taps = design_lowpass(num_taps, cutoff_hz, transition_hz, sample_rate)?;
        Self::quantize(&taps)
    }

    pub fn as_bfp(&self) -> &BfpVector {
        &self.taps
    }

    pub fn as_slice(&self) -> BfpSlice<'_> {
        self.taps.as_slice()
    }

    pub fn data(&self) -> &[i32] {
        self.taps.data()
    }

    pub fn exp(&self) -> i32 {
        self.taps.exp()
    }

    pub fn headroom(&self) -> u32 {
        self.taps.headroom()
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    /// Real-valued taps
    pub fn to_f64(&self) -> Vec<f64> {
        self.taps.to_f64()
    }

    /// Gain at DC: the sum of the taps
    pub fn dc_gain(&self) -> f64 {
        self.to_f64().iter().sum()
    }
}

/// Parks-McClellan low-pass design returning real-valued taps
pub fn design_lowpass(
    num_taps: usize,
    cutoff_hz: f32,
    transition_hz: f32,
    sample_rate: f32,
) -> Result<Vec<f64>> {
    let normalize = |hz: f32| (hz / sample_rate) as f64;

    let pass_end = normalize(cutoff_hz).max(MIN_NORMALIZED_FREQ);
    let stop_start = (pass_end + normalize(transition_hz)).min(MAX_NORMALIZED_FREQ);

    if num_taps < 3 || stop_start <= pass_end || pass_end <= MIN_NORMALIZED_FREQ {
        return Err(FirError::FilterDesign(format!(
            "Invalid low-pass parameters: taps={}, cutoff={}, transition={}, sample_rate={}",
            num_taps, cutoff_hz, transition_hz, sample_rate
        )));
    }

    let bands = [
        BandSetting::new(0.0, pass_end, constant(1.0))
            .map_err(|e| FirError::FilterDesign(format!("Passband: {:?}", e)))?,
        BandSetting::new(stop_start, MAX_NORMALIZED_FREQ, constant(0.0))
            .map_err(|e| FirError::FilterDesign(format!("Stopband: {:?}", e)))?,
    ];

    let params = pm_parameters(num_taps, &bands)
        .map_err(|e| FirError::FilterDesign(format!("PM parameters: {:?}", e)))?;

    let design =
        pm_remez(&params).map_err(|e| FirError::FilterDesign(format!("PM Remez: {:?}", e)))?;

    Ok(design.impulse_response)
}
