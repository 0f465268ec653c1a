#![allow(dead_code)]

use bfpfir::constants::DEFAULT_COEF_EXP;
use bfpfir::{
    FilterCoefficients, FilterConfig, FrameExponentMode, FrameProcessor, KernelBackend,
    filter_signal,
};

pub const ALL_BACKENDS: [KernelBackend; 5] = [
    KernelBackend::Float32,
    KernelBackend::Float64,
    KernelBackend::Fixed,
    KernelBackend::Bfp,
    KernelBackend::Vpu,
];

/// Backends exact to within one output step on arbitrary input
pub const WIDE_BACKENDS: [KernelBackend; 4] = [
    KernelBackend::Float64,
    KernelBackend::Fixed,
    KernelBackend::Bfp,
    KernelBackend::Vpu,
];

pub const MODES: [FrameExponentMode; 2] = [FrameExponentMode::Wire, FrameExponentMode::Auto];

pub fn reference_config(backend: KernelBackend, mode: FrameExponentMode) -> FilterConfig {
    FilterConfig::default()
        .with_backend(backend)
        .with_frame_exponent(mode)
}

pub fn boxcar_stage(config: &FilterConfig) -> FrameProcessor {
    let coefs = FilterCoefficients::boxcar(config.tap_count, DEFAULT_COEF_EXP)
        .expect("box-car coefficients");
    FrameProcessor::new(config, coefs).expect("valid stage")
}

/// Run `samples` through one reference box-car stage
pub fn run_boxcar(backend: KernelBackend, mode: FrameExponentMode, samples: &[i32]) -> Vec<i32> {
    let mut stage = boxcar_stage(&reference_config(backend, mode));
    filter_signal(&mut stage, samples).expect("filtering succeeds")
}

/// Run `samples` through one stage built from `coefs`, sized to match them
pub fn run_with_coefficients(
    backend: KernelBackend,
    mode: FrameExponentMode,
    coefs: &FilterCoefficients,
    frame_size: usize,
    samples: &[i32],
) -> Vec<i32> {
    let config = FilterConfig {
        tap_count: coefs.len(),
        frame_size,
        coef_exp: coefs.exp(),
        ..reference_config(backend, mode)
    };
    let mut stage = FrameProcessor::new(&config, coefs.clone()).expect("valid stage");
    filter_signal(&mut stage, samples).expect("filtering succeeds")
}
