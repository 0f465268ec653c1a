mod test_signals;

use bfpfir::FrameExponentMode;
use bfpfir::KernelBackend;
use bfpfir::FilterCoefficients;
use bfpfir::simulation::{
    NoiseConfig, add_noise, dc, impulse, max_abs_difference, sine, white_noise,
};
use test_signals::{ALL_BACKENDS, MODES, WIDE_BACKENDS, run_boxcar, run_with_coefficients};

const BOXCAR_IMPULSE_LOW: i32 = 2_097_151;

#[test]
fn test_impulse_response_is_flat_then_zero() {
    let input = impulse(2048, 0, i32::MAX);

    for mode in MODES {
        for backend in ALL_BACKENDS {
            let output = run_boxcar(backend, mode, &input);
            assert_eq!(output.len(), input.len());

            for (i, &y) in output[..1024].iter().enumerate() {
                assert!(
                    y == BOXCAR_IMPULSE_LOW || y == BOXCAR_IMPULSE_LOW + 1,
                    "{backend:?}/{mode:?}: sample {i} is {y}"
                );
            }
            assert!(
                output[1024..].iter().all(|&y| y == 0),
                "{backend:?}/{mode:?}: response longer than the filter"
            );
        }
    }
}

#[test]
fn test_integer_backends_are_bit_exact_on_impulse() {
    let input = impulse(1300, 5, i32::MAX);
    let fixed = run_boxcar(KernelBackend::Fixed, FrameExponentMode::Wire, &input);
    for backend in [KernelBackend::Bfp, KernelBackend::Vpu] {
        for mode in MODES {
            assert_eq!(run_boxcar(backend, mode, &input), fixed, "{backend:?}/{mode:?}");
        }
    }
}

#[test]
fn test_backends_agree_on_noise() {
    let input = white_noise(3000, &NoiseConfig::new(0.1).with_seed(11)).unwrap();

    for mode in MODES {
        let reference = run_boxcar(KernelBackend::Fixed, mode, &input);
        for backend in WIDE_BACKENDS {
            let output = run_boxcar(backend, mode, &input);
            let diff = max_abs_difference(&reference, &output);
            assert!(diff <= 1, "{backend:?}/{mode:?} differs by {diff}");
        }
    }
}

#[test]
fn test_float32_within_its_precision() {
    let input = white_noise(3000, &NoiseConfig::new(0.1).with_seed(12)).unwrap();
    let reference = run_boxcar(KernelBackend::Float64, FrameExponentMode::Wire, &input);
    let single = run_boxcar(KernelBackend::Float32, FrameExponentMode::Wire, &input);
    // 24-bit significand against a full-scale 32-bit word
    let diff = max_abs_difference(&reference, &single);
    assert!(diff < 1 << 10, "float32 differs by {diff}");
}

#[test]
fn test_dc_converges_to_input_level() {
    let level = 644_245_094; // 0.3 full scale
    let input = dc(2048, level);

    for mode in MODES {
        for backend in ALL_BACKENDS {
            let output = run_boxcar(backend, mode, &input);
            // float32 accumulation of 1024 non-dyadic terms
            let tolerance = match backend {
                KernelBackend::Float32 => 1 << 12,
                _ => 1,
            };
            for &y in &output[1023..] {
                assert!(
                    (y as i64 - level as i64).abs() <= tolerance,
                    "{backend:?}/{mode:?}: steady state {y}, expected {level}"
                );
            }
            // ramp is monotonic while the history fills
            assert!(output[..1024].windows(2).all(|w| w[0] <= w[1]), "{backend:?}/{mode:?}");
        }
    }
}

#[test]
fn test_backends_agree_on_zero_headroom_lowpass() {
    let sample_rate = 48000;
    let coefs = FilterCoefficients::lowpass(127, 2000.0, 1000.0, sample_rate as f32).unwrap();
    assert_eq!(coefs.headroom(), 0);

    let mut input = sine(4096, sample_rate, 500.0, 0.5);
    add_noise(&mut input, &NoiseConfig::new(0.05).with_seed(21)).unwrap();

    for mode in MODES {
        let reference = run_with_coefficients(KernelBackend::Float64, mode, &coefs, 64, &input);
        let peak = reference.iter().map(|y| y.unsigned_abs()).max().unwrap();
        assert!(peak > 1 << 29, "{mode:?}: passband signal lost, peak {peak}");
        assert!(peak < i32::MAX as u32, "{mode:?}: reference saturated");

        for backend in WIDE_BACKENDS {
            let output = run_with_coefficients(backend, mode, &coefs, 64, &input);
            let diff = max_abs_difference(&reference, &output);
            assert!(diff <= 1, "{backend:?}/{mode:?} differs by {diff}");
        }

        let single = run_with_coefficients(KernelBackend::Float32, mode, &coefs, 64, &input);
        let diff = max_abs_difference(&reference, &single);
        assert!(diff < 1 << 14, "float32/{mode:?} differs by {diff}");
    }
}
