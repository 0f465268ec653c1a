mod test_signals;

use bfpfir::constants::{DEFAULT_COEF_EXP, FRAME_SIZE, TAP_COUNT, WIRE_EXP};
use bfpfir::simulation::{NoiseConfig, sine, white_noise};
use bfpfir::timing::FilterTimer;
use bfpfir::wav::{load_pcm32_mono, save_pcm32_mono};
use bfpfir::{
    FilterCoefficients, FilterConfig, FirError, FrameExponentMode, FrameProcessor, KernelBackend,
    Pipeline, ProcessorState, filter_signal,
};
use test_signals::{ALL_BACKENDS, MODES, boxcar_stage, reference_config};

#[test]
fn test_final_partial_frame_is_truncated() {
    let genuine = 37;
    let input = white_noise(5 * FRAME_SIZE + genuine, &NoiseConfig::new(0.2).with_seed(3)).unwrap();
    let mut padded = input.clone();
    padded.resize(6 * FRAME_SIZE, 0);

    for backend in ALL_BACKENDS {
        let config = reference_config(backend, FrameExponentMode::Wire);

        let mut stage = boxcar_stage(&config);
        let output = filter_signal(&mut stage, &input).unwrap();
        assert_eq!(output.len(), input.len());
        assert_eq!(stage.state(), ProcessorState::Finished);

        let mut stage = boxcar_stage(&config);
        let full = filter_signal(&mut stage, &padded).unwrap();
        assert_eq!(&full[..input.len()], &output[..], "{backend:?}");
    }
}

#[test]
fn test_partial_frame_message_yields_genuine_samples() {
    let mut stage = boxcar_stage(&FilterConfig::default());
    assert_eq!(stage.process_frame(&[0; FRAME_SIZE]).unwrap().len(), FRAME_SIZE);
    assert_eq!(stage.process_frame(&[1 << 20; 37]).unwrap().len(), 37);
    assert!(matches!(
        stage.process_frame(&[0; FRAME_SIZE]),
        Err(FirError::StreamFinished)
    ));
}

#[test]
fn test_full_scale_history_saturates() {
    let coefs = FilterCoefficients::from_fixed(vec![1 << 30; TAP_COUNT], -30).unwrap();
    let input = vec![i32::MAX; 2 * TAP_COUNT];

    for mode in MODES {
        for backend in ALL_BACKENDS {
            let config = reference_config(backend, mode);
            let mut stage = FrameProcessor::new(&config, coefs.clone()).unwrap();
            let output = filter_signal(&mut stage, &input).unwrap();
            assert!(
                output[TAP_COUNT..].iter().all(|&y| y == i32::MAX),
                "{backend:?}/{mode:?}"
            );
            assert!(stage.summary().saturated >= TAP_COUNT as u64);
        }
    }
}

#[test]
fn test_negative_full_scale_saturates_low() {
    let coefs = FilterCoefficients::from_fixed(vec![1 << 30; TAP_COUNT], -30).unwrap();
    let config = reference_config(KernelBackend::Bfp, FrameExponentMode::Wire);
    let mut stage = FrameProcessor::new(&config, coefs).unwrap();
    let output = filter_signal(&mut stage, &vec![i32::MIN; 2 * TAP_COUNT]).unwrap();
    assert!(output[TAP_COUNT..].iter().all(|&y| y == i32::MIN));
}

#[test]
fn test_pipeline_matches_sequential_stages() {
    let input = white_noise(4 * FRAME_SIZE + 100, &NoiseConfig::new(0.25).with_seed(21)).unwrap();
    let config = FilterConfig::default();

    let mut expected = input.clone();
    for _ in 0..3 {
        let mut stage = boxcar_stage(&config);
        expected = filter_signal(&mut stage, &expected).unwrap();
    }

    let stages = (0..3)
        .map(|i| boxcar_stage(&config).with_name(format!("stage-{i}")))
        .collect();
    let output = Pipeline::new(stages, 2).unwrap().run(&input).unwrap();

    assert_eq!(output.samples, expected);
    assert_eq!(output.summaries.len(), 3);
    for summary in &output.summaries {
        assert_eq!(summary.samples, input.len() as u64);
        assert_eq!(summary.frames, 5);
    }
}

#[test]
fn test_pipeline_with_timing_reports() {
    let config = FilterConfig {
        tap_count: 64,
        frame_size: 32,
        ..FilterConfig::default()
    };
    let stages = (0..2)
        .map(|_| boxcar_stage(&config).with_timing(Box::new(FilterTimer::with_warmup(64, 100))))
        .collect();
    let input = vec![1 << 24; 1000];
    let output = Pipeline::new(stages, 4).unwrap().run(&input).unwrap();

    for summary in &output.summaries {
        let report = summary.timing.as_ref().expect("timing report");
        assert_eq!(report.samples_measured, 900);
        assert!(report.tap_time <= report.filter_time);
    }
}

#[test]
fn test_config_from_toml_drives_stage() {
    let config = FilterConfig::from_toml_str(
        r#"
        tap_count = 32
        frame_size = 8
        backend = "vpu"
        frame_exponent = "wire"
        "#,
    )
    .unwrap();
    let mut stage = boxcar_stage(&config);
    assert_eq!(stage.backend(), KernelBackend::Vpu);

    let output = filter_signal(&mut stage, &vec![1 << 28; 100]).unwrap();
    assert_eq!(output.len(), 100);
    assert!(output[31..].iter().all(|&y| y == 1 << 28));
}

#[test]
fn test_lowpass_passes_low_and_rejects_high() {
    let sample_rate = 48000;
    let coefs = FilterCoefficients::lowpass(127, 2000.0, 1000.0, sample_rate as f32).unwrap();
    let config = FilterConfig {
        tap_count: 127,
        frame_size: 64,
        coef_exp: coefs.exp(),
        ..FilterConfig::default()
    };

    let rms_after = |freq: f64| {
        let input = sine(4096, sample_rate, freq, 0.5);
        let mut stage = FrameProcessor::new(&config, coefs.clone()).unwrap();
        let output = filter_signal(&mut stage, &input).unwrap();
        bfpfir::simulation::signal_stats(&output[1024..]).rms
    };

    let pass = rms_after(500.0);
    let stop = rms_after(10000.0);
    assert!((pass - 0.5 / 2f64.sqrt()).abs() < 0.03, "passband rms {pass}");
    assert!(stop < 0.01, "stopband rms {stop}");
}

#[test]
fn test_wav_file_round_trip_through_filter() {
    let dir = std::env::temp_dir();
    let input_path = dir.join(format!("bfpfir_in_{}.wav", std::process::id()));
    let output_path = dir.join(format!("bfpfir_out_{}.wav", std::process::id()));

    let input = sine(3000, 48000, 1000.0, 0.5);
    save_pcm32_mono(&input_path, &input, 48000).unwrap();

    let wav = load_pcm32_mono(&input_path).unwrap();
    let mut stage = boxcar_stage(&FilterConfig::default());
    let output = filter_signal(&mut stage, &wav.samples).unwrap();
    save_pcm32_mono(&output_path, &output, wav.sample_rate).unwrap();

    let reloaded = load_pcm32_mono(&output_path).unwrap();
    std::fs::remove_file(&input_path).ok();
    std::fs::remove_file(&output_path).ok();

    assert_eq!(reloaded.samples, output);
    assert_eq!(reloaded.sample_rate, 48000);
}

#[test]
fn test_reference_constants() {
    let config = FilterConfig::default();
    assert_eq!(config.tap_count, TAP_COUNT);
    assert_eq!(config.frame_size, FRAME_SIZE);
    assert_eq!(config.input_exp, WIRE_EXP);
    assert_eq!(config.coef_exp, DEFAULT_COEF_EXP);
}
