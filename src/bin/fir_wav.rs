use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use bfpfir::config::{FilterConfig, FrameExponentMode};
use bfpfir::kernel::KernelBackend;
use bfpfir::timing::FilterTimer;
use bfpfir::wav::{load_pcm32_mono, save_pcm32_mono};
use bfpfir::{FilterCoefficients, FrameProcessor, Pipeline};

#[derive(Parser, Debug)]
#[command(name = "fir_wav")]
#[command(about = "Filter a 32-bit mono PCM WAV file through a chain of FIR stages", long_about = None)]
struct Args {
    /// Input WAV file (32-bit integer, mono)
    input: PathBuf,

    /// Output WAV file
    output: PathBuf,

    /// TOML filter configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Inner-product backend (overrides the configuration file)
    #[arg(short, long, value_enum)]
    backend: Option<KernelBackend>,

    /// Frame exponent mode (overrides the configuration file)
    #[arg(long, value_enum)]
    frame_exponent: Option<FrameExponentMode>,

    /// JSON coefficient file: {"taps": [...], "exp": -30}
    #[arg(long, conflicts_with = "lowpass")]
    coefficients: Option<PathBuf>,

    /// Design a low-pass filter with this cutoff in Hz instead of a box-car
    #[arg(long)]
    lowpass: Option<f32>,

    /// Low-pass transition band width in Hz
    #[arg(long, default_value_t = 500.0)]
    transition: f32,

    /// Number of chained filter stages
    #[arg(short, long, default_value_t = 1)]
    stages: usize,

    /// Frames buffered between stages
    #[arg(long, default_value_t = 2)]
    depth: usize,

    /// Directory for per-stage timing reports (stageN.json)
    #[arg(long)]
    perf: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Deserialize)]
struct CoefficientFile {
    taps: Vec<f64>,
    /// Quantization exponent; chosen from the largest tap when absent
    exp: Option<i32>,
}

fn load_config(path: &Path) -> Result<FilterConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    FilterConfig::from_toml_str(&content).context("Failed to parse config file")
}

fn load_coefficients(path: &Path) -> Result<FilterCoefficients> {
    let content = fs::read_to_string(path).context("Failed to read coefficient file")?;
    let file: CoefficientFile =
        serde_json::from_str(&content).context("Failed to parse coefficient file")?;
    let coefficients = match file.exp {
        Some(exp) => FilterCoefficients::from_f64(&file.taps, exp),
        None => FilterCoefficients::quantize(&file.taps),
    };
    coefficients.context("Invalid coefficients")
}

fn build_coefficients(
    args: &Args,
    config: &FilterConfig,
    sample_rate: u32,
) -> Result<FilterCoefficients> {
    let coefficients = if let Some(ref path) = args.coefficients {
        load_coefficients(path)?
    } else if let Some(cutoff) = args.lowpass {
        FilterCoefficients::lowpass(config.tap_count, cutoff, args.transition, sample_rate as f32)
            .context("Low-pass design failed")?
    } else {
        FilterCoefficients::boxcar(config.tap_count, config.coef_exp)?
    };

    if coefficients.len() != config.tap_count {
        bail!(
            "Coefficient count {} does not match tap_count {}",
            coefficients.len(),
            config.tap_count
        );
    }
    log::info!(
        "{} taps at exponent {}, DC gain {:.6}",
        coefficients.len(),
        coefficients.exp(),
        coefficients.dc_gain()
    );
    Ok(coefficients)
}

fn write_reports(dir: &Path, pipeline_output: &bfpfir::PipelineOutput) -> Result<()> {
    fs::create_dir_all(dir).context("Failed to create perf directory")?;
    for (i, summary) in pipeline_output.summaries.iter().enumerate() {
        let Some(ref report) = summary.timing else {
            log::warn!("Stage {} processed too few samples for a timing report", i);
            continue;
        };
        let path = dir.join(format!("stage{}.json", i));
        let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
        fs::write(&path, json).context("Failed to write timing report")?;
        eprintln!(
            "Stage {}: {:.1} ns/sample, {:.3} ns/tap",
            i, report.filter_time, report.tap_time
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = match args.config {
        Some(ref path) => load_config(path)?,
        None => FilterConfig::default(),
    };
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if let Some(mode) = args.frame_exponent {
        config.frame_exponent = mode;
    }
    if args.stages == 0 {
        bail!("At least one stage is required");
    }

    let wav = load_pcm32_mono(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    let coefficients = build_coefficients(&args, &config, wav.sample_rate)?;

    let mut stages = Vec::with_capacity(args.stages);
    for i in 0..args.stages {
        let mut stage = FrameProcessor::new(&config, coefficients.clone())?
            .with_name(format!("fir-stage-{}", i));
        if args.perf.is_some() {
            stage = stage.with_timing(Box::new(FilterTimer::new(config.tap_count)));
        }
        stages.push(stage);
    }

    eprintln!(
        "Filtering {} samples at {} Hz through {} {:?} stage(s)",
        wav.samples.len(),
        wav.sample_rate,
        args.stages,
        config.backend
    );
    let output = Pipeline::new(stages, args.depth)?.run(&wav.samples)?;

    save_pcm32_mono(&args.output, &output.samples, wav.sample_rate)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    let saturated: u64 = output.summaries.iter().map(|s| s.saturated).sum();
    if saturated > 0 {
        eprintln!("Warning: {} output samples saturated", saturated);
    }

    if let Some(ref dir) = args.perf {
        write_reports(dir, &output)?;
    }
    Ok(())
}
