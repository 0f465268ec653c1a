use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use bfpfir::bfp::to_pcm;
use bfpfir::constants::WIRE_EXP;
use bfpfir::simulation::{NoiseConfig, add_noise, dc, impulse, signal_stats, sine, step};
use bfpfir::wav::save_pcm32_mono;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum SignalKind {
    Impulse,
    Step,
    Dc,
    Sine,
    Silence,
}

#[derive(Parser, Debug)]
#[command(name = "generate_wav")]
#[command(about = "Generate 32-bit mono PCM test signals for FIR filtering")]
struct Args {
    /// Output WAV file
    output: PathBuf,

    /// Signal shape
    #[arg(short = 'k', long, value_enum, default_value = "impulse")]
    kind: SignalKind,

    /// Number of samples
    #[arg(short = 'n', long, default_value_t = 4096)]
    samples: usize,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 48000)]
    sample_rate: u32,

    /// Amplitude, full scale being 1.0
    #[arg(short, long, default_value_t = 1.0)]
    amplitude: f64,

    /// Sine frequency in Hz
    #[arg(short, long, default_value_t = 1000.0)]
    frequency: f64,

    /// Sample index of the impulse or step
    #[arg(long, default_value_t = 0)]
    position: usize,

    /// TOML noise configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Additive Gaussian noise standard deviation (CLI override)
    #[arg(long)]
    noise: Option<f64>,

    /// Noise seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlConfig {
    noise: Option<NoiseConfig>,
}

fn load_toml_config(path: &PathBuf) -> Result<TomlConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn build_noise_config(toml: &TomlConfig, args: &Args) -> Option<NoiseConfig> {
    let mut config = match args.noise {
        Some(std_dev) => Some(NoiseConfig::new(std_dev)),
        None => toml.noise.clone(),
    }?;
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    Some(config)
}

fn generate(args: &Args) -> Vec<i32> {
    let level = to_pcm(args.amplitude, WIRE_EXP);
    match args.kind {
        SignalKind::Impulse => impulse(args.samples, args.position, level),
        SignalKind::Step => step(args.samples, args.position, level),
        SignalKind::Dc => dc(args.samples, level),
        SignalKind::Sine => sine(args.samples, args.sample_rate, args.frequency, args.amplitude),
        SignalKind::Silence => vec![0; args.samples],
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = match args.config {
        Some(ref path) => load_toml_config(path)?,
        None => TomlConfig::default(),
    };

    let mut signal = generate(&args);
    if let Some(noise) = build_noise_config(&toml_config, &args) {
        add_noise(&mut signal, &noise).context("Failed to add noise")?;
    }

    save_pcm32_mono(&args.output, &signal, args.sample_rate)
        .context("Failed to write WAV file")?;

    let stats = signal_stats(&signal);
    eprintln!(
        "Wrote {} samples to {} (rms {:.4}, peak {:.4})",
        signal.len(),
        args.output.display(),
        stats.rms,
        stats.peak
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_scale_impulse() {
        let args = Args::try_parse_from(["generate_wav", "out.wav", "-n", "8", "--position", "2"])
            .unwrap();
        assert_eq!(generate(&args), vec![0, 0, i32::MAX, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_cli_noise_overrides_toml() {
        let toml: TomlConfig = toml::from_str("[noise]\nstd_dev = 0.2\nseed = 5").unwrap();
        let args =
            Args::try_parse_from(["generate_wav", "out.wav", "--noise", "0.1", "-s", "9"]).unwrap();
        let noise = build_noise_config(&toml, &args).unwrap();
        assert_eq!(noise.std_dev, 0.1);
        assert_eq!(noise.seed, Some(9));

        let args = Args::try_parse_from(["generate_wav", "out.wav"]).unwrap();
        let noise = build_noise_config(&toml, &args).unwrap();
        assert_eq!(noise.std_dev, 0.2);
        assert_eq!(noise.seed, Some(5));
    }
}
