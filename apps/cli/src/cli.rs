use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use kompressor_core::CompressorSettings;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "kompressor",
    version,
    about = "Hard-knee feed-forward dynamic range compressor"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compress a WAV file
    Render(RenderArgs),
    /// Print the static input/output level curve
    Curve(CurveArgs),
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Input WAV file (mono or stereo)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output WAV file, written with the input's format
    #[arg(short, long)]
    pub output: PathBuf,

    /// Samples per processing block
    #[arg(long, default_value_t = 512)]
    pub block_size: usize,

    #[command(flatten)]
    pub params: ParamArgs,
}

#[derive(Debug, Args)]
pub struct CurveArgs {
    /// Lowest input level in dB
    #[arg(long, default_value_t = -60.0, allow_hyphen_values = true)]
    pub from: f32,

    /// Highest input level in dB
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub to: f32,

    /// Step between rows in dB
    #[arg(long, default_value_t = 6.0)]
    pub step: f32,

    #[command(flatten)]
    pub params: ParamArgs,
}

/// Compressor parameters from a config file and command-line overrides
#[derive(Debug, Default, Args)]
pub struct ParamArgs {
    /// TOML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Threshold in dB [-60, 0]
    #[arg(long, allow_hyphen_values = true)]
    pub threshold: Option<f32>,

    /// Compression ratio N:1 (>= 1)
    #[arg(long)]
    pub ratio: Option<f32>,

    /// Make-up gain in dB
    #[arg(long, allow_hyphen_values = true)]
    pub makeup: Option<f32>,

    /// Attack time in milliseconds
    #[arg(long)]
    pub attack: Option<f32>,

    /// Release time in milliseconds
    #[arg(long)]
    pub release: Option<f32>,

    /// Pass audio through untouched
    #[arg(long)]
    pub bypass: bool,
}

impl ParamArgs {
    /// Defaults, then the config file, then command-line flags
    pub fn resolve(&self) -> Result<CompressorSettings> {
        let base = match &self.config {
            Some(path) => CompressorSettings::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => CompressorSettings::default(),
        };
        let settings = self.apply_overrides(base);
        settings.validate().context("Invalid compressor parameters")?;
        Ok(settings)
    }

    fn apply_overrides(&self, mut settings: CompressorSettings) -> CompressorSettings {
        if let Some(db) = self.threshold {
            settings.threshold_db = db;
        }
        if let Some(ratio) = self.ratio {
            settings.ratio = ratio;
        }
        if let Some(db) = self.makeup {
            settings.makeup_gain_db = db;
        }
        if let Some(ms) = self.attack {
            settings.attack_ms = ms;
        }
        if let Some(ms) = self.release {
            settings.release_ms = ms;
        }
        if self.bypass {
            settings.bypass = true;
        }
        settings
    }
}
