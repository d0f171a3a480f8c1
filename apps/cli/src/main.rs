mod cli;
mod curve;
mod wav;

use anyhow::{bail, Result};
use clap::Parser;
use cli::{Cli, Command, CurveArgs, RenderArgs};
use kompressor_dsp::{BusLayout, ChannelSet, CompressorProcessor};
use wav::PlanarAudio;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,kompressor=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Render(args) => render(&args),
        Command::Curve(args) => curve(&args),
    }
}

/// Run a WAV file through the processor block by block
fn render(args: &RenderArgs) -> Result<()> {
    if args.block_size == 0 {
        bail!("Block size must be greater than zero");
    }
    let settings = args.params.resolve()?;
    tracing::info!("Settings: {:?}", settings);

    let mut audio = wav::read(&args.input)?;
    tracing::info!(
        "Read {}: {} channel(s), {} Hz, {} frames",
        args.input.display(),
        audio.spec.channels,
        audio.spec.sample_rate,
        audio.num_frames()
    );

    let channel_set = match audio.channels.len() {
        1 => ChannelSet::Mono,
        2 => ChannelSet::Stereo,
        n => bail!("Unsupported channel count {}: only mono and stereo files are accepted", n),
    };

    let mut processor = CompressorProcessor::new(&settings);
    processor.prepare(
        audio.spec.sample_rate as f64,
        args.block_size,
        BusLayout::new(channel_set, channel_set),
    )?;

    let input_peak = wav::peak_dbfs(&audio.channels);
    let max_reduction_db = process_audio(&mut processor, &mut audio, args.block_size);
    processor.release();

    let output_peak = wav::peak_dbfs(&audio.channels);
    wav::write(&args.output, &audio)?;

    tracing::info!(
        "Wrote {}: peak {:.2} dBFS -> {:.2} dBFS, max gain reduction {:.2} dB",
        args.output.display(),
        input_peak,
        output_peak,
        max_reduction_db
    );
    Ok(())
}

/// Process every channel in blocks of `block_size` frames
///
/// Returns the largest gain reduction applied to any sample, in dB.
fn process_audio(
    processor: &mut CompressorProcessor,
    audio: &mut PlanarAudio,
    block_size: usize,
) -> f32 {
    let num_frames = audio.num_frames();
    processor.engine_mut().reset_gain_reduction_peak();

    let mut start = 0;
    while start < num_frames {
        let end = (start + block_size).min(num_frames);
        let mut blocks: Vec<&mut [f32]> = audio
            .channels
            .iter_mut()
            .map(|channel| &mut channel[start..end])
            .collect();
        processor.process_block(&mut blocks);
        start = end;
    }
    processor.engine().max_gain_reduction_db()
}

/// Print the static transfer curve, one row per input level
fn curve(args: &CurveArgs) -> Result<()> {
    let settings = args.params.resolve()?;
    let rows = curve::curve_rows(&settings, args.from, args.to, args.step)?;

    println!("{:>10} {:>10}", "input_db", "output_db");
    for (input_db, output_db) in rows {
        println!("{:>10.2} {:>10.2}", input_db, output_db);
    }
    Ok(())
}
