use std::path::PathBuf;

use clap::Parser;

use iirstream::config::TapsFile;
use iirstream::{IirBlock, Taps, wav};

#[derive(Parser, Debug)]
#[command(name = "filter_wav")]
#[command(about = "Run a WAV file through a Direct Form I IIR filter", long_about = None)]
struct Args {
    /// Input WAV file
    input: PathBuf,

    /// Output WAV file
    output: PathBuf,

    /// TOML file with fftaps/fbtaps arrays
    #[arg(short, long, conflicts_with_all = ["fftaps", "fbtaps"])]
    taps: Option<PathBuf>,

    /// Comma-separated feed-forward taps
    #[arg(long, value_delimiter = ',')]
    fftaps: Vec<f64>,

    /// Comma-separated feedback taps
    #[arg(long, value_delimiter = ',')]
    fbtaps: Vec<f64>,

    /// Samples per scheduling block
    #[arg(long, default_value = "4096")]
    block_size: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let taps = match &args.taps {
        Some(path) => TapsFile::load(path)?.into_taps()?,
        None => Taps::new(args.fftaps.clone(), args.fbtaps.clone())?,
    };
    log::info!(
        "{} feed-forward, {} feedback taps",
        taps.fftaps().len(),
        taps.fbtaps().len()
    );

    let (samples, sample_rate) = wav::read_mono(&args.input)?;
    log::info!(
        "{}: {} samples at {} Hz",
        args.input.display(),
        samples.len(),
        sample_rate
    );

    let (mut block, _control) = IirBlock::with_taps(taps);

    // Feed the file through in scheduler-sized quanta, the way a streaming
    // runtime would.
    let mut filtered = vec![0.0f32; samples.len()];
    for (input, output) in samples
        .chunks(args.block_size)
        .zip(filtered.chunks_mut(args.block_size))
    {
        block.process(input, output);
    }

    wav::save_mono(&args.output, &filtered, sample_rate)?;
    println!(
        "Wrote {} filtered samples to {}",
        filtered.len(),
        args.output.display()
    );

    Ok(())
}
