use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sonogram", about = "Render a WAV file as a spectrogram image")]
pub struct Cli {
    /// Input audio file (WAV)
    pub input: PathBuf,

    /// Output image file
    #[arg(short, long, default_value = "spectrogram.png")]
    pub output: PathBuf,

    /// Config file (defaults to ./sonogram.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// FFT window length in samples [default: 2048]
    #[arg(long)]
    pub fft_size: Option<usize>,

    /// Samples between successive frames [default: 880]
    #[arg(long)]
    pub hop_size: Option<usize>,

    /// Image width in columns [default: sample count / hop size]
    #[arg(long)]
    pub width: Option<usize>,

    /// Image height cap in pixels, at most fft_size / 2 [default: 512]
    #[arg(long)]
    pub height: Option<usize>,

    /// Fixed dB reference offset instead of full-scale calibration
    #[arg(long, allow_negative_numbers = true)]
    pub reference_offset: Option<f32>,

    /// Required input sample rate in Hz [default: 48000]
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Render columns on a single thread
    #[arg(long)]
    pub serial: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}
