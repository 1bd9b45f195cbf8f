mod analysis;
mod audio;
mod cli;
mod config;
mod encode;
mod error;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

use audio::levels::LevelStats;
use cli::Cli;
use config::{Config, RunSettings};
use render::palette::{ColorPalette, BASE_PALETTE};
use render::raster::SpectrogramRenderer;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let config = match config::find_config(cli.config.as_deref()) {
        Some(path) => match config::load_config(&path) {
            Some(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            None => {
                log::warn!("Failed to load config from {}", path.display());
                Config::default()
            }
        },
        None => Config::default(),
    };
    let settings = RunSettings::resolve(&cli, &config);

    if !cli.input.exists() {
        anyhow::bail!("Input file not found: {}", cli.input.display());
    }

    log::info!("sonogram - spectrogram renderer");
    log::info!("Input: {}", cli.input.display());
    log::info!("Output: {}", cli.output.display());

    // Palette and settings are checked before any audio work.
    let palette = Arc::new(ColorPalette::refined(&BASE_PALETTE).context("Invalid color palette")?);
    let renderer = SpectrogramRenderer::new(settings.render.clone(), palette)
        .context("Invalid render settings")?;

    // 1. Decode audio
    log::info!("Decoding audio...");
    let audio_data = audio::decode::decode_audio(&cli.input, settings.expected_sample_rate)?;
    log::debug!(
        "Input format: {}Hz, {}-bit",
        audio_data.sample_rate,
        audio_data.bit_depth.bits()
    );

    if let Some(levels) = LevelStats::measure(&audio_data.samples) {
        log::info!("DC offset   {:.6}", levels.dc_offset);
        log::info!("Min level   {:.2}", levels.min_level);
        log::info!("Max level   {:.2}", levels.max_level);
        log::info!("Pk lev dB   {:.2}", levels.peak_db);
    }

    // 2. Render
    let width = settings
        .width_for(audio_data.samples.len())
        .context("Invalid output width")?;
    let frames = renderer.frame_count(&audio_data.samples);
    log::info!(
        "Rendering {}x{} (fft_size={}, hop_size={}, {} frames available)",
        width,
        renderer.settings().image_height(),
        renderer.settings().fft_size,
        renderer.settings().hop_size,
        frames
    );

    let pb = if cli.no_progress {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(width.min(frames) as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} columns ({eta} remaining)")
            .context("Invalid progress bar template")?
            .progress_chars("=>-"),
    );

    let image = renderer.render_with(&audio_data.samples, width, || pb.inc(1));
    pb.finish_with_message("Rendering complete");

    // 3. Encode
    encode::png::write_png(&image, &cli.output)?;

    log::info!("Done! Output: {}", cli.output.display());
    Ok(())
}
