use anyhow::{Context, Result};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::SpectrogramError;

/// Normalized mono samples in [-1, 1] plus what the container declared.
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub bit_depth: BitDepth,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitDepth {
    Sixteen,
    TwentyFour,
    ThirtyTwo,
}

impl BitDepth {
    pub fn from_declared(bits: Option<u32>) -> Result<Self, SpectrogramError> {
        match bits {
            Some(16) => Ok(BitDepth::Sixteen),
            Some(24) => Ok(BitDepth::TwentyFour),
            Some(32) => Ok(BitDepth::ThirtyTwo),
            other => Err(SpectrogramError::UnsupportedBitDepth(other)),
        }
    }

    pub fn bits(&self) -> u32 {
        match self {
            BitDepth::Sixteen => 16,
            BitDepth::TwentyFour => 24,
            BitDepth::ThirtyTwo => 32,
        }
    }
}

/// Decodes `path`, rejecting anything not at `expected_sample_rate` or not
/// 16/24/32-bit. Only the first channel of a multi-channel file is kept.
pub fn decode_audio(path: &Path, expected_sample_rate: u32) -> Result<AudioData> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open audio file: {}", path.display()))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .context("Failed to probe audio format")?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .context("No audio tracks found")?;

    let track_id = track.id;
    let channels = track.codec_params.channels.map_or(1, |c| c.count());
    let sample_rate = track.codec_params.sample_rate.context("Unknown sample rate")?;

    // Validate before decoding a single packet.
    if sample_rate != expected_sample_rate {
        return Err(SpectrogramError::SampleRateMismatch {
            expected: expected_sample_rate,
            actual: sample_rate,
        }
        .into());
    }
    let bit_depth = BitDepth::from_declared(track.codec_params.bits_per_sample)?;

    if channels > 1 {
        log::warn!("Input has {} channels; using the first one only", channels);
    }

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create audio decoder")?;

    let mut all_samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();

        // Integer PCM is scaled by 2^(bits-1) during conversion to f32.
        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        let samples = sample_buf.samples();
        if channels == 1 {
            all_samples.extend_from_slice(samples);
        } else {
            all_samples.extend(samples.iter().step_by(channels));
        }
    }

    log::info!(
        "Decoded audio: {} samples, {}Hz, {}-bit, {:.1}s",
        all_samples.len(),
        sample_rate,
        bit_depth.bits(),
        all_samples.len() as f32 / sample_rate as f32
    );

    Ok(AudioData {
        samples: all_samples,
        sample_rate,
        bit_depth,
    })
}
