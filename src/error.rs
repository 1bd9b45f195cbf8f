use thiserror::Error;

/// Configuration problems detected before any transform work starts.
#[derive(Debug, Error, PartialEq)]
pub enum SpectrogramError {
    #[error("unsupported audio bit depth: {}", describe_bits(*.0))]
    UnsupportedBitDepth(Option<u32>),

    #[error("input sample rate {actual}Hz does not match the expected {expected}Hz")]
    SampleRateMismatch { expected: u32, actual: u32 },

    #[error("invalid {name}: {value} (must be at least {min})")]
    InvalidParameter {
        name: &'static str,
        value: usize,
        min: usize,
    },

    #[error("invalid {name}: {value} (must be at most {max})")]
    TooLarge {
        name: &'static str,
        value: usize,
        max: usize,
    },

    #[error("palette thresholds must be strictly ascending (index {index}: {value} after {previous})")]
    UnorderedPalette {
        index: usize,
        previous: f32,
        value: f32,
    },

    #[error("palette must contain at least one threshold")]
    EmptyPalette,
}

fn describe_bits(bits: Option<u32>) -> String {
    match bits {
        Some(b) => format!("{} bits", b),
        None => "not declared".into(),
    }
}
