use image::Rgba;

use crate::error::SpectrogramError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorThreshold {
    pub value: f32,
    pub color: Rgba<u8>,
}

const fn t(value: f32, r: u8, g: u8, b: u8) -> ColorThreshold {
    ColorThreshold {
        value,
        color: Rgba([r, g, b, 255]),
    }
}

/// Hand-tuned dBFS ramp: black through blue, indigo, violet, magenta, red,
/// orange and yellow to white, one step every 2.5 dB.
pub const BASE_PALETTE: [ColorThreshold; 49] = [
    t(-120.0, 0, 0, 0),
    t(-117.5, 0, 0, 17),
    t(-115.0, 0, 0, 34),
    t(-112.5, 0, 0, 51),
    t(-110.0, 0, 0, 69),
    t(-107.5, 0, 0, 86),
    t(-105.0, 0, 0, 104),
    t(-102.5, 0, 0, 121),
    t(-100.0, 0, 0, 139),
    t(-97.5, 0, 0, 155),
    t(-95.0, 0, 0, 172),
    t(-92.5, 0, 0, 188),
    t(-90.0, 0, 0, 205),
    t(-87.5, 0, 0, 218),
    t(-85.0, 0, 0, 230),
    t(-82.5, 0, 0, 242),
    t(-80.0, 0, 0, 255),
    t(-77.5, 19, 0, 223),
    t(-75.0, 38, 0, 192),
    t(-72.5, 57, 0, 161),
    t(-70.0, 75, 0, 130),
    t(-67.5, 94, 0, 150),
    t(-65.0, 112, 0, 171),
    t(-62.5, 130, 0, 191),
    t(-60.0, 148, 0, 211),
    t(-57.5, 146, 0, 193),
    t(-55.0, 144, 0, 175),
    t(-52.5, 142, 0, 157),
    t(-50.0, 139, 0, 139),
    t(-47.5, 168, 0, 104),
    t(-45.0, 197, 0, 69),
    t(-42.5, 226, 0, 34),
    t(-40.0, 255, 0, 0),
    t(-37.5, 255, 18, 0),
    t(-35.0, 255, 35, 0),
    t(-32.5, 255, 52, 0),
    t(-30.0, 255, 69, 0),
    t(-27.5, 255, 93, 0),
    t(-25.0, 255, 117, 0),
    t(-22.5, 255, 141, 0),
    t(-20.0, 255, 165, 0),
    t(-17.5, 255, 188, 0),
    t(-15.0, 255, 210, 0),
    t(-12.5, 255, 233, 0),
    t(-10.0, 255, 255, 0),
    t(-7.5, 255, 255, 64),
    t(-5.0, 255, 255, 128),
    t(-2.5, 255, 255, 192),
    t(0.0, 255, 255, 255),
];

/// Ascending dBFS thresholds mapped to colors.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorPalette {
    thresholds: Vec<ColorThreshold>,
}

impl ColorPalette {
    pub fn new(thresholds: Vec<ColorThreshold>) -> Result<Self, SpectrogramError> {
        if thresholds.is_empty() {
            return Err(SpectrogramError::EmptyPalette);
        }
        for (index, pair) in thresholds.windows(2).enumerate() {
            // `!(a < b)` also rejects NaN values.
            if !(pair[0].value < pair[1].value) {
                return Err(SpectrogramError::UnorderedPalette {
                    index: index + 1,
                    previous: pair[0].value,
                    value: pair[1].value,
                });
            }
        }
        Ok(Self { thresholds })
    }

    /// `base` with one refinement pass applied.
    pub fn refined(base: &[ColorThreshold]) -> Result<Self, SpectrogramError> {
        Ok(Self::new(base.to_vec())?.refine())
    }

    /// Inserts a midpoint threshold between every neighbouring pair,
    /// turning `k` thresholds into `2k - 1`.
    pub fn refine(&self) -> Self {
        let mut thresholds = Vec::with_capacity(self.thresholds.len() * 2 - 1);
        for pair in self.thresholds.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            thresholds.push(lo);
            thresholds.push(ColorThreshold {
                value: (lo.value + hi.value) / 2.0,
                color: interpolate(lo.color, hi.color, 0.5),
            });
        }
        // windows(2) never yields the final threshold on its own
        thresholds.extend(self.thresholds.last().copied());
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &[ColorThreshold] {
        &self.thresholds
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    /// Lowest threshold value; anything quieter renders the darkest color.
    pub fn floor(&self) -> f32 {
        self.thresholds()[0].value
    }

    pub fn brightest(&self) -> Rgba<u8> {
        self.thresholds()[self.len() - 1].color
    }

    /// Index of the first threshold at or above `dbfs`, scanning upward.
    pub fn position(&self, dbfs: f32) -> usize {
        match self.thresholds.iter().position(|t| dbfs <= t.value) {
            Some(index) => index,
            // louder than every threshold: brightest
            None => self.len() - 1,
        }
    }

    pub fn lookup(&self, dbfs: f32) -> Rgba<u8> {
        self.thresholds[self.position(dbfs)].color
    }
}

/// Per-channel linear blend, truncated toward zero. Alpha is always opaque.
fn interpolate(from: Rgba<u8>, to: Rgba<u8>, fraction: f32) -> Rgba<u8> {
    let channel = |a: u8, b: u8| (a as f32 + fraction * (b as f32 - a as f32)) as u8;
    Rgba([
        channel(from[0], to[0]),
        channel(from[1], to[1]),
        channel(from[2], to[2]),
        255,
    ])
}
