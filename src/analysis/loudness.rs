use rustfft::num_complex::Complex;

use super::window::Window;

/// How the dB reference offset is chosen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Calibration {
    /// Derive the offset from the window so a full-scale sinusoid at a bin
    /// centre reads 0 dBFS.
    FullScale,
    /// Subtract a fixed number of dB.
    Fixed(f32),
}

impl Calibration {
    pub fn from_offset(offset_db: Option<f32>) -> Self {
        offset_db.map_or(Calibration::FullScale, Calibration::Fixed)
    }

    pub fn reference_offset(&self, window: &Window) -> f32 {
        match *self {
            Calibration::FullScale => {
                let peak = window.coherent_gain() / 2.0;
                20.0 * (peak / window.energy().sqrt()).log10()
            }
            Calibration::Fixed(db) => db,
        }
    }
}

/// Converts FFT coefficients to dBFS:
/// `20·log10(|c| / sqrt(window energy)) - reference_offset`.
///
/// Results are never below `floor_db`; zero or non-finite magnitudes map
/// straight to it.
#[derive(Clone, Debug)]
pub struct LoudnessMapper {
    energy_sqrt: f32,
    reference_offset: f32,
    floor_db: f32,
}

impl LoudnessMapper {
    pub fn new(window: &Window, calibration: Calibration, floor_db: f32) -> Self {
        Self {
            energy_sqrt: window.energy().sqrt(),
            reference_offset: calibration.reference_offset(window),
            floor_db,
        }
    }

    pub fn reference_offset(&self) -> f32 {
        self.reference_offset
    }

    pub fn to_dbfs(&self, coefficient: Complex<f32>) -> f32 {
        let magnitude = coefficient.norm();
        let dbfs = 20.0 * (magnitude / self.energy_sqrt).log10() - self.reference_offset;
        if dbfs.is_finite() {
            dbfs.max(self.floor_db)
        } else {
            self.floor_db
        }
    }
}
