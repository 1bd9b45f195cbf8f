use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::window::Window;

/// Complex DFT coefficients of one windowed frame.
#[derive(Clone, Debug)]
pub struct Spectrum {
    coefficients: Vec<Complex<f32>>,
}

impl Spectrum {
    pub fn coefficients(&self) -> &[Complex<f32>] {
        &self.coefficients
    }

    /// Non-redundant half: bins `0 .. len/2`, Nyquist excluded.
    pub fn half(&self) -> &[Complex<f32>] {
        let all = self.coefficients();
        &all[..all.len() / 2]
    }
}

/// Forward FFT planned once and shared across frames (and threads).
pub struct SpectralTransform {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
}

impl SpectralTransform {
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        Self {
            fft: planner.plan_fft_forward(fft_size),
            fft_size,
        }
    }

    pub fn transform(&self, frame: &[f32], window: &Window) -> Spectrum {
        debug_assert_eq!(frame.len(), self.fft_size);
        debug_assert_eq!(window.coefficients().len(), self.fft_size);

        let mut buffer: Vec<Complex<f32>> = frame
            .iter()
            .zip(window.coefficients())
            .map(|(&s, &w)| Complex::new(s * w, 0.0))
            .collect();

        // Scratch is per call so concurrent workers never share it.
        let mut scratch = vec![Complex::new(0.0, 0.0); self.fft.get_inplace_scratch_len()];
        self.fft.process_with_scratch(&mut buffer, &mut scratch);

        Spectrum {
            coefficients: buffer,
        }
    }
}
