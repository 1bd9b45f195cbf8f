/// Hann taper with its precomputed sums.
#[derive(Clone, Debug)]
pub struct Window {
    coefficients: Vec<f32>,
    energy: f32,
    coherent_gain: f32,
}

impl Window {
    /// Symmetric Hann window: `0.5 * (1 - cos(2πi / (size - 1)))`.
    pub fn hann(size: usize) -> Self {
        debug_assert!(size >= 2, "Hann window needs at least two points");
        let coefficients: Vec<f32> = (0..size)
            .map(|i| {
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos())
            })
            .collect();

        // Accumulate in f64; the sums run over thousands of terms.
        let energy = coefficients.iter().map(|&w| (w as f64) * (w as f64)).sum::<f64>() as f32;
        let coherent_gain = coefficients.iter().map(|&w| w as f64).sum::<f64>() as f32;

        Self {
            coefficients,
            energy,
            coherent_gain,
        }
    }

    pub fn coefficients(&self) -> &[f32] {
        &self.coefficients
    }

    /// Sum of squared coefficients.
    pub fn energy(&self) -> f32 {
        self.energy
    }

    /// Sum of coefficients. A unit sinusoid at a bin centre peaks at half this.
    pub fn coherent_gain(&self) -> f32 {
        self.coherent_gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn length_matches_size() {
        assert_eq!(Window::hann(1024).coefficients().len(), 1024);
        let pair = Window::hann(2);
        assert_abs_diff_eq!(pair.coefficients()[0], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(pair.coefficients()[1], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn endpoints_are_zero_and_centre_is_one() {
        let w = Window::hann(101);
        assert_abs_diff_eq!(w.coefficients()[0], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(w.coefficients()[100], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(w.coefficients()[50], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn symmetric() {
        let w = Window::hann(256);
        let c = w.coefficients();
        for i in 0..128 {
            assert_abs_diff_eq!(c[i], c[255 - i], epsilon = 1e-5);
        }
    }

    #[test]
    fn energy_for_2048_points() {
        let w = Window::hann(2048);
        assert_abs_diff_eq!(w.energy(), 767.0, epsilon = 1.0);
        let direct: f32 = w.coefficients().iter().map(|c| c * c).sum();
        assert_abs_diff_eq!(w.energy(), direct, epsilon = 0.1);
    }

    #[test]
    fn coherent_gain_is_about_half_the_length() {
        let w = Window::hann(2048);
        assert_abs_diff_eq!(w.coherent_gain(), 1023.5, epsilon = 0.1);
    }
}
