/// Whole-buffer level summary, logged before rendering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelStats {
    pub dc_offset: f32,
    pub min_level: f32,
    pub max_level: f32,
    /// `20·log10(|max_level|)`; negative infinity for silence.
    pub peak_db: f32,
}

impl LevelStats {
    pub fn measure(samples: &[f32]) -> Option<Self> {
        let first = *samples.first()?;

        let (min_level, max_level) = samples
            .iter()
            .fold((first, first), |(lo, hi), &s| (lo.min(s), hi.max(s)));
        let dc_offset = (samples.iter().map(|&s| s as f64).sum::<f64>() / samples.len() as f64) as f32;
        let peak_db = 20.0 * max_level.abs().log10();

        Some(Self {
            dc_offset,
            min_level,
            max_level,
            peak_db,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn empty_buffer_has_no_stats() {
        assert_eq!(LevelStats::measure(&[]), None);
    }

    #[test]
    fn measures_offset_and_extremes() {
        let stats = LevelStats::measure(&[0.5, -0.25, 0.25, -0.1]).unwrap();
        assert_abs_diff_eq!(stats.dc_offset, 0.1, epsilon = 1e-6);
        assert_eq!(stats.min_level, -0.25);
        assert_eq!(stats.max_level, 0.5);
        assert_abs_diff_eq!(stats.peak_db, -6.0206, epsilon = 1e-3);
    }

    #[test]
    fn silence_peaks_at_negative_infinity() {
        let stats = LevelStats::measure(&[0.0; 8]).unwrap();
        assert_eq!(stats.peak_db, f32::NEG_INFINITY);
        assert_eq!(stats.dc_offset, 0.0);
    }
}
