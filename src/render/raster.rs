use std::sync::Arc;

use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use crate::analysis::frames::FrameSource;
use crate::analysis::loudness::{Calibration, LoudnessMapper};
use crate::analysis::transform::SpectralTransform;
use crate::analysis::window::Window;
use crate::error::SpectrogramError;

use super::palette::ColorPalette;

pub const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    pub fft_size: usize,
    pub hop_size: usize,
    /// Vertical pixel cap; the image is never taller than `fft_size / 2`.
    pub height: usize,
    pub calibration: Calibration,
    pub parallel: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            hop_size: 880,
            height: 512,
            calibration: Calibration::FullScale,
            parallel: true,
        }
    }
}

impl RenderSettings {
    pub fn validate(&self) -> Result<(), SpectrogramError> {
        let check = |name: &'static str, value: usize, min: usize| {
            if value < min {
                Err(SpectrogramError::InvalidParameter { name, value, min })
            } else {
                Ok(())
            }
        };
        check("fft_size", self.fft_size, 2)?;
        check("hop_size", self.hop_size, 1)?;
        check("height", self.height, 1)?;

        let rows = self.image_height();
        if u32::try_from(rows).is_err() {
            return Err(SpectrogramError::TooLarge {
                name: "height",
                value: rows,
                max: u32::MAX as usize,
            });
        }
        Ok(())
    }

    /// Rows actually drawn: frequency bins above the cap are discarded.
    pub fn image_height(&self) -> usize {
        self.height.min(self.fft_size / 2)
    }
}

/// Drives framing, transform, loudness and color lookup to produce one
/// pixel column per frame.
pub struct SpectrogramRenderer {
    settings: RenderSettings,
    window: Window,
    transform: SpectralTransform,
    loudness: LoudnessMapper,
    palette: Arc<ColorPalette>,
}

impl SpectrogramRenderer {
    pub fn new(settings: RenderSettings, palette: Arc<ColorPalette>) -> Result<Self, SpectrogramError> {
        settings.validate()?;

        let window = Window::hann(settings.fft_size);
        let transform = SpectralTransform::new(settings.fft_size);
        let loudness = LoudnessMapper::new(&window, settings.calibration, palette.floor());

        log::debug!(
            "Renderer: fft_size={}, hop_size={}, energy={:.3}, reference_offset={:.2}dB, palette={} thresholds",
            settings.fft_size,
            settings.hop_size,
            window.energy(),
            loudness.reference_offset(),
            palette.len()
        );

        Ok(Self {
            settings,
            window,
            transform,
            loudness,
            palette,
        })
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn frame_count(&self, samples: &[f32]) -> usize {
        self.frames(samples).len()
    }

    pub fn render(&self, samples: &[f32], width: usize) -> RgbaImage {
        self.render_with(samples, width, || {})
    }

    /// Renders `width` columns, calling `on_column` as each one completes.
    ///
    /// Columns past the last whole frame keep the background color.
    pub fn render_with<F>(&self, samples: &[f32], width: usize, on_column: F) -> RgbaImage
    where
        F: Fn() + Sync,
    {
        let height = self.settings.image_height();
        // Image dimensions are u32; wider requests are clamped.
        let image_width = u32::try_from(width).unwrap_or(u32::MAX);
        let mut image = RgbaImage::from_pixel(image_width, height as u32, BACKGROUND);

        let frames = self.frames(samples);
        let columns = (image_width as usize).min(frames.len());
        if frames.is_empty() {
            log::warn!(
                "Input has {} samples, fewer than one {}-sample frame",
                samples.len(),
                self.settings.fft_size
            );
        } else if columns < width {
            log::warn!(
                "Only {} frames available for {} requested columns; the rest stay blank",
                columns,
                width
            );
        }

        let compute = |frame: &[f32]| {
            let column = self.column(frame, height);
            on_column();
            column
        };

        let rendered: Vec<Vec<Rgba<u8>>> = if self.settings.parallel {
            (0..columns)
                .into_par_iter()
                .filter_map(|x| frames.frame(x))
                .map(compute)
                .collect()
        } else {
            frames.iter().take(columns).map(compute).collect()
        };

        // Assembly is by column index, independent of completion order.
        for (x, column) in rendered.into_iter().enumerate() {
            for (y, color) in column.into_iter().enumerate() {
                image.put_pixel(x as u32, (height - y - 1) as u32, color);
            }
        }

        image
    }

    /// Colors for one frame, lowest bin first.
    fn column(&self, frame: &[f32], height: usize) -> Vec<Rgba<u8>> {
        let spectrum = self.transform.transform(frame, &self.window);
        spectrum
            .half()
            .iter()
            .take(height)
            .map(|&c| self.palette.lookup(self.loudness.to_dbfs(c)))
            .collect()
    }

    fn frames<'a>(&self, samples: &'a [f32]) -> FrameSource<'a> {
        FrameSource::new(samples, self.settings.fft_size, self.settings.hop_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::palette::BASE_PALETTE;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn renderer(settings: RenderSettings) -> SpectrogramRenderer {
        let palette = Arc::new(ColorPalette::refined(&BASE_PALETTE).unwrap());
        SpectrogramRenderer::new(settings, palette).unwrap()
    }

    fn small() -> RenderSettings {
        RenderSettings {
            fft_size: 256,
            hop_size: 128,
            height: 128,
            ..RenderSettings::default()
        }
    }

    fn chirp(len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let t = i as f64 / 48_000.0;
                (0.7 * (2.0 * std::f64::consts::PI * (200.0 + 4_000.0 * t) * t).sin()
                    + 0.05 * (2.0 * std::f64::consts::PI * 9_000.0 * t).cos()) as f32
            })
            .collect()
    }

    #[test]
    fn rejects_invalid_settings() {
        let palette = Arc::new(ColorPalette::refined(&BASE_PALETTE).unwrap());
        let bad = RenderSettings {
            hop_size: 0,
            ..RenderSettings::default()
        };
        assert!(matches!(
            SpectrogramRenderer::new(bad, palette.clone()),
            Err(SpectrogramError::InvalidParameter { name: "hop_size", .. })
        ));
        let bad = RenderSettings {
            fft_size: 1,
            ..RenderSettings::default()
        };
        assert!(SpectrogramRenderer::new(bad, palette).is_err());
    }

    #[test]
    fn height_is_capped_at_half_fft() {
        let r = renderer(RenderSettings {
            height: 1000,
            ..small()
        });
        let image = r.render(&chirp(4096), 4);
        assert_eq!(image.dimensions(), (4, 128));

        let r = renderer(RenderSettings {
            height: 40,
            ..small()
        });
        assert_eq!(r.render(&chirp(4096), 4).height(), 40);
    }

    #[test]
    fn silence_renders_lowest_threshold_color() {
        let r = renderer(RenderSettings::default());
        let samples = vec![0.0f32; 10_000];
        let frames = r.frame_count(&samples);
        let image = r.render(&samples, frames);
        let darkest = r.palette.thresholds()[0].color;
        assert_eq!(image.width() as usize, frames);
        assert!(image.pixels().all(|p| *p == darkest));
    }

    #[test]
    fn short_input_is_background_only() {
        let r = renderer(small());
        let samples = vec![0.9f32; 255];
        assert_eq!(r.frame_count(&samples), 0);
        let image = r.render(&samples, 3);
        assert_eq!(image.dimensions(), (3, 128));
        assert!(image.pixels().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn extra_columns_stay_black() {
        let r = renderer(small());
        // Loud noise-like signal so rendered columns are not black.
        let samples: Vec<f32> = (0..1024)
            .map(|i| if (i * 7919) % 13 < 6 { 0.8 } else { -0.8 })
            .collect();
        let frames = r.frame_count(&samples);
        assert_eq!(frames, 7);

        let image = r.render(&samples, 10);
        assert_eq!(image.width(), 10);
        for x in 0..frames as u32 {
            assert!((0..image.height()).any(|y| *image.get_pixel(x, y) != BACKGROUND));
        }
        for x in frames as u32..10 {
            assert!((0..image.height()).all(|y| *image.get_pixel(x, y) == BACKGROUND));
        }
    }

    #[test]
    fn full_scale_tone_is_brightest_at_its_row() {
        let settings = RenderSettings {
            fft_size: 2048,
            hop_size: 1024,
            height: 1024,
            ..RenderSettings::default()
        };
        let bin = 128;
        let samples: Vec<f32> = (0..8192)
            .map(|i| (2.0 * std::f64::consts::PI * bin as f64 * i as f64 / 2048.0).sin() as f32)
            .collect();
        let r = renderer(settings);
        let image = r.render(&samples, r.frame_count(&samples));
        let row = image.height() - bin - 1;
        let brightest = r.palette.brightest();
        for x in 0..image.width() {
            assert_eq!(*image.get_pixel(x, row), brightest);
        }
        // low frequencies sit at the bottom, so the top row is far from the tone
        assert_ne!(*image.get_pixel(0, 0), brightest);
    }

    #[test]
    fn deterministic_across_runs_and_threading() {
        let samples = chirp(48_000);
        let parallel = renderer(small());
        let serial = renderer(RenderSettings {
            parallel: false,
            ..small()
        });
        let width = samples.len() / 128;

        let a = parallel.render(&samples, width);
        let b = parallel.render(&samples, width);
        let c = serial.render(&samples, width);
        assert_eq!(a.as_raw(), b.as_raw());
        assert_eq!(a.as_raw(), c.as_raw());
    }

    #[test]
    fn narrow_width_keeps_leading_columns() {
        let r = renderer(small());
        let samples = chirp(8192);
        let frames = r.frame_count(&samples);
        assert_eq!(frames, 63);

        let full = r.render(&samples, frames);
        let narrow = r.render(&samples, 5);
        assert_eq!(narrow.dimensions(), (5, full.height()));
        for x in 0..5 {
            for y in 0..full.height() {
                assert_eq!(narrow.get_pixel(x, y), full.get_pixel(x, y));
            }
        }
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn rejects_height_beyond_u32() {
        let palette = Arc::new(ColorPalette::refined(&BASE_PALETTE).unwrap());
        let bad = RenderSettings {
            fft_size: 1 << 34,
            height: 1 << 33,
            ..RenderSettings::default()
        };
        assert!(matches!(
            SpectrogramRenderer::new(bad, palette),
            Err(SpectrogramError::TooLarge { name: "height", .. })
        ));
    }

    #[test]
    fn reports_every_rendered_column() {
        let r = renderer(small());
        let samples = chirp(4096);
        let done = AtomicUsize::new(0);
        r.render_with(&samples, 100, || {
            done.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(done.load(Ordering::Relaxed), r.frame_count(&samples));
    }
}
