use anyhow::{Context, Result};
use image::{ImageFormat, RgbaImage};
use std::path::Path;

pub fn write_png(image: &RgbaImage, path: &Path) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        anyhow::bail!(
            "Nothing to encode: spectrogram is {}x{} (input too short for a single column?)",
            image.width(),
            image.height()
        );
    }

    image
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("Failed to write image: {}", path.display()))?;

    log::info!("Wrote {}x{} PNG to {}", image.width(), image.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn writes_readable_png() {
        let path = std::env::temp_dir().join(format!("sonogram-{}.png", std::process::id()));
        let mut image = RgbaImage::from_pixel(3, 2, Rgba([0, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([255, 165, 0, 255]));

        write_png(&image, &path).unwrap();
        let back = image::open(&path).unwrap().to_rgba8();
        std::fs::remove_file(&path).ok();

        assert_eq!(back.as_raw(), image.as_raw());
    }

    #[test]
    fn refuses_empty_image() {
        let path = std::env::temp_dir().join("sonogram-empty.png");
        let image = RgbaImage::new(0, 4);
        assert!(write_png(&image, &path).is_err());
        assert!(!path.exists());
    }
}
