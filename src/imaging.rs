//! Collage and obscuring transforms over the prize image directories.

use crate::error::AppResult;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, RgbaImage};
use std::path::{Path, PathBuf};

/// Side length of the intermediate mosaic the obscured image is built from.
const MOSAIC_SIZE: u32 = 30;
const BLUR_SIGMA: f32 = 3.0;

/// Blur and pixelate `image_dir/name`, writing the result to
/// `hidden_dir/name` at the original dimensions. A missing or unreadable
/// source propagates as an error.
pub fn obscure_image(image_dir: &Path, hidden_dir: &Path, name: &str) -> AppResult<PathBuf> {
    let source = image_dir.join(name);
    let img = image::open(&source)?;
    let (width, height) = (img.width(), img.height());

    let obscured = img
        .blur(BLUR_SIGMA)
        .resize_exact(MOSAIC_SIZE, MOSAIC_SIZE, FilterType::Nearest)
        .resize_exact(width, height, FilterType::Nearest);

    std::fs::create_dir_all(hidden_dir)?;
    let target = hidden_dir.join(name);
    obscured.save(&target)?;
    Ok(target)
}

/// Arrange the images at `paths` into a grid of `floor(sqrt(n))` columns.
/// Missing paths are skipped, as are files that fail to load; `None` when
/// nothing could be loaded. Cell size is the first loaded image's size and
/// every image is resized to fit its cell.
pub fn compose_collage(paths: &[PathBuf]) -> AppResult<Option<RgbaImage>> {
    let mut images: Vec<DynamicImage> = Vec::new();
    for path in paths {
        if !path.exists() {
            continue;
        }
        match image::open(path) {
            Ok(img) => images.push(img),
            Err(err) => log::warn!("Skipping unreadable image {}: {err}", path.display()),
        }
    }
    if images.is_empty() {
        return Ok(None);
    }

    let count = images.len() as u32;
    let cols = (count as f64).sqrt().floor() as u32;
    let rows = count.div_ceil(cols);
    let (width, height) = (images[0].width(), images[0].height());

    let mut canvas = RgbaImage::new(cols * width, rows * height);
    for (i, img) in images.iter().enumerate() {
        let cell = img.resize_exact(width, height, FilterType::Lanczos3).to_rgba8();
        let col = i as u32 % cols;
        let row = i as u32 / cols;
        image::imageops::replace(
            &mut canvas,
            &cell,
            (col * width) as i64,
            (row * height) as i64,
        );
    }
    Ok(Some(canvas))
}

/// PNG-encode a composed collage for direct upload, no temp file involved.
pub fn encode_png(img: &RgbaImage) -> AppResult<Vec<u8>> {
    let mut buf = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buf);
    img.write_to(&mut cursor, ImageFormat::Png)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn write_test_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let path = dir.join(name);
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_obscure_keeps_dimensions_and_changes_pixels() {
        let tmp = tempfile::tempdir().unwrap();
        let image_dir = tmp.path().join("img");
        let hidden_dir = tmp.path().join("hidden_img");
        std::fs::create_dir_all(&image_dir).unwrap();
        write_test_image(&image_dir, "a.png", 100, 100);

        let target = obscure_image(&image_dir, &hidden_dir, "a.png").unwrap();
        assert_eq!(target, hidden_dir.join("a.png"));

        let original = image::open(image_dir.join("a.png")).unwrap().to_rgba8();
        let obscured = image::open(&target).unwrap().to_rgba8();
        assert_eq!(obscured.dimensions(), (100, 100));
        assert_ne!(original.as_raw(), obscured.as_raw());
    }

    #[test]
    fn test_obscure_missing_source_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let image_dir = tmp.path().join("img");
        let hidden_dir = tmp.path().join("hidden_img");
        std::fs::create_dir_all(&image_dir).unwrap();

        assert!(obscure_image(&image_dir, &hidden_dir, "missing.png").is_err());
    }

    #[test]
    fn test_collage_grid_geometry() {
        let tmp = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..5)
            .map(|i| write_test_image(tmp.path(), &format!("{i}.png"), 20, 10))
            .collect();

        // floor(sqrt(5)) = 2 columns, ceil(5 / 2) = 3 rows
        let collage = compose_collage(&paths).unwrap().unwrap();
        assert_eq!(collage.dimensions(), (2 * 20, 3 * 10));
    }

    #[test]
    fn test_collage_skips_missing_and_resizes_mismatched() {
        let tmp = tempfile::tempdir().unwrap();
        let mut paths = vec![
            write_test_image(tmp.path(), "a.png", 16, 16),
            tmp.path().join("gone.png"),
            // different dimensions get resized to the first image's cell
            write_test_image(tmp.path(), "b.png", 64, 32),
        ];
        paths.push(tmp.path().join("also_gone.png"));

        let collage = compose_collage(&paths).unwrap().unwrap();
        // 2 loaded images: floor(sqrt(2)) = 1 column, 2 rows of 16x16 cells
        assert_eq!(collage.dimensions(), (16, 32));
    }

    #[test]
    fn test_collage_of_nothing_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(compose_collage(&[]).unwrap().is_none());
        assert!(
            compose_collage(&[tmp.path().join("nope.png")])
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_encode_png_round_trips() {
        let canvas = RgbaImage::from_pixel(8, 4, image::Rgba([1, 2, 3, 255]));
        let bytes = encode_png(&canvas).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 8);
        assert_eq!(decoded.height(), 4);
    }
}
