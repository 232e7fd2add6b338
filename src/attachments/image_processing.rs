//! Image downscaling for attachments.
//!
//! Only used when a maximum dimension is configured; otherwise image bytes
//! are sent exactly as read from disk.

use std::io::Cursor;

use image::{imageops::FilterType, DynamicImage, ImageFormat, ImageReader};
use tracing::debug;

/// Downscale an encoded image so neither side exceeds `max_dimension`.
///
/// Images already within bounds, and images the decoder does not
/// understand, are returned untouched. Resized images are re-encoded as PNG.
pub fn downscale_if_needed(data: Vec<u8>, max_dimension: u32) -> Vec<u8> {
    let img = match decode(&data) {
        Ok(img) => img,
        Err(e) => {
            debug!(error = %e, "Could not decode image for resizing, sending original bytes");
            return data;
        }
    };

    if img.width() <= max_dimension && img.height() <= max_dimension {
        return data;
    }

    let (orig_w, orig_h) = (img.width(), img.height());
    let resized = resize_to_fit(img, max_dimension);
    match encode_as_png(&resized) {
        Ok(png) => {
            debug!(
                from = %format!("{}x{}", orig_w, orig_h),
                to = %format!("{}x{}", resized.width(), resized.height()),
                "Downscaled image attachment"
            );
            png
        }
        Err(e) => {
            debug!(error = %e, "Could not re-encode resized image, sending original bytes");
            data
        }
    }
}

fn decode(data: &[u8]) -> anyhow::Result<DynamicImage> {
    Ok(ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .decode()?)
}

/// Resize image if either dimension exceeds max_pixels
///
/// Maintains aspect ratio using high-quality Lanczos3 filter.
fn resize_to_fit(img: DynamicImage, max_pixels: u32) -> DynamicImage {
    let (w, h) = (img.width(), img.height());

    if w <= max_pixels && h <= max_pixels {
        return img;
    }

    let ratio = (max_pixels as f64) / (w.max(h) as f64);
    let new_w = (((w as f64) * ratio).round() as u32).max(1);
    let new_h = (((h as f64) * ratio).round() as u32).max(1);

    img.resize(new_w, new_h, FilterType::Lanczos3)
}

/// Encode a DynamicImage as PNG bytes
fn encode_as_png(img: &DynamicImage) -> anyhow::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        encode_as_png(&DynamicImage::new_rgb8(width, height)).unwrap()
    }

    #[test]
    fn test_resize_small_image_unchanged() {
        let img = DynamicImage::new_rgb8(100, 100);
        let result = resize_to_fit(img, 1000);
        assert_eq!((result.width(), result.height()), (100, 100));
    }

    #[test]
    fn test_resize_wide_image() {
        let img = DynamicImage::new_rgb8(2000, 1000);
        let result = resize_to_fit(img, 1000);
        assert_eq!((result.width(), result.height()), (1000, 500));
    }

    #[test]
    fn test_resize_tall_image() {
        let img = DynamicImage::new_rgb8(500, 1500);
        let result = resize_to_fit(img, 1000);
        assert_eq!(result.height(), 1000);
        assert!(result.width() <= 1000);
    }

    #[test]
    fn test_downscale_keeps_small_image_bytes() {
        let original = png(64, 32);
        let result = downscale_if_needed(original.clone(), 128);
        assert_eq!(result, original);
    }

    #[test]
    fn test_downscale_large_image() {
        let result = downscale_if_needed(png(800, 400), 200);
        let decoded = decode(&result).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 100));
    }

    #[test]
    fn test_downscale_undecodable_bytes_passthrough() {
        let garbage = b"definitely not an image".to_vec();
        assert_eq!(downscale_if_needed(garbage.clone(), 10), garbage);
    }
}
