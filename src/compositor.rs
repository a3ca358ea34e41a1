//! Alpha channel application to RGBA image buffers

use crate::error::{MatteError, Result};
use crate::types::AlphaMatte;
use image::{ImageBuffer, Rgb, RgbImage, RgbaImage};

/// Writes resolved alpha mattes into caller-visible image buffers
///
/// This is the only component that mutates the caller's image; every
/// upstream stage works on scratch buffers. Color channels are never
/// touched by the alpha write.
pub struct Compositor;

impl Compositor {
    /// Overwrite the image's alpha channel with the matte
    ///
    /// # Errors
    /// - `DimensionMismatch` if matte and image dimensions differ; the
    ///   image is left untouched
    pub fn apply(image: &mut RgbaImage, matte: &AlphaMatte) -> Result<()> {
        if image.dimensions() != matte.dimensions() {
            return Err(MatteError::dimension_mismatch(
                image.dimensions(),
                matte.dimensions(),
            ));
        }

        for (pixel, &alpha) in image.pixels_mut().zip(matte.values().iter()) {
            pixel[3] = (alpha * 255.0).round().clamp(0.0, 255.0) as u8;
        }

        Ok(())
    }

    /// Flatten the matted image onto a solid background color
    ///
    /// For callers targeting alpha-less outputs: each channel blends
    /// `foreground * alpha + background * (1 - alpha)`.
    ///
    /// # Errors
    /// - `DimensionMismatch` if matte and image dimensions differ
    pub fn flatten_onto(
        image: &RgbaImage,
        matte: &AlphaMatte,
        background: [u8; 3],
    ) -> Result<RgbImage> {
        if image.dimensions() != matte.dimensions() {
            return Err(MatteError::dimension_mismatch(
                image.dimensions(),
                matte.dimensions(),
            ));
        }

        let (width, height) = image.dimensions();
        let mut output: RgbImage = ImageBuffer::new(width, height);

        for (x, y, pixel) in image.enumerate_pixels() {
            let alpha = matte.get(x, y);
            let inv_alpha = 1.0 - alpha;

            let blend = |fg: u8, bg: u8| -> u8 {
                (f32::from(fg) * alpha + f32::from(bg) * inv_alpha)
                    .round()
                    .clamp(0.0, 255.0) as u8
            };

            output.put_pixel(
                x,
                y,
                Rgb([
                    blend(pixel[0], background[0]),
                    blend(pixel[1], background[1]),
                    blend(pixel[2], background[2]),
                ]),
            );
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 40) as u8, (y * 40) as u8, 200, 255])
        })
    }

    #[test]
    fn test_apply_writes_only_alpha() {
        let mut image = gradient_image(4, 4);
        let original = image.clone();
        let matte = AlphaMatte::new(
            (0..16).map(|i| (i as f32) / 15.0).collect(),
            4,
            4,
        );

        Compositor::apply(&mut image, &matte).unwrap();

        for (before, after) in original.pixels().zip(image.pixels()) {
            assert_eq!(before[0], after[0]);
            assert_eq!(before[1], after[1]);
            assert_eq!(before[2], after[2]);
        }
        assert_eq!(image.get_pixel(0, 0)[3], 0);
        assert_eq!(image.get_pixel(3, 3)[3], 255);
    }

    #[test]
    fn test_apply_opaque_matte_preserves_rgb_bytes() {
        let mut image = gradient_image(5, 3);
        let original_raw = image.as_raw().clone();
        let matte = AlphaMatte::new(vec![1.0; 15], 5, 3);

        Compositor::apply(&mut image, &matte).unwrap();

        // Input alpha was already 255 everywhere, so the whole buffer
        // must come through bit-identical
        assert_eq!(image.as_raw(), &original_raw);
    }

    #[test]
    fn test_apply_rejects_mismatched_dimensions() {
        let mut image = gradient_image(4, 4);
        let original = image.clone();
        let matte = AlphaMatte::new(vec![0.5; 6], 3, 2);

        let err = Compositor::apply(&mut image, &matte).unwrap_err();
        assert!(matches!(err, MatteError::DimensionMismatch { .. }));
        // Failed composite leaves the image untouched
        assert_eq!(image.as_raw(), original.as_raw());
    }

    #[test]
    fn test_flatten_onto_background() {
        let image = RgbaImage::from_pixel(2, 1, Rgba([200, 100, 0, 255]));
        let matte = AlphaMatte::new(vec![1.0, 0.0], 2, 1);

        let flat = Compositor::flatten_onto(&image, &matte, [10, 20, 30]).unwrap();

        assert_eq!(flat.get_pixel(0, 0), &Rgb([200, 100, 0]));
        assert_eq!(flat.get_pixel(1, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_flatten_blends_partial_alpha() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]));
        let matte = AlphaMatte::new(vec![0.5], 1, 1);

        let flat = Compositor::flatten_onto(&image, &matte, [0, 0, 0]).unwrap();
        assert_eq!(flat.get_pixel(0, 0), &Rgb([128, 128, 128]));
    }
}
