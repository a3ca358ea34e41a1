//! Edge-only box blur for the chroma-key fallback path

use crate::types::AlphaMatte;

/// Softens chroma-keyed edges with a snapshot 3x3 mean
///
/// Only pixels whose alpha is strictly between fully transparent and fully
/// opaque are touched; solid regions keep their hard values. All reads come
/// from a snapshot taken before any writes, so smoothing does not compound
/// within one sweep. Border rows and columns are left as-is, matching the
/// behavior this stage replaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxBlurSmoother;

impl BoxBlurSmoother {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Smooth edge pixels into a fresh matte
    #[must_use]
    pub fn smooth(&self, matte: &AlphaMatte) -> AlphaMatte {
        let (width, height) = matte.dimensions();
        let mut output = matte.clone();
        if width < 3 || height < 3 {
            return output;
        }

        {
            let values = output.values_mut();
            for y in 1..height - 1 {
                for x in 1..width - 1 {
                    let alpha = matte.get(x, y);
                    if alpha <= 0.0 || alpha >= 1.0 {
                        continue;
                    }

                    let mut sum = 0.0f32;
                    for dy in 0..3 {
                        for dx in 0..3 {
                            sum += matte.get(x + dx - 1, y + dy - 1);
                        }
                    }

                    #[allow(clippy::indexing_slicing)] // Interior index
                    {
                        values[y as usize * width as usize + x as usize] = sum / 9.0;
                    }
                }
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matte_from(data: Vec<f32>, width: u32, height: u32) -> AlphaMatte {
        AlphaMatte::new(data, width, height)
    }

    #[test]
    fn test_solid_pixels_untouched() {
        let data = vec![
            0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0,
        ];
        let matte = matte_from(data.clone(), 3, 3);
        let smoothed = BoxBlurSmoother::new().smooth(&matte);
        // Center is fully opaque, so nothing qualifies as an edge pixel
        assert_eq!(smoothed.values(), data.as_slice());
    }

    #[test]
    fn test_edge_pixel_gets_neighborhood_mean() {
        let data = vec![
            1.0, 1.0, 1.0, //
            1.0, 0.5, 0.0, //
            0.0, 0.0, 0.0,
        ];
        let matte = matte_from(data, 3, 3);
        let smoothed = BoxBlurSmoother::new().smooth(&matte);
        let expected = (1.0 + 1.0 + 1.0 + 1.0 + 0.5 + 0.0 + 0.0 + 0.0 + 0.0) / 9.0;
        assert!((smoothed.get(1, 1) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_border_pixels_are_skipped() {
        // An edge-valued pixel on the border keeps its value
        let data = vec![
            0.5, 0.5, 0.5, //
            0.5, 1.0, 0.5, //
            0.5, 0.5, 0.5,
        ];
        let matte = matte_from(data, 3, 3);
        let smoothed = BoxBlurSmoother::new().smooth(&matte);
        assert_eq!(smoothed.get(0, 0), 0.5);
        assert_eq!(smoothed.get(1, 0), 0.5);
        assert_eq!(smoothed.get(2, 1), 0.5);
        assert_eq!(smoothed.get(1, 2), 0.5);
    }

    #[test]
    fn test_reads_from_snapshot_not_output() {
        // Two adjacent edge pixels: the second must average the first's
        // original value, not its freshly smoothed one
        let data = vec![
            0.0, 0.0, 0.0, 0.0, //
            0.0, 0.4, 0.8, 0.0, //
            0.0, 0.0, 0.0, 0.0,
        ];
        let matte = matte_from(data, 4, 3);
        let smoothed = BoxBlurSmoother::new().smooth(&matte);

        let expected_first = (0.4 + 0.8) / 9.0;
        let expected_second = (0.4 + 0.8) / 9.0;
        assert!((smoothed.get(1, 1) - expected_first).abs() < 1e-6);
        assert!((smoothed.get(2, 1) - expected_second).abs() < 1e-6);
    }

    #[test]
    fn test_tiny_matte_is_identity() {
        let matte = matte_from(vec![0.3, 0.6], 2, 1);
        let smoothed = BoxBlurSmoother::new().smooth(&matte);
        assert_eq!(smoothed.values(), matte.values());
    }
}
