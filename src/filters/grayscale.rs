//! Luma-weighted grayscale conversion

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::map::map_colors;

/// ITU-R BT.601 luma weights for R, G, B
const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Luma of one RGB pixel, rounded to the nearest integer
#[must_use]
pub fn luma(pixel: Rgb<u8>) -> u8 {
    let Rgb([r, g, b]) = pixel;
    let value = LUMA_WEIGHTS[0] * f32::from(r)
        + LUMA_WEIGHTS[1] * f32::from(g)
        + LUMA_WEIGHTS[2] * f32::from(b);
    value.round().clamp(0.0, 255.0) as u8
}

/// Reduce a COLOR image to a single channel
#[must_use]
pub fn grayscale(image: &RgbImage) -> GrayImage {
    map_colors(image, |pixel| Luma([luma(pixel)]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_weights() {
        assert_eq!(luma(Rgb([255, 0, 0])), 76);
        assert_eq!(luma(Rgb([0, 255, 0])), 150);
        assert_eq!(luma(Rgb([0, 0, 255])), 29);
        assert_eq!(luma(Rgb([255, 255, 255])), 255);
        assert_eq!(luma(Rgb([0, 0, 0])), 0);
    }

    #[test]
    fn test_grayscale_keeps_dimensions() {
        let img = RgbImage::from_fn(7, 3, |x, y| Rgb([x as u8 * 30, y as u8 * 50, 10]));
        let gray = grayscale(&img);
        assert_eq!(gray.dimensions(), (7, 3));
        assert_eq!(gray.get_pixel(2, 1).0[0], luma(*img.get_pixel(2, 1)));
    }
}
