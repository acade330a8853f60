//! Pencil-sketch effect (color dodge of the blurred negative)

use super::blur::gaussian_blur;
use image::{GrayImage, Luma};

/// Side of the Gaussian kernel applied to the inverted image
pub const SKETCH_KERNEL_SIZE: u32 = 21;

/// Dodge scale: `gray * 256 / (255 - blurred_inverse)`
const DODGE_SCALE: f32 = 256.0;

/// Pencil sketch of a GRAY image
///
/// The image is inverted, blurred with a 21x21 Gaussian, and the gray input is
/// divided by the inverse of that blur. Results saturate at 255; a zero
/// divisor yields 0.
#[must_use]
pub fn pencil_sketch(gray: &GrayImage) -> GrayImage {
    let mut inverted = gray.clone();
    for value in inverted.iter_mut() {
        *value = u8::MAX - *value;
    }
    let blurred = gaussian_blur(&inverted, SKETCH_KERNEL_SIZE);

    let (w, h) = gray.dimensions();
    GrayImage::from_fn(w, h, |x, y| {
        let Luma([g]) = *gray.get_pixel(x, y);
        let Luma([b]) = *blurred.get_pixel(x, y);
        Luma([color_dodge(g, u8::MAX - b)])
    })
}

fn color_dodge(value: u8, divisor: u8) -> u8 {
    if divisor == 0 {
        return 0;
    }
    (f32::from(value) * DODGE_SCALE / f32::from(divisor))
        .round()
        .clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_dodge() {
        assert_eq!(color_dodge(0, 0), 0);
        assert_eq!(color_dodge(200, 0), 0);
        assert_eq!(color_dodge(100, 200), 128);
        assert_eq!(color_dodge(200, 100), 255);
    }

    #[test]
    fn test_flat_midtone_becomes_white() {
        let gray = GrayImage::from_pixel(30, 30, Luma([120]));
        let sketch = pencil_sketch(&gray);
        assert!(sketch.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn test_black_stays_black() {
        let gray = GrayImage::from_pixel(10, 10, Luma([0]));
        let sketch = pencil_sketch(&gray);
        assert!(sketch.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_dark_line_survives_on_light_background() {
        let gray = GrayImage::from_fn(41, 41, |x, _| Luma([if x == 20 { 30 } else { 230 }]));
        let sketch = pencil_sketch(&gray);
        assert!(sketch.get_pixel(20, 20).0[0] < sketch.get_pixel(5, 20).0[0]);
        assert_eq!(sketch.dimensions(), (41, 41));
    }
}
