//! Sepia tone via a fixed color-mixing matrix

use image::{Rgb, RgbImage};
use imageproc::map::map_colors;

/// Rows produce R', G', B' from (R, G, B)
///
/// The blue input carries the large coefficient in each row, so saturated
/// reds darken and saturated blues warm up.
pub const SEPIA_MATRIX: [[f32; 3]; 3] = [
    [0.189, 0.769, 0.393],
    [0.168, 0.686, 0.349],
    [0.131, 0.534, 0.272],
];

/// Apply the sepia matrix to every pixel, clamping each channel to [0, 255]
#[must_use]
pub fn sepia(image: &RgbImage) -> RgbImage {
    map_colors(image, sepia_pixel)
}

fn sepia_pixel(pixel: Rgb<u8>) -> Rgb<u8> {
    let input = pixel.0.map(f32::from);
    let mix = |row: [f32; 3]| -> u8 {
        let value = row[0] * input[0] + row[1] * input[1] + row[2] * input[2];
        value.round().clamp(0.0, 255.0) as u8
    };
    Rgb(SEPIA_MATRIX.map(mix))
}
