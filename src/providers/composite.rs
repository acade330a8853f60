//! Mask thresholding and background compositing shared by providers

use super::local::ConfidenceMask;
use crate::error::{Result, StudioError};
use crate::types::{BackgroundTarget, RasterBuffer};
use image::{GrayImage, Luma, Rgb, RgbImage, Rgba};
use imageproc::map::map_colors2;

/// Binary foreground mask: 255 where confidence is strictly above `threshold`
#[must_use]
pub fn threshold_mask(mask: &ConfidenceMask, threshold: f32) -> GrayImage {
    let (height, width) = mask.dim();
    GrayImage::from_fn(width as u32, height as u32, |x, y| {
        let foreground = mask
            .get((y as usize, x as usize))
            .is_some_and(|&confidence| confidence > threshold);
        Luma([if foreground { 255 } else { 0 }])
    })
}

/// Place the foreground of `image` over the background described by `target`
///
/// `foreground` is a single-channel mask of the same size; non-zero marks
/// foreground. A flat target yields COLOR, a transparent target yields
/// COLOR_ALPHA with the mask as alpha.
///
/// # Errors
/// - `InvalidParameter` when the mask size differs from the image size
pub fn composite(
    image: &RgbImage,
    foreground: &GrayImage,
    target: &BackgroundTarget,
) -> Result<RasterBuffer> {
    if image.dimensions() != foreground.dimensions() {
        let (iw, ih) = image.dimensions();
        let (mw, mh) = foreground.dimensions();
        return Err(StudioError::invalid_parameter(format!(
            "mask is {}x{} but image is {}x{}",
            mw, mh, iw, ih
        )));
    }

    match target.fill_color() {
        Some(fill) => Ok(RasterBuffer::Color(map_colors2(
            image,
            foreground,
            |pixel, Luma([m])| if m > 0 { pixel } else { Rgb(fill) },
        ))),
        None => Ok(RasterBuffer::ColorAlpha(map_colors2(
            image,
            foreground,
            |Rgb([r, g, b]), Luma([alpha])| Rgba([r, g, b, alpha]),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChannelMode;
    use ndarray::Array2;

    fn left_half_mask(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, _| Luma([if x < w / 2 { 255 } else { 0 }]))
    }

    #[test]
    fn test_threshold_is_strict() {
        let mask = Array2::from_shape_vec((1, 3), vec![0.2, 0.5, 0.51]).unwrap();
        let binary = threshold_mask(&mask, 0.5);
        assert_eq!(binary.dimensions(), (3, 1));
        assert_eq!(binary.as_raw(), &vec![0, 0, 255]);
    }

    #[test]
    fn test_flat_background_fill() {
        let image = RgbImage::from_pixel(4, 2, Rgb([10, 20, 30]));
        let out = composite(&image, &left_half_mask(4, 2), &BackgroundTarget::Default).unwrap();
        let RasterBuffer::Color(out) = out else {
            panic!("expected COLOR");
        };
        assert_eq!(out.get_pixel(0, 0), &Rgb([10, 20, 30]));
        assert_eq!(out.get_pixel(3, 1), &Rgb([255, 255, 255]));

        let out = composite(&image, &left_half_mask(4, 2), &BackgroundTarget::Color([0, 128, 0]))
            .unwrap();
        assert_eq!(out.as_raw().get(9..12), Some(&[0u8, 128, 0][..]));
    }

    #[test]
    fn test_transparent_background_adds_alpha() {
        let image = RgbImage::from_pixel(4, 2, Rgb([10, 20, 30]));
        let out = composite(&image, &left_half_mask(4, 2), &BackgroundTarget::Transparent).unwrap();
        assert_eq!(out.mode(), ChannelMode::ColorAlpha);
        let RasterBuffer::ColorAlpha(out) = out else {
            panic!("expected COLOR_ALPHA");
        };
        assert_eq!(out.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
        assert_eq!(out.get_pixel(3, 0).0[3], 0);
    }

    #[test]
    fn test_mask_size_mismatch() {
        let image = RgbImage::new(4, 4);
        let result = composite(&image, &GrayImage::new(2, 2), &BackgroundTarget::Default);
        assert!(matches!(result, Err(StudioError::InvalidParameter(_))));
    }
}
