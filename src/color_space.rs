//! Channel mode tracking and conversion between pipeline stages

use crate::error::{Result, StudioError};
use crate::filters::grayscale::luma;
use crate::types::{ChannelMode, RasterBuffer};
use image::{GrayImage, Luma, Rgb, RgbImage};

/// A conversion performed by the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    pub from: ChannelMode,
    pub to: ChannelMode,
}

/// Brings the in-flight buffer into the mode a stage requires
///
/// Only GRAY and COLOR convert into each other. COLOR_ALPHA is an output of
/// background removal and never re-enters the chain.
#[derive(Debug, Default)]
pub struct ColorSpaceTracker {
    conversions: Vec<Conversion>,
}

impl ColorSpaceTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `buffer` in `required` mode, converting into a new buffer if needed
    ///
    /// # Errors
    /// - `UnsupportedConversion` when either side is COLOR_ALPHA
    pub fn ensure(&mut self, buffer: RasterBuffer, required: ChannelMode) -> Result<RasterBuffer> {
        let current = buffer.mode();
        if current == required {
            return Ok(buffer);
        }

        let converted = convert(&buffer, required)?;
        tracing::debug!(from = %current, to = %required, "converted channel mode");
        self.conversions.push(Conversion {
            from: current,
            to: required,
        });
        Ok(converted)
    }

    /// Conversions performed so far, oldest first
    #[must_use]
    pub fn conversions(&self) -> &[Conversion] {
        &self.conversions
    }
}

/// Stateless conversion between GRAY and COLOR
///
/// # Errors
/// - `UnsupportedConversion` when either side is COLOR_ALPHA
pub fn convert(buffer: &RasterBuffer, required: ChannelMode) -> Result<RasterBuffer> {
    match (buffer, required) {
        (RasterBuffer::Gray(img), ChannelMode::Gray) => Ok(RasterBuffer::Gray(img.clone())),
        (RasterBuffer::Color(img), ChannelMode::Color) => Ok(RasterBuffer::Color(img.clone())),
        (RasterBuffer::Gray(img), ChannelMode::Color) => Ok(RasterBuffer::Color(gray_to_color(img))),
        (RasterBuffer::Color(img), ChannelMode::Gray) => Ok(RasterBuffer::Gray(color_to_gray(img))),
        (other, to) => Err(StudioError::unsupported_conversion(other.mode(), to)),
    }
}

/// Replicate the single channel into three
#[must_use]
pub fn gray_to_color(gray: &GrayImage) -> RgbImage {
    let (w, h) = gray.dimensions();
    RgbImage::from_fn(w, h, |x, y| {
        let Luma([v]) = *gray.get_pixel(x, y);
        Rgb([v, v, v])
    })
}

/// Luma-weighted reduction to one channel
#[must_use]
pub fn color_to_gray(color: &RgbImage) -> GrayImage {
    let (w, h) = color.dimensions();
    GrayImage::from_fn(w, h, |x, y| Luma([luma(*color.get_pixel(x, y))]))
}
