//! Core types for the filter pipeline

use crate::error::{Result, StudioError};
use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number and meaning of the per-pixel channels of a [`RasterBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelMode {
    /// Single intensity channel (grayscale image or edge map)
    Gray,
    /// Three color channels, RGB order
    Color,
    /// Three color channels plus transparency, RGBA order
    ColorAlpha,
}

impl ChannelMode {
    /// Number of 8-bit channels per pixel
    #[must_use]
    pub fn channel_count(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Color => 3,
            Self::ColorAlpha => 4,
        }
    }
}

impl fmt::Display for ChannelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gray => write!(f, "GRAY"),
            Self::Color => write!(f, "COLOR"),
            Self::ColorAlpha => write!(f, "COLOR_ALPHA"),
        }
    }
}

/// The in-flight image buffer
///
/// Each variant owns an 8-bit image whose channel count matches the mode, so
/// the declared mode can never drift from the actual pixel layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RasterBuffer {
    Gray(GrayImage),
    Color(RgbImage),
    ColorAlpha(RgbaImage),
}

impl RasterBuffer {
    #[must_use]
    pub fn mode(&self) -> ChannelMode {
        match self {
            Self::Gray(_) => ChannelMode::Gray,
            Self::Color(_) => ChannelMode::Color,
            Self::ColorAlpha(_) => ChannelMode::ColorAlpha,
        }
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Gray(img) => img.dimensions(),
            Self::Color(img) => img.dimensions(),
            Self::ColorAlpha(img) => img.dimensions(),
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.dimensions().0
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.dimensions().1
    }

    /// Raw interleaved channel data, row-major
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        match self {
            Self::Gray(img) => img.as_raw(),
            Self::Color(img) => img.as_raw(),
            Self::ColorAlpha(img) => img.as_raw(),
        }
    }

    /// Build a COLOR buffer from any decoded image, dropping alpha if present
    #[must_use]
    pub fn from_dynamic_color(image: &DynamicImage) -> Self {
        Self::Color(image.to_rgb8())
    }

    /// Convert into a `DynamicImage` that keeps the channel layout
    #[must_use]
    pub fn into_dynamic(self) -> DynamicImage {
        match self {
            Self::Gray(img) => DynamicImage::ImageLuma8(img),
            Self::Color(img) => DynamicImage::ImageRgb8(img),
            Self::ColorAlpha(img) => DynamicImage::ImageRgba8(img),
        }
    }

    /// Short description used in log fields and error context
    #[must_use]
    pub fn describe(&self) -> String {
        let (w, h) = self.dimensions();
        format!("{}x{} {}", w, h, self.mode())
    }
}

impl From<GrayImage> for RasterBuffer {
    fn from(img: GrayImage) -> Self {
        Self::Gray(img)
    }
}

impl From<RgbImage> for RasterBuffer {
    fn from(img: RgbImage) -> Self {
        Self::Color(img)
    }
}

impl From<RgbaImage> for RasterBuffer {
    fn from(img: RgbaImage) -> Self {
        Self::ColorAlpha(img)
    }
}

/// What background removal puts behind the foreground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundTarget {
    /// Provider default: flat white
    #[default]
    Default,
    /// Flat RGB color
    Color([u8; 3]),
    /// Transparent background, output gains an alpha channel
    Transparent,
}

impl BackgroundTarget {
    pub const WHITE: [u8; 3] = [255, 255, 255];

    /// Flat fill color, `None` when transparency was requested
    #[must_use]
    pub fn fill_color(&self) -> Option<[u8; 3]> {
        match self {
            Self::Default => Some(Self::WHITE),
            Self::Color(rgb) => Some(*rgb),
            Self::Transparent => None,
        }
    }

    /// Six lowercase hex digits for the fill color, `None` for transparent
    #[must_use]
    pub fn to_hex(&self) -> Option<String> {
        self.fill_color()
            .map(|[r, g, b]| format!("{:02x}{:02x}{:02x}", r, g, b))
    }
}

impl fmt::Display for BackgroundTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "white"),
            Self::Color([r, g, b]) => write!(f, "#{:02x}{:02x}{:02x}", r, g, b),
            Self::Transparent => write!(f, "transparent"),
        }
    }
}

impl FromStr for BackgroundTarget {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim().to_ascii_lowercase();
        match value.as_str() {
            "" | "white" | "default" | "none" => Ok(Self::Default),
            "transparent" => Ok(Self::Transparent),
            other => {
                let hex = other.strip_prefix('#').unwrap_or(other);
                if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(StudioError::invalid_parameter(format!(
                        "background must be 'white', 'transparent' or a 6-digit hex color, got '{}'",
                        s
                    )));
                }
                let channel = |range: std::ops::Range<usize>| {
                    hex.get(range)
                        .and_then(|digits| u8::from_str_radix(digits, 16).ok())
                        .ok_or_else(|| {
                            StudioError::invalid_parameter(format!("malformed hex color '{}'", s))
                        })
                };
                Ok(Self::Color([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
            },
        }
    }
}
