//! Image decoding and PNG encoding
//!
//! Keeps file and byte handling out of the pipeline. Decoded images always
//! enter the pipeline as COLOR; results are always written as PNG so every
//! channel mode survives losslessly.

use crate::error::{Result, StudioError};
use crate::types::{ChannelMode, RasterBuffer};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use std::path::Path;

/// Suggested file name for a processed result
pub const OUTPUT_FILE_NAME: &str = "processed_image.png";

/// MIME type of every encoded result
pub const OUTPUT_MIME_TYPE: &str = "image/png";

/// Codec for pipeline inputs and outputs
pub struct ImageCodec;

impl ImageCodec {
    /// Decode an encoded image (PNG or JPEG) into a COLOR buffer
    ///
    /// # Errors
    /// - `InvalidParameter` for empty input
    /// - `Image` when the bytes are not a supported image
    pub fn decode(bytes: &[u8]) -> Result<RasterBuffer> {
        if bytes.is_empty() {
            return Err(StudioError::invalid_parameter("image data is empty"));
        }

        if let Ok(format) = image::guess_format(bytes) {
            log::debug!("Decoding {:?} image ({} bytes)", format, bytes.len());
        }
        let image = image::load_from_memory(bytes)?;
        Ok(RasterBuffer::from_dynamic_color(&image))
    }

    /// Load and decode an image file
    ///
    /// # Errors
    /// - `Io` when the file does not exist or cannot be read
    /// - `Image` when the contents are not a supported image
    ///
    /// # Examples
    /// ```rust,no_run
    /// use filter_studio::services::ImageCodec;
    ///
    /// let image = ImageCodec::load("portrait.jpg")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<RasterBuffer> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(StudioError::file_io_error(
                "read image file",
                path_ref,
                &std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
            ));
        }

        let data = std::fs::read(path_ref)
            .map_err(|e| StudioError::file_io_error("read image data", path_ref, &e))?;
        Self::decode(&data)
    }

    /// Encode a buffer as PNG, keeping its channel layout
    ///
    /// # Errors
    /// - `Image` when encoding fails
    pub fn encode_png(buffer: &RasterBuffer) -> Result<Vec<u8>> {
        let (width, height) = buffer.dimensions();
        Self::encode_png_parts(buffer.as_raw(), width, height, buffer.mode())
    }

    /// Encode raw interleaved 8-bit pixels as PNG
    ///
    /// # Errors
    /// - `InvalidParameter` when `data` does not match the dimensions and mode
    /// - `Image` when encoding fails
    pub fn encode_png_parts(
        data: &[u8],
        width: u32,
        height: u32,
        mode: ChannelMode,
    ) -> Result<Vec<u8>> {
        let expected = width as usize * height as usize * mode.channel_count();
        if data.len() != expected {
            return Err(StudioError::invalid_parameter(format!(
                "{}x{} {} needs {} bytes, got {}",
                width,
                height,
                mode,
                expected,
                data.len()
            )));
        }

        let color_type = match mode {
            ChannelMode::Gray => ExtendedColorType::L8,
            ChannelMode::Color => ExtendedColorType::Rgb8,
            ChannelMode::ColorAlpha => ExtendedColorType::Rgba8,
        };

        let mut encoded = Vec::new();
        PngEncoder::new(&mut encoded).write_image(data, width, height, color_type)?;
        Ok(encoded)
    }

    /// Write a buffer as a PNG file, creating parent directories as needed
    ///
    /// # Errors
    /// - `Io` when the directory or file cannot be written
    /// - `Image` when encoding fails
    pub fn save_png<P: AsRef<Path>>(buffer: &RasterBuffer, path: P) -> Result<()> {
        let path_ref = path.as_ref();

        if let Some(parent) = path_ref.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StudioError::file_io_error("create output directory", parent, &e)
            })?;
        }

        let encoded = Self::encode_png(buffer)?;
        std::fs::write(path_ref, encoded)
            .map_err(|e| StudioError::file_io_error("write output image", path_ref, &e))?;
        log::debug!("Saved {} to {}", buffer.describe(), path_ref.display());
        Ok(())
    }
}
