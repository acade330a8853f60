//! On-device background removal via person segmentation

use super::composite::{composite, threshold_mask};
use super::BackgroundRemovalProvider;
use crate::error::{Result, StudioError};
use crate::types::{BackgroundTarget, RasterBuffer};
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma, RgbImage};
use ndarray::Array2;

/// Per-pixel foreground confidence in [0, 1], indexed `[[y, x]]`
pub type ConfidenceMask = Array2<f32>;

/// Pixels with confidence strictly above this value are foreground
pub const FOREGROUND_THRESHOLD: f32 = 0.5;

/// A model that estimates foreground confidence for every pixel
pub trait SegmentationModel: Send + Sync {
    fn name(&self) -> &str;

    /// Confidence mask with the same height and width as `image`
    ///
    /// # Errors
    /// - `Inference` when the model cannot run
    fn segment(&self, image: &RgbImage) -> Result<ConfidenceMask>;
}

/// Segmentation-backed provider
///
/// Always composites onto flat white; other targets are logged and ignored.
pub struct LocalSegmentation {
    model: Box<dyn SegmentationModel>,
}

impl LocalSegmentation {
    #[must_use]
    pub fn new(model: Box<dyn SegmentationModel>) -> Self {
        Self { model }
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        self.model.name()
    }
}

impl std::fmt::Debug for LocalSegmentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSegmentation")
            .field("model", &self.model.name())
            .finish()
    }
}

impl BackgroundRemovalProvider for LocalSegmentation {
    fn name(&self) -> &'static str {
        "local"
    }

    fn supports_transparency(&self) -> bool {
        false
    }

    fn remove_background(
        &self,
        image: &RgbImage,
        target: &BackgroundTarget,
    ) -> Result<RasterBuffer> {
        if *target != BackgroundTarget::Default {
            log::warn!(
                "Local segmentation only supports a white background, ignoring '{}'",
                target
            );
        }

        let mask = self.model.segment(image)?;
        let (width, height) = image.dimensions();
        if mask.dim() != (height as usize, width as usize) {
            return Err(StudioError::stage_error(
                "remove_background",
                &format!(
                    "model '{}' returned a {:?} mask",
                    self.model.name(),
                    mask.dim()
                ),
                Some(&format!("{}x{}", width, height)),
            ));
        }

        let foreground = threshold_mask(&mask, FOREGROUND_THRESHOLD);
        log::debug!(
            "Segmentation kept {} of {} pixels",
            foreground.pixels().filter(|p| p.0[0] > 0).count(),
            width as usize * height as usize
        );
        composite(image, &foreground, &BackgroundTarget::Default)
    }
}

/// Resample a confidence mask to `width` x `height` with a triangle filter
///
/// Values are clamped to [0, 1] by the `f32` luma buffer the resize runs on.
#[must_use]
pub fn resample_mask(mask: &ConfidenceMask, width: u32, height: u32) -> ConfidenceMask {
    let (src_h, src_w) = mask.dim();
    let (dst_w, dst_h) = (width as usize, height as usize);
    let empty = || Array2::zeros((dst_h, dst_w));
    if (src_h, src_w) == (dst_h, dst_w) {
        return mask.clone();
    }
    if src_h == 0 || src_w == 0 || dst_h == 0 || dst_w == 0 {
        return empty();
    }

    let Some(source) = ImageBuffer::<Luma<f32>, Vec<f32>>::from_raw(
        src_w as u32,
        src_h as u32,
        mask.iter().copied().collect(),
    ) else {
        return empty();
    };
    let resized = imageops::resize(&source, width, height, FilterType::Triangle);
    Array2::from_shape_vec((dst_h, dst_w), resized.into_raw()).unwrap_or_else(|_| empty())
}
