//! Person segmentation model executed with Tract
//!
//! Expects a selfie-segmentation style ONNX graph: NHWC float input in
//! [0, 1] at a fixed size, one confidence value per input pixel as output.
//! The mask is resampled back to the source image size.

use super::local::{resample_mask, ConfidenceMask, SegmentationModel};
use crate::error::{Result, StudioError};
use image::imageops::{self, FilterType};
use image::RgbImage;
use instant::Instant;
use ndarray::Array2;
use std::path::{Path, PathBuf};
use tract_onnx::prelude::*;

/// Type alias for the complex Tract model type to reduce complexity warnings
type TractModel = RunnableModel<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Segmentation model loaded from an ONNX file
pub struct TractSegmentationModel {
    model: TractModel,
    path: PathBuf,
    input_width: u32,
    input_height: u32,
}

impl TractSegmentationModel {
    /// Load and optimize the model at `path` for a fixed `(width, height)` input
    ///
    /// # Errors
    /// - `ProviderUnavailable` when the file does not exist
    /// - `Inference` when the graph cannot be loaded or optimized
    pub fn load(path: &Path, input_size: (u32, u32)) -> Result<Self> {
        if !path.is_file() {
            return Err(StudioError::provider_unavailable(format!(
                "segmentation model not found at '{}'",
                path.display()
            )));
        }

        let (input_width, input_height) = input_size;
        let load_start = Instant::now();

        let model = onnx()
            .model_for_path(path)
            .map_err(|e| StudioError::inference(format!("Failed to load ONNX model: {e}")))?
            .with_input_fact(
                0,
                f32::fact([1, input_height as usize, input_width as usize, 3]).into(),
            )
            .map_err(|e| StudioError::inference(format!("Failed to set model input shape: {e}")))?
            .into_optimized()
            .map_err(|e| StudioError::inference(format!("Failed to optimize model: {e}")))?
            .into_runnable()
            .map_err(|e| {
                StudioError::inference(format!("Failed to create runnable model: {e}"))
            })?;

        log::info!(
            "Loaded segmentation model {} in {}ms",
            path.display(),
            load_start.elapsed().as_millis()
        );

        Ok(Self {
            model,
            path: path.to_path_buf(),
            input_width,
            input_height,
        })
    }

    /// Resize to the model input and lay out as NHWC floats in [0, 1]
    fn preprocess(&self, image: &RgbImage) -> Vec<f32> {
        let resized = imageops::resize(
            image,
            self.input_width,
            self.input_height,
            FilterType::Triangle,
        );
        resized
            .as_raw()
            .iter()
            .map(|&v| f32::from(v) / 255.0)
            .collect()
    }
}

impl std::fmt::Debug for TractSegmentationModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TractSegmentationModel")
            .field("path", &self.path)
            .field("input_width", &self.input_width)
            .field("input_height", &self.input_height)
            .finish()
    }
}

impl SegmentationModel for TractSegmentationModel {
    fn name(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("segmentation")
    }

    fn segment(&self, image: &RgbImage) -> Result<ConfidenceMask> {
        let (width, height) = image.dimensions();
        let (in_w, in_h) = (self.input_width as usize, self.input_height as usize);
        let inference_start = Instant::now();

        let data = self.preprocess(image);
        let input = Tensor::from_shape(&[1, in_h, in_w, 3], data.as_slice())
            .map_err(|e| StudioError::inference(format!("Failed to build input tensor: {e}")))?;

        let outputs = self
            .model
            .run(tvec![input.into()])
            .map_err(|e| StudioError::inference(format!("Tract inference failed: {e}")))?;

        let output_tensor = outputs
            .into_iter()
            .next()
            .ok_or_else(|| StudioError::inference("No output tensor found"))?
            .into_arc_tensor();
        let output_view = output_tensor.to_array_view::<f32>().map_err(|e| {
            StudioError::inference(format!("Failed to convert output tensor: {e}"))
        })?;

        // Any layout with one value per input pixel, e.g. [1, h, w, 1]
        if output_view.len() != in_w * in_h {
            return Err(StudioError::inference(format!(
                "Expected {} mask values, got shape {:?}",
                in_w * in_h,
                output_view.shape()
            )));
        }
        let values: Vec<f32> = output_view.iter().copied().collect();
        let small = Array2::from_shape_vec((in_h, in_w), values)
            .map_err(|e| StudioError::inference(format!("Failed to reshape mask: {e}")))?;

        log::debug!(
            "Segmentation inference completed in {}ms",
            inference_start.elapsed().as_millis()
        );

        Ok(resample_mask(&small, width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_is_unavailable() {
        let result = TractSegmentationModel::load(Path::new("/nonexistent/seg.onnx"), (256, 144));
        assert!(matches!(result, Err(StudioError::ProviderUnavailable(_))));
    }

    #[test]
    fn test_corrupt_model_is_inference_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.onnx");
        std::fs::write(&path, b"definitely not protobuf").unwrap();
        let result = TractSegmentationModel::load(&path, (256, 144));
        assert!(matches!(result, Err(StudioError::Inference(_))));
    }
}
