//! Test utilities and mock providers
//!
//! Mock implementations of [`BackgroundRemovalProvider`] and
//! [`SegmentationModel`] so pipeline behavior can be tested without a model
//! file or network access.

use super::composite::composite;
use super::local::{ConfidenceMask, SegmentationModel};
use super::BackgroundRemovalProvider;
use crate::error::{Result, StudioError};
use crate::types::{BackgroundTarget, RasterBuffer};
use image::{GrayImage, Luma, RgbImage};
use ndarray::Array2;
use std::sync::{Arc, Mutex};

/// Mock provider that keeps the left half of the image as foreground
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    /// Call history for verification in tests
    call_history: Arc<Mutex<Vec<String>>>,
    /// Error to simulate, if any
    failure: Option<MockFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Unavailable,
    Rejected(u16),
    Network,
}

impl MockProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock provider that fails every call
    #[must_use]
    pub fn failing(failure: MockFailure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }

    /// Shared handle to the call history, usable after the provider is boxed
    #[must_use]
    pub fn history(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.call_history)
    }

    pub fn get_call_history(&self) -> Vec<String> {
        self.call_history.lock().unwrap().clone()
    }

    fn record_call(&self, call: String) {
        if let Ok(mut history) = self.call_history.lock() {
            history.push(call);
        }
    }
}

impl BackgroundRemovalProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn supports_transparency(&self) -> bool {
        true
    }

    fn remove_background(
        &self,
        image: &RgbImage,
        target: &BackgroundTarget,
    ) -> Result<RasterBuffer> {
        let (w, h) = image.dimensions();
        self.record_call(format!("remove_background({}x{}, {})", w, h, target));

        match self.failure {
            Some(MockFailure::Unavailable) => {
                Err(StudioError::provider_unavailable("mock provider has no credential"))
            },
            Some(MockFailure::Rejected(code)) => {
                Err(StudioError::provider_error(code, "mock rejection"))
            },
            Some(MockFailure::Network) => {
                Err(StudioError::network_error("mock request", "connection refused"))
            },
            None => {
                let mask = GrayImage::from_fn(w, h, |x, _| Luma([if x < w / 2 { 255 } else { 0 }]));
                composite(image, &mask, target)
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MaskPattern {
    LeftHalf,
    Shape(usize, usize),
    Failing,
}

/// Segmentation model returning a fixed pattern
#[derive(Debug, Clone)]
pub struct FixedSegmentationModel {
    pattern: MaskPattern,
}

impl FixedSegmentationModel {
    /// Confidence 0.9 on the left half, 0.1 on the right
    #[must_use]
    pub fn left_half() -> Self {
        Self {
            pattern: MaskPattern::LeftHalf,
        }
    }

    /// Always return a `width` x `height` mask regardless of input size
    #[must_use]
    pub fn with_shape(width: usize, height: usize) -> Self {
        Self {
            pattern: MaskPattern::Shape(width, height),
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            pattern: MaskPattern::Failing,
        }
    }
}

impl SegmentationModel for FixedSegmentationModel {
    fn name(&self) -> &str {
        "fixed"
    }

    fn segment(&self, image: &RgbImage) -> Result<ConfidenceMask> {
        let (w, h) = (image.width() as usize, image.height() as usize);
        match self.pattern {
            MaskPattern::LeftHalf => Ok(Array2::from_shape_fn((h, w), |(_, x)| {
                if x < w / 2 {
                    0.9
                } else {
                    0.1
                }
            })),
            MaskPattern::Shape(mw, mh) => Ok(Array2::from_elem((mh, mw), 1.0)),
            MaskPattern::Failing => Err(StudioError::inference("mock segmentation failure")),
        }
    }
}
