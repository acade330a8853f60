//! Background removal providers
//!
//! The pipeline talks to background removal only through
//! [`BackgroundRemovalProvider`]. Two implementations exist:
//! - [`LocalSegmentation`]: on-device person segmentation, flat white background
//! - [`RemoteMattingService`]: HTTP matting service with color or transparent output

pub mod composite;
pub mod local;
pub mod remote;

#[cfg(feature = "tract")]
pub mod tract;

// Test utilities for provider testing
#[cfg(test)]
pub mod test_utils;

pub use self::composite::{composite, threshold_mask};
pub use self::local::{ConfidenceMask, LocalSegmentation, SegmentationModel, FOREGROUND_THRESHOLD};
pub use self::remote::RemoteMattingService;

#[cfg(feature = "tract")]
pub use self::tract::TractSegmentationModel;

use crate::config::{ProviderKind, ProviderSettings};
use crate::error::{Result, StudioError};
use crate::types::{BackgroundTarget, RasterBuffer};
use image::RgbImage;

/// Capability that separates foreground from background
pub trait BackgroundRemovalProvider: Send + Sync {
    /// Short identifier used in logs and reports
    fn name(&self) -> &'static str;

    /// Whether a transparent target produces a COLOR_ALPHA result
    fn supports_transparency(&self) -> bool;

    /// Replace or remove the background of a COLOR image
    ///
    /// # Errors
    /// - `ProviderUnavailable` when no credential or model is configured
    /// - `ProviderError` when the remote service rejects the request
    /// - `NetworkError` on transport failure
    /// - `Inference` when the local model fails
    fn remove_background(
        &self,
        image: &RgbImage,
        target: &BackgroundTarget,
    ) -> Result<RasterBuffer>;
}

/// Factory trait for creating providers from configuration
pub trait ProviderFactory: Send + Sync {
    /// Create the provider selected by `settings.kind`
    ///
    /// # Errors
    /// - `ProviderUnavailable` when the selected provider cannot be built
    fn create_provider(
        &self,
        settings: &ProviderSettings,
    ) -> Result<Box<dyn BackgroundRemovalProvider>>;

    /// Provider kinds this factory can build
    fn available_providers(&self) -> Vec<ProviderKind>;
}

/// Factory that builds the providers compiled into this crate
#[derive(Debug, Default)]
pub struct DefaultProviderFactory;

impl ProviderFactory for DefaultProviderFactory {
    fn create_provider(
        &self,
        settings: &ProviderSettings,
    ) -> Result<Box<dyn BackgroundRemovalProvider>> {
        settings.validate()?;
        match settings.kind {
            ProviderKind::Local => create_local_provider(settings),
            ProviderKind::Remote => Ok(Box::new(RemoteMattingService::from_settings(settings)?)),
        }
    }

    fn available_providers(&self) -> Vec<ProviderKind> {
        let mut kinds = Vec::new();
        if cfg!(feature = "tract") {
            kinds.push(ProviderKind::Local);
        }
        kinds.push(ProviderKind::Remote);
        kinds
    }
}

#[cfg(feature = "tract")]
fn create_local_provider(settings: &ProviderSettings) -> Result<Box<dyn BackgroundRemovalProvider>> {
    let path = settings.resolved_model_path().ok_or_else(|| {
        StudioError::provider_unavailable("no segmentation model path configured")
    })?;
    let model = TractSegmentationModel::load(&path, settings.model_input_size)?;
    Ok(Box::new(LocalSegmentation::new(Box::new(model))))
}

#[cfg(not(feature = "tract"))]
fn create_local_provider(_settings: &ProviderSettings) -> Result<Box<dyn BackgroundRemovalProvider>> {
    Err(StudioError::provider_unavailable(
        "local segmentation requires the 'tract' feature",
    ))
}
