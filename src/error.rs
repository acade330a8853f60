//! Error types for filter pipeline operations

use crate::types::ChannelMode;
use thiserror::Error;

/// Result type alias for filter pipeline operations
pub type Result<T> = std::result::Result<T, StudioError>;

/// Error kinds reported by the pipeline, its providers and the codec
#[derive(Error, Debug)]
pub enum StudioError {
    /// A numeric parameter outside its declared range that could not be corrected
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A stage's required channel mode cannot be reached from the current one
    #[error("Unsupported conversion from {from} to {to}")]
    UnsupportedConversion { from: ChannelMode, to: ChannelMode },

    /// Background removal requested but no credential or model is configured
    #[error("Background removal provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The remote matting service answered with a non-success status
    #[error("Provider error ({code}): {message}")]
    ProviderError { code: u16, message: String },

    /// Transport-level failure reaching the remote service
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Local segmentation model failed to run
    #[error("Inference error: {0}")]
    Inference(String),

    /// Malformed configuration file or settings
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),
}

impl StudioError {
    /// Create a new invalid parameter error
    pub fn invalid_parameter<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create a new unsupported conversion error
    #[must_use]
    pub fn unsupported_conversion(from: ChannelMode, to: ChannelMode) -> Self {
        Self::UnsupportedConversion { from, to }
    }

    /// Create a new provider unavailable error
    pub fn provider_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::ProviderUnavailable(msg.into())
    }

    /// Create a new provider error from a status code and message
    pub fn provider_error<S: Into<String>>(code: u16, message: S) -> Self {
        Self::ProviderError {
            code,
            message: message.into(),
        }
    }

    /// Create a network error with operation context
    pub fn network_error<E: std::fmt::Display>(operation: &str, error: E) -> Self {
        Self::NetworkError(format!("{}: {}", operation, error))
    }

    /// Create a new inference error
    pub fn inference<S: Into<String>>(msg: S) -> Self {
        Self::Inference(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create parameter error with the valid range
    pub fn parameter_range_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
    ) -> Self {
        Self::InvalidParameter(format!(
            "{} = {} is outside the valid range {}",
            parameter, value, valid_range
        ))
    }

    /// Create inference error with stage context
    pub fn stage_error(stage: &str, details: &str, input_info: Option<&str>) -> Self {
        let input_context = match input_info {
            Some(info) => format!(" (input: {})", info),
            None => String::new(),
        };

        Self::Inference(format!(
            "Stage '{}' failed{}: {}",
            stage, input_context, details
        ))
    }

    /// Whether the error came from the background removal provider
    #[must_use]
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_)
                | Self::ProviderError { .. }
                | Self::NetworkError(_)
                | Self::Inference(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_creation() {
        let err = StudioError::invalid_parameter("kernel must be positive");
        assert!(matches!(err, StudioError::InvalidParameter(_)));

        let err = StudioError::unsupported_conversion(ChannelMode::ColorAlpha, ChannelMode::Gray);
        assert!(matches!(
            err,
            StudioError::UnsupportedConversion {
                from: ChannelMode::ColorAlpha,
                to: ChannelMode::Gray
            }
        ));
    }

    #[test]
    fn test_error_display() {
        let err = StudioError::provider_error(402, "Insufficient credits");
        assert_eq!(err.to_string(), "Provider error (402): Insufficient credits");

        let err = StudioError::unsupported_conversion(ChannelMode::Gray, ChannelMode::ColorAlpha);
        assert_eq!(
            err.to_string(),
            "Unsupported conversion from GRAY to COLOR_ALPHA"
        );
    }

    #[test]
    fn test_enhanced_error_context() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = StudioError::file_io_error("read model", Path::new("/models/seg.onnx"), &io_error);
        let error_string = err.to_string();
        assert!(error_string.contains("read model"));
        assert!(error_string.contains("/models/seg.onnx"));

        let err = StudioError::parameter_range_error("blur_kernel_size", 51, "1-49");
        let error_string = err.to_string();
        assert!(error_string.contains("blur_kernel_size"));
        assert!(error_string.contains("51"));
        assert!(error_string.contains("1-49"));

        let err = StudioError::network_error("POST matting request", "connection refused");
        assert!(matches!(err, StudioError::NetworkError(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_provider_failure_classification() {
        assert!(StudioError::provider_unavailable("no key").is_provider_failure());
        assert!(StudioError::provider_error(500, "boom").is_provider_failure());
        assert!(!StudioError::invalid_parameter("x").is_provider_failure());
    }
}
