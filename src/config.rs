//! Configuration types for filter pipeline runs

use crate::error::{Result, StudioError};
use crate::filters::FilterKind;
use crate::types::BackgroundTarget;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Smallest accepted blur kernel side
pub const MIN_BLUR_KERNEL: i32 = 1;
/// Largest accepted blur kernel side
pub const MAX_BLUR_KERNEL: i32 = 49;
/// Largest accepted edge threshold
pub const MAX_EDGE_THRESHOLD: i32 = 300;

/// Default endpoint of the remote matting service
pub const DEFAULT_MATTING_ENDPOINT: &str = "https://api.remove.bg/v1.0/removebg";

/// Independent on/off toggles, one per filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct FilterSelection {
    pub grayscale: bool,
    pub blur: bool,
    pub edge_detect: bool,
    pub sepia: bool,
    pub sketch: bool,
    pub invert: bool,
    pub remove_background: bool,
}

impl FilterSelection {
    /// Selection with nothing enabled
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Build a selection from a list of filters; order and duplicates are irrelevant
    pub fn from_filters<I: IntoIterator<Item = FilterKind>>(filters: I) -> Self {
        filters
            .into_iter()
            .fold(Self::default(), |selection, kind| selection.with(kind))
    }

    /// Return a copy with `kind` enabled
    #[must_use]
    pub fn with(mut self, kind: FilterKind) -> Self {
        self.set(kind, true);
        self
    }

    pub fn set(&mut self, kind: FilterKind, enabled: bool) {
        match kind {
            FilterKind::Grayscale => self.grayscale = enabled,
            FilterKind::Blur => self.blur = enabled,
            FilterKind::EdgeDetect => self.edge_detect = enabled,
            FilterKind::Sepia => self.sepia = enabled,
            FilterKind::Sketch => self.sketch = enabled,
            FilterKind::Invert => self.invert = enabled,
            FilterKind::RemoveBackground => self.remove_background = enabled,
        }
    }

    #[must_use]
    pub fn is_selected(&self, kind: FilterKind) -> bool {
        match kind {
            FilterKind::Grayscale => self.grayscale,
            FilterKind::Blur => self.blur,
            FilterKind::EdgeDetect => self.edge_detect,
            FilterKind::Sepia => self.sepia,
            FilterKind::Sketch => self.sketch,
            FilterKind::Invert => self.invert,
            FilterKind::RemoveBackground => self.remove_background,
        }
    }

    /// Enabled filters in pipeline order
    #[must_use]
    pub fn selected(&self) -> Vec<FilterKind> {
        FilterKind::ALL
            .iter()
            .copied()
            .filter(|kind| self.is_selected(*kind))
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected().is_empty()
    }
}

/// Numeric parameters consumed by the filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParameters {
    /// Side of the square Gaussian kernel (odd, 1-49)
    pub blur_kernel_size: i32,
    /// Canny lower hysteresis threshold (0-300)
    pub edge_low_threshold: i32,
    /// Canny upper hysteresis threshold (0-300)
    pub edge_high_threshold: i32,
    /// Background used by background removal
    pub background: BackgroundTarget,
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            blur_kernel_size: 15,
            edge_low_threshold: 100,
            edge_high_threshold: 150,
            background: BackgroundTarget::Default,
        }
    }
}

impl FilterParameters {
    /// Validate and correct the parameters before a run
    ///
    /// Even kernel sizes are rounded up to the next odd value. Values with no
    /// safe correction are rejected.
    ///
    /// # Errors
    /// - Blur kernel size not positive or above 49 after rounding
    /// - Edge thresholds outside 0-300
    pub fn normalized(&self) -> Result<Self> {
        let mut params = *self;

        if params.blur_kernel_size < MIN_BLUR_KERNEL {
            return Err(StudioError::parameter_range_error(
                "blur_kernel_size",
                params.blur_kernel_size,
                "1-49",
            ));
        }
        if params.blur_kernel_size % 2 == 0 {
            log::debug!(
                "Rounding even blur kernel size {} up to {}",
                params.blur_kernel_size,
                params.blur_kernel_size + 1
            );
            params.blur_kernel_size += 1;
        }
        if params.blur_kernel_size > MAX_BLUR_KERNEL {
            return Err(StudioError::parameter_range_error(
                "blur_kernel_size",
                self.blur_kernel_size,
                "1-49",
            ));
        }

        for (name, value) in [
            ("edge_low_threshold", params.edge_low_threshold),
            ("edge_high_threshold", params.edge_high_threshold),
        ] {
            if !(0..=MAX_EDGE_THRESHOLD).contains(&value) {
                return Err(StudioError::parameter_range_error(name, value, "0-300"));
            }
        }

        Ok(params)
    }

    /// Kernel size as an unsigned side length; call on normalized parameters
    #[must_use]
    pub fn kernel_size(&self) -> u32 {
        self.blur_kernel_size.max(MIN_BLUR_KERNEL) as u32
    }
}

/// Which background removal implementation to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// On-device person segmentation model
    #[default]
    Local,
    /// Remote HTTP matting service
    Remote,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            other => Err(StudioError::invalid_config(format!(
                "unknown provider '{}', expected 'local' or 'remote'",
                other
            ))),
        }
    }
}

/// Settings for constructing a background removal provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub kind: ProviderKind,

    /// Credential for the remote service, supplied by the caller and never
    /// persisted
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Remote service endpoint
    pub endpoint: String,

    /// Request timeout for the remote call, in seconds
    pub timeout_secs: u64,

    /// ONNX segmentation model file (None = default cache location)
    pub model_path: Option<PathBuf>,

    /// Model input size as (width, height)
    pub model_input_size: (u32, u32),
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            api_key: None,
            endpoint: DEFAULT_MATTING_ENDPOINT.to_string(),
            timeout_secs: 60,
            model_path: None,
            model_input_size: (256, 144),
        }
    }
}

impl ProviderSettings {
    /// Default location of the local segmentation model
    #[must_use]
    pub fn default_model_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| {
            dir.join("filter-studio")
                .join("models")
                .join("selfie_segmentation.onnx")
        })
    }

    /// Configured model path, falling back to the default cache location
    #[must_use]
    pub fn resolved_model_path(&self) -> Option<PathBuf> {
        self.model_path.clone().or_else(Self::default_model_path)
    }

    /// # Errors
    /// - Empty endpoint, zero timeout or zero model input size
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(StudioError::invalid_config("endpoint must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(StudioError::invalid_config("timeout_secs must be positive"));
        }
        if self.model_input_size.0 == 0 || self.model_input_size.1 == 0 {
            return Err(StudioError::invalid_config(
                "model_input_size must be non-zero",
            ));
        }
        Ok(())
    }
}

/// Complete configuration for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub selection: FilterSelection,
    pub parameters: FilterParameters,
    pub provider: ProviderSettings,
}

impl StudioConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    ///
    /// ```rust
    /// use filter_studio::{FilterKind, StudioConfig};
    ///
    /// let config = StudioConfig::builder()
    ///     .filter(FilterKind::Grayscale)
    ///     .filter(FilterKind::Invert)
    ///     .blur_kernel_size(9)
    ///     .build()
    ///     .unwrap();
    /// assert!(config.selection.grayscale);
    /// ```
    #[must_use]
    pub fn builder() -> StudioConfigBuilder {
        StudioConfigBuilder::default()
    }

    /// Load a configuration from a JSON file
    ///
    /// # Errors
    /// - File cannot be read
    /// - Malformed JSON or failed validation
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| StudioError::file_io_error("read config file", path, &e))?;
        let config = Self::from_json_str(&contents)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse a configuration from JSON text
    ///
    /// # Errors
    /// - Malformed JSON or failed validation
    pub fn from_json_str(contents: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(contents)
            .map_err(|e| StudioError::invalid_config(format!("malformed config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// - Out-of-range filter parameters or invalid provider settings
    pub fn validate(&self) -> Result<()> {
        self.parameters.normalized()?;
        self.provider.validate()
    }
}

/// Builder for `StudioConfig`
#[derive(Debug, Default)]
pub struct StudioConfigBuilder {
    config: StudioConfig,
}

impl StudioConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn selection(mut self, selection: FilterSelection) -> Self {
        self.config.selection = selection;
        self
    }

    #[must_use]
    pub fn filter(mut self, kind: FilterKind) -> Self {
        self.config.selection.set(kind, true);
        self
    }

    #[must_use]
    pub fn parameters(mut self, parameters: FilterParameters) -> Self {
        self.config.parameters = parameters;
        self
    }

    #[must_use]
    pub fn blur_kernel_size(mut self, size: i32) -> Self {
        self.config.parameters.blur_kernel_size = size;
        self
    }

    #[must_use]
    pub fn edge_thresholds(mut self, low: i32, high: i32) -> Self {
        self.config.parameters.edge_low_threshold = low;
        self.config.parameters.edge_high_threshold = high;
        self
    }

    #[must_use]
    pub fn background(mut self, background: BackgroundTarget) -> Self {
        self.config.parameters.background = background;
        self
    }

    #[must_use]
    pub fn provider_kind(mut self, kind: ProviderKind) -> Self {
        self.config.provider.kind = kind;
        self
    }

    #[must_use]
    pub fn api_key(mut self, key: Option<String>) -> Self {
        self.config.provider.api_key = key;
        self
    }

    #[must_use]
    pub fn endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.config.provider.endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.provider.timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn model_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.provider.model_path = Some(path.into());
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    /// - Out-of-range parameters or invalid provider settings
    pub fn build(self) -> Result<StudioConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
