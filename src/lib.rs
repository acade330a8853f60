#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]

//! # Filter Studio
//!
//! A small image filter pipeline: grayscale, Gaussian blur, Canny edge
//! detection, sepia, pencil sketch, color inversion and background removal,
//! applied in a fixed order to a single image.
//!
//! ## Features
//!
//! - **Typed channel modes**: every buffer is GRAY, COLOR or COLOR_ALPHA and
//!   the pipeline converts between GRAY and COLOR as each filter requires
//! - **Pluggable background removal**: local person segmentation (Tract, pure
//!   Rust) or a remote matting service over HTTP
//! - **Run reports**: every run returns which stages ran, in which mode, and
//!   how long they took
//! - **CLI Integration**: optional command-line interface (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use filter_studio::{process_bytes, FilterKind, ImageCodec, StudioConfig};
//!
//! # fn example(upload: Vec<u8>) -> anyhow::Result<()> {
//! let config = StudioConfig::builder()
//!     .filter(FilterKind::Grayscale)
//!     .filter(FilterKind::EdgeDetect)
//!     .edge_thresholds(80, 160)
//!     .build()?;
//!
//! let output = process_bytes(&upload, &config)?;
//! let png = ImageCodec::encode_png(&output.image)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom providers
//!
//! ```rust
//! use filter_studio::{
//!     BackgroundRemovalProvider, BackgroundTarget, FilterKind, FilterParameters,
//!     FilterSelection, PipelineExecutor, RasterBuffer, Result,
//! };
//! use image::{Rgb, RgbImage};
//!
//! struct KeepEverything;
//!
//! impl BackgroundRemovalProvider for KeepEverything {
//!     fn name(&self) -> &'static str {
//!         "keep"
//!     }
//!     fn supports_transparency(&self) -> bool {
//!         false
//!     }
//!     fn remove_background(&self, image: &RgbImage, _: &BackgroundTarget) -> Result<RasterBuffer> {
//!         Ok(RasterBuffer::Color(image.clone()))
//!     }
//! }
//!
//! let executor = PipelineExecutor::with_provider(Box::new(KeepEverything));
//! let selection = FilterSelection::none().with(FilterKind::RemoveBackground);
//! let image = RasterBuffer::Color(RgbImage::from_pixel(4, 4, Rgb([1, 2, 3])));
//! let output = executor
//!     .run(image.clone(), &selection, &FilterParameters::default())
//!     .unwrap();
//! assert_eq!(output.image, image);
//! ```
//!
//! ### Feature Flags
//!
//! - `tract` (default): local segmentation model via Tract
//! - `cli` (default): command-line interface, spinner and log subscriber
//! - `tracing-json`: JSON log output for the CLI

#[cfg(feature = "cli")]
pub mod cli;
pub mod color_space;
pub mod config;
pub mod error;
pub mod filters;
pub mod pipeline;
pub mod providers;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;

// Public API exports
pub use color_space::{ColorSpaceTracker, Conversion};
pub use config::{
    FilterParameters, FilterSelection, ProviderKind, ProviderSettings, StudioConfig,
    StudioConfigBuilder,
};
pub use error::{Result, StudioError};
pub use filters::FilterKind;
pub use pipeline::{PipelineExecutor, PipelineOutput, PipelineReport, StageRecord};
pub use providers::{
    BackgroundRemovalProvider, DefaultProviderFactory, LocalSegmentation, ProviderFactory,
    RemoteMattingService, SegmentationModel,
};
pub use services::ImageCodec;
pub use types::{BackgroundTarget, ChannelMode, RasterBuffer};

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, TracingConfig, TracingFormat};

/// Decode `image_bytes` and run the pipeline described by `config`
///
/// A provider is only constructed when background removal is selected.
///
/// # Examples
///
/// ```rust,no_run
/// use filter_studio::{process_bytes, ImageCodec, StudioConfig, FilterKind};
///
/// # fn example(image_data: Vec<u8>) -> anyhow::Result<()> {
/// let config = StudioConfig::builder().filter(FilterKind::Sepia).build()?;
/// let output = process_bytes(&image_data, &config)?;
/// ImageCodec::save_png(&output.image, "sepia.png")?;
/// # Ok(())
/// # }
/// ```
pub fn process_bytes(image_bytes: &[u8], config: &StudioConfig) -> Result<PipelineOutput> {
    let image = ImageCodec::decode(image_bytes)?;
    process_image(image, config)
}

/// Run the pipeline described by `config` over an already decoded image
pub fn process_image(image: RasterBuffer, config: &StudioConfig) -> Result<PipelineOutput> {
    let executor = PipelineExecutor::from_config(config, &DefaultProviderFactory)?;
    executor.run(image, &config.selection, &config.parameters)
}
