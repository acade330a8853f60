//! Ordered filter pipeline
//!
//! The application order is fixed and declared once in [`STAGES`]. A single
//! loop walks the table, skips unselected stages, brings the buffer into the
//! stage's required channel mode and applies the stage. The first failure
//! aborts the run; no partial result is returned.

use crate::color_space::{ColorSpaceTracker, Conversion};
use crate::config::{FilterParameters, FilterSelection, StudioConfig};
use crate::error::{Result, StudioError};
use crate::filters::{self, FilterKind};
use crate::providers::{BackgroundRemovalProvider, ProviderFactory};
use crate::types::{BackgroundTarget, ChannelMode, RasterBuffer};
use instant::Instant;
use serde::Serialize;
use tracing::{debug as trace_debug, info as trace_info, instrument, span, warn as trace_warn, Level};

type FilterFn = fn(RasterBuffer, &FilterParameters) -> Result<RasterBuffer>;

/// What a stage does with the buffer
#[derive(Clone, Copy)]
enum StageOp {
    /// Pure filter over the buffer
    Filter(FilterFn),
    /// Delegate to the attached provider
    RemoveBackground,
}

/// One row of the stage table
struct Stage {
    filter: FilterKind,
    /// Mode the buffer must be in before the stage runs, `None` for any
    requires: Option<ChannelMode>,
    op: StageOp,
}

/// Pipeline stages in application order
static STAGES: [Stage; 7] = [
    Stage {
        filter: FilterKind::Grayscale,
        requires: Some(ChannelMode::Color),
        op: StageOp::Filter(apply_grayscale),
    },
    Stage {
        filter: FilterKind::Blur,
        requires: Some(ChannelMode::Color),
        op: StageOp::Filter(apply_blur),
    },
    Stage {
        filter: FilterKind::EdgeDetect,
        requires: Some(ChannelMode::Gray),
        op: StageOp::Filter(apply_edge_detect),
    },
    Stage {
        filter: FilterKind::Sepia,
        requires: Some(ChannelMode::Color),
        op: StageOp::Filter(apply_sepia),
    },
    Stage {
        filter: FilterKind::Sketch,
        requires: Some(ChannelMode::Gray),
        op: StageOp::Filter(apply_sketch),
    },
    Stage {
        filter: FilterKind::Invert,
        requires: None,
        op: StageOp::Filter(apply_invert),
    },
    Stage {
        filter: FilterKind::RemoveBackground,
        requires: Some(ChannelMode::Color),
        op: StageOp::RemoveBackground,
    },
];

/// Channel mode a filter needs on entry, `None` when any mode is accepted
#[must_use]
pub fn required_mode(filter: FilterKind) -> Option<ChannelMode> {
    STAGES
        .iter()
        .find(|stage| stage.filter == filter)
        .and_then(|stage| stage.requires)
}

fn mode_mismatch(buffer: &RasterBuffer, required: ChannelMode) -> StudioError {
    StudioError::unsupported_conversion(buffer.mode(), required)
}

fn apply_grayscale(buffer: RasterBuffer, _params: &FilterParameters) -> Result<RasterBuffer> {
    match buffer {
        RasterBuffer::Color(img) => Ok(RasterBuffer::Gray(filters::grayscale(&img))),
        other => Err(mode_mismatch(&other, ChannelMode::Color)),
    }
}

fn apply_blur(buffer: RasterBuffer, params: &FilterParameters) -> Result<RasterBuffer> {
    match buffer {
        RasterBuffer::Color(img) => Ok(RasterBuffer::Color(filters::gaussian_blur(
            &img,
            params.kernel_size(),
        ))),
        other => Err(mode_mismatch(&other, ChannelMode::Color)),
    }
}

#[allow(clippy::cast_precision_loss)]
fn apply_edge_detect(buffer: RasterBuffer, params: &FilterParameters) -> Result<RasterBuffer> {
    match buffer {
        RasterBuffer::Gray(img) => Ok(RasterBuffer::Gray(filters::canny(
            &img,
            params.edge_low_threshold as f32,
            params.edge_high_threshold as f32,
        ))),
        other => Err(mode_mismatch(&other, ChannelMode::Gray)),
    }
}

fn apply_sepia(buffer: RasterBuffer, _params: &FilterParameters) -> Result<RasterBuffer> {
    match buffer {
        RasterBuffer::Color(img) => Ok(RasterBuffer::Color(filters::sepia(&img))),
        other => Err(mode_mismatch(&other, ChannelMode::Color)),
    }
}

fn apply_sketch(buffer: RasterBuffer, _params: &FilterParameters) -> Result<RasterBuffer> {
    match buffer {
        RasterBuffer::Gray(img) => Ok(RasterBuffer::Gray(filters::pencil_sketch(&img))),
        other => Err(mode_mismatch(&other, ChannelMode::Gray)),
    }
}

fn apply_invert(buffer: RasterBuffer, _params: &FilterParameters) -> Result<RasterBuffer> {
    Ok(filters::invert(buffer))
}

/// Record of one executed stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageRecord {
    pub filter: FilterKind,
    /// Mode the stage actually received
    pub input_mode: ChannelMode,
    pub output_mode: ChannelMode,
    /// Mode before the tracker converted it, if a conversion happened
    pub converted_from: Option<ChannelMode>,
    pub elapsed_ms: u64,
}

/// Summary of a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    /// Executed stages in order
    pub stages: Vec<StageRecord>,
    pub total_ms: u64,
}

impl PipelineReport {
    /// Filters that ran, in order
    #[must_use]
    pub fn applied(&self) -> Vec<FilterKind> {
        self.stages.iter().map(|record| record.filter).collect()
    }

    /// Channel mode conversions performed between stages
    #[must_use]
    pub fn conversions(&self) -> Vec<Conversion> {
        self.stages
            .iter()
            .filter_map(|record| {
                record.converted_from.map(|from| Conversion {
                    from,
                    to: record.input_mode,
                })
            })
            .collect()
    }
}

/// Final image plus the run report
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub image: RasterBuffer,
    pub report: PipelineReport,
}

impl PipelineOutput {
    #[must_use]
    pub fn into_image(self) -> RasterBuffer {
        self.image
    }
}

/// Runs the fixed filter sequence over one image
#[derive(Default)]
pub struct PipelineExecutor {
    provider: Option<Box<dyn BackgroundRemovalProvider>>,
}

impl PipelineExecutor {
    /// Executor without background removal
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor that delegates background removal to `provider`
    #[must_use]
    pub fn with_provider(provider: Box<dyn BackgroundRemovalProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// Executor for `config`, building a provider only when background
    /// removal is selected
    ///
    /// # Errors
    /// - Provider construction failures from `factory`
    pub fn from_config(config: &StudioConfig, factory: &dyn ProviderFactory) -> Result<Self> {
        if !config.selection.remove_background {
            return Ok(Self::new());
        }
        let provider = factory.create_provider(&config.provider)?;
        trace_debug!(provider = provider.name(), "background removal provider ready");
        Ok(Self::with_provider(provider))
    }

    pub fn set_provider(&mut self, provider: Box<dyn BackgroundRemovalProvider>) {
        self.provider = Some(provider);
    }

    /// Name of the attached provider, if any
    #[must_use]
    pub fn provider_name(&self) -> Option<&'static str> {
        self.provider.as_ref().map(|provider| provider.name())
    }

    /// Apply every selected filter to `image` in pipeline order
    ///
    /// Parameters are normalized before the first stage runs. An empty
    /// selection returns the input unchanged.
    ///
    /// # Errors
    /// - `InvalidParameter` for parameters that cannot be normalized
    /// - `ProviderUnavailable` when background removal is selected without a provider
    /// - `UnsupportedConversion` when a stage's mode cannot be reached
    /// - Any provider failure, unchanged
    #[instrument(
        skip(self, image, selection, params),
        fields(
            input = %image.describe(),
            filters = ?selection.selected(),
            provider = ?self.provider_name()
        )
    )]
    pub fn run(
        &self,
        image: RasterBuffer,
        selection: &FilterSelection,
        params: &FilterParameters,
    ) -> Result<PipelineOutput> {
        let params = params.normalized()?;
        if selection.remove_background && self.provider.is_none() {
            return Err(StudioError::provider_unavailable(
                "background removal selected but no provider is configured",
            ));
        }

        let total_start = Instant::now();
        let mut tracker = ColorSpaceTracker::new();
        let mut stages = Vec::new();
        let mut buffer = image;

        for stage in STAGES.iter().filter(|stage| selection.is_selected(stage.filter)) {
            let _span = span!(
                Level::DEBUG,
                "stage",
                filter = %stage.filter,
                mode = %buffer.mode()
            )
            .entered();
            let stage_start = Instant::now();
            let before = buffer.mode();

            if let Some(required) = stage.requires {
                buffer = tracker.ensure(buffer, required)?;
            }
            let input_mode = buffer.mode();

            buffer = match stage.op {
                StageOp::Filter(apply) => apply(buffer, &params),
                StageOp::RemoveBackground => self.remove_background(buffer, &params.background),
            }
            .map_err(|e| {
                trace_warn!(filter = %stage.filter, error = %e, "stage failed");
                e
            })?;

            let record = StageRecord {
                filter: stage.filter,
                input_mode,
                output_mode: buffer.mode(),
                converted_from: (before != input_mode).then_some(before),
                elapsed_ms: stage_start.elapsed().as_millis() as u64,
            };
            trace_debug!(
                filter = %record.filter,
                input_mode = %record.input_mode,
                output_mode = %record.output_mode,
                elapsed_ms = record.elapsed_ms,
                "stage complete"
            );
            stages.push(record);
        }

        let report = PipelineReport {
            stages,
            total_ms: total_start.elapsed().as_millis() as u64,
        };
        trace_info!(
            output = %buffer.describe(),
            stages = report.stages.len(),
            conversions = tracker.conversions().len(),
            total_ms = report.total_ms,
            "pipeline complete"
        );

        Ok(PipelineOutput {
            image: buffer,
            report,
        })
    }

    fn remove_background(
        &self,
        buffer: RasterBuffer,
        target: &BackgroundTarget,
    ) -> Result<RasterBuffer> {
        let provider = self.provider.as_ref().ok_or_else(|| {
            StudioError::provider_unavailable("no background removal provider attached")
        })?;
        match buffer {
            RasterBuffer::Color(img) => {
                trace_debug!(provider = provider.name(), target = %target, "removing background");
                provider.remove_background(&img, target)
            },
            other => Err(mode_mismatch(&other, ChannelMode::Color)),
        }
    }
}

impl std::fmt::Debug for PipelineExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineExecutor")
            .field("provider", &self.provider_name())
            .finish()
    }
}
