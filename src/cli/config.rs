//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, CliProvider};
use crate::{BackgroundTarget, FilterKind, ProviderKind, StudioConfig};
use anyhow::{Context, Result};

/// Environment variable holding the remote service credential
pub const API_KEY_ENV: &str = "FILTER_STUDIO_API_KEY";

/// Convert CLI arguments to a validated `StudioConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build the configuration: config file first, then flags on top
    pub(crate) fn from_cli(cli: &Cli, api_key: Option<String>) -> Result<StudioConfig> {
        let mut config = match &cli.config {
            Some(path) => StudioConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?,
            None => StudioConfig::default(),
        };

        for (enabled, kind) in [
            (cli.grayscale, FilterKind::Grayscale),
            (cli.blur, FilterKind::Blur),
            (cli.edges, FilterKind::EdgeDetect),
            (cli.sepia, FilterKind::Sepia),
            (cli.sketch, FilterKind::Sketch),
            (cli.invert, FilterKind::Invert),
            (cli.remove_background, FilterKind::RemoveBackground),
        ] {
            if enabled {
                config.selection.set(kind, true);
            }
        }

        let params = &mut config.parameters;
        if let Some(size) = cli.blur_kernel {
            params.blur_kernel_size = size;
        }
        if let Some(low) = cli.edge_low {
            params.edge_low_threshold = low;
        }
        if let Some(high) = cli.edge_high {
            params.edge_high_threshold = high;
        }
        if let Some(background) = &cli.background {
            params.background = background
                .parse::<BackgroundTarget>()
                .context("Invalid --background")?;
        }

        let provider = &mut config.provider;
        if let Some(kind) = cli.provider {
            provider.kind = match kind {
                CliProvider::Local => ProviderKind::Local,
                CliProvider::Remote => ProviderKind::Remote,
            };
        }
        if let Some(model) = &cli.model {
            provider.model_path = Some(model.clone());
        }
        if let Some(endpoint) = &cli.endpoint {
            provider.endpoint.clone_from(endpoint);
        }
        if let Some(timeout) = cli.timeout {
            provider.timeout_secs = timeout;
        }
        provider.api_key = api_key;

        config.validate().context("Invalid parameters")?;
        Ok(config)
    }
}
