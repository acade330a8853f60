//! Filter Studio CLI Tool
//!
//! Command-line interface that applies the filter pipeline to one image.

use super::config::CliConfigBuilder;
use crate::{
    services::{ImageCodec, OUTPUT_FILE_NAME},
    tracing_config::{init_cli_tracing, TracingFormat},
    DefaultProviderFactory, PipelineExecutor, PipelineReport,
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Image filter pipeline
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "filter-studio")]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Input image file (use "-" for stdin)
    #[arg(value_name = "INPUT")]
    pub input: String,

    /// Output PNG file. Use "-" for stdout [default: processed_image.png]
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<String>,

    /// Convert to grayscale
    #[arg(long)]
    pub grayscale: bool,

    /// Gaussian blur
    #[arg(long)]
    pub blur: bool,

    /// Canny edge detection
    #[arg(long)]
    pub edges: bool,

    /// Sepia tone
    #[arg(long)]
    pub sepia: bool,

    /// Pencil sketch
    #[arg(long)]
    pub sketch: bool,

    /// Invert colors
    #[arg(long)]
    pub invert: bool,

    /// Remove the background
    #[arg(long)]
    pub remove_background: bool,

    /// Blur kernel size (odd, 1-49; even values round up) [default: 15]
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub blur_kernel: Option<i32>,

    /// Canny lower threshold (0-300) [default: 100]
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub edge_low: Option<i32>,

    /// Canny upper threshold (0-300) [default: 150]
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub edge_high: Option<i32>,

    /// Background removal provider [default: local]
    #[arg(long, value_enum)]
    pub provider: Option<CliProvider>,

    /// Background after removal: white, transparent or #RRGGBB [default: white]
    #[arg(long, value_name = "COLOR")]
    pub background: Option<String>,

    /// Path to the ONNX segmentation model for the local provider
    #[arg(long, value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// Remote matting service endpoint
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Remote request timeout in seconds [default: 60]
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// JSON configuration file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the run report as JSON to stderr
    #[arg(long)]
    pub report: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = CliLogFormat::Console)]
    pub log_format: CliLogFormat,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliProvider {
    Local,
    Remote,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliLogFormat {
    Console,
    Compact,
    #[cfg(feature = "tracing-json")]
    Json,
}

impl From<CliLogFormat> for TracingFormat {
    fn from(format: CliLogFormat) -> Self {
        match format {
            CliLogFormat::Console => TracingFormat::Console,
            CliLogFormat::Compact => TracingFormat::Compact,
            #[cfg(feature = "tracing-json")]
            CliLogFormat::Json => TracingFormat::Json,
        }
    }
}

/// Where the encoded result goes
#[derive(Debug, Clone, PartialEq, Eq)]
enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    fn from_arg(output: Option<&str>) -> Self {
        match output {
            Some("-") => Self::Stdout,
            Some(path) => Self::File(PathBuf::from(path)),
            None => Self::File(PathBuf::from(OUTPUT_FILE_NAME)),
        }
    }
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();

    init_cli_tracing(cli.verbose, cli.log_format.into())
        .context("Failed to initialize tracing")?;

    let api_key = std::env::var(super::API_KEY_ENV).ok();
    let config = CliConfigBuilder::from_cli(&cli, api_key).context("Invalid configuration")?;
    let selected = config.selection.selected();
    if selected.is_empty() {
        warn!("No filters selected, the image is written unchanged");
    }
    debug!(filters = ?selected, provider = %config.provider.kind, "configuration resolved");

    let executor = PipelineExecutor::from_config(&config, &DefaultProviderFactory)
        .context("Failed to set up background removal")?;

    let input = read_input(&cli.input)?;
    let image = ImageCodec::decode(&input).context("Failed to decode input image")?;
    info!("Loaded {} from {}", image.describe(), display_input(&cli.input));

    let target = OutputTarget::from_arg(cli.output.as_deref());
    let spinner = create_spinner(target != OutputTarget::Stdout)?;
    let result = executor.run(image, &config.selection, &config.parameters);
    spinner.finish_and_clear();
    let output = result.context("Failed to apply filters")?;

    log_report(&output.report);
    if cli.report {
        let json = serde_json::to_string_pretty(&output.report)
            .context("Failed to serialize run report")?;
        eprintln!("{}", json);
    }

    match target {
        OutputTarget::Stdout => {
            let png = ImageCodec::encode_png(&output.image).context("Failed to encode PNG")?;
            write_stdout(&png)?;
            info!("Image written to stdout");
        },
        OutputTarget::File(path) => {
            ImageCodec::save_png(&output.image, &path)
                .with_context(|| format!("Failed to save {}", path.display()))?;
            info!("Saved {} to {}", output.image.describe(), path.display());
        },
    }

    Ok(())
}

fn display_input(input: &str) -> &str {
    if input == "-" {
        "stdin"
    } else {
        input
    }
}

fn create_spinner(visible: bool) -> Result<ProgressBar> {
    if !visible {
        return Ok(ProgressBar::hidden());
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .context("Invalid spinner template")?,
    );
    spinner.set_message("Applying filters...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

fn log_report(report: &PipelineReport) {
    for record in &report.stages {
        match record.converted_from {
            Some(from) => info!(
                "  ├─ {}: {} -> {} (converted from {}) {}ms",
                record.filter, record.input_mode, record.output_mode, from, record.elapsed_ms
            ),
            None => info!(
                "  ├─ {}: {} -> {} {}ms",
                record.filter, record.input_mode, record.output_mode, record.elapsed_ms
            ),
        }
    }
    info!("  └─ Total: {}ms", report.total_ms);
}

/// Read the input image from a file or stdin
fn read_input(input: &str) -> Result<Vec<u8>> {
    if input == "-" {
        return read_stdin();
    }
    std::fs::read(input).with_context(|| format!("Failed to read input file {}", input))
}

/// Read image data from stdin
fn read_stdin() -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    io::stdin()
        .read_to_end(&mut buffer)
        .context("Failed to read image data from stdin")?;
    if buffer.is_empty() {
        anyhow::bail!("No data received from stdin");
    }
    Ok(buffer)
}

/// Write image data to stdout
fn write_stdout(data: &[u8]) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(data)
        .context("Failed to write image data to stdout")?;
    stdout.flush().context("Failed to flush stdout")?;
    Ok(())
}
