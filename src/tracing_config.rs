//! Log output for the `filter-studio` binary
//!
//! Pipeline stages, channel conversions and provider calls emit `tracing`
//! spans and events from the library; nothing is printed until the binary
//! installs a subscriber here. `log` records from the codec and model loader
//! reach the same subscriber through the `tracing-log` bridge. All output goes
//! to stderr so a PNG written to stdout stays clean.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// How log lines are rendered on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TracingFormat {
    /// Colored single-line events
    #[default]
    Console,
    /// Same layout without ANSI escapes, for CI logs and redirected stderr
    Compact,
    /// One JSON object per event, with the active stage span attached
    #[cfg(feature = "tracing-json")]
    Json,
}

impl TracingFormat {
    #[must_use]
    pub fn uses_ansi(self) -> bool {
        matches!(self, Self::Console)
    }
}

/// Filter directives for a `-v` count
///
/// Quiet runs show only this crate's per-run summary; `-v` adds stage timings
/// and conversions, `-vv` adds everything including HTTP client internals.
#[must_use]
pub fn directives_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn,filter_studio=info",
        1 => "debug",
        _ => "trace",
    }
}

/// Subscriber settings for one CLI invocation
#[derive(Debug, Default)]
pub struct TracingConfig {
    pub verbosity: u8,
    pub format: TracingFormat,
    /// Explicit `EnvFilter` directives, taking precedence over `verbosity`
    pub directives: Option<String>,
}

impl TracingConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_directives<S: Into<String>>(mut self, directives: S) -> Self {
        self.directives = Some(directives.into());
        self
    }

    /// Apply a `RUST_LOG` value; blank values leave the verbosity mapping in charge
    #[must_use]
    pub fn with_env_override(self, value: Option<String>) -> Self {
        match value {
            Some(directives) if !directives.trim().is_empty() => self.with_directives(directives),
            _ => self,
        }
    }

    /// Directives this config will install
    #[must_use]
    pub fn effective_directives(&self) -> &str {
        self.directives
            .as_deref()
            .unwrap_or_else(|| directives_for_verbosity(self.verbosity))
    }

    /// # Errors
    /// - Malformed directive string
    pub fn filter(&self) -> anyhow::Result<EnvFilter> {
        Ok(EnvFilter::try_new(self.effective_directives())?)
    }

    /// Install the global subscriber
    ///
    /// # Errors
    /// - Malformed directive string
    /// - A global subscriber is already installed
    pub fn init(self) -> anyhow::Result<()> {
        let registry = Registry::default().with(self.filter()?);

        match self.format {
            TracingFormat::Console | TracingFormat::Compact => {
                let fmt_layer = fmt::layer()
                    .with_ansi(self.format.uses_ansi())
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .compact();
                registry.with(fmt_layer).try_init()?;
            },
            #[cfg(feature = "tracing-json")]
            TracingFormat::Json => {
                let fmt_layer = fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr);
                registry.with(fmt_layer).try_init()?;
            },
        }

        Ok(())
    }
}

/// Install the CLI subscriber; `RUST_LOG` wins over `-v` when set
///
/// # Errors
/// - See [`TracingConfig::init`]
pub fn init_cli_tracing(verbosity: u8, format: TracingFormat) -> anyhow::Result<()> {
    TracingConfig::new()
        .with_verbosity(verbosity)
        .with_format(format)
        .with_env_override(std::env::var(EnvFilter::DEFAULT_ENV).ok())
        .init()
}
