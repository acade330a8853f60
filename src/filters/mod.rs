//! Stateless image filters
//!
//! Every filter is a pure function over a typed `image` buffer. The channel
//! mode each one expects is declared in the pipeline's stage table; the
//! functions here assume their input already has that mode.

pub mod blur;
pub mod edge;
pub mod grayscale;
pub mod invert;
pub mod sepia;
pub mod sketch;

pub use blur::{gaussian_blur, gaussian_kernel};
pub use edge::canny;
pub use grayscale::grayscale;
pub use invert::invert;
pub use sepia::sepia;
pub use sketch::pencil_sketch;

use crate::error::StudioError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every transform the pipeline can apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Grayscale,
    Blur,
    EdgeDetect,
    Sepia,
    Sketch,
    Invert,
    RemoveBackground,
}

impl FilterKind {
    /// All filters in the fixed application order
    pub const ALL: [FilterKind; 7] = [
        FilterKind::Grayscale,
        FilterKind::Blur,
        FilterKind::EdgeDetect,
        FilterKind::Sepia,
        FilterKind::Sketch,
        FilterKind::Invert,
        FilterKind::RemoveBackground,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::Blur => "blur",
            Self::EdgeDetect => "edge_detect",
            Self::Sepia => "sepia",
            Self::Sketch => "sketch",
            Self::Invert => "invert",
            Self::RemoveBackground => "remove_background",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "grayscale" | "gray" => Ok(Self::Grayscale),
            "blur" => Ok(Self::Blur),
            "edge_detect" | "edges" | "canny" => Ok(Self::EdgeDetect),
            "sepia" => Ok(Self::Sepia),
            "sketch" | "pencil_sketch" => Ok(Self::Sketch),
            "invert" => Ok(Self::Invert),
            "remove_background" | "remove_bg" => Ok(Self::RemoveBackground),
            _ => Err(StudioError::invalid_config(format!("unknown filter '{}'", s))),
        }
    }
}
