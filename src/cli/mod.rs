//! CLI module for the filter-studio binary
//!
//! This module is only available when the "cli" feature is enabled.

mod config;
#[path = "main.rs"]
mod main_impl;

pub use config::API_KEY_ENV;
pub use main_impl::{main, Cli, CliLogFormat, CliProvider};
