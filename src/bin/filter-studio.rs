//! Filter Studio CLI Tool
//!
//! Command-line interface for applying the filter pipeline to a single image.

#[cfg(feature = "cli")]
use filter_studio::cli;

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    cli::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::exit(1);
}
