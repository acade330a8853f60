//! Services that keep I/O out of the pipeline

pub mod io;

pub use io::{ImageCodec, OUTPUT_FILE_NAME, OUTPUT_MIME_TYPE};
