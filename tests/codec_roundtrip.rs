//! File-level round trips through the codec and the convenience API

mod common;

use common::sample_image;
use filter_studio::services::OUTPUT_FILE_NAME;
use filter_studio::{
    process_bytes, ChannelMode, FilterKind, ImageCodec, RasterBuffer, StudioConfig, StudioError,
};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tempfile::TempDir;

fn jpeg_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(sample_image(32, 24))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .unwrap();
    bytes
}

#[test]
fn test_process_jpeg_bytes_to_png_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = StudioConfig::builder()
        .filter(FilterKind::Grayscale)
        .filter(FilterKind::Sketch)
        .build()
        .unwrap();

    let output = process_bytes(&jpeg_bytes(), &config).unwrap();
    assert_eq!(output.image.mode(), ChannelMode::Gray);
    assert_eq!(output.image.dimensions(), (32, 24));

    let path = temp_dir.path().join("nested").join(OUTPUT_FILE_NAME);
    ImageCodec::save_png(&output.image, &path).unwrap();

    let written = std::fs::read(&path).unwrap();
    assert_eq!(image::guess_format(&written).unwrap(), ImageFormat::Png);
    let decoded = image::load_from_memory(&written).unwrap();
    assert_eq!(decoded.color(), image::ColorType::L8);
    assert_eq!(decoded.as_bytes(), output.image.as_raw());
}

#[test]
fn test_load_keeps_png_pixels() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("input.png");
    let original = RasterBuffer::Color(sample_image(10, 7));
    ImageCodec::save_png(&original, &path).unwrap();

    assert_eq!(ImageCodec::load(&path).unwrap(), original);
}

#[test]
fn test_empty_selection_preserves_pixels() {
    let png = ImageCodec::encode_png(&RasterBuffer::Color(sample_image(9, 9))).unwrap();
    let output = process_bytes(&png, &StudioConfig::default()).unwrap();
    assert_eq!(output.image, RasterBuffer::Color(sample_image(9, 9)));
    assert!(output.report.stages.is_empty());
}

#[test]
fn test_config_file_drives_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("studio.json");
    std::fs::write(
        &path,
        r#"{
            "selection": { "blur": true, "invert": true },
            "parameters": { "blur_kernel_size": 4 }
        }"#,
    )
    .unwrap();

    let config = StudioConfig::from_json_file(&path).unwrap();
    assert_eq!(
        config.selection.selected(),
        vec![FilterKind::Blur, FilterKind::Invert]
    );

    let png = ImageCodec::encode_png(&RasterBuffer::Color(sample_image(16, 16))).unwrap();
    let output = process_bytes(&png, &config).unwrap();
    assert_eq!(output.report.applied(), vec![FilterKind::Blur, FilterKind::Invert]);
    assert_eq!(output.image.mode(), ChannelMode::Color);
}

#[test]
fn test_corrupt_input_is_an_image_error() {
    let result = process_bytes(b"\x89PNG\r\n\x1a\ntruncated", &StudioConfig::default());
    assert!(matches!(result, Err(StudioError::Image(_))));
}
