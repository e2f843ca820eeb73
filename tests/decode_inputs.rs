mod common;

use common::{blank_sheet, png_bytes, stamp_square};
use grid_dot_reader::{
    DetectError, DotConfig, ErrorBody, GridParams, OutputShape, decode_image, detect_dots,
};
use image::{DynamicImage, Rgb, RgbImage};
use serde_json::json;

#[test]
fn png_bytes_round_trip_through_the_pipeline() {
    let mut sheet = blank_sheet(100, 100);
    stamp_square(&mut sheet, 10, 10, 4, 0);
    let bytes = png_bytes(&DynamicImage::ImageLuma8(sheet));

    let buffer = decode_image(&bytes).expect("decode failed");
    assert_eq!((buffer.width(), buffer.height(), buffer.channels()), (100, 100, 1));

    let params: GridParams = serde_json::from_value(json!({"grid_rows": 5, "grid_cols": 5})).unwrap();
    let grid = params.into_spec().expect("valid grid");
    let result = detect_dots(&buffer, &grid, &DotConfig::default()).expect("detect failed");
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"black_dots": [{"row": 1, "col": 1}]})
    );
}

#[test]
fn color_png_decodes_to_rgb() {
    let img = RgbImage::from_pixel(8, 6, Rgb([200, 180, 160]));
    let buffer = decode_image(&png_bytes(&DynamicImage::ImageRgb8(img))).expect("decode failed");
    assert_eq!(buffer.channels(), 3);
    assert_eq!(buffer.as_slice().len(), 8 * 6 * 3);
}

#[test]
fn missing_and_invalid_input_are_client_errors() {
    let missing = decode_image(&[]).unwrap_err();
    assert_eq!(missing, DetectError::MissingInput);
    assert_eq!(
        serde_json::to_value(ErrorBody::from(&missing)).unwrap(),
        json!({"error": "Image data is missing"})
    );

    let invalid = decode_image(&[0x89, b'P', b'N', b'G', 0, 1, 2]).unwrap_err();
    assert!(matches!(invalid, DetectError::InvalidImage(_)));
    assert!(invalid.is_client_error());
    assert_eq!(
        serde_json::to_value(ErrorBody::from(&invalid)).unwrap(),
        json!({"error": "Invalid image data"})
    );
}

#[test]
fn request_defaults_and_grouped_output() {
    let mut sheet = blank_sheet(50, 50);
    stamp_square(&mut sheet, 45, 1, 2, 0);
    stamp_square(&mut sheet, 1, 1, 2, 0);
    let buffer = decode_image(&png_bytes(&DynamicImage::ImageLuma8(sheet))).expect("decode failed");

    let params: GridParams = serde_json::from_str("{}").unwrap();
    let config = DotConfig {
        output: OutputShape::Grouped,
        ..DotConfig::default()
    };
    let result = detect_dots(&buffer, &params.into_spec().unwrap(), &config).expect("detect failed");
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"black_dots_map": {"Row1-": [1, 5]}})
    );
}

#[test]
fn zero_rows_request_is_rejected() {
    let params: GridParams = serde_json::from_value(json!({"grid_rows": 0})).unwrap();
    let err = params.into_spec().unwrap_err();
    assert!(matches!(err, DetectError::InvalidGridSpec(_)));
    assert_eq!(err.status_code(), 400);
}
