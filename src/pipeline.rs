//! End-to-end detection: binarize, extract regions, map to cells, aggregate.

use image::DynamicImage;

use crate::detect::{DARK_THRESHOLD, PixelBuffer, binarize, extract_regions};
use crate::error::{DetectError, Result};
use crate::grid::{CellCoordinate, GridSpec};
use crate::report::{DetectionResult, OutputShape, aggregate};

/// Tunables for a detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DotConfig {
    pub dark_threshold: u8,
    pub output: OutputShape,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            dark_threshold: DARK_THRESHOLD,
            output: OutputShape::Flat,
        }
    }
}

/// Decodes an encoded image container (PNG, JPEG, ...) into a pixel buffer.
pub fn decode_image(bytes: &[u8]) -> Result<PixelBuffer> {
    if bytes.is_empty() {
        tracing::warn!("no image bytes supplied");
        return Err(DetectError::MissingInput);
    }
    let image = image::load_from_memory(bytes).map_err(|e| {
        tracing::warn!("image decode failed: {e}");
        DetectError::InvalidImage(e.to_string())
    })?;
    PixelBuffer::from_dynamic(&image)
}

/// Runs the full pipeline over one buffer.
///
/// The grid is validated against the image before anything else runs, and
/// nothing partial is returned on failure.
pub fn detect_dots(
    buffer: &PixelBuffer,
    grid: &GridSpec,
    config: &DotConfig,
) -> Result<DetectionResult> {
    let layout = grid.layout(buffer.width(), buffer.height())?;

    let mask = binarize(buffer, config.dark_threshold)?;
    let regions = extract_regions(&mask)?;
    drop(mask);

    let cells: Vec<CellCoordinate> = regions
        .iter()
        .map(|region| {
            let (cx, cy) = region.centroid();
            layout.cell_at(cx, cy)
        })
        .collect();

    tracing::debug!(
        "{}x{} image, {}x{} grid: {} dots",
        buffer.width(),
        buffer.height(),
        layout.rows(),
        layout.cols(),
        cells.len()
    );

    Ok(aggregate(cells, config.output))
}

/// Convenience wrapper for an already decoded `image` crate image.
pub fn detect_dots_in_image(
    source: &DynamicImage,
    grid: &GridSpec,
    config: &DotConfig,
) -> Result<DetectionResult> {
    let buffer = PixelBuffer::from_dynamic(source)?;
    detect_dots(&buffer, grid, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(width: u32, height: u32) -> Vec<u8> {
        vec![255; (width * height) as usize]
    }

    fn paint(data: &mut [u8], width: u32, x0: u32, y0: u32, size: u32) {
        for y in y0..y0 + size {
            for x in x0..x0 + size {
                data[(y * width + x) as usize] = 0;
            }
        }
    }

    #[test]
    fn empty_bytes_are_missing_input() {
        assert_eq!(decode_image(&[]), Err(DetectError::MissingInput));
    }

    #[test]
    fn garbage_bytes_are_invalid_image() {
        assert!(matches!(
            decode_image(b"not an image"),
            Err(DetectError::InvalidImage(_))
        ));
    }

    #[test]
    fn grid_is_checked_before_detection() {
        let buffer = PixelBuffer::gray(4, 4, white(4, 4)).unwrap();
        let grid = GridSpec::default();
        assert!(matches!(
            detect_dots(&buffer, &grid, &DotConfig::default()),
            Err(DetectError::InvalidGridSpec(_))
        ));
    }

    #[test]
    fn threshold_is_configurable() {
        let mut data = white(20, 20);
        for px in &mut data[..20] {
            *px = 80;
        }
        let buffer = PixelBuffer::gray(20, 20, data).unwrap();
        let grid = GridSpec::new(2, 2).unwrap();

        let default = detect_dots(&buffer, &grid, &DotConfig::default()).unwrap();
        assert!(default.is_empty());

        let config = DotConfig {
            dark_threshold: 100,
            ..DotConfig::default()
        };
        let lenient = detect_dots(&buffer, &grid, &config).unwrap();
        assert_eq!(
            lenient,
            DetectionResult::Flat(vec![CellCoordinate { row: 1, col: 2 }])
        );
    }

    #[test]
    fn maps_square_centroid_to_cell() {
        let mut data = white(40, 40);
        paint(&mut data, 40, 30, 2, 3);
        let buffer = PixelBuffer::gray(40, 40, data).unwrap();
        let result = detect_dots(&buffer, &GridSpec::new(4, 4).unwrap(), &DotConfig::default())
            .unwrap();
        assert_eq!(
            result,
            DetectionResult::Flat(vec![CellCoordinate { row: 1, col: 4 }])
        );
    }
}
