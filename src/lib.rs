//! Locates dark dots on a light background and reports the grid cell each one falls in.
//!
//! Stages: [`detect::binarize`] → [`detect::extract_regions`] →
//! [`grid::GridLayout::cell_at`] → [`report::aggregate`]. Every run is a pure
//! function of its inputs; [`pipeline::detect_dots`] ties the stages together.

pub mod detect;
pub mod error;
pub mod grid;
pub mod pipeline;
pub mod report;

pub use detect::{BinaryMask, DARK_THRESHOLD, PixelBuffer, Region};
pub use error::{DetectError, Result};
pub use grid::{CellCoordinate, GridLayout, GridParams, GridSpec};
pub use pipeline::{DotConfig, decode_image, detect_dots, detect_dots_in_image};
pub use report::{DetectionResult, ErrorBody, OutputShape, RowGroups, row_label};
