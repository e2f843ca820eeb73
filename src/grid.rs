//! Logical grid over the image and pixel-to-cell mapping.

use serde::{Deserialize, Serialize};

use crate::error::{DetectError, Result};

pub const DEFAULT_ROWS: u32 = 5;
pub const DEFAULT_COLS: u32 = 5;

/// Requested number of grid rows and columns, both at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    rows: u32,
    cols: u32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
        }
    }
}

impl GridSpec {
    pub fn new(rows: i64, cols: i64) -> Result<Self> {
        Ok(Self {
            rows: positive_count("rows", rows)?,
            cols: positive_count("cols", cols)?,
        })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Resolves per-cell pixel extents for an image of the given size.
    ///
    /// Fails when a cell would be narrower or shorter than one pixel.
    pub fn layout(&self, width: u32, height: u32) -> Result<GridLayout> {
        if self.rows > height {
            return Err(DetectError::InvalidGridSpec(format!(
                "{} rows do not fit an image {height} pixels high",
                self.rows
            )));
        }
        if self.cols > width {
            return Err(DetectError::InvalidGridSpec(format!(
                "{} cols do not fit an image {width} pixels wide",
                self.cols
            )));
        }
        Ok(GridLayout {
            rows: self.rows,
            cols: self.cols,
            cell_width: width / self.cols,
            cell_height: height / self.rows,
        })
    }
}

fn positive_count(name: &str, value: i64) -> Result<u32> {
    if value < 1 {
        return Err(DetectError::InvalidGridSpec(format!(
            "{name} must be at least 1, got {value}"
        )));
    }
    u32::try_from(value)
        .map_err(|_| DetectError::InvalidGridSpec(format!("{name} is too large: {value}")))
}

/// Grid dimensions as they arrive in a request body; absent keys fall back to 5.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct GridParams {
    #[serde(default)]
    pub grid_rows: Option<i64>,
    #[serde(default)]
    pub grid_cols: Option<i64>,
}

impl GridParams {
    pub fn into_spec(self) -> Result<GridSpec> {
        GridSpec::new(
            self.grid_rows.unwrap_or(DEFAULT_ROWS as i64),
            self.grid_cols.unwrap_or(DEFAULT_COLS as i64),
        )
    }
}

/// A grid bound to concrete image dimensions. Cell sizes are never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    rows: u32,
    cols: u32,
    cell_width: u32,
    cell_height: u32,
}

impl GridLayout {
    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn cell_width(&self) -> u32 {
        self.cell_width
    }

    pub fn cell_height(&self) -> u32 {
        self.cell_height
    }

    /// Maps a pixel to its 1-based cell. Pixels in the remainder strip past
    /// the last full cell belong to the last row/column.
    pub fn cell_at(&self, px: u32, py: u32) -> CellCoordinate {
        let row = (py / self.cell_height).min(self.rows - 1) + 1;
        let col = (px / self.cell_width).min(self.cols - 1) + 1;
        CellCoordinate { row, col }
    }
}

/// 1-based (row, col) grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CellCoordinate {
    pub row: u32,
    pub col: u32,
}
