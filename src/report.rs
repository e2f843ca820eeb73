//! Aggregation of mapped dots into the two supported output shapes.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::DetectError;
use crate::grid::CellCoordinate;

/// Which shape the detection report takes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputShape {
    /// One `{row, col}` entry per dot, in discovery order.
    #[default]
    Flat,
    /// Column indices grouped under a `Row<N>-` key, sorted ascending.
    Grouped,
}

/// Label used for a row in grouped output, e.g. `Row3-`.
pub fn row_label(row: u32) -> String {
    format!("Row{row}-")
}

/// Column indices per 1-based row. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowGroups(BTreeMap<u32, Vec<u32>>);

impl RowGroups {
    pub fn from_cells(cells: &[CellCoordinate]) -> Self {
        let mut rows: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
        for cell in cells {
            rows.entry(cell.row).or_default().push(cell.col);
        }
        for cols in rows.values_mut() {
            cols.sort_unstable();
        }
        Self(rows)
    }

    pub fn get(&self, row: u32) -> Option<&[u32]> {
        self.0.get(&row).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[u32])> {
        self.0.iter().map(|(&row, cols)| (row, cols.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn dot_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

impl Serialize for RowGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (&row, cols) in &self.0 {
            map.serialize_entry(&row_label(row), cols)?;
        }
        map.end()
    }
}

/// Outcome of one detection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DetectionResult {
    #[serde(rename = "black_dots")]
    Flat(Vec<CellCoordinate>),
    #[serde(rename = "black_dots_map")]
    Grouped(RowGroups),
}

impl DetectionResult {
    /// Number of dots in the report.
    pub fn len(&self) -> usize {
        match self {
            DetectionResult::Flat(cells) => cells.len(),
            DetectionResult::Grouped(groups) => groups.dot_count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds the report for `cells`, which must be in discovery order.
pub fn aggregate(cells: Vec<CellCoordinate>, shape: OutputShape) -> DetectionResult {
    match shape {
        OutputShape::Flat => DetectionResult::Flat(cells),
        OutputShape::Grouped => DetectionResult::Grouped(RowGroups::from_cells(&cells)),
    }
}

/// `{"error": "..."}` payload for a failed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<&DetectError> for ErrorBody {
    fn from(err: &DetectError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}
