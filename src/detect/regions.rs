//! Connected dark regions and their bounding boxes.
//!
//! Foreground is labelled 8-connected and background 4-connected, the usual
//! dual pairing that keeps blob outlines and holes topologically consistent.
//! Only outermost blobs are reported: a blob sitting inside the hole of
//! another blob is skipped, as is anything nested deeper.

use std::collections::{HashMap, HashSet};

use image::Luma;
use imageproc::region_labelling::{Connectivity, connected_components};
use serde::Serialize;

use super::binarize::BinaryMask;
use crate::error::Result;

/// Axis-aligned bounding box of one connected dark region, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Coarse integer centre of the box (floor of half the extent).
    pub fn centroid(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

#[derive(Debug)]
struct Bounds {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    external: bool,
}

impl Bounds {
    fn new(x: u32, y: u32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
            external: false,
        }
    }

    fn include(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn into_region(self) -> Region {
        Region {
            x: self.min_x,
            y: self.min_y,
            width: self.max_x - self.min_x + 1,
            height: self.max_y - self.min_y + 1,
        }
    }
}

/// Finds every outermost 8-connected foreground component in `mask`.
///
/// Regions come back in raster order of their first pixel. An empty mask
/// yields an empty list.
pub fn extract_regions(mask: &BinaryMask) -> Result<Vec<Region>> {
    if mask.is_empty() {
        return Ok(Vec::new());
    }

    let width = mask.width();
    let height = mask.height();

    // imageproc's union-find cannot label a lone pixel image.
    if width == 1 && height == 1 {
        return Ok(vec![Region {
            x: 0,
            y: 0,
            width: 1,
            height: 1,
        }]);
    }

    let blobs = connected_components(&mask.to_gray_image()?, Connectivity::Eight, Luma([0u8]));
    let holes = connected_components(
        &mask.inverted_gray_image()?,
        Connectivity::Four,
        Luma([0u8]),
    );

    // Background components reaching the border are the outside; the rest are holes.
    let mut outside: HashSet<u32> = HashSet::new();
    for x in 0..width {
        outside.insert(holes.get_pixel(x, 0)[0]);
        outside.insert(holes.get_pixel(x, height - 1)[0]);
    }
    for y in 0..height {
        outside.insert(holes.get_pixel(0, y)[0]);
        outside.insert(holes.get_pixel(width - 1, y)[0]);
    }
    outside.remove(&0);

    let touches_outside = |x: u32, y: u32| -> bool {
        if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
            return true;
        }
        [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)]
            .iter()
            .any(|&(nx, ny)| outside.contains(&holes.get_pixel(nx, ny)[0]))
    };

    let mut order: HashMap<u32, usize> = HashMap::new();
    let mut found: Vec<Bounds> = Vec::new();

    for (x, y, label) in blobs.enumerate_pixels() {
        let label = label[0];
        if label == 0 {
            continue;
        }
        let slot = *order.entry(label).or_insert_with(|| {
            found.push(Bounds::new(x, y));
            found.len() - 1
        });
        let bounds = &mut found[slot];
        bounds.include(x, y);
        if !bounds.external && touches_outside(x, y) {
            bounds.external = true;
        }
    }

    let total = found.len();
    let regions: Vec<Region> = found
        .into_iter()
        .filter(|b| b.external)
        .map(Bounds::into_region)
        .collect();

    tracing::debug!(
        "labelled {} components, {} external",
        total,
        regions.len()
    );

    Ok(regions)
}
