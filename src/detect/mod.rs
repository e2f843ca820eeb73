pub mod binarize;
pub use binarize::{BinaryMask, DARK_THRESHOLD, PixelBuffer, binarize};
pub mod regions;
pub use regions::{Region, extract_regions};
