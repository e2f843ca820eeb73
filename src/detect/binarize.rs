//! Converts decoded pixels into a dark/background mask.

use image::{DynamicImage, GrayImage};
use kornia::{
    image::{Image, ImageSize, allocator::CpuAllocator},
    imgproc,
};

use crate::error::{DetectError, Result};

type CpuImage<T, const C: usize> = Image<T, C, CpuAllocator>;

/// Pixels with grayscale intensity strictly below this value are dot material.
pub const DARK_THRESHOLD: u8 = 50;

const FOREGROUND: u8 = 255;
const BACKGROUND: u8 = 0;

/// Row-major, interleaved 8-bit pixel data with 1 (gray), 3 (RGB) or 4 (RGBA) channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(DetectError::InvalidImage(format!(
                "image has zero dimension ({width}x{height})"
            )));
        }
        if !matches!(channels, 1 | 3 | 4) {
            return Err(DetectError::InvalidImage(format!(
                "unsupported channel count {channels}"
            )));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(channels as usize))
            .ok_or_else(|| DetectError::InvalidImage("width*height overflow".to_string()))?;
        if data.len() != expected {
            return Err(DetectError::InvalidImage(format!(
                "expected {expected} bytes for {width}x{height}x{channels}, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Single-channel buffer, the common case for scanned sheets.
    pub fn gray(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        Self::new(width, height, 1, data)
    }

    /// Grayscale-family images stay single channel; everything else becomes RGB.
    pub fn from_dynamic(source: &DynamicImage) -> Result<Self> {
        match source {
            DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA16(_) => {
                let gray = source.to_luma8();
                let (width, height) = gray.dimensions();
                Self::new(width, height, 1, gray.into_raw())
            }
            _ => {
                let rgb = source.to_rgb8();
                let (width, height) = rgb.dimensions();
                Self::new(width, height, 3, rgb.into_raw())
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    fn size(&self) -> ImageSize {
        ImageSize {
            width: self.width as usize,
            height: self.height as usize,
        }
    }

    /// Reduces the buffer to one luma value per pixel.
    fn to_gray(&self) -> Result<CpuImage<u8, 1>> {
        match self.channels {
            1 => Ok(CpuImage::<u8, 1>::new(
                self.size(),
                self.data.clone(),
                CpuAllocator,
            )?),
            3 => self.rgb_to_gray(self.data.clone()),
            _ => {
                let rgb: Vec<u8> = self
                    .data
                    .chunks_exact(4)
                    .flat_map(|px| [px[0], px[1], px[2]])
                    .collect();
                self.rgb_to_gray(rgb)
            }
        }
    }

    fn rgb_to_gray(&self, rgb: Vec<u8>) -> Result<CpuImage<u8, 1>> {
        let image = CpuImage::<u8, 3>::new(self.size(), rgb, CpuAllocator)?;
        let mut gray = CpuImage::<u8, 1>::from_size_val(image.size(), 0u8, CpuAllocator)?;
        imgproc::color::gray_from_rgb_u8(&image, &mut gray)?;
        Ok(gray)
    }
}

/// Two-valued mask with the same dimensions as its source buffer.
///
/// Stored as 0/255 bytes so it can be handed straight to `imageproc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl BinaryMask {
    /// Builds a mask from row-major foreground flags.
    pub fn from_flags(width: u32, height: u32, flags: &[bool]) -> Result<Self> {
        if flags.len() != width as usize * height as usize {
            return Err(DetectError::InternalFailure(format!(
                "mask of {} pixels does not fit {width}x{height}",
                flags.len()
            )));
        }
        let data = flags
            .iter()
            .map(|&fg| if fg { FOREGROUND } else { BACKGROUND })
            .collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        x < self.width
            && y < self.height
            && self.data[y as usize * self.width as usize + x as usize] != BACKGROUND
    }

    pub fn foreground_count(&self) -> usize {
        self.data.iter().filter(|&&px| px != BACKGROUND).count()
    }

    pub fn is_empty(&self) -> bool {
        self.foreground_count() == 0
    }

    pub(crate) fn to_gray_image(&self) -> Result<GrayImage> {
        GrayImage::from_raw(self.width, self.height, self.data.clone()).ok_or_else(|| {
            DetectError::InternalFailure("mask buffer does not match its dimensions".to_string())
        })
    }

    /// Background becomes foreground and vice versa.
    pub(crate) fn inverted_gray_image(&self) -> Result<GrayImage> {
        let data = self
            .data
            .iter()
            .map(|&px| if px == BACKGROUND { FOREGROUND } else { BACKGROUND })
            .collect();
        GrayImage::from_raw(self.width, self.height, data).ok_or_else(|| {
            DetectError::InternalFailure("mask buffer does not match its dimensions".to_string())
        })
    }
}

/// Marks every pixel darker than `threshold` as foreground.
///
/// Multi-channel buffers are reduced to luma first. A threshold of 0 selects
/// nothing.
pub fn binarize(buffer: &PixelBuffer, threshold: u8) -> Result<BinaryMask> {
    let gray = buffer.to_gray()?;

    let Some(cutoff) = threshold.checked_sub(1) else {
        return Ok(BinaryMask {
            width: buffer.width,
            height: buffer.height,
            data: vec![BACKGROUND; gray.as_slice().len()],
        });
    };

    // threshold_binary lights up pixels above the cutoff, i.e. the background.
    let mut bright = CpuImage::<u8, 1>::from_size_val(gray.size(), 0u8, CpuAllocator)?;
    imgproc::threshold::threshold_binary(&gray, &mut bright, cutoff, FOREGROUND)?;

    let data = bright
        .as_slice()
        .iter()
        .map(|&px| if px == 0 { FOREGROUND } else { BACKGROUND })
        .collect();

    Ok(BinaryMask {
        width: buffer.width,
        height: buffer.height,
        data,
    })
}
