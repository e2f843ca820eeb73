#![allow(dead_code)]

use image::{GrayImage, Luma, Rgb, RgbImage};

/// White sheet of the given size.
pub fn blank_sheet(width: u32, height: u32) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([255]))
}

/// Fills the `size`-pixel square whose top-left corner is `(x0, y0)` with `ink`.
pub fn stamp_square(img: &mut GrayImage, x0: u32, y0: u32, size: u32, ink: u8) {
    for y in y0..(y0 + size).min(img.height()) {
        for x in x0..(x0 + size).min(img.width()) {
            img.put_pixel(x, y, Luma([ink]));
        }
    }
}

/// Filled disc of dark ink centred on `(cx, cy)`.
pub fn stamp_disc(img: &mut RgbImage, cx: f32, cy: f32, radius: f32, ink: Rgb<u8>) {
    for y in 0..img.height() {
        for x in 0..img.width() {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            if dx * dx + dy * dy <= radius * radius {
                img.put_pixel(x, y, ink);
            }
        }
    }
}

/// Encodes to PNG bytes, as a client would send them.
pub fn png_bytes(img: &image::DynamicImage) -> Vec<u8> {
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("failed to encode png");
    out.into_inner()
}
