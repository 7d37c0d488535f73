//! Image normalization ahead of recognition.
//!
//! Receipts arrive photographed under uncontrolled lighting and angle, so the
//! image is flattened to grayscale, contrast-stretched and sharpened before
//! the recognition passes run.

use image::{DynamicImage, GrayImage, imageops};

/// Sharpening convolution kernel.
const SHARPEN_KERNEL: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];

/// Normalize an image for recognition: grayscale, automatic contrast stretch,
/// sharpen.
#[must_use]
pub fn prepare(image: &DynamicImage) -> GrayImage {
    let gray = image.to_luma8();
    let stretched = stretch_contrast(&gray);
    imageops::filter3x3(&stretched, &SHARPEN_KERNEL)
}

/// Linearly remap the observed luminance range to the full 0..=255 range.
///
/// A flat image (single luminance value) is returned unchanged since there is
/// no range to stretch.
fn stretch_contrast(image: &GrayImage) -> GrayImage {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    for pixel in image.pixels() {
        min = min.min(pixel.0[0]);
        max = max.max(pixel.0[0]);
    }

    if max <= min {
        return image.clone();
    }

    let range = f32::from(max - min);
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let value = f32::from(pixel.0[0] - min) / range * 255.0;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            pixel.0[0] = value.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}
