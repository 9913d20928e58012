//! Fixed OCR preprocessing: luminance, then a global binary threshold.
//!
//! Not adaptive. Low-contrast frames come out noisy or blank and OCR returns
//! little or nothing for them; that is not treated as an error.

use image::{DynamicImage, GrayImage, RgbImage};
use rayon::prelude::*;

pub const DEFAULT_THRESHOLD: u8 = 150;

/// BT.601 luma with integer weights, rounded to nearest.
pub fn luminance(rgb: &RgbImage) -> GrayImage {
    let (width, height) = rgb.dimensions();
    let mut gray = GrayImage::new(width, height);
    let dst: &mut [u8] = &mut gray;
    dst.par_iter_mut()
        .zip(rgb.as_raw().par_chunks_exact(3))
        .for_each(|(out, px)| {
            let r = px[0] as u32;
            let g = px[1] as u32;
            let b = px[2] as u32;
            *out = ((r * 299 + g * 587 + b * 114 + 500) / 1000) as u8;
        });
    gray
}

/// Pixels strictly above `threshold` become 255, the rest 0.
pub fn binarize(gray: &mut GrayImage, threshold: u8) {
    let buf: &mut [u8] = gray;
    buf.par_iter_mut()
        .for_each(|v| *v = if *v > threshold { 255 } else { 0 });
}

pub fn preprocess(image: &DynamicImage, threshold: u8) -> GrayImage {
    let mut gray = luminance(&image.to_rgb8());
    binarize(&mut gray, threshold);
    gray
}
