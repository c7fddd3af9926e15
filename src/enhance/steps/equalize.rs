use super::{color, map_buffers, saturate};
use crate::error::EnhanceError;
use image::{DynamicImage, GrayImage};
use imageproc::map::map_subpixels;
use imageproc::stats::cumulative_histogram;

/// Full-image histogram equalization
///
/// Gray input is equalized directly; color input has only its luminance
/// equalized so hue and saturation are kept.
pub fn apply(image: DynamicImage) -> Result<DynamicImage, EnhanceError> {
    map_buffers(image, equalize_plane, |rgb| {
        color::map_luminance(rgb, equalize_plane)
    })
}

fn equalize_plane(plane: &GrayImage) -> GrayImage {
    let cdf = cumulative_histogram(plane).channels[0];
    let total = cdf[255];
    let cdf_min = cdf.iter().copied().find(|&c| c > 0).unwrap_or(0);

    // A single-level image has nothing to spread
    if total == cdf_min {
        return plane.clone();
    }

    // The darkest occupied level lands on 0 and the brightest on 255
    let scale = 255.0 / (total - cdf_min) as f32;
    let mut lut = [0u8; 256];
    for (entry, &count) in lut.iter_mut().zip(cdf.iter()) {
        *entry = saturate(count.saturating_sub(cdf_min) as f32 * scale);
    }

    map_subpixels(plane, |v| lut[v as usize])
}
