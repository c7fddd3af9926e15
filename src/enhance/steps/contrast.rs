use super::{color, map_buffers, saturate};
use crate::error::EnhanceError;
use image::DynamicImage;
use imageproc::map::map_subpixels;

/// Scale every sample's distance from the image's mean gray level
///
/// 1.0 leaves the image unchanged, 0.0 flattens it to the mean.
pub fn apply(image: DynamicImage, factor: f32) -> Result<DynamicImage, EnhanceError> {
    let mean = f32::from(color::mean_luminance(&image));
    let stretch = move |v: u8| saturate(mean + factor * (f32::from(v) - mean));

    map_buffers(
        image,
        |gray| map_subpixels(gray, stretch),
        |rgb| map_subpixels(rgb, stretch),
    )
}
