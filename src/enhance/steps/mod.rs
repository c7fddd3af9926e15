//! Individual enhancement steps

pub mod blur;
pub mod clahe;
pub mod color;
pub mod contrast;
pub mod equalize;
pub mod sharpness;

use crate::error::EnhanceError;
use image::{ColorType, DynamicImage, GrayImage, RgbImage};

/// Round and clamp a working value into an 8-bit sample
pub(crate) fn saturate(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Map an index outside `0..len` back inside by mirroring around the edge
/// pixel without repeating it (`gfedcb|abcdefgh|gfedcba`)
pub(crate) fn reflect_101(index: i64, len: u32) -> u32 {
    let len = i64::from(len);
    if len <= 1 {
        return 0;
    }
    let mut i = index;
    while i < 0 || i >= len {
        if i < 0 {
            i = -i;
        }
        if i >= len {
            i = 2 * (len - 1) - i;
        }
    }
    i as u32
}

/// Dispatch a step over the two layouts the pipeline works with
pub(crate) fn map_buffers<G, C>(
    image: DynamicImage,
    gray: G,
    color: C,
) -> Result<DynamicImage, EnhanceError>
where
    G: FnOnce(&GrayImage) -> GrayImage,
    C: FnOnce(&RgbImage) -> RgbImage,
{
    match image {
        DynamicImage::ImageLuma8(buffer) => Ok(DynamicImage::ImageLuma8(gray(&buffer))),
        DynamicImage::ImageRgb8(buffer) => Ok(DynamicImage::ImageRgb8(color(&buffer))),
        other => Err(unsupported(other.color())),
    }
}

pub(crate) fn unsupported(color: ColorType) -> EnhanceError {
    EnhanceError::UnsupportedLayout(format!(
        "expected 8-bit gray or RGB, got {:?}",
        color
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_101_mirrors_without_repeating_edge() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(2, 5), 2);
    }

    #[test]
    fn test_reflect_101_handles_large_overshoot() {
        // padding wider than the image bounces more than once
        assert_eq!(reflect_101(7, 3), 1);
        assert_eq!(reflect_101(-4, 3), 0);
        assert_eq!(reflect_101(9, 1), 0);
    }

    #[test]
    fn test_saturate_rounds_and_clamps() {
        assert_eq!(saturate(-3.0), 0);
        assert_eq!(saturate(254.6), 255);
        assert_eq!(saturate(300.0), 255);
        assert_eq!(saturate(12.4), 12);
    }
}
