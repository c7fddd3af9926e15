use super::{map_buffers, saturate};
use crate::error::EnhanceError;
use image::{DynamicImage, ImageBuffer, Pixel};
use imageproc::definitions::Image;
use imageproc::filter::filter3x3;
use imageproc::map::{ChannelMap, WithChannel};

/// 3x3 smoothing kernel `[1 1 1; 1 5 1; 1 1 1] / 13`
const SMOOTH_KERNEL: [f32; 9] = [
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    5.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
];

/// Boost edges by extrapolating away from a smoothed copy of the image
///
/// A factor of 1.0 returns the input, 0.0 returns the smoothed copy and
/// values above 1.0 exaggerate local detail.
pub fn apply(image: DynamicImage, factor: f32) -> Result<DynamicImage, EnhanceError> {
    map_buffers(
        image,
        |gray| sharpen(gray, factor),
        |rgb| sharpen(rgb, factor),
    )
}

fn sharpen<P>(img: &ImageBuffer<P, Vec<u8>>, factor: f32) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + WithChannel<f32>,
{
    let (width, height) = img.dimensions();
    let mut out = img.clone();

    // The one-pixel border has no full neighbourhood and keeps its values
    if width < 3 || height < 3 {
        return out;
    }

    let smooth: Image<ChannelMap<P, f32>> = filter3x3::<P, f32, f32>(img, &SMOOTH_KERNEL);

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let blurred = smooth.get_pixel(x, y).channels();
            let target = out.get_pixel_mut(x, y).channels_mut();
            for (sample, &soft) in target.iter_mut().zip(blurred) {
                let soft = f32::from(saturate(soft));
                *sample = saturate(soft + factor * (f32::from(*sample) - soft));
            }
        }
    }

    out
}
