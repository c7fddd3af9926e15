use super::{map_buffers, reflect_101, saturate};
use crate::error::EnhanceError;
use image::{DynamicImage, ImageBuffer, Pixel};
use imageproc::definitions::Image;
use imageproc::filter::separable_filter_equal;
use imageproc::map::{ChannelMap, WithChannel};

/// Binomial kernels used for the small sizes when sigma is derived
const SMALL_KERNELS: [&[f32]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
];

/// Gaussian smoothing with a square `kernel_size` window
///
/// `kernel_size` must be odd; 1 leaves the image untouched.
pub fn apply(image: DynamicImage, kernel_size: u32) -> Result<DynamicImage, EnhanceError> {
    if kernel_size % 2 == 0 {
        return Err(EnhanceError::InvalidParameter(format!(
            "blur kernel size must be odd, got {}",
            kernel_size
        )));
    }
    if kernel_size == 1 {
        return Ok(image);
    }

    let kernel = gaussian_kernel(kernel_size);
    map_buffers(
        image,
        |gray| convolve_separable(gray, &kernel),
        |rgb| convolve_separable(rgb, &kernel),
    )
}

/// Sigma picked from the window size when none is given
pub fn auto_sigma(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1-D Gaussian weights for an odd `size`
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    let idx = (size / 2) as usize;
    if size % 2 == 1 && idx < SMALL_KERNELS.len() {
        return SMALL_KERNELS[idx].to_vec();
    }

    let sigma = auto_sigma(size);
    let scale = -0.5 / (sigma * sigma);
    let center = (size as f32 - 1.0) * 0.5;
    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (scale * d * d).exp()
        })
        .collect();
    let total: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Run the separable kernel over a reflect-101 padded f32 copy, then crop
/// back to the original frame
fn convolve_separable<P>(img: &ImageBuffer<P, Vec<u8>>, kernel: &[f32]) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + WithChannel<f32>,
{
    let (width, height) = img.dimensions();
    let radius = (kernel.len() / 2) as u32;

    let mut padded: Image<ChannelMap<P, f32>> =
        ImageBuffer::new(width + 2 * radius, height + 2 * radius);
    for (x, y, pixel) in padded.enumerate_pixels_mut() {
        let sx = reflect_101(i64::from(x) - i64::from(radius), width);
        let sy = reflect_101(i64::from(y) - i64::from(radius), height);
        let source = img.get_pixel(sx, sy).channels();
        for (sample, &value) in pixel.channels_mut().iter_mut().zip(source) {
            *sample = f32::from(value);
        }
    }

    // f32 samples keep full precision until the single rounding below
    let filtered = separable_filter_equal(&padded, kernel);

    let mut out = img.clone();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let blurred = filtered.get_pixel(x + radius, y + radius).channels();
        for (sample, &value) in pixel.channels_mut().iter_mut().zip(blurred) {
            *sample = saturate(value);
        }
    }
    out
}
