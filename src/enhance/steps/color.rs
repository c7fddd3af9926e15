use super::saturate;
use crate::enhance::params::ChannelOrder;
use crate::error::EnhanceError;
use image::{DynamicImage, GenericImageView, GrayImage, Luma, Rgb, RgbImage};

/// BT.601 luma weights
const KR: f32 = 0.299;
const KG: f32 = 0.587;
const KB: f32 = 0.114;
/// Chroma scale factors and their inverses
const CR_SCALE: f32 = 0.713;
const CB_SCALE: f32 = 0.564;
const CR_TO_R: f32 = 1.403;
const CR_TO_G: f32 = -0.714;
const CB_TO_G: f32 = -0.344;
const CB_TO_B: f32 = 1.773;
const CHROMA_OFFSET: f32 = 128.0;

/// Narrow a decoded image to 8-bit gray or 8-bit RGB
///
/// Alpha is dropped and wider samples are reduced to 8 bits. Empty images
/// are reported as decode failures.
pub fn narrow(image: DynamicImage) -> Result<DynamicImage, EnhanceError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(EnhanceError::Decode(format!(
            "image has no pixels ({}x{})",
            width, height
        )));
    }

    Ok(match image {
        DynamicImage::ImageLuma8(gray) => DynamicImage::ImageLuma8(gray),
        DynamicImage::ImageRgb8(rgb) => DynamicImage::ImageRgb8(rgb),
        other if other.color().has_color() => DynamicImage::ImageRgb8(other.into_rgb8()),
        other => DynamicImage::ImageLuma8(other.into_luma8()),
    })
}

/// Reorder color channels from `order` into canonical RGB
pub fn to_canonical(image: DynamicImage, order: ChannelOrder) -> DynamicImage {
    reorder(image, order)
}

/// Reorder canonical RGB back into `order`
pub fn from_canonical(image: DynamicImage, order: ChannelOrder) -> DynamicImage {
    reorder(image, order)
}

// Swapping red and blue is its own inverse
fn reorder(image: DynamicImage, order: ChannelOrder) -> DynamicImage {
    match (order, image) {
        (ChannelOrder::Bgr, DynamicImage::ImageRgb8(mut rgb)) => {
            for pixel in rgb.pixels_mut() {
                pixel.0.swap(0, 2);
            }
            DynamicImage::ImageRgb8(rgb)
        }
        (_, image) => image,
    }
}

/// True when every pair of channels is pixel-wise identical
pub fn is_fake_grayscale(rgb: &RgbImage) -> bool {
    rgb.pixels().all(|Rgb([r, g, b])| r == g && g == b)
}

/// Split RGB into luminance and the two color-difference planes
pub fn split_ycrcb(rgb: &RgbImage) -> (GrayImage, GrayImage, GrayImage) {
    let (width, height) = rgb.dimensions();
    let mut luma = GrayImage::new(width, height);
    let mut cr = GrayImage::new(width, height);
    let mut cb = GrayImage::new(width, height);

    for (x, y, pixel) in rgb.enumerate_pixels() {
        let [r, g, b] = pixel.0.map(f32::from);
        let yf = KR * r + KG * g + KB * b;
        luma.put_pixel(x, y, Luma([saturate(yf)]));
        cr.put_pixel(x, y, Luma([saturate((r - yf) * CR_SCALE + CHROMA_OFFSET)]));
        cb.put_pixel(x, y, Luma([saturate((b - yf) * CB_SCALE + CHROMA_OFFSET)]));
    }

    (luma, cr, cb)
}

/// Recompose RGB from luminance and color-difference planes
pub fn merge_ycrcb(luma: &GrayImage, cr: &GrayImage, cb: &GrayImage) -> RgbImage {
    RgbImage::from_fn(luma.width(), luma.height(), |x, y| {
        let yf = f32::from(luma.get_pixel(x, y).0[0]);
        let crf = f32::from(cr.get_pixel(x, y).0[0]) - CHROMA_OFFSET;
        let cbf = f32::from(cb.get_pixel(x, y).0[0]) - CHROMA_OFFSET;
        Rgb([
            saturate(yf + CR_TO_R * crf),
            saturate(yf + CR_TO_G * crf + CB_TO_G * cbf),
            saturate(yf + CB_TO_B * cbf),
        ])
    })
}

/// Run `adjust` on the luminance plane only, leaving chrominance untouched
pub fn map_luminance<F>(rgb: &RgbImage, adjust: F) -> RgbImage
where
    F: FnOnce(&GrayImage) -> GrayImage,
{
    let (luma, cr, cb) = split_ycrcb(rgb);
    let adjusted = adjust(&luma);
    merge_ycrcb(&adjusted, &cr, &cb)
}

/// Mean BT.601 luminance, rounded to the nearest level
pub fn mean_luminance(image: &DynamicImage) -> u8 {
    let (sum, count) = match image {
        DynamicImage::ImageLuma8(gray) => gray
            .pixels()
            .fold((0.0f64, 0u64), |(s, n), p| (s + f64::from(p.0[0]), n + 1)),
        other => other.to_rgb8().pixels().fold((0.0f64, 0u64), |(s, n), p| {
            let [r, g, b] = p.0.map(f32::from);
            (s + f64::from(saturate(KR * r + KG * g + KB * b)), n + 1)
        }),
    };

    if count == 0 {
        return 0;
    }
    saturate((sum / count as f64) as f32)
}
