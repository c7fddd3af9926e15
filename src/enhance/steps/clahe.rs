use super::{color, map_buffers, reflect_101, saturate};
use crate::error::EnhanceError;
use image::{DynamicImage, GrayImage, Luma};

const HIST_SIZE: usize = 256;

type Lut = [u8; HIST_SIZE];

/// Contrast-limited adaptive histogram equalization
///
/// Gray input is equalized directly; color input only on its luminance.
/// `grid` is the number of tiles as (columns, rows).
pub fn apply(
    image: DynamicImage,
    clip_limit: f32,
    grid: (u32, u32),
) -> Result<DynamicImage, EnhanceError> {
    map_buffers(
        image,
        |gray| equalize_adaptive(gray, clip_limit, grid),
        |rgb| color::map_luminance(rgb, |luma| equalize_adaptive(luma, clip_limit, grid)),
    )
}

/// Equalize one 8-bit plane tile by tile, blending neighbouring tile
/// mappings bilinearly
pub fn equalize_adaptive(plane: &GrayImage, clip_limit: f32, grid: (u32, u32)) -> GrayImage {
    let (width, height) = plane.dimensions();
    // More tiles than pixels would only repeat the same padded samples
    let tiles_x = grid.0.clamp(1, width.max(1));
    let tiles_y = grid.1.clamp(1, height.max(1));

    // Tiles cover the image padded up to a multiple of the grid
    let tile_w = width.div_ceil(tiles_x);
    let tile_h = height.div_ceil(tiles_y);
    let tile_area = (tile_w as usize) * (tile_h as usize);
    if tile_area == 0 {
        return plane.clone();
    }

    let clip = if clip_limit > 0.0 {
        Some(((clip_limit * tile_area as f32 / HIST_SIZE as f32) as u32).max(1))
    } else {
        None
    };
    let lut_scale = 255.0 / tile_area as f32;

    let mut luts: Vec<Lut> = Vec::with_capacity(tiles_x as usize * tiles_y as usize);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let mut hist = tile_histogram(plane, tx * tile_w, ty * tile_h, tile_w, tile_h);
            if let Some(limit) = clip {
                clip_histogram(&mut hist, limit);
            }
            luts.push(build_lut(&hist, lut_scale));
        }
    }

    let inv_tw = 1.0 / tile_w as f32;
    let inv_th = 1.0 / tile_h as f32;
    let columns: Vec<Neighbours> = (0..width)
        .map(|x| Neighbours::locate(x, inv_tw, tiles_x))
        .collect();

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        let row = Neighbours::locate(y, inv_th, tiles_y);
        let top = row.first as usize * tiles_x as usize;
        let bottom = row.second as usize * tiles_x as usize;

        for (x, col) in columns.iter().enumerate() {
            let value = plane.get_pixel(x as u32, y).0[0] as usize;
            let left = col.first as usize;
            let right = col.second as usize;

            let upper = f32::from(luts[top + left][value]) * (1.0 - col.weight)
                + f32::from(luts[top + right][value]) * col.weight;
            let lower = f32::from(luts[bottom + left][value]) * (1.0 - col.weight)
                + f32::from(luts[bottom + right][value]) * col.weight;
            let blended = upper * (1.0 - row.weight) + lower * row.weight;

            out.put_pixel(x as u32, y, Luma([saturate(blended)]));
        }
    }

    out
}

/// The two tiles whose centres bracket a coordinate, and the weight of the
/// second one
struct Neighbours {
    first: u32,
    second: u32,
    weight: f32,
}

impl Neighbours {
    fn locate(coord: u32, inv_tile: f32, tiles: u32) -> Self {
        let pos = coord as f32 * inv_tile - 0.5;
        let lower = pos.floor();
        let weight = pos - lower;
        let first = (lower as i64).max(0) as u32;
        let second = ((lower as i64) + 1).min(i64::from(tiles) - 1).max(0) as u32;
        Self {
            first,
            second,
            weight,
        }
    }
}

fn tile_histogram(
    plane: &GrayImage,
    x0: u32,
    y0: u32,
    tile_w: u32,
    tile_h: u32,
) -> [u32; HIST_SIZE] {
    let (width, height) = plane.dimensions();
    let mut hist = [0u32; HIST_SIZE];
    for y in y0..y0 + tile_h {
        let sy = reflect_101(i64::from(y), height);
        for x in x0..x0 + tile_w {
            let sx = reflect_101(i64::from(x), width);
            hist[plane.get_pixel(sx, sy).0[0] as usize] += 1;
        }
    }
    hist
}

/// Cap every bin at `limit` and hand the excess back evenly
fn clip_histogram(hist: &mut [u32; HIST_SIZE], limit: u32) {
    let mut clipped = 0u32;
    for bin in hist.iter_mut() {
        if *bin > limit {
            clipped += *bin - limit;
            *bin = limit;
        }
    }

    let batch = clipped / HIST_SIZE as u32;
    let mut residual = clipped as usize - batch as usize * HIST_SIZE;
    for bin in hist.iter_mut() {
        *bin += batch;
    }

    if residual > 0 {
        let step = (HIST_SIZE / residual).max(1);
        let mut i = 0;
        while i < HIST_SIZE && residual > 0 {
            hist[i] += 1;
            i += step;
            residual -= 1;
        }
    }
}

fn build_lut(hist: &[u32; HIST_SIZE], scale: f32) -> Lut {
    let mut lut = [0u8; HIST_SIZE];
    let mut sum = 0u32;
    for (entry, &count) in lut.iter_mut().zip(hist.iter()) {
        sum += count;
        *entry = saturate(sum as f32 * scale);
    }
    lut
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn ramp(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| Luma([(100 + (x + y) % 32) as u8]))
    }

    #[test]
    fn test_clahe_preserves_dimensions() {
        let img = ramp(37, 21);
        let result = equalize_adaptive(&img, 2.0, (8, 8));
        assert_eq!(result.dimensions(), (37, 21));
    }

    #[test]
    fn test_clahe_flat_image_stays_uniform() {
        let img = GrayImage::from_pixel(40, 40, Luma([60]));
        let result = equalize_adaptive(&img, 2.0, (8, 8));
        let first = result.get_pixel(0, 0).0[0];
        assert!(result.pixels().all(|p| p.0[0] == first));
    }

    #[test]
    fn test_clahe_stretches_low_contrast() {
        let img = ramp(64, 64);
        let result = equalize_adaptive(&img, 4.0, (8, 8));

        let spread = |img: &GrayImage| {
            let (lo, hi) = img
                .pixels()
                .fold((255u8, 0u8), |(lo, hi), p| (lo.min(p.0[0]), hi.max(p.0[0])));
            hi - lo
        };
        assert!(spread(&result) > spread(&img));
    }

    #[test]
    fn test_clahe_handles_image_smaller_than_grid() {
        let img = GrayImage::from_fn(3, 3, |x, y| Luma([(x * 3 + y) as u8 * 10]));
        let result = equalize_adaptive(&img, 2.0, (8, 8));
        assert_eq!(result.dimensions(), (3, 3));
    }

    #[test]
    fn test_clahe_tolerates_huge_grid() {
        let img = GrayImage::from_fn(2, 2, |x, y| Luma([(x * 100 + y * 50) as u8]));
        let result = equalize_adaptive(&img, 2.0, (70_000, 70_000));
        assert_eq!(result.dimensions(), (2, 2));
    }

    #[test]
    fn test_clahe_lower_clip_limit_spreads_less() {
        let img = ramp(64, 64);

        let spread = |img: &GrayImage| {
            let (lo, hi) = img
                .pixels()
                .fold((255u8, 0u8), |(lo, hi), p| (lo.min(p.0[0]), hi.max(p.0[0])));
            hi - lo
        };
        let limited = equalize_adaptive(&img, 1.0, (8, 8));
        let unlimited = equalize_adaptive(&img, 0.0, (8, 8));

        assert!(
            spread(&limited) < spread(&unlimited),
            "clip 1.0 spread {} should stay below unclipped {}",
            spread(&limited),
            spread(&unlimited)
        );
    }

    #[test]
    fn test_clip_histogram_conserves_mass() {
        let mut hist = [0u32; HIST_SIZE];
        hist[10] = 500;
        hist[200] = 300;
        hist[50] = 7;
        clip_histogram(&mut hist, 20);

        assert_eq!(hist.iter().sum::<u32>(), 807);
        assert!(hist.iter().all(|&b| b <= 20 + 4));
    }

    #[test]
    fn test_lut_is_monotonic_and_ends_at_white() {
        let mut hist = [0u32; HIST_SIZE];
        hist[0] = 8;
        hist[128] = 8;
        let lut = build_lut(&hist, 255.0 / 16.0);
        assert!(lut.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(lut[255], 255);
        assert_eq!(lut[0], 128);
    }

    #[test]
    fn test_apply_keeps_color_channel_count() {
        let img = RgbImage::from_fn(20, 20, |x, y| Rgb([x as u8 * 5, y as u8 * 5, 90]));
        let result = apply(DynamicImage::ImageRgb8(img), 2.0, (8, 8)).unwrap();
        assert!(result.as_rgb8().is_some());
        assert_eq!((result.width(), result.height()), (20, 20));
    }
}
