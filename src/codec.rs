//! Decoding and encoding at the file boundary

use crate::error::EnhanceError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Quality requested from lossy encoders
pub const MAX_JPEG_QUALITY: u8 = 100;

/// Decode an image file, guessing the format from its contents
pub fn load(path: &Path) -> Result<DynamicImage, EnhanceError> {
    let reader = ImageReader::open(path)
        .map_err(|e| EnhanceError::Decode(format!("{}: {}", path.display(), e)))?
        .with_guessed_format()
        .map_err(|e| EnhanceError::Decode(format!("{}: {}", path.display(), e)))?;

    let image = reader
        .decode()
        .map_err(|e| EnhanceError::Decode(format!("{}: {}", path.display(), e)))?;

    if image.width() == 0 || image.height() == 0 {
        return Err(EnhanceError::Decode(format!(
            "{}: image has no pixels",
            path.display()
        )));
    }

    Ok(image)
}

/// Encode `image` to `path`, format picked from the extension
///
/// JPEG output is written at maximum quality.
pub fn save(image: &DynamicImage, path: &Path) -> Result<(), EnhanceError> {
    let format = ImageFormat::from_path(path)
        .map_err(|e| EnhanceError::Encode(format!("{}: {}", path.display(), e)))?;

    match format {
        ImageFormat::Jpeg => {
            let file = File::create(path)
                .map_err(|e| EnhanceError::Encode(format!("{}: {}", path.display(), e)))?;
            let mut writer = BufWriter::new(file);
            let encoder = JpegEncoder::new_with_quality(&mut writer, MAX_JPEG_QUALITY);
            image
                .write_with_encoder(encoder)
                .map_err(|e| EnhanceError::Encode(format!("{}: {}", path.display(), e)))
        }
        other => image
            .save_with_format(path, other)
            .map_err(|e| EnhanceError::Encode(format!("{}: {}", path.display(), e))),
    }
}
