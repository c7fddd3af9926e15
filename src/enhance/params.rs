use crate::error::EnhanceError;
use serde::Serialize;

/// Largest accepted tile count along either axis of the CLAHE grid
pub const MAX_TILE_GRID: u32 = 256;

/// Tonal adjustment applied before the sharpness/contrast/smoothing stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TonalMode {
    /// Skip tonal adjustment
    #[default]
    None,
    /// Contrast-limited adaptive histogram equalization on luminance
    AdaptiveLocal,
    /// Full-image histogram equalization on luminance
    GlobalEqualize,
}

impl TonalMode {
    /// Parse from a command-line value
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(Self::None),
            "adaptive" | "clahe" => Some(Self::AdaptiveLocal),
            "global" | "equalize" => Some(Self::GlobalEqualize),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::AdaptiveLocal => "adaptive",
            Self::GlobalEqualize => "global",
        }
    }
}

/// Storage order of three-channel pixels handed to the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Bgr,
}

/// Immutable parameter record for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnhancementParameters {
    pub sharpness: f32,
    pub contrast: f32,
    pub blur_kernel_size: u32,
    pub tonal_mode: TonalMode,
    /// Only consulted for `TonalMode::AdaptiveLocal`
    pub equalize_color_channels: bool,
    /// Only consulted for `TonalMode::AdaptiveLocal`
    pub clip_limit: f32,
    /// CLAHE tile grid as (columns, rows)
    pub tile_grid: (u32, u32),
    pub channel_order: ChannelOrder,
}

impl Default for EnhancementParameters {
    fn default() -> Self {
        Self {
            sharpness: 1.2,
            contrast: 1.1,
            blur_kernel_size: 3,
            tonal_mode: TonalMode::None,
            equalize_color_channels: false,
            clip_limit: 2.0,
            tile_grid: (8, 8),
            channel_order: ChannelOrder::Rgb,
        }
    }
}

impl EnhancementParameters {
    pub fn builder() -> ParametersBuilder {
        ParametersBuilder::default()
    }

    /// Parameters under which the pipeline leaves pixels untouched
    pub fn identity() -> Self {
        Self {
            sharpness: 1.0,
            contrast: 1.0,
            blur_kernel_size: 1,
            ..Self::default()
        }
    }

    /// Check every invariant, reporting the first violation
    pub fn validate(&self) -> Result<(), EnhanceError> {
        check_factor("sharpness", self.sharpness)?;
        check_factor("contrast", self.contrast)?;
        check_factor("clip_limit", self.clip_limit)?;

        if self.blur_kernel_size == 0 || self.blur_kernel_size % 2 == 0 {
            return Err(EnhanceError::InvalidParameter(format!(
                "blur_kernel_size must be odd and >= 1, got {}",
                self.blur_kernel_size
            )));
        }

        let (cols, rows) = self.tile_grid;
        if cols == 0 || rows == 0 {
            return Err(EnhanceError::InvalidParameter(format!(
                "tile_grid must be at least 1x1, got {}x{}",
                cols, rows
            )));
        }
        if cols > MAX_TILE_GRID || rows > MAX_TILE_GRID {
            return Err(EnhanceError::InvalidParameter(format!(
                "tile_grid must be at most {0}x{0}, got {1}x{2}",
                MAX_TILE_GRID, cols, rows
            )));
        }

        Ok(())
    }
}

fn check_factor(name: &str, value: f32) -> Result<(), EnhanceError> {
    if !value.is_finite() || value < 0.0 {
        return Err(EnhanceError::InvalidParameter(format!(
            "{} must be a finite value >= 0, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Builder that validates on `build`
#[derive(Debug, Clone, Default)]
pub struct ParametersBuilder {
    params: EnhancementParameters,
}

impl ParametersBuilder {
    pub fn sharpness(mut self, value: f32) -> Self {
        self.params.sharpness = value;
        self
    }

    pub fn contrast(mut self, value: f32) -> Self {
        self.params.contrast = value;
        self
    }

    pub fn blur_kernel_size(mut self, value: u32) -> Self {
        self.params.blur_kernel_size = value;
        self
    }

    pub fn tonal_mode(mut self, mode: TonalMode) -> Self {
        self.params.tonal_mode = mode;
        self
    }

    pub fn equalize_color_channels(mut self, value: bool) -> Self {
        self.params.equalize_color_channels = value;
        self
    }

    pub fn clip_limit(mut self, value: f32) -> Self {
        self.params.clip_limit = value;
        self
    }

    pub fn tile_grid(mut self, cols: u32, rows: u32) -> Self {
        self.params.tile_grid = (cols, rows);
        self
    }

    pub fn channel_order(mut self, order: ChannelOrder) -> Self {
        self.params.channel_order = order;
        self
    }

    pub fn build(self) -> Result<EnhancementParameters, EnhanceError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(EnhancementParameters::default().validate().is_ok());
        assert!(EnhancementParameters::identity().validate().is_ok());
    }

    #[test]
    fn test_rejects_even_and_zero_kernel() {
        for size in [0, 2, 4, 10] {
            let result = EnhancementParameters::builder()
                .blur_kernel_size(size)
                .build();
            assert!(
                matches!(result, Err(EnhanceError::InvalidParameter(_))),
                "kernel size {} should be rejected",
                size
            );
        }
    }

    #[test]
    fn test_rejects_negative_and_nan_factors() {
        assert!(EnhancementParameters::builder().sharpness(-0.1).build().is_err());
        assert!(EnhancementParameters::builder().contrast(f32::NAN).build().is_err());
        assert!(EnhancementParameters::builder().clip_limit(-2.0).build().is_err());
        assert!(EnhancementParameters::builder().tile_grid(0, 8).build().is_err());
    }

    #[test]
    fn test_rejects_oversized_tile_grid() {
        let result = EnhancementParameters::builder()
            .tile_grid(70_000, 70_000)
            .build();
        assert!(matches!(result, Err(EnhanceError::InvalidParameter(_))));

        let edge = EnhancementParameters::builder()
            .tile_grid(MAX_TILE_GRID, 1)
            .build();
        assert!(edge.is_ok());
    }

    #[test]
    fn test_zero_factors_are_allowed() {
        let params = EnhancementParameters::builder()
            .sharpness(0.0)
            .contrast(0.0)
            .clip_limit(0.0)
            .build()
            .unwrap();
        assert_eq!(params.sharpness, 0.0);
    }

    #[test]
    fn test_tonal_mode_from_str() {
        assert_eq!(TonalMode::from_str("Adaptive"), Some(TonalMode::AdaptiveLocal));
        assert_eq!(TonalMode::from_str("global"), Some(TonalMode::GlobalEqualize));
        assert_eq!(TonalMode::from_str("none"), Some(TonalMode::None));
        assert_eq!(TonalMode::from_str("sepia"), None);
    }
}
