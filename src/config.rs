use crate::enhance::{ChannelOrder, EnhancementParameters, TonalMode};
use crate::error::EnhanceError;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "image-enhancer")]
#[command(about = "Batch-enhance a directory of images: equalize, sharpen, boost contrast, smooth")]
#[command(version)]
pub struct Args {
    /// Directory containing the images to enhance
    #[arg(env = "ENHANCE_INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Directory the enhanced images are written to (created if missing)
    #[arg(env = "ENHANCE_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Sharpness factor (1.0 = unchanged)
    #[arg(long, env = "ENHANCE_SHARPNESS", default_value = "1.2")]
    pub sharpness: f32,

    /// Contrast factor (1.0 = unchanged)
    #[arg(long, env = "ENHANCE_CONTRAST", default_value = "1.1")]
    pub contrast: f32,

    /// Gaussian blur kernel size, odd (1 = no blur)
    #[arg(long, env = "ENHANCE_BLUR", default_value = "3")]
    pub blur: u32,

    /// Tonal adjustment: none, adaptive (CLAHE) or global
    #[arg(long, env = "ENHANCE_TONAL_MODE", default_value = "none")]
    pub tonal_mode: String,

    /// Apply adaptive equalization to genuinely colored images too
    #[arg(long, env = "ENHANCE_EQUALIZE_COLOR")]
    pub equalize_color: bool,

    /// CLAHE histogram clip limit (0 disables clipping)
    #[arg(long, env = "ENHANCE_CLIP_LIMIT", default_value = "2.0")]
    pub clip_limit: f32,

    /// CLAHE tile grid as COLSxROWS, at most 256 per axis
    #[arg(long, env = "ENHANCE_TILE_GRID", default_value = "8x8")]
    pub tile_grid: String,

    /// Treat three-channel pixels as blue-green-red
    #[arg(long, env = "ENHANCE_BGR")]
    pub bgr: bool,

    /// Comma-separated file name suffixes to process (case-sensitive)
    #[arg(long, env = "ENHANCE_EXTENSIONS", default_value = ".jpg,.png")]
    pub extensions: String,

    /// Write a JSON run report to this path
    #[arg(long, env = "ENHANCE_REPORT")]
    pub report: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long, short)]
    pub quiet: bool,

    /// Exit with an error if any file was skipped
    #[arg(long)]
    pub fail_on_skip: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

/// Run configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub params: EnhancementParameters,
    pub extensions: Vec<String>,
    pub report: Option<PathBuf>,
    pub show_progress: bool,
    pub fail_on_skip: bool,
}

impl TryFrom<Args> for Config {
    type Error = EnhanceError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let tonal_mode = TonalMode::from_str(&args.tonal_mode).ok_or_else(|| {
            EnhanceError::InvalidParameter(format!(
                "unknown tonal mode '{}' (expected none, adaptive or global)",
                args.tonal_mode
            ))
        })?;
        let (cols, rows) = parse_grid(&args.tile_grid)?;

        let params = EnhancementParameters::builder()
            .sharpness(args.sharpness)
            .contrast(args.contrast)
            .blur_kernel_size(args.blur)
            .tonal_mode(tonal_mode)
            .equalize_color_channels(args.equalize_color)
            .clip_limit(args.clip_limit)
            .tile_grid(cols, rows)
            .channel_order(if args.bgr {
                ChannelOrder::Bgr
            } else {
                ChannelOrder::Rgb
            })
            .build()?;

        let extensions = parse_extensions(&args.extensions);
        if extensions.is_empty() {
            return Err(EnhanceError::InvalidParameter(
                "at least one file extension is required".to_string(),
            ));
        }

        Ok(Self {
            input_dir: args.input_dir,
            output_dir: args.output_dir,
            params,
            extensions,
            report: args.report,
            show_progress: !args.quiet,
            fail_on_skip: args.fail_on_skip,
        })
    }
}

fn parse_grid(value: &str) -> Result<(u32, u32), EnhanceError> {
    let invalid = || {
        EnhanceError::InvalidParameter(format!(
            "tile grid must look like 8x8, got '{}'",
            value
        ))
    };
    let (cols, rows) = value.split_once(['x', 'X']).ok_or_else(invalid)?;
    let cols = cols.trim().parse().map_err(|_| invalid())?;
    let rows = rows.trim().parse().map_err(|_| invalid())?;
    Ok((cols, rows))
}

fn parse_extensions(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            if s.starts_with('.') {
                s.to_string()
            } else {
                format!(".{}", s)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["image-enhancer", "in", "out"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_defaults_match_reference_driver() {
        let config = Config::try_from(args(&[])).unwrap();
        assert_eq!(config.params.sharpness, 1.2);
        assert_eq!(config.params.contrast, 1.1);
        assert_eq!(config.params.blur_kernel_size, 3);
        assert_eq!(config.params.tonal_mode, TonalMode::None);
        assert_eq!(config.extensions, vec![".jpg", ".png"]);
        assert!(config.show_progress);
    }

    #[test]
    fn test_even_blur_is_rejected() {
        let result = Config::try_from(args(&["--blur", "4"]));
        assert!(matches!(result, Err(EnhanceError::InvalidParameter(_))));
    }

    #[test]
    fn test_unknown_tonal_mode_is_rejected() {
        let result = Config::try_from(args(&["--tonal-mode", "vivid"]));
        assert!(matches!(result, Err(EnhanceError::InvalidParameter(_))));
    }

    #[test]
    fn test_parses_grid_and_modes() {
        let config = Config::try_from(args(&[
            "--tonal-mode",
            "adaptive",
            "--tile-grid",
            "4x6",
            "--equalize-color",
            "--bgr",
        ]))
        .unwrap();
        assert_eq!(config.params.tonal_mode, TonalMode::AdaptiveLocal);
        assert_eq!(config.params.tile_grid, (4, 6));
        assert!(config.params.equalize_color_channels);
        assert_eq!(config.params.channel_order, ChannelOrder::Bgr);
    }

    #[test]
    fn test_bad_grid_is_rejected() {
        assert!(parse_grid("8").is_err());
        assert!(parse_grid("ax8").is_err());
        assert_eq!(parse_grid("16X2").unwrap(), (16, 2));
    }

    #[test]
    fn test_extensions_gain_leading_dot() {
        assert_eq!(parse_extensions("jpg, .png,,JPG"), vec![".jpg", ".png", ".JPG"]);
    }
}
