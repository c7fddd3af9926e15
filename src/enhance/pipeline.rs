use crate::error::EnhanceError;
use image::DynamicImage;
use serde::Serialize;
use std::time::Instant;

use super::params::{EnhancementParameters, TonalMode};
use super::steps::{self, color};

/// Timing information for a single enhancement step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of enhancement including timing stats
#[derive(Debug, Clone, Serialize)]
pub struct EnhancementResult {
    /// Enhanced image (not serialized)
    #[serde(skip)]
    pub image: DynamicImage,
    /// Total enhancement time in milliseconds
    pub total_time_ms: u64,
    /// Tonal mode requested
    pub tonal_mode: TonalMode,
    /// Whether the tonal stage actually ran
    pub tonal_applied: bool,
    /// Individual step timings
    pub steps: Vec<StepTiming>,
}

/// Enhancement pipeline: channel normalization, optional tonal stage, then
/// sharpness, contrast and smoothing
#[derive(Debug, Clone)]
pub struct Pipeline {
    params: EnhancementParameters,
}

impl Pipeline {
    /// Validate `params` up front so no pixel work starts with bad input
    pub fn new(params: EnhancementParameters) -> Result<Self, EnhanceError> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Parameters this pipeline was validated with
    pub fn params(&self) -> &EnhancementParameters {
        &self.params
    }

    /// Enhance one image and return a new one in the caller's channel order
    pub fn process(&self, image: DynamicImage) -> Result<EnhancementResult, EnhanceError> {
        let start = Instant::now();
        let mut steps_timing = Vec::new();
        let params = &self.params;
        let order = params.channel_order;

        let mut img = self.run_step("normalize", image, &mut steps_timing, |img| {
            color::narrow(img).map(|img| color::to_canonical(img, order))
        })?;

        let tonal_applied = self.tonal_applies(&img);
        if tonal_applied {
            img = match params.tonal_mode {
                TonalMode::AdaptiveLocal => {
                    self.run_step("clahe", img, &mut steps_timing, |img| {
                        steps::clahe::apply(img, params.clip_limit, params.tile_grid)
                    })?
                }
                TonalMode::GlobalEqualize => {
                    self.run_step("equalize", img, &mut steps_timing, steps::equalize::apply)?
                }
                TonalMode::None => img,
            };
        } else if params.tonal_mode != TonalMode::None {
            tracing::debug!(
                "Skipping {} tonal stage: color image and color equalization disabled",
                params.tonal_mode.as_str()
            );
        }

        img = self.run_step("sharpness", img, &mut steps_timing, |img| {
            steps::sharpness::apply(img, params.sharpness)
        })?;

        img = self.run_step("contrast", img, &mut steps_timing, |img| {
            steps::contrast::apply(img, params.contrast)
        })?;

        img = self.run_step("blur", img, &mut steps_timing, |img| {
            steps::blur::apply(img, params.blur_kernel_size)
        })?;

        let img = color::from_canonical(img, order);

        Ok(EnhancementResult {
            image: img,
            total_time_ms: start.elapsed().as_millis() as u64,
            tonal_mode: params.tonal_mode,
            tonal_applied,
            steps: steps_timing,
        })
    }

    /// Decide whether the tonal stage runs for this (normalized) image
    ///
    /// Gray images and color images whose channels are all equal are always
    /// equalized; real color only when color equalization is enabled. The
    /// switch only gates the adaptive mode.
    fn tonal_applies(&self, image: &DynamicImage) -> bool {
        match self.params.tonal_mode {
            TonalMode::None => false,
            TonalMode::GlobalEqualize => true,
            TonalMode::AdaptiveLocal => match image {
                DynamicImage::ImageRgb8(rgb) => {
                    self.params.equalize_color_channels || color::is_fake_grayscale(rgb)
                }
                _ => true,
            },
        }
    }

    fn run_step<F>(
        &self,
        name: &str,
        img: DynamicImage,
        timings: &mut Vec<StepTiming>,
        step_fn: F,
    ) -> Result<DynamicImage, EnhanceError>
    where
        F: FnOnce(DynamicImage) -> Result<DynamicImage, EnhanceError>,
    {
        let step_start = Instant::now();
        let result = step_fn(img)?;
        let time_ms = step_start.elapsed().as_millis() as u64;
        tracing::debug!("Step {} finished in {}ms", name, time_ms);
        timings.push(StepTiming {
            name: name.to_string(),
            time_ms,
        });
        Ok(result)
    }
}

/// Enhance `image` with `params` in one call
pub fn enhance(
    image: DynamicImage,
    params: &EnhancementParameters,
) -> Result<DynamicImage, EnhanceError> {
    Pipeline::new(params.clone())?
        .process(image)
        .map(|result| result.image)
}
