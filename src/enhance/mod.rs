//! Image enhancement core
//!
//! A stateless pipeline: normalize channel order, optionally equalize
//! luminance (globally or with CLAHE), then sharpen, stretch contrast and
//! smooth.

pub mod params;
pub mod pipeline;
pub mod steps;

pub use params::{ChannelOrder, EnhancementParameters, TonalMode};
pub use pipeline::{enhance, EnhancementResult, Pipeline, StepTiming};
