//! Batch image enhancement
//!
//! The [`enhance`] module holds the per-image pipeline; [`batch`] and
//! [`codec`] drive it over a directory.

pub mod batch;
pub mod codec;
pub mod config;
pub mod enhance;
pub mod error;

pub use enhance::{enhance, EnhancementParameters, Pipeline, TonalMode};
pub use error::EnhanceError;
