//! Mask-to-region stage: contour selection, margin and size policy.

mod error;
mod params;
mod pipeline;

pub use error::RoiError;
pub use params::RoiParams;
pub use pipeline::{extract, RoiExtractor};
