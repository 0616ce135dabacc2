use crate::ColorRange;
use serde::{Deserialize, Serialize};

/// Configuration for [`RoiExtractor`](super::RoiExtractor).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoiParams {
    /// HSV bounds of the sign color.
    pub color_range: ColorRange,
    /// Pixels added on every side of the contour's bounding box before
    /// clamping to the frame.
    pub margin: u32,
    /// Minimum `(width, height)` span of the expanded box.
    pub min_size: (u32, u32),
    /// Majority-filter radius applied to the mask before tracing. 0 disables.
    pub smoothing_radius: usize,
}

impl Default for RoiParams {
    fn default() -> Self {
        Self {
            color_range: ColorRange::default(),
            margin: 0,
            min_size: (10, 10),
            smoothing_radius: 0,
        }
    }
}
