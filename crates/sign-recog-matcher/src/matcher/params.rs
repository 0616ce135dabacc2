use crate::RansacParams;
use serde::{Deserialize, Serialize};

/// Configuration for [`TemplateMatcher`](super::TemplateMatcher).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherParams {
    /// A match is kept when `best < ratio_threshold * second_best`.
    pub ratio_threshold: f32,
    /// Templates with fewer ratio-test survivors are not matched.
    pub min_good_matches: usize,
    /// Inlier cutoff on the forward transfer error, in pixels.
    pub ransac_reprojection_threshold: f64,
    /// Guards the z-normalization and the inverse distance.
    pub epsilon: f64,
    pub ransac: RansacParams,
    /// Score templates on the rayon pool (needs the `rayon` feature).
    pub parallel: bool,
}

impl Default for MatcherParams {
    fn default() -> Self {
        Self {
            ratio_threshold: 0.7,
            min_good_matches: 10,
            ransac_reprojection_threshold: 5.0,
            epsilon: 1e-5,
            ransac: RansacParams::default(),
            parallel: true,
        }
    }
}
