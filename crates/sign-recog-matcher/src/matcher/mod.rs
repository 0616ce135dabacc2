//! Query-against-library classification.
//!
//! Each template is scored independently: ratio-tested nearest-neighbour
//! matches, a RANSAC homography from query to template, a warp of the query
//! into the template frame and a z-normalized appearance distance. Distances
//! are turned into confidences by inverse-and-normalize.

mod error;
mod params;
mod pipeline;
mod result;

pub use error::MatchError;
pub use params::MatcherParams;
pub use pipeline::{appearance_distance, ratio_matches, TemplateMatcher};
pub use result::{ClassificationResult, MatchScore};
