//! Template classification of road-sign regions.
//!
//! A [`TemplateLibrary`] is built once from labelled grayscale templates.
//! [`TemplateMatcher::predict`] then scores a query region against every
//! template and returns normalized confidences.
//!
//! ```no_run
//! use sign_recog_core::GrayImage;
//! use sign_recog_matcher::{FeatureParams, TemplateLibrary, TemplateMatcher};
//!
//! # fn load(_: &str) -> GrayImage { unimplemented!() }
//! let library = TemplateLibrary::build(
//!     [("left", load("left.png")), ("right", load("right.png"))],
//!     FeatureParams::default(),
//! )?;
//! let query = load("crop.png");
//! let result = TemplateMatcher::default().predict(&query.view(), &library)?;
//! if let Some((label, confidence)) = result.best() {
//!     println!("{label}: {confidence:.2}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod features;
mod library;
mod matcher;
mod ransac;

pub use features::{FeatureExtractor, FeatureParams, Features, HarrisExtractor, Keypoint};
pub use library::{LibraryError, TemplateEntry, TemplateLibrary};
pub use matcher::{
    appearance_distance, ratio_matches, ClassificationResult, MatchError, MatchScore,
    MatcherParams, TemplateMatcher,
};
pub use ransac::{find_homography, RansacFit, RansacParams};
