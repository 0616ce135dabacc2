//! High-level facade crate for the `sign-recog-*` workspace.
//!
//! This crate provides:
//! - re-exports of the stage crates (region extraction, template matching)
//! - (feature-gated) end-to-end helpers over `image` buffers: template
//!   decoding, crop/grayscale glue and the full frame → label pipeline
//! - a JSON configuration and report surface used by the `sign-recog` CLI
//!
//! ## Quickstart
//!
//! ```no_run
//! use sign_recog::detect;
//! use sign_recog::io::RecognizerConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RecognizerConfig::load_json("signs.json")?;
//! let library = config.build_library(".")?;
//!
//! let frame = image::open("frame.png")?.to_rgb8();
//! let recognition = detect::recognize(&frame, &library, &config)?;
//! if let Some((label, confidence)) = recognition.classification.best() {
//!     println!("{label} in {:?} ({confidence:.2})", recognition.region);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `sign_recog::core`: image views, bounding boxes, homographies, logging.
//! - `sign_recog::roi`: HSV masking, contour tracing, region extraction.
//! - `sign_recog::matcher`: features, template library, RANSAC, classification.
//! - `sign_recog::detect` (feature `image`): helpers over `image::RgbImage`.
//! - `sign_recog::io`: `RecognizerConfig` and `RecognitionReport`.

pub use sign_recog_core as core;
pub use sign_recog_matcher as matcher;
pub use sign_recog_roi as roi;

pub use sign_recog_core::BoundingBox;
pub use sign_recog_matcher::{ClassificationResult, MatchScore, MatcherParams, TemplateLibrary};
pub use sign_recog_roi::{ColorRange, RoiParams};

#[cfg(feature = "image")]
pub mod detect;
pub mod io;
