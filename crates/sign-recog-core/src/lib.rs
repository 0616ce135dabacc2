//! Shared types for road-sign recognition.
//!
//! Image views over borrowed pixel buffers, the inclusive [`BoundingBox`]
//! used to report regions, and planar [`Homography`] estimation and warping.
//! No stage in the workspace retains a frame beyond a single call.

mod bbox;
mod homography;
mod image;
mod logger;

pub use bbox::BoundingBox;
pub use homography::{estimate_homography, homography_from_4pt, warp_perspective_gray, Homography};
pub use image::{
    luma, sample_bilinear, sample_bilinear_u8, ChannelOrder, ColorImageView, FrameView, GrayImage,
    GrayImageView, ImageError,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
