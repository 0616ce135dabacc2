//! Road-sign region extraction.
//!
//! A frame is thresholded in HSV space into a [`BinaryMask`], the outer
//! contours of the mask's 8-connected components are traced, and the largest
//! one is bounded, grown by a margin and checked against a minimum size.
//!
//! ```
//! use sign_recog_core::{BoundingBox, ChannelOrder, ColorImageView, FrameView};
//! use sign_recog_roi::{extract_region, ColorRange};
//!
//! let (w, h) = (64, 48);
//! let mut rgb = vec![0u8; w * h * 3];
//! for y in 10..=30 {
//!     for x in 20..=40 {
//!         let i = (y * w + x) * 3;
//!         rgb[i..i + 3].copy_from_slice(&[255, 255, 0]);
//!     }
//! }
//! let view = ColorImageView::new(w, h, ChannelOrder::Rgb, &rgb).unwrap();
//! let frame = FrameView::Color(view);
//! let bbox = extract_region(&frame, &ColorRange::default(), 2, (10, 10)).unwrap();
//! assert_eq!(bbox, BoundingBox::new(18, 8, 42, 32));
//! ```

mod color;
mod contour;
mod extract;
mod mask;

pub use color::{mask, rgb_to_hsv, ColorRange};
pub use contour::{find_contours, Contour};
pub use extract::{extract, RoiError, RoiExtractor, RoiParams};
pub use mask::BinaryMask;

use sign_recog_core::{BoundingBox, FrameView};

/// Threshold `frame` with `range` and extract the candidate region.
pub fn extract_region(
    frame: &FrameView<'_>,
    range: &ColorRange,
    margin: u32,
    min_size: (u32, u32),
) -> Result<BoundingBox, RoiError> {
    let m = mask(frame, range)?;
    extract(&m, min_size, margin)
}
