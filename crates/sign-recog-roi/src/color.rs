//! HSV conversion and color-range thresholding.
//!
//! Hue is stored on a 0..=255 scale (`degrees * 255 / 360`) so all three
//! channels share the `u8` range.

use crate::{BinaryMask, RoiError};
use serde::{Deserialize, Serialize};
use sign_recog_core::FrameView;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Inclusive per-channel HSV bounds.
///
/// Bounds with `lower[i] > upper[i]` are not rejected; they simply match
/// nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl Default for ColorRange {
    fn default() -> Self {
        Self {
            lower: [25, 155, 145],
            upper: [50, 255, 255],
        }
    }
}

impl ColorRange {
    pub fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| self.lower[i] <= hsv[i] && hsv[i] <= self.upper[i])
    }
}

/// Convert one RGB pixel to `[h, s, v]`.
pub fn rgb_to_hsv([r, g, b]: [u8; 3]) -> [u8; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = (max - min) as f32;

    let v = max;
    let s = if max == 0 {
        0
    } else {
        (255.0 * delta / max as f32).round() as u8
    };

    if delta == 0.0 {
        return [0, s, v];
    }

    let (r, g, b) = (r as f32, g as f32, b as f32);
    let mut deg = if max as f32 == r {
        60.0 * (g - b) / delta
    } else if max as f32 == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if deg < 0.0 {
        deg += 360.0;
    }
    let h = (deg * 255.0 / 360.0).round().clamp(0.0, 255.0) as u8;
    [h, s, v]
}

/// Threshold `frame` against `range`.
///
/// Gray frames are treated as `[0, 0, intensity]`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(frame), fields(width = frame.width(), height = frame.height()))
)]
pub fn mask(frame: &FrameView<'_>, range: &ColorRange) -> Result<BinaryMask, RoiError> {
    frame.validate()?;

    let out = match frame {
        FrameView::Color(view) => BinaryMask::from_fn(view.width, view.height, |x, y| {
            range.contains(rgb_to_hsv(view.rgb(x, y)))
        }),
        FrameView::Gray(view) => BinaryMask::from_fn(view.width, view.height, |x, y| {
            range.contains([0, 0, view.get(x, y)])
        }),
    };

    log::debug!(
        "color mask {}x{}: {} of {} pixels in range",
        out.width(),
        out.height(),
        out.count(),
        out.width() * out.height()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sign_recog_core::{ChannelOrder, ColorImageView, GrayImageView};

    #[test]
    fn primary_hues_land_on_the_byte_scale() {
        assert_eq!(rgb_to_hsv([255, 0, 0]), [0, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 255, 0]), [85, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 0, 255]), [170, 255, 255]);
        assert_eq!(rgb_to_hsv([255, 255, 0]), [43, 255, 255]);
    }

    #[test]
    fn achromatic_pixels_have_zero_hue_and_saturation() {
        assert_eq!(rgb_to_hsv([0, 0, 0]), [0, 0, 0]);
        assert_eq!(rgb_to_hsv([128, 128, 128]), [0, 0, 128]);
    }

    #[test]
    fn yellow_is_inside_the_default_range() {
        let range = ColorRange::default();
        assert!(range.contains(rgb_to_hsv([255, 255, 0])));
        assert!(!range.contains(rgb_to_hsv([255, 0, 0])));
        assert!(!range.contains(rgb_to_hsv([40, 40, 40])));
    }

    #[test]
    fn bgr_frames_are_converted_before_thresholding() {
        // yellow stored as BGR, then blue
        let data = [0u8, 255, 255, 255, 0, 0];
        let view = ColorImageView::new(2, 1, ChannelOrder::Bgr, &data).expect("view");
        let m = mask(&FrameView::Color(view), &ColorRange::default()).expect("mask");
        assert!(m.get(0, 0));
        assert!(!m.get(1, 0));
    }

    #[test]
    fn zero_range_excludes_everything_but_black() {
        let data = [0u8, 1, 200, 255];
        let view = GrayImageView::new(2, 2, &data).expect("view");
        let m = mask(&FrameView::Gray(view), &ColorRange::new([0; 3], [0; 3])).expect("mask");
        assert_eq!(m.count(), 1);
        assert!(m.get(0, 0));
    }

    #[test]
    fn short_buffer_is_invalid_input() {
        let data = [0u8; 5];
        let view = ColorImageView {
            width: 2,
            height: 1,
            order: ChannelOrder::Rgb,
            data: &data,
        };
        let err = mask(&FrameView::Color(view), &ColorRange::default()).unwrap_err();
        assert!(matches!(err, RoiError::InvalidInput { .. }));
    }
}
