use super::{RoiError, RoiParams};
use crate::contour::find_contours;
use crate::{mask, BinaryMask};
use sign_recog_core::{BoundingBox, FrameView};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Bound the largest contour of `mask`, grow it by `margin` and apply the
/// minimum-size policy.
///
/// The largest contour is the one with the greatest shoelace area; on ties the
/// contour whose first pixel comes first in raster order wins.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(mask), fields(width = mask.width(), height = mask.height()))
)]
pub fn extract(
    mask: &BinaryMask,
    min_size: (u32, u32),
    margin: u32,
) -> Result<BoundingBox, RoiError> {
    let (w, h) = (mask.width(), mask.height());
    if w == 0 || h == 0 || mask.as_slice().len() != w * h {
        return Err(RoiError::invalid(format!("mask dimensions {w}x{h}")));
    }
    let (Ok(fw), Ok(fh)) = (u32::try_from(w), u32::try_from(h)) else {
        return Err(RoiError::invalid(format!("mask {w}x{h} exceeds u32 range")));
    };

    let contours = find_contours(mask);
    let mut best: Option<(usize, f64)> = None;
    for (i, c) in contours.iter().enumerate() {
        let area = c.area();
        if best.is_none_or(|(_, a)| area > a) {
            best = Some((i, area));
        }
    }
    let Some((idx, area)) = best else {
        log::debug!("no contours in mask");
        return Err(RoiError::NoRegionFound);
    };

    let raw = contours[idx].bounding_box();
    let bbox = raw.expand_clamped(margin, fw, fh);
    log::debug!(
        "selected contour {}/{} (area {:.1}), box {:?} -> {:?}",
        idx + 1,
        contours.len(),
        area,
        raw,
        bbox
    );

    let (min_w, min_h) = min_size;
    if bbox.width() < min_w || bbox.height() < min_h {
        return Err(RoiError::RegionTooSmall { bbox });
    }
    Ok(bbox)
}

/// Frame-to-region stage configured once with [`RoiParams`].
#[derive(Clone, Debug, Default)]
pub struct RoiExtractor {
    params: RoiParams,
}

impl RoiExtractor {
    pub fn new(params: RoiParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &RoiParams {
        &self.params
    }

    /// Color mask of `frame`, smoothed if configured.
    pub fn mask(&self, frame: &FrameView<'_>) -> Result<BinaryMask, RoiError> {
        let m = mask(frame, &self.params.color_range)?;
        Ok(m.smoothed(self.params.smoothing_radius))
    }

    /// Region from an existing mask; smoothing is applied first.
    pub fn extract(&self, mask: &BinaryMask) -> Result<BoundingBox, RoiError> {
        let smoothed;
        let mask = if self.params.smoothing_radius > 0 {
            smoothed = mask.smoothed(self.params.smoothing_radius);
            &smoothed
        } else {
            mask
        };
        extract(mask, self.params.min_size, self.params.margin)
    }

    /// Full stage: mask, smooth, select, bound.
    pub fn detect(&self, frame: &FrameView<'_>) -> Result<BoundingBox, RoiError> {
        let m = self.mask(frame)?;
        extract(&m, self.params.min_size, self.params.margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_mask(x0: usize, y0: usize, x1: usize, y1: usize) -> BinaryMask {
        let mut m = BinaryMask::new(640, 480);
        m.fill_rect(x0, y0, x1, y1);
        m
    }

    #[test]
    fn square_without_margin() {
        let m = square_mask(50, 50, 70, 70);
        let bbox = extract(&m, (10, 10), 0).expect("region");
        assert_eq!(bbox, BoundingBox::new(50, 50, 70, 70));
    }

    #[test]
    fn square_with_margin() {
        let m = square_mask(50, 50, 70, 70);
        let bbox = extract(&m, (10, 10), 5).expect("region");
        assert_eq!(bbox, BoundingBox::new(45, 45, 75, 75));
    }

    #[test]
    fn margin_is_clamped_at_frame_edges() {
        let m = square_mask(2, 460, 22, 478);
        let bbox = extract(&m, (10, 10), 5).expect("region");
        assert_eq!(bbox, BoundingBox::new(0, 455, 27, 479));
        assert!(bbox.fits_in(640, 480));
    }

    #[test]
    fn empty_mask_has_no_region() {
        let m = BinaryMask::new(640, 480);
        assert_eq!(extract(&m, (10, 10), 0), Err(RoiError::NoRegionFound));
    }

    #[test]
    fn speck_is_too_small() {
        let m = square_mask(100, 100, 101, 101);
        let err = extract(&m, (10, 10), 0).unwrap_err();
        assert_eq!(
            err,
            RoiError::RegionTooSmall {
                bbox: BoundingBox::new(100, 100, 101, 101)
            }
        );
    }

    #[test]
    fn largest_contour_wins() {
        let mut m = square_mask(10, 10, 20, 20);
        m.fill_rect(100, 100, 160, 140);
        m.fill_rect(300, 5, 310, 9);
        let bbox = extract(&m, (10, 10), 0).expect("region");
        assert_eq!(bbox, BoundingBox::new(100, 100, 160, 140));
    }

    #[test]
    fn equal_areas_keep_the_first_in_raster_order() {
        let mut m = square_mask(300, 40, 320, 60);
        m.fill_rect(10, 200, 30, 220);
        let bbox = extract(&m, (10, 10), 0).expect("region");
        assert_eq!(bbox, BoundingBox::new(300, 40, 320, 60));
    }

    #[test]
    fn smoothing_suppresses_noise_blobs() {
        let mut m = square_mask(200, 200, 209, 209);
        // a thin diagonal streak with a larger span than the square
        for i in 0..40 {
            m.set(400 + i, 100 + i, true);
        }
        let plain = RoiExtractor::new(RoiParams {
            min_size: (5, 5),
            ..RoiParams::default()
        });
        let smoothing = RoiExtractor::new(RoiParams {
            smoothing_radius: 1,
            min_size: (5, 5),
            ..RoiParams::default()
        });
        // the streak encloses no area, so the square wins either way
        assert_eq!(
            plain.extract(&m).expect("region"),
            BoundingBox::new(200, 200, 209, 209)
        );
        assert_eq!(
            smoothing.extract(&m).expect("region"),
            BoundingBox::new(200, 200, 209, 209)
        );

        let mut streak_only = BinaryMask::new(640, 480);
        for i in 0..40 {
            streak_only.set(400 + i, 100 + i, true);
        }
        assert!(plain.extract(&streak_only).is_ok());
        assert_eq!(
            smoothing.extract(&streak_only),
            Err(RoiError::NoRegionFound)
        );
    }

    #[test]
    fn extraction_is_idempotent() {
        let m = square_mask(120, 80, 180, 150);
        let a = extract(&m, (10, 10), 3);
        let b = extract(&m, (10, 10), 3);
        assert_eq!(a, b);
    }
}
