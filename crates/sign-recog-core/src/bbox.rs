use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle with inclusive corners.
///
/// `width()` and `height()` are coordinate spans (`right - left`), so a box
/// covering a single pixel has zero width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl BoundingBox {
    /// "No region" sentinel.
    pub const NULL: BoundingBox = BoundingBox {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };

    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Grow by `margin` on every side, clamped to `[0, width) x [0, height)`.
    pub fn expand_clamped(&self, margin: u32, width: u32, height: u32) -> Self {
        let max_x = width.saturating_sub(1);
        let max_y = height.saturating_sub(1);
        Self {
            left: self.left.saturating_sub(margin),
            top: self.top.saturating_sub(margin),
            right: self.right.saturating_add(margin).min(max_x),
            bottom: self.bottom.saturating_add(margin).min(max_y),
        }
    }

    /// True if the box is well ordered and lies inside a `width x height` frame.
    pub fn fits_in(&self, width: u32, height: u32) -> bool {
        self.left <= self.right
            && self.top <= self.bottom
            && self.right < width
            && self.bottom < height
    }
}
