//! Outer-boundary tracing of 8-connected foreground components.
//!
//! Components are discovered in raster order. Each one is traced with
//! Moore-neighbour tracing starting from its first raster pixel, so the
//! returned contours are ordered by that starting pixel.

use crate::BinaryMask;
use sign_recog_core::BoundingBox;
use std::collections::VecDeque;

// Clockwise in image coordinates (y down), starting west.
const DIRS: [(i64, i64); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

fn dir_index(dx: i64, dy: i64) -> Option<usize> {
    DIRS.iter().position(|&d| d == (dx, dy))
}

/// Closed boundary of one component, pixel centers in tracing order.
///
/// The first point is the component's first pixel in raster order. The
/// closing point is not repeated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<(u32, u32)>,
}

impl Contour {
    /// Shoelace area of the boundary polygon.
    ///
    /// Single pixels and one-pixel-wide lines enclose zero area.
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice: i64 = (0..n)
            .map(|i| {
                let (x0, y0) = self.points[i];
                let (x1, y1) = self.points[(i + 1) % n];
                x0 as i64 * y1 as i64 - x1 as i64 * y0 as i64
            })
            .sum();
        twice.abs() as f64 / 2.0
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut it = self.points.iter();
        let Some(&(x, y)) = it.next() else {
            return BoundingBox::NULL;
        };
        it.fold(BoundingBox::new(x, y, x, y), |b, &(x, y)| BoundingBox {
            left: b.left.min(x),
            top: b.top.min(y),
            right: b.right.max(x),
            bottom: b.bottom.max(y),
        })
    }
}

/// Trace the outer contour of every 8-connected component of `mask`.
pub fn find_contours(mask: &BinaryMask) -> Vec<Contour> {
    let (w, h) = (mask.width(), mask.height());
    let mut visited = vec![false; w * h];
    let mut contours = Vec::new();
    let mut queue = VecDeque::new();

    for y in 0..h {
        for x in 0..w {
            if !mask.get(x, y) || visited[y * w + x] {
                continue;
            }

            visited[y * w + x] = true;
            queue.push_back((x, y));
            while let Some((cx, cy)) = queue.pop_front() {
                for &(dx, dy) in &DIRS {
                    let nx = cx as i64 + dx;
                    let ny = cy as i64 + dy;
                    if mask.get_signed(nx, ny) {
                        let idx = ny as usize * w + nx as usize;
                        if !visited[idx] {
                            visited[idx] = true;
                            queue.push_back((nx as usize, ny as usize));
                        }
                    }
                }
            }

            contours.push(trace_boundary(mask, x, y));
        }
    }

    contours
}

/// Moore-neighbour tracing from `start`, which must be the first raster pixel
/// of its component (so its west neighbour is background).
///
/// Stops when the trace is about to leave `start` along its first move again.
fn trace_boundary(mask: &BinaryMask, sx: usize, sy: usize) -> Contour {
    let start = (sx as i64, sy as i64);
    let mut points = vec![(sx as u32, sy as u32)];

    let mut cur = start;
    let mut backtrack = 0usize;
    let mut first_move: Option<(i64, i64)> = None;
    let max_steps = 4 * mask.width() * mask.height() + 8;

    for _ in 0..max_steps {
        let mut next = None;
        for k in 1..=8 {
            let d = (backtrack + k) % 8;
            let cand = (cur.0 + DIRS[d].0, cur.1 + DIRS[d].1);
            if mask.get_signed(cand.0, cand.1) {
                next = Some((cand, (backtrack + k - 1) % 8));
                break;
            }
        }
        let Some((cand, prev_dir)) = next else {
            break;
        };

        if cur == start {
            match first_move {
                None => first_move = Some(cand),
                Some(m) if m == cand => break,
                Some(_) => {}
            }
        }

        // previous ring cell, re-expressed relative to the new pixel
        let prev = (cur.0 + DIRS[prev_dir].0, cur.1 + DIRS[prev_dir].1);
        let Some(b) = dir_index(prev.0 - cand.0, prev.1 - cand.1) else {
            break;
        };
        backtrack = b;
        cur = cand;
        points.push((cur.0 as u32, cur.1 as u32));
    }

    if points.len() > 1 && points.last() == points.first() {
        points.pop();
    }
    Contour { points }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_pixel_is_a_one_point_contour() {
        let mut m = BinaryMask::new(5, 5);
        m.set(2, 3, true);
        let c = find_contours(&m);
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].points, vec![(2, 3)]);
        assert_eq!(c[0].area(), 0.0);
        assert_eq!(c[0].bounding_box(), BoundingBox::new(2, 3, 2, 3));
    }

    #[test]
    fn horizontal_line_walks_out_and_back() {
        let mut m = BinaryMask::new(6, 3);
        m.fill_rect(1, 1, 3, 1);
        let c = find_contours(&m);
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].points, vec![(1, 1), (2, 1), (3, 1), (2, 1)]);
        assert_eq!(c[0].area(), 0.0);
    }

    #[test]
    fn square_boundary_encloses_expected_area() {
        let mut m = BinaryMask::new(640, 480);
        m.fill_rect(50, 50, 70, 70);
        let c = find_contours(&m);
        assert_eq!(c.len(), 1);
        // 21x21 pixels, centers span 20x20
        assert_eq!(c[0].area(), 400.0);
        assert_eq!(c[0].points.len(), 80);
        assert_eq!(c[0].bounding_box(), BoundingBox::new(50, 50, 70, 70));
    }

    #[test]
    fn diagonal_pixels_form_one_component() {
        let mut m = BinaryMask::new(4, 4);
        m.set(0, 0, true);
        m.set(1, 1, true);
        m.set(2, 2, true);
        let c = find_contours(&m);
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].bounding_box(), BoundingBox::new(0, 0, 2, 2));
    }

    #[test]
    fn ring_is_traced_by_its_outer_boundary() {
        let mut m = BinaryMask::new(12, 12);
        m.fill_rect(2, 2, 9, 9);
        for y in 4..=7 {
            for x in 4..=7 {
                m.set(x, y, false);
            }
        }
        let c = find_contours(&m);
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].area(), 49.0);
        assert_eq!(c[0].bounding_box(), BoundingBox::new(2, 2, 9, 9));
    }

    #[test]
    fn components_come_back_in_raster_order() {
        let mut m = BinaryMask::new(30, 30);
        m.fill_rect(20, 2, 24, 6);
        m.fill_rect(2, 10, 8, 16);
        let c = find_contours(&m);
        assert_eq!(c.len(), 2);
        assert_eq!(c[0].points[0], (20, 2));
        assert_eq!(c[1].points[0], (2, 10));
    }
}
