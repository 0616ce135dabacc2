use super::{FeatureParams, Keypoint};
use sign_recog_core::GrayImageView;

/// Single-channel `f32` image, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct FloatImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl FloatImage {
    /// Intensities scaled to `[0, 1]` and blurred with a 3x3 binomial kernel
    /// (edge pixels replicated).
    pub fn smoothed(src: &GrayImageView<'_>) -> Self {
        let (w, h) = (src.width, src.height);
        let scaled: Vec<f32> = src.data.iter().map(|&v| v as f32 / 255.0).collect();

        let mut tmp = vec![0.0f32; w * h];
        for y in 0..h {
            for x in 0..w {
                let l = scaled[y * w + x.saturating_sub(1)];
                let c = scaled[y * w + x];
                let r = scaled[y * w + (x + 1).min(w - 1)];
                tmp[y * w + x] = 0.25 * l + 0.5 * c + 0.25 * r;
            }
        }

        let mut data = vec![0.0f32; w * h];
        for y in 0..h {
            let up = y.saturating_sub(1);
            let down = (y + 1).min(h - 1);
            for x in 0..w {
                data[y * w + x] =
                    0.25 * tmp[up * w + x] + 0.5 * tmp[y * w + x] + 0.25 * tmp[down * w + x];
            }
        }

        Self {
            width: w,
            height: h,
            data,
        }
    }

    /// Pixel with coordinates clamped into the image.
    #[inline]
    pub fn at_clamped(&self, x: i64, y: i64) -> f32 {
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        self.data[y * self.width + x]
    }

    /// Bilinear sample; zero outside the image.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        if !(x > -1.0 && y > -1.0 && x < self.width as f32 && y < self.height as f32) {
            return 0.0;
        }
        let x0 = x.floor() as i64;
        let y0 = y.floor() as i64;
        let fx = x - x0 as f32;
        let fy = y - y0 as f32;
        let get = |xx: i64, yy: i64| {
            if xx < 0 || yy < 0 || xx >= self.width as i64 || yy >= self.height as i64 {
                0.0
            } else {
                self.data[yy as usize * self.width + xx as usize]
            }
        };
        let a = get(x0, y0) + fx * (get(x0 + 1, y0) - get(x0, y0));
        let b = get(x0, y0 + 1) + fx * (get(x0 + 1, y0 + 1) - get(x0, y0 + 1));
        a + fy * (b - a)
    }
}

/// Harris corner response `det(M) - k * trace(M)^2`, with `M` the sum of
/// Sobel gradient products over a 5x5 window.
pub fn harris_response(img: &FloatImage, k: f32) -> FloatImage {
    let (w, h) = (img.width, img.height);
    let mut ixx = vec![0.0f32; w * h];
    let mut iyy = vec![0.0f32; w * h];
    let mut ixy = vec![0.0f32; w * h];

    for y in 0..h {
        for x in 0..w {
            let (xi, yi) = (x as i64, y as i64);
            let p = |dx: i64, dy: i64| img.at_clamped(xi + dx, yi + dy);
            let gx = (p(1, -1) + 2.0 * p(1, 0) + p(1, 1) - p(-1, -1) - 2.0 * p(-1, 0) - p(-1, 1))
                / 8.0;
            let gy = (p(-1, 1) + 2.0 * p(0, 1) + p(1, 1) - p(-1, -1) - 2.0 * p(0, -1) - p(1, -1))
                / 8.0;
            let i = y * w + x;
            ixx[i] = gx * gx;
            iyy[i] = gy * gy;
            ixy[i] = gx * gy;
        }
    }

    const R: i64 = 2;
    let mut data = vec![0.0f32; w * h];
    for y in 0..h as i64 {
        for x in 0..w as i64 {
            let (mut sxx, mut syy, mut sxy) = (0.0f32, 0.0f32, 0.0f32);
            for dy in -R..=R {
                let yy = y + dy;
                if yy < 0 || yy >= h as i64 {
                    continue;
                }
                for dx in -R..=R {
                    let xx = x + dx;
                    if xx < 0 || xx >= w as i64 {
                        continue;
                    }
                    let i = yy as usize * w + xx as usize;
                    sxx += ixx[i];
                    syy += iyy[i];
                    sxy += ixy[i];
                }
            }
            let det = sxx * syy - sxy * sxy;
            let trace = sxx + syy;
            data[y as usize * w + x as usize] = det - k * trace * trace;
        }
    }

    FloatImage {
        width: w,
        height: h,
        data,
    }
}

/// Thresholded, non-maximum suppressed Harris keypoints, strongest first.
///
/// Equal responses inside one suppression window keep the pixel that comes
/// first in raster order; equal responses in the final ranking keep raster
/// order too. `angle` is left at zero.
pub fn detect_keypoints(img: &FloatImage, params: &FeatureParams) -> Vec<Keypoint> {
    let (w, h) = (img.width, img.height);
    let b = params.border;
    if w <= 2 * b || h <= 2 * b {
        return Vec::new();
    }

    let resp = harris_response(img, params.harris_k);
    let mut max_r = f32::MIN;
    for y in b..h - b {
        for x in b..w - b {
            max_r = max_r.max(resp.data[y * w + x]);
        }
    }
    let threshold = params
        .min_response
        .max(params.relative_threshold * max_r);

    let r = params.nms_radius as i64;
    let mut out = Vec::new();
    for y in b..h - b {
        for x in b..w - b {
            let v = resp.data[y * w + x];
            if v <= threshold {
                continue;
            }
            let here = y * w + x;
            let mut is_max = true;
            'window: for dy in -r..=r {
                let yy = y as i64 + dy;
                if yy < 0 || yy >= h as i64 {
                    continue;
                }
                for dx in -r..=r {
                    let xx = x as i64 + dx;
                    if xx < 0 || xx >= w as i64 || (dx == 0 && dy == 0) {
                        continue;
                    }
                    let other = yy as usize * w + xx as usize;
                    let q = resp.data[other];
                    if q > v || (q == v && other < here) {
                        is_max = false;
                        break 'window;
                    }
                }
            }
            if is_max {
                out.push(Keypoint {
                    x: x as f32,
                    y: y as f32,
                    response: v,
                    angle: 0.0,
                });
            }
        }
    }

    // stable sort keeps raster order among equal responses
    out.sort_by(|a, b| b.response.total_cmp(&a.response));
    out.truncate(params.max_keypoints);
    log::trace!(
        "harris: {} keypoints (max response {:.3e}, threshold {:.3e})",
        out.len(),
        max_r,
        threshold
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sign_recog_core::GrayImage;

    fn quadrant_image(size: usize) -> GrayImage {
        let mut img = GrayImage::new(size, size);
        let half = size / 2;
        for y in 0..size {
            for x in 0..size {
                let dark = (x < half) ^ (y < half);
                img.data[y * size + x] = if dark { 30 } else { 220 };
            }
        }
        img
    }

    #[test]
    fn smoothing_preserves_flat_regions() {
        let img = GrayImage::from_raw(4, 4, vec![255; 16]).expect("image");
        let f = FloatImage::smoothed(&img.view());
        assert!(f.data.iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn x_junction_is_detected_near_the_center() {
        // The junction lies between pixels 31 and 32; the saddle response
        // peaks up to two pixels off it inside the 5x5 structure window.
        let img = quadrant_image(64);
        let f = FloatImage::smoothed(&img.view());
        let kps = detect_keypoints(&f, &FeatureParams::default());
        assert!(!kps.is_empty());
        let best = kps[0];
        assert!(
            (best.x - 31.5).abs() <= 2.0 && (best.y - 31.5).abs() <= 2.0,
            "strongest keypoint at ({}, {})",
            best.x,
            best.y
        );
        assert!(kps
            .iter()
            .all(|k| (k.x - 31.5).abs() <= 6.0 && (k.y - 31.5).abs() <= 6.0));
    }

    #[test]
    fn straight_edges_respond_negatively() {
        let mut img = GrayImage::new(40, 40);
        for y in 0..40 {
            for x in 20..40 {
                img.data[y * 40 + x] = 255;
            }
        }
        let f = FloatImage::smoothed(&img.view());
        let r = harris_response(&f, 0.04);
        assert!(r.data[20 * 40 + 20] < 0.0);
    }

    #[test]
    fn keypoints_are_capped_and_sorted() {
        let img = quadrant_image(64);
        let f = FloatImage::smoothed(&img.view());
        let params = FeatureParams {
            max_keypoints: 1,
            ..FeatureParams::default()
        };
        let kps = detect_keypoints(&f, &params);
        assert_eq!(kps.len(), 1);

        let all = detect_keypoints(&f, &FeatureParams::default());
        assert!(all.windows(2).all(|p| p[0].response >= p[1].response));
    }
}
