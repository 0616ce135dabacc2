use crate::{sample_bilinear_u8, GrayImage, GrayImageView};
use nalgebra::{DMatrix, Matrix3, Point2, SMatrix, SVector, Vector2, Vector3};

/// Planar projective transform, `dst ~ H * src`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    pub fn from_array(rows: [[f64; 3]; 3]) -> Self {
        Self::new(Matrix3::from_fn(|r, c| rows[r][c]))
    }

    pub fn to_array(&self) -> [[f64; 3]; 3] {
        let mut out = [[0.0; 3]; 3];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, v) in row.iter_mut().enumerate() {
                *v = self.h[(r, c)];
            }
        }
        out
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        let w = v[2];
        Point2::new((v[0] / w) as f32, (v[1] / w) as f32)
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }

    /// Euclidean distance between `H * src` and `dst`. Infinite when `src`
    /// maps to the line at infinity.
    pub fn transfer_error(&self, src: Point2<f32>, dst: Point2<f32>) -> f64 {
        let v = self.h * Vector3::new(src.x as f64, src.y as f64, 1.0);
        if v[2].abs() < 1e-12 {
            return f64::INFINITY;
        }
        let dx = v[0] / v[2] - dst.x as f64;
        let dy = v[1] / v[2] - dst.y as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// All entries finite and the matrix far enough from singular to invert.
    pub fn is_usable(&self) -> bool {
        self.h.iter().all(|v| v.is_finite()) && self.h.determinant().abs() > 1e-10
    }
}

// Translate to the centroid, scale so the mean distance is sqrt(2).
fn normalize_points(pts: &[Point2<f32>]) -> (Vec<Point2<f64>>, Matrix3<f64>) {
    let n = pts.len() as f64;
    let centroid = pts
        .iter()
        .fold(Vector2::zeros(), |acc: Vector2<f64>, p| acc + Vector2::new(p.x as f64, p.y as f64))
        / n;
    let spread = pts
        .iter()
        .map(|p| (Vector2::new(p.x as f64, p.y as f64) - centroid).norm())
        .sum::<f64>()
        / n;
    let scale = if spread > 1e-12 {
        std::f64::consts::SQRT_2 / spread
    } else {
        1.0
    };

    let t = Matrix3::new(
        scale, 0.0, -scale * centroid.x, //
        0.0, scale, -scale * centroid.y, //
        0.0, 0.0, 1.0,
    );
    let out = pts
        .iter()
        .map(|p| {
            let q = (Vector2::new(p.x as f64, p.y as f64) - centroid) * scale;
            Point2::new(q.x, q.y)
        })
        .collect();
    (out, t)
}

// Undo the point normalization and scale so that h33 = 1.
fn finish(hn: Matrix3<f64>, t_src: &Matrix3<f64>, t_dst: &Matrix3<f64>) -> Option<Homography> {
    let h = t_dst.try_inverse()? * hn * t_src;
    let h33 = h[(2, 2)];
    (h33.abs() >= 1e-12).then(|| Homography::new(h / h33))
}

/// Least-squares estimate of `H` with `dst ~ H * src` (normalized DLT).
///
/// Needs at least four correspondences; exactly four are solved directly.
pub fn estimate_homography(src: &[Point2<f32>], dst: &[Point2<f32>]) -> Option<Homography> {
    if src.len() != dst.len() || src.len() < 4 {
        return None;
    }
    if let (Ok(s), Ok(d)) = (
        <&[Point2<f32>; 4]>::try_from(src),
        <&[Point2<f32>; 4]>::try_from(dst),
    ) {
        return homography_from_4pt(s, d);
    }

    let (s, t_src) = normalize_points(src);
    let (d, t_dst) = normalize_points(dst);

    let mut a = DMatrix::<f64>::zeros(2 * s.len(), 9);
    for (k, (p, q)) in s.iter().zip(&d).enumerate() {
        let (x, y, u, v) = (p.x, p.y, q.x, q.y);
        a.row_mut(2 * k)
            .copy_from_slice(&[-x, -y, -1.0, 0.0, 0.0, 0.0, u * x, u * y, u]);
        a.row_mut(2 * k + 1)
            .copy_from_slice(&[0.0, 0.0, 0.0, -x, -y, -1.0, v * x, v * y, v]);
    }

    // null vector: last row of V^T
    let v_t = a.svd(false, true).v_t?;
    if v_t.nrows() < 9 {
        return None;
    }
    let hn = Matrix3::from_fn(|r, c| v_t[(8, 3 * r + c)]);
    finish(hn, &t_src, &t_dst)
}

/// Exact `H` with `dst ~ H * src` from four correspondences.
///
/// Returns `None` when the linear system is singular (three collinear points).
pub fn homography_from_4pt(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> Option<Homography> {
    let (s, t_src) = normalize_points(src);
    let (d, t_dst) = normalize_points(dst);

    // eight unknowns, h33 fixed to 1
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();
    for (k, (p, q)) in s.iter().zip(&d).enumerate() {
        let (x, y, u, v) = (p.x, p.y, q.x, q.y);
        a.row_mut(2 * k)
            .copy_from_slice(&[x, y, 1.0, 0.0, 0.0, 0.0, -u * x, -u * y]);
        a.row_mut(2 * k + 1)
            .copy_from_slice(&[0.0, 0.0, 0.0, x, y, 1.0, -v * x, -v * y]);
        b[2 * k] = u;
        b[2 * k + 1] = v;
    }

    let sol = a.lu().solve(&b)?;
    if !sol.iter().all(|v| v.is_finite()) {
        return None;
    }
    let hn = Matrix3::from_fn(|r, c| if r == 2 && c == 2 { 1.0 } else { sol[3 * r + c] });
    finish(hn, &t_src, &t_dst)
}

/// Resample `src` into an `out_w x out_h` frame.
///
/// `h_src_from_dst` maps output pixel coordinates into `src`; pixels that land
/// outside `src` read 0. Sampling uses integer pixel coordinates so an
/// identity transform reproduces the input exactly.
pub fn warp_perspective_gray(
    src: &GrayImageView<'_>,
    h_src_from_dst: &Homography,
    out_w: usize,
    out_h: usize,
) -> GrayImage {
    let mut out = GrayImage::new(out_w, out_h);

    for y in 0..out_h {
        let row = &mut out.data[y * out_w..(y + 1) * out_w];
        for (x, px) in row.iter_mut().enumerate() {
            let p = h_src_from_dst.apply(Point2::new(x as f32, y as f32));
            // NaN compares false, so this also drops points at infinity.
            if p.x > -1.0 && p.y > -1.0 && p.x < src.width as f32 && p.y < src.height as f32 {
                *px = sample_bilinear_u8(src, p.x, p.y);
            }
        }
    }

    out
}
