use super::{FloatImage, Keypoint};
use std::f32::consts::PI;

/// Number of floats in a descriptor: 4x4 cells times 8 orientation bins.
pub const DESCRIPTOR_LEN: usize = 128;

pub type Descriptor = [f32; DESCRIPTOR_LEN];

const CELLS: usize = 4;
const BINS: usize = 8;
const PATCH: usize = 16;
const SIGMA: f32 = 8.0;
const CLIP: f32 = 0.2;

const ORIENT_RADIUS: i64 = 8;
const ORIENT_BINS: usize = 36;
const ORIENT_SIGMA: f32 = 4.0;

/// Dominant gradient direction around `(x, y)`, radians in `[-pi, pi)`.
///
/// Gaussian-weighted 36-bin histogram of central-difference gradients inside
/// a disk of radius 8; the center of the first maximal bin is returned.
pub fn dominant_orientation(img: &FloatImage, x: f32, y: f32) -> f32 {
    let (cx, cy) = (x.round() as i64, y.round() as i64);
    let mut hist = [0.0f32; ORIENT_BINS];

    for dy in -ORIENT_RADIUS..=ORIENT_RADIUS {
        for dx in -ORIENT_RADIUS..=ORIENT_RADIUS {
            let r2 = (dx * dx + dy * dy) as f32;
            if r2 > (ORIENT_RADIUS * ORIENT_RADIUS) as f32 {
                continue;
            }
            let (px, py) = (cx + dx, cy + dy);
            let gx = 0.5 * (img.at_clamped(px + 1, py) - img.at_clamped(px - 1, py));
            let gy = 0.5 * (img.at_clamped(px, py + 1) - img.at_clamped(px, py - 1));
            let mag = (gx * gx + gy * gy).sqrt();
            if mag == 0.0 {
                continue;
            }
            let weight = (-r2 / (2.0 * ORIENT_SIGMA * ORIENT_SIGMA)).exp();
            hist[angle_bin(gy.atan2(gx), ORIENT_BINS)] += weight * mag;
        }
    }

    let mut best = 0;
    for (i, &v) in hist.iter().enumerate() {
        if v > hist[best] {
            best = i;
        }
    }
    -PI + (best as f32 + 0.5) * (2.0 * PI / ORIENT_BINS as f32)
}

fn angle_bin(angle: f32, bins: usize) -> usize {
    let t = (angle + PI) / (2.0 * PI);
    ((t * bins as f32).floor() as usize).min(bins - 1)
}

/// Gradient-histogram descriptor of the 16x16 patch centered on `kp`, rotated
/// by `kp.angle`.
///
/// The result is L2-normalized, clipped at 0.2 and normalized again. A patch
/// without any gradient yields the zero vector.
pub fn describe(img: &FloatImage, kp: &Keypoint) -> Descriptor {
    // 18x18 samples give central differences on the inner 16x16
    const N: usize = PATCH + 2;
    let (sin, cos) = kp.angle.sin_cos();
    let half = (N as f32 - 1.0) / 2.0;

    let mut samples = [[0.0f32; N]; N];
    for (j, row) in samples.iter_mut().enumerate() {
        for (i, s) in row.iter_mut().enumerate() {
            let u = i as f32 - half;
            let v = j as f32 - half;
            let px = kp.x + u * cos - v * sin;
            let py = kp.y + u * sin + v * cos;
            *s = img.sample(px, py);
        }
    }

    let mut desc = [0.0f32; DESCRIPTOR_LEN];
    for j in 1..N - 1 {
        for i in 1..N - 1 {
            let gx = 0.5 * (samples[j][i + 1] - samples[j][i - 1]);
            let gy = 0.5 * (samples[j + 1][i] - samples[j - 1][i]);
            let mag = (gx * gx + gy * gy).sqrt();
            if mag == 0.0 {
                continue;
            }
            let u = i as f32 - half;
            let v = j as f32 - half;
            let weight = (-(u * u + v * v) / (2.0 * SIGMA * SIGMA)).exp();

            let cell_x = (i - 1) * CELLS / PATCH;
            let cell_y = (j - 1) * CELLS / PATCH;
            let bin = angle_bin(gy.atan2(gx), BINS);
            desc[(cell_y * CELLS + cell_x) * BINS + bin] += weight * mag;
        }
    }

    normalize(&mut desc);
    for v in desc.iter_mut() {
        *v = v.min(CLIP);
    }
    normalize(&mut desc);
    desc
}

fn normalize(desc: &mut Descriptor) {
    let norm = desc.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 1e-12 {
        desc.iter_mut().for_each(|v| *v /= norm);
    }
}

/// Euclidean distance between two descriptors.
#[inline]
pub fn l2_distance(a: &Descriptor, b: &Descriptor) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}
