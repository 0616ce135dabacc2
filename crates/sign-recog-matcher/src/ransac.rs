//! Robust homography estimation from putative correspondences.

use nalgebra::Point2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use sign_recog_core::{estimate_homography, homography_from_4pt, Homography};

/// Sampling budget for [`find_homography`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RansacParams {
    /// Upper bound on minimal-sample draws.
    pub max_iterations: usize,
    /// Probability of drawing at least one all-inlier sample, used to shrink
    /// the iteration count as the inlier ratio improves.
    pub confidence: f64,
    /// RNG seed; identical inputs give identical results.
    pub seed: u64,
}

impl Default for RansacParams {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            confidence: 0.995,
            seed: 0,
        }
    }
}

/// Homography with the correspondences that support it.
#[derive(Clone, Debug)]
pub struct RansacFit {
    pub homography: Homography,
    /// Indices into the input slices.
    pub inliers: Vec<usize>,
    pub iterations: usize,
}

const MIN_SAMPLE: usize = 4;

fn collinear(a: Point2<f32>, b: Point2<f32>, c: Point2<f32>) -> bool {
    let (ux, uy) = ((b.x - a.x) as f64, (b.y - a.y) as f64);
    let (vx, vy) = ((c.x - a.x) as f64, (c.y - a.y) as f64);
    let cross = ux * vy - uy * vx;
    cross.abs() < 1e-3
}

fn degenerate(p: &[Point2<f32>; 4]) -> bool {
    collinear(p[0], p[1], p[2])
        || collinear(p[0], p[1], p[3])
        || collinear(p[0], p[2], p[3])
        || collinear(p[1], p[2], p[3])
}

fn inliers_of(
    h: &Homography,
    src: &[Point2<f32>],
    dst: &[Point2<f32>],
    threshold: f64,
) -> Vec<usize> {
    (0..src.len())
        .filter(|&i| h.transfer_error(src[i], dst[i]) < threshold)
        .collect()
}

fn required_iterations(inlier_ratio: f64, confidence: f64, cap: usize) -> usize {
    if inlier_ratio >= 1.0 {
        return 0;
    }
    let all_in = inlier_ratio.powi(MIN_SAMPLE as i32);
    if all_in <= f64::EPSILON {
        return cap;
    }
    let n = (1.0 - confidence).ln() / (1.0 - all_in).ln();
    if n.is_finite() && n >= 0.0 {
        (n.ceil() as usize).min(cap)
    } else {
        cap
    }
}

/// RANSAC estimate of `H` with `dst ~ H * src`.
///
/// A correspondence is an inlier when its forward transfer error is below
/// `threshold` pixels. The best minimal-sample model is refit on its inliers
/// with the normalized DLT. Returns `None` with fewer than four
/// correspondences, when every sample is degenerate, or when the best model
/// has fewer than four inliers.
pub fn find_homography(
    src: &[Point2<f32>],
    dst: &[Point2<f32>],
    threshold: f64,
    params: &RansacParams,
) -> Option<RansacFit> {
    let n = src.len();
    if n != dst.len() || n < MIN_SAMPLE {
        return None;
    }

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut best: Option<(Homography, Vec<usize>)> = None;
    let mut budget = params.max_iterations;
    let mut iterations = 0;

    while iterations < budget {
        iterations += 1;

        let idx = rand::seq::index::sample(&mut rng, n, MIN_SAMPLE);
        let s = [src[idx.index(0)], src[idx.index(1)], src[idx.index(2)], src[idx.index(3)]];
        let d = [dst[idx.index(0)], dst[idx.index(1)], dst[idx.index(2)], dst[idx.index(3)]];
        if degenerate(&s) || degenerate(&d) {
            continue;
        }
        let Some(h) = homography_from_4pt(&s, &d).filter(Homography::is_usable) else {
            continue;
        };

        let inliers = inliers_of(&h, src, dst, threshold);
        if best.as_ref().is_none_or(|(_, b)| inliers.len() > b.len()) {
            let ratio = inliers.len() as f64 / n as f64;
            budget = budget.min(required_iterations(
                ratio,
                params.confidence,
                params.max_iterations,
            ));
            best = Some((h, inliers));
        }
    }

    let (h, inliers) = best?;
    if inliers.len() < MIN_SAMPLE {
        return None;
    }

    let in_src: Vec<_> = inliers.iter().map(|&i| src[i]).collect();
    let in_dst: Vec<_> = inliers.iter().map(|&i| dst[i]).collect();
    let refined = estimate_homography(&in_src, &in_dst).filter(Homography::is_usable);

    let (homography, inliers) = match refined {
        Some(r) => {
            let r_inliers = inliers_of(&r, src, dst, threshold);
            if r_inliers.len() >= inliers.len() {
                (r, r_inliers)
            } else {
                (h, inliers)
            }
        }
        None => (h, inliers),
    };

    log::trace!(
        "ransac: {}/{} inliers after {} iterations",
        inliers.len(),
        n,
        iterations
    );

    Some(RansacFit {
        homography,
        inliers,
        iterations,
    })
}
