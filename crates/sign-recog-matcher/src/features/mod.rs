//! Keypoints and local descriptors.
//!
//! The detector is a Harris corner response with square non-maximum
//! suppression; each keypoint gets a dominant gradient orientation and a
//! 128-float histogram-of-gradients descriptor sampled on a patch rotated to
//! that orientation.

mod descriptor;
mod detector;

pub use descriptor::{describe, dominant_orientation, l2_distance, Descriptor, DESCRIPTOR_LEN};
pub use detector::{detect_keypoints, harris_response, FloatImage};

use serde::{Deserialize, Serialize};
use sign_recog_core::GrayImageView;

/// Detected interest point in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Harris response at the point.
    pub response: f32,
    /// Dominant gradient orientation, radians in `[-pi, pi)`.
    pub angle: f32,
}

/// Keypoints with their descriptors; `descriptors[i]` describes `keypoints[i]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Features {
    pub keypoints: Vec<Keypoint>,
    pub descriptors: Vec<Descriptor>,
}

impl Features {
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

/// Parameters of the keypoint detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureParams {
    /// Harris sensitivity `k` in `det - k * trace^2`.
    pub harris_k: f32,
    /// Absolute response floor, intensities scaled to `[0, 1]`.
    pub min_response: f32,
    /// Response floor relative to the strongest response in the image.
    pub relative_threshold: f32,
    /// Half-size of the square non-maximum suppression window.
    pub nms_radius: usize,
    /// Keypoints closer than this to the image border are dropped.
    pub border: usize,
    /// Strongest-N cap.
    pub max_keypoints: usize,
}

impl Default for FeatureParams {
    fn default() -> Self {
        Self {
            harris_k: 0.04,
            min_response: 1e-4,
            relative_threshold: 0.01,
            nms_radius: 3,
            border: 13,
            max_keypoints: 500,
        }
    }
}

/// Turns an intensity image into keypoints and descriptors.
pub trait FeatureExtractor: Send + Sync {
    fn extract(&self, image: &GrayImageView<'_>) -> Features;
}

/// Harris keypoints with oriented gradient-histogram descriptors.
#[derive(Clone, Debug, Default)]
pub struct HarrisExtractor {
    params: FeatureParams,
}

impl HarrisExtractor {
    pub fn new(params: FeatureParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &FeatureParams {
        &self.params
    }
}

impl FeatureExtractor for HarrisExtractor {
    fn extract(&self, image: &GrayImageView<'_>) -> Features {
        let smoothed = FloatImage::smoothed(image);
        let keypoints = detect_keypoints(&smoothed, &self.params);

        let (keypoints, descriptors) = keypoints
            .into_iter()
            .map(|mut kp| {
                kp.angle = dominant_orientation(&smoothed, kp.x, kp.y);
                let d = describe(&smoothed, &kp);
                (kp, d)
            })
            .unzip();

        Features {
            keypoints,
            descriptors,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_images {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use sign_recog_core::GrayImage;

    /// Ramp background with overlapping flat rectangles, fully determined by
    /// `seed`.
    pub fn blocks(width: usize, height: usize, seed: u64) -> GrayImage {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut img = GrayImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                img.data[y * width + x] = (60 + x / 3 + y / 5).min(255) as u8;
            }
        }
        for _ in 0..24 {
            let w = rng.gen_range(8..width / 4);
            let h = rng.gen_range(8..height / 4);
            let x0 = rng.gen_range(0..width - w);
            let y0 = rng.gen_range(0..height - h);
            let v: u8 = if rng.gen_bool(0.5) {
                rng.gen_range(0..50)
            } else {
                rng.gen_range(200..=255)
            };
            for y in y0..y0 + h {
                for x in x0..x0 + w {
                    img.data[y * width + x] = v;
                }
            }
        }
        img
    }

    /// Flat gray with +/-2 levels of uniform noise.
    pub fn faint_noise(width: usize, height: usize, seed: u64) -> GrayImage {
        let mut rng = StdRng::seed_from_u64(seed);
        let data = (0..width * height)
            .map(|_| (128 + rng.gen_range(-2i32..=2)) as u8)
            .collect();
        GrayImage {
            width,
            height,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_images::{blocks, faint_noise};
    use super::*;
    use sign_recog_core::GrayImage;

    #[test]
    fn blocks_produce_keypoints_with_unit_descriptors() {
        let img = blocks(120, 120, 7);
        let f = HarrisExtractor::default().extract(&img.view());
        assert!(f.len() >= 10, "only {} keypoints", f.len());
        assert_eq!(f.keypoints.len(), f.descriptors.len());
        for d in &f.descriptors {
            let norm: f32 = d.iter().map(|v| v * v).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-3, "norm {norm}");
            assert!(d.iter().all(|&v| v >= 0.0));
        }
    }

    #[test]
    fn faint_noise_has_no_keypoints() {
        let img = faint_noise(120, 120, 3);
        let f = HarrisExtractor::default().extract(&img.view());
        assert!(f.is_empty());
    }

    #[test]
    fn extraction_is_deterministic() {
        let img = blocks(96, 80, 11);
        let a = HarrisExtractor::default().extract(&img.view());
        let b = HarrisExtractor::default().extract(&img.view());
        assert_eq!(a, b);
    }

    #[test]
    fn images_inside_the_border_have_no_keypoints() {
        let mut img = GrayImage::new(24, 24);
        for y in 0..12 {
            for x in 0..12 {
                img.data[y * 24 + x] = 255;
            }
        }
        let f = HarrisExtractor::default().extract(&img.view());
        assert!(f.is_empty());
    }
}
