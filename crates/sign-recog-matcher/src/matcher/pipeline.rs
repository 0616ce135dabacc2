use super::{ClassificationResult, MatchError, MatchScore, MatcherParams};
use crate::features::{l2_distance, Descriptor, FeatureExtractor, Features};
use crate::library::{TemplateEntry, TemplateLibrary};
use crate::ransac::find_homography;
use nalgebra::Point2;
use sign_recog_core::{warp_perspective_gray, GrayImageView};
use std::collections::BTreeMap;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Indices `(query, train)` of query descriptors whose nearest train
/// descriptor passes the ratio test `d1 < ratio * d2`.
///
/// With fewer than two train descriptors there is no second neighbour and
/// nothing passes.
pub fn ratio_matches(
    query: &[Descriptor],
    train: &[Descriptor],
    ratio: f32,
) -> Vec<(usize, usize)> {
    if train.len() < 2 {
        return Vec::new();
    }

    let mut out = Vec::new();
    for (qi, q) in query.iter().enumerate() {
        let (mut best, mut second) = (f32::INFINITY, f32::INFINITY);
        let mut best_idx = 0;
        for (ti, t) in train.iter().enumerate() {
            let d = l2_distance(q, t);
            if d < best {
                second = best;
                best = d;
                best_idx = ti;
            } else if d < second {
                second = d;
            }
        }
        if best < ratio * second {
            out.push((qi, best_idx));
        }
    }
    out
}

fn z_normalized(data: &[u8], epsilon: f64) -> Vec<f64> {
    let n = data.len() as f64;
    let mean = data.iter().map(|&v| v as f64).sum::<f64>() / n;
    let var = data
        .iter()
        .map(|&v| (v as f64 - mean) * (v as f64 - mean))
        .sum::<f64>()
        / n;
    let scale = var.sqrt() + epsilon;
    data.iter().map(|&v| (v as f64 - mean) / scale).collect()
}

/// Mean absolute difference of the zero-mean, unit-variance versions of two
/// equally sized images. Constant images normalize to all zeros.
///
/// `None` for mismatched sizes, and when the result is not finite (a
/// constant image with `epsilon <= 0`).
pub fn appearance_distance(
    a: &GrayImageView<'_>,
    b: &GrayImageView<'_>,
    epsilon: f64,
) -> Option<f64> {
    if a.width != b.width
        || a.height != b.height
        || a.data.is_empty()
        || a.data.len() != b.data.len()
    {
        return None;
    }
    let za = z_normalized(a.data, epsilon);
    let zb = z_normalized(b.data, epsilon);
    let total: f64 = za.iter().zip(&zb).map(|(x, y)| (x - y).abs()).sum();
    let distance = total / za.len() as f64;
    distance.is_finite().then_some(distance)
}

/// Classifies query regions against a [`TemplateLibrary`].
#[derive(Clone, Debug, Default)]
pub struct TemplateMatcher {
    params: MatcherParams,
}

impl TemplateMatcher {
    pub fn new(params: MatcherParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &MatcherParams {
        &self.params
    }

    /// Score every template and convert the scores into confidences.
    ///
    /// Query features are computed once and shared by all templates.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, query, library),
            fields(width = query.width, height = query.height, templates = library.len())
        )
    )]
    pub fn predict(
        &self,
        query: &GrayImageView<'_>,
        library: &TemplateLibrary,
    ) -> Result<ClassificationResult, MatchError> {
        query.validate()?;
        let features = library.extractor().extract(query);
        log::debug!(
            "query {}x{}: {} keypoints",
            query.width,
            query.height,
            features.len()
        );

        let scores = self.score_all(query, &features, library);
        let result = ClassificationResult::from_scores(scores, self.params.epsilon);
        match result.best() {
            Some((label, c)) => log::debug!("best template '{label}' ({c:.3})"),
            None => log::debug!("no template matched"),
        }
        Ok(result)
    }

    /// Score of a single template.
    pub fn score(
        &self,
        query: &GrayImageView<'_>,
        library: &TemplateLibrary,
        label: &str,
    ) -> Result<MatchScore, MatchError> {
        query.validate()?;
        let entry = library
            .get(label)
            .ok_or_else(|| MatchError::UnknownLabel(label.to_string()))?;
        let features = library.extractor().extract(query);
        Ok(self.score_entry(query, &features, entry))
    }

    fn score_all(
        &self,
        query: &GrayImageView<'_>,
        features: &Features,
        library: &TemplateLibrary,
    ) -> BTreeMap<String, MatchScore> {
        #[cfg(feature = "rayon")]
        {
            if self.params.parallel {
                use rayon::prelude::*;
                let entries: Vec<&TemplateEntry> = library.entries().collect();
                return entries
                    .par_iter()
                    .map(|e| (e.label.clone(), self.score_entry(query, features, e)))
                    .collect();
            }
        }

        library
            .entries()
            .map(|e| (e.label.clone(), self.score_entry(query, features, e)))
            .collect()
    }

    fn score_entry(
        &self,
        query: &GrayImageView<'_>,
        features: &Features,
        entry: &TemplateEntry,
    ) -> MatchScore {
        let p = &self.params;
        let good = ratio_matches(&features.descriptors, &entry.descriptors, p.ratio_threshold);
        if good.len() < p.min_good_matches {
            log::debug!(
                "'{}': {} good matches, need {}",
                entry.label,
                good.len(),
                p.min_good_matches
            );
            return MatchScore::Unmatched;
        }

        let (src, dst): (Vec<_>, Vec<_>) = good
            .iter()
            .map(|&(qi, ti)| {
                let q = features.keypoints[qi];
                let t = entry.keypoints[ti];
                (Point2::new(q.x, q.y), Point2::new(t.x, t.y))
            })
            .unzip();

        let Some(fit) = find_homography(&src, &dst, p.ransac_reprojection_threshold, &p.ransac)
        else {
            log::debug!("'{}': no homography from {} matches", entry.label, good.len());
            return MatchScore::Unmatched;
        };
        let Some(template_to_query) = fit.homography.inverse() else {
            return MatchScore::Unmatched;
        };

        let warped = warp_perspective_gray(
            query,
            &template_to_query,
            entry.image.width,
            entry.image.height,
        );
        let Some(distance) = appearance_distance(&warped.view(), &entry.image.view(), p.epsilon)
        else {
            return MatchScore::Unmatched;
        };

        log::debug!(
            "'{}': {} good, {} inliers, distance {:.4}",
            entry.label,
            good.len(),
            fit.inliers.len(),
            distance
        );
        MatchScore::Matched(distance)
    }
}
