use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Appearance distance of one template, lower is better.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchScore {
    Matched(f64),
    Unmatched,
}

impl MatchScore {
    /// Distance, `+inf` when unmatched.
    pub fn value(&self) -> f64 {
        match self {
            MatchScore::Matched(d) => *d,
            MatchScore::Unmatched => f64::INFINITY,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, MatchScore::Matched(_))
    }
}

/// Per-label confidences and the scores they came from.
///
/// Confidences are in `[0, 1]` and sum to 1 when any label matched; when none
/// did, every confidence is 0.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub confidences: BTreeMap<String, f64>,
    pub scores: BTreeMap<String, MatchScore>,
}

impl ClassificationResult {
    /// Inverse-and-normalize: `1 / (distance + epsilon)` over matched labels.
    ///
    /// When some affinity is infinite (`distance + epsilon == 0`) those labels
    /// share the whole mass evenly. NaN distances count as unmatched.
    pub fn from_scores(scores: BTreeMap<String, MatchScore>, epsilon: f64) -> Self {
        let affinity = |s: &MatchScore| match s {
            MatchScore::Matched(d) if !d.is_nan() => {
                let a = 1.0 / (d + epsilon);
                if a.is_nan() {
                    0.0
                } else {
                    a.max(0.0)
                }
            }
            _ => 0.0,
        };
        let perfect = scores
            .values()
            .filter(|s| affinity(s) == f64::INFINITY)
            .count();
        let total: f64 = scores.values().map(affinity).sum();

        let confidences = scores
            .iter()
            .map(|(label, s)| {
                let a = affinity(s);
                let c = if perfect > 0 {
                    if a == f64::INFINITY {
                        1.0 / perfect as f64
                    } else {
                        0.0
                    }
                } else if total > 0.0 && total.is_finite() {
                    a / total
                } else {
                    0.0
                };
                (label.clone(), c)
            })
            .collect();

        Self {
            confidences,
            scores,
        }
    }

    pub fn confidence(&self, label: &str) -> Option<f64> {
        self.confidences.get(label).copied()
    }

    pub fn any_matched(&self) -> bool {
        self.scores.values().any(MatchScore::is_matched)
    }

    /// Highest-confidence label; the first label wins ties. `None` when
    /// nothing matched.
    pub fn best(&self) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (label, &c) in &self.confidences {
            if c > 0.0 && best.is_none_or(|(_, b)| c > b) {
                best = Some((label.as_str(), c));
            }
        }
        best
    }
}
