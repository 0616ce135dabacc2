//! JSON configuration and report helpers for the recognizer.

use crate::matcher::{ClassificationResult, FeatureParams, MatchScore, MatcherParams};
use crate::roi::{ColorRange, RoiParams};
use crate::BoundingBox;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum RecognizerIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Every tunable of the pipeline plus the template files to load.
///
/// Missing fields fall back to their defaults, so `{}` is a valid config
/// (with an empty template set).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    pub color_range: ColorRange,
    pub margin: u32,
    pub min_size: (u32, u32),
    pub smoothing_radius: usize,
    pub matcher: MatcherParams,
    pub features: FeatureParams,
    /// Label → image path. Relative paths are resolved against the
    /// directory passed to [`RecognizerConfig::template_paths`].
    pub templates: BTreeMap<String, PathBuf>,
    pub output_path: Option<PathBuf>,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        let roi = RoiParams::default();
        Self {
            color_range: roi.color_range,
            margin: roi.margin,
            min_size: roi.min_size,
            smoothing_radius: roi.smoothing_radius,
            matcher: MatcherParams::default(),
            features: FeatureParams::default(),
            templates: BTreeMap::new(),
            output_path: None,
        }
    }
}

impl RecognizerConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, RecognizerIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), RecognizerIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Region-extraction parameters carried by this config.
    pub fn roi_params(&self) -> RoiParams {
        RoiParams {
            color_range: self.color_range,
            margin: self.margin,
            min_size: self.min_size,
            smoothing_radius: self.smoothing_radius,
        }
    }

    /// Template paths with relative entries joined onto `base_dir`.
    pub fn template_paths(&self, base_dir: impl AsRef<Path>) -> Vec<(String, PathBuf)> {
        let base_dir = base_dir.as_ref();
        self.templates
            .iter()
            .map(|(label, path)| (label.clone(), base_dir.join(path)))
            .collect()
    }

    /// Load every template and build the library.
    #[cfg(feature = "image")]
    pub fn build_library(
        &self,
        base_dir: impl AsRef<Path>,
    ) -> Result<crate::TemplateLibrary, crate::matcher::LibraryError> {
        crate::detect::build_library_from_paths(
            self.template_paths(base_dir),
            self.features.clone(),
        )
    }
}

/// Per-image outcome written by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionReport {
    pub image_path: String,
    pub region: Option<BoundingBox>,
    #[serde(default)]
    pub confidences: BTreeMap<String, f64>,
    #[serde(default)]
    pub scores: BTreeMap<String, MatchScore>,
    pub best: Option<String>,
    pub error: Option<String>,
}

impl RecognitionReport {
    pub fn success(
        image_path: impl Into<String>,
        region: BoundingBox,
        classification: &ClassificationResult,
    ) -> Self {
        Self {
            image_path: image_path.into(),
            region: Some(region),
            confidences: classification.confidences.clone(),
            scores: classification.scores.clone(),
            best: classification.best().map(|(label, _)| label.to_string()),
            error: None,
        }
    }

    pub fn failure(image_path: impl Into<String>, error: impl ToString) -> Self {
        Self {
            image_path: image_path.into(),
            region: None,
            confidences: BTreeMap::new(),
            scores: BTreeMap::new(),
            best: None,
            error: Some(error.to_string()),
        }
    }

    /// Load a list of reports from disk.
    pub fn load_all_json(path: impl AsRef<Path>) -> Result<Vec<Self>, RecognizerIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write a list of reports to disk as pretty JSON.
    pub fn write_all_json(
        reports: &[Self],
        path: impl AsRef<Path>,
    ) -> Result<(), RecognizerIoError> {
        let json = serde_json::to_string_pretty(reports)?;
        fs::write(path, json)?;
        Ok(())
    }
}
