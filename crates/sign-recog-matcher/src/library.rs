//! Immutable set of labelled sign templates with precomputed features.

use crate::features::{Descriptor, FeatureExtractor, FeatureParams, HarrisExtractor, Keypoint};
use sign_recog_core::GrayImage;
use std::collections::BTreeMap;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors raised while building a [`TemplateLibrary`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    #[error("template '{label}' could not be loaded: {reason}")]
    TemplateLoad { label: String, reason: String },
    #[error("template '{label}' has no detectable features")]
    NoFeaturesFound { label: String },
    #[error("template label '{0}' is registered twice")]
    DuplicateLabel(String),
    #[error("no templates given")]
    Empty,
}

/// One registered template; `keypoints[i]` is described by `descriptors[i]`.
#[derive(Clone, Debug)]
pub struct TemplateEntry {
    pub label: String,
    pub image: GrayImage,
    pub keypoints: Vec<Keypoint>,
    pub descriptors: Vec<Descriptor>,
}

/// Label-ordered template set. Built once, then only read.
#[derive(Clone, Debug)]
pub struct TemplateLibrary {
    entries: BTreeMap<String, TemplateEntry>,
    extractor: HarrisExtractor,
}

impl TemplateLibrary {
    /// Detect and describe every template image.
    ///
    /// Fails on the first unusable template: an empty image is a
    /// [`LibraryError::TemplateLoad`], an image without keypoints is
    /// [`LibraryError::NoFeaturesFound`].
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(images, params)))]
    pub fn build<I, S>(images: I, params: FeatureParams) -> Result<Self, LibraryError>
    where
        I: IntoIterator<Item = (S, GrayImage)>,
        S: Into<String>,
    {
        let extractor = HarrisExtractor::new(params);
        let mut entries = BTreeMap::new();

        for (label, image) in images {
            let label = label.into();
            if entries.contains_key(&label) {
                return Err(LibraryError::DuplicateLabel(label));
            }
            let view = image.view();
            if let Err(err) = view.validate() {
                return Err(LibraryError::TemplateLoad {
                    label,
                    reason: err.to_string(),
                });
            }

            let features = extractor.extract(&view);
            if features.is_empty() {
                return Err(LibraryError::NoFeaturesFound { label });
            }
            log::debug!(
                "template '{}': {}x{}, {} keypoints",
                label,
                image.width,
                image.height,
                features.len()
            );

            entries.insert(
                label.clone(),
                TemplateEntry {
                    label,
                    image,
                    keypoints: features.keypoints,
                    descriptors: features.descriptors,
                },
            );
        }

        if entries.is_empty() {
            return Err(LibraryError::Empty);
        }
        log::info!("template library ready: {} templates", entries.len());
        Ok(Self { entries, extractor })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<&TemplateEntry> {
        self.entries.get(label)
    }

    /// Labels in ascending order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in label order.
    pub fn entries(&self) -> impl Iterator<Item = &TemplateEntry> {
        self.entries.values()
    }

    /// The extractor the templates were described with. Queries must use the
    /// same one to be comparable.
    pub fn extractor(&self) -> &HarrisExtractor {
        &self.extractor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::test_images::{blocks, faint_noise};

    #[test]
    fn entries_are_ordered_by_label() {
        let lib = TemplateLibrary::build(
            [
                ("uturn", blocks(96, 96, 3)),
                ("left", blocks(96, 96, 1)),
                ("right", blocks(96, 96, 2)),
            ],
            FeatureParams::default(),
        )
        .expect("library");
        assert_eq!(lib.labels().collect::<Vec<_>>(), ["left", "right", "uturn"]);
        for e in lib.entries() {
            assert_eq!(e.keypoints.len(), e.descriptors.len());
            assert!(!e.keypoints.is_empty());
        }
    }

    #[test]
    fn featureless_template_is_rejected() {
        let err = TemplateLibrary::build(
            [("left", blocks(96, 96, 1)), ("blank", faint_noise(96, 96, 9))],
            FeatureParams::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            LibraryError::NoFeaturesFound {
                label: "blank".into()
            }
        );
    }

    #[test]
    fn empty_image_is_a_load_error() {
        let err = TemplateLibrary::build(
            [("stop", GrayImage::new(0, 0))],
            FeatureParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LibraryError::TemplateLoad { ref label, .. } if label == "stop"));
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let err = TemplateLibrary::build(
            [("left", blocks(96, 96, 1)), ("left", blocks(96, 96, 2))],
            FeatureParams::default(),
        )
        .unwrap_err();
        assert_eq!(err, LibraryError::DuplicateLabel("left".into()));
    }

    #[test]
    fn no_templates_is_an_error() {
        let none: [(&str, GrayImage); 0] = [];
        let err = TemplateLibrary::build(none, FeatureParams::default()).unwrap_err();
        assert_eq!(err, LibraryError::Empty);
    }

    #[test]
    fn library_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TemplateLibrary>();
    }
}
