use crate::io::RecognizerConfig;
use crate::{core, matcher, roi};
use serde::Serialize;
use std::path::Path;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the per-frame pipeline helpers.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognizeError {
    #[error(transparent)]
    Image(#[from] core::ImageError),

    #[error("region {bbox:?} lies outside the {width}x{height} frame")]
    RegionOutOfBounds {
        bbox: core::BoundingBox,
        width: u32,
        height: u32,
    },

    #[error(transparent)]
    Roi(#[from] roi::RoiError),

    #[error(transparent)]
    Match(#[from] matcher::MatchError),
}

/// Located region and the classification of its contents.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Recognition {
    pub region: core::BoundingBox,
    pub classification: matcher::ClassificationResult,
}

/// Convert an `image::GrayImage` into the lightweight `sign-recog-core` view type.
pub fn gray_view(img: &::image::GrayImage) -> core::GrayImageView<'_> {
    core::GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Convert an `image::RgbImage` into a color view with RGB channel order.
pub fn rgb_view(img: &::image::RgbImage) -> core::ColorImageView<'_> {
    core::ColorImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        order: core::ChannelOrder::Rgb,
        data: img.as_raw(),
    }
}

fn to_core_gray(img: ::image::GrayImage) -> core::GrayImage {
    core::GrayImage {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.into_raw(),
    }
}

/// Cut `bbox` out of a color frame and convert it to grayscale.
///
/// The crop spans columns `left..right` and rows `top..bottom`, so its size is
/// `bbox.width() x bbox.height()`. A zero-span box is rejected.
pub fn crop_gray(
    frame: &core::ColorImageView<'_>,
    bbox: &core::BoundingBox,
) -> Result<core::GrayImage, RecognizeError> {
    frame.validate()?;
    if !bbox.fits_in(frame.width as u32, frame.height as u32) {
        return Err(RecognizeError::RegionOutOfBounds {
            bbox: *bbox,
            width: frame.width as u32,
            height: frame.height as u32,
        });
    }

    let (w, h) = (bbox.width() as usize, bbox.height() as usize);
    if w == 0 || h == 0 {
        return Err(core::ImageError::InvalidDimensions {
            width: w,
            height: h,
        }
        .into());
    }

    let (x0, y0) = (bbox.left as usize, bbox.top as usize);
    let mut data = Vec::with_capacity(w * h);
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            data.push(core::luma(frame.rgb(x, y)));
        }
    }
    Ok(core::GrayImage {
        width: w,
        height: h,
        data,
    })
}

/// Locate the sign region in an RGB frame.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(img, params),
        fields(width = img.width(), height = img.height())
    )
)]
pub fn extract_region_rgb(
    img: &::image::RgbImage,
    params: &roi::RoiParams,
) -> Result<core::BoundingBox, roi::RoiError> {
    let extractor = roi::RoiExtractor::new(params.clone());
    extractor.detect(&core::FrameView::Color(rgb_view(img)))
}

/// Classify a grayscale region against `library`.
pub fn classify(
    region: &::image::GrayImage,
    library: &matcher::TemplateLibrary,
    params: &matcher::MatcherParams,
) -> Result<matcher::ClassificationResult, matcher::MatchError> {
    matcher::TemplateMatcher::new(params.clone()).predict(&gray_view(region), library)
}

/// Run the whole pipeline on one frame: mask, region, crop, classify.
///
/// A frame without a usable region is reported as [`RecognizeError::Roi`]
/// and nothing is classified.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(frame, library, config),
        fields(width = frame.width(), height = frame.height(), templates = library.len())
    )
)]
pub fn recognize(
    frame: &::image::RgbImage,
    library: &matcher::TemplateLibrary,
    config: &RecognizerConfig,
) -> Result<Recognition, RecognizeError> {
    let region = extract_region_rgb(frame, &config.roi_params())?;
    let crop = crop_gray(&rgb_view(frame), &region)?;
    log::debug!(
        "region {:?}, crop {}x{}",
        region,
        crop.width,
        crop.height
    );

    let classification =
        matcher::TemplateMatcher::new(config.matcher.clone()).predict(&crop.view(), library)?;
    Ok(Recognition {
        region,
        classification,
    })
}

/// Decode labelled encoded images (PNG, JPEG, ...) and build a library.
///
/// A template that cannot be decoded fails with
/// [`LibraryError::TemplateLoad`](matcher::LibraryError::TemplateLoad).
pub fn build_library_from_encoded<I, S, B>(
    images: I,
    params: matcher::FeatureParams,
) -> Result<matcher::TemplateLibrary, matcher::LibraryError>
where
    I: IntoIterator<Item = (S, B)>,
    S: Into<String>,
    B: AsRef<[u8]>,
{
    let mut decoded = Vec::new();
    for (label, bytes) in images {
        let label = label.into();
        let img = ::image::load_from_memory(bytes.as_ref()).map_err(|err| {
            matcher::LibraryError::TemplateLoad {
                label: label.clone(),
                reason: err.to_string(),
            }
        })?;
        decoded.push((label, to_core_gray(img.to_luma8())));
    }
    matcher::TemplateLibrary::build(decoded, params)
}

/// Read labelled template files from disk and build a library.
pub fn build_library_from_paths<I, S, P>(
    images: I,
    params: matcher::FeatureParams,
) -> Result<matcher::TemplateLibrary, matcher::LibraryError>
where
    I: IntoIterator<Item = (S, P)>,
    S: Into<String>,
    P: AsRef<Path>,
{
    let mut decoded = Vec::new();
    for (label, path) in images {
        let label = label.into();
        let path = path.as_ref();
        let img = ::image::open(path).map_err(|err| matcher::LibraryError::TemplateLoad {
            label: label.clone(),
            reason: format!("{}: {err}", path.display()),
        })?;
        log::debug!("loaded template '{}' from {}", label, path.display());
        decoded.push((label, to_core_gray(img.to_luma8())));
    }
    matcher::TemplateLibrary::build(decoded, params)
}
