use sign_recog_core::{BoundingBox, ImageError};

/// Errors returned by region extraction.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RoiError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
    #[error("no candidate region found")]
    NoRegionFound,
    #[error("region {bbox:?} is below the minimum size")]
    RegionTooSmall { bbox: BoundingBox },
}

impl RoiError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

impl From<ImageError> for RoiError {
    fn from(err: ImageError) -> Self {
        Self::invalid(err.to_string())
    }
}
