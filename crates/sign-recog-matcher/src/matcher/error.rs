use sign_recog_core::ImageError;

/// Errors returned by [`TemplateMatcher`](super::TemplateMatcher).
///
/// A template that simply does not match is not an error; it scores
/// [`MatchScore::Unmatched`](super::MatchScore::Unmatched).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("invalid query image: {0}")]
    InvalidInput(#[from] ImageError),
    #[error("unknown template label '{0}'")]
    UnknownLabel(String),
}
