use meshboard_core::ColorParseError;

/// Errors raised while configuring scene composition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("palette must contain at least one color")]
    EmptyPalette,

    #[error("invalid palette color: {0}")]
    BadColor(#[from] ColorParseError),

    #[error("label limit keeps {keep} characters but allows only {max}")]
    BadLabelLimit { keep: usize, max: usize },
}
