use meshboard_core::AssetId;

/// Errors raised by asset store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(AssetId),
}

/// Errors raised while turning a payload into a mesh. Always scoped to the
/// single asset being decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("payload is neither binary nor ASCII STL")]
    UnrecognizedFormat,

    #[error("binary STL declares {declared} triangles but payload holds {actual} bytes")]
    LengthMismatch { declared: u32, actual: usize },

    #[error("malformed ASCII STL at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("non-finite vertex coordinate in triangle {triangle}")]
    NonFinite { triangle: usize },

    #[error("mesh contains no triangles")]
    NoGeometry,
}
