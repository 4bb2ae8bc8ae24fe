use serde::{Deserialize, Serialize};

use crate::error::SceneError;

const ELLIPSIS: &str = "...";

/// How long a display label may get before it is shortened.
///
/// Names longer than `max_chars` keep their first `keep_chars` characters and
/// gain an ellipsis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelLimit {
    pub max_chars: usize,
    pub keep_chars: usize,
}

/// File listing: up to 30 characters, then the first 30 plus an ellipsis.
pub const LIST_LABEL: LabelLimit = LabelLimit {
    max_chars: 30,
    keep_chars: 30,
};

/// Render legend: never longer than 20 characters including the ellipsis.
pub const LEGEND_LABEL: LabelLimit = LabelLimit {
    max_chars: 20,
    keep_chars: 17,
};

impl LabelLimit {
    pub fn new(max_chars: usize, keep_chars: usize) -> Result<Self, SceneError> {
        if keep_chars > max_chars {
            return Err(SceneError::BadLabelLimit {
                keep: keep_chars,
                max: max_chars,
            });
        }
        Ok(Self {
            max_chars,
            keep_chars,
        })
    }
}

/// Shorten `name` to fit `limit`. Counts characters, not bytes.
pub fn shorten(name: &str, limit: LabelLimit) -> String {
    if name.chars().count() <= limit.max_chars {
        return name.to_string();
    }
    let mut short: String = name.chars().take(limit.keep_chars).collect();
    short.push_str(ELLIPSIS);
    short
}
