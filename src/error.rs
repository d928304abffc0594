//! Error types for prefix tree construction and cell decoding.

use geo::{Point, Rect};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PrefixTreeError>;

#[derive(Debug, Error)]
pub enum PrefixTreeError {
    /// Geohash needs the full circle of longitude.
    #[error("Geohash only supports lat-lon world bounds starting at longitude -180, got {0:?}")]
    InvalidWorldBounds(Rect<f64>),

    #[error("Max levels must be in [1, {max}] but got {got}")]
    InvalidLevelCount { max: usize, got: usize },

    #[error("Level {level} is outside [1, {max}]")]
    InvalidLevel { level: usize, max: usize },

    #[error("Coordinate out of range: {0:?}")]
    InvalidCoordinate(Point<f64>),

    #[error("Invalid cell token {token:?}: {reason}")]
    InvalidToken { token: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PrefixTreeError {
    pub(crate) fn invalid_token(bytes: &[u8], reason: impl ToString) -> Self {
        Self::InvalidToken {
            token: String::from_utf8_lossy(bytes).into_owned(),
            reason: reason.to_string(),
        }
    }
}
