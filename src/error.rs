//! Unified error type for configuration and input loading.
//!
//! The capture pipeline itself never fails hard: rejected fixes and failed
//! validations are reported as typed reasons (see [`crate::PointStatus`] and
//! [`crate::ValidationFailure`]). `CaptureError` covers the edges of the
//! crate where a caller hands us something unusable.

use thiserror::Error;

/// Errors raised by configuration checks and input loaders.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("{context}: {point_count} points, need at least {minimum_required}")]
    InsufficientPoints {
        context: String,
        point_count: usize,
        minimum_required: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse GPX: {0}")]
    Gpx(String),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CaptureError>;

/// Convert an empty `Option` into a `CaptureError`.
pub trait OptionExt<T> {
    /// Map `None` to [`CaptureError::InsufficientPoints`].
    fn ok_or_insufficient_points(
        self,
        context: &str,
        point_count: usize,
        minimum_required: usize,
    ) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_insufficient_points(
        self,
        context: &str,
        point_count: usize,
        minimum_required: usize,
    ) -> Result<T> {
        self.ok_or_else(|| CaptureError::InsufficientPoints {
            context: context.to_string(),
            point_count,
            minimum_required,
        })
    }
}
