use thiserror::Error;

use crate::buffer::BufferError;
use crate::history::{HistoryAction, HistoryError};
use crate::transform::TransformError;

pub type EditResult<T> = std::result::Result<T, EditError>;

/// Recoverable failures of a single editing operation. None of them leave
/// the history in a partially committed state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("no image loaded")]
    NoImageLoaded,
    #[error("nothing to {action}")]
    NoHistory { action: HistoryAction },
    #[error("invalid crop region: {reason}")]
    InvalidRegion { reason: String },
    #[error("could not rasterize image: {message}")]
    DecodeFailure { message: String },
    #[error("busy applying {active}")]
    Busy { active: String },
    #[error("crop mode is not active")]
    CropInactive,
}

impl EditError {
    /// Short title for the notification that reports this error.
    pub fn title(&self) -> &'static str {
        match self {
            Self::NoImageLoaded => "No image loaded",
            Self::NoHistory { action } => action.failure_title(),
            Self::InvalidRegion { .. } => "Invalid crop area",
            Self::DecodeFailure { .. } => "Processing failed",
            Self::Busy { .. } => "Still processing",
            Self::CropInactive => "Crop mode inactive",
        }
    }

    /// Human-readable detail for the notification body.
    pub fn description(&self) -> String {
        match self {
            Self::NoHistory { action } => action.empty_message().to_string(),
            other => other.to_string(),
        }
    }
}

impl From<HistoryError> for EditError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::NoHistory { action } => Self::NoHistory { action },
        }
    }
}

impl From<TransformError> for EditError {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::InvalidRegion { reason } => Self::InvalidRegion { reason },
        }
    }
}

impl From<BufferError> for EditError {
    fn from(err: BufferError) -> Self {
        Self::DecodeFailure {
            message: err.to_string(),
        }
    }
}
