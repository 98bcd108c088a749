//! Error types shared by every module of the crate.

use crate::model::BoundsKey;
use thiserror::Error;

/// Errors raised by the grouping core.
///
/// All variants describe caller mistakes (bad parameters, mismatched
/// shapes, malformed input tables). None of them is transient, so
/// nothing in the crate retries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GroupingError {
    /// Shape-breaking or otherwise unusable input parameters.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The assignment shape makes a cost bound zero or meaningless.
    #[error("invalid assignment shape: {0}")]
    InvalidShape(String),

    /// Cost bounds were calibrated for a different assignment shape or population.
    #[error("cost bounds calibrated for {expected} but assignment has {found}")]
    StaleBounds {
        /// Key the bounds were computed for.
        expected: BoundsKey,
        /// Key of the assignment being evaluated.
        found: BoundsKey,
    },

    /// A tabular input row could not be turned into a participant.
    #[error("malformed table at row {row}: {message}")]
    MalformedTable {
        /// Zero-based row index in the source table.
        row: usize,
        /// What was wrong with the row.
        message: String,
    },
}

impl GroupingError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        GroupingError::InvalidParameters(message.into())
    }

    pub(crate) fn shape(message: impl Into<String>) -> Self {
        GroupingError::InvalidShape(message.into())
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, GroupingError>;
