//! Recommender error types

use playrank_core::CoreError;
use thiserror::Error;

/// Errors surfaced by indexing, training and scoring
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecommenderError {
    /// Rating is NaN, infinite, or outside the configured scale
    #[error(
        "Invalid rating {rating} for user '{user_id}' and item '{item_id}' \
         (expected a finite value in [{min}, {max}])"
    )]
    InvalidRating {
        user_id: String,
        item_id: String,
        rating: f32,
        min: f32,
        max: f32,
    },

    #[error("Cannot build a dataset from zero ratings")]
    EmptyDataset,

    #[error("Model has not been trained yet")]
    UntrainedModel,

    /// The same (user, item) pair was supplied more than once
    #[error("Duplicate rating for user '{user_id}' and item '{item_id}'")]
    DuplicateRating { user_id: String, item_id: String },

    /// Model parameters do not match each other or the dataset index
    #[error("Model shape mismatch: {message}")]
    ShapeMismatch { message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        message: String,
        key: Option<String>,
    },
}

impl From<CoreError> for RecommenderError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConfigurationError { message, key } => Self::InvalidConfig { message, key },
        }
    }
}

/// Result type alias for recommender operations
pub type Result<T> = std::result::Result<T, RecommenderError>;
