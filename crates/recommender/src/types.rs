//! Core data types shared by the recommender modules

use crate::error::{RecommenderError, Result};
use playrank_core::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dense index assigned to a raw user or item id
pub type InnerId = usize;

/// A single explicit rating supplied by the ingestion layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub user_id: String,
    pub item_id: String,
    pub rating: f32,
}

impl RatingRecord {
    pub fn new(user_id: impl Into<String>, item_id: impl Into<String>, rating: f32) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
            rating,
        }
    }
}

/// Closed interval of accepted rating values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingScale {
    pub min: f32,
    pub max: f32,
}

impl Default for RatingScale {
    fn default() -> Self {
        Self {
            min: 1.0,
            max: 10.0,
        }
    }
}

impl RatingScale {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Bounds must be finite with `min < max`
    pub fn validate(&self) -> std::result::Result<(), CoreError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(CoreError::config(
                format!("rating scale bounds must be finite, got [{}, {}]", self.min, self.max),
                "PLAYRANK_SCALE_MIN",
            ));
        }
        if self.min >= self.max {
            return Err(CoreError::config(
                format!(
                    "rating scale min ({}) must be lower than max ({})",
                    self.min, self.max
                ),
                "PLAYRANK_SCALE_MAX",
            ));
        }
        Ok(())
    }

    /// Reject the first record whose rating is non-finite or out of bounds
    pub fn validate_ratings(&self, ratings: &[RatingRecord]) -> Result<()> {
        match ratings.iter().find(|r| !self.contains(r.rating)) {
            Some(bad) => Err(RecommenderError::InvalidRating {
                user_id: bad.user_id.clone(),
                item_id: bad.item_id.clone(),
                rating: bad.rating,
                min: self.min,
                max: self.max,
            }),
            None => Ok(()),
        }
    }
}

/// One ranked entry of a user's recommendation list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemScore {
    pub item_id: String,
    pub score: f32,
}

/// Estimated rating for a (user, item) pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub user_id: String,
    pub item_id: String,
    pub estimate: f32,
    /// True when the user or the item was not seen during training
    pub was_impossible: bool,
}

/// Recommendations for every known user, keyed by raw user id
pub type RecommendationSet = BTreeMap<String, Vec<ItemScore>>;
