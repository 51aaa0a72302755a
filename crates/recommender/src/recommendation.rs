//! Top-N Recommendation Generation
//!
//! Scores every item a user has not rated and returns a deterministic ranking.
//!
//! Steps:
//! 1. Resolve the user; unknown users get an empty list
//! 2. Exclude items the user rated during training
//! 3. Score the remaining items with the factor model
//! 4. Rank by score descending, ties by ascending item id
//! 5. Keep the first N

use crate::dataset::DatasetIndex;
use crate::error::{RecommenderError, Result};
use crate::matrix_factorization::{FactorModel, TrainedModel};
use crate::types::{InnerId, ItemScore, Prediction, RatingScale};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Read-only scorer over an immutable (index, model) pair
#[derive(Debug, Clone, Copy)]
pub struct Recommender<'a> {
    index: &'a DatasetIndex,
    model: &'a FactorModel,
    clip: Option<RatingScale>,
}

impl<'a> Recommender<'a> {
    /// Pair a model with the index it was trained on
    ///
    /// Fails with `ShapeMismatch` when the model's user or item counts differ
    /// from the index.
    pub fn new(index: &'a DatasetIndex, model: &'a FactorModel) -> Result<Self> {
        if model.num_users() != index.num_users() || model.num_items() != index.num_items() {
            return Err(RecommenderError::ShapeMismatch {
                message: format!(
                    "model has {} users and {} items, index has {} users and {} items",
                    model.num_users(),
                    model.num_items(),
                    index.num_users(),
                    index.num_items()
                ),
            });
        }

        Ok(Self {
            index,
            model,
            clip: None,
        })
    }

    pub fn from_trained(trained: &'a TrainedModel) -> Self {
        Self {
            index: trained.index(),
            model: trained.model(),
            clip: None,
        }
    }

    /// Clamp every score into `scale`, which must be a valid interval
    pub fn with_clipping(mut self, scale: RatingScale) -> Result<Self> {
        scale.validate()?;
        self.clip = Some(scale);
        Ok(self)
    }

    pub fn index(&self) -> &'a DatasetIndex {
        self.index
    }

    fn score(&self, user: InnerId, item: InnerId) -> f32 {
        let estimate = self.model.predict(user, item);
        match self.clip {
            Some(scale) => scale.clamp(estimate),
            None => estimate,
        }
    }

    /// Estimate for any raw (user, item) pair
    ///
    /// Unknown ids are not an error: the estimate falls back to the global mean
    /// plus the bias terms that are known, and `was_impossible` is set.
    pub fn predict(&self, user_id: &str, item_id: &str) -> Prediction {
        let user = self.index.to_inner_user(user_id);
        let item = self.index.to_inner_item(item_id);

        let estimate = match (user, item) {
            (Some(u), Some(i)) => self.model.predict(u, i),
            (Some(u), None) => self.model.global_mean() + self.model.user_bias()[u],
            (None, Some(i)) => self.model.global_mean() + self.model.item_bias()[i],
            (None, None) => self.model.global_mean(),
        };

        Prediction {
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
            estimate: self.clip.map_or(estimate, |scale| scale.clamp(estimate)),
            was_impossible: user.is_none() || item.is_none(),
        }
    }

    /// Top-`n` items `user_id` has not rated
    pub fn recommend(&self, user_id: &str, n: usize) -> Vec<ItemScore> {
        let Some(user) = self.index.to_inner_user(user_id) else {
            tracing::debug!(user_id, "Unknown user, returning no recommendations");
            return Vec::new();
        };

        let rated: HashSet<InnerId> = self
            .index
            .user_ratings(user)
            .iter()
            .map(|&(item, _)| item)
            .collect();

        let mut candidates: Vec<ItemScore> = self
            .index
            .all_items()
            .enumerate()
            .filter(|(item, _)| !rated.contains(item))
            .map(|(item, item_id)| ItemScore {
                item_id: item_id.to_string(),
                score: self.score(user, item),
            })
            .collect();

        let take = n.min(candidates.len());
        if take == 0 {
            return Vec::new();
        }
        if take < candidates.len() {
            candidates.select_nth_unstable_by(take - 1, rank_order);
            candidates.truncate(take);
        }
        candidates.sort_unstable_by(rank_order);

        candidates
    }
}

/// Score descending, then item id ascending
pub fn rank_order(a: &ItemScore, b: &ItemScore) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.item_id.cmp(&b.item_id))
}
