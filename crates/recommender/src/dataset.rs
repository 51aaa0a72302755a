//! Dataset index
//!
//! Maps raw user and item ids to dense indices, in order of first appearance,
//! and keeps the training ratings in index space. Built once and never mutated.

use crate::error::{RecommenderError, Result};
use crate::types::{InnerId, RatingRecord};
use std::collections::{HashMap, HashSet};

/// Bidirectional raw id <-> dense index mapping over a complete rating set
#[derive(Debug, Clone)]
pub struct DatasetIndex {
    /// Reverse mapping: index to user ID
    user_ids: Vec<String>,
    /// Reverse mapping: index to item ID
    item_ids: Vec<String>,
    user_lookup: HashMap<String, InnerId>,
    item_lookup: HashMap<String, InnerId>,
    /// Per-user (item index, rating) lists
    user_ratings: Vec<Vec<(InnerId, f32)>>,
    /// (user index, item index, rating) in input order
    ratings: Vec<(InnerId, InnerId, f32)>,
}

impl DatasetIndex {
    /// Index every distinct user and item in `ratings`
    ///
    /// Fails with `EmptyDataset` on empty input and `DuplicateRating` when a
    /// (user, item) pair occurs twice. Rating values are not checked here.
    pub fn build(ratings: &[RatingRecord]) -> Result<Self> {
        if ratings.is_empty() {
            return Err(RecommenderError::EmptyDataset);
        }

        let mut index = Self {
            user_ids: Vec::new(),
            item_ids: Vec::new(),
            user_lookup: HashMap::new(),
            item_lookup: HashMap::new(),
            user_ratings: Vec::new(),
            ratings: Vec::with_capacity(ratings.len()),
        };
        let mut seen: HashSet<(InnerId, InnerId)> = HashSet::with_capacity(ratings.len());

        for record in ratings {
            let user_idx = match index.user_lookup.get(&record.user_id) {
                Some(&idx) => idx,
                None => {
                    let idx = index.user_ids.len();
                    index.user_lookup.insert(record.user_id.clone(), idx);
                    index.user_ids.push(record.user_id.clone());
                    index.user_ratings.push(Vec::new());
                    idx
                }
            };

            let item_idx = match index.item_lookup.get(&record.item_id) {
                Some(&idx) => idx,
                None => {
                    let idx = index.item_ids.len();
                    index.item_lookup.insert(record.item_id.clone(), idx);
                    index.item_ids.push(record.item_id.clone());
                    idx
                }
            };

            if !seen.insert((user_idx, item_idx)) {
                return Err(RecommenderError::DuplicateRating {
                    user_id: record.user_id.clone(),
                    item_id: record.item_id.clone(),
                });
            }

            index.user_ratings[user_idx].push((item_idx, record.rating));
            index.ratings.push((user_idx, item_idx, record.rating));
        }

        tracing::info!(
            users = index.num_users(),
            items = index.num_items(),
            ratings = index.num_ratings(),
            "Built dataset index"
        );

        Ok(index)
    }

    /// Dense index of a raw user id, `None` if the user was never seen
    pub fn to_inner_user(&self, raw_id: &str) -> Option<InnerId> {
        self.user_lookup.get(raw_id).copied()
    }

    /// Dense index of a raw item id, `None` if the item was never seen
    pub fn to_inner_item(&self, raw_id: &str) -> Option<InnerId> {
        self.item_lookup.get(raw_id).copied()
    }

    pub fn to_raw_user(&self, inner: InnerId) -> Option<&str> {
        self.user_ids.get(inner).map(String::as_str)
    }

    pub fn to_raw_item(&self, inner: InnerId) -> Option<&str> {
        self.item_ids.get(inner).map(String::as_str)
    }

    /// Known item ids, ordered by dense index
    pub fn all_items(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.item_ids.iter().map(String::as_str)
    }

    /// Known user ids, ordered by dense index
    pub fn all_users(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.user_ids.iter().map(String::as_str)
    }

    /// Raw ids of the items `user` rated; empty for unknown users
    pub fn rated_items(&self, user: &str) -> HashSet<&str> {
        self.to_inner_user(user)
            .map(|u| {
                self.user_ratings[u]
                    .iter()
                    .map(|&(i, _)| self.item_ids[i].as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// (item index, rating) pairs of a known user
    pub fn user_ratings(&self, user: InnerId) -> &[(InnerId, f32)] {
        self.user_ratings
            .get(user)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Training triples in index space
    pub fn ratings(&self) -> &[(InnerId, InnerId, f32)] {
        &self.ratings
    }

    /// Arithmetic mean of all ratings
    pub fn global_mean(&self) -> f32 {
        let sum: f64 = self.ratings.iter().map(|&(_, _, r)| r as f64).sum();
        (sum / self.ratings.len() as f64) as f32
    }

    pub fn num_users(&self) -> usize {
        self.user_ids.len()
    }

    pub fn num_items(&self) -> usize {
        self.item_ids.len()
    }

    pub fn num_ratings(&self) -> usize {
        self.ratings.len()
    }
}
