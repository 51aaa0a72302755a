//! Batch recommendation builder
//!
//! Runs the recommender for every user known to the index. Users are scored in
//! parallel on the rayon pool; the model is only read.

use crate::recommendation::Recommender;
use crate::types::{ItemScore, RecommendationSet};
use rayon::prelude::*;

/// Builds the full user -> recommendations mapping
pub struct BatchBuilder<'a> {
    recommender: Recommender<'a>,
    top_n: usize,
}

impl<'a> BatchBuilder<'a> {
    pub fn new(recommender: Recommender<'a>, top_n: usize) -> Self {
        Self { recommender, top_n }
    }

    pub fn build(&self) -> RecommendationSet {
        let users: Vec<&str> = self.recommender.index().all_users().collect();

        let results: Vec<(String, Vec<ItemScore>)> = users
            .par_iter()
            .map(|&user| {
                (
                    user.to_string(),
                    self.recommender.recommend(user, self.top_n),
                )
            })
            .collect();

        let set: RecommendationSet = results.into_iter().collect();

        tracing::info!(
            users = set.len(),
            recommendations = set.values().map(Vec::len).sum::<usize>(),
            top_n = self.top_n,
            "Built batch recommendations"
        );

        set
    }

    /// Single-threaded equivalent of `build`
    pub fn build_sequential(&self) -> RecommendationSet {
        self.recommender
            .index()
            .all_users()
            .map(|user| {
                (
                    user.to_string(),
                    self.recommender.recommend(user, self.top_n),
                )
            })
            .collect()
    }
}
