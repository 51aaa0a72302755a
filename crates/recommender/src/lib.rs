//! Playrank Recommender
//!
//! Personalized top-N recommendations from explicit ratings using a biased
//! matrix factorization model trained with stochastic gradient descent.
//!
//! Data flow: ratings -> `DatasetIndex` -> `MatrixFactorization` -> `TrainedModel`
//! -> `Recommender` (per user) -> `BatchBuilder` (all users).

pub mod batch;
pub mod config;
pub mod dataset;
pub mod error;
pub mod matrix_factorization;
pub mod recommendation;
pub mod types;

// Re-export key types
pub use batch::BatchBuilder;
pub use config::{RecommenderConfig, TrainingConfig};
pub use dataset::DatasetIndex;
pub use error::{RecommenderError, Result};
pub use matrix_factorization::{FactorModel, MatrixFactorization, TrainedModel, TrainingReport};
pub use recommendation::{rank_order, Recommender};
pub use types::*;

use playrank_core::config::ConfigLoader;

/// Recommender engine instance
///
/// Owns only configuration; trained models are returned as values so several
/// can coexist.
#[derive(Debug, Clone)]
pub struct RecommenderEngine {
    config: RecommenderConfig,
}

impl RecommenderEngine {
    pub fn new(config: RecommenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn with_default_config() -> Self {
        Self {
            config: RecommenderConfig::default(),
        }
    }

    /// Load `.env`, then read and validate `PLAYRANK_*` variables
    pub fn from_env() -> Result<Self> {
        playrank_core::load_dotenv();
        Self::new(RecommenderConfig::from_env()?)
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Validate ratings and fit a model
    pub fn train(&self, ratings: &[RatingRecord]) -> Result<TrainedModel> {
        let mut mf = MatrixFactorization::new(self.config.training.clone(), self.config.scale);
        mf.fit(ratings)?;
        mf.into_trained()
    }

    /// Recommender honoring the configured clipping policy
    pub fn recommender<'a>(&self, trained: &'a TrainedModel) -> Result<Recommender<'a>> {
        let recommender = trained.recommender();
        if self.config.clip_scores {
            recommender.with_clipping(self.config.scale)
        } else {
            Ok(recommender)
        }
    }

    /// Top-N list for one user
    pub fn recommend(&self, trained: &TrainedModel, user_id: &str) -> Result<Vec<ItemScore>> {
        Ok(self
            .recommender(trained)?
            .recommend(user_id, self.config.top_n))
    }

    /// Top-N lists for every known user
    pub fn recommend_all(&self, trained: &TrainedModel) -> Result<RecommendationSet> {
        Ok(BatchBuilder::new(self.recommender(trained)?, self.config.top_n).build())
    }
}

#[cfg(test)]
mod tests;
