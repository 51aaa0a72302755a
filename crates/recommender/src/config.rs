//! Recommender configuration
//!
//! # Environment Variables
//!
//! - `PLAYRANK_SCALE_MIN` / `PLAYRANK_SCALE_MAX`: rating scale bounds (default: 1 / 10)
//! - `PLAYRANK_LATENT_FACTORS`: latent dimension k (default: 100)
//! - `PLAYRANK_EPOCHS`: SGD passes over the ratings (default: 20)
//! - `PLAYRANK_LEARNING_RATE`: SGD step size (default: 0.005)
//! - `PLAYRANK_REGULARIZATION`: L2 penalty on biases and factors (default: 0.02)
//! - `PLAYRANK_INIT_STD`: half-width of the uniform factor initialization (default: 0.1)
//! - `PLAYRANK_SEED`: RNG seed for initialization and epoch order (default: 42)
//! - `PLAYRANK_TOP_N`: recommendations per user (default: 10)
//! - `PLAYRANK_CLIP_SCORES`: clamp scores into the rating scale (default: false)

use crate::types::RatingScale;
use playrank_core::config::{parse_bool_env, parse_env_var, ConfigLoader};
use playrank_core::CoreError;
use serde::{Deserialize, Serialize};

/// Biased matrix factorization hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of latent factors (embedding dimension)
    pub latent_factors: usize,
    pub epochs: usize,
    pub learning_rate: f32,
    /// Regularization parameter (lambda)
    pub regularization: f32,
    /// Factors start uniformly in [-init_std, init_std)
    pub init_std: f32,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            latent_factors: 100,
            epochs: 20,
            learning_rate: 0.005,
            regularization: 0.02,
            init_std: 0.1,
            seed: 42,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.latent_factors == 0 {
            return Err(CoreError::config(
                "latent_factors must be greater than 0",
                "PLAYRANK_LATENT_FACTORS",
            ));
        }

        if self.epochs == 0 {
            return Err(CoreError::config(
                "epochs must be greater than 0",
                "PLAYRANK_EPOCHS",
            ));
        }

        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(CoreError::config(
                format!("learning_rate must be positive, got {}", self.learning_rate),
                "PLAYRANK_LEARNING_RATE",
            ));
        }

        if !self.regularization.is_finite() || self.regularization < 0.0 {
            return Err(CoreError::config(
                format!(
                    "regularization must be non-negative, got {}",
                    self.regularization
                ),
                "PLAYRANK_REGULARIZATION",
            ));
        }

        if !self.init_std.is_finite() || self.init_std < 0.0 {
            return Err(CoreError::config(
                format!("init_std must be non-negative, got {}", self.init_std),
                "PLAYRANK_INIT_STD",
            ));
        }

        Ok(())
    }
}

/// Full configuration surface of the recommender
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommenderConfig {
    pub scale: RatingScale,
    pub training: TrainingConfig,
    /// Maximum recommendations per user
    pub top_n: usize,
    /// Clamp predicted scores into `scale`
    pub clip_scores: bool,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            scale: RatingScale::default(),
            training: TrainingConfig::default(),
            top_n: 10,
            clip_scores: false,
        }
    }
}

impl ConfigLoader for RecommenderConfig {
    fn from_env() -> Result<Self, CoreError> {
        let defaults = Self::default();

        let scale = RatingScale::new(
            parse_env_var("PLAYRANK_SCALE_MIN", defaults.scale.min)?,
            parse_env_var("PLAYRANK_SCALE_MAX", defaults.scale.max)?,
        );

        let training = TrainingConfig {
            latent_factors: parse_env_var(
                "PLAYRANK_LATENT_FACTORS",
                defaults.training.latent_factors,
            )?,
            epochs: parse_env_var("PLAYRANK_EPOCHS", defaults.training.epochs)?,
            learning_rate: parse_env_var(
                "PLAYRANK_LEARNING_RATE",
                defaults.training.learning_rate,
            )?,
            regularization: parse_env_var(
                "PLAYRANK_REGULARIZATION",
                defaults.training.regularization,
            )?,
            init_std: parse_env_var("PLAYRANK_INIT_STD", defaults.training.init_std)?,
            seed: parse_env_var("PLAYRANK_SEED", defaults.training.seed)?,
        };

        Ok(Self {
            scale,
            training,
            top_n: parse_env_var("PLAYRANK_TOP_N", defaults.top_n)?,
            clip_scores: parse_bool_env("PLAYRANK_CLIP_SCORES", defaults.clip_scores)?,
        })
    }

    fn validate(&self) -> Result<(), CoreError> {
        self.scale.validate()?;
        self.training.validate()?;

        if self.top_n == 0 {
            return Err(CoreError::config(
                "top_n must be greater than 0",
                "PLAYRANK_TOP_N",
            ));
        }

        Ok(())
    }
}
