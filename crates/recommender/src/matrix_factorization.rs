//! Biased Matrix Factorization trained with Stochastic Gradient Descent
//!
//! Learns a global mean, per-user and per-item biases and latent factors so that
//! `mean + b_u + b_i + dot(p_u, q_i)` approximates the observed explicit ratings.
//! Training is single-threaded and fully determined by the ratings, the
//! configuration and the seed.

use crate::config::TrainingConfig;
use crate::dataset::DatasetIndex;
use crate::error::{RecommenderError, Result};
use crate::recommendation::Recommender;
use crate::types::{InnerId, ItemScore, Prediction, RatingRecord, RatingScale};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Learned parameters of a biased factor model
///
/// Every user and item vector has the same length k, and each bias vector has
/// one entry per factor row. Both hold for the lifetime of the value.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorModel {
    global_mean: f32,
    user_bias: Array1<f32>,
    item_bias: Array1<f32>,
    /// User latent factors: [num_users x latent_factors]
    user_factors: Array2<f32>,
    /// Item latent factors: [num_items x latent_factors]
    item_factors: Array2<f32>,
}

impl FactorModel {
    /// Assemble a model from raw parameters, checking that the shapes agree
    pub fn from_parts(
        global_mean: f32,
        user_bias: Array1<f32>,
        item_bias: Array1<f32>,
        user_factors: Array2<f32>,
        item_factors: Array2<f32>,
    ) -> Result<Self> {
        let k = user_factors.ncols();
        let mismatch = |message: String| Err(RecommenderError::ShapeMismatch { message });

        if !global_mean.is_finite() {
            return mismatch(format!("global mean must be finite, got {}", global_mean));
        }
        if k == 0 {
            return mismatch("latent dimension must be greater than 0".to_string());
        }
        if item_factors.ncols() != k {
            return mismatch(format!(
                "item factors have {} columns, user factors have {}",
                item_factors.ncols(),
                k
            ));
        }
        if user_bias.len() != user_factors.nrows() {
            return mismatch(format!(
                "{} user biases for {} user factor rows",
                user_bias.len(),
                user_factors.nrows()
            ));
        }
        if item_bias.len() != item_factors.nrows() {
            return mismatch(format!(
                "{} item biases for {} item factor rows",
                item_bias.len(),
                item_factors.nrows()
            ));
        }

        Ok(Self {
            global_mean,
            user_bias,
            item_bias,
            user_factors,
            item_factors,
        })
    }

    /// Fresh parameters: zero biases, factors uniform in [-init_std, init_std)
    fn initialize(
        num_users: usize,
        num_items: usize,
        global_mean: f32,
        config: &TrainingConfig,
        rng: &mut StdRng,
    ) -> Self {
        let k = config.latent_factors;
        let spread = config.init_std;
        let mut draw = |_: (usize, usize)| {
            if spread > 0.0 {
                rng.gen_range(-spread..spread)
            } else {
                0.0
            }
        };

        let user_factors = Array2::from_shape_fn((num_users, k), &mut draw);
        let item_factors = Array2::from_shape_fn((num_items, k), &mut draw);

        Self {
            global_mean,
            user_bias: Array1::zeros(num_users),
            item_bias: Array1::zeros(num_items),
            user_factors,
            item_factors,
        }
    }

    pub fn global_mean(&self) -> f32 {
        self.global_mean
    }

    pub fn user_bias(&self) -> ArrayView1<'_, f32> {
        self.user_bias.view()
    }

    pub fn item_bias(&self) -> ArrayView1<'_, f32> {
        self.item_bias.view()
    }

    pub fn user_factors(&self) -> ArrayView2<'_, f32> {
        self.user_factors.view()
    }

    pub fn item_factors(&self) -> ArrayView2<'_, f32> {
        self.item_factors.view()
    }

    pub fn num_users(&self) -> usize {
        self.user_factors.nrows()
    }

    pub fn num_items(&self) -> usize {
        self.item_factors.nrows()
    }

    pub fn latent_factors(&self) -> usize {
        self.user_factors.ncols()
    }

    /// Raw score for a known (user, item) pair, not clamped to any scale
    pub fn predict(&self, user: InnerId, item: InnerId) -> f32 {
        self.global_mean
            + self.user_bias[user]
            + self.item_bias[item]
            + self.user_factors.row(user).dot(&self.item_factors.row(item))
    }

    pub fn user_vector(&self, user: InnerId) -> ArrayView1<'_, f32> {
        self.user_factors.row(user)
    }

    pub fn item_vector(&self, item: InnerId) -> ArrayView1<'_, f32> {
        self.item_factors.row(item)
    }

    /// Root mean squared error over the indexed ratings
    pub fn rmse(&self, index: &DatasetIndex) -> f32 {
        let ratings = index.ratings();
        if ratings.is_empty() {
            return 0.0;
        }

        let sum: f64 = ratings
            .iter()
            .map(|&(u, i, r)| {
                let err = (r - self.predict(u, i)) as f64;
                err * err
            })
            .sum();

        (sum / ratings.len() as f64).sqrt() as f32
    }
}

/// Per-epoch training diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub epoch_rmse: Vec<f32>,
    pub final_rmse: f32,
}

/// Immutable result of a training run: the index and the parameters fitted on it
///
/// Only produced by `MatrixFactorization::fit`, so the model always matches the index.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    index: DatasetIndex,
    model: FactorModel,
    report: TrainingReport,
}

impl TrainedModel {
    pub fn index(&self) -> &DatasetIndex {
        &self.index
    }

    pub fn model(&self) -> &FactorModel {
        &self.model
    }

    pub fn report(&self) -> &TrainingReport {
        &self.report
    }

    /// Raw-score recommender over this model
    pub fn recommender(&self) -> Recommender<'_> {
        Recommender::from_trained(self)
    }

    pub fn user_embedding(&self, user_id: &str) -> Option<Vec<f32>> {
        self.index
            .to_inner_user(user_id)
            .map(|u| self.model.user_vector(u).to_vec())
    }

    pub fn item_embedding(&self, item_id: &str) -> Option<Vec<f32>> {
        self.index
            .to_inner_item(item_id)
            .map(|i| self.model.item_vector(i).to_vec())
    }
}

/// SGD-based matrix factorization trainer
pub struct MatrixFactorization {
    config: TrainingConfig,
    scale: RatingScale,
    trained: Option<TrainedModel>,
}

impl MatrixFactorization {
    pub fn new(config: TrainingConfig, scale: RatingScale) -> Self {
        Self {
            config,
            scale,
            trained: None,
        }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Validate ratings, index them and train a model
    pub fn fit(&mut self, ratings: &[RatingRecord]) -> Result<&TrainedModel> {
        self.config.validate()?;
        self.scale.validate()?;
        if ratings.is_empty() {
            return Err(RecommenderError::EmptyDataset);
        }
        self.scale.validate_ratings(ratings)?;

        let index = DatasetIndex::build(ratings)?;
        let (model, report) = Self::train(&index, &self.config);

        Ok(&*self.trained.insert(TrainedModel {
            index,
            model,
            report,
        }))
    }

    /// Run SGD over an already-indexed rating set
    ///
    /// Callers must have validated the ratings and the configuration.
    /// Each epoch visits every rating once, in an order shuffled by the seeded RNG.
    /// Both factor updates of a step use the factor values from before the step.
    fn train(index: &DatasetIndex, config: &TrainingConfig) -> (FactorModel, TrainingReport) {
        let k = config.latent_factors;
        let lr = config.learning_rate;
        let reg = config.regularization;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let global_mean = index.global_mean();
        let mut model = FactorModel::initialize(
            index.num_users(),
            index.num_items(),
            global_mean,
            config,
            &mut rng,
        );

        tracing::info!(
            latent_factors = k,
            epochs = config.epochs,
            learning_rate = lr,
            regularization = reg,
            global_mean,
            "Starting SGD training"
        );

        let ratings = index.ratings();
        let mut order: Vec<usize> = (0..ratings.len()).collect();
        let mut epoch_rmse = Vec::with_capacity(config.epochs);

        for epoch in 0..config.epochs {
            order.shuffle(&mut rng);

            for &idx in &order {
                let (u, i, rating) = ratings[idx];
                let err = rating - model.predict(u, i);

                let bu = model.user_bias[u];
                let bi = model.item_bias[i];
                model.user_bias[u] = bu + lr * (err - reg * bu);
                model.item_bias[i] = bi + lr * (err - reg * bi);

                for f in 0..k {
                    let puf = model.user_factors[[u, f]];
                    let qif = model.item_factors[[i, f]];
                    model.user_factors[[u, f]] = puf + lr * (err * qif - reg * puf);
                    model.item_factors[[i, f]] = qif + lr * (err * puf - reg * qif);
                }
            }

            let rmse = model.rmse(index);
            tracing::debug!(epoch, rmse, "SGD epoch complete");
            epoch_rmse.push(rmse);
        }

        let final_rmse = epoch_rmse.last().copied().unwrap_or_else(|| model.rmse(index));
        tracing::info!(final_rmse, "SGD training complete");

        (
            model,
            TrainingReport {
                epoch_rmse,
                final_rmse,
            },
        )
    }

    /// Trained state, or `UntrainedModel` before `fit` succeeds
    pub fn trained(&self) -> Result<&TrainedModel> {
        self.trained.as_ref().ok_or(RecommenderError::UntrainedModel)
    }

    pub fn into_trained(self) -> Result<TrainedModel> {
        self.trained.ok_or(RecommenderError::UntrainedModel)
    }

    /// Predict rating for user-item pair
    pub fn predict(&self, user_id: &str, item_id: &str) -> Result<Prediction> {
        Ok(self.trained()?.recommender().predict(user_id, item_id))
    }

    /// Top-`n` unrated items for `user_id`; empty for unknown users
    pub fn recommend(&self, user_id: &str, n: usize) -> Result<Vec<ItemScore>> {
        Ok(self.trained()?.recommender().recommend(user_id, n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> TrainingConfig {
        TrainingConfig {
            latent_factors: 4,
            epochs: 30,
            learning_rate: 0.01,
            regularization: 0.02,
            init_std: 0.1,
            seed: 7,
        }
    }

    fn ratings() -> Vec<RatingRecord> {
        vec![
            RatingRecord::new("u1", "i1", 5.0),
            RatingRecord::new("u1", "i2", 3.0),
            RatingRecord::new("u2", "i1", 4.0),
            RatingRecord::new("u2", "i3", 1.0),
            RatingRecord::new("u3", "i2", 2.0),
            RatingRecord::new("u3", "i3", 5.0),
        ]
    }

    #[test]
    fn test_fit_shapes() {
        let mut mf = MatrixFactorization::new(small_config(), RatingScale::new(1.0, 5.0));
        let trained = mf.fit(&ratings()).unwrap();

        assert_eq!(trained.model().user_factors().dim(), (3, 4));
        assert_eq!(trained.model().item_factors().dim(), (3, 4));
        assert_eq!(trained.model().user_bias().len(), 3);
        assert_eq!(trained.model().item_bias().len(), 3);
        assert_eq!(trained.model().latent_factors(), 4);
        assert_eq!(trained.report().epoch_rmse.len(), 30);
        assert!((trained.model().global_mean() - 20.0 / 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_training_reduces_error() {
        let mut config = small_config();
        config.epochs = 200;
        config.learning_rate = 0.02;
        let mut mf = MatrixFactorization::new(config, RatingScale::new(1.0, 5.0));
        let report = mf.fit(&ratings()).unwrap().report();

        let first = report.epoch_rmse[0];
        assert!(report.final_rmse < first);
        assert_eq!(report.final_rmse, *report.epoch_rmse.last().unwrap());
    }

    #[test]
    fn test_training_is_deterministic() {
        let mut a = MatrixFactorization::new(small_config(), RatingScale::new(1.0, 5.0));
        let mut b = MatrixFactorization::new(small_config(), RatingScale::new(1.0, 5.0));

        let model_a = a.fit(&ratings()).unwrap().model().clone();
        let model_b = b.fit(&ratings()).unwrap().model().clone();
        assert_eq!(model_a, model_b);
    }

    #[test]
    fn test_different_seed_changes_parameters() {
        let mut other = small_config();
        other.seed = 8;
        let mut a = MatrixFactorization::new(small_config(), RatingScale::new(1.0, 5.0));
        let mut b = MatrixFactorization::new(other, RatingScale::new(1.0, 5.0));

        let model_a = a.fit(&ratings()).unwrap().model().clone();
        let model_b = b.fit(&ratings()).unwrap().model().clone();
        assert_ne!(model_a.user_factors, model_b.user_factors);
    }

    #[test]
    fn test_zero_init_std_starts_from_zero_factors() {
        let mut config = small_config();
        config.init_std = 0.0;
        let index = DatasetIndex::build(&ratings()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let model = FactorModel::initialize(3, 3, 3.0, &config, &mut rng);
        assert!(model.user_factors.iter().all(|&v| v == 0.0));
        assert!((model.predict(0, 0) - 3.0).abs() < 1e-6);
        assert!(model.rmse(&index) > 0.0);
    }

    #[test]
    fn test_single_step_matches_update_rule() {
        let config = TrainingConfig {
            latent_factors: 2,
            epochs: 1,
            learning_rate: 0.1,
            regularization: 0.5,
            init_std: 0.1,
            seed: 3,
        };
        let index = DatasetIndex::build(&[RatingRecord::new("u", "i", 4.0)]).unwrap();

        let mut rng = StdRng::seed_from_u64(config.seed);
        let start = FactorModel::initialize(1, 1, 4.0, &config, &mut rng);
        let (trained, _) = MatrixFactorization::train(&index, &config);

        let err = 4.0 - start.predict(0, 0);
        for f in 0..2 {
            let puf = start.user_factors[[0, f]];
            let qif = start.item_factors[[0, f]];
            let expected_p = puf + 0.1 * (err * qif - 0.5 * puf);
            let expected_q = qif + 0.1 * (err * puf - 0.5 * qif);
            assert!((trained.user_factors[[0, f]] - expected_p).abs() < 1e-6);
            assert!((trained.item_factors[[0, f]] - expected_q).abs() < 1e-6);
        }
        assert!((trained.user_bias[0] - 0.1 * err).abs() < 1e-6);
        assert!((trained.item_bias[0] - 0.1 * err).abs() < 1e-6);
    }

    #[test]
    fn test_fit_rejects_out_of_scale_rating() {
        let mut mf = MatrixFactorization::new(small_config(), RatingScale::new(1.0, 5.0));
        let mut data = ratings();
        data.push(RatingRecord::new("u4", "i1", 6.0));

        let err = mf.fit(&data).unwrap_err();
        assert!(matches!(err, RecommenderError::InvalidRating { rating, .. } if rating == 6.0));
        assert_eq!(mf.trained().unwrap_err(), RecommenderError::UntrainedModel);
    }

    #[test]
    fn test_fit_rejects_empty_and_bad_config() {
        let mut mf = MatrixFactorization::new(small_config(), RatingScale::new(1.0, 5.0));
        assert_eq!(mf.fit(&[]).unwrap_err(), RecommenderError::EmptyDataset);

        let mut config = small_config();
        config.latent_factors = 0;
        let mut mf = MatrixFactorization::new(config, RatingScale::new(1.0, 5.0));
        assert!(matches!(
            mf.fit(&ratings()).unwrap_err(),
            RecommenderError::InvalidConfig { .. }
        ));
    }

    #[test]
    fn test_untrained_model() {
        let mf = MatrixFactorization::new(small_config(), RatingScale::new(1.0, 5.0));

        assert_eq!(
            mf.predict("u1", "i1").unwrap_err(),
            RecommenderError::UntrainedModel
        );
        assert_eq!(
            mf.recommend("u1", 10).unwrap_err(),
            RecommenderError::UntrainedModel
        );
        assert!(mf.into_trained().is_err());
    }

    #[test]
    fn test_embeddings() {
        let mut mf = MatrixFactorization::new(small_config(), RatingScale::new(1.0, 5.0));
        let trained = mf.fit(&ratings()).unwrap();

        assert_eq!(trained.user_embedding("u1").unwrap().len(), 4);
        assert_eq!(trained.item_embedding("i3").unwrap().len(), 4);
        assert!(trained.user_embedding("nobody").is_none());
        assert!(trained.item_embedding("nothing").is_none());
    }

    #[test]
    fn test_fit_rejects_nan_before_training() {
        let mut mf = MatrixFactorization::new(small_config(), RatingScale::new(1.0, 5.0));
        let data = vec![
            RatingRecord::new("u1", "i1", f32::NAN),
            RatingRecord::new("u1", "i2", 99.0),
            RatingRecord::new("u2", "i1", 4.0),
        ];

        assert!(matches!(
            mf.fit(&data).unwrap_err(),
            RecommenderError::InvalidRating { ref user_id, ref item_id, .. }
                if user_id == "u1" && item_id == "i1"
        ));
        assert_eq!(
            mf.recommend("u2", 5).unwrap_err(),
            RecommenderError::UntrainedModel
        );
    }

    #[test]
    fn test_from_parts_rejects_inconsistent_shapes() {
        use ndarray::{arr1, arr2};

        let ok = FactorModel::from_parts(
            3.0,
            arr1(&[0.0, 0.0]),
            arr1(&[0.0]),
            arr2(&[[1.0, 0.0], [0.0, 1.0]]),
            arr2(&[[0.5, 0.5]]),
        );
        assert_eq!(ok.unwrap().latent_factors(), 2);

        let wrong_k = FactorModel::from_parts(
            3.0,
            arr1(&[0.0, 0.0]),
            arr1(&[0.0, 0.0]),
            Array2::zeros((2, 2)),
            Array2::zeros((2, 3)),
        );
        assert!(matches!(
            wrong_k,
            Err(RecommenderError::ShapeMismatch { .. })
        ));

        let wrong_bias = FactorModel::from_parts(
            3.0,
            arr1(&[0.0]),
            arr1(&[0.0]),
            Array2::zeros((2, 2)),
            Array2::zeros((1, 2)),
        );
        assert!(matches!(
            wrong_bias,
            Err(RecommenderError::ShapeMismatch { .. })
        ));

        let empty_k = FactorModel::from_parts(
            3.0,
            arr1(&[0.0]),
            arr1(&[0.0]),
            Array2::zeros((1, 0)),
            Array2::zeros((1, 0)),
        );
        assert!(empty_k.is_err());

        let nan_mean = FactorModel::from_parts(
            f32::NAN,
            arr1(&[0.0]),
            arr1(&[0.0]),
            Array2::zeros((1, 2)),
            Array2::zeros((1, 2)),
        );
        assert!(nan_mean.is_err());
    }
}
