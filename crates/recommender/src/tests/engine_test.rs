//! Recommender engine tests

use crate::*;

fn game_ratings() -> Vec<RatingRecord> {
    vec![
        RatingRecord::new("alice", "chess", 9.0),
        RatingRecord::new("alice", "go", 8.0),
        RatingRecord::new("alice", "poker", 2.0),
        RatingRecord::new("bob", "chess", 8.0),
        RatingRecord::new("bob", "shogi", 9.0),
        RatingRecord::new("carol", "poker", 9.0),
        RatingRecord::new("carol", "bridge", 8.0),
        RatingRecord::new("dave", "go", 7.0),
        RatingRecord::new("dave", "shogi", 8.0),
        RatingRecord::new("dave", "bridge", 3.0),
    ]
}

fn engine() -> RecommenderEngine {
    let mut config = RecommenderConfig::default();
    config.training.latent_factors = 8;
    config.training.epochs = 50;
    config.top_n = 3;
    RecommenderEngine::new(config).unwrap()
}

#[test]
fn test_engine_rejects_invalid_config() {
    let mut config = RecommenderConfig::default();
    config.top_n = 0;

    assert!(matches!(
        RecommenderEngine::new(config),
        Err(RecommenderError::InvalidConfig { .. })
    ));
}

#[test]
fn test_engine_default_config() {
    let engine = RecommenderEngine::with_default_config();
    assert_eq!(engine.config().top_n, 10);
    assert_eq!(engine.config().training.latent_factors, 100);
}

#[test]
fn test_train_and_recommend_respects_top_n() {
    let engine = engine();
    let trained = engine.train(&game_ratings()).unwrap();

    let recs = engine.recommend(&trained, "bob").unwrap();
    assert_eq!(recs.len(), 3);
    assert!(recs
        .iter()
        .all(|r| r.item_id != "chess" && r.item_id != "shogi"));
    assert!(recs
        .windows(2)
        .all(|w| rank_order(&w[0], &w[1]) == std::cmp::Ordering::Less));
}

#[test]
fn test_recommend_all_is_idempotent() {
    let engine = engine();
    let trained = engine.train(&game_ratings()).unwrap();

    let first = engine.recommend_all(&trained).unwrap();
    let second = engine.recommend_all(&trained).unwrap();

    assert_eq!(first.len(), 4);
    assert_eq!(first, second);
    assert_eq!(first["alice"], engine.recommend(&trained, "alice").unwrap());
}

#[test]
fn test_clip_scores_bounds_output() {
    let mut config = engine().config().clone();
    config.clip_scores = true;
    config.scale = RatingScale::new(1.0, 10.0);
    let engine = RecommenderEngine::new(config).unwrap();
    let trained = engine.train(&game_ratings()).unwrap();

    for recs in engine.recommend_all(&trained).unwrap().values() {
        assert!(recs.iter().all(|r| (1.0..=10.0).contains(&r.score)));
    }
}

#[test]
fn test_train_surfaces_invalid_rating() {
    let mut ratings = game_ratings();
    ratings.push(RatingRecord::new("erin", "go", 0.0));

    let err = engine().train(&ratings).unwrap_err();
    assert_eq!(
        err,
        RecommenderError::InvalidRating {
            user_id: "erin".to_string(),
            item_id: "go".to_string(),
            rating: 0.0,
            min: 1.0,
            max: 10.0,
        }
    );
}

#[test]
fn test_clipping_engine_rejects_inverted_scale() {
    let mut config = engine().config().clone();
    config.clip_scores = true;
    config.scale = RatingScale::new(10.0, 1.0);

    assert!(matches!(
        RecommenderEngine::new(config),
        Err(RecommenderError::InvalidConfig { .. })
    ));
}
