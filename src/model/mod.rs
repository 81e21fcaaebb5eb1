pub mod artifact;
pub mod regression;

use crate::error::{PlanscopeError, Result};
use crate::types::config::TrainParams;
use crate::types::record::{Record, SubScore};
use crate::types::report::{FeatureWeight, PredictionReport};
use artifact::{dataset_fingerprint, ModelArtifact};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Linear model over (market, tech, team) sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreModel {
    pub coefficients: [f64; 3],
    pub intercept: f64,
}

impl ScoreModel {
    pub fn raw_predict(&self, features: [f64; 3]) -> f64 {
        self.coefficients
            .iter()
            .zip(features)
            .map(|(beta, x)| beta * x)
            .sum::<f64>()
            + self.intercept
    }

    pub fn weights(&self) -> Vec<FeatureWeight> {
        SubScore::ALL
            .into_iter()
            .zip(self.coefficients)
            .map(|(feature, coefficient)| FeatureWeight {
                feature,
                coefficient,
            })
            .collect()
    }
}

/// Fits the composite-score model on a seeded train split and evaluates it
/// on the held-out rows. The caller decides whether to persist the result.
pub fn train(records: &[Record], params: &TrainParams) -> Result<ModelArtifact> {
    let (train_idx, test_idx) =
        regression::train_test_split(records.len(), params.test_size, params.seed);
    if train_idx.is_empty() || test_idx.is_empty() {
        return Err(PlanscopeError::Validation(format!(
            "need at least 2 records to train with a {:.0}% hold-out (found {})",
            params.test_size * 100.0,
            records.len()
        )));
    }

    let select = |indices: &[usize]| {
        let features = indices
            .iter()
            .map(|&idx| records[idx].features())
            .collect::<Vec<_>>();
        let targets = indices
            .iter()
            .map(|&idx| records[idx].composite())
            .collect::<Vec<_>>();
        (features, targets)
    };
    let (train_x, train_y) = select(&train_idx);
    let (test_x, test_y) = select(&test_idx);

    let (coefficients, intercept) = regression::fit_ols(&train_x, &train_y);
    let model = ScoreModel {
        coefficients,
        intercept,
    };

    let predicted = test_x
        .iter()
        .map(|features| model.raw_predict(*features))
        .collect::<Vec<_>>();
    let mse = regression::mean_squared_error(&test_y, &predicted);
    let r2 = regression::r2_score(&test_y, &predicted);
    tracing::info!(
        train = train_idx.len(),
        test = test_idx.len(),
        mse,
        r2,
        market = coefficients[0],
        tech = coefficients[1],
        team = coefficients[2],
        intercept,
        "trained score model"
    );

    Ok(ModelArtifact {
        model,
        trained_at: Utc::now().to_rfc3339(),
        dataset_sha256: dataset_fingerprint(records),
        train_size: train_idx.len(),
        test_size: test_idx.len(),
        mse,
        r2,
    })
}

/// Predicted composite score, rounded to one decimal.
pub fn predict(model: &ScoreModel, market_score: f64, tech_score: f64, team_score: f64) -> f64 {
    let raw = model.raw_predict([market_score, tech_score, team_score]);
    (raw * 10.0).round() / 10.0
}

/// Share of each score in the three-score total; all zero for a zero total.
pub fn contribution_shares(market_score: f64, tech_score: f64, team_score: f64) -> [f64; 3] {
    let total = market_score + tech_score + team_score;
    if total == 0.0 {
        return [0.0; 3];
    }
    [market_score, tech_score, team_score].map(|score| score / total)
}

pub fn prediction_report(
    model: &ScoreModel,
    market_score: f64,
    tech_score: f64,
    team_score: f64,
) -> PredictionReport {
    PredictionReport {
        market_score,
        tech_score,
        team_score,
        predicted: predict(model, market_score, tech_score, team_score),
        contributions: contribution_shares(market_score, tech_score, team_score),
    }
}
