//! Offline model training: split, fit, evaluate, explain.

use rand::seq::SliceRandom;
use rand::{SeedableRng, rngs::StdRng};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

use super::ModelError;
use super::artifact::{ARTIFACT_VERSION, Forest, ModelArtifact};
use crate::config::TrainerConfig;
use crate::datagen::TrainingRecord;
use crate::schema::{COLUMN_NAMES, FEATURE_COUNT};

/// Fits a random forest on the given records and packages the artifact.
///
/// Holds out `cfg.test_fraction` of the records (seeded shuffle) for
/// evaluation, fits on the rest, and computes the held-out mean absolute
/// error plus per-feature permutation importance. The forest never sees
/// the held-out records during fitting.
///
/// # Errors
///
/// Returns `ModelError::Training` if the dataset is empty or too small
/// for the configured split, the target sector is unknown, or the forest
/// fails to fit.
pub fn train_from_records(
    records: &[TrainingRecord],
    cfg: &TrainerConfig,
) -> Result<ModelArtifact, ModelError> {
    let n = records.len();
    if n == 0 {
        return Err(ModelError::Training("dataset contains no records".into()));
    }

    let mut targets = Vec::with_capacity(n);
    for record in records {
        let y = record.target(&cfg.target).ok_or_else(|| {
            ModelError::Training(format!("unknown target sector \"{}\"", cfg.target))
        })?;
        targets.push(y);
    }
    let rows: Vec<Vec<f64>> = records
        .iter()
        .map(|r| r.features().to_row().to_vec())
        .collect();

    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut rng);

    let test_len = (n as f64 * cfg.test_fraction).round() as usize;
    if test_len == 0 || test_len >= n {
        return Err(ModelError::Training(format!(
            "dataset of {n} records is too small for a {} test fraction",
            cfg.test_fraction
        )));
    }
    let (test_idx, train_idx) = indices.split_at(test_len);

    let x_train: Vec<Vec<f64>> = train_idx.iter().map(|&i| rows[i].clone()).collect();
    let y_train: Vec<f64> = train_idx.iter().map(|&i| targets[i]).collect();
    let mut x_test: Vec<Vec<f64>> = test_idx.iter().map(|&i| rows[i].clone()).collect();
    let y_test: Vec<f64> = test_idx.iter().map(|&i| targets[i]).collect();

    let x_train_m =
        DenseMatrix::from_2d_vec(&x_train).map_err(|e| ModelError::Training(e.to_string()))?;
    let params = RandomForestRegressorParameters::default()
        .with_n_trees(cfg.n_trees)
        .with_seed(cfg.seed);
    let forest = RandomForestRegressor::fit(&x_train_m, &y_train, params)
        .map_err(|e| ModelError::Training(e.to_string()))?;

    let x_test_m =
        DenseMatrix::from_2d_vec(&x_test).map_err(|e| ModelError::Training(e.to_string()))?;
    let predictions = forest
        .predict(&x_test_m)
        .map_err(|e| ModelError::Training(e.to_string()))?;
    let test_mae = mean_absolute_error(&predictions, &y_test);

    let importance = permutation_importance(&forest, &mut x_test, &y_test, test_mae, &mut rng)?;

    Ok(ModelArtifact {
        version: ARTIFACT_VERSION,
        feature_names: COLUMN_NAMES.iter().map(|s| s.to_string()).collect(),
        target: cfg.target.clone(),
        test_mae,
        importance,
        forest,
    })
}

/// Per-feature importance via column permutation on the held-out split.
///
/// Shuffling one feature column breaks its relationship with the target;
/// the resulting MAE increase measures how much the forest relies on it.
/// Negative deltas are clamped to zero and the weights are normalized to
/// sum to one when any feature matters at all.
fn permutation_importance(
    forest: &Forest,
    x_test: &mut Vec<Vec<f64>>,
    y_test: &[f64],
    baseline_mae: f64,
    rng: &mut StdRng,
) -> Result<Vec<f64>, ModelError> {
    let mut importance = vec![0.0; FEATURE_COUNT];

    for feature in 0..FEATURE_COUNT {
        let original: Vec<f64> = x_test.iter().map(|row| row[feature]).collect();
        let mut shuffled = original.clone();
        shuffled.shuffle(rng);
        for (row, value) in x_test.iter_mut().zip(&shuffled) {
            row[feature] = *value;
        }

        let matrix =
            DenseMatrix::from_2d_vec(x_test).map_err(|e| ModelError::Training(e.to_string()))?;
        let permuted = forest
            .predict(&matrix)
            .map_err(|e| ModelError::Training(e.to_string()))?;
        importance[feature] = (mean_absolute_error(&permuted, y_test) - baseline_mae).max(0.0);

        // Restore the column before permuting the next one.
        for (row, value) in x_test.iter_mut().zip(&original) {
            row[feature] = *value;
        }
    }

    let total: f64 = importance.iter().sum();
    if total > 0.0 {
        for weight in &mut importance {
            *weight /= total;
        }
    }
    Ok(importance)
}

fn mean_absolute_error(predictions: &[f64], actuals: &[f64]) -> f64 {
    if predictions.is_empty() {
        return 0.0;
    }
    predictions
        .iter()
        .zip(actuals)
        .map(|(p, a)| (p - a).abs())
        .sum::<f64>()
        / predictions.len() as f64
}
