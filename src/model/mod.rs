//! Model training, persistence, and inference.

mod artifact;
mod train;

pub use artifact::{ARTIFACT_VERSION, Forest, ModelArtifact};
pub use train::train_from_records;

use std::fmt;
use std::path::Path;

use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::schema::FeatureVector;

/// Failure in the model lifecycle: loading, training, or prediction.
#[derive(Debug)]
pub enum ModelError {
    /// No trained model is loaded; the server is in degraded mode.
    Unavailable,
    /// The persisted artifact is unreadable or incompatible.
    Artifact(String),
    /// Training could not complete.
    Training(String),
    /// The fitted model rejected an inference request.
    Prediction(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Unavailable => {
                write!(f, "model unavailable — no trained model is loaded")
            }
            ModelError::Artifact(msg) => write!(f, "model artifact error: {msg}"),
            ModelError::Training(msg) => write!(f, "training error: {msg}"),
            ModelError::Prediction(msg) => write!(f, "prediction error: {msg}"),
        }
    }
}

impl std::error::Error for ModelError {}

/// A trained model held in memory for serving.
///
/// Wraps the persisted artifact and exposes inference in schema order.
/// Immutable after construction; the server shares it read-only across
/// request handlers.
pub struct LoadedModel {
    artifact: ModelArtifact,
}

impl LoadedModel {
    /// Wraps a freshly trained or deserialized artifact.
    pub fn new(artifact: ModelArtifact) -> Self {
        Self { artifact }
    }

    /// Loads and validates a persisted artifact.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Artifact` if the file is missing, unreadable,
    /// or fails the version/schema check.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        ModelArtifact::load(path).map(Self::new)
    }

    /// Predicts energy consumption for a single feature vector.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Prediction` if the forest rejects the input.
    pub fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let predictions = self.predict_batch(std::slice::from_ref(features))?;
        predictions
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::Prediction("no prediction returned".to_string()))
    }

    /// Predicts energy consumption for a batch of feature vectors.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Prediction` if the forest rejects the input.
    pub fn predict_batch(&self, features: &[FeatureVector]) -> Result<Vec<f64>, ModelError> {
        let rows: Vec<Vec<f64>> = features.iter().map(|f| f.to_row().to_vec()).collect();
        let matrix =
            DenseMatrix::from_2d_vec(&rows).map_err(|e| ModelError::Prediction(e.to_string()))?;
        self.artifact
            .forest
            .predict(&matrix)
            .map_err(|e| ModelError::Prediction(e.to_string()))
    }

    /// Per-feature importance weights in schema order.
    pub fn importance(&self) -> &[f64] {
        &self.artifact.importance
    }

    /// Sector the model was trained against.
    pub fn target(&self) -> &str {
        &self.artifact.target
    }

    /// Held-out mean absolute error recorded at training time (kWh).
    pub fn test_mae(&self) -> f64 {
        self.artifact.test_mae
    }
}
