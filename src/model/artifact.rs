//! Versioned on-disk form of the trained model.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;

use super::ModelError;
use crate::schema::COLUMN_NAMES;

/// Artifact format version accepted by the loader.
pub const ARTIFACT_VERSION: u32 = 1;

/// Fitted forest type stored in the artifact.
pub type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Serialized trained model plus the metadata needed to serve it safely.
///
/// The loader rejects artifacts whose version or feature columns do not
/// match the running schema, so a stale model cannot silently produce
/// garbage after a schema change.
#[derive(Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Artifact format version (see [`ARTIFACT_VERSION`]).
    pub version: u32,
    /// Feature column names the model was trained with, in input order.
    pub feature_names: Vec<String>,
    /// Sector the model predicts.
    pub target: String,
    /// Held-out mean absolute error recorded at training time (kWh).
    pub test_mae: f64,
    /// Per-feature permutation importance, normalized, in schema order.
    pub importance: Vec<f64>,
    /// The fitted random forest.
    pub forest: Forest,
}

impl ModelArtifact {
    /// Serializes the artifact to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Artifact` if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let file = File::create(path).map_err(|e| {
            ModelError::Artifact(format!("cannot write \"{}\": {e}", path.display()))
        })?;
        serde_json::to_writer(BufWriter::new(file), self)
            .map_err(|e| ModelError::Artifact(format!("serialization failed: {e}")))
    }

    /// Loads and validates an artifact from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Artifact` if the file is missing or unreadable,
    /// or if the version/schema check fails.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let file = File::open(path).map_err(|e| {
            ModelError::Artifact(format!("cannot read \"{}\": {e}", path.display()))
        })?;
        let artifact: ModelArtifact = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ModelError::Artifact(format!("deserialization failed: {e}")))?;
        artifact.check_schema()?;
        Ok(artifact)
    }

    /// Verifies the artifact matches the running feature schema.
    fn check_schema(&self) -> Result<(), ModelError> {
        if self.version != ARTIFACT_VERSION {
            return Err(ModelError::Artifact(format!(
                "unsupported artifact version {}, expected {ARTIFACT_VERSION}",
                self.version
            )));
        }
        let matches_schema = self.feature_names.len() == COLUMN_NAMES.len()
            && self
                .feature_names
                .iter()
                .zip(COLUMN_NAMES)
                .all(|(stored, current)| stored == current);
        if !matches_schema {
            return Err(ModelError::Artifact(format!(
                "feature columns [{}] do not match the current schema [{}]",
                self.feature_names.join(", "),
                COLUMN_NAMES.join(", ")
            )));
        }
        Ok(())
    }
}
