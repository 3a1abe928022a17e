use super::ClassifierError;
use crate::workflows::upload::canonical_column;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

fn default_decision_threshold() -> f64 {
    0.5
}

fn default_id_column() -> String {
    "business_id".to_string()
}

/// Serialized parameters of a pre-trained logistic-regression classifier.
///
/// `encoders` maps a categorical column to its class list; a category's code is
/// its index in that list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    pub features: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub encoders: BTreeMap<String, Vec<String>>,
    #[serde(default = "default_decision_threshold")]
    pub decision_threshold: f64,
    #[serde(default = "default_id_column")]
    pub id_column: String,
}

impl ClassifierArtifact {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ClassifierError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ClassifierError> {
        let artifact: ClassifierArtifact = serde_json::from_str(raw)?;
        artifact.canonicalized()
    }

    /// Validate the parameters and rewrite column names into the same canonical
    /// form the upload importer produces.
    pub(crate) fn canonicalized(self) -> Result<Self, ClassifierError> {
        if self.features.is_empty() {
            return Err(invalid("artifact declares no features"));
        }
        if self.features.len() != self.coefficients.len() {
            return Err(invalid(format!(
                "{} features but {} coefficients",
                self.features.len(),
                self.coefficients.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|w| !w.is_finite()) {
            return Err(invalid("coefficients and intercept must be finite"));
        }
        if !(self.decision_threshold > 0.0 && self.decision_threshold < 1.0) {
            return Err(invalid(format!(
                "decision threshold {} must lie strictly between 0 and 1",
                self.decision_threshold
            )));
        }

        let id_column = canonical_column(&self.id_column);
        let features: Vec<String> = self.features.iter().map(|f| canonical_column(f)).collect();
        if features.contains(&id_column) {
            return Err(invalid(format!(
                "identifier column '{id_column}' cannot be a model feature"
            )));
        }

        let mut encoders = BTreeMap::new();
        for (column, classes) in self.encoders {
            let column = canonical_column(&column);
            if !features.contains(&column) {
                return Err(invalid(format!(
                    "encoder for '{column}' does not match any feature"
                )));
            }
            encoders.insert(column, classes);
        }

        Ok(Self {
            features,
            coefficients: self.coefficients,
            intercept: self.intercept,
            encoders,
            decision_threshold: self.decision_threshold,
            id_column,
        })
    }
}

fn invalid(detail: impl Into<String>) -> ClassifierError {
    ClassifierError::InvalidArtifact(detail.into())
}
