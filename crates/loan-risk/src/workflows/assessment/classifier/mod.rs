//! Inference for the pre-trained default-risk classifier.
//!
//! Training happens elsewhere; this module only loads the exported parameters
//! once and applies them to uploaded tables.

mod artifact;
mod encoding;

pub use artifact::ClassifierArtifact;

use super::domain::ApplicantTable;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Binary outcome predicted by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFlag {
    Safe,
    Risky,
}

impl RiskFlag {
    pub fn label(&self) -> &'static str {
        match self {
            RiskFlag::Safe => "Low Risk",
            RiskFlag::Risky => "High Risk",
        }
    }
}

/// Per-row classifier output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant_id: Option<String>,
    pub flag: RiskFlag,
    /// Probability of the risky class, as a percentage rounded to two decimals.
    pub probability_pct: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("failed to read classifier artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("classifier artifact is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid classifier artifact: {0}")]
    InvalidArtifact(String),
    #[error("upload is missing model feature '{0}'")]
    MissingFeature(String),
    #[error("row {row}: unseen category '{value}' for {column}")]
    UnknownCategory {
        row: usize,
        column: String,
        value: String,
    },
    #[error("row {row}: {column} value '{value}' is not a finite number")]
    NotNumeric {
        row: usize,
        column: String,
        value: String,
    },
}

/// Immutable classifier built from an artifact at process start.
#[derive(Debug, Clone)]
pub struct RiskClassifier {
    artifact: ClassifierArtifact,
}

impl RiskClassifier {
    pub fn new(artifact: ClassifierArtifact) -> Result<Self, ClassifierError> {
        Ok(Self {
            artifact: artifact.canonicalized()?,
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ClassifierError> {
        Ok(Self {
            artifact: ClassifierArtifact::load(path)?,
        })
    }

    pub fn artifact(&self) -> &ClassifierArtifact {
        &self.artifact
    }

    pub fn predict(&self, table: &ApplicantTable) -> Result<Vec<Prediction>, ClassifierError> {
        let slots = encoding::plan(&self.artifact, table)?;

        let predictions = table
            .records()
            .iter()
            .enumerate()
            .map(|(offset, record)| {
                let inputs = encoding::encode_record(offset + 1, record, &slots)?;
                let probability = self.probability(&inputs);
                let flag = if probability >= self.artifact.decision_threshold {
                    RiskFlag::Risky
                } else {
                    RiskFlag::Safe
                };

                Ok(Prediction {
                    applicant_id: record.field(&self.artifact.id_column).map(str::to_string),
                    flag,
                    probability_pct: (probability * 100.0 * 100.0).round() / 100.0,
                })
            })
            .collect::<Result<Vec<_>, ClassifierError>>()?;

        debug!(rows = predictions.len(), "classified applicant table");
        Ok(predictions)
    }

    fn probability(&self, inputs: &[f64]) -> f64 {
        let logit = self.artifact.intercept
            + self
                .artifact
                .coefficients
                .iter()
                .zip(inputs)
                .map(|(weight, value)| weight * value)
                .sum::<f64>();
        1.0 / (1.0 + (-logit).exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTIFACT: &str = r#"{
        "features": ["Business_Type", "Loan_Amount_Requested", "Annual Income"],
        "coefficients": [0.8, 0.0001, -0.00005],
        "intercept": -1.0,
        "encoders": { "Business_Type": ["Agriculture", "Retail"] }
    }"#;

    fn table(rows: &[[&str; 4]]) -> ApplicantTable {
        ApplicantTable::from_rows(
            ["business_id", "business_type", "loan_amount", "annual_income"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        )
        .expect("valid table")
    }

    #[test]
    fn from_json_canonicalizes_columns_and_defaults() {
        let artifact = ClassifierArtifact::from_json(ARTIFACT).expect("artifact parses");
        assert_eq!(
            artifact.features,
            vec!["business_type", "loan_amount", "annual_income"]
        );
        assert!(artifact.encoders.contains_key("business_type"));
        assert_eq!(artifact.decision_threshold, 0.5);
        assert_eq!(artifact.id_column, "business_id");
    }

    #[test]
    fn from_json_rejects_mismatched_coefficients() {
        let raw = r#"{ "features": ["a", "b"], "coefficients": [1.0], "intercept": 0.0 }"#;
        assert!(matches!(
            ClassifierArtifact::from_json(raw),
            Err(ClassifierError::InvalidArtifact(_))
        ));
    }

    #[test]
    fn predict_applies_logistic_model_in_row_order() {
        let classifier =
            RiskClassifier::new(ClassifierArtifact::from_json(ARTIFACT).expect("parses"))
                .expect("valid classifier");
        let predictions = classifier
            .predict(&table(&[
                ["B-1", "Retail", "50000", "10000"],
                ["B-2", "Agriculture", "1000", "90000"],
            ]))
            .expect("predicts");

        assert_eq!(predictions.len(), 2);
        // logit = -1 + 0.8 + 5 - 0.5 = 4.3
        assert_eq!(predictions[0].applicant_id.as_deref(), Some("B-1"));
        assert_eq!(predictions[0].flag, RiskFlag::Risky);
        assert_eq!(predictions[0].probability_pct, 98.66);
        // logit = -1 + 0 + 0.1 - 4.5 = -5.4
        assert_eq!(predictions[1].flag, RiskFlag::Safe);
        assert_eq!(predictions[1].probability_pct, 0.45);
    }

    #[test]
    fn predict_rejects_unseen_categories() {
        let classifier =
            RiskClassifier::new(ClassifierArtifact::from_json(ARTIFACT).expect("parses"))
                .expect("valid classifier");
        let error = classifier
            .predict(&table(&[["B-1", "Mining", "100", "100"]]))
            .expect_err("unknown category");

        match error {
            ClassifierError::UnknownCategory { row, column, value } => {
                assert_eq!(row, 1);
                assert_eq!(column, "business_type");
                assert_eq!(value, "Mining");
            }
            other => panic!("expected unknown category, got {other:?}"),
        }
    }

    #[test]
    fn predict_rejects_non_finite_feature_values() {
        let artifact = ClassifierArtifact::from_json(
            r#"{ "features": ["years_in_business"], "coefficients": [0.5], "intercept": 0.0 }"#,
        )
        .expect("parses");
        let classifier = RiskClassifier::new(artifact).expect("valid classifier");

        for (position, raw) in ["NaN", "inf", "1e400"].into_iter().enumerate() {
            let table = ApplicantTable::from_rows(
                vec!["business_id".to_string(), "years_in_business".to_string()],
                vec![
                    vec!["B-1".to_string(), "4".to_string()],
                    vec![format!("B-{}", position + 2), raw.to_string()],
                ],
            )
            .expect("valid table");

            match classifier.predict(&table) {
                Err(ClassifierError::NotNumeric { row, column, value }) => {
                    assert_eq!(row, 2);
                    assert_eq!(column, "years_in_business");
                    assert_eq!(value, raw);
                }
                other => panic!("expected non-finite rejection for {raw}, got {other:?}"),
            }
        }
    }

    #[test]
    fn predict_requires_every_feature_column() {
        let classifier =
            RiskClassifier::new(ClassifierArtifact::from_json(ARTIFACT).expect("parses"))
                .expect("valid classifier");
        let table = ApplicantTable::from_rows(
            vec!["business_type".to_string(), "loan_amount".to_string()],
            vec![vec!["Retail".to_string(), "100".to_string()]],
        )
        .expect("valid table");

        assert!(matches!(
            classifier.predict(&table),
            Err(ClassifierError::MissingFeature(column)) if column == "annual_income"
        ));
    }
}
