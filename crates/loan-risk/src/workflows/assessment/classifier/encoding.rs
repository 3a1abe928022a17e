use super::artifact::ClassifierArtifact;
use super::ClassifierError;
use crate::workflows::assessment::domain::{parse_amount, ApplicantRecord, ApplicantTable};

/// How one model input is derived from a table column.
pub(crate) enum FeatureSlot<'a> {
    Numeric { column: &'a str },
    Categorical { column: &'a str, classes: &'a [String] },
}

/// Resolve every artifact feature against the table header up front so a
/// missing column fails before any row is touched.
pub(crate) fn plan<'a>(
    artifact: &'a ClassifierArtifact,
    table: &ApplicantTable,
) -> Result<Vec<FeatureSlot<'a>>, ClassifierError> {
    artifact
        .features
        .iter()
        .map(|feature| {
            if !table.has_column(feature) {
                return Err(ClassifierError::MissingFeature(feature.clone()));
            }
            Ok(match artifact.encoders.get(feature) {
                Some(classes) => FeatureSlot::Categorical {
                    column: feature,
                    classes,
                },
                None => FeatureSlot::Numeric { column: feature },
            })
        })
        .collect()
}

pub(crate) fn encode_record(
    row: usize,
    record: &ApplicantRecord,
    slots: &[FeatureSlot<'_>],
) -> Result<Vec<f64>, ClassifierError> {
    slots
        .iter()
        .map(|slot| match slot {
            FeatureSlot::Numeric { column } => {
                let raw = record.field(column).unwrap_or_default();
                parse_amount(raw)
                    .filter(|value| value.is_finite())
                    .ok_or_else(|| ClassifierError::NotNumeric {
                    row,
                    column: column.to_string(),
                    value: raw.to_string(),
                })
            }
            FeatureSlot::Categorical { column, classes } => {
                let raw = record.field(column).unwrap_or_default();
                classes
                    .iter()
                    .position(|class| class == raw)
                    .map(|code| code as f64)
                    .ok_or_else(|| ClassifierError::UnknownCategory {
                        row,
                        column: column.to_string(),
                        value: raw.to_string(),
                    })
            }
        })
        .collect()
}
