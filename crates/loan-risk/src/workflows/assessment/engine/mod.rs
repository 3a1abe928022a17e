mod policy;
mod rules;

pub use policy::{PolicyError, RiskPolicy};

use super::domain::{
    ensure_amount, ApplicantRecord, ApplicantTable, Assessment, DegradedScoring,
    InvalidInputError, ScoredRecord, ScoringReport, ANNUAL_INCOME_COLUMN, LOAN_AMOUNT_COLUMN,
};
use tracing::{debug, warn};

/// Stateless scorer applying a fixed policy to applicant tables.
///
/// The engine owns nothing mutable, so one instance can be shared behind an
/// `Arc` by every caller for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct RiskEngine {
    policy: RiskPolicy,
}

impl RiskEngine {
    pub fn new(policy: RiskPolicy) -> Result<Self, PolicyError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &RiskPolicy {
        &self.policy
    }

    /// Score every row of `table`, preserving order and appending the derived fields.
    ///
    /// When a scoring column is missing from the header the whole table is
    /// returned as unscored placeholders and the report is marked degraded.
    /// Derived columns left over from an earlier run are dropped, not duplicated.
    pub fn score(&self, table: &ApplicantTable) -> Result<ScoringReport, InvalidInputError> {
        let missing_columns = table.missing_scoring_columns();

        if !missing_columns.is_empty() {
            let degraded = DegradedScoring { missing_columns };
            let reason = degraded.reason();
            warn!(
                rows = table.len(),
                %reason,
                "scoring columns absent, returning unscored placeholders"
            );

            let records = table
                .records()
                .iter()
                .map(|applicant| ScoredRecord {
                    applicant: applicant.without_derived_columns(),
                    assessment: Assessment::Unscored {
                        reason: reason.clone(),
                    },
                })
                .collect();

            return Ok(ScoringReport {
                columns: table.input_columns(),
                records,
                degraded: Some(degraded),
            });
        }

        let records = table
            .records()
            .iter()
            .enumerate()
            .map(|(offset, applicant)| self.score_record(offset + 1, applicant))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(rows = records.len(), "scored applicant table");

        Ok(ScoringReport {
            columns: table.input_columns(),
            records,
            degraded: None,
        })
    }

    fn score_record(
        &self,
        row: usize,
        applicant: &ApplicantRecord,
    ) -> Result<ScoredRecord, InvalidInputError> {
        let loan_amount = required(row, LOAN_AMOUNT_COLUMN, applicant.loan_amount)?;
        let annual_income = required(row, ANNUAL_INCOME_COLUMN, applicant.annual_income)?;

        let risk_score = rules::risk_score(loan_amount, annual_income, &self.policy);
        let risk_level = rules::categorize(risk_score, &self.policy);

        Ok(ScoredRecord {
            applicant: applicant.without_derived_columns(),
            assessment: Assessment::scored(risk_score, risk_level),
        })
    }
}

fn required(row: usize, column: &str, value: Option<f64>) -> Result<f64, InvalidInputError> {
    let value = value.ok_or_else(|| InvalidInputError::MissingValue {
        row,
        column: column.to_string(),
    })?;
    ensure_amount(row, column, value)
}
