use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Canonical column holding the requested loan amount.
pub const LOAN_AMOUNT_COLUMN: &str = "loan_amount";
/// Canonical column holding the self-reported annual income or turnover.
pub const ANNUAL_INCOME_COLUMN: &str = "annual_income";

/// Columns appended by scoring. Copies already present in an upload (a
/// re-imported results file) are replaced rather than duplicated.
pub const DERIVED_COLUMNS: [&str; 3] = ["risk_score", "risk_level", "recommendation"];

pub fn is_derived_column(column: &str) -> bool {
    DERIVED_COLUMNS.contains(&column)
}

/// A single named cell carried through scoring untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub column: String,
    pub value: String,
}

/// One uploaded loan application row.
///
/// `fields` keeps every original cell verbatim and in header order. The two
/// typed amounts are `None` only when the whole table lacks that column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub fields: Vec<Field>,
    pub loan_amount: Option<f64>,
    pub annual_income: Option<f64>,
}

impl ApplicantRecord {
    pub fn field(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.column == column)
            .map(|field| field.value.as_str())
    }

    /// Copy of the record without cells from earlier scoring runs.
    pub fn without_derived_columns(&self) -> ApplicantRecord {
        ApplicantRecord {
            fields: self
                .fields
                .iter()
                .filter(|field| !is_derived_column(&field.column))
                .cloned()
                .collect(),
            loan_amount: self.loan_amount,
            annual_income: self.annual_income,
        }
    }
}

/// Homogeneous table of applicant records sharing one header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantTable {
    columns: Vec<String>,
    records: Vec<ApplicantRecord>,
}

impl ApplicantTable {
    /// Build a table from a header and raw string rows, validating its shape and
    /// parsing the scoring columns when they are present.
    pub fn from_rows(
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Result<Self, InvalidInputError> {
        if columns.is_empty() {
            return Err(InvalidInputError::NoColumns);
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(InvalidInputError::DuplicateColumn(column.clone()));
            }
        }

        let loan_index = columns.iter().position(|c| c == LOAN_AMOUNT_COLUMN);
        let income_index = columns.iter().position(|c| c == ANNUAL_INCOME_COLUMN);

        let mut records = Vec::with_capacity(rows.len());
        for (offset, cells) in rows.into_iter().enumerate() {
            let row = offset + 1;
            if cells.len() != columns.len() {
                return Err(InvalidInputError::RaggedRow {
                    row,
                    expected: columns.len(),
                    found: cells.len(),
                });
            }

            let loan_amount = loan_index
                .map(|index| parse_required_amount(row, LOAN_AMOUNT_COLUMN, &cells[index]))
                .transpose()?;
            let annual_income = income_index
                .map(|index| parse_required_amount(row, ANNUAL_INCOME_COLUMN, &cells[index]))
                .transpose()?;

            let fields = columns
                .iter()
                .cloned()
                .zip(cells)
                .map(|(column, value)| Field { column, value })
                .collect();

            records.push(ApplicantRecord {
                fields,
                loan_amount,
                annual_income,
            });
        }

        Ok(Self { columns, records })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[ApplicantRecord] {
        &self.records
    }

    #[cfg(test)]
    pub(crate) fn records_mut(&mut self) -> &mut [ApplicantRecord] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Header minus any previously derived columns; the column set of a scoring report.
    pub fn input_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|column| !is_derived_column(column))
            .cloned()
            .collect()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Scoring columns absent from the header, in canonical order.
    pub fn missing_scoring_columns(&self) -> Vec<String> {
        [LOAN_AMOUNT_COLUMN, ANNUAL_INCOME_COLUMN]
            .into_iter()
            .filter(|column| !self.has_column(column))
            .map(str::to_string)
            .collect()
    }
}

fn parse_required_amount(row: usize, column: &str, raw: &str) -> Result<f64, InvalidInputError> {
    if raw.trim().is_empty() {
        return Err(InvalidInputError::MissingValue {
            row,
            column: column.to_string(),
        });
    }

    let value = parse_amount(raw).ok_or_else(|| InvalidInputError::NotNumeric {
        row,
        column: column.to_string(),
        value: raw.to_string(),
    })?;

    ensure_amount(row, column, value)
}

pub(crate) fn ensure_amount(row: usize, column: &str, value: f64) -> Result<f64, InvalidInputError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(InvalidInputError::OutOfRange {
            row,
            column: column.to_string(),
            value,
        })
    }
}

/// Parse a monetary cell, tolerating a leading currency sign and thousands separators.
pub(crate) fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let unsigned = trimmed.strip_prefix('$').unwrap_or(trimmed);
    let cleaned: String = unsigned.chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Discrete severity tier derived from a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn ordered() -> [RiskLevel; 3] {
        [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High]
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Medium => "Medium Risk",
            RiskLevel::High => "High Risk",
        }
    }

    /// Advisory action for the tier. Depends on nothing but the tier itself.
    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskLevel::High => "Decline or request collateral. Perform on-site verification.",
            RiskLevel::Medium => "Ask for additional documents. Conduct credit bureau review.",
            RiskLevel::Low => "Approve with standard conditions.",
        }
    }
}

/// Derived columns appended to an applicant row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Assessment {
    Scored {
        risk_score: f64,
        risk_level: RiskLevel,
        recommendation: String,
    },
    Unscored {
        reason: String,
    },
}

impl Assessment {
    pub fn scored(risk_score: f64, risk_level: RiskLevel) -> Self {
        Assessment::Scored {
            risk_score,
            risk_level,
            recommendation: risk_level.recommendation().to_string(),
        }
    }

    pub fn risk_score(&self) -> Option<f64> {
        match self {
            Assessment::Scored { risk_score, .. } => Some(*risk_score),
            Assessment::Unscored { .. } => None,
        }
    }

    pub fn risk_level(&self) -> Option<RiskLevel> {
        match self {
            Assessment::Scored { risk_level, .. } => Some(*risk_level),
            Assessment::Unscored { .. } => None,
        }
    }

    pub fn is_scored(&self) -> bool {
        matches!(self, Assessment::Scored { .. })
    }

    pub fn level_label(&self) -> &'static str {
        self.risk_level()
            .map(|level| level.label())
            .unwrap_or("Unscored")
    }
}

/// Applicant row plus its assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub applicant: ApplicantRecord,
    #[serde(flatten)]
    pub assessment: Assessment,
}

/// Raised when the required scoring columns are absent from the whole table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegradedScoring {
    pub missing_columns: Vec<String>,
}

impl DegradedScoring {
    pub fn reason(&self) -> String {
        format!(
            "missing required column(s): {}",
            self.missing_columns.join(", ")
        )
    }
}

/// Result of scoring a table. `degraded` is set when every row is a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringReport {
    pub columns: Vec<String>,
    pub records: Vec<ScoredRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<DegradedScoring>,
}

impl ScoringReport {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// The input does not form a well-shaped table of applicant records.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidInputError {
    #[error("table has no columns")]
    NoColumns,
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
    #[error("row {row} has {found} cells but the header declares {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("row {row}: {column} is empty")]
    MissingValue { row: usize, column: String },
    #[error("row {row}: {column} value '{value}' is not numeric")]
    NotNumeric {
        row: usize,
        column: String,
        value: String,
    },
    #[error("row {row}: {column} must be a finite non-negative amount, got {value}")]
    OutOfRange {
        row: usize,
        column: String,
        value: f64,
    },
}
