use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::domain::{DegradedScoring, ScoredRecord, ScoringReport};
use super::report::views::RiskSummaryView;
use super::report::RiskSummary;

/// Identifier wrapper for stored assessments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

/// Who uploaded which file, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadMetadata {
    pub uploaded_by: String,
    pub filename: String,
    pub uploaded_at: NaiveDateTime,
}

/// Repository record pairing an upload with its scored table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: AssessmentId,
    pub upload: UploadMetadata,
    pub report: ScoringReport,
}

impl AssessmentRecord {
    pub fn summary(&self) -> RiskSummary {
        RiskSummary::from_records(&self.report.records)
    }

    pub fn view(&self) -> AssessmentView {
        AssessmentView {
            id: self.id.clone(),
            uploaded_by: self.upload.uploaded_by.clone(),
            filename: self.upload.filename.clone(),
            uploaded_at: self.upload.uploaded_at,
            degraded: self.report.degraded.clone(),
            summary: self.summary().view(),
            records: self.report.records.clone(),
        }
    }

    pub fn history_entry(&self) -> UploadHistoryEntry {
        UploadHistoryEntry {
            id: self.id.clone(),
            uploaded_by: self.upload.uploaded_by.clone(),
            filename: self.upload.filename.clone(),
            uploaded_at: self.upload.uploaded_at,
            total_records: self.report.records.len(),
            degraded: self.report.is_degraded(),
        }
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait AssessmentRepository: Send + Sync {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError>;
    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError>;
    /// Most recent uploads first.
    fn history(&self, limit: usize) -> Result<Vec<UploadHistoryEntry>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Full assessment payload returned to API clients.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentView {
    pub id: AssessmentId,
    pub uploaded_by: String,
    pub filename: String,
    pub uploaded_at: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<DegradedScoring>,
    pub summary: RiskSummaryView,
    pub records: Vec<ScoredRecord>,
}

/// One line of the upload history listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadHistoryEntry {
    pub id: AssessmentId,
    pub uploaded_by: String,
    pub filename: String,
    pub uploaded_at: NaiveDateTime,
    pub total_records: usize,
    pub degraded: bool,
}
