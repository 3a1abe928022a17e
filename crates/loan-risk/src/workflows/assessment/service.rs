use std::io::Read;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::info;

use super::domain::InvalidInputError;
use super::engine::RiskEngine;
use super::repository::{
    AssessmentId, AssessmentRecord, AssessmentRepository, RepositoryError, UploadHistoryEntry,
    UploadMetadata,
};
use crate::workflows::upload::{ApplicantImporter, UploadError};

/// Service composing the upload importer, the scoring engine, and storage.
pub struct RiskAssessmentService<R> {
    engine: Arc<RiskEngine>,
    repository: Arc<R>,
}

static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_assessment_id() -> AssessmentId {
    let id = ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AssessmentId(format!("asm-{id:06}"))
}

impl<R> RiskAssessmentService<R>
where
    R: AssessmentRepository + 'static,
{
    pub fn new(repository: Arc<R>, engine: Arc<RiskEngine>) -> Self {
        Self { engine, repository }
    }

    /// Parse, score, and persist an uploaded file.
    pub fn assess<Rd: Read>(
        &self,
        upload: UploadMetadata,
        reader: Rd,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let table = ApplicantImporter::from_reader(reader)?;
        let report = self.engine.score(&table)?;

        let record = AssessmentRecord {
            id: next_assessment_id(),
            upload,
            report,
        };

        let stored = self.repository.insert(record)?;
        info!(
            assessment = %stored.id.0,
            filename = %stored.upload.filename,
            rows = stored.report.records.len(),
            degraded = stored.report.is_degraded(),
            "stored risk assessment"
        );
        Ok(stored)
    }

    pub fn get(&self, id: &AssessmentId) -> Result<AssessmentRecord, AssessmentServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn history(
        &self,
        limit: usize,
    ) -> Result<Vec<UploadHistoryEntry>, AssessmentServiceError> {
        Ok(self.repository.history(limit)?)
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Scoring(#[from] InvalidInputError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
