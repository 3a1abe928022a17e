use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::workflows::assessment::domain::{ApplicantTable, ScoringReport};
use crate::workflows::assessment::engine::RiskEngine;
use crate::workflows::assessment::repository::{
    AssessmentId, AssessmentRecord, AssessmentRepository, RepositoryError, UploadHistoryEntry,
    UploadMetadata,
};
use crate::workflows::assessment::service::RiskAssessmentService;

pub(super) const SAMPLE_UPLOAD: &str = "Business_ID,Business_Type,Location,Loan_Amount_Requested,Annual_Income\n\
B-001,Retail,Urban,50000,49999\n\
B-002,Agriculture,Rural,20000,100000\n\
B-003,Retail,Urban,30000,50000\n\
B-004,Manufacturing,Semi-Urban,10000,0\n";

pub(super) fn table(columns: &[&str], rows: &[&[&str]]) -> ApplicantTable {
    ApplicantTable::from_rows(
        columns.iter().map(|column| column.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect(),
    )
    .expect("valid table")
}

pub(super) fn amounts_table(pairs: &[(f64, f64)]) -> ApplicantTable {
    ApplicantTable::from_rows(
        vec![
            "business_id".to_string(),
            "loan_amount".to_string(),
            "annual_income".to_string(),
        ],
        pairs
            .iter()
            .enumerate()
            .map(|(index, (loan, income))| {
                vec![format!("B-{index:03}"), loan.to_string(), income.to_string()]
            })
            .collect(),
    )
    .expect("valid table")
}

pub(super) fn score(pairs: &[(f64, f64)]) -> ScoringReport {
    RiskEngine::default()
        .score(&amounts_table(pairs))
        .expect("table scores")
}

pub(super) fn uploaded_at(hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 14)
        .expect("valid date")
        .and_hms_opt(hour, 0, 0)
        .expect("valid time")
}

pub(super) fn upload(filename: &str, hour: u32) -> UploadMetadata {
    UploadMetadata {
        uploaded_by: "analyst".to_string(),
        filename: filename.to_string(),
        uploaded_at: uploaded_at(hour),
    }
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<HashMap<AssessmentId, AssessmentRecord>>,
}

impl AssessmentRepository for MemoryRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn history(&self, limit: usize) -> Result<Vec<UploadHistoryEntry>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut entries: Vec<UploadHistoryEntry> =
            guard.values().map(AssessmentRecord::history_entry).collect();
        entries.sort_by(|a, b| {
            b.uploaded_at
                .cmp(&a.uploaded_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        entries.truncate(limit);
        Ok(entries)
    }
}

pub(super) struct ConflictRepository;

impl AssessmentRepository for ConflictRepository {
    fn insert(&self, _record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch(&self, _id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Ok(None)
    }

    fn history(&self, _limit: usize) -> Result<Vec<UploadHistoryEntry>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl AssessmentRepository for UnavailableRepository {
    fn insert(&self, _record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn history(&self, _limit: usize) -> Result<Vec<UploadHistoryEntry>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (
    Arc<RiskAssessmentService<MemoryRepository>>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = Arc::new(RiskAssessmentService::new(
        repository.clone(),
        Arc::new(RiskEngine::default()),
    ));
    (service, repository)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
