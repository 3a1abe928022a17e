use loan_risk::workflows::assessment::{
    AssessmentId, AssessmentRecord, AssessmentRepository, RepositoryError, RiskClassifier,
    RiskEngine, UploadHistoryEntry,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) engine: Arc<RiskEngine>,
    pub(crate) classifier: Option<Arc<RiskClassifier>>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAssessmentRepository {
    records: Arc<Mutex<HashMap<AssessmentId, AssessmentRecord>>>,
}

impl InMemoryAssessmentRepository {
    fn lock(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<AssessmentId, AssessmentRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl AssessmentRepository for InMemoryAssessmentRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.get(id).cloned())
    }

    fn history(&self, limit: usize) -> Result<Vec<UploadHistoryEntry>, RepositoryError> {
        let guard = self.lock()?;
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
