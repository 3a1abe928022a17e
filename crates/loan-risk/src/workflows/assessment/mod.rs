//! Risk assessment of uploaded small-business loan applications.
//!
//! Uploaded tables are scored by the rule-based [`RiskEngine`], optionally
//! classified by a pre-trained [`RiskClassifier`], summarized for reporting,
//! and persisted through the [`AssessmentRepository`] boundary.

pub mod classifier;
pub mod domain;
mod engine;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use classifier::{ClassifierArtifact, ClassifierError, Prediction, RiskClassifier, RiskFlag};
pub use domain::{
    is_derived_column, ApplicantRecord, ApplicantTable, Assessment, DegradedScoring, Field,
    InvalidInputError, RiskLevel, ScoredRecord, ScoringReport, DERIVED_COLUMNS,
};
pub use engine::{PolicyError, RiskEngine, RiskPolicy};
pub use report::RiskSummary;
pub use repository::{
    AssessmentId, AssessmentRecord, AssessmentRepository, AssessmentView, RepositoryError,
    UploadHistoryEntry, UploadMetadata,
};
pub use router::{assessment_router, AssessmentSubmission};
pub use service::{AssessmentServiceError, RiskAssessmentService};
