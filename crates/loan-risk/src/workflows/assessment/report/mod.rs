mod export;
mod summary;
pub mod views;

pub use export::write_scored_csv;
pub use summary::{average_score_by, score_histogram, RiskSummary};
