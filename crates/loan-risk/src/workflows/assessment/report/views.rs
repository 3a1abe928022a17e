use super::super::domain::RiskLevel;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelShareEntry {
    pub level: RiskLevel,
    pub label: &'static str,
    pub count: usize,
    pub share_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupScoreEntry {
    pub group: String,
    pub average_score: f64,
    pub records: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSummaryView {
    pub total_records: usize,
    pub scored_records: usize,
    pub unscored_records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
    pub levels: Vec<LevelShareEntry>,
}
