use super::super::domain::{RiskLevel, ScoredRecord};
use super::views::{GroupScoreEntry, HistogramBin, LevelShareEntry, RiskSummaryView};
use crate::workflows::upload::canonical_column;
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

/// Tier counts over a scored table.
#[derive(Debug, Default, Clone)]
pub struct RiskSummary {
    pub total_records: usize,
    pub level_counts: HashMap<RiskLevel, usize>,
    pub unscored: usize,
    score_total: f64,
}

impl RiskSummary {
    pub fn from_records(records: &[ScoredRecord]) -> Self {
        let mut summary = RiskSummary {
            total_records: records.len(),
            ..RiskSummary::default()
        };

        for record in records {
            match (
                record.assessment.risk_level(),
                record.assessment.risk_score(),
            ) {
                (Some(level), Some(score)) => {
                    *summary.level_counts.entry(level).or_default() += 1;
                    summary.score_total += score;
                }
                _ => summary.unscored += 1,
            }
        }

        summary
    }

    pub fn count(&self, level: RiskLevel) -> usize {
        self.level_counts.get(&level).copied().unwrap_or(0)
    }

    pub fn scored(&self) -> usize {
        self.total_records - self.unscored
    }

    pub fn average_score(&self) -> Option<f64> {
        match self.scored() {
            0 => None,
            scored => Some(self.score_total / scored as f64),
        }
    }

    /// Share of scored rows per tier, Low first. Feeds the distribution chart.
    pub fn level_distribution(&self) -> Vec<LevelShareEntry> {
        let scored = self.scored();
        RiskLevel::ordered()
            .into_iter()
            .map(|level| {
                let count = self.count(level);
                let share_pct = if scored == 0 {
                    0.0
                } else {
                    round_to(count as f64 / scored as f64 * 100.0, 1)
                };
                LevelShareEntry {
                    level,
                    label: level.label(),
                    count,
                    share_pct,
                }
            })
            .collect()
    }

    pub fn view(&self) -> RiskSummaryView {
        RiskSummaryView {
            total_records: self.total_records,
            scored_records: self.scored(),
            unscored_records: self.unscored,
            average_score: self.average_score().map(|score| round_to(score, 4)),
            levels: self.level_distribution(),
        }
    }

    pub fn render_text(&self, generated_at: NaiveDateTime) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Loan Risk Assessment Report");
        let _ = writeln!(
            out,
            "Generated on: {}",
            generated_at.format("%Y-%m-%d %H:%M:%S")
        );
        let _ = writeln!(out, "Total Records: {}", self.total_records);
        for level in RiskLevel::ordered().into_iter().rev() {
            let _ = writeln!(out, "{}: {}", level.label(), self.count(level));
        }
        if self.unscored > 0 {
            let _ = writeln!(out, "Unscored: {}", self.unscored);
        }
        if let Some(average) = self.average_score() {
            let _ = writeln!(out, "Average Risk Score: {average:.4}");
        }
        out
    }
}

/// Mean score of scored rows grouped by `column`, lowest average first.
///
/// `column` may be given as it appeared in the upload header.
pub fn average_score_by(records: &[ScoredRecord], column: &str) -> Vec<GroupScoreEntry> {
    let column = canonical_column(column);
    let mut groups: BTreeMap<String, (f64, usize)> = BTreeMap::new();

    for record in records {
        let Some(score) = record.assessment.risk_score() else {
            continue;
        };
        let group = record
            .applicant
            .field(&column)
            .filter(|value| !value.is_empty())
            .unwrap_or("Unknown")
            .to_string();
        let entry = groups.entry(group).or_insert((0.0, 0));
        entry.0 += score;
        entry.1 += 1;
    }

    let mut entries: Vec<GroupScoreEntry> = groups
        .into_iter()
        .map(|(group, (total, records))| GroupScoreEntry {
            group,
            average_score: total / records as f64,
            records,
        })
        .collect();
    entries.sort_by(|a, b| a.average_score.total_cmp(&b.average_score));
    entries
}

/// Equal-width histogram of scores over `[0, 1]`; the last bin is closed.
pub fn score_histogram(records: &[ScoredRecord], bins: usize) -> Vec<HistogramBin> {
    if bins == 0 {
        return Vec::new();
    }

    let mut counts = vec![0usize; bins];
    for score in records
        .iter()
        .filter_map(|record| record.assessment.risk_score())
    {
        let index = ((score * bins as f64).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(index, count)| HistogramBin {
            lower: index as f64 / bins as f64,
            upper: (index + 1) as f64 / bins as f64,
            count,
        })
        .collect()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
