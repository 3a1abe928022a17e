use super::common::*;
use crate::workflows::assessment::domain::{RiskLevel, ScoringReport};
use crate::workflows::assessment::engine::RiskEngine;
use crate::workflows::assessment::report::{
    average_score_by, score_histogram, write_scored_csv, RiskSummary,
};
use crate::workflows::upload::ApplicantImporter;

#[test]
fn summary_counts_levels_and_average() {
    let report = score(&[
        (50_000.0, 49_999.0),
        (20_000.0, 100_000.0),
        (30_000.0, 50_000.0),
        (10_000.0, 0.0),
    ]);
    let summary = RiskSummary::from_records(&report.records);

    assert_eq!(summary.total_records, 4);
    assert_eq!(summary.count(RiskLevel::High), 2);
    assert_eq!(summary.count(RiskLevel::Medium), 1);
    assert_eq!(summary.count(RiskLevel::Low), 1);
    assert_eq!(summary.unscored, 0);
    let average = summary.average_score().expect("average present");
    assert!((average - 0.7).abs() < 1e-3);
}

#[test]
fn level_distribution_is_ordered_and_sums_to_hundred() {
    let report = score(&[(1.0, 100.0), (60.0, 99.0), (90.0, 99.0)]);
    let distribution = RiskSummary::from_records(&report.records).level_distribution();

    let levels: Vec<RiskLevel> = distribution.iter().map(|entry| entry.level).collect();
    assert_eq!(levels, RiskLevel::ordered().to_vec());
    let total: f64 = distribution.iter().map(|entry| entry.share_pct).sum();
    assert!((total - 100.0).abs() < 0.2);
    assert_eq!(distribution[2].label, "High Risk");
}

#[test]
fn degraded_summary_has_no_average() {
    let table = table(&["loan_amount"], &[&["100"]]);
    let report = RiskEngine::default().score(&table).expect("degrades");
    let summary = RiskSummary::from_records(&report.records);

    assert_eq!(summary.unscored, 1);
    assert!(summary.average_score().is_none());
    assert!(summary
        .level_distribution()
        .iter()
        .all(|entry| entry.count == 0 && entry.share_pct == 0.0));
    assert!(summary.render_text(uploaded_at(9)).contains("Unscored: 1"));
}

#[test]
fn render_text_lists_totals_and_tiers() {
    let report = score(&[(50_000.0, 49_999.0), (20_000.0, 100_000.0)]);
    let text = RiskSummary::from_records(&report.records).render_text(uploaded_at(9));

    assert!(text.starts_with("Loan Risk Assessment Report\n"));
    assert!(text.contains("Generated on: 2025-03-14 09:00:00"));
    assert!(text.contains("Total Records: 2"));
    assert!(text.contains("High Risk: 1"));
    assert!(text.contains("Medium Risk: 0"));
    assert!(text.contains("Low Risk: 1"));
}

#[test]
fn average_score_by_groups_and_sorts_ascending() {
    let table = table(
        &["business_type", "loan_amount", "annual_income"],
        &[
            &["Retail", "50000", "49999"],
            &["Retail", "30000", "50000"],
            &["Agriculture", "20000", "100000"],
            &["", "10000", "0"],
        ],
    );
    let report = RiskEngine::default().score(&table).expect("scores");
    let groups = average_score_by(&report.records, "business_type");

    let names: Vec<&str> = groups.iter().map(|entry| entry.group.as_str()).collect();
    assert_eq!(names, vec!["Agriculture", "Retail", "Unknown"]);
    assert_eq!(groups[1].records, 2);
    assert!((groups[1].average_score - 0.8).abs() < 1e-3);
}

#[test]
fn histogram_closes_the_last_bin() {
    let report = score(&[(0.0, 10.0), (50_000.0, 1.0), (31.0, 99.0), (35.0, 99.0)]);
    let bins = score_histogram(&report.records, 10);

    assert_eq!(bins.len(), 10);
    assert_eq!(bins[0].count, 1);
    assert_eq!(bins[3].count, 2);
    assert_eq!(bins[9].count, 1);
    assert_eq!(bins[9].upper, 1.0);
    assert!(score_histogram(&report.records, 0).is_empty());
}

#[test]
fn export_appends_derived_columns_after_originals() {
    let table = table(
        &["business_id", "loan_amount", "annual_income"],
        &[&["B-1", "$30,000", "50000"]],
    );
    let report = RiskEngine::default().score(&table).expect("scores");

    let mut buffer = Vec::new();
    write_scored_csv(&report, &mut buffer).expect("export succeeds");
    let output = String::from_utf8(buffer).expect("utf8");
    let mut lines = output.lines();

    assert_eq!(
        lines.next(),
        Some("business_id,loan_amount,annual_income,risk_score,risk_level,recommendation")
    );
    assert_eq!(
        lines.next(),
        Some("B-1,\"$30,000\",50000,0.6000,Medium Risk,Ask for additional documents. Conduct credit bureau review.")
    );
}

#[test]
fn export_marks_degraded_rows_as_unscored() {
    let table = table(&["business_id", "loan_amount"], &[&["B-1", "100"]]);
    let report = RiskEngine::default().score(&table).expect("degrades");

    let mut buffer = Vec::new();
    write_scored_csv(&report, &mut buffer).expect("export succeeds");
    let output = String::from_utf8(buffer).expect("utf8");

    assert!(output.lines().nth(1).expect("row").ends_with(",,Unscored,"));
}

#[test]
fn rescoring_an_exported_file_replaces_derived_columns() {
    let engine = RiskEngine::default();
    let export = |report: &ScoringReport| {
        let mut buffer = Vec::new();
        write_scored_csv(report, &mut buffer).expect("export succeeds");
        String::from_utf8(buffer).expect("utf8")
    };

    let first = engine
        .score(&table(
            &["business_id", "loan_amount", "annual_income"],
            &[&["B-1", "30000", "50000"]],
        ))
        .expect("scores");
    let first_export = export(&first);

    let reimported = ApplicantImporter::from_reader(first_export.as_bytes())
        .expect("exported file imports");
    let second = engine.score(&reimported).expect("rescores");
    let second_export = export(&second);

    assert_eq!(second.columns, first.columns);
    assert_eq!(second, first);
    assert_eq!(second_export, first_export);
    assert_eq!(
        second_export.lines().next(),
        Some("business_id,loan_amount,annual_income,risk_score,risk_level,recommendation")
    );
    ApplicantImporter::from_reader(second_export.as_bytes()).expect("re-export imports again");
}
