use crate::infra::InMemoryAssessmentRepository;
use chrono::Local;
use clap::Args;
use loan_risk::config::AppConfig;
use loan_risk::error::AppError;
use loan_risk::workflows::assessment::report::{
    average_score_by, score_histogram, write_scored_csv,
};
use loan_risk::workflows::assessment::{
    ClassifierArtifact, Prediction, RiskAssessmentService, RiskClassifier, RiskEngine,
    RiskSummary, ScoringReport, UploadMetadata,
};
use loan_risk::workflows::upload::ApplicantImporter;
use serde::Serialize;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

const DEMO_UPLOAD: &str = "Business_ID,Business_Type,Location,Loan_Amount_Requested,Annual_Income\n\
B-001,Retail,Urban,50000,49999\n\
B-002,Agriculture,Rural,20000,100000\n\
B-003,Retail,Urban,30000,50000\n\
B-004,Manufacturing,Semi-Urban,10000,0\n\
B-005,Agriculture,Rural,\"$15,000\",\"$80,000\"\n";

const DEMO_PARTIAL_UPLOAD: &str = "Business_ID,Business_Type,Loan_Amount_Requested\n\
C-001,Retail,12000\n\
C-002,Services,8000\n";

const DEMO_ARTIFACT: &str = r#"{
    "features": ["Business_Type", "Loan_Amount_Requested", "Annual_Income"],
    "coefficients": [0.35, 0.00009, -0.00004],
    "intercept": -0.6,
    "encoders": { "Business_Type": ["Agriculture", "Manufacturing", "Retail"] }
}"#;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// CSV upload of loan applications
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Print every scored record after the summary
    #[arg(long)]
    pub(crate) list_records: bool,
    /// Emit the summary and records as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
    /// Write the scored table to this CSV file
    #[arg(long)]
    pub(crate) export: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// CSV upload of loan applications
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Classifier artifact (JSON) exported by the training pipeline
    #[arg(long)]
    pub(crate) model: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the classifier portion of the demo.
    #[arg(long)]
    pub(crate) skip_classifier: bool,
}

#[derive(Serialize)]
struct ScoreOutput<'a> {
    summary: loan_risk::workflows::assessment::report::views::RiskSummaryView,
    #[serde(flatten)]
    report: &'a ScoringReport,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        csv,
        list_records,
        json,
        export,
    } = args;

    let config = AppConfig::load()?;
    let engine = RiskEngine::new(config.risk.policy()?)?;
    let table = ApplicantImporter::from_path(&csv)?;
    let report = engine.score(&table)?;

    if let Some(path) = export {
        let file = std::fs::File::create(&path)?;
        write_scored_csv(&report, file)?;
        eprintln!("Scored table written to {}", path.display());
    }

    if json {
        let output = ScoreOutput {
            summary: RiskSummary::from_records(&report.records).view(),
            report: &report,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Source: {}", csv.display());
    render_report(&report, list_records);
    Ok(())
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let PredictArgs { csv, model } = args;

    let classifier = RiskClassifier::from_path(&model)?;
    let table = ApplicantImporter::from_path(&csv)?;
    let predictions = classifier.predict(&table)?;

    println!("Classifier predictions for {}", csv.display());
    render_predictions(&predictions);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("Loan risk assessment demo");

    let repository = Arc::new(InMemoryAssessmentRepository::default());
    let service = RiskAssessmentService::new(repository, Arc::new(RiskEngine::default()));

    let uploaded_at = Local::now().naive_local();
    let record = service.assess(
        UploadMetadata {
            uploaded_by: "demo".to_string(),
            filename: "applications.csv".to_string(),
            uploaded_at,
        },
        Cursor::new(DEMO_UPLOAD),
    )?;
    println!(
        "\nStored assessment {} for {}",
        record.id.0, record.upload.filename
    );
    render_report(&record.report, true);

    println!("\nAverage risk score by business type");
    for entry in average_score_by(&record.report.records, "Business_Type") {
        println!(
            "- {}: {:.4} across {} applications",
            entry.group, entry.average_score, entry.records
        );
    }

    println!("\nScore distribution");
    for bin in score_histogram(&record.report.records, 5) {
        println!("- {:.1}-{:.1}: {}", bin.lower, bin.upper, bin.count);
    }

    let partial = service.assess(
        UploadMetadata {
            uploaded_by: "demo".to_string(),
            filename: "missing-income.csv".to_string(),
            uploaded_at: Local::now().naive_local(),
        },
        Cursor::new(DEMO_PARTIAL_UPLOAD),
    )?;
    println!(
        "\nStored assessment {} for {}",
        partial.id.0, partial.upload.filename
    );
    render_report(&partial.report, false);

    println!("\nUpload history");
    for entry in service.history(10)? {
        let flag = if entry.degraded { " (degraded)" } else { "" };
        println!(
            "- {} | {} | {} records | uploaded by {} at {}{}",
            entry.id.0,
            entry.filename,
            entry.total_records,
            entry.uploaded_by,
            entry.uploaded_at.format("%Y-%m-%d %H:%M:%S"),
            flag
        );
    }

    if args.skip_classifier {
        return Ok(());
    }

    println!("\nClassifier predictions (demo artifact)");
    let classifier = RiskClassifier::new(ClassifierArtifact::from_json(DEMO_ARTIFACT)?)?;
    let table = ApplicantImporter::from_reader(Cursor::new(DEMO_UPLOAD))?;
    render_predictions(&classifier.predict(&table)?);
    Ok(())
}

fn render_report(report: &ScoringReport, list_records: bool) {
    let summary = RiskSummary::from_records(&report.records);
    print!("{}", summary.render_text(Local::now().naive_local()));

    if let Some(degraded) = &report.degraded {
        println!("Scoring degraded: {}", degraded.reason());
    }

    if !list_records {
        return;
    }

    println!("\nScored records");
    for (index, record) in report.records.iter().enumerate() {
        let label = record
            .applicant
            .field("business_id")
            .map(str::to_string)
            .unwrap_or_else(|| format!("row {}", index + 1));
        match record.assessment.risk_score() {
            Some(score) => println!(
                "- {} | score {:.4} | {}",
                label,
                score,
                record.assessment.level_label()
            ),
            None => println!("- {} | {}", label, record.assessment.level_label()),
        }
    }
}

fn render_predictions(predictions: &[Prediction]) {
    for (index, prediction) in predictions.iter().enumerate() {
        let label = prediction
            .applicant_id
            .clone()
            .unwrap_or_else(|| format!("row {}", index + 1));
        println!(
            "- {} | {} | {:.2}% probability of default",
            label,
            prediction.flag.label(),
            prediction.probability_pct
        );
    }
}
