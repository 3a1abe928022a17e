use super::super::domain::{Assessment, ScoringReport, DERIVED_COLUMNS};
use std::io::Write;

/// Write the scored table as CSV: original columns untouched, derived columns appended.
pub fn write_scored_csv<W: Write>(report: &ScoringReport, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = report.columns.iter().map(String::as_str).collect();
    header.extend(DERIVED_COLUMNS);
    csv_writer.write_record(&header)?;

    for record in &report.records {
        let mut row: Vec<String> = record
            .applicant
            .fields
            .iter()
            .map(|field| field.value.clone())
            .collect();

        match &record.assessment {
            Assessment::Scored {
                risk_score,
                risk_level,
                recommendation,
            } => {
                row.push(format!("{risk_score:.4}"));
                row.push(risk_level.label().to_string());
                row.push(recommendation.clone());
            }
            Assessment::Unscored { .. } => {
                row.push(String::new());
                row.push(record.assessment.level_label().to_string());
                row.push(String::new());
            }
        }

        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}
